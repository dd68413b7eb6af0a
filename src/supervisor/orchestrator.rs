//! Orchestrator - startup ordering, supervision and teardown of one dev session
//!
//! `Init → EngineStarting → EngineReady → ConcurrentRun → Draining → Done`
//!
//! The workflow engine must be reachable before the backend configuration is built.
//! Backend and UI then run side by side sharing one cancellation token. The first of
//! external interruption or either task finishing cancels the token; both tasks are
//! drained before the engine is stopped, last.

use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;
use tracing::{Level, event};

use crate::{
    adapter::net::PortAllocator,
    config::DevConfig,
    domain::{
        address::ServiceAddress,
        constant::{orchestrator, ui},
        engine::EngineStartOptions,
        error::DevError,
        service::ServiceConfig,
        state::{Outcome, Phase, ServiceKind}
    },
    port::{backend::Backend, engine::WorkflowEngine, ui::UiService},
    supervisor::{
        session::Session,
        task_set::{FirstError, TaskSet}
    }
};

/// How long aborted tasks get to wind down once the drain deadline passed
const ABORT_GRACE: Duration = Duration::from_secs(1);

/// Ephemeral ports picked for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatedPorts {
    pub engine_frontend: u16,
    pub engine_ui:       u16,
    pub broker:          ServiceAddress
}

/// Allocate the engine frontend, engine UI and broker ports, never reusing the fixed ones
pub fn allocate_ports(config: &DevConfig) -> Result<AllocatedPorts, DevError> {
    let mut allocator = PortAllocator::new(config.ip);
    allocator.reserve(config.server_port);
    allocator.reserve(config.ui_port);

    let ports = AllocatedPorts {
        engine_frontend: allocator.allocate()?,
        engine_ui:       allocator.allocate()?,
        broker:          allocator.allocate_address()?
    };

    event!(Level::DEBUG, event = orchestrator::PORTS_ALLOCATED, engine_frontend = ports.engine_frontend,
           engine_ui = ports.engine_ui, broker = %ports.broker);
    Ok(ports)
}

pub struct Orchestrator {
    config:  Arc<DevConfig>,
    engine:  Arc<dyn WorkflowEngine>,
    backend: Arc<dyn Backend>,
    ui:      Arc<dyn UiService>
}

impl Orchestrator {
    pub fn new(
        config: Arc<DevConfig>,
        engine: Arc<dyn WorkflowEngine>,
        backend: Arc<dyn Backend>,
        ui: Arc<dyn UiService>
    ) -> Self {
        Self { config, engine, backend, ui }
    }

    /// Run one dev session until `interrupt` is cancelled or a service fails.
    ///
    /// Returns only after every component has finished its own teardown.
    pub async fn run(&self, interrupt: CancellationToken) -> Outcome {
        let mut phase = Phase::Init;

        let (ports, ui_address) = match self.prepare() {
            Ok(prepared) => prepared,
            Err(e) => return setup_failed(&mut phase, None, e)
        };
        let session = match Session::create(&self.config.data_dir) {
            Ok(session) => session,
            Err(e) => return setup_failed(&mut phase, None, e)
        };

        advance(&mut phase, Phase::EngineStarting);
        let options = EngineStartOptions::dev(
            self.config.ip,
            ports.engine_frontend,
            ports.engine_ui,
            &self.config.namespace,
            &self.config.engine_log_level
        );

        let started = tokio::select! {
            biased;
            _ = interrupt.cancelled() => None,
            started = self.engine.start(options) => Some(started)
        };
        let (engine, engine_address) = match started {
            Some(Ok(started)) => started,
            Some(Err(e)) => return setup_failed(&mut phase, Some(session), e),
            None => {
                event!(Level::INFO, event = orchestrator::INTERRUPTED, phase = %phase);
                session.remove();
                advance(&mut phase, Phase::Done);
                return Outcome::CleanStop;
            }
        };
        advance(&mut phase, Phase::EngineReady);

        let service_config = Arc::new(ServiceConfig::dev(
            self.config.server_port,
            &ui_address,
            self.config.structured_logging,
            session.dir().to_path_buf(),
            ports.broker,
            engine_address,
            &self.config.namespace
        ));

        event!(Level::INFO, event = orchestrator::SERVICES_CONFIGURED, engine = %engine_address,
               backend_port = service_config.port, broker = %ports.broker, session_id = %session.id());

        advance(&mut phase, Phase::ConcurrentRun);
        let outcome = self.supervise(&mut phase, service_config, ui_address, &interrupt).await;

        engine.stop().await;
        session.remove();
        advance(&mut phase, Phase::Done);

        event!(Level::INFO, event = orchestrator::RUN_COMPLETED, clean = outcome.is_clean());
        outcome
    }

    fn prepare(&self) -> Result<(AllocatedPorts, ServiceAddress), DevError> {
        let ui_address = self.config.ui_address()?;
        let ports = allocate_ports(&self.config)?;
        Ok((ports, ui_address))
    }

    /// ConcurrentRun and Draining: run backend and UI until the first trigger, then unwind both
    async fn supervise(
        &self,
        phase: &mut Phase,
        config: Arc<ServiceConfig>,
        ui_address: ServiceAddress,
        interrupt: &CancellationToken
    ) -> Outcome {
        let token = CancellationToken::new();
        let mut tasks = TaskSet::new();
        let mut errors = FirstError::default();

        let backend = self.backend.clone();
        let backend_token = token.clone();
        tasks.spawn(ServiceKind::Backend, async move { backend.run(backend_token, config).await });

        event!(Level::INFO, event = ui::UI_SERVING, "serving ui on {}", ui_address.http_origin());
        tasks.spawn(ServiceKind::Ui, serve_ui(self.ui.clone(), ui_address, token.clone()));

        let interrupted = tokio::select! {
            biased;
            _ = interrupt.cancelled() => {
                event!(Level::INFO, event = orchestrator::INTERRUPTED, phase = %phase);
                true
            }
            Some((service, result)) = tasks.next() => {
                event!(Level::INFO, event = orchestrator::TASK_FINISHED, service = %service, ok = result.is_ok());
                errors.record(service, result.err().unwrap_or(DevError::UnexpectedExit { service }));
                false
            }
        };

        advance(phase, Phase::Draining);
        token.cancel();

        let drained = tokio::time::timeout(self.config.shutdown_timeout(), async {
            while let Some((service, result)) = tasks.next().await {
                event!(Level::DEBUG, event = orchestrator::TASK_FINISHED, service = %service, ok = result.is_ok());
                // After an interrupt the run is a clean stop whatever the tasks report while unwinding
                match result {
                    Err(e) if interrupted => errors.discard(service, e),
                    Err(e) => {
                        errors.record(service, e);
                    }
                    Ok(()) => {}
                }
            }
        })
        .await;

        if drained.is_err() {
            event!(Level::WARN, event = orchestrator::DRAIN_TIMED_OUT, pending = tasks.pending(),
                   timeout_secs = self.config.shutdown_timeout_secs);
            tasks.abort_all();
            let _ = tokio::time::timeout(ABORT_GRACE, async { while tasks.next().await.is_some() {} }).await;
        }

        match errors.into_inner() {
            Some(error) => Outcome::Failed(error),
            None => Outcome::CleanStop
        }
    }
}

/// Serve the UI until it stops by itself or `token` is cancelled, then close it
/// and wait for the serve loop to return
async fn serve_ui(server: Arc<dyn UiService>, address: ServiceAddress, token: CancellationToken) -> Result<(), DevError> {
    let serve = server.start(address);
    tokio::pin!(serve);

    tokio::select! {
        result = &mut serve => result,
        _ = token.cancelled() => {
            if let Err(e) = server.close() {
                event!(Level::WARN, event = ui::UI_CLOSE_FAILED, error = %e);
            }
            serve.await
        }
    }
}

fn advance(phase: &mut Phase, next: Phase) {
    event!(Level::DEBUG, event = orchestrator::PHASE_CHANGED, from = %phase, to = %next);
    *phase = next;
}

fn setup_failed(phase: &mut Phase, session: Option<Session>, error: DevError) -> Outcome {
    event!(Level::ERROR, event = orchestrator::SETUP_FAILED, phase = %phase, error = %error);
    if let Some(session) = session {
        session.remove();
    }
    advance(phase, Phase::Done);
    Outcome::Failed(error)
}
