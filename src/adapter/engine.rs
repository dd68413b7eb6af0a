//! Dev workflow engine launched as a child process
//!
//! The engine program is started in dev mode (`server start-dev`) with flags for
//! bind IP, ports, namespaces and log level. Namespaces are registered by the engine
//! itself from the `--namespace` flags before its frontend starts serving.
//!
//! The cluster identity (id, cluster names, failover version) has no `start-dev`
//! flag. It is exported as `DEV_ENGINE_*` environment variables, which only wrapper
//! scripts or engine builds that read them pick up; the stock `temporal` CLI ignores
//! them and runs with its own single-cluster defaults.
//!
//! Readiness is a TCP connect to the frontend. `start` returns once it succeeds; if
//! the process dies first or never becomes reachable, it is killed and reaped before
//! the error is returned.

use std::time::Duration;

use async_trait::async_trait;
use tokio::{
    net::TcpStream,
    process::{Child, Command},
    sync::Mutex,
    time::Instant
};
use tracing::{Level, event};

use crate::{
    adapter::process,
    domain::{address::ServiceAddress, constant::engine, engine::EngineStartOptions, error::DevError},
    port::engine::{EngineHandle, WorkflowEngine}
};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Launches the engine program and waits for its frontend
pub struct DevServerProcess {
    program:       String,
    ready_timeout: Duration
}

impl DevServerProcess {
    pub fn new(program: impl Into<String>, ready_timeout: Duration) -> Self {
        Self { program: program.into(), ready_timeout }
    }

    fn command(&self, options: &EngineStartOptions) -> Command {
        let mut command = process::supervised_command(&self.program);
        command
            .args(["server", "start-dev"])
            .arg("--ip")
            .arg(options.ip.to_string())
            .arg("--port")
            .arg(options.frontend_port.to_string())
            .arg("--ui-ip")
            .arg(options.ip.to_string())
            .arg("--ui-port")
            .arg(options.ui_port.to_string())
            .arg("--log-level")
            .arg(&options.log_level);

        for namespace in &options.namespaces {
            command.arg("--namespace").arg(namespace);
        }

        command
            .env("DEV_ENGINE_CLUSTER_ID", &options.cluster_id)
            .env("DEV_ENGINE_MASTER_CLUSTER", &options.master_cluster_name)
            .env("DEV_ENGINE_CURRENT_CLUSTER", &options.current_cluster_name)
            .env("DEV_ENGINE_FAILOVER_VERSION", options.initial_failover_version.to_string());
        command
    }
}

#[async_trait]
impl WorkflowEngine for DevServerProcess {
    async fn start(&self, options: EngineStartOptions) -> Result<(Box<dyn EngineHandle>, ServiceAddress), DevError> {
        let address = options.frontend_address()?;

        let mut child =
            self.command(&options).spawn().map_err(|e| DevError::engine_launch_failed(&self.program, e))?;
        process::log_spawned("workflow_engine", &child);

        if let Err(e) = wait_until_ready(&mut child, &address, self.ready_timeout).await {
            process::terminate(&mut child, "workflow_engine").await;
            event!(Level::ERROR, event = engine::ENGINE_START_FAILED, address = %address, error = %e);
            return Err(e);
        }

        event!(Level::INFO, event = engine::ENGINE_READY, address = %address,
               cluster_id = %options.cluster_id, namespaces = ?options.namespaces);

        Ok((Box::new(ProcessEngineHandle::new(child)), address))
    }
}

/// Poll the frontend until it accepts a connection, the child exits, or `timeout` elapses
async fn wait_until_ready(child: &mut Child, address: &ServiceAddress, timeout: Duration) -> Result<(), DevError> {
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(status) = child.try_wait().map_err(|e| DevError::EngineStart(e.to_string()))? {
            return Err(DevError::engine_exited_early(status));
        }
        if TcpStream::connect(address.socket_addr()).await.is_ok() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(DevError::engine_not_ready(address, timeout));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Handle to a running engine process
pub struct ProcessEngineHandle {
    child: Mutex<Option<Child>>
}

impl ProcessEngineHandle {
    fn new(child: Child) -> Self {
        Self { child: Mutex::new(Some(child)) }
    }
}

#[async_trait]
impl EngineHandle for ProcessEngineHandle {
    async fn stop(&self) {
        if let Some(mut child) = self.child.lock().await.take() {
            process::terminate(&mut child, "workflow_engine").await;
            event!(Level::INFO, event = engine::ENGINE_STOPPED);
        }
    }
}
