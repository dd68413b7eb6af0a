//! # devstack
//!
//! ```bash
//! # engine, backend and UI with the default ports (4400 API, 5400 UI)
//! devstack
//!
//! # custom backend binary and UI bundle
//! devstack --backend-program ./target/debug/server --assets-dir web/dist
//! ```
//!
//! Ctrl-C (or SIGTERM) stops every service and exits with status 0.

use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use devstack::{
    Cli, DevConfig, Orchestrator,
    adapter::{assets::DirectoryBundle, backend::ProcessBackend, engine::DevServerProcess, ui::SpaServer}
};
use tokio_util::sync::CancellationToken;
use tracing::{Level, event};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "devstack=info,info";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("devstack: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.structured_logging);

    let interrupt = CancellationToken::new();
    let trigger = interrupt.clone();
    if let Err(e) = ctrlc::set_handler(move || trigger.cancel()) {
        eprintln!("devstack: failed to install signal handler: {}", e);
        return ExitCode::FAILURE;
    }

    match build_orchestrator(config).run(interrupt).await.into_result() {
        Ok(()) => {
            println!("stopped development server");
            ExitCode::SUCCESS
        }
        Err(e) => {
            event!(Level::ERROR, error = %e, "development server failed");
            eprintln!("devstack: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if json {
        tracing_subscriber::registry().with(env_filter).with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        tracing_subscriber::registry().with(env_filter).with(tracing_subscriber::fmt::layer()).init();
    }
}

fn build_orchestrator(config: DevConfig) -> Orchestrator {
    let engine = Arc::new(DevServerProcess::new(config.engine_program.clone(), config.engine_ready_timeout()));
    let backend = Arc::new(ProcessBackend::new(config.backend_program.clone(), config.backend_args.clone()));
    let ui = Arc::new(SpaServer::new(Arc::new(DirectoryBundle::new(config.assets_dir.clone()))));

    Orchestrator::new(Arc::new(config), engine, backend, ui)
}
