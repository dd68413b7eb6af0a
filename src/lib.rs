//! # Devstack
//!
//! Runs a complete local development environment as one process:
//!
//! - a dev-mode workflow engine on ephemeral ports
//! - the composite backend on a fixed API port
//! - the prebuilt web UI, served as a single-page application
//!
//! The engine is started first and stopped last. Backend and UI run concurrently
//! under one cancellation token; the first failure (or an external interrupt)
//! tears the whole session down.

pub mod adapter;
pub mod cli;
pub mod config;
pub mod domain;
pub mod port;
pub mod supervisor;

pub use cli::Cli;
pub use config::DevConfig;
pub use domain::{error::DevError, state::Outcome};
pub use supervisor::orchestrator::Orchestrator;
