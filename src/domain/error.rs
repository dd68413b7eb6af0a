use std::{fmt::Display, process::ExitStatus, time::Duration};

use thiserror::Error;

use crate::domain::{address::ServiceAddress, state::ServiceKind};

/// Common error types for the dev environment
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DevError {
    /// The OS could not hand out a free loopback port
    #[error("port allocation failed: {0}")]
    PortAllocation(String),

    /// The dev workflow engine did not come up
    #[error("workflow engine failed to start: {0}")]
    EngineStart(String),

    /// Configuration related errors
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Backend run loop failed
    #[error("backend failed: {0}")]
    Backend(String),

    /// UI server failed
    #[error("ui server failed: {0}")]
    Ui(String),

    /// A service returned before shutdown was requested
    #[error("{service} exited before shutdown was requested")]
    UnexpectedExit { service: ServiceKind },

    /// File system / IO errors
    #[error("{0}")]
    Io(String),

    /// Serialization errors
    #[error("{0}")]
    Serialization(String),

    /// A supervised task panicked or was aborted
    #[error("task failed: {0}")]
    Task(String)
}

impl DevError {
    /// Setup errors happen before the concurrent phase and abort the run immediately
    pub fn is_setup(&self) -> bool {
        matches!(self, DevError::PortAllocation(_) | DevError::EngineStart(_) | DevError::Configuration(_))
    }

    pub fn engine_launch_failed(program: &str, error: impl Display) -> Self {
        DevError::EngineStart(format!("failed to launch `{}`: {}", program, error))
    }

    pub fn engine_exited_early(status: ExitStatus) -> Self {
        DevError::EngineStart(format!("engine exited before becoming ready ({})", status))
    }

    pub fn engine_not_ready(address: &ServiceAddress, timeout: Duration) -> Self {
        DevError::EngineStart(format!("engine not reachable on {} after {}s", address, timeout.as_secs()))
    }

    pub fn backend_launch_failed(program: &str, error: impl Display) -> Self {
        DevError::Backend(format!("failed to launch `{}`: {}", program, error))
    }

    pub fn backend_exit_status(status: ExitStatus) -> Self {
        DevError::Backend(format!("process exited with {}", status))
    }

    pub fn ui_bind_failed(address: &ServiceAddress, error: impl Display) -> Self {
        DevError::Ui(format!("failed to bind {}: {}", address, error))
    }
}

/// Convert from anyhow::Error
impl From<anyhow::Error> for DevError {
    fn from(err: anyhow::Error) -> Self {
        DevError::Configuration(format!("{:#}", err))
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for DevError {
    fn from(err: std::io::Error) -> Self {
        DevError::Io(err.to_string())
    }
}

/// Convert from serde_yaml::Error
impl From<serde_yaml::Error> for DevError {
    fn from(err: serde_yaml::Error) -> Self {
        DevError::Serialization(err.to_string())
    }
}

/// Convert from tokio::task::JoinError
impl From<tokio::task::JoinError> for DevError {
    fn from(err: tokio::task::JoinError) -> Self {
        DevError::Task(err.to_string())
    }
}
