//! Orchestration phases and terminal outcome
//!
//! A run moves strictly forward through the phases below and produces exactly one
//! [`Outcome`] once every component has finished its own teardown.

use std::fmt::{self, Display};

use crate::domain::error::DevError;

/// Orchestrator state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// Nothing started yet, ports not allocated
    Init,
    /// Ports allocated, waiting for the workflow engine to listen
    EngineStarting,
    /// Engine is reachable and its namespace registered
    EngineReady,
    /// Backend and UI are running side by side
    ConcurrentRun,
    /// Shared token cancelled, waiting for both tasks to unwind
    Draining,
    /// Engine stopped, outcome decided
    Done
}

impl Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Init => "init",
            Phase::EngineStarting => "engine_starting",
            Phase::EngineReady => "engine_ready",
            Phase::ConcurrentRun => "concurrent_run",
            Phase::Draining => "draining",
            Phase::Done => "done"
        };
        f.write_str(name)
    }
}

/// The two services supervised during the concurrent phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Backend,
    Ui
}

impl Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::Backend => f.write_str("backend"),
            ServiceKind::Ui => f.write_str("ui")
        }
    }
}

/// Terminal result of one orchestration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Externally interrupted and no component reported an error
    CleanStop,
    /// First error observed from any component
    Failed(DevError)
}

impl Outcome {
    pub fn is_clean(&self) -> bool {
        matches!(self, Outcome::CleanStop)
    }

    pub fn into_result(self) -> Result<(), DevError> {
        match self {
            Outcome::CleanStop => Ok(()),
            Outcome::Failed(err) => Err(err)
        }
    }
}
