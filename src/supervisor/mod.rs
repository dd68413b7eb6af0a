//! Supervision - per-run session, task fan-in and the orchestrator driving them

pub mod orchestrator;
pub mod session;
pub mod task_set;

pub use orchestrator::*;
pub use session::*;
pub use task_set::*;
