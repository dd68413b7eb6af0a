//! Ports - the seams between the orchestrator and the services it supervises

pub mod assets;
pub mod backend;
pub mod engine;
pub mod ui;

pub use assets::*;
pub use backend::*;
pub use engine::*;
pub use ui::*;
