//! Adapters - concrete processes, sockets and HTTP servers behind the ports

pub mod assets;
pub mod backend;
pub mod engine;
pub mod net;
pub mod process;
pub mod ui;

pub use assets::*;
pub use backend::*;
pub use engine::*;
pub use net::*;
pub use ui::*;
