//! Domain types - addresses, configuration values, phases and errors

pub mod address;
pub mod constant;
pub mod engine;
pub mod error;
pub mod service;
pub mod state;

pub use address::*;
pub use engine::*;
pub use error::*;
pub use service::*;
pub use state::*;
