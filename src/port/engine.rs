use async_trait::async_trait;

use crate::domain::{address::ServiceAddress, engine::EngineStartOptions, error::DevError};

/// Dev-mode workflow orchestration engine
///
/// `start` either returns an engine whose frontend accepts connections, or fails
/// without leaving anything running behind. Requested namespaces are handed to the
/// engine at launch; implementations only report ready once the engine serves them.
#[async_trait]
pub trait WorkflowEngine: Send + Sync {
    /// Start the engine and return its handle with the frontend address
    async fn start(&self, options: EngineStartOptions) -> Result<(Box<dyn EngineHandle>, ServiceAddress), DevError>;
}

/// Running engine instance, owned by whoever started it
#[async_trait]
pub trait EngineHandle: Send + Sync {
    /// Release every port and background task held by the engine.
    ///
    /// Idempotent: later calls are no-ops and never fail.
    async fn stop(&self);
}
