use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::{error::DevError, service::ServiceConfig};

/// Composite backend (broker, storage engine and workflow client in one service)
#[async_trait]
pub trait Backend: Send + Sync {
    /// Block until `token` is cancelled or the backend fails.
    ///
    /// Returns `Ok` on clean cancellation, after the backend has released its own resources.
    async fn run(&self, token: CancellationToken, config: Arc<ServiceConfig>) -> Result<(), DevError>;
}
