use async_trait::async_trait;

use crate::domain::{address::ServiceAddress, error::DevError};

/// Static single-page application server
#[async_trait]
pub trait UiService: Send + Sync {
    /// Bind `address` and serve until closed or a fatal serving error occurs
    async fn start(&self, address: ServiceAddress) -> Result<(), DevError>;

    /// Stop accepting connections and release the listener.
    ///
    /// Safe to call repeatedly and before `start` ever completed.
    fn close(&self) -> Result<(), DevError>;
}
