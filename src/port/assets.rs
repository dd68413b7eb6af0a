use async_trait::async_trait;

use crate::domain::error::DevError;

/// A resolved static asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub content:      Vec<u8>,
    pub content_type: &'static str
}

/// Read-only content lookup over a prebuilt front-end bundle
#[async_trait]
pub trait AssetBundle: Send + Sync {
    /// Resolve a bundle-relative path such as `assets/app.js`.
    ///
    /// `Ok(None)` means the bundle has no such file; `Err` is reserved for
    /// failures reading a file that does exist.
    async fn lookup(&self, path: &str) -> Result<Option<Asset>, DevError>;
}
