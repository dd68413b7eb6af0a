//! Asset bundle implementations
//!
//! - DirectoryBundle: a prebuilt front-end on disk (e.g. `ui/dist`)
//! - MemoryBundle: in-process files, for tests and embedding

use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Component, Path, PathBuf}
};

use async_trait::async_trait;

use crate::{
    domain::error::DevError,
    port::assets::{Asset, AssetBundle}
};

/// Content type derived from the file extension
pub fn content_type_for(path: &str) -> &'static str {
    let extension = Path::new(path).extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("js") | Some("mjs") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") | Some("map") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("wasm") => "application/wasm",
        _ => "application/octet-stream"
    }
}

/// Reduce a request path to a bundle-relative path.
///
/// Returns `None` for paths that try to leave the bundle root.
fn relative_path(path: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None
        }
    }
    Some(relative)
}

/// Serves files from a directory on disk
pub struct DirectoryBundle {
    root: PathBuf
}

impl DirectoryBundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetBundle for DirectoryBundle {
    async fn lookup(&self, path: &str) -> Result<Option<Asset>, DevError> {
        let Some(relative) = relative_path(path) else {
            return Ok(None);
        };
        let full_path = self.root.join(relative);

        match tokio::fs::metadata(&full_path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => return Ok(None),
            Err(e) => return Err(DevError::Io(format!("{}: {}", full_path.display(), e)))
        }

        let content =
            tokio::fs::read(&full_path).await.map_err(|e| DevError::Io(format!("{}: {}", full_path.display(), e)))?;

        Ok(Some(Asset { content, content_type: content_type_for(path) }))
    }
}

/// In-memory bundle keyed by bundle-relative path
#[derive(Default)]
pub struct MemoryBundle {
    files: HashMap<String, Vec<u8>>
}

impl MemoryBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.trim_start_matches('/').to_string(), content.into());
        self
    }
}

#[async_trait]
impl AssetBundle for MemoryBundle {
    async fn lookup(&self, path: &str) -> Result<Option<Asset>, DevError> {
        let Some(relative) = relative_path(path) else {
            return Ok(None);
        };
        let key = relative.to_string_lossy().replace('\\', "/");

        Ok(self
            .files
            .get(&key)
            .map(|content| Asset { content: content.clone(), content_type: content_type_for(&key) }))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("index.html"), "text/html; charset=utf-8");
        assert_eq!(content_type_for("assets/app.JS"), "text/javascript; charset=utf-8");
        assert_eq!(content_type_for("logo.svg"), "image/svg+xml");
        assert_eq!(content_type_for("LICENSE"), "application/octet-stream");
    }

    #[test]
    fn test_relative_path_rejects_traversal() {
        assert_eq!(relative_path("/assets/./app.js"), Some(PathBuf::from("assets/app.js")));
        assert_eq!(relative_path("../etc/passwd"), None);
        assert_eq!(relative_path("assets/../../secret"), None);
    }

    #[tokio::test]
    async fn test_directory_bundle_lookup() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        std::fs::write(dir.path().join("assets/app.js"), "console.log(1)").unwrap();

        let bundle = DirectoryBundle::new(dir.path());

        let asset = bundle.lookup("assets/app.js").await.unwrap().unwrap();
        assert_eq!(asset.content, b"console.log(1)");
        assert_eq!(asset.content_type, "text/javascript; charset=utf-8");

        assert!(bundle.lookup("missing.css").await.unwrap().is_none());
        assert!(bundle.lookup("assets").await.unwrap().is_none());
        assert!(bundle.lookup("index.html/nested").await.unwrap().is_none());
        assert!(bundle.lookup("../index.html").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_bundle_lookup() {
        let bundle = MemoryBundle::new().with_file("/index.html", "<html></html>");

        let index = bundle.lookup("index.html").await.unwrap().unwrap();
        assert_eq!(index.content, b"<html></html>");
        assert!(bundle.lookup("other.html").await.unwrap().is_none());
    }
}
