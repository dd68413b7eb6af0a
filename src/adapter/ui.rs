//! Single-page application server
//!
//! Every GET path is resolved against the asset bundle. Unmatched paths get the
//! bundle's index document so the client-side router can take over on full-page
//! navigation; only a bundle without an index answers 404.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{Level, event};

use crate::{
    domain::{
        address::ServiceAddress,
        constant::{INDEX_PAGE, ui},
        error::DevError
    },
    port::{
        assets::{Asset, AssetBundle},
        ui::UiService
    }
};

type SharedBundle = Arc<dyn AssetBundle>;

/// Build the SPA router over `bundle`
pub fn router(bundle: SharedBundle) -> Router {
    Router::new()
        .route("/", get(serve_root))
        .route("/*path", get(serve_path))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(bundle)
}

async fn serve_root(State(bundle): State<SharedBundle>) -> Response {
    resolve(bundle.as_ref(), "").await
}

async fn serve_path(State(bundle): State<SharedBundle>, Path(path): Path<String>) -> Response {
    resolve(bundle.as_ref(), &path).await
}

/// Directory paths map to their index document
fn asset_key(path: &str) -> String {
    if path.is_empty() || path.ends_with('/') { format!("{}{}", path, INDEX_PAGE) } else { path.to_string() }
}

/// Resolve one request path to a response
pub async fn resolve(bundle: &dyn AssetBundle, path: &str) -> Response {
    match bundle.lookup(&asset_key(path)).await {
        Ok(Some(asset)) => asset_response(asset),
        Ok(None) => index_fallback(bundle, path).await,
        Err(e) => {
            event!(Level::ERROR, event = ui::ASSET_LOOKUP_FAILED, path = %path, error = %e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn asset_response(asset: Asset) -> Response {
    ([(header::CONTENT_TYPE, asset.content_type)], asset.content).into_response()
}

async fn index_fallback(bundle: &dyn AssetBundle, path: &str) -> Response {
    match bundle.lookup(INDEX_PAGE).await {
        Ok(Some(index)) => {
            event!(Level::DEBUG, event = ui::INDEX_FALLBACK, path = %path);
            (StatusCode::OK, [(header::CONTENT_TYPE, "text/html")], index.content).into_response()
        }
        Ok(None) => {
            event!(Level::WARN, event = ui::INDEX_MISSING, path = %path);
            StatusCode::NOT_FOUND.into_response()
        }
        Err(e) => {
            event!(Level::WARN, event = ui::INDEX_MISSING, path = %path, error = %e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// axum-backed [`UiService`]
pub struct SpaServer {
    bundle:   SharedBundle,
    shutdown: CancellationToken
}

impl SpaServer {
    pub fn new(bundle: SharedBundle) -> Self {
        Self { bundle, shutdown: CancellationToken::new() }
    }
}

#[async_trait]
impl UiService for SpaServer {
    async fn start(&self, address: ServiceAddress) -> Result<(), DevError> {
        if self.shutdown.is_cancelled() {
            return Ok(());
        }

        let listener =
            TcpListener::bind(address.socket_addr()).await.map_err(|e| DevError::ui_bind_failed(&address, e))?;
        event!(Level::INFO, event = ui::UI_LISTENING, address = %address);

        axum::serve(listener, router(self.bundle.clone()))
            .with_graceful_shutdown(self.shutdown.clone().cancelled_owned())
            .await
            .map_err(|e| DevError::Ui(e.to_string()))?;

        event!(Level::INFO, event = ui::UI_CLOSED, address = %address);
        Ok(())
    }

    fn close(&self) -> Result<(), DevError> {
        self.shutdown.cancel();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        net::{IpAddr, Ipv4Addr},
        time::Duration
    };

    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request}
    };
    use tower::ServiceExt;

    use super::*;
    use crate::adapter::{assets::MemoryBundle, net::PortAllocator};

    const INDEX: &str = "<!doctype html><div id=app></div>";

    fn bundle() -> SharedBundle {
        Arc::new(
            MemoryBundle::new()
                .with_file("index.html", INDEX)
                .with_file("assets/app.js", "export default 1;")
                .with_file("favicon.ico", vec![0u8, 1, 2, 3])
        )
    }

    async fn get(bundle: SharedBundle, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        request(bundle, Method::GET, uri).await
    }

    async fn request(bundle: SharedBundle, method: Method, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = router(bundle)
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let content_type =
            response.headers().get(header::CONTENT_TYPE).map(|value| value.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();
        (status, content_type, body)
    }

    #[tokio::test]
    async fn test_matching_asset_served_verbatim() {
        let (status, content_type, body) = get(bundle(), "/assets/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("text/javascript; charset=utf-8"));
        assert_eq!(body, b"export default 1;");

        let (status, content_type, body) = get(bundle(), "/favicon.ico").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("image/x-icon"));
        assert_eq!(body, vec![0u8, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_client_route_falls_back_to_index() {
        for uri in ["/runs/42/logs", "/settings", "/assets/missing.js", "/../secret"] {
            let (status, content_type, body) = get(bundle(), uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(content_type.as_deref(), Some("text/html"), "{uri}");
            assert_eq!(body, INDEX.as_bytes(), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let (status, _, body) = get(bundle(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, INDEX.as_bytes());
    }

    #[tokio::test]
    async fn test_missing_index_is_not_found() {
        let bundle: SharedBundle = Arc::new(MemoryBundle::new().with_file("assets/app.js", "1"));

        let (status, _, _) = get(bundle.clone(), "/dashboard").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, body) = get(bundle, "/assets/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"1");
    }

    #[tokio::test]
    async fn test_only_get_is_routed() {
        let (status, _, _) = request(bundle(), Method::POST, "/settings").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_close_before_start_is_safe() {
        let server = SpaServer::new(bundle());
        server.close().unwrap();
        server.close().unwrap();

        let address = ServiceAddress::loopback(IpAddr::V4(Ipv4Addr::LOCALHOST), 0).unwrap();
        assert_eq!(server.start(address).await, Ok(()));
    }

    #[tokio::test]
    async fn test_start_serves_until_closed() {
        let port = PortAllocator::new(IpAddr::V4(Ipv4Addr::LOCALHOST)).allocate().unwrap();
        let address = ServiceAddress::loopback(IpAddr::V4(Ipv4Addr::LOCALHOST), port).unwrap();
        let server = Arc::new(SpaServer::new(bundle()));

        let running = server.clone();
        let serve = tokio::spawn(async move { running.start(address).await });

        let mut connected = false;
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(address.socket_addr()).await.is_ok() {
                connected = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(connected);

        server.close().unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), serve).await.unwrap().unwrap();
        assert_eq!(result, Ok(()));
        server.close().unwrap();
    }

    #[tokio::test]
    async fn test_bind_failure_is_a_ui_error() {
        let listener = tokio::net::TcpListener::bind((IpAddr::V4(Ipv4Addr::LOCALHOST), 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = ServiceAddress::loopback(IpAddr::V4(Ipv4Addr::LOCALHOST), port).unwrap();

        let result = SpaServer::new(bundle()).start(address).await;
        assert!(matches!(result, Err(DevError::Ui(_))));
    }
}
