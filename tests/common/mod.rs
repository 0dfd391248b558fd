//! Shared utilities for integration tests.

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::Request;
use axum::response::Response;
use axum::{middleware, routing::any, Router};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use turnout::http::{maintenance_middleware, MaintenanceState};

/// Body returned by the wrapped test application.
#[allow(dead_code)]
pub const APP_BODY: &str = "hello from the application";

/// Temporary application root with helpers for the maintenance artifact.
pub struct AppRoot {
    dir: TempDir,
}

#[allow(dead_code)]
impl AppRoot {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Turn maintenance on with the given YAML settings.
    pub fn enable(&self, settings: &str) {
        fs::create_dir_all(self.path().join("tmp")).unwrap();
        fs::write(self.path().join("tmp/maintenance.yml"), settings).unwrap();
    }

    pub fn disable(&self) {
        fs::remove_file(self.path().join("tmp/maintenance.yml")).unwrap();
    }

    /// Install an override template under `public/`.
    pub fn write_public(&self, name: &str, content: &str) {
        fs::create_dir_all(self.path().join("public")).unwrap();
        fs::write(self.path().join("public").join(name), content).unwrap();
    }
}

/// A trivial application wrapped by the maintenance middleware.
#[allow(dead_code)]
pub fn app_router(state: MaintenanceState) -> Router {
    Router::new()
        .route("/", any(|| async { APP_BODY }))
        .route("/{*path}", any(|| async { APP_BODY }))
        .layer(middleware::from_fn_with_state(state, maintenance_middleware))
}

/// Build a request as if it arrived from `remote` over a socket.
pub fn request(path: &str, remote: Option<&str>, accept: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(accept) = accept {
        builder = builder.header("Accept", accept);
    }
    let mut req = builder.body(Body::empty()).unwrap();
    if let Some(remote) = remote {
        let addr: SocketAddr = format!("{}:40000", remote).parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
    }
    req
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Start a mock upstream returning `body`; returns its address and a hit counter.
#[allow(dead_code)]
pub async fn start_mock_backend(body: &'static str) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, hits)
}
