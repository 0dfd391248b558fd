//! Maintenance mode middleware.
//! Short-circuits requests while the maintenance artifact is present.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::path::Path;
use std::sync::Arc;
use tracing::error;

use crate::http::request::RequestView;
use crate::interceptor::{Admission, Interceptor};

/// State shared by every invocation of the middleware.
#[derive(Clone, Debug)]
pub struct MaintenanceState {
    interceptor: Arc<Interceptor>,
    trust_forwarded_for: bool,
}

impl MaintenanceState {
    pub fn new(app_root: impl AsRef<Path>) -> Self {
        Self {
            interceptor: Arc::new(Interceptor::new(app_root)),
            trust_forwarded_for: false,
        }
    }

    /// Resolve the client address from `X-Forwarded-For` when present.
    pub fn trust_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }

    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }
}

/// Axum middleware; install with `axum::middleware::from_fn_with_state`.
pub async fn maintenance_middleware(
    State(state): State<MaintenanceState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let view = RequestView::from_request(&req, state.trust_forwarded_for);
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    // Settings and templates are read with blocking filesystem calls.
    let interceptor = state.interceptor.clone();
    let admission = tokio::task::spawn_blocking(move || interceptor.admit(&view)).await;

    match admission {
        Ok(Ok(Admission::Forward)) => next.run(req).await,
        Ok(Ok(Admission::Intercept(response))) => response.into_response(),
        Ok(Err(e)) => {
            error!(request_id = %request_id, error = %e, "Maintenance configuration error");
            (StatusCode::INTERNAL_SERVER_ERROR, "Maintenance configuration error").into_response()
        }
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Maintenance check failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
