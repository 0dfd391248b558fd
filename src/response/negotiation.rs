//! Content negotiation between the JSON and HTML maintenance responses.

use axum::http::StatusCode;

/// Representation chosen for an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    Json,
    Html,
}

impl ResponseKind {
    /// Choose a representation from the `Accept` header.
    ///
    /// JSON only when a hint is present and does not mention `html` anywhere;
    /// this is a substring test, so `*/*` selects JSON and no header selects HTML.
    pub fn negotiate(accept: Option<&str>) -> Self {
        match accept {
            Some(accept) if !accept.contains("html") => ResponseKind::Json,
            _ => ResponseKind::Html,
        }
    }

    /// Status code for the representation: 200 for JSON, 503 for HTML.
    pub fn status(self) -> StatusCode {
        match self {
            ResponseKind::Json => StatusCode::OK,
            ResponseKind::Html => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ResponseKind::Json => "application/json",
            ResponseKind::Html => "text/html",
        }
    }

    /// Template file name, both for overrides and bundled defaults.
    pub fn file_name(self) -> &'static str {
        match self {
            ResponseKind::Json => "maintenance.json",
            ResponseKind::Html => "maintenance.html",
        }
    }
}
