//! Request facts consumed by the maintenance decision.
//!
//! # Responsibilities
//! - Extract the request path, client address and `Accept` hint
//! - Resolve the client address from the socket or `X-Forwarded-For`
//!
//! Only the right-most `X-Forwarded-For` entry is used: it is the one appended
//! by the proxy in front of us. Entries to its left are client-supplied.
//!
//! # Design Decisions
//! - The view owns plain strings so it can cross into blocking tasks
//! - An unparsable client address is kept verbatim; matching decides what it means

use axum::extract::ConnectInfo;
use axum::http::{header, Request};
use std::net::{IpAddr, SocketAddr};

/// Header carrying the proxy chain when the proxy sits behind a load balancer.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Read-only view of the request facts the maintenance decision needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestView {
    path: String,
    remote_addr: String,
    accept: Option<String>,
}

impl RequestView {
    pub fn new(path: impl Into<String>, remote_addr: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            remote_addr: remote_addr.into(),
            accept: None,
        }
    }

    /// Set the content-negotiation hint (the `Accept` header value).
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Build a view from an incoming request.
    ///
    /// The client address comes from `ConnectInfo` when the server was started
    /// with connect info, and is empty otherwise. With `trust_forwarded_for`,
    /// the right-most `X-Forwarded-For` entry wins over the socket address.
    pub fn from_request<B>(req: &Request<B>, trust_forwarded_for: bool) -> Self {
        let forwarded = if trust_forwarded_for {
            req.headers()
                .get(X_FORWARDED_FOR)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.rsplit(',').next())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        } else {
            None
        };

        let remote_addr = forwarded.unwrap_or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
                .unwrap_or_default()
        });

        let accept = req
            .headers()
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self {
            path: req.uri().path().to_string(),
            remote_addr,
            accept,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Client address exactly as received.
    pub fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    pub fn accept(&self) -> Option<&str> {
        self.accept.as_deref()
    }

    /// Client address parsed as an IP literal, `None` when malformed or absent.
    pub fn ip(&self) -> Option<IpAddr> {
        self.remote_addr.trim().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_from(addr: &str) -> Request<Body> {
        let mut req = Request::builder()
            .uri("/admin/login?next=/")
            .header("Accept", "application/json")
            .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(addr.parse::<SocketAddr>().unwrap()));
        req
    }

    #[test]
    fn test_extracts_path_accept_and_socket_address() {
        let view = RequestView::from_request(&request_from("10.1.2.3:5555"), false);

        assert_eq!(view.path(), "/admin/login");
        assert_eq!(view.accept(), Some("application/json"));
        assert_eq!(view.remote_addr(), "10.1.2.3");
        assert_eq!(view.ip(), Some("10.1.2.3".parse().unwrap()));
    }

    #[test]
    fn test_forwarded_for_used_only_when_trusted() {
        let req = request_from("10.1.2.3:5555");

        let trusted = RequestView::from_request(&req, true);
        assert_eq!(trusted.remote_addr(), "10.0.0.1");

        let untrusted = RequestView::from_request(&req, false);
        assert_eq!(untrusted.remote_addr(), "10.1.2.3");
    }

    #[test]
    fn test_forwarded_for_ignores_client_supplied_entries() {
        let mut req = request_from("10.0.0.254:5555");
        req.headers_mut().insert(
            X_FORWARDED_FOR,
            "10.1.1.1, 198.51.100.9".parse().unwrap(),
        );

        let view = RequestView::from_request(&req, true);
        assert_eq!(view.remote_addr(), "198.51.100.9");
    }

    #[test]
    fn test_empty_forwarded_for_falls_back_to_socket() {
        let mut req = request_from("10.1.2.3:5555");
        req.headers_mut().insert(X_FORWARDED_FOR, " ".parse().unwrap());

        let view = RequestView::from_request(&req, true);
        assert_eq!(view.remote_addr(), "10.1.2.3");
    }

    #[test]
    fn test_missing_connect_info_leaves_address_empty() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let view = RequestView::from_request(&req, false);

        assert_eq!(view.remote_addr(), "");
        assert_eq!(view.ip(), None);
        assert_eq!(view.accept(), None);
    }
}
