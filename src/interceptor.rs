//! Per-request maintenance decision.
//!
//! # Flow
//! ```text
//! RequestView
//!     → SettingsStore::snapshot()      absent artifact → Forward
//!     → policy::is_exempt()            exempt → Forward
//!     → ResponseComposer::compose()    → Intercept(MaintenanceResponse)
//! ```
//!
//! Settings are loaded once per call and passed down explicitly; nothing
//! survives from one request to the next.

use std::path::Path;
use thiserror::Error;

use crate::http::RequestView;
use crate::observability::metrics::{self, Outcome};
use crate::policy;
use crate::response::{ComposeError, MaintenanceResponse, ResponseComposer};
use crate::settings::{SettingsError, SettingsStore};

/// Configuration errors that stop a request from being answered.
#[derive(Debug, Error)]
pub enum MaintenanceError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Compose(#[from] ComposeError),
}

/// Result of the admission decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Hand the request to the wrapped application unchanged.
    Forward,
    /// Answer with the maintenance response instead.
    Intercept(MaintenanceResponse),
}

/// Decides, per request, whether maintenance mode intercepts it.
#[derive(Debug, Clone)]
pub struct Interceptor {
    store: SettingsStore,
    composer: ResponseComposer,
}

impl Interceptor {
    /// Create an interceptor for the application rooted at `app_root`.
    pub fn new(app_root: impl AsRef<Path>) -> Self {
        let app_root = app_root.as_ref();
        Self {
            store: SettingsStore::new(app_root),
            composer: ResponseComposer::new(app_root),
        }
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    /// Decide whether the request is forwarded or intercepted.
    ///
    /// Blocks on filesystem reads of the settings artifact and templates.
    pub fn admit(&self, view: &RequestView) -> Result<Admission, MaintenanceError> {
        let result = self.decide(view);
        let outcome = match &result {
            Ok((outcome, _)) => *outcome,
            Err(_) => Outcome::Error,
        };
        metrics::record_admission(outcome);
        result.map(|(_, admission)| admission)
    }

    /// Run `forward` unless maintenance intercepts the request.
    pub fn handle<R, F>(&self, view: &RequestView, forward: F) -> Result<R, MaintenanceError>
    where
        F: FnOnce(&RequestView) -> R,
        R: From<MaintenanceResponse>,
    {
        match self.admit(view)? {
            Admission::Forward => Ok(forward(view)),
            Admission::Intercept(response) => Ok(R::from(response)),
        }
    }

    fn decide(&self, view: &RequestView) -> Result<(Outcome, Admission), MaintenanceError> {
        let Some(settings) = self.store.snapshot()? else {
            return Ok((Outcome::Forwarded, Admission::Forward));
        };

        if policy::is_exempt(&settings, view) {
            tracing::debug!(path = view.path(), remote_addr = view.remote_addr(), "Request exempt from maintenance");
            return Ok((Outcome::Exempt, Admission::Forward));
        }

        let response = self.composer.compose(&settings, view)?;
        tracing::debug!(
            path = view.path(),
            remote_addr = view.remote_addr(),
            status = %response.status,
            content_type = response.content_type,
            "Request intercepted by maintenance mode"
        );
        Ok((Outcome::Intercepted, Admission::Intercept(response)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use std::fs;
    use tempfile::TempDir;

    /// Stand-in for the wrapped application's response.
    #[derive(Debug, PartialEq)]
    enum Reply {
        App(String),
        Maintenance(StatusCode),
    }

    impl From<MaintenanceResponse> for Reply {
        fn from(response: MaintenanceResponse) -> Self {
            Reply::Maintenance(response.status)
        }
    }

    fn app(view: &RequestView) -> Reply {
        Reply::App(view.path().to_string())
    }

    fn root_with_settings(settings: Option<&str>) -> TempDir {
        let root = TempDir::new().unwrap();
        if let Some(settings) = settings {
            fs::create_dir_all(root.path().join("tmp")).unwrap();
            fs::write(root.path().join("tmp/maintenance.yml"), settings).unwrap();
        }
        root
    }

    #[test]
    fn test_inactive_passes_through() {
        let root = root_with_settings(None);
        let interceptor = Interceptor::new(root.path());

        let reply = interceptor.handle(&RequestView::new("/orders", "1.2.3.4"), app).unwrap();
        assert_eq!(reply, Reply::App("/orders".into()));
    }

    #[test]
    fn test_active_without_rules_intercepts() {
        let root = root_with_settings(Some(""));
        let interceptor = Interceptor::new(root.path());

        let reply = interceptor.handle(&RequestView::new("/orders", "1.2.3.4"), app).unwrap();
        assert_eq!(reply, Reply::Maintenance(StatusCode::SERVICE_UNAVAILABLE));
    }

    #[test]
    fn test_json_client_gets_ok_status() {
        let root = root_with_settings(Some("reason: upgrade\n"));
        let interceptor = Interceptor::new(root.path());
        let view = RequestView::new("/api", "1.2.3.4").with_accept("application/json");

        assert_eq!(interceptor.handle(&view, app).unwrap(), Reply::Maintenance(StatusCode::OK));
    }

    #[test]
    fn test_allowed_path_passes_through() {
        let root = root_with_settings(Some("allowed_paths:\n  - ^/health$\n"));
        let interceptor = Interceptor::new(root.path());
        let view = RequestView::new("/health", "1.2.3.4").with_accept("application/json");

        assert_eq!(interceptor.admit(&view).unwrap(), Admission::Forward);
    }

    #[test]
    fn test_allowed_ip_passes_through() {
        let root = root_with_settings(Some("allowed_ips:\n  - 10.0.0.0/8\n"));
        let interceptor = Interceptor::new(root.path());

        assert_eq!(
            interceptor.admit(&RequestView::new("/", "10.1.2.3")).unwrap(),
            Admission::Forward
        );
        assert!(matches!(
            interceptor.admit(&RequestView::new("/", "192.168.1.1")).unwrap(),
            Admission::Intercept(_)
        ));
    }

    #[test]
    fn test_toggle_takes_effect_on_next_request() {
        let root = root_with_settings(None);
        let interceptor = Interceptor::new(root.path());
        let view = RequestView::new("/", "1.2.3.4");

        assert_eq!(interceptor.admit(&view).unwrap(), Admission::Forward);

        fs::create_dir_all(root.path().join("tmp")).unwrap();
        fs::write(root.path().join("tmp/maintenance.yml"), "").unwrap();
        assert!(matches!(interceptor.admit(&view).unwrap(), Admission::Intercept(_)));

        fs::remove_file(root.path().join("tmp/maintenance.yml")).unwrap();
        assert_eq!(interceptor.admit(&view).unwrap(), Admission::Forward);
    }

    #[test]
    fn test_broken_settings_surface_as_error() {
        let root = root_with_settings(Some("allowed_paths: [\n"));
        let interceptor = Interceptor::new(root.path());

        let result = interceptor.handle(&RequestView::new("/", "1.2.3.4"), app);
        assert!(matches!(result, Err(MaintenanceError::Settings(_))));
    }
}
