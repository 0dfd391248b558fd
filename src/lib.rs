//! Maintenance mode for HTTP applications.
//!
//! While `<app_root>/tmp/maintenance.yml` exists, requests are answered with a
//! maintenance page (HTML) or document (JSON) instead of reaching the
//! application, except for clients matching the configured allowed paths or
//! addresses.

pub mod config;
pub mod http;
pub mod interceptor;
pub mod observability;
pub mod policy;
pub mod response;
pub mod settings;

pub use config::ServerConfig;
pub use http::{maintenance_middleware, HttpServer, MaintenanceState, RequestView};
pub use interceptor::{Admission, Interceptor, MaintenanceError};
pub use response::{MaintenanceResponse, ResponseKind};
pub use settings::{MaintenanceSettings, SettingsFile, SettingsStore};
