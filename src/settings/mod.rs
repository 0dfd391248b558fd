//! Maintenance settings subsystem.
//!
//! # Data Flow
//! ```text
//! <app_root>/tmp/maintenance.yml
//!     → store.rs (presence check, read, YAML decode)
//!     → schema.rs (SettingsFile → MaintenanceSettings, entries compiled)
//!     → handed to the policy and response subsystems for one request
//! ```
//!
//! # Design Decisions
//! - Presence of the artifact alone switches maintenance on
//! - Re-read on every request; no cache, no watcher
//! - Malformed documents and malformed allow-list entries are errors, never "inactive"

pub mod schema;
pub mod store;

pub use schema::{MaintenanceSettings, SettingsFile};
pub use store::{SettingsError, SettingsStore, SETTINGS_RELATIVE_PATH};
