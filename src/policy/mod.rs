//! Access policy: which requests bypass maintenance.
//!
//! # Responsibilities
//! - Exempt requests whose path matches an `allowed_paths` pattern
//! - Exempt requests whose client address is in an `allowed_ips` range
//!
//! A request is exempt if either dimension allows it. Absent lists exempt nothing.

pub mod matcher;

pub use matcher::{any_match, IpRangeMatcher, Matcher, PathPatternMatcher};

use crate::http::RequestView;
use crate::settings::MaintenanceSettings;

/// Returns true if the request should reach the application despite maintenance.
pub fn is_exempt(settings: &MaintenanceSettings, view: &RequestView) -> bool {
    path_allowed(settings, view) || ip_allowed(settings, view)
}

/// Returns true if any configured pattern occurs in the request path.
pub fn path_allowed(settings: &MaintenanceSettings, view: &RequestView) -> bool {
    any_match(&settings.allowed_paths, view)
}

/// Returns true if the client address parses and lies in a configured range.
pub fn ip_allowed(settings: &MaintenanceSettings, view: &RequestView) -> bool {
    any_match(&settings.allowed_ips, view)
}
