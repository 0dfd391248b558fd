//! Maintenance settings definitions.
//!
//! `SettingsFile` mirrors the YAML artifact; `MaintenanceSettings` is the
//! validated form the request pipeline works with.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::policy::{IpRangeMatcher, PathPatternMatcher};
use crate::settings::store::SettingsError;

/// Raw contents of `tmp/maintenance.yml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SettingsFile {
    /// Regex patterns; a match anywhere in the path lets the request through.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_paths: Option<Vec<String>>,

    /// Client addresses or CIDR blocks that bypass maintenance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_ips: Option<Vec<String>>,

    /// Text (may contain HTML) shown to intercepted clients. Any YAML value
    /// is accepted and kept as decoded, so `reason: 2024` stays a number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<serde_yaml::Value>,
}

/// Validated maintenance settings for one request.
#[derive(Debug, Clone, Default)]
pub struct MaintenanceSettings {
    pub allowed_paths: Vec<PathPatternMatcher>,
    pub allowed_ips: Vec<IpRangeMatcher>,
    pub reason: Option<Value>,
}

impl MaintenanceSettings {
    /// Reason to inject, if any. `null`, `false` and the empty string count as absent.
    pub fn reason(&self) -> Option<&Value> {
        self.reason.as_ref().filter(|r| match r {
            Value::Null | Value::Bool(false) => false,
            Value::String(s) => !s.is_empty(),
            _ => true,
        })
    }
}

impl TryFrom<SettingsFile> for MaintenanceSettings {
    type Error = SettingsError;

    fn try_from(file: SettingsFile) -> Result<Self, Self::Error> {
        let allowed_paths = file
            .allowed_paths
            .unwrap_or_default()
            .iter()
            .map(|pattern| {
                PathPatternMatcher::new(pattern).map_err(|source| SettingsError::InvalidPathPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let allowed_ips = file
            .allowed_ips
            .unwrap_or_default()
            .iter()
            .map(|entry| {
                IpRangeMatcher::new(entry).map_err(|source| SettingsError::InvalidIpRange {
                    entry: entry.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let reason = file
            .reason
            .map(|reason| serde_json::to_value(&reason))
            .transpose()
            .map_err(SettingsError::InvalidReason)?;

        Ok(Self {
            allowed_paths,
            allowed_ips,
            reason,
        })
    }
}
