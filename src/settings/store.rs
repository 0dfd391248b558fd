//! Maintenance settings artifact on disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::settings::schema::{MaintenanceSettings, SettingsFile};

/// Location of the settings artifact relative to the application root.
pub const SETTINGS_RELATIVE_PATH: &str = "tmp/maintenance.yml";

/// Errors raised while reading or writing the settings artifact.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The artifact exists but could not be read or written.
    #[error("maintenance settings IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The artifact is not valid YAML or has the wrong shape.
    #[error("maintenance settings at {path} could not be parsed: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Settings could not be encoded for writing.
    #[error("maintenance settings could not be serialized: {0}")]
    Serialize(#[source] serde_yaml::Error),

    /// An `allowed_paths` entry is not a valid regular expression.
    #[error("invalid allowed_paths pattern {pattern:?}: {source}")]
    InvalidPathPattern {
        pattern: String,
        #[source]
        source: fancy_regex::Error,
    },

    /// The `reason` value has no JSON equivalent (e.g. a mapping with non-string keys).
    #[error("invalid reason: {0}")]
    InvalidReason(#[source] serde_json::Error),

    /// An `allowed_ips` entry is neither an IP address nor a CIDR block.
    #[error("invalid allowed_ips entry {entry:?}: {source}")]
    InvalidIpRange {
        entry: String,
        #[source]
        source: ipnet::AddrParseError,
    },
}

/// Reads (and for operators, writes) `<app_root>/tmp/maintenance.yml`.
///
/// Nothing is cached: every call goes back to the filesystem, so toggling the
/// artifact takes effect on the next request.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(app_root: impl AsRef<Path>) -> Self {
        Self {
            path: app_root.as_ref().join(SETTINGS_RELATIVE_PATH),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Maintenance is active iff the artifact exists.
    pub fn is_active(&self) -> bool {
        self.path.exists()
    }

    /// Load validated settings; empty settings when the artifact is absent.
    pub fn load(&self) -> Result<MaintenanceSettings, SettingsError> {
        Ok(self.snapshot()?.unwrap_or_default())
    }

    /// Read the artifact once. `None` means maintenance is inactive.
    pub fn snapshot(&self) -> Result<Option<MaintenanceSettings>, SettingsError> {
        self.read_file()?
            .map(MaintenanceSettings::try_from)
            .transpose()
    }

    /// Read the raw artifact. An empty or `null` document yields empty settings.
    pub fn read_file(&self) -> Result<Option<SettingsFile>, SettingsError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SettingsError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Some(SettingsFile::default()));
        }

        let file: Option<SettingsFile> =
            serde_yaml::from_str(&content).map_err(|source| SettingsError::Parse {
                path: self.path.clone(),
                source,
            })?;

        Ok(Some(file.unwrap_or_default()))
    }

    /// Turn maintenance on with the given settings.
    ///
    /// Settings are validated first so a bad entry never reaches live traffic.
    pub fn enable(&self, file: &SettingsFile) -> Result<(), SettingsError> {
        MaintenanceSettings::try_from(file.clone())?;

        let yaml = serde_yaml::to_string(file).map_err(SettingsError::Serialize)?;
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|source| self.io_error(source))?;
        }
        fs::write(&self.path, yaml).map_err(|source| self.io_error(source))?;

        tracing::info!(path = %self.path.display(), "Maintenance mode enabled");
        Ok(())
    }

    /// Turn maintenance off. Returns false if it was not on.
    pub fn disable(&self) -> Result<bool, SettingsError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Maintenance mode disabled");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: io::Error) -> SettingsError {
        SettingsError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
