//! Maintenance page templates.
//!
//! # Responsibilities
//! - Prefer `<app_root>/public/maintenance.{html,json}` when present
//! - Fall back to the defaults compiled into the crate
//!
//! # Design Decisions
//! - Overrides are read from disk on every call so edits show up immediately
//! - Only a missing override falls back; one that exists but cannot be read is an error
//! - Defaults are embedded, so a missing override can never leave a request without a body

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::response::negotiation::ResponseKind;

/// Bundled HTML page; the reason goes into the element with id `reason`.
pub const DEFAULT_HTML: &str = include_str!("../../public/maintenance.html");

/// Bundled JSON document.
pub const DEFAULT_JSON: &str = include_str!("../../public/maintenance.json");

/// Directory under the application root holding template overrides.
pub const OVERRIDE_DIR: &str = "public";

/// Where a template came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateOrigin {
    Override(PathBuf),
    Bundled,
}

/// Template bytes ready for composition.
#[derive(Debug, Clone)]
pub struct Template {
    pub origin: TemplateOrigin,
    pub bytes: Cow<'static, [u8]>,
}

/// Resolves templates for an application root.
#[derive(Debug, Clone)]
pub struct TemplateSource {
    override_dir: PathBuf,
}

impl TemplateSource {
    pub fn new(app_root: impl AsRef<Path>) -> Self {
        Self {
            override_dir: app_root.as_ref().join(OVERRIDE_DIR),
        }
    }

    /// Path an application override for `kind` would live at.
    pub fn override_path(&self, kind: ResponseKind) -> PathBuf {
        self.override_dir.join(kind.file_name())
    }

    /// Load the template for `kind`. IO errors on an existing override propagate.
    pub fn load(&self, kind: ResponseKind) -> io::Result<Template> {
        let path = self.override_path(kind);
        match fs::read(&path) {
            Ok(bytes) => {
                return Ok(Template {
                    origin: TemplateOrigin::Override(path),
                    bytes: Cow::Owned(bytes),
                })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        let bundled = match kind {
            ResponseKind::Json => DEFAULT_JSON,
            ResponseKind::Html => DEFAULT_HTML,
        };
        Ok(Template {
            origin: TemplateOrigin::Bundled,
            bytes: Cow::Borrowed(bundled.as_bytes()),
        })
    }
}
