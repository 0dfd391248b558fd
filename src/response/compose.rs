//! Composition of the substitute maintenance response.

use axum::body::Bytes;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use lol_html::html_content::ContentType;
use lol_html::{element, HtmlRewriter, Settings};
use serde_json::Value;
use std::borrow::Cow;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::http::RequestView;
use crate::response::negotiation::ResponseKind;
use crate::response::template::TemplateSource;
use crate::settings::MaintenanceSettings;

/// Selector of the element that receives the reason text.
pub const REASON_SELECTOR: &str = "#reason";

/// Key set on the JSON document.
pub const REASON_KEY: &str = "reason";

/// Errors raised while building a maintenance response.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The template could not be read.
    #[error("failed to read maintenance template {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The JSON template is not valid JSON.
    #[error("invalid JSON maintenance template: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON template's root is not an object, so no `reason` can be set.
    #[error("JSON maintenance template must be an object")]
    JsonNotObject,

    /// The HTML template could not be rewritten.
    #[error("failed to rewrite HTML maintenance template: {0}")]
    Html(#[from] lol_html::errors::RewritingError),
}

/// Response returned in place of the application's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceResponse {
    pub kind: ResponseKind,
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Bytes,
}

impl MaintenanceResponse {
    fn new(kind: ResponseKind, body: Bytes) -> Self {
        Self {
            kind,
            status: kind.status(),
            content_type: kind.content_type(),
            body,
        }
    }

    /// Exact byte length of the body.
    pub fn content_length(&self) -> usize {
        self.body.len()
    }
}

impl IntoResponse for MaintenanceResponse {
    fn into_response(self) -> Response {
        let headers = [
            (header::CONTENT_TYPE, HeaderValue::from_static(self.content_type)),
            (header::CONTENT_LENGTH, HeaderValue::from(self.content_length())),
        ];
        (self.status, headers, self.body).into_response()
    }
}

/// Builds maintenance responses from templates and settings.
#[derive(Debug, Clone)]
pub struct ResponseComposer {
    templates: TemplateSource,
}

impl ResponseComposer {
    pub fn new(app_root: impl AsRef<Path>) -> Self {
        Self {
            templates: TemplateSource::new(app_root),
        }
    }

    /// Negotiate, load the template, inject the reason, and measure the body.
    pub fn compose(
        &self,
        settings: &MaintenanceSettings,
        view: &RequestView,
    ) -> Result<MaintenanceResponse, ComposeError> {
        let kind = ResponseKind::negotiate(view.accept());
        let template = self
            .templates
            .load(kind)
            .map_err(|source| ComposeError::Template {
                path: self.templates.override_path(kind),
                source,
            })?;

        let body = match settings.reason() {
            Some(reason) => Bytes::from(inject_reason(kind, &template.bytes, reason)?),
            None => match template.bytes {
                Cow::Borrowed(bytes) => Bytes::from_static(bytes),
                Cow::Owned(bytes) => Bytes::from(bytes),
            },
        };

        Ok(MaintenanceResponse::new(kind, body))
    }
}

/// Dispatch reason injection to the transform for `kind`.
///
/// JSON keeps the reason's type; HTML gets strings as-is and anything else in
/// its JSON text form, so `2024` becomes `2024` and `true` becomes `true`.
pub fn inject_reason(kind: ResponseKind, template: &[u8], reason: &Value) -> Result<Vec<u8>, ComposeError> {
    match kind {
        ResponseKind::Json => inject_json_reason(template, reason),
        ResponseKind::Html => {
            let text = match reason {
                Value::String(s) => Cow::Borrowed(s.as_str()),
                other => Cow::Owned(other.to_string()),
            };
            inject_html_reason(template, &text)
        }
    }
}

/// Set (or replace) the top-level `reason` field. Key order is preserved.
pub fn inject_json_reason(template: &[u8], reason: &Value) -> Result<Vec<u8>, ComposeError> {
    let mut document: Value = serde_json::from_slice(template)?;
    let object = document.as_object_mut().ok_or(ComposeError::JsonNotObject)?;
    object.insert(REASON_KEY.to_string(), reason.clone());
    Ok(serde_json::to_vec(&document)?)
}

/// Replace the inner content of the first `#reason` element with `reason` as raw HTML.
///
/// Templates without such an element pass through unchanged.
pub fn inject_html_reason(template: &[u8], reason: &str) -> Result<Vec<u8>, ComposeError> {
    let mut output = Vec::with_capacity(template.len() + reason.len());
    let mut injected = false;

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![element!(REASON_SELECTOR, |el| {
                if !injected {
                    el.set_inner_content(reason, ContentType::Html);
                    injected = true;
                }
                Ok(())
            })],
            ..Settings::new()
        },
        |chunk: &[u8]| output.extend_from_slice(chunk),
    );
    rewriter.write(template)?;
    rewriter.end()?;

    if !injected {
        tracing::warn!(
            selector = REASON_SELECTOR,
            "Maintenance template has no reason element; serving it unchanged"
        );
    }

    Ok(output)
}
