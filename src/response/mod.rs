//! Maintenance response composition.
//!
//! # Data Flow
//! ```text
//! Accept header
//!     → negotiation.rs (ResponseKind::Json | ResponseKind::Html)
//!     → template.rs (public/ override, else bundled default)
//!     → compose.rs (reason injected into JSON field or #reason element)
//!     → MaintenanceResponse (status, content type, length, body)
//! ```

pub mod compose;
pub mod negotiation;
pub mod template;

pub use compose::{ComposeError, MaintenanceResponse, ResponseComposer};
pub use negotiation::ResponseKind;
pub use template::{Template, TemplateOrigin, TemplateSource};
