//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! interceptor / middleware / server produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (admission counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
