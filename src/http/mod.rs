//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace / request ID / timeout layers)
//!     → middleware.rs (maintenance check)
//!         → request.rs (RequestView: path, client address, Accept)
//!         → interceptor (forward or answer with the maintenance page)
//!     → server.rs proxy handler (forward to upstream)
//! ```

pub mod middleware;
pub mod request;
pub mod server;

pub use middleware::{maintenance_middleware, MaintenanceState};
pub use request::RequestView;
pub use server::HttpServer;
