//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → middleware/authorization.rs (per-route requirement)
//!     → function.rs / admin handlers
//!     → Send to client
//! ```

pub mod function;
pub mod middleware;
pub mod request;
pub mod routes;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use routes::{RegisteredRoute, RouteTable};
pub use server::HttpServer;
