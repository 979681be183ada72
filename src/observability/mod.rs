//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! resolver / bypass / secret fetches
//!     → logging.rs (structured events, never secret values)
//!     → metrics.rs (counters and fetch latency)
//! ```

pub mod logging;
pub mod metrics;
