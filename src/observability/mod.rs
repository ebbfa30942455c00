//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, histograms via `metrics`)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through logs and the content backend
//! - Metric updates are no-ops until a recorder is installed, so library
//!   users and tests pay nothing
//! - Labels are closed sets (outcome, method, reason, status)

pub mod logging;
pub mod metrics;
