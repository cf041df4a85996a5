//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Connection routine produces:
//!     → logging.rs (structured log events, one span per connection)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
