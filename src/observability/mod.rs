//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Model and facades produce:
//!     → logging.rs (structured log events, refresh spans)
//!     → metrics.rs (refresh outcomes, merge counts, schema size)
//!
//! Consumers:
//!     → stdout via tracing-subscriber (binary)
//!     → any `metrics` recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - Every refresh runs inside a span carrying environment and generation
//! - Metrics are cheap when no recorder is installed

pub mod logging;
pub mod metrics;
