//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → watch loop exits → refresh in flight cancelled → exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
