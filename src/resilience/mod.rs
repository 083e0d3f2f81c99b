//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Refresh task → control-plane call:
//!     → timeouts.rs (optional per-call deadline)
//!     → On expiry: FacadeError::Timeout, surfaced as a refresh error
//! ```
//!
//! # Design Decisions
//! - Deadlines are opt-in; the refresh protocol does not depend on them
//! - No retries: a failed refresh is reported and the caller decides

pub mod timeouts;
