//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ToolConfig (validated, immutable)
//!
//! Snapshot hot reload:
//!     watcher.rs detects change
//!     → Snapshot::load
//!     → SnapshotFacade::replace (atomic swap)
//!     → ConfigModel::refresh (supersedes any refresh in flight)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ObservabilityConfig, RefreshConfig, SnapshotConfig, ToolConfig};
pub use watcher::SnapshotWatcher;
