//! Configuration model subsystem.
//!
//! # Data Flow
//! ```text
//! refresh(template)
//!     → cancel previous refresh, bump generation
//!     → spawned task: describe_options + current_settings (facade)
//!     → commit point (commit lock): stale? discard silently
//!     → init: decode + merge into entries
//!         → entry watch channels (per-key observers)
//!         → change bus (model-wide observers)
//!     → listeners: started / finished / error
//!
//! export()
//!     → entries → wire settings (empty lists omitted)
//!
//! importable_environments()
//!     → describe_environments (facade)
//!     → drop terminated/terminating and already registered environments
//! ```
//!
//! # Design Decisions
//! - One shared handle per key; bindings compare handles by pointer
//! - Merges never notify for equivalent values
//! - Models are owned by a session-scoped registry, not a global table

pub mod entry;
pub mod import;
pub mod key;
pub mod listener;
pub mod refresh;
pub mod registry;
pub mod store;
pub mod value;

pub use entry::{ObservableEntry, ValueChange};
pub use import::{import_environment, importable_environments};
pub use key::OptionKey;
pub use listener::{ChannelListener, ListenerId, RefreshEvent, RefreshListener};
pub use refresh::{RefreshError, RefreshHandle, RefreshOutcome};
pub use registry::ModelRegistry;
pub use store::{settings_map, ConfigModel, SettingsMap, WriteError};
pub use value::OptionValue;
