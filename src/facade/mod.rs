//! Control-plane facade subsystem.
//!
//! # Data Flow
//! ```text
//! ConfigModel refresh task
//!     → ConfigurationFacade::describe_options (schema)
//!     → ConfigurationFacade::current_settings (environment or template)
//!
//! model::import::importable_environments
//!     → ConfigurationFacade::describe_environments (account/region listing)
//!
//! Implementations:
//!     snapshot.rs  (file/in-memory snapshot, hot-swappable)
//!     resilience::timeouts::TimeoutFacade (per-call deadline wrapper)
//! ```
//!
//! # Design Decisions
//! - The model only sees this trait; credentials and endpoints stay outside
//! - Faults carry the service error code so callers can recognise
//!   "environment not provisioned yet"
//! - Environment attributes and settings inspection live in environment.rs

pub mod environment;
pub mod error;
pub mod snapshot;
pub mod types;

use async_trait::async_trait;

pub use environment::{EnvironmentId, EnvironmentRecord, EnvironmentSummary};
pub use error::FacadeError;
pub use snapshot::{Snapshot, SnapshotFacade};
pub use types::{OptionDescriptor, OptionSetting, SettingsDescription, SettingsTarget, ValueType};

/// Abstract access to the configuration APIs of one account/region.
#[async_trait]
pub trait ConfigurationFacade: Send + Sync {
    /// Describe the options available to the named environment.
    ///
    /// Fails with an `InvalidParameterValue` service fault when the
    /// environment does not exist yet.
    async fn describe_options(
        &self,
        environment_name: &str,
    ) -> Result<Vec<OptionDescriptor>, FacadeError>;

    /// Fetch the current settings of an environment or a saved template.
    async fn current_settings(
        &self,
        target: &SettingsTarget,
    ) -> Result<Vec<SettingsDescription>, FacadeError>;

    /// List the environments of the account and region, whatever their status.
    async fn describe_environments(&self) -> Result<Vec<EnvironmentSummary>, FacadeError>;
}
