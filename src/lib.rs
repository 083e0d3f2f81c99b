//! Observable configuration model for Elastic Beanstalk environments.

pub mod config;
pub mod facade;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod resilience;

pub use config::ToolConfig;
pub use facade::{ConfigurationFacade, FacadeError, OptionDescriptor, OptionSetting};
pub use model::{ConfigModel, ModelRegistry, OptionKey, OptionValue};
