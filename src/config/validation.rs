//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the environment identity is complete
//! - Validate value ranges and log levels
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ToolConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::ToolConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Missing(&'static str),

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),

    #[error("snapshot.watch requires snapshot.path")]
    WatchWithoutSnapshot,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ToolConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.environment.environment_name.trim().is_empty() {
        errors.push(ValidationError::Missing("environment.environment_name"));
    }
    if config.environment.application_name.trim().is_empty() {
        errors.push(ValidationError::Missing("environment.application_name"));
    }
    if config.refresh.change_buffer == 0 {
        errors.push(ValidationError::NotPositive {
            field: "refresh.change_buffer",
        });
    }
    if config.snapshot.watch {
        if config.snapshot.path.is_none() {
            errors.push(ValidationError::WatchWithoutSnapshot);
        }
        if config.snapshot.poll_interval_secs == 0 {
            errors.push(ValidationError::NotPositive {
                field: "snapshot.poll_interval_secs",
            });
        }
    }
    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
