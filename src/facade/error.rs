//! Control-plane fault definitions.

use std::time::Duration;

use thiserror::Error;

/// Error code the control plane returns when the environment does not exist yet.
pub const INVALID_PARAMETER_VALUE: &str = "InvalidParameterValue";

/// Errors raised by a [`ConfigurationFacade`](super::ConfigurationFacade).
#[derive(Debug, Clone, Error)]
pub enum FacadeError {
    /// The service rejected the request with an error code.
    #[error("service error {code}: {message}")]
    Service { code: String, message: String },

    /// The request never got a service answer.
    #[error("transport error: {0}")]
    Transport(String),

    /// The call exceeded the configured fetch timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl FacadeError {
    /// Build a service fault.
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        FacadeError::Service {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The fault raised for environments that are not provisioned yet.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::service(INVALID_PARAMETER_VALUE, message)
    }

    /// Returns the service error code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            FacadeError::Service { code, .. } => Some(code),
            _ => None,
        }
    }

    /// True for the "invalid parameter" fault, which callers recover locally.
    pub fn is_invalid_parameter(&self) -> bool {
        self.code() == Some(INVALID_PARAMETER_VALUE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_detection() {
        assert!(FacadeError::invalid_parameter("No Environment found").is_invalid_parameter());
        assert!(!FacadeError::service("Throttling", "slow down").is_invalid_parameter());
        assert!(!FacadeError::Transport("reset".into()).is_invalid_parameter());
        assert!(!FacadeError::Timeout(Duration::from_secs(1)).is_invalid_parameter());
    }
}
