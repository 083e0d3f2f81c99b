//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap control-plane calls with an optional deadline
//! - Report expiry as a distinct `FacadeError::Timeout`
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - A missing deadline means the call runs until the facade answers

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time;

use crate::facade::{
    ConfigurationFacade, EnvironmentSummary, FacadeError, OptionDescriptor, SettingsDescription,
    SettingsTarget,
};

/// Run `fut` with the given deadline, if any.
pub async fn with_deadline<T, F>(deadline: Option<Duration>, fut: F) -> Result<T, FacadeError>
where
    F: Future<Output = Result<T, FacadeError>>,
{
    match deadline {
        Some(limit) => match time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(FacadeError::Timeout(limit)),
        },
        None => fut.await,
    }
}

/// Facade wrapper applying a per-call deadline.
pub struct TimeoutFacade {
    inner: Arc<dyn ConfigurationFacade>,
    deadline: Option<Duration>,
}

impl TimeoutFacade {
    pub fn new(inner: Arc<dyn ConfigurationFacade>, deadline: Option<Duration>) -> Self {
        Self { inner, deadline }
    }
}

#[async_trait]
impl ConfigurationFacade for TimeoutFacade {
    async fn describe_options(
        &self,
        environment_name: &str,
    ) -> Result<Vec<OptionDescriptor>, FacadeError> {
        with_deadline(self.deadline, self.inner.describe_options(environment_name)).await
    }

    async fn current_settings(
        &self,
        target: &SettingsTarget,
    ) -> Result<Vec<SettingsDescription>, FacadeError> {
        with_deadline(self.deadline, self.inner.current_settings(target)).await
    }

    async fn describe_environments(&self) -> Result<Vec<EnvironmentSummary>, FacadeError> {
        with_deadline(self.deadline, self.inner.describe_environments()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stalled;

    #[async_trait]
    impl ConfigurationFacade for Stalled {
        async fn describe_options(&self, _: &str) -> Result<Vec<OptionDescriptor>, FacadeError> {
            time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }

        async fn current_settings(
            &self,
            _: &SettingsTarget,
        ) -> Result<Vec<SettingsDescription>, FacadeError> {
            Ok(Vec::new())
        }

        async fn describe_environments(&self) -> Result<Vec<EnvironmentSummary>, FacadeError> {
            time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_deadline_expires() {
        let facade = TimeoutFacade::new(Arc::new(Stalled), Some(Duration::from_millis(50)));
        let err = facade.describe_options("env").await.unwrap_err();
        assert!(matches!(err, FacadeError::Timeout(d) if d == Duration::from_millis(50)));

        let err = facade.describe_environments().await.unwrap_err();
        assert!(matches!(err, FacadeError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_no_deadline_passes_through() {
        let facade = TimeoutFacade::new(Arc::new(Stalled), None);
        let target = SettingsTarget::Environment {
            environment_name: "env".into(),
        };
        assert!(facade.current_settings(&target).await.unwrap().is_empty());
    }
}
