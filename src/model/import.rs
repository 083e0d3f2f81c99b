//! Discovery of environments that can be imported into a session.

use std::sync::Arc;

use crate::facade::{ConfigurationFacade, EnvironmentSummary, FacadeError};
use crate::model::registry::ModelRegistry;
use crate::model::store::ConfigModel;

/// Environments of the account and region that are still running and not yet
/// registered in `registry`, in the order the control plane lists them.
pub async fn importable_environments(
    facade: &dyn ConfigurationFacade,
    account_id: &str,
    region_endpoint: &str,
    registry: &ModelRegistry,
) -> Result<Vec<EnvironmentSummary>, FacadeError> {
    let listed = facade.describe_environments().await?;
    let total = listed.len();
    let importable: Vec<EnvironmentSummary> = listed
        .into_iter()
        .filter(|env| env.is_active())
        .filter(|env| !registry.contains(&env.to_record(account_id, region_endpoint).id()))
        .collect();
    tracing::debug!(
        listed = total,
        importable = importable.len(),
        "Listed importable environments"
    );
    Ok(importable)
}

/// Register `summary` and return its model.
pub fn import_environment(
    registry: &ModelRegistry,
    summary: &EnvironmentSummary,
    account_id: &str,
    region_endpoint: &str,
) -> Arc<ConfigModel> {
    tracing::info!(
        environment = %summary.environment_name,
        application = %summary.application_name,
        "Importing environment"
    );
    registry.model(&summary.to_record(account_id, region_endpoint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::snapshot::InjectedFault;
    use crate::facade::{Snapshot, SnapshotFacade};

    const ACCOUNT: &str = "123";
    const REGION: &str = "eb.us-east-1";

    fn summary(name: &str, status: &str) -> EnvironmentSummary {
        EnvironmentSummary {
            environment_name: name.into(),
            application_name: "shop".into(),
            status: status.into(),
            ..Default::default()
        }
    }

    fn names(environments: &[EnvironmentSummary]) -> Vec<&str> {
        environments
            .iter()
            .map(|env| env.environment_name.as_str())
            .collect()
    }

    #[tokio::test]
    async fn test_retired_and_registered_environments_are_skipped() {
        let facade = Arc::new(SnapshotFacade::new(Snapshot {
            environments: vec![
                summary("shop-prod", "Ready"),
                summary("shop-old", "Terminated"),
                summary("shop-dying", "Terminating"),
                summary("shop-new", "Launching"),
                summary("shop-qa", "Ready"),
            ],
            ..Default::default()
        }));
        let registry = ModelRegistry::with_facade(facade.clone());

        let found = importable_environments(facade.as_ref(), ACCOUNT, REGION, &registry)
            .await
            .unwrap();
        assert_eq!(names(&found), vec!["shop-prod", "shop-new", "shop-qa"]);

        let model = import_environment(&registry, &found[0], ACCOUNT, REGION);
        assert_eq!(model.environment().environment_name, "shop-prod");

        let found = importable_environments(facade.as_ref(), ACCOUNT, REGION, &registry)
            .await
            .unwrap();
        assert_eq!(names(&found), vec!["shop-new", "shop-qa"]);

        let elsewhere =
            importable_environments(facade.as_ref(), ACCOUNT, "eb.eu-west-1", &registry)
                .await
                .unwrap();
        assert_eq!(elsewhere.len(), 3);
    }

    #[tokio::test]
    async fn test_listing_fault_is_returned() {
        let facade = SnapshotFacade::new(Snapshot {
            fault: Some(InjectedFault {
                code: "Throttling".into(),
                message: "Rate exceeded".into(),
            }),
            ..Default::default()
        });
        let registry =
            ModelRegistry::with_facade(Arc::new(SnapshotFacade::new(Snapshot::default())));
        let err = importable_environments(&facade, ACCOUNT, REGION, &registry)
            .await
            .unwrap_err();
        assert_eq!(err.code(), Some("Throttling"));
    }
}
