//! Per-session model registry.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::runtime::Handle;

use crate::facade::{ConfigurationFacade, EnvironmentId, EnvironmentRecord};
use crate::model::store::{ConfigModel, DEFAULT_CHANGE_BUFFER};

/// Builds the facade used by a newly created model.
pub type FacadeFactory =
    Arc<dyn Fn(&EnvironmentRecord) -> Arc<dyn ConfigurationFacade> + Send + Sync>;

/// Owns one [`ConfigModel`] per environment for the lifetime of the session
/// that holds the registry.
pub struct ModelRegistry {
    models: DashMap<EnvironmentId, Arc<ConfigModel>>,
    facades: FacadeFactory,
    change_buffer: usize,
    runtime: Handle,
}

impl ModelRegistry {
    /// Create a registry bound to the current Tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn new(facades: FacadeFactory) -> Self {
        Self {
            models: DashMap::new(),
            facades,
            change_buffer: DEFAULT_CHANGE_BUFFER,
            runtime: Handle::current(),
        }
    }

    /// Registry whose facades are all the same shared instance.
    pub fn with_facade(facade: Arc<dyn ConfigurationFacade>) -> Self {
        Self::new(Arc::new(move |_: &EnvironmentRecord| Arc::clone(&facade)))
    }

    pub fn with_change_buffer(mut self, change_buffer: usize) -> Self {
        self.change_buffer = change_buffer;
        self
    }

    /// Model for `environment`, created on first request.
    pub fn model(&self, environment: &EnvironmentRecord) -> Arc<ConfigModel> {
        let id = environment.id();
        if let Some(existing) = self.models.get(&id) {
            return Arc::clone(existing.value());
        }
        self.models
            .entry(id)
            .or_insert_with(|| {
                tracing::debug!(
                    environment = %environment.environment_name,
                    "Creating configuration model"
                );
                ConfigModel::with_runtime(
                    environment.clone(),
                    (self.facades)(environment),
                    self.change_buffer,
                    self.runtime.clone(),
                )
            })
            .value()
            .clone()
    }

    /// Existing model for `id`, without creating one.
    pub fn get(&self, id: &EnvironmentId) -> Option<Arc<ConfigModel>> {
        self.models.get(id).map(|model| Arc::clone(model.value()))
    }

    /// Whether a model is registered for `id`.
    pub fn contains(&self, id: &EnvironmentId) -> bool {
        self.models.contains_key(id)
    }

    /// Drop the registry's model for `id`, cancelling its refresh.
    pub fn remove(&self, id: &EnvironmentId) -> Option<Arc<ConfigModel>> {
        let (_, model) = self.models.remove(id)?;
        model.cancel_refresh();
        Some(model)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Drop for ModelRegistry {
    fn drop(&mut self) {
        for model in self.models.iter() {
            model.value().cancel_refresh();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::{Snapshot, SnapshotFacade};

    fn record(name: &str) -> EnvironmentRecord {
        EnvironmentRecord {
            account_id: "123".into(),
            region_endpoint: "eb.us-east-1".into(),
            environment_name: name.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_one_model_per_environment() {
        let registry =
            ModelRegistry::with_facade(Arc::new(SnapshotFacade::new(Snapshot::default())));

        let a = registry.model(&record("a"));
        let again = registry.model(&record("a"));
        let b = registry.model(&record("b"));
        assert!(Arc::ptr_eq(&a, &again));
        assert!(registry.contains(&record("b").id()));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 2);

        let removed = registry.remove(&record("a").id()).unwrap();
        assert!(Arc::ptr_eq(&a, &removed));
        assert!(registry.get(&record("a").id()).is_none());
        assert!(!Arc::ptr_eq(&a, &registry.model(&record("a"))));
    }
}
