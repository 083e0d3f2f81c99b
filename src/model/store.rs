//! The per-environment configuration model.
//!
//! # Responsibilities
//! - Hold the decoded value of every configured option, keyed by `OptionKey`
//! - Hand out shared observable handles, one per key
//! - Merge fetched settings without notifying unchanged values
//! - Run at most one effective refresh at a time
//! - Export the values back to wire settings

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use arc_swap::ArcSwap;
use dashmap::DashMap;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::facade::{
    ConfigurationFacade, EnvironmentRecord, FacadeError, OptionDescriptor, OptionSetting,
    SettingsDescription, SettingsTarget, ValueType,
};
use crate::model::entry::{ObservableEntry, ValueChange};
use crate::model::key::{sort_descriptors, OptionKey};
use crate::model::listener::{ListenerId, ListenerSet, RefreshListener};
use crate::model::refresh::{RefreshError, RefreshHandle, RefreshOutcome};
use crate::model::value::{split_list, OptionValue};
use crate::observability::metrics;

/// Settings grouped by namespace.
pub type SettingsMap = HashMap<String, Vec<OptionSetting>>;

/// Default capacity of the change bus.
pub const DEFAULT_CHANGE_BUFFER: usize = 256;

/// Group the first settings bundle by namespace. Returns `None` when there is
/// no bundle, meaning "no configuration yet".
pub fn settings_map(settings: &[SettingsDescription]) -> Option<SettingsMap> {
    let first = settings.first()?;
    let mut map = SettingsMap::new();
    for opt in &first.option_settings {
        map.entry(opt.namespace.clone()).or_default().push(opt.clone());
    }
    Some(map)
}

/// Rejected write to a model entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    #[error("option {0} is not in the current schema")]
    UnknownOption(OptionKey),

    #[error("option {key} holds {expected} values")]
    TypeMismatch { key: OptionKey, expected: ValueType },
}

/// Observable configuration of one environment.
pub struct ConfigModel {
    environment: EnvironmentRecord,
    facade: Arc<dyn ConfigurationFacade>,
    runtime: Handle,

    entries: DashMap<OptionKey, Arc<ObservableEntry>>,
    schema: ArcSwap<Vec<OptionDescriptor>>,
    changes: broadcast::Sender<ValueChange>,
    listeners: ListenerSet,

    /// Serialises read-modify-write passes over the entries.
    commit_lock: Mutex<()>,
    generation: AtomicU64,
    active: Mutex<Option<CancellationToken>>,
}

impl ConfigModel {
    /// Create a model bound to the current Tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn new(
        environment: EnvironmentRecord,
        facade: Arc<dyn ConfigurationFacade>,
        change_buffer: usize,
    ) -> Arc<Self> {
        Self::with_runtime(environment, facade, change_buffer, Handle::current())
    }

    /// Create a model whose refresh tasks run on `runtime`.
    pub fn with_runtime(
        environment: EnvironmentRecord,
        facade: Arc<dyn ConfigurationFacade>,
        change_buffer: usize,
        runtime: Handle,
    ) -> Arc<Self> {
        let (changes, _) = broadcast::channel(change_buffer.max(1));
        Arc::new(Self {
            environment,
            facade,
            runtime,
            entries: DashMap::new(),
            schema: ArcSwap::from_pointee(Vec::new()),
            changes,
            listeners: ListenerSet::default(),
            commit_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
            active: Mutex::new(None),
        })
    }

    pub fn environment(&self) -> &EnvironmentRecord {
        &self.environment
    }

    /// Shared handle for the option's entry. Equal keys always get the same handle.
    pub fn observe(&self, descriptor: &OptionDescriptor) -> Arc<ObservableEntry> {
        self.entry(OptionKey::from(descriptor))
    }

    /// Current value of the option, if it has one.
    pub fn get(&self, descriptor: &OptionDescriptor) -> Option<OptionValue> {
        self.entries
            .get(&OptionKey::from(descriptor))
            .and_then(|entry| entry.get())
    }

    /// Current schema, sorted when it came from a refresh.
    pub fn options(&self) -> Arc<Vec<OptionDescriptor>> {
        self.schema.load_full()
    }

    /// Receive one event per entry whose value changes.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<ValueChange> {
        self.changes.subscribe()
    }

    pub fn add_refresh_listener(&self, listener: Arc<dyn RefreshListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_refresh_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Replace the schema and merge `settings` into the entries.
    ///
    /// Values equal to the stored ones are left untouched and produce no
    /// notification. Entries whose option left the schema lose their value.
    /// Returns the number of entries that changed.
    pub fn init(&self, settings: Option<&SettingsMap>, schema: Vec<OptionDescriptor>) -> usize {
        let _guard = lock(&self.commit_lock);
        self.apply(settings, schema)
    }

    fn apply(&self, settings: Option<&SettingsMap>, schema: Vec<OptionDescriptor>) -> usize {
        let mut changed = 0;

        let known: HashSet<OptionKey> = schema.iter().map(OptionKey::from).collect();
        for entry in self.entries.iter() {
            if !known.contains(entry.key()) && entry.value().clear() {
                changed += 1;
            }
        }

        for opt in &schema {
            let Some(in_namespace) = settings.and_then(|s| s.get(&opt.namespace)) else {
                continue;
            };
            for setting in in_namespace.iter().filter(|s| s.option_name == opt.name) {
                let updated = match &opt.value_type {
                    ValueType::List => self
                        .entry(OptionKey::from(opt))
                        .merge_list(split_list(&setting.value)),
                    value_type => match OptionValue::decode(value_type, &setting.value) {
                        Some(value) => self.entry(OptionKey::from(opt)).set(value),
                        None => {
                            tracing::trace!(
                                namespace = %opt.namespace,
                                name = %opt.name,
                                value_type = %value_type,
                                "Skipping option of unsupported type"
                            );
                            false
                        }
                    },
                };
                if updated {
                    changed += 1;
                }
            }
        }

        metrics::record_schema_size(schema.len());
        metrics::record_entries_changed(changed);
        self.schema.store(Arc::new(schema));
        changed
    }

    /// Write `value` to the option described by `descriptor`.
    ///
    /// The option must be in the current schema and the value must match the
    /// schema's type for it. Returns whether the stored value changed.
    pub fn set(
        &self,
        descriptor: &OptionDescriptor,
        value: OptionValue,
    ) -> Result<bool, WriteError> {
        let key = OptionKey::from(descriptor);
        let _guard = lock(&self.commit_lock);
        let schema = self.schema.load();
        let Some(known) = schema.iter().find(|opt| OptionKey::from(*opt) == key) else {
            return Err(WriteError::UnknownOption(key));
        };
        if !value.matches(&known.value_type) {
            return Err(WriteError::TypeMismatch {
                key,
                expected: known.value_type.clone(),
            });
        }
        Ok(self.entry(key).set(value))
    }

    /// Serialise the values back to wire settings, sorted by key.
    ///
    /// Empty lists are omitted.
    pub fn export(&self) -> Vec<OptionSetting> {
        let mut settings: Vec<(OptionKey, String)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let encoded = entry.value().get()?.encode()?;
                Some((entry.key().clone(), encoded))
            })
            .collect();
        settings.sort();
        settings
            .into_iter()
            .map(|(key, value)| OptionSetting::new(key.namespace, key.name, value))
            .collect()
    }

    /// Fetch the option schema, sorted by namespace then name.
    ///
    /// An environment that does not exist yet yields an empty schema.
    pub async fn sorted_options(&self) -> Result<Vec<OptionDescriptor>, FacadeError> {
        match self
            .facade
            .describe_options(&self.environment.environment_name)
            .await
        {
            Ok(mut options) => {
                sort_descriptors(&mut options);
                Ok(options)
            }
            Err(e) if e.is_invalid_parameter() => {
                tracing::debug!(error = %e, "Environment not provisioned, using empty schema");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch the settings of the environment, or of `template_name` if given.
    ///
    /// `Ok(None)` means there is no configuration yet.
    pub async fn current_settings(
        &self,
        template_name: Option<&str>,
    ) -> Result<Option<SettingsMap>, FacadeError> {
        let target = self.environment.settings_target(template_name);
        match self.facade.current_settings(&target).await {
            Ok(settings) => Ok(settings_map(&settings)),
            Err(e)
                if e.is_invalid_parameter()
                    && matches!(target, SettingsTarget::Environment { .. }) =>
            {
                tracing::debug!(error = %e, "Environment not provisioned, no settings yet");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Start an asynchronous refresh, cancelling any refresh still in flight.
    ///
    /// Returns immediately. Faults are reported to the refresh listeners only.
    pub fn refresh(self: &Arc<Self>, template_name: Option<String>) -> RefreshHandle {
        let token = CancellationToken::new();
        let generation = {
            let mut active = lock(&self.active);
            if let Some(previous) = active.replace(token.clone()) {
                previous.cancel();
            }
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        let span = tracing::info_span!(
            "refresh",
            environment = %self.environment.environment_name,
            generation,
            template = template_name.as_deref().unwrap_or("-")
        );
        let model = Arc::clone(self);
        let task_token = token.clone();
        let task = self.runtime.spawn(
            async move {
                let outcome = model
                    .run_refresh(generation, &task_token, template_name.as_deref())
                    .await;
                metrics::record_refresh(outcome.label());
                outcome
            }
            .instrument(span),
        );

        RefreshHandle::new(generation, token, task)
    }

    /// Cancel the refresh in flight, if any.
    pub fn cancel_refresh(&self) {
        if let Some(token) = lock(&self.active).take() {
            token.cancel();
        }
    }

    /// Number of the most recently started refresh.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    async fn run_refresh(
        &self,
        generation: u64,
        token: &CancellationToken,
        template_name: Option<&str>,
    ) -> RefreshOutcome {
        tracing::debug!("Refresh started");
        self.listeners.notify(|l| l.refresh_started());

        let fetched = self.fetch(template_name).await;

        let (schema, settings) = match fetched {
            Ok(data) => data,
            Err(e) => {
                if self.is_stale(generation, token) {
                    tracing::debug!(error = %e, "Superseded refresh failed, ignoring");
                    return RefreshOutcome::Superseded;
                }
                tracing::warn!(error = %e, "Refresh failed");
                self.listeners.notify(|l| l.refresh_error(&e));
                return RefreshOutcome::Failed(e);
            }
        };

        let changed = {
            let _guard = lock(&self.commit_lock);
            if self.is_stale(generation, token) {
                tracing::debug!("Refresh superseded, discarding fetched configuration");
                return RefreshOutcome::Superseded;
            }
            self.apply(settings.as_ref(), schema)
        };

        tracing::info!(changed, "Refresh applied");
        self.listeners.notify(|l| l.refresh_finished());
        RefreshOutcome::Applied { changed }
    }

    async fn fetch(
        &self,
        template_name: Option<&str>,
    ) -> Result<(Vec<OptionDescriptor>, Option<SettingsMap>), RefreshError> {
        let schema = self.sorted_options().await.map_err(RefreshError::Schema)?;
        let settings = self
            .current_settings(template_name)
            .await
            .map_err(RefreshError::Settings)?;
        Ok((schema, settings))
    }

    fn is_stale(&self, generation: u64, token: &CancellationToken) -> bool {
        token.is_cancelled() || self.generation.load(Ordering::SeqCst) != generation
    }

    fn entry(&self, key: OptionKey) -> Arc<ObservableEntry> {
        if let Some(existing) = self.entries.get(&key) {
            return Arc::clone(existing.value());
        }
        let changes = self.changes.clone();
        self.entries
            .entry(key.clone())
            .or_insert_with(|| Arc::new(ObservableEntry::new(key, changes)))
            .value()
            .clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
