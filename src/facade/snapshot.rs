//! Snapshot-backed facade.
//!
//! # Responsibilities
//! - Serve schema and settings from a recorded snapshot (TOML or JSON)
//! - Reproduce control-plane faults (unprovisioned environment, injected errors)
//! - Allow the snapshot to be swapped atomically while refreshes are running

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::facade::environment::EnvironmentSummary;
use crate::facade::error::FacadeError;
use crate::facade::types::{OptionDescriptor, OptionSetting, SettingsDescription, SettingsTarget};
use crate::facade::ConfigurationFacade;

/// Error type for snapshot loading.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A service fault the snapshot should raise on every call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InjectedFault {
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Recorded state of one environment as the control plane would report it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Snapshot {
    /// Environment the snapshot belongs to; other names are rejected.
    pub environment_name: Option<String>,

    /// False simulates an environment that is still being created.
    pub provisioned: bool,

    /// Option schema (any order; the model sorts it).
    pub options: Vec<OptionDescriptor>,

    /// Running settings of the environment.
    pub environment_settings: Vec<OptionSetting>,

    /// Saved configuration templates, by template name.
    pub templates: BTreeMap<String, Vec<OptionSetting>>,

    /// Environments of the account and region, including retired ones.
    pub environments: Vec<EnvironmentSummary>,

    /// Fault raised by every call while set.
    pub fault: Option<InjectedFault>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            environment_name: None,
            provisioned: true,
            options: Vec::new(),
            environment_settings: Vec::new(),
            templates: BTreeMap::new(),
            environments: Vec::new(),
            fault: None,
        }
    }
}

impl Snapshot {
    /// Load a snapshot from disk. `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(toml::from_str(&content)?)
        }
    }
}

/// Facade answering from an atomically swappable [`Snapshot`].
pub struct SnapshotFacade {
    current: ArcSwap<Snapshot>,
}

impl SnapshotFacade {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    /// Load the initial snapshot from disk.
    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        Ok(Self::new(Snapshot::load(path)?))
    }

    /// Replace the snapshot served to subsequent calls.
    pub fn replace(&self, snapshot: Snapshot) {
        self.current.store(Arc::new(snapshot));
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    fn check(
        &self,
        snapshot: &Snapshot,
        environment_name: Option<&str>,
    ) -> Result<(), FacadeError> {
        if let Some(fault) = &snapshot.fault {
            return Err(FacadeError::service(&fault.code, &fault.message));
        }
        if !snapshot.provisioned {
            return Err(FacadeError::invalid_parameter("Environment is not provisioned yet"));
        }
        if let (Some(expected), Some(requested)) = (&snapshot.environment_name, environment_name) {
            if expected != requested {
                return Err(FacadeError::invalid_parameter(format!(
                    "No Environment found for EnvironmentName = '{}'",
                    requested
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigurationFacade for SnapshotFacade {
    async fn describe_options(
        &self,
        environment_name: &str,
    ) -> Result<Vec<OptionDescriptor>, FacadeError> {
        let snapshot = self.current.load();
        self.check(&snapshot, Some(environment_name))?;
        Ok(snapshot.options.clone())
    }

    async fn current_settings(
        &self,
        target: &SettingsTarget,
    ) -> Result<Vec<SettingsDescription>, FacadeError> {
        let snapshot = self.current.load();
        match target {
            SettingsTarget::Environment { environment_name } => {
                self.check(&snapshot, Some(environment_name.as_str()))?;
                if snapshot.environment_settings.is_empty() {
                    return Ok(Vec::new());
                }
                Ok(vec![SettingsDescription {
                    application_name: None,
                    template_name: None,
                    environment_name: Some(environment_name.clone()),
                    option_settings: snapshot.environment_settings.clone(),
                }])
            }
            SettingsTarget::Template {
                application_name,
                template_name,
            } => {
                if let Some(fault) = &snapshot.fault {
                    return Err(FacadeError::service(&fault.code, &fault.message));
                }
                let settings = snapshot.templates.get(template_name).ok_or_else(|| {
                    FacadeError::invalid_parameter(format!(
                        "No Configuration Template named '{}' found",
                        template_name
                    ))
                })?;
                Ok(vec![SettingsDescription {
                    application_name: Some(application_name.clone()),
                    template_name: Some(template_name.clone()),
                    environment_name: None,
                    option_settings: settings.clone(),
                }])
            }
        }
    }

    async fn describe_environments(&self) -> Result<Vec<EnvironmentSummary>, FacadeError> {
        let snapshot = self.current.load();
        if let Some(fault) = &snapshot.fault {
            return Err(FacadeError::service(&fault.code, &fault.message));
        }
        Ok(snapshot.environments.clone())
    }
}
