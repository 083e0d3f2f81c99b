//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use beanstalk_config::facade::{
    ConfigurationFacade, EnvironmentRecord, EnvironmentSummary, FacadeError, OptionDescriptor,
    OptionSetting, SettingsDescription, SettingsTarget,
};
use beanstalk_config::model::{RefreshError, RefreshListener};
use tokio::sync::oneshot;

pub fn record() -> EnvironmentRecord {
    EnvironmentRecord {
        account_id: "123456789012".into(),
        region_endpoint: "elasticbeanstalk.us-east-1.amazonaws.com".into(),
        application_name: "shop".into(),
        environment_name: "shop-prod".into(),
        ..Default::default()
    }
}

pub fn bundle(items: &[(&str, &str, &str)]) -> Vec<SettingsDescription> {
    vec![SettingsDescription {
        environment_name: Some("shop-prod".into()),
        option_settings: items
            .iter()
            .map(|(ns, name, value)| OptionSetting::new(*ns, *name, *value))
            .collect(),
        ..Default::default()
    }]
}

/// One scripted answer to `current_settings`.
pub struct SettingsStep {
    reached: Option<oneshot::Sender<()>>,
    release: Option<oneshot::Receiver<()>>,
    result: Result<Vec<SettingsDescription>, FacadeError>,
}

impl SettingsStep {
    /// Answer immediately.
    pub fn ready(result: Result<Vec<SettingsDescription>, FacadeError>) -> Self {
        Self {
            reached: None,
            release: None,
            result,
        }
    }

    /// Answer only once released. Returns the step, a receiver that fires
    /// when the call starts, and the release trigger.
    pub fn gated(
        result: Result<Vec<SettingsDescription>, FacadeError>,
    ) -> (Self, oneshot::Receiver<()>, oneshot::Sender<()>) {
        let (reached_tx, reached_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        (
            Self {
                reached: Some(reached_tx),
                release: Some(release_rx),
                result,
            },
            reached_rx,
            release_tx,
        )
    }
}

/// Facade with a fixed schema answer and a queue of settings answers.
pub struct ScriptedFacade {
    options: Mutex<Result<Vec<OptionDescriptor>, FacadeError>>,
    settings: Mutex<VecDeque<SettingsStep>>,
    pub settings_calls: AtomicUsize,
}

impl ScriptedFacade {
    pub fn new(options: Result<Vec<OptionDescriptor>, FacadeError>) -> Arc<Self> {
        Arc::new(Self {
            options: Mutex::new(options),
            settings: Mutex::new(VecDeque::new()),
            settings_calls: AtomicUsize::new(0),
        })
    }

    pub fn push(&self, step: SettingsStep) {
        self.settings.lock().unwrap().push_back(step);
    }
}

#[async_trait]
impl ConfigurationFacade for ScriptedFacade {
    async fn describe_options(&self, _: &str) -> Result<Vec<OptionDescriptor>, FacadeError> {
        self.options.lock().unwrap().clone()
    }

    async fn current_settings(
        &self,
        _: &SettingsTarget,
    ) -> Result<Vec<SettingsDescription>, FacadeError> {
        self.settings_calls.fetch_add(1, Ordering::SeqCst);
        let step = self.settings.lock().unwrap().pop_front();
        let step = step.unwrap_or_else(|| SettingsStep::ready(Ok(Vec::new())));
        if let Some(reached) = step.reached {
            let _ = reached.send(());
        }
        if let Some(release) = step.release {
            let _ = release.await;
        }
        step.result
    }

    async fn describe_environments(&self) -> Result<Vec<EnvironmentSummary>, FacadeError> {
        Ok(Vec::new())
    }
}

/// Listener counting each notification kind.
#[derive(Default)]
pub struct CountingListener {
    pub started: AtomicUsize,
    pub finished: AtomicUsize,
    pub errors: Mutex<Vec<String>>,
}

impl CountingListener {
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn error_count(&self) -> usize {
        self.errors.lock().unwrap().len()
    }
}

impl RefreshListener for CountingListener {
    fn refresh_started(&self) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn refresh_finished(&self) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }

    fn refresh_error(&self, error: &RefreshError) {
        self.errors.lock().unwrap().push(error.to_string());
    }
}
