//! Elastic Beanstalk environment configuration tool (v1)
//!
//! Keeps a local, observable view of an environment's configuration options
//! in sync with the control plane.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────────┐
//!                  │                  beanstalk-config                     │
//!                  │                                                       │
//!   CLI command    │  ┌──────────┐    ┌───────────────┐    ┌───────────┐  │
//!   ───────────────┼─▶│ registry │───▶│  ConfigModel  │───▶│  facade   │──┼──▶ control plane
//!                  │  └──────────┘    │ entries/schema│    │ (timeout) │  │    (snapshot)
//!                  │                  └───────┬───────┘    └───────────┘  │
//!                  │                          │                           │
//!   changes/events │                          ▼                           │
//!   ◀──────────────┼──────────── change bus + refresh listeners           │
//!                  │                                                       │
//!                  │  ┌─────────────────────────────────────────────────┐ │
//!                  │  │ config (toml + watcher) · observability · lifecycle│
//!                  │  └─────────────────────────────────────────────────┘ │
//!                  └──────────────────────────────────────────────────────┘
//! ```

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::RecvError;

use beanstalk_config::config::{load_config, SnapshotWatcher};
use beanstalk_config::facade::{ConfigurationFacade, EnvironmentSummary, SnapshotFacade};
use beanstalk_config::lifecycle::{signals, Shutdown};
use beanstalk_config::model::{
    importable_environments, ChannelListener, ConfigModel, ModelRegistry, RefreshEvent,
    RefreshOutcome,
};
use beanstalk_config::observability::logging::init_logging;
use beanstalk_config::resilience::timeouts::TimeoutFacade;
use beanstalk_config::{OptionDescriptor, OptionSetting};

#[derive(Parser)]
#[command(name = "beanstalk-config")]
#[command(about = "Inspect and follow Elastic Beanstalk environment configuration", long_about = None)]
struct Cli {
    /// Tool configuration file.
    #[arg(short, long, default_value = "beanstalk-config.toml")]
    config: PathBuf,

    /// Snapshot to serve from (overrides snapshot.path).
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Log level (overrides observability.log_level).
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the option schema, sorted by namespace and name
    Options {
        #[arg(long)]
        json: bool,
    },
    /// Refresh once and print the current settings
    Show {
        /// Read a saved configuration template instead of the running environment
        #[arg(short, long)]
        template: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Refresh on every snapshot change and print value changes until Ctrl-C
    Watch {
        #[arg(short, long)]
        template: Option<String>,
    },
    /// List running environments of the account and region not yet in this session
    Environments {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    init_logging(&config.observability.log_level);

    tracing::info!(
        environment = %config.environment.environment_name,
        application = %config.environment.application_name,
        "beanstalk-config v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let snapshot_path = cli
        .snapshot
        .or_else(|| config.snapshot.path.clone())
        .ok_or("no snapshot configured: pass --snapshot or set snapshot.path")?;
    let snapshots = Arc::new(SnapshotFacade::from_file(&snapshot_path)?);
    let facade: Arc<dyn ConfigurationFacade> = Arc::new(TimeoutFacade::new(
        snapshots.clone(),
        config.refresh.fetch_timeout(),
    ));

    let registry = ModelRegistry::with_facade(facade.clone())
        .with_change_buffer(config.refresh.change_buffer);
    let model = registry.model(&config.environment);

    match cli.command {
        Commands::Options { json } => {
            let options = model.sorted_options().await?;
            print_options(&options, json)?;
        }
        Commands::Show { template, json } => {
            match model.refresh(template).join().await {
                RefreshOutcome::Failed(e) => return Err(e.into()),
                RefreshOutcome::Aborted => return Err("refresh task aborted".into()),
                _ => {}
            }
            print_settings(&model.export(), json)?;
        }
        Commands::Watch { template } => {
            let poll_interval = Duration::from_secs(config.snapshot.poll_interval_secs.max(1));
            watch(model, snapshots, &snapshot_path, poll_interval, template).await?;
        }
        Commands::Environments { json } => {
            let environments = importable_environments(
                facade.as_ref(),
                &config.environment.account_id,
                &config.environment.region_endpoint,
                &registry,
            )
            .await?;
            print_environments(&environments, json)?;
        }
    }

    tracing::info!("Done");
    Ok(())
}

async fn watch(
    model: Arc<ConfigModel>,
    snapshots: Arc<SnapshotFacade>,
    snapshot_path: &Path,
    poll_interval: Duration,
    template: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_ctrl_c_handler(shutdown.clone());
    let mut stop = shutdown.subscribe();

    let (watcher, mut updates) = SnapshotWatcher::new(snapshot_path, poll_interval);
    let _watcher = watcher.run()?;

    let (listener, mut events) = ChannelListener::new();
    let listener_id = model.add_refresh_listener(listener);
    let mut changes = model.subscribe_changes();

    model.refresh(template.clone());

    loop {
        tokio::select! {
            Some(snapshot) = updates.recv() => {
                snapshots.replace(snapshot);
                model.refresh(template.clone());
            }
            Some(event) = events.recv() => match event {
                RefreshEvent::Started => tracing::debug!("Refreshing configuration"),
                RefreshEvent::Finished => tracing::info!(
                    options = model.options().len(),
                    "Configuration up to date"
                ),
                RefreshEvent::Error(e) => tracing::warn!(error = %e, "Refresh failed"),
            },
            change = changes.recv() => match change {
                Ok(change) => {
                    let value = change
                        .value
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "<unset>".into());
                    println!("{} = {}", change.key, value);
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Change bus lagged, some changes were not printed");
                }
                Err(RecvError::Closed) => break,
            },
            _ = stop.recv() => break,
        }
    }

    model.cancel_refresh();
    model.remove_refresh_listener(listener_id);
    Ok(())
}

fn print_options(options: &[OptionDescriptor], json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(options)?);
        return Ok(());
    }
    for opt in options {
        println!("{:<45} {:<35} {}", opt.namespace, opt.name, opt.value_type);
    }
    Ok(())
}

fn print_environments(
    environments: &[EnvironmentSummary],
    json: bool,
) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(environments)?);
        return Ok(());
    }
    if environments.is_empty() {
        println!("There are no running environments to import.");
        return Ok(());
    }
    for env in environments {
        println!(
            "{:<30} {:<30} {}",
            env.environment_name, env.application_name, env.status
        );
    }
    Ok(())
}

fn print_settings(settings: &[OptionSetting], json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(settings)?);
        return Ok(());
    }
    for setting in settings {
        println!(
            "{:<45} {:<35} {}",
            setting.namespace, setting.option_name, setting.value
        );
    }
    Ok(())
}
