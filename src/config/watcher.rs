//! Snapshot file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::facade::Snapshot;

/// A watcher that monitors a snapshot file for changes.
pub struct SnapshotWatcher {
    path: PathBuf,
    poll_interval: Duration,
    update_tx: mpsc::UnboundedSender<Snapshot>,
}

impl SnapshotWatcher {
    /// Create a new SnapshotWatcher.
    ///
    /// Returns the watcher and a receiver for reloaded snapshots.
    pub fn new(path: &Path, poll_interval: Duration) -> (Self, mpsc::UnboundedReceiver<Snapshot>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                poll_interval,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for events to keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(path = ?path, "Snapshot change detected, reloading");
                        match Snapshot::load(&path) {
                            Ok(snapshot) => {
                                let _ = tx.send(snapshot);
                            }
                            Err(e) => {
                                tracing::error!(
                                    error = %e,
                                    "Failed to reload snapshot. Keeping current snapshot."
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Snapshot watcher started");
        Ok(watcher)
    }
}
