//! Refresh task handles and outcomes.
//!
//! # State Transitions
//! ```text
//! spawned → fetching → commit point ─┬─ applied   (finished notified)
//!                 │                  └─ superseded (silent)
//!                 └─ fault ──────────┬─ failed    (error notified)
//!                                    └─ superseded (silent, if canceled meanwhile)
//! ```
//!
//! # Design Decisions
//! - Cancellation is cooperative; an in-flight fetch is never aborted
//! - The commit point checks both the cancellation token and the generation,
//!   so a stale task cannot apply even if it missed the cancel signal

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::facade::FacadeError;

/// Fault surfaced to listeners when a refresh fails.
#[derive(Debug, Clone, Error)]
pub enum RefreshError {
    #[error("failed to describe configuration options: {0}")]
    Schema(#[source] FacadeError),

    #[error("failed to fetch current settings: {0}")]
    Settings(#[source] FacadeError),
}

impl RefreshError {
    pub fn facade_error(&self) -> &FacadeError {
        match self {
            RefreshError::Schema(e) | RefreshError::Settings(e) => e,
        }
    }
}

/// How a refresh task ended.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// Fetched data was merged; `changed` entries were modified.
    Applied { changed: usize },
    /// A newer refresh superseded this one; nothing was applied or notified.
    Superseded,
    /// A control-plane fault was reported to listeners.
    Failed(RefreshError),
    /// The task panicked or was aborted by the runtime.
    Aborted,
}

impl RefreshOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RefreshOutcome::Applied { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            RefreshOutcome::Applied { .. } => "applied",
            RefreshOutcome::Superseded => "superseded",
            RefreshOutcome::Failed(_) => "failed",
            RefreshOutcome::Aborted => "aborted",
        }
    }
}

/// Handle to a spawned refresh. Dropping it does not cancel the refresh.
#[derive(Debug)]
pub struct RefreshHandle {
    generation: u64,
    token: CancellationToken,
    task: JoinHandle<RefreshOutcome>,
}

impl RefreshHandle {
    pub(crate) fn new(
        generation: u64,
        token: CancellationToken,
        task: JoinHandle<RefreshOutcome>,
    ) -> Self {
        Self {
            generation,
            token,
            task,
        }
    }

    /// Monotonic refresh number within the owning model.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Signal the refresh to discard its result.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_canceled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the refresh task to end.
    pub async fn join(self) -> RefreshOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(generation = self.generation, error = %e, "Refresh task aborted");
                RefreshOutcome::Aborted
            }
        }
    }
}
