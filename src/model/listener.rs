//! Refresh lifecycle listeners.

use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::model::refresh::RefreshError;

/// Observer of refresh lifecycle events.
///
/// Callbacks run on the refresh task; implementations should return quickly.
pub trait RefreshListener: Send + Sync {
    fn refresh_started(&self);
    fn refresh_finished(&self);
    fn refresh_error(&self, error: &RefreshError);
}

/// Token returned on registration, used to remove a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Refresh lifecycle event, as delivered by [`ChannelListener`].
#[derive(Debug, Clone)]
pub enum RefreshEvent {
    Started,
    Finished,
    Error(RefreshError),
}

/// Listener forwarding events into a channel, so the consumer picks the task
/// (or thread) the notifications are handled on.
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<RefreshEvent>,
}

impl ChannelListener {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<RefreshEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }

    fn forward(&self, event: RefreshEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Refresh event receiver dropped");
        }
    }
}

impl RefreshListener for ChannelListener {
    fn refresh_started(&self) {
        self.forward(RefreshEvent::Started);
    }

    fn refresh_finished(&self) {
        self.forward(RefreshEvent::Finished);
    }

    fn refresh_error(&self, error: &RefreshError) {
        self.forward(RefreshEvent::Error(error.clone()));
    }
}

/// Registered listeners. Notification iterates over a snapshot so callbacks
/// may register or remove listeners without deadlocking.
#[derive(Default)]
pub(crate) struct ListenerSet {
    listeners: Mutex<Vec<(ListenerId, Arc<dyn RefreshListener>)>>,
}

impl ListenerSet {
    pub fn add(&self, listener: Arc<dyn RefreshListener>) -> ListenerId {
        let id = ListenerId::new();
        self.lock().push((id, listener));
        id
    }

    pub fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn notify(&self, f: impl Fn(&dyn RefreshListener)) {
        let snapshot: Vec<Arc<dyn RefreshListener>> =
            self.lock().iter().map(|(_, l)| l.clone()).collect();
        for listener in snapshot {
            f(listener.as_ref());
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(ListenerId, Arc<dyn RefreshListener>)>> {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
