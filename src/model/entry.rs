//! Shared observable entries.
//!
//! # Responsibilities
//! - Hold the current value of one option
//! - Notify watchers only when the value actually changes
//! - Publish every change on the model-wide change bus

use std::collections::BTreeSet;

use tokio::sync::{broadcast, watch};

use crate::model::key::OptionKey;
use crate::model::value::OptionValue;

/// A value change published on the model's change bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueChange {
    pub key: OptionKey,
    pub value: Option<OptionValue>,
}

/// Bindable handle to one model entry.
///
/// Handles are shared: the model hands out the same `Arc<ObservableEntry>` for
/// every request with the same key.
#[derive(Debug)]
pub struct ObservableEntry {
    key: OptionKey,
    value: watch::Sender<Option<OptionValue>>,
    changes: broadcast::Sender<ValueChange>,
}

impl ObservableEntry {
    pub(crate) fn new(key: OptionKey, changes: broadcast::Sender<ValueChange>) -> Self {
        let (value, _) = watch::channel(None);
        Self { key, value, changes }
    }

    pub fn key(&self) -> &OptionKey {
        &self.key
    }

    /// Current value, if the option has one.
    pub fn get(&self) -> Option<OptionValue> {
        self.value.borrow().clone()
    }

    pub fn has_value(&self) -> bool {
        self.value.borrow().is_some()
    }

    /// Watch this entry. The returned receiver starts with the current value marked seen.
    pub fn subscribe(&self) -> watch::Receiver<Option<OptionValue>> {
        self.value.subscribe()
    }

    /// Store a value. Returns true if it changed.
    ///
    /// Callers outside the model write through `ConfigModel::set`, which checks
    /// the value against the schema first.
    pub(crate) fn set(&self, value: OptionValue) -> bool {
        self.replace(Some(value))
    }

    /// Remove the value. Returns true if there was one.
    pub(crate) fn clear(&self) -> bool {
        self.replace(None)
    }

    pub(crate) fn replace(&self, value: Option<OptionValue>) -> bool {
        let changed = self.value.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
        if changed {
            self.publish();
        }
        changed
    }

    /// Merge an incoming list into the stored set, mutating only if the
    /// members differ.
    pub(crate) fn merge_list(&self, incoming: BTreeSet<String>) -> bool {
        let changed = self.value.send_if_modified(|current| match current {
            Some(OptionValue::List(existing)) => {
                if existing.symmetric_difference(&incoming).next().is_none() {
                    return false;
                }
                existing.clear();
                existing.extend(incoming);
                true
            }
            other => {
                *other = Some(OptionValue::List(incoming));
                true
            }
        });
        if changed {
            self.publish();
        }
        changed
    }

    fn publish(&self) {
        // No receivers is fine.
        let _ = self.changes.send(ValueChange {
            key: self.key.clone(),
            value: self.get(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> (ObservableEntry, broadcast::Receiver<ValueChange>) {
        let (tx, rx) = broadcast::channel(16);
        (ObservableEntry::new(OptionKey::new("ns1", "Tags"), tx), rx)
    }

    fn set_of(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_equivalent_set_is_silent() {
        let (entry, mut changes) = entry();
        assert!(entry.merge_list(set_of(&["a", "b", "c"])));
        assert!(changes.try_recv().is_ok());

        let mut watcher = entry.subscribe();
        assert!(!entry.merge_list(set_of(&["c", "b", "a"])));
        assert!(!watcher.has_changed().unwrap());
        assert!(changes.try_recv().is_err());
    }

    #[test]
    fn test_merge_different_set_replaces_contents() {
        let (entry, _changes) = entry();
        entry.merge_list(set_of(&["a", "b"]));

        let mut watcher = entry.subscribe();
        assert!(entry.merge_list(set_of(&["b", "d"])));
        assert!(watcher.has_changed().unwrap());
        assert_eq!(entry.get(), Some(OptionValue::List(set_of(&["b", "d"]))));
    }

    #[test]
    fn test_set_same_scalar_is_silent() {
        let (entry, mut changes) = entry();
        assert!(entry.set(OptionValue::Scalar("x".into())));
        assert!(!entry.set(OptionValue::Scalar("x".into())));
        assert_eq!(changes.try_recv().unwrap().value, Some(OptionValue::Scalar("x".into())));
        assert!(changes.try_recv().is_err());
        assert!(entry.clear());
        assert!(!entry.has_value());
    }
}
