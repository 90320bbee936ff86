//! Registry of updates waiting for user confirmation.

use crate::metadata::PluginMetadata;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// An update found for an installed plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUpdate {
    pub name: String,
    pub current_metadata: PluginMetadata,
    pub remote_metadata: PluginMetadata,
}

impl PendingUpdate {
    pub fn remote_version(&self) -> Option<&str> {
        self.remote_metadata.version()
    }
}

pub type Subscriber = Arc<dyn Fn(&[PendingUpdate]) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// One entry per plugin name, kept in insertion order.
///
/// Every effective change notifies all subscribers with a full snapshot.
/// Mutations and their notifications are serialized, so subscribers see
/// snapshots in the order the changes happened and the last one always
/// matches the store. Subscribers run with the entries lock released and may
/// read the store, but must not add or remove entries.
#[derive(Default)]
pub struct PendingUpdateStore {
    notify: Mutex<()>,
    entries: Mutex<Vec<PendingUpdate>>,
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
    next_subscription: AtomicU64,
}

impl std::fmt::Debug for PendingUpdateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingUpdateStore")
            .field("entries", &*self.entries())
            .field("subscribers", &self.subscribers().len())
            .finish()
    }
}

impl PendingUpdateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<PendingUpdate> {
        self.entries().iter().find(|entry| entry.name == name).cloned()
    }

    pub fn get_all(&self) -> Vec<PendingUpdate> {
        self.entries().clone()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Inserts a new entry, or replaces an existing one whose remote version
    /// differs. Reporting the same remote version again changes nothing and
    /// notifies no one.
    pub fn add(
        &self,
        name: impl Into<String>,
        current_metadata: PluginMetadata,
        remote_metadata: PluginMetadata,
    ) {
        let name = name.into();
        let _notify = self.notify();
        let snapshot = {
            let mut entries = self.entries();
            match entries.iter_mut().find(|entry| entry.name == name) {
                Some(existing) if existing.remote_version() == remote_metadata.version() => {
                    return;
                }
                Some(existing) => {
                    existing.current_metadata = current_metadata;
                    existing.remote_metadata = remote_metadata;
                }
                None => entries.push(PendingUpdate {
                    name: name.clone(),
                    current_metadata,
                    remote_metadata,
                }),
            }
            entries.clone()
        };
        tracing::debug!(plugin = %name, pending = snapshot.len(), "pending update registered");
        self.emit(&snapshot);
    }

    /// Drops the entry for `name`. Subscribers are notified even when there
    /// was nothing to remove.
    pub fn remove(&self, name: &str) {
        let _notify = self.notify();
        let snapshot = {
            let mut entries = self.entries();
            entries.retain(|entry| entry.name != name);
            entries.clone()
        };
        self.emit(&snapshot);
    }

    /// Registers `callback` for every future change.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&[PendingUpdate]) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.subscribers().push((id, Arc::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    fn emit(&self, snapshot: &[PendingUpdate]) {
        let subscribers: Vec<Subscriber> = self
            .subscribers()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in subscribers {
            callback(snapshot);
        }
    }

    fn notify(&self) -> MutexGuard<'_, ()> {
        self.notify.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn entries(&self) -> MutexGuard<'_, Vec<PendingUpdate>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn subscribers(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Subscriber)>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{FIELD_NAME, FIELD_VERSION};

    fn meta(version: &str) -> PluginMetadata {
        PluginMetadata::new()
            .with_field(FIELD_NAME, "X")
            .with_field(FIELD_VERSION, version)
    }

    fn recording_store() -> (PendingUpdateStore, Arc<Mutex<Vec<Vec<PendingUpdate>>>>) {
        let store = PendingUpdateStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe(move |snapshot| sink.lock().unwrap().push(snapshot.to_vec()));
        (store, seen)
    }

    #[test]
    fn same_remote_version_notifies_once() {
        let (store, seen) = recording_store();
        store.add("X", meta("1.0.0"), meta("1.1.0"));
        store.add("X", meta("1.0.0"), meta("1.1.0"));
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn newer_remote_version_replaces_entry() {
        let (store, seen) = recording_store();
        store.add("X", meta("1.0.0"), meta("1.1.0"));
        store.add("X", meta("1.0.0"), meta("1.2.0"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].len(), 1);
        assert_eq!(seen[1][0].remote_version(), Some("1.2.0"));
        assert_eq!(store.get("X").unwrap().remote_version(), Some("1.2.0"));
    }

    #[test]
    fn replacement_keeps_position() {
        let store = PendingUpdateStore::new();
        store.add("A", meta("1.0.0"), meta("1.1.0"));
        store.add("B", meta("1.0.0"), meta("1.1.0"));
        store.add("A", meta("1.0.0"), meta("1.2.0"));
        let names: Vec<_> = store.get_all().into_iter().map(|u| u.name).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn remove_always_notifies() {
        let (store, seen) = recording_store();
        store.remove("missing");
        store.add("X", meta("1.0.0"), meta("1.1.0"));
        store.remove("X");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].is_empty());
        assert!(seen[2].is_empty());
        assert!(store.get("X").is_none());
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let store = PendingUpdateStore::new();
        let count = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&count);
        let id = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        store.add("X", meta("1.0.0"), meta("1.1.0"));
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.remove("X");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn subscriber_may_read_store() {
        let store = Arc::new(PendingUpdateStore::new());
        let observed = Arc::new(Mutex::new(None));
        let (inner, sink) = (Arc::clone(&store), Arc::clone(&observed));
        store.subscribe(move |snapshot| {
            *sink.lock().unwrap() = Some((snapshot.len(), inner.len()));
        });
        store.add("X", meta("1.0.0"), meta("1.1.0"));
        assert_eq!(*observed.lock().unwrap(), Some((1, 1)));
    }

    #[test]
    fn concurrent_changes_notify_in_order() {
        use std::sync::mpsc;
        use std::thread;
        use std::time::Duration;

        let store = Arc::new(PendingUpdateStore::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (entered_tx, entered_rx) = mpsc::channel();
        let entered_tx = Mutex::new(entered_tx);
        let sink = Arc::clone(&seen);
        store.subscribe(move |snapshot| {
            if snapshot.len() == 1 {
                entered_tx.lock().unwrap().send(()).unwrap();
                thread::sleep(Duration::from_millis(100));
            }
            sink.lock().unwrap().push(snapshot.len());
        });

        let first = {
            let store = Arc::clone(&store);
            thread::spawn(move || store.add("A", meta("1.0.0"), meta("1.1.0")))
        };
        entered_rx.recv().unwrap();
        let second = {
            let store = Arc::clone(&store);
            thread::spawn(move || store.add("B", meta("1.0.0"), meta("1.1.0")))
        };
        first.join().unwrap();
        second.join().unwrap();

        assert_eq!(*seen.lock().unwrap(), [1, 2]);
        assert_eq!(store.len(), 2);
    }
}
