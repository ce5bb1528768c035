// Path-keyed state store
//
// The bridge-side mirror of the host automation system's key/value store:
// typed entries with per-entry metadata, idempotent creation, unconditional
// value overwrite, and change fan-out. Every write carries an
// acknowledgment flag -- `ack = true` marks a device-authoritative update,
// `ack = false` marks a consumer request that the write-back dispatcher
// must relay to the device. The distinction is what prevents feedback
// loops between polling and write-back.

use std::sync::Mutex;

use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::trace;

use crate::error::CoreError;

/// Well-known path of the connectivity flag entry.
pub const CONNECTIVITY_PATH: &str = "info.connection";

const CHANGE_CHANNEL_SIZE: usize = 256;

/// Inferred type of a state entry, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// The first observed value parsed as a decimal numeral.
    Number,
    /// Free-form text (or anything that did not parse as a number).
    Mixed,
    /// Boolean; only used for the built-in connectivity entry.
    Bool,
}

/// A state value.
#[derive(Debug, Clone, PartialEq)]
pub enum StateValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl std::fmt::Display for StateValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Per-entry metadata, fixed at creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct StateMeta {
    /// Human-readable label (catalog remark).
    pub name: String,
    /// Raw device variable for write commands.
    pub variable: String,
    pub kind: ValueKind,
    pub writable: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// One entry: metadata plus the last written value.
#[derive(Debug, Clone, PartialEq)]
pub struct StateEntry {
    pub meta: StateMeta,
    pub value: Option<StateValue>,
}

/// A single state write, broadcast to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct StateChange {
    pub path: String,
    pub value: StateValue,
    /// `true` for device-authoritative updates (polling), `false` for
    /// consumer-originated write requests.
    pub ack: bool,
}

/// Path-keyed store of typed state entries with change notification.
///
/// Change fan-out is split across two channels: the lossy `broadcast` for
/// observers, and a dedicated unbounded queue carrying only `ack = false`
/// write requests. Poll traffic floods the broadcast side with hundreds of
/// acked writes per batch; a write request sharing that channel could be
/// evicted before the dispatcher drains it.
pub struct StateStore {
    entries: DashMap<String, StateEntry>,
    changes: broadcast::Sender<StateChange>,
    write_tx: mpsc::UnboundedSender<StateChange>,
    write_rx: Mutex<Option<mpsc::UnboundedReceiver<StateChange>>>,
    connected: watch::Sender<bool>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_SIZE);
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (connected, _) = watch::channel(false);
        let store = Self {
            entries: DashMap::new(),
            changes,
            write_tx,
            write_rx: Mutex::new(Some(write_rx)),
            connected,
        };
        store.entries.insert(
            CONNECTIVITY_PATH.to_owned(),
            StateEntry {
                meta: StateMeta {
                    name: "Connected to device".to_owned(),
                    variable: String::new(),
                    kind: ValueKind::Bool,
                    writable: false,
                    min: None,
                    max: None,
                },
                value: Some(StateValue::Bool(false)),
            },
        );
        store
    }

    /// Create an entry if none exists at `path`. Returns `true` if the
    /// entry was created, `false` if it already existed (metadata of an
    /// existing entry is never replaced).
    pub fn create_if_absent(&self, path: &str, meta: StateMeta) -> bool {
        let mut created = false;
        self.entries.entry(path.to_owned()).or_insert_with(|| {
            created = true;
            trace!(path, "state entry created");
            StateEntry { meta, value: None }
        });
        created
    }

    /// Overwrite the value at `path` and broadcast the change.
    ///
    /// The value is written regardless of whether it differs from the
    /// current one -- consumers see every poll cycle.
    pub fn set(&self, path: &str, value: StateValue, ack: bool) -> Result<(), CoreError> {
        let Some(mut entry) = self.entries.get_mut(path) else {
            return Err(CoreError::UnknownPath {
                path: path.to_owned(),
            });
        };
        entry.value = Some(value.clone());
        drop(entry);

        let change = StateChange {
            path: path.to_owned(),
            value,
            ack,
        };
        if !ack {
            // Err means the dispatcher is gone, which is fine.
            let _ = self.write_tx.send(change.clone());
        }
        // Err means no subscribers, which is fine.
        let _ = self.changes.send(change);
        Ok(())
    }

    /// Snapshot of the entry at `path`.
    pub fn get(&self, path: &str) -> Option<StateEntry> {
        self.entries.get(path).map(|e| e.value().clone())
    }

    /// Number of entries, including the built-in connectivity entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Subscribe to all state changes (acked and unacked).
    ///
    /// This stream is lossy under pressure; the write-back dispatcher must
    /// use [`Self::take_write_requests`] instead.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.changes.subscribe()
    }

    /// Take the write-request stream: every `ack = false` write, in order,
    /// never dropped. There is one such stream per store; subsequent calls
    /// return `None`.
    pub fn take_write_requests(&self) -> Option<mpsc::UnboundedReceiver<StateChange>> {
        self.write_rx
            .lock()
            .expect("write request lock poisoned")
            .take()
    }

    // ── Connectivity flag ────────────────────────────────────────────

    /// Flip the connectivity flag, mirrored into the `info.connection`
    /// entry as an acked update.
    pub fn set_connected(&self, connected: bool) {
        self.connected.send_replace(connected);
        // The entry exists from construction, so this cannot fail.
        let _ = self.set(CONNECTIVITY_PATH, StateValue::Bool(connected), true);
    }

    /// Watch the connectivity flag.
    pub fn connected(&self) -> watch::Receiver<bool> {
        self.connected.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn meta(variable: &str, writable: bool) -> StateMeta {
        StateMeta {
            name: "test".to_owned(),
            variable: variable.to_owned(),
            kind: ValueKind::Number,
            writable,
            min: None,
            max: None,
        }
    }

    #[test]
    fn create_if_absent_is_idempotent() {
        let store = StateStore::new();
        assert!(store.create_if_absent("a", meta("v00001", true)));
        assert!(!store.create_if_absent("a", meta("v00002", false)));
        // First creation wins; metadata is never replaced.
        assert_eq!(store.get("a").unwrap().meta.variable, "v00001");
    }

    #[test]
    fn set_overwrites_and_broadcasts_with_ack() {
        let store = StateStore::new();
        store.create_if_absent("a", meta("v00001", true));
        let mut rx = store.subscribe();

        store.set("a", StateValue::Number(1.0), true).unwrap();
        store.set("a", StateValue::Number(2.0), false).unwrap();

        assert_eq!(store.get("a").unwrap().value, Some(StateValue::Number(2.0)));

        let first = rx.try_recv().unwrap();
        assert!(first.ack);
        assert_eq!(first.value, StateValue::Number(1.0));
        let second = rx.try_recv().unwrap();
        assert!(!second.ack);
        assert_eq!(second.value, StateValue::Number(2.0));
    }

    #[test]
    fn unacked_writes_land_on_the_write_request_stream() {
        let store = StateStore::new();
        store.create_if_absent("a", meta("v00001", true));
        let mut writes = store.take_write_requests().unwrap();

        store.set("a", StateValue::Number(1.0), true).unwrap();
        store.set("a", StateValue::Number(2.0), false).unwrap();

        let req = writes.try_recv().unwrap();
        assert_eq!(req.value, StateValue::Number(2.0));
        assert!(!req.ack);
        // Acked updates never queue as write requests.
        assert!(writes.try_recv().is_err());
        // The stream has a single consumer.
        assert!(store.take_write_requests().is_none());
    }

    #[test]
    fn write_requests_survive_heavy_acked_traffic() {
        let store = StateStore::new();
        store.create_if_absent("a", meta("v00001", true));
        let mut writes = store.take_write_requests().unwrap();
        // An undrained observer; enough acked writes to overflow it.
        let mut observer = store.subscribe();

        store.set("a", StateValue::Number(-1.0), false).unwrap();
        for i in 0..400 {
            store.set("a", StateValue::Number(f64::from(i)), true).unwrap();
        }
        store.set("a", StateValue::Number(-2.0), false).unwrap();

        // The broadcast side lagged...
        assert!(matches!(
            observer.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(_))
        ));
        // ...but both write requests are still queued, in order.
        assert_eq!(writes.try_recv().unwrap().value, StateValue::Number(-1.0));
        assert_eq!(writes.try_recv().unwrap().value, StateValue::Number(-2.0));
    }

    #[test]
    fn set_on_unknown_path_fails() {
        let store = StateStore::new();
        let err = store.set("missing", StateValue::Number(1.0), true);
        assert!(matches!(err, Err(CoreError::UnknownPath { .. })));
    }

    #[test]
    fn connectivity_entry_exists_and_tracks_flag() {
        let store = StateStore::new();
        let rx = store.connected();
        assert!(!*rx.borrow());
        assert_eq!(
            store.get(CONNECTIVITY_PATH).unwrap().value,
            Some(StateValue::Bool(false))
        );

        store.set_connected(true);
        assert!(*rx.borrow());
        assert_eq!(
            store.get(CONNECTIVITY_PATH).unwrap().value,
            Some(StateValue::Bool(true))
        );
    }

    #[test]
    fn value_display_matches_command_encoding() {
        assert_eq!(StateValue::Number(2.0).to_string(), "2");
        assert_eq!(StateValue::Number(23.5).to_string(), "23.5");
        assert_eq!(StateValue::Text("auto".into()).to_string(), "auto");
        assert_eq!(StateValue::Bool(true).to_string(), "true");
    }
}
