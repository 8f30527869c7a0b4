use std::collections::BTreeMap;
use std::sync::Arc;

use crate::store::KeyValueStore;

/// Storage key holding the serialized map.
pub const READ_STATUS_KEY: &str = "readStatus";

pub type ReadStatusMap = BTreeMap<String, bool>;

/// Remembers which articles were opened, by `tid`.
///
/// Grows only. The whole map is written back after every change; storage
/// failures are logged and never surface to the caller.
pub struct ReadStatusTracker {
    store: Arc<dyn KeyValueStore + Send + Sync>,
    map: ReadStatusMap,
}

impl ReadStatusTracker {
    /// A missing or unreadable snapshot starts an empty map.
    pub fn load(store: Arc<dyn KeyValueStore + Send + Sync>) -> Self {
        let map = match store.get(READ_STATUS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "discarding corrupt read-status snapshot");
                ReadStatusMap::new()
            }),
            Ok(None) => ReadStatusMap::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not load read-status snapshot");
                ReadStatusMap::new()
            }
        };

        Self { store, map }
    }

    pub fn is_read(&self, tid: &str) -> bool {
        self.map.get(tid).copied().unwrap_or(false)
    }

    /// Returns `true` if the item was not read before.
    pub fn mark_read(&mut self, tid: &str) -> bool {
        if self.is_read(tid) {
            return false;
        }

        self.map.insert(tid.to_string(), true);
        self.persist();
        true
    }

    pub fn snapshot(&self) -> &ReadStatusMap {
        &self.map
    }

    fn persist(&self) {
        let raw = match serde_json::to_string(&self.map) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "could not serialize read-status map");
                return;
            }
        };

        if let Err(e) = self.store.set(READ_STATUS_KEY, &raw) {
            tracing::warn!(error = %e, "could not persist read-status map");
        }
    }
}
