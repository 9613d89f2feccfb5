//! Last-seen payload per feed, used to suppress redundant publication.
//!
//! Entries are replaced wholesale and never partially mutated. Nothing is
//! persisted: a restart starts from an empty cache, so the first fetch of
//! every feed counts as a change.

use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::models::FeedKey;

#[derive(Debug, Default)]
pub struct SnapshotCache {
    entries: HashMap<FeedKey, Value>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        SnapshotCache::default()
    }

    /// Compare `payload` with the stored snapshot for `key` by exact
    /// structural equality.
    ///
    /// Returns `true` and stores `payload` when it differs or no snapshot
    /// exists yet. Returns `false` and leaves the cache untouched otherwise.
    pub fn check_and_update(&mut self, key: FeedKey, payload: Value) -> bool {
        if self.entries.get(&key) == Some(&payload) {
            return false;
        }
        debug!("Snapshot for {} replaced", key);
        self.entries.insert(key, payload);
        true
    }

    pub fn get(&self, key: &FeedKey) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Put back an earlier snapshot (or clear the slot when `previous` is
    /// `None`), e.g. after a change could not be delivered.
    pub fn restore(&mut self, key: FeedKey, previous: Option<Value>) {
        match previous {
            Some(v) => {
                self.entries.insert(key, v);
            }
            None => {
                self.entries.remove(&key);
            }
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
