//! In-memory store
//!
//! Keeps the state in a hash map guarded by a reader-writer lock. Nothing
//! survives the process; useful for tests and ephemeral caches.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use super::aol::DEFAULT_MAX_RECORD_SIZE;
use super::errors::{StoreError, StoreResult};
use super::{check_record_size, Store};
use crate::observability::{DiagnosticSink, Event};

/// Construction options for [`MemoryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryConfig {
    /// Ceiling on key + value bytes per entry
    pub max_record_size: usize,
}

impl MemoryConfig {
    pub fn new() -> Self {
        Self {
            max_record_size: DEFAULT_MAX_RECORD_SIZE,
        }
    }

    pub fn with_max_record_size(mut self, max_record_size: usize) -> Self {
        self.max_record_size = max_record_size;
        self
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub struct MemoryStore {
    max_record_size: usize,
    sink: Arc<dyn DiagnosticSink>,
    table: RwLock<HashMap<String, Vec<u8>>>,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new(config: MemoryConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        let max_record_size = config.max_record_size.to_string();
        sink.event(
            Event::StoreOpened,
            &[
                ("backend", "memory"),
                ("max_record_size", max_record_size.as_str()),
            ],
        );

        Self {
            max_record_size: config.max_record_size,
            sink,
            table: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found(key))
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        if let Err(err) = check_record_size(key, value, self.max_record_size) {
            self.sink
                .event(Event::WriteRejected, &[("error", err.to_string().as_str())]);
            return Err(err);
        }

        self.table
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.table
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }

    fn close(&self) -> StoreResult<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.sink.event(Event::StoreClosed, &[("backend", "memory")]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::{MemorySink, SilentSink};
    use crate::store::is_not_found_error;

    fn create_store() -> MemoryStore {
        MemoryStore::new(
            MemoryConfig::new().with_max_record_size(1024),
            Arc::new(SilentSink),
        )
    }

    #[test]
    fn test_put_then_get() {
        let store = create_store();
        store.put("name", b"mohamed samir").unwrap();

        assert_eq!(store.get("name").unwrap(), b"mohamed samir");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_missing_key() {
        let store = create_store();
        let err = store.get("name").unwrap_err();
        assert!(is_not_found_error(&err));
        assert!(store.is_not_found_error(&err));
    }

    #[test]
    fn test_overwrite_and_delete() {
        let store = create_store();
        store.put("k", b"v1").unwrap();
        store.put("k", b"v2").unwrap();
        assert_eq!(store.get("k").unwrap(), b"v2");

        store.delete("k").unwrap();
        assert!(is_not_found_error(&store.get("k").unwrap_err()));
        assert!(store.is_empty());

        // Deleting again is not an error
        store.delete("k").unwrap();
    }

    #[test]
    fn test_oversized_put_is_bad_request() {
        let sink = MemorySink::new();
        let store = MemoryStore::new(
            MemoryConfig::new().with_max_record_size(4),
            Arc::new(sink.clone()),
        );

        let err = store.put("key", b"xy").unwrap_err();
        assert!(store.is_bad_request_error(&err));
        assert!(store.is_empty());
        assert_eq!(sink.entries_for(Event::WriteRejected).len(), 1);
    }

    #[test]
    fn test_default_limit_is_one_mib() {
        assert_eq!(MemoryConfig::default().max_record_size, 1024 * 1024);
    }

    #[test]
    fn test_close_logs_once() {
        let sink = MemorySink::new();
        let store = MemoryStore::new(MemoryConfig::new(), Arc::new(sink.clone()));

        store.close().unwrap();
        store.close().unwrap();
        assert_eq!(sink.entries_for(Event::StoreClosed).len(), 1);
    }
}
