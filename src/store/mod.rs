//! Key-value store contract and its backends
//!
//! - [`AppendLogStore`]: persistent, one append-only log file
//! - [`MemoryStore`]: volatile, a guarded hash map
//!
//! Both enforce the same size rule and return the same error kinds, so the
//! backend is a construction-time choice only.

mod aol;
mod errors;
mod memory;

pub use aol::{AolConfig, AppendLogStore, DEFAULT_MAX_RECORD_SIZE, LOG_FILE_NAME};
pub use errors::{is_bad_request_error, is_not_found_error, StoreError, StoreResult};
pub use memory::{MemoryConfig, MemoryStore};

use std::sync::Arc;

use crate::config::{Backend, StoreConfig};
use crate::observability::DiagnosticSink;

/// Operations every backend provides.
pub trait Store: Send + Sync {
    /// Returns the value of `key`, or `NotFound` if it is absent or deleted.
    fn get(&self, key: &str) -> StoreResult<Vec<u8>>;

    /// Stores `value` under `key`. Returns `BadRequest` if the pair is too big.
    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Deletes the value of `key`. Deleting an absent key succeeds.
    fn delete(&self, key: &str) -> StoreResult<()>;

    /// Closes the store. Calling it again is a no-op.
    fn close(&self) -> StoreResult<()>;

    fn is_not_found_error(&self, err: &StoreError) -> bool {
        is_not_found_error(err)
    }

    fn is_bad_request_error(&self, err: &StoreError) -> bool {
        is_bad_request_error(err)
    }
}

/// Opens the backend selected by `config`.
pub fn open_store(
    config: &StoreConfig,
    sink: Arc<dyn DiagnosticSink>,
) -> StoreResult<Box<dyn Store>> {
    match config.backend {
        Backend::AppendLog => {
            let aol_config = AolConfig::new(&config.data_dir)
                .with_max_record_size(config.max_record_size)
                .with_async_writes(config.async_writes);
            Ok(Box::new(AppendLogStore::open(aol_config, sink)?))
        }
        Backend::Memory => Ok(Box::new(MemoryStore::new(
            MemoryConfig::new().with_max_record_size(config.max_record_size),
            sink,
        ))),
    }
}

/// Size check shared by all backends.
fn check_record_size(key: &str, value: &[u8], max_record_size: usize) -> StoreResult<()> {
    let size = key.len() as u64 + value.len() as u64;
    if size > max_record_size as u64 {
        return Err(StoreError::bad_request(format!(
            "key-value too big: {} bytes, max size allowed: {}",
            size, max_record_size
        )));
    }
    Ok(())
}
