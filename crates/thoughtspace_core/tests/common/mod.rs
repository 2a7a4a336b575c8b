#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use thoughtspace_core::{KeyValueStore, MemoryStore, StoreError, StoreResult};

/// Memory store that can be told to fail reads or writes.
///
/// Relies on the trait's default `apply_batch`, so batched commits run as
/// sequential writes and can be interrupted part-way.
pub struct FaultyStore {
    pub inner: MemoryStore,
    fail_reads: AtomicBool,
    /// Remaining successful writes; negative means unlimited.
    writes_left: AtomicI64,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_reads: AtomicBool::new(false),
            writes_left: AtomicI64::new(-1),
        }
    }

    pub fn fail_reads(&self, enabled: bool) {
        self.fail_reads.store(enabled, Ordering::SeqCst);
    }

    /// Lets `count` more writes succeed, then fails every write.
    pub fn fail_writes_after(&self, count: i64) {
        self.writes_left.store(count, Ordering::SeqCst);
    }

    pub fn heal(&self) {
        self.fail_reads(false);
        self.writes_left.store(-1, Ordering::SeqCst);
    }

    fn check_write(&self) -> StoreResult<()> {
        let left = self.writes_left.load(Ordering::SeqCst);
        if left < 0 {
            return Ok(());
        }
        if left == 0 {
            return Err(StoreError::Unavailable("injected write failure".to_string()));
        }
        self.writes_left.store(left - 1, Ordering::SeqCst);
        Ok(())
    }
}

impl KeyValueStore for FaultyStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected read failure".to_string()));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check_write()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.check_write()?;
        self.inner.remove(key)
    }
}
