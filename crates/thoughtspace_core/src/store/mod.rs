//! Key-value storage contract and implementations.
//!
//! # Responsibility
//! - Define the string-keyed store every persistence adapter writes to.
//! - Provide an in-memory store (tests, ephemeral sessions) and a
//!   SQLite-backed store (on-device persistence).
//!
//! # Invariants
//! - Keys and values are opaque UTF-8 strings; the store never parses them.
//! - `apply_batch` applies writes in the given order. Only implementations
//!   that override it are atomic.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteKvStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of the underlying key-value store.
#[derive(Debug)]
pub enum StoreError {
    /// SQLite backend failure.
    Sqlite(rusqlite::Error),
    /// A store-internal lock was poisoned by a panicking writer.
    Poisoned(&'static str),
    /// Backend refused or could not complete the call.
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Poisoned(name) => write!(f, "{name} lock poisoned"),
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Poisoned(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// One write inside a batched commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvWrite {
    Set { key: String, value: String },
    Remove { key: String },
}

impl KvWrite {
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Set {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn remove(key: impl Into<String>) -> Self {
        Self::Remove { key: key.into() }
    }

    /// Key touched by this write.
    pub fn key(&self) -> &str {
        match self {
            Self::Set { key, .. } | Self::Remove { key } => key.as_str(),
        }
    }
}

/// Persistent string-keyed store.
pub trait KeyValueStore {
    /// Reads one value. Absent keys return `Ok(None)`.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    /// Inserts or overwrites one value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    /// Removes one key. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Applies `writes` in order.
    ///
    /// The default stops at the first failure and leaves earlier writes in
    /// place. Stores with transactions override this to commit all or none.
    fn apply_batch(&self, writes: &[KvWrite]) -> StoreResult<()> {
        for write in writes {
            match write {
                KvWrite::Set { key, value } => self.set(key, value)?,
                KvWrite::Remove { key } => self.remove(key)?,
            }
        }
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }

    fn apply_batch(&self, writes: &[KvWrite]) -> StoreResult<()> {
        (**self).apply_batch(writes)
    }
}
