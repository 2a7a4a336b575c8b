//! Persistence adapters over the key-value store.
//!
//! # Responsibility
//! - Map thoughts/spaces to their stored JSON keys.
//! - Keep serialization details out of the session layer.
//!
//! # Invariants
//! - Store failures propagate as `RepoError::Store`.
//! - Missing or unparseable stored JSON is treated as "no data" and logged,
//!   never surfaced as an error.

use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod space_repo;
pub mod thought_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence adapter error.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying store read/write failure.
    Store(StoreError),
    /// A record could not be encoded to JSON.
    Encode(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "storage error: {err}"),
            Self::Encode(err) => write!(f, "failed to encode record: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}
