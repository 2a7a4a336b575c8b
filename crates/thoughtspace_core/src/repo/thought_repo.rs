//! Flat thought-list persistence (the pre-spaces layout).
//!
//! # Responsibility
//! - Load/save/clear the single `@thoughts` key.
//!
//! # Invariants
//! - `save` overwrites the whole list in one store write.
//! - `load` never fails: absent, unreadable or malformed data yields an
//!   empty list.

use crate::model::thought::{next_thought_id, Thought, ThoughtId};
use crate::repo::RepoResult;
use crate::store::KeyValueStore;
use log::{debug, warn};

/// Store key holding the flat thought list.
pub const THOUGHTS_KEY: &str = "@thoughts";

/// Adapter for the `@thoughts` key.
pub struct ThoughtRepository<S> {
    store: S,
}

impl<S: KeyValueStore> ThoughtRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads the stored list, defaulting to empty.
    pub fn load(&self) -> Vec<Thought> {
        let raw = match self.store.get(THOUGHTS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(
                    "event=thoughts_load module=repo status=error error_code=store_read_failed error={}",
                    err
                );
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Thought>>(&raw) {
            Ok(thoughts) => {
                debug!(
                    "event=thoughts_load module=repo status=ok count={}",
                    thoughts.len()
                );
                thoughts
            }
            Err(err) => {
                warn!(
                    "event=thoughts_load module=repo status=error error_code=parse_failed error={}",
                    err
                );
                Vec::new()
            }
        }
    }

    /// Overwrites the stored list.
    pub fn save(&self, thoughts: &[Thought]) -> RepoResult<()> {
        let json = serde_json::to_string(thoughts)?;
        self.store.set(THOUGHTS_KEY, &json)?;
        debug!(
            "event=thoughts_save module=repo status=ok count={}",
            thoughts.len()
        );
        Ok(())
    }

    /// Removes the stored list.
    pub fn clear(&self) -> RepoResult<()> {
        self.store.remove(THOUGHTS_KEY)?;
        Ok(())
    }

    /// Id for the next thought appended to `thoughts`, `None` when exhausted.
    pub fn next_id(thoughts: &[Thought]) -> Option<ThoughtId> {
        next_thought_id(thoughts)
    }
}
