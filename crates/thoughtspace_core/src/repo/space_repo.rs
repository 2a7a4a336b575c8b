//! Space persistence: per-space documents, metadata index, current pointer.
//!
//! # Responsibility
//! - Read/write `@space_<id>` documents and the `@spaces` metadata index.
//! - Manage the `@current_space` pointer.
//!
//! # Invariants
//! - The index holds at most one entry per space id; re-saving a space
//!   replaces its entry in place.
//! - `save_space` / `delete_space` commit the document write and the index
//!   write through one `apply_batch` call, document first. The commit is
//!   atomic only on stores that override `apply_batch`; elsewhere an
//!   interrupted commit can leave a document without an index entry. No
//!   repair pass reconciles the two.

use crate::model::space::{Space, SpaceMetadata, DEFAULT_SPACE_NAME};
use crate::repo::{RepoError, RepoResult};
use crate::store::{KeyValueStore, KvWrite};
use log::{error, info, warn};
use rand::Rng;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Store key of the metadata index.
pub const SPACES_KEY: &str = "@spaces";
/// Store key of the current-space pointer.
pub const CURRENT_SPACE_KEY: &str = "@current_space";
/// Prefix of per-space document keys.
pub const SPACE_KEY_PREFIX: &str = "@space_";

const ID_SUFFIX_LEN: usize = 9;

/// Store key of one space document.
pub fn space_key(space_id: &str) -> String {
    format!("{SPACE_KEY_PREFIX}{space_id}")
}

/// Generates a new space id: `space_<epoch-millis>_<9 base36 chars>`.
///
/// Unique with overwhelming probability; collisions are not detected.
pub fn generate_space_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis());
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .filter_map(|_| char::from_digit(rng.random_range(0..36), 36))
        .collect();
    format!("space_{millis}_{suffix}")
}

/// Adapter for space documents and their index.
pub struct SpaceRepository<S> {
    store: S,
}

impl<S: KeyValueStore> SpaceRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Builds a fresh unsaved space in memory. Does not touch the store.
    ///
    /// Absent or blank names fall back to [`DEFAULT_SPACE_NAME`].
    pub fn create_new_space(name: Option<&str>) -> Space {
        let name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_SPACE_NAME);
        Space::new(generate_space_id(), name)
    }

    /// Reads the metadata index. Absent or malformed index yields empty.
    pub fn get_spaces_metadata(&self) -> RepoResult<Vec<SpaceMetadata>> {
        let Some(raw) = self.store.get(SPACES_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(err) => {
                warn!(
                    "event=spaces_index_load module=repo status=error error_code=parse_failed error={}",
                    err
                );
                Ok(Vec::new())
            }
        }
    }

    /// Overwrites the metadata index.
    pub fn save_spaces_metadata(&self, entries: &[SpaceMetadata]) -> RepoResult<()> {
        let json = serde_json::to_string(entries)?;
        self.store.set(SPACES_KEY, &json)?;
        Ok(())
    }

    /// Reads one space document. Absent or malformed documents yield `None`.
    pub fn get_space(&self, space_id: &str) -> RepoResult<Option<Space>> {
        let Some(raw) = self.store.get(&space_key(space_id))? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(space) => Ok(Some(space)),
            Err(err) => {
                warn!(
                    "event=space_load module=repo status=error error_code=parse_failed space_id={} error={}",
                    space_id, err
                );
                Ok(None)
            }
        }
    }

    /// Writes the full document, then upserts its index entry.
    pub fn save_space(&self, space: &Space) -> RepoResult<()> {
        let started_at = Instant::now();
        let document = serde_json::to_string(space)?;

        let mut entries = self.get_spaces_metadata()?;
        let metadata = space.metadata();
        match entries.iter_mut().find(|entry| entry.id == space.id) {
            Some(existing) => *existing = metadata,
            None => entries.push(metadata),
        }
        let index = serde_json::to_string(&entries)?;

        self.commit(
            "space_save",
            &space.id,
            &[
                KvWrite::set(space_key(&space.id), document),
                KvWrite::set(SPACES_KEY, index),
            ],
        )?;
        info!(
            "event=space_save module=repo status=ok space_id={} thought_count={} index_len={} duration_ms={}",
            space.id,
            space.thoughts.len(),
            entries.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Removes the document, then drops its index entry.
    ///
    /// Deleting an unknown id succeeds.
    pub fn delete_space(&self, space_id: &str) -> RepoResult<()> {
        let mut entries = self.get_spaces_metadata()?;
        entries.retain(|entry| entry.id != space_id);
        let index = serde_json::to_string(&entries)?;

        self.commit(
            "space_delete",
            space_id,
            &[
                KvWrite::remove(space_key(space_id)),
                KvWrite::set(SPACES_KEY, index),
            ],
        )?;
        info!(
            "event=space_delete module=repo status=ok space_id={} index_len={}",
            space_id,
            entries.len()
        );
        Ok(())
    }

    /// Reads the current-space pointer. Blank values count as absent.
    pub fn get_current_space_id(&self) -> RepoResult<Option<String>> {
        let pointer = self.store.get(CURRENT_SPACE_KEY)?;
        Ok(pointer
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty()))
    }

    pub fn set_current_space_id(&self, space_id: &str) -> RepoResult<()> {
        self.store.set(CURRENT_SPACE_KEY, space_id)?;
        Ok(())
    }

    pub fn clear_current_space_id(&self) -> RepoResult<()> {
        self.store.remove(CURRENT_SPACE_KEY)?;
        Ok(())
    }

    fn commit(&self, event: &str, space_id: &str, writes: &[KvWrite]) -> RepoResult<()> {
        self.store.apply_batch(writes).map_err(|err| {
            error!(
                "event={} module=repo status=error error_code=commit_failed space_id={} error={}",
                event, space_id, err
            );
            RepoError::Store(err)
        })
    }
}
