//! Space document and its metadata projection.
//!
//! # Responsibility
//! - Define the per-space JSON document and the index entry derived from it.
//! - Own the mutation helpers used by the session layer.
//!
//! # Invariants
//! - `created_at` is set once at construction.
//! - Every mutating helper refreshes `updated_at` and clears `is_saved`;
//!   only `mark_saved` sets it.

use crate::model::thought::{is_valid_position, next_thought_id, Thought, ThoughtId};
use crate::model::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name given to spaces created without an explicit name.
pub const DEFAULT_SPACE_NAME: &str = "Space";

/// Opaque, globally unique space identifier.
pub type SpaceId = String;

/// A named, independently saved collection of thoughts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: SpaceId,
    pub name: String,
    /// Insertion order is display order.
    pub thoughts: Vec<Thought>,
    #[serde(with = "crate::model::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::model::timestamp")]
    pub updated_at: DateTime<Utc>,
    /// `true` only while the document matches its last explicit save.
    pub is_saved: bool,
}

impl Space {
    /// Creates an empty, unsaved space.
    pub fn new(id: impl Into<SpaceId>, name: impl Into<String>) -> Self {
        let now = timestamp::now();
        Self {
            id: id.into(),
            name: name.into(),
            thoughts: Vec::new(),
            created_at: now,
            updated_at: now,
            is_saved: false,
        }
    }

    /// Projects the index entry for this space.
    pub fn metadata(&self) -> SpaceMetadata {
        SpaceMetadata {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            thought_count: self.thoughts.len(),
        }
    }

    /// Finds a thought by id.
    pub fn thought(&self, id: ThoughtId) -> Option<&Thought> {
        self.thoughts.iter().find(|thought| thought.id == id)
    }

    /// Id the next appended thought will receive, `None` when exhausted.
    pub fn next_thought_id(&self) -> Option<ThoughtId> {
        next_thought_id(&self.thoughts)
    }

    /// Appends a thought with a freshly assigned id.
    ///
    /// Returns `None` (and leaves the space untouched) for blank text, a
    /// non-finite coordinate, or an exhausted id space.
    pub fn push_thought(&mut self, text: &str, x: f64, y: f64) -> Option<ThoughtId> {
        let thought = Thought::new(self.next_thought_id()?, text, x, y)?;
        let id = thought.id;
        self.thoughts.push(thought);
        self.mark_modified();
        Some(id)
    }

    /// Moves one thought. Unknown ids and non-finite coordinates leave the
    /// space untouched.
    pub fn move_thought(&mut self, id: ThoughtId, x: f64, y: f64) -> bool {
        if !is_valid_position(x, y) {
            return false;
        }
        let Some(thought) = self.thoughts.iter_mut().find(|thought| thought.id == id) else {
            return false;
        };
        thought.x = x;
        thought.y = y;
        self.mark_modified();
        true
    }

    /// Removes one thought. Unknown ids leave the space untouched.
    pub fn remove_thought(&mut self, id: ThoughtId) -> bool {
        let before = self.thoughts.len();
        self.thoughts.retain(|thought| thought.id != id);
        if self.thoughts.len() == before {
            return false;
        }
        self.mark_modified();
        true
    }

    /// Drops every thought.
    pub fn clear_thoughts(&mut self) {
        self.thoughts.clear();
        self.mark_modified();
    }

    /// Refreshes `updated_at` and flags the document as unsaved.
    pub fn mark_modified(&mut self) {
        self.updated_at = timestamp::now();
        self.is_saved = false;
    }

    /// Applies the state of an explicit save: optional rename, fresh
    /// `updated_at`, `is_saved = true`.
    ///
    /// Blank names keep the current name.
    pub fn mark_saved(&mut self, name: Option<&str>) {
        if let Some(name) = name.map(str::trim).filter(|name| !name.is_empty()) {
            self.name = name.to_string();
        }
        self.updated_at = timestamp::now();
        self.is_saved = true;
    }
}

/// Lightweight summary of a saved space, kept in the metadata index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceMetadata {
    pub id: SpaceId,
    pub name: String,
    #[serde(with = "crate::model::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::model::timestamp")]
    pub updated_at: DateTime<Utc>,
    pub thought_count: usize,
}

impl SpaceMetadata {
    /// Picker label, e.g. `1 thought` or `3 thoughts`.
    pub fn summary(&self) -> String {
        let noun = if self.thought_count == 1 {
            "thought"
        } else {
            "thoughts"
        };
        format!("{} {noun}", self.thought_count)
    }
}
