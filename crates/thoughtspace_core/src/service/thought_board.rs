//! Flat thought board with optimistic persistence.
//!
//! # Responsibility
//! - Keep the `@thoughts` list in memory and write it through on every
//!   mutation.
//!
//! # Invariants
//! - Each mutation applies to memory first, then persists; on store failure
//!   memory is rolled back and the error is returned.
//! - Blank text, unknown ids and non-finite coordinates are no-ops that do
//!   not touch the store.

use crate::config::CanvasBounds;
use crate::model::thought::{is_valid_position, Thought, ThoughtId};
use crate::repo::thought_repo::ThoughtRepository;
use crate::repo::RepoResult;
use crate::service::commit_with_rollback;
use crate::store::KeyValueStore;
use log::info;

/// In-memory mirror of the `@thoughts` key.
pub struct ThoughtBoard<S> {
    repo: ThoughtRepository<S>,
    canvas: CanvasBounds,
    thoughts: Vec<Thought>,
}

impl<S: KeyValueStore> ThoughtBoard<S> {
    pub fn new(store: S, canvas: CanvasBounds) -> Self {
        Self {
            repo: ThoughtRepository::new(store),
            canvas,
            thoughts: Vec::new(),
        }
    }

    /// Replaces memory with the stored list.
    pub fn load(&mut self) -> &[Thought] {
        self.thoughts = self.repo.load();
        info!(
            "event=board_load module=service status=ok count={}",
            self.thoughts.len()
        );
        &self.thoughts
    }

    pub fn thoughts(&self) -> &[Thought] {
        &self.thoughts
    }

    /// Adds a thought at a random canvas position.
    pub fn add_thought(&mut self, text: &str) -> RepoResult<Option<ThoughtId>> {
        let (x, y) = self.canvas.random_position();
        self.add_thought_at(text, x, y)
    }

    /// Adds a thought at the given position.
    ///
    /// Blank text, non-finite coordinates and an exhausted id space return
    /// `Ok(None)` without touching the store.
    pub fn add_thought_at(&mut self, text: &str, x: f64, y: f64) -> RepoResult<Option<ThoughtId>> {
        let Some(id) = ThoughtRepository::<S>::next_id(&self.thoughts) else {
            return Ok(None);
        };
        let Some(thought) = Thought::new(id, text, x, y) else {
            return Ok(None);
        };

        let mut next = self.thoughts.clone();
        next.push(thought);
        self.write_through(next)?;
        Ok(Some(id))
    }

    /// Moves one thought. Returns `false` for unknown ids and non-finite
    /// coordinates.
    pub fn update_thought_position(&mut self, id: ThoughtId, x: f64, y: f64) -> RepoResult<bool> {
        if !is_valid_position(x, y) || !self.thoughts.iter().any(|thought| thought.id == id) {
            return Ok(false);
        }
        let next = self
            .thoughts
            .iter()
            .map(|thought| {
                if thought.id == id {
                    Thought { x, y, ..thought.clone() }
                } else {
                    thought.clone()
                }
            })
            .collect();
        self.write_through(next)?;
        Ok(true)
    }

    /// Removes one thought. Returns `false` for unknown ids.
    pub fn remove_thought(&mut self, id: ThoughtId) -> RepoResult<bool> {
        if !self.thoughts.iter().any(|thought| thought.id == id) {
            return Ok(false);
        }
        let next = self
            .thoughts
            .iter()
            .filter(|thought| thought.id != id)
            .cloned()
            .collect();
        self.write_through(next)?;
        Ok(true)
    }

    /// Empties the board and removes the stored key.
    pub fn clear_all_thoughts(&mut self) -> RepoResult<()> {
        let repo = &self.repo;
        commit_with_rollback(&mut self.thoughts, Vec::new(), |_| repo.clear())
    }

    fn write_through(&mut self, next: Vec<Thought>) -> RepoResult<()> {
        let repo = &self.repo;
        commit_with_rollback(&mut self.thoughts, next, |thoughts| repo.save(thoughts))
    }
}
