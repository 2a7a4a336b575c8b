//! Domain model for thoughts and spaces.
//!
//! # Responsibility
//! - Define the records persisted as JSON in the key-value store.
//! - Keep mutation helpers that maintain `updated_at` / `is_saved`.
//!
//! # Invariants
//! - Thought ids are unique within one thought list and never reused
//!   while the list holds a larger id.
//! - Any mutation of a `Space` clears `is_saved`.

pub mod space;
pub mod thought;
pub mod timestamp;
