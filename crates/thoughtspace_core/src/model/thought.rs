//! Thought record and id assignment.

use serde::{Deserialize, Serialize};

/// Identifier of a thought, unique within its containing list.
pub type ThoughtId = i64;

/// One positioned text note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thought {
    pub id: ThoughtId,
    /// Trimmed, non-empty note text.
    pub text: String,
    /// Canvas x coordinate of the bubble's top-left corner.
    pub x: f64,
    /// Canvas y coordinate of the bubble's top-left corner.
    pub y: f64,
}

impl Thought {
    /// Builds a thought from raw input text.
    ///
    /// Returns `None` when `text` is blank after trimming or a coordinate
    /// is not finite.
    pub fn new(id: ThoughtId, text: &str, x: f64, y: f64) -> Option<Self> {
        if !is_valid_position(x, y) {
            return None;
        }
        let text = normalize_thought_text(text)?;
        Some(Self { id, text, x, y })
    }
}

/// Whether `(x, y)` can be stored. JSON has no NaN or infinity.
pub fn is_valid_position(x: f64, y: f64) -> bool {
    x.is_finite() && y.is_finite()
}

/// Trims input text; blank input yields `None`.
pub fn normalize_thought_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Returns the id for the next thought appended to `thoughts`.
///
/// `0` for an empty list, otherwise `max(id) + 1`. Gaps left by removed
/// thoughts are not reused. `None` once the id space is exhausted.
pub fn next_thought_id(thoughts: &[Thought]) -> Option<ThoughtId> {
    match thoughts.iter().map(|thought| thought.id).max() {
        Some(max) => max.checked_add(1),
        None => Some(0),
    }
}
