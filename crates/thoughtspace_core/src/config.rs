//! Session configuration and bubble placement.
//!
//! # Responsibility
//! - Describe the canvas new thoughts are dropped onto.
//! - Hold per-session defaults (space name).
//!
//! # Invariants
//! - `random_position` never panics, even for degenerate canvas sizes;
//!   axes without room collapse to `0.0`.

use crate::model::space::DEFAULT_SPACE_NAME;
use rand::Rng;

/// Canvas geometry used to place new thought bubbles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasBounds {
    /// Logical canvas width.
    pub width: f64,
    /// Logical canvas height.
    pub height: f64,
    /// Horizontal room reserved for a bubble so it stays on screen.
    pub bubble_width: f64,
    /// Fraction of `height` (from the top) that new bubbles land in.
    pub vertical_band: f64,
}

impl Default for CanvasBounds {
    fn default() -> Self {
        Self {
            width: 390.0,
            height: 844.0,
            bubble_width: 200.0,
            vertical_band: 0.6,
        }
    }
}

impl CanvasBounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Picks a random top-left position for a new bubble.
    pub fn random_position(&self) -> (f64, f64) {
        let mut rng = rand::rng();
        let x = random_below(&mut rng, self.width - self.bubble_width);
        let y = random_below(&mut rng, self.height * self.vertical_band);
        (x, y)
    }
}

fn random_below(rng: &mut impl Rng, upper: f64) -> f64 {
    if upper.is_finite() && upper > 0.0 {
        rng.random_range(0.0..upper)
    } else {
        0.0
    }
}

/// Options for a `SpaceSession`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub canvas: CanvasBounds,
    /// Name given to spaces created by the session.
    pub default_space_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasBounds::default(),
            default_space_name: DEFAULT_SPACE_NAME.to_string(),
        }
    }
}
