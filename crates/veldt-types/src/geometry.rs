//! Positions and distance math on the square world plane.
//!
//! The world is a `[0, 1000) x [0, 1000)` plane with Euclidean distance.
//! Positions are plain `f64` pairs; all movement is "step toward a point by
//! at most `speed` units", so no pathfinding lives here.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Edge length of the square world, in world units.
pub const WORLD_SIZE: f64 = 1000.0;

/// A point on the world plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Horizontal coordinate in `[0, WORLD_SIZE)`.
    pub x: f64,
    /// Vertical coordinate in `[0, WORLD_SIZE)`.
    pub y: f64,
}

impl Position {
    /// Create a position from raw coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.hypot(dy)
    }

    /// Whether the position lies inside the world bounds.
    pub fn in_bounds(&self) -> bool {
        self.x >= 0.0 && self.x < WORLD_SIZE && self.y >= 0.0 && self.y < WORLD_SIZE
    }

    /// Move toward `target` by at most `speed` units.
    ///
    /// Returns the new position and whether the target was reached this
    /// step. A step that would overshoot snaps exactly onto the target.
    pub fn step_toward(&self, target: &Self, speed: f64) -> (Self, bool) {
        let remaining = self.distance_to(target);
        if remaining <= speed || remaining <= f64::EPSILON {
            return (*target, true);
        }
        let scale = speed / remaining;
        let next = Self {
            x: self.x + (target.x - self.x) * scale,
            y: self.y + (target.y - self.y) * scale,
        };
        (next, false)
    }

    /// Clamp the position into world bounds.
    ///
    /// Used by random walks that would otherwise drift off the edge. The
    /// upper bound is exclusive, so the clamp lands just inside it.
    pub fn clamped(&self) -> Self {
        let max = WORLD_SIZE - f64::EPSILON * WORLD_SIZE;
        Self {
            x: self.x.clamp(0.0, max),
            y: self.y.clamp(0.0, max),
        }
    }
}
