use serde::{Deserialize, Serialize};

/// Distance below which two positions count as the same place.
pub const DISTANCE_TOLERANCE: f64 = 0.25;

/// A point in map space (pixels).
///
/// Equality is tolerance-based: `a == b` holds when the points are closer than
/// [`DISTANCE_TOLERANCE`]. This is symmetric but not transitive, so never use
/// `Position` as a hash or ordering key.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Bearing from `self` towards `other`, in radians.
    pub fn bearing_to(&self, other: Position) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    pub fn offset_polar(&self, distance: f64, bearing: f64) -> Position {
        Position {
            x: self.x + distance * bearing.cos(),
            y: self.y + distance * bearing.sin(),
        }
    }

    pub fn within(&self, other: Position, radius: f64) -> bool {
        self.distance(other) <= radius
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.distance(*other) < DISTANCE_TOLERANCE
    }
}
