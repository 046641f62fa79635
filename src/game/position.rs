//! Board cells and distance geometry.

use serde::{Deserialize, Serialize};

/// A cell on the board.
///
/// Signed so that malformed wire input (negative coordinates) can be
/// represented and rejected as out of bounds instead of failing to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Key for row-major ordering: rows first, then columns.
    #[must_use]
    pub const fn row_major(self) -> (i32, i32) {
        (self.y, self.x)
    }

    /// Absolute per-axis offsets to another position.
    #[must_use]
    pub const fn offsets(self, other: Self) -> (u32, u32) {
        (self.x.abs_diff(other.x), self.y.abs_diff(other.y))
    }

    /// Whether `other` lies on the same row, column, or 45-degree diagonal.
    #[must_use]
    pub const fn is_straight_line(self, other: Self) -> bool {
        let (dx, dy) = self.offsets(other);
        dx == 0 || dy == 0 || dx == dy
    }

    /// Distance to `other` under the given metric.
    #[must_use]
    pub const fn distance(self, other: Self, metric: DistanceMetric) -> u32 {
        let (dx, dy) = self.offsets(other);
        match metric {
            DistanceMetric::Chebyshev => {
                if dx > dy {
                    dx
                } else {
                    dy
                }
            }
            DistanceMetric::Manhattan => dx.saturating_add(dy),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// How step distances are measured on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// King-move distance: diagonals cost one step.
    #[default]
    Chebyshev,
    /// Taxicab distance: diagonals cost two steps.
    Manhattan,
}
