//! Grid Coordinates
//!
//! Integer cell positions and single-step deltas on the board.

use std::fmt;
use std::ops::{Add, Sub};
use serde::{Serialize, Deserialize};

/// A cell on the board. `(0, 0)` is Blue's bottom-left corner.
///
/// Signed so that deltas and off-board probes need no casts.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Coord {
    /// Column
    pub x: i32,
    /// Row (Blue advances toward +y)
    pub y: i32,
}

impl Coord {
    /// Create a coordinate.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Delta from `self` to `to`.
    #[inline]
    pub fn delta_to(self, to: Coord) -> Delta {
        to - self
    }

    /// Check this cell lies within a `width` x `height` grid.
    #[inline]
    pub fn in_bounds(self, width: u32, height: u32) -> bool {
        self.x >= 0 && self.y >= 0 && (self.x as u32) < width && (self.y as u32) < height
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Signed offset between two cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Delta {
    /// Column offset
    pub dx: i32,
    /// Row offset
    pub dy: i32,
}

impl Delta {
    /// Create a delta.
    #[inline]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Chebyshev length: max(|dx|, |dy|).
    #[inline]
    pub fn chebyshev(self) -> i32 {
        self.dx.abs().max(self.dy.abs())
    }

    /// Manhattan length: |dx| + |dy|.
    #[inline]
    pub fn manhattan(self) -> i32 {
        self.dx.abs() + self.dy.abs()
    }
}

impl Sub for Coord {
    type Output = Delta;
    #[inline]
    fn sub(self, rhs: Coord) -> Delta {
        Delta {
            dx: self.x.wrapping_sub(rhs.x),
            dy: self.y.wrapping_sub(rhs.y),
        }
    }
}

impl Add<Delta> for Coord {
    type Output = Coord;
    #[inline]
    fn add(self, rhs: Delta) -> Coord {
        Coord {
            x: self.x.wrapping_add(rhs.dx),
            y: self.y.wrapping_add(rhs.dy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_between_cells() {
        let from = Coord::new(1, 1);
        let to = Coord::new(2, 4);
        assert_eq!(from.delta_to(to), Delta::new(1, 3));
        assert_eq!(from + Delta::new(1, 3), to);
    }

    #[test]
    fn test_delta_lengths() {
        let d = Delta::new(-1, 3);
        assert_eq!(d.chebyshev(), 3);
        assert_eq!(d.manhattan(), 4);
        assert_eq!(Delta::default().chebyshev(), 0);
    }

    #[test]
    fn test_in_bounds() {
        assert!(Coord::new(0, 0).in_bounds(3, 5));
        assert!(Coord::new(2, 4).in_bounds(3, 5));
        assert!(!Coord::new(3, 0).in_bounds(3, 5));
        assert!(!Coord::new(0, 5).in_bounds(3, 5));
        assert!(!Coord::new(-1, 2).in_bounds(3, 5));
    }
}
