//! Integer grid coordinates

use serde::{Deserialize, Serialize};

/// 4-neighbour offsets, in frontier push order
pub const DIRS4: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// 8-neighbour offsets
pub const DIRS8: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// City-block distance
    pub const fn manhattan(self, other: Coord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn neighbors4(self) -> [Coord; 4] {
        DIRS4.map(|(dx, dy)| self.offset(dx, dy))
    }

    /// Every coordinate within city-block distance `radius`, self included.
    pub fn diamond(self, radius: i32) -> impl Iterator<Item = Coord> {
        let r = radius.max(0);
        (-r..=r).flat_map(move |dy| {
            let span = r - dy.abs();
            (-span..=span).map(move |dx| self.offset(dx, dy))
        })
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan() {
        assert_eq!(Coord::new(0, 0).manhattan(Coord::new(3, -4)), 7);
    }

    #[test]
    fn test_diamond_size() {
        // 2r^2 + 2r + 1 cells
        assert_eq!(Coord::new(5, 5).diamond(0).count(), 1);
        assert_eq!(Coord::new(5, 5).diamond(1).count(), 5);
        assert_eq!(Coord::new(5, 5).diamond(2).count(), 13);
        let origin = Coord::new(0, 0);
        assert!(origin.diamond(3).all(|c| c.manhattan(origin) <= 3));
    }

    #[test]
    fn test_neighbors4_order() {
        let n = Coord::new(2, 2).neighbors4();
        assert_eq!(n[0], Coord::new(3, 2));
        assert_eq!(n[1], Coord::new(1, 2));
        assert_eq!(n[2], Coord::new(2, 3));
        assert_eq!(n[3], Coord::new(2, 1));
    }
}
