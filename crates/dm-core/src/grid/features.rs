//! Rooms and passages recorded on the grid

use serde::{Deserialize, Serialize};

use super::Coord;

/// A walled rectangular room with a single entrance.
///
/// `origin`/`width`/`height` cover the walls; the interior is the rectangle
/// shrunk by one on every side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub zone: i32,
    pub origin: Coord,
    pub width: i32,
    pub height: i32,
    pub entrance: Coord,
}

impl Room {
    pub fn right(&self) -> i32 {
        self.origin.x + self.width - 1
    }

    pub fn bottom(&self) -> i32 {
        self.origin.y + self.height - 1
    }

    /// Inside the rectangle, walls included
    pub fn contains(&self, c: Coord) -> bool {
        c.x >= self.origin.x && c.x <= self.right() && c.y >= self.origin.y && c.y <= self.bottom()
    }

    pub fn is_perimeter(&self, c: Coord) -> bool {
        self.contains(c)
            && (c.x == self.origin.x
                || c.x == self.right()
                || c.y == self.origin.y
                || c.y == self.bottom())
    }

    pub fn is_interior(&self, c: Coord) -> bool {
        self.contains(c) && !self.is_perimeter(c)
    }

    /// Perimeter cells other than the entrance
    pub fn is_wall(&self, c: Coord) -> bool {
        self.is_perimeter(c) && c != self.entrance
    }

    pub fn cells(&self) -> impl Iterator<Item = Coord> + '_ {
        (self.origin.y..=self.bottom())
            .flat_map(move |y| (self.origin.x..=self.right()).map(move |x| Coord::new(x, y)))
    }

    pub fn interior_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells().filter(move |c| self.is_interior(*c))
    }

    pub fn perimeter_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells().filter(move |c| self.is_perimeter(*c))
    }

    /// The cell just outside the entrance
    pub fn outside_entrance(&self) -> Coord {
        outward_neighbor(self.origin, self.right(), self.bottom(), self.entrance)
    }
}

/// Step from a non-corner perimeter cell to the cell outside the rectangle.
pub(crate) fn outward_neighbor(origin: Coord, right: i32, bottom: i32, c: Coord) -> Coord {
    if c.x == origin.x {
        c.offset(-1, 0)
    } else if c.x == right {
        c.offset(1, 0)
    } else if c.y == origin.y {
        c.offset(0, -1)
    } else {
        debug_assert_eq!(c.y, bottom);
        c.offset(0, 1)
    }
}

/// A carved opening between two zones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Lower zone id
    pub zone_a: i32,
    /// Higher zone id
    pub zone_b: i32,
    pub cells: Vec<Coord>,
}

impl Passage {
    pub fn new(a: i32, b: i32, cells: Vec<Coord>) -> Self {
        Self {
            zone_a: a.min(b),
            zone_b: a.max(b),
            cells,
        }
    }

    pub fn connects(&self, zone: i32) -> bool {
        self.zone_a == zone || self.zone_b == zone
    }

    /// The zone on the far side from `zone`
    pub fn other(&self, zone: i32) -> Option<i32> {
        if zone == self.zone_a {
            Some(self.zone_b)
        } else if zone == self.zone_b {
            Some(self.zone_a)
        } else {
            None
        }
    }

    /// Carved cell nearest the centroid; first one wins ties.
    pub fn mid_cell(&self) -> Option<Coord> {
        if self.cells.is_empty() {
            return None;
        }
        let n = self.cells.len() as f64;
        let cx = self.cells.iter().map(|c| c.x as f64).sum::<f64>() / n;
        let cy = self.cells.iter().map(|c| c.y as f64).sum::<f64>() / n;

        let mut best = self.cells[0];
        let mut best_d = f64::MAX;
        for &c in &self.cells {
            let dx = c.x as f64 - cx;
            let dy = c.y as f64 - cy;
            let d = dx * dx + dy * dy;
            if d < best_d {
                best_d = d;
                best = c;
            }
        }
        Some(best)
    }
}
