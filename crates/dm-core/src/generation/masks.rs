//! Per-cell lookups of rooms and passages shared by the shaping steps

use crate::grid::{Coord, MapGrid};

/// Room and passage membership, indexed like the grid
pub(crate) struct FeatureMask {
    room_interior: Vec<bool>,
    room_entrance: Vec<bool>,
    entrance_outside: Vec<bool>,
    room_wall: Vec<bool>,
    passage: Vec<bool>,
}

impl FeatureMask {
    pub fn build(grid: &MapGrid) -> Self {
        let n = grid.len();
        let mut mask = Self {
            room_interior: vec![false; n],
            room_entrance: vec![false; n],
            entrance_outside: vec![false; n],
            room_wall: vec![false; n],
            passage: vec![false; n],
        };

        for room in grid.rooms() {
            for c in room.cells() {
                let Some(i) = grid.index(c) else { continue };
                if c == room.entrance {
                    mask.room_entrance[i] = true;
                } else if room.is_perimeter(c) {
                    mask.room_wall[i] = true;
                } else {
                    mask.room_interior[i] = true;
                }
            }
            if let Some(i) = grid.index(room.outside_entrance()) {
                mask.entrance_outside[i] = true;
            }
        }

        for passage in grid.passages() {
            for &c in &passage.cells {
                if let Some(i) = grid.index(c) {
                    mask.passage[i] = true;
                }
            }
        }
        mask
    }

    /// Interior or entrance
    pub fn is_room_space(&self, i: usize) -> bool {
        self.room_interior[i] || self.room_entrance[i]
    }

    pub fn is_entrance_outside(&self, i: usize) -> bool {
        self.entrance_outside[i]
    }

    pub fn is_room_wall(&self, i: usize) -> bool {
        self.room_wall[i]
    }

    pub fn is_passage(&self, i: usize) -> bool {
        self.passage[i]
    }
}

/// True if clearing the object at `c` would open `zone` into a neighbouring
/// zone: some 4-neighbour of another zone is open, or belongs to a higher id
/// (meaning `c` is on the walled side of that boundary).
pub(crate) fn guards_boundary(grid: &MapGrid, c: Coord, zone: i32) -> bool {
    c.neighbors4().into_iter().any(|n| {
        if !grid.in_bounds(n) {
            return false;
        }
        let other = grid.zone(n);
        other != zone && (grid.is_open(n) || other > zone)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Room, Tag};

    #[test]
    fn test_mask_marks_room_parts() {
        let mut grid = MapGrid::new(8, 8);
        grid.add_room(Room {
            zone: 0,
            origin: Coord::new(2, 2),
            width: 4,
            height: 4,
            entrance: Coord::new(3, 2),
        });
        let mask = FeatureMask::build(&grid);
        let idx = |x, y| grid.index(Coord::new(x, y)).unwrap();
        assert!(mask.is_room_space(idx(3, 3)));
        assert!(mask.is_room_space(idx(3, 2)));
        assert!(mask.is_room_wall(idx(2, 2)));
        assert!(mask.is_entrance_outside(idx(3, 1)));
        assert!(!mask.is_passage(idx(3, 1)));
    }

    #[test]
    fn test_guards_boundary() {
        let mut grid = MapGrid::new(4, 1);
        grid.apply_zone_labels(&[0, 0, 1, 1]).unwrap();
        grid.set_object(Coord::new(1, 0), Tag(2), 10);
        grid.set_object(Coord::new(2, 0), Tag(4), 10);
        // lower side of the boundary always guards
        assert!(guards_boundary(&grid, Coord::new(1, 0), 0));
        // higher side only guards if the lower cell is open
        assert!(!guards_boundary(&grid, Coord::new(2, 0), 1));
        grid.remove_object(Coord::new(1, 0));
        assert!(guards_boundary(&grid, Coord::new(2, 0), 1));
    }
}
