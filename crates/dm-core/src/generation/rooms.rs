//! Room placement
//!
//! A room is a walled rectangle with one entrance on its perimeter. It needs
//! an open rectangle plus an open ring around it, all inside a single zone and
//! clear of passages, so rooms never touch zone borders or each other.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::masks::FeatureMask;
use super::{GenContext, StepReport};
use crate::consts::{
    DEFAULT_ROOM_ATTEMPTS, DEFAULT_ROOM_SIZE, DEFAULT_WALL_DURABILITY, MIN_ROOM_SIZE, ROOM_WALL,
};
use crate::error::ConfigError;
use crate::grid::{Coord, MapGrid, Room, Tag, outward_neighbor};
use crate::rng::GenRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomSpec {
    /// Target zone, or -1 to try zones in random order
    pub zone: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for RoomSpec {
    fn default() -> Self {
        Self {
            zone: -1,
            width: DEFAULT_ROOM_SIZE,
            height: DEFAULT_ROOM_SIZE,
        }
    }
}

impl RoomSpec {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_ROOM_SIZE || self.height < MIN_ROOM_SIZE {
            return Err(ConfigError::RoomTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomSettings {
    pub rooms: Vec<RoomSpec>,
    pub wall: Tag,
    pub durability: i32,
    /// Random top-left samples per zone; 0 or less scans row by row
    pub max_attempts: i32,
    pub seed: Option<u64>,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            rooms: vec![RoomSpec::default()],
            wall: ROOM_WALL,
            durability: DEFAULT_WALL_DURABILITY,
            max_attempts: DEFAULT_ROOM_ATTEMPTS,
            seed: None,
        }
    }
}

impl RoomSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.wall.is_valid() {
            return Err(ConfigError::InvalidTag { what: "room wall" });
        }
        if self.durability <= 0 {
            return Err(ConfigError::TooSmall {
                what: "room wall durability",
                min: 1,
                value: self.durability,
            });
        }
        Ok(())
    }

    pub fn execute(&self, grid: &mut MapGrid, ctx: &mut GenContext, rng: &mut GenRng) -> StepReport {
        if let Err(err) = self.validate().and_then(|_| ctx.require_labels(grid)) {
            return err.into();
        }
        let placed = place_rooms(grid, self, rng);
        info!(placed, requested = self.rooms.len(), "rooms placed");
        if placed < self.rooms.len() {
            return StepReport::Partial(format!(
                "placed {placed} of {} rooms",
                self.rooms.len()
            ));
        }
        StepReport::Completed
    }
}

/// Place every room spec that fits. Returns the number placed.
pub fn place_rooms(grid: &mut MapGrid, settings: &RoomSettings, rng: &mut GenRng) -> usize {
    let zones = grid.zone_ids();
    let mut placed = 0;

    for spec in &settings.rooms {
        if let Err(err) = spec.validate() {
            warn!(%err, "room spec skipped");
            continue;
        }

        let candidates = if spec.zone >= 0 {
            vec![spec.zone]
        } else {
            let mut order = zones.clone();
            rng.shuffle(&mut order);
            order
        };

        let room = candidates
            .into_iter()
            .find_map(|zone| try_place(grid, spec, zone, settings.max_attempts, rng));
        match room {
            Some(room) => {
                for c in room.perimeter_cells() {
                    if c != room.entrance {
                        grid.set_object(c, settings.wall, settings.durability);
                    }
                }
                debug!(zone = room.zone, x = room.origin.x, y = room.origin.y, "room placed");
                grid.add_room(room);
                placed += 1;
            }
            None => warn!(
                zone = spec.zone,
                width = spec.width,
                height = spec.height,
                "no room placement found"
            ),
        }
    }
    placed
}

/// Find a top-left for `spec` inside `zone` and pick its entrance.
fn try_place(
    grid: &MapGrid,
    spec: &RoomSpec,
    zone: i32,
    max_attempts: i32,
    rng: &mut GenRng,
) -> Option<Room> {
    // The ring around the room must stay on the grid
    let max_x = grid.width() - 1 - spec.width;
    let max_y = grid.height() - 1 - spec.height;
    if max_x < 1 || max_y < 1 {
        return None;
    }

    let features = FeatureMask::build(grid);
    let origin = if max_attempts > 0 {
        (0..max_attempts).find_map(|_| {
            let c = Coord::new(rng.range_inclusive(1, max_x), rng.range_inclusive(1, max_y));
            fits(grid, &features, spec, zone, c).then_some(c)
        })?
    } else {
        (1..=max_y)
            .flat_map(|y| (1..=max_x).map(move |x| Coord::new(x, y)))
            .find(|&c| fits(grid, &features, spec, zone, c))?
    };

    let mut room = Room {
        zone,
        origin,
        width: spec.width,
        height: spec.height,
        entrance: origin,
    };
    let entrances: Vec<Coord> = room
        .perimeter_cells()
        .filter(|&c| !is_corner(&room, c))
        .filter(|&c| {
            let outside = outward_neighbor(room.origin, room.right(), room.bottom(), c);
            grid.is_open(outside) && grid.zone(outside) == zone
        })
        .collect();
    room.entrance = *rng.choose(&entrances)?;
    Some(room)
}

fn is_corner(room: &Room, c: Coord) -> bool {
    (c.x == room.origin.x || c.x == room.right()) && (c.y == room.origin.y || c.y == room.bottom())
}

/// Rectangle and surrounding ring open, inside `zone` and clear of passages.
/// The ring may be shared with another room's ring, but walls never land on
/// one.
fn fits(
    grid: &MapGrid,
    features: &FeatureMask,
    spec: &RoomSpec,
    zone: i32,
    origin: Coord,
) -> bool {
    for y in origin.y - 1..=origin.y + spec.height {
        for x in origin.x - 1..=origin.x + spec.width {
            let c = Coord::new(x, y);
            let Some(i) = grid.index(c) else {
                return false;
            };
            if !grid.is_open(c) || grid.zone(c) != zone || features.is_passage(i) {
                return false;
            }
            let inside = x >= origin.x
                && x < origin.x + spec.width
                && y >= origin.y
                && y < origin.y + spec.height;
            let clash = if inside {
                grid.rooms().iter().any(|r| in_ring_of(r, c))
            } else {
                grid.rooms().iter().any(|r| r.contains(c))
            };
            if clash {
                return false;
            }
        }
    }
    true
}

/// Inside the room or the one-cell ring around it
fn in_ring_of(room: &Room, c: Coord) -> bool {
    c.x >= room.origin.x - 1
        && c.x <= room.right() + 1
        && c.y >= room.origin.y - 1
        && c.y <= room.bottom() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::ROCK;
    use crate::generation::borders::BorderSettings;
    use crate::generation::test_support::{context_for, one_zone_grid, split_grid};

    fn single(width: i32, height: i32, zone: i32) -> RoomSettings {
        RoomSettings {
            rooms: vec![RoomSpec {
                zone,
                width,
                height,
            }],
            ..RoomSettings::default()
        }
    }

    fn assert_room_integrity(grid: &MapGrid, room: &Room) {
        for c in room.cells() {
            if room.is_wall(c) {
                assert!(grid.has_object(c), "wall missing at {c:?}");
            } else {
                assert!(grid.is_open(c), "blocked room cell at {c:?}");
            }
        }
        assert!(grid.is_open(room.entrance));
        assert!(grid.is_open(room.outside_entrance()));
    }

    #[test]
    fn test_scan_places_first_fit() {
        let mut grid = one_zone_grid(10, 10);
        let settings = RoomSettings {
            max_attempts: 0,
            ..single(4, 4, 0)
        };
        assert_eq!(place_rooms(&mut grid, &settings, &mut GenRng::new(1)), 1);
        let room = &grid.rooms()[0];
        assert_eq!(room.origin, Coord::new(1, 1));
        assert!(room.is_perimeter(room.entrance));
        assert!(!is_corner(room, room.entrance));
        let walls = room.perimeter_cells().filter(|&c| grid.has_object(c)).count();
        assert_eq!(walls, 11);
        assert_room_integrity(&grid, room);
    }

    #[test]
    fn test_random_placement_integrity() {
        let mut grid = one_zone_grid(30, 20);
        let settings = RoomSettings {
            rooms: vec![RoomSpec::default(); 3],
            ..RoomSettings::default()
        };
        let placed = place_rooms(&mut grid, &settings, &mut GenRng::new(12345));
        assert!(placed >= 1);
        for room in grid.rooms() {
            assert_room_integrity(&grid, room);
        }
        // rooms never overlap
        let rooms = grid.rooms();
        for (i, a) in rooms.iter().enumerate() {
            for b in &rooms[i + 1..] {
                assert!(a.cells().all(|c| !b.contains(c)));
            }
        }
    }

    #[test]
    fn test_room_stays_in_zone() {
        let mut grid = split_grid(30, 12);
        let settings = single(5, 5, 1);
        assert_eq!(place_rooms(&mut grid, &settings, &mut GenRng::new(4)), 1);
        let room = &grid.rooms()[0];
        assert!(room.cells().all(|c| grid.zone(c) == 1));
    }

    #[test]
    fn test_too_small_or_too_big_fails() {
        let mut grid = one_zone_grid(10, 10);
        assert_eq!(place_rooms(&mut grid, &single(2, 5, 0), &mut GenRng::new(1)), 0);
        assert_eq!(place_rooms(&mut grid, &single(9, 9, 0), &mut GenRng::new(1)), 0);
        assert!(grid.rooms().is_empty());
        assert!(grid.cells().iter().all(|c| c.is_open()));
    }

    #[test]
    fn test_blocked_ring_rejects() {
        let mut grid = one_zone_grid(7, 7);
        // 5x5 room only fits at (1,1); block one ring cell
        grid.set_object(Coord::new(0, 3), Tag(2), 10);
        let settings = RoomSettings {
            max_attempts: 0,
            ..single(5, 5, 0)
        };
        assert_eq!(place_rooms(&mut grid, &settings, &mut GenRng::new(1)), 0);
    }

    #[test]
    fn test_execute_reports_partial() {
        let mut grid = one_zone_grid(8, 8);
        let mut ctx = context_for(&grid);
        let settings = RoomSettings {
            rooms: vec![RoomSpec::default(), RoomSpec::default()],
            ..RoomSettings::default()
        };
        let report = settings.execute(&mut grid, &mut ctx, &mut GenRng::new(2));
        assert!(matches!(report, StepReport::Partial(_)));
        assert_eq!(grid.rooms().len(), 1);
    }

    #[test]
    fn test_room_keeps_wide_passage_open() {
        let mut carved = 0;
        for seed in 0..20 {
            let mut grid = split_grid(16, 9);
            let mut ctx = context_for(&grid);
            let borders = BorderSettings {
                passage_width: 5,
                ..BorderSettings::default()
            };
            borders.execute(&mut grid, &mut ctx, &mut GenRng::new(seed));
            carved += grid.passages().len();
            for y in 0..9 {
                for x in 0..4 {
                    grid.set_object(Coord::new(x, y), ROCK, 10);
                }
            }

            let settings = RoomSettings {
                max_attempts: 0,
                ..single(3, 3, 0)
            };
            place_rooms(&mut grid, &settings, &mut GenRng::new(seed));
            for passage in grid.passages() {
                assert!(
                    passage.cells.iter().all(|&c| grid.is_open(c)),
                    "seed {seed}: passage walled over"
                );
                for room in grid.rooms() {
                    assert!(passage.cells.iter().all(|&c| !in_ring_of(room, c)));
                }
            }
        }
        assert!(carved > 0);
    }

    #[test]
    fn test_ring_must_stay_in_zone() {
        // zone 0 is x < 6; a 4x3 room at (1,1) has its ring reach x = 5
        let mut grid = split_grid(12, 7);
        let settings = RoomSettings {
            max_attempts: 0,
            ..single(4, 3, 0)
        };
        assert_eq!(place_rooms(&mut grid, &settings, &mut GenRng::new(1)), 1);
        assert!(grid.rooms()[0].cells().all(|c| grid.zone(c) == 0));

        // a 5x3 room needs a ring at x = 6, which is zone 1
        let mut grid = split_grid(12, 7);
        let settings = RoomSettings {
            max_attempts: 0,
            ..single(5, 3, 0)
        };
        assert_eq!(place_rooms(&mut grid, &settings, &mut GenRng::new(1)), 0);
    }
}
