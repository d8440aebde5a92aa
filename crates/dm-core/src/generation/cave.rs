//! Cave shaping with a per-zone cellular automaton
//!
//! Every cell of the zone is classified as mutable, fixed open (room space,
//! passages) or fixed wall (room walls, the map edge, boundary walls and
//! immutable categories). Mutable cells are seeded with noise and smoothed by
//! birth/survival rules over the 8-neighbourhood. Cells outside the zone and
//! off the map count as walls; room walls count double.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::masks::{FeatureMask, guards_boundary};
use super::{GenContext, StepReport};
use crate::consts::{
    BORDER_WALL, DEFAULT_BIRTH_LIMIT, DEFAULT_CA_ITERATIONS, DEFAULT_FILL_CHANCE,
    DEFAULT_SURVIVAL_LIMIT, DEFAULT_WALL_DURABILITY, ROCK, ROOM_WALL,
};
use crate::error::ConfigError;
use crate::grid::{Coord, DIRS8, MapGrid, Tag};
use crate::rng::GenRng;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveSettings {
    /// Chance a mutable cell starts as wall
    pub fill_chance: f64,
    pub iterations: i32,
    /// Dead cells with at least this many wall neighbours become wall
    pub birth_limit: i32,
    /// Wall cells with fewer wall neighbours than this become open
    pub survival_limit: i32,
    pub wall: Tag,
    pub durability: i32,
    /// Object categories that are never reshaped
    pub immutable: Vec<Tag>,
    /// Zones to shape; empty means every zone
    pub zones: Vec<i32>,
    pub seed: Option<u64>,
}

impl Default for CaveSettings {
    fn default() -> Self {
        Self {
            fill_chance: DEFAULT_FILL_CHANCE,
            iterations: DEFAULT_CA_ITERATIONS,
            birth_limit: DEFAULT_BIRTH_LIMIT,
            survival_limit: DEFAULT_SURVIVAL_LIMIT,
            wall: ROCK,
            durability: DEFAULT_WALL_DURABILITY,
            immutable: vec![BORDER_WALL, ROOM_WALL],
            zones: Vec::new(),
            seed: None,
        }
    }
}

impl CaveSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.wall.is_valid() {
            return Err(ConfigError::InvalidTag { what: "cave wall" });
        }
        if self.durability <= 0 {
            return Err(ConfigError::TooSmall {
                what: "cave wall durability",
                min: 1,
                value: self.durability,
            });
        }
        if !(0.0..=1.0).contains(&self.fill_chance) {
            return Err(ConfigError::OutOfUnitRange {
                what: "fill chance",
                value: self.fill_chance,
            });
        }
        if self.iterations < 0 {
            return Err(ConfigError::TooSmall {
                what: "iterations",
                min: 0,
                value: self.iterations,
            });
        }
        for (what, value) in [
            ("birth limit", self.birth_limit),
            ("survival limit", self.survival_limit),
        ] {
            if !(0..=8).contains(&value) {
                return Err(ConfigError::NeighbourLimit { what, value });
            }
        }
        Ok(())
    }

    pub fn execute(&self, grid: &mut MapGrid, ctx: &mut GenContext, rng: &mut GenRng) -> StepReport {
        if let Err(err) = self.validate().and_then(|_| ctx.require_labels(grid)) {
            return err.into();
        }
        let walls = shape_caves(grid, self, rng);
        info!(walls, "caves shaped");
        StepReport::Completed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaState {
    Mutable,
    FixedOpen,
    FixedWall { room_wall: bool },
}

/// Shape every selected zone. Returns the number of cave walls written.
pub fn shape_caves(grid: &mut MapGrid, settings: &CaveSettings, rng: &mut GenRng) -> usize {
    let features = FeatureMask::build(grid);
    let zones = if settings.zones.is_empty() {
        grid.zone_ids()
    } else {
        settings.zones.clone()
    };
    zones
        .into_iter()
        .map(|zone| shape_zone(grid, zone, settings, &features, rng))
        .sum()
}

fn classify(
    grid: &MapGrid,
    c: Coord,
    zone: i32,
    settings: &CaveSettings,
    features: &FeatureMask,
) -> CaState {
    let Some(i) = grid.index(c) else {
        return CaState::FixedWall { room_wall: false };
    };
    if features.is_room_wall(i) {
        return CaState::FixedWall { room_wall: true };
    }
    if grid.zone(c) != zone {
        return CaState::FixedWall { room_wall: false };
    }
    if features.is_room_space(i) || features.is_entrance_outside(i) || features.is_passage(i) {
        return CaState::FixedOpen;
    }
    if let Some(obj) = grid.object(c)
        && (settings.immutable.contains(&obj.tag)
            || grid.is_edge(c)
            || guards_boundary(grid, c, zone))
    {
        return CaState::FixedWall { room_wall: false };
    }
    CaState::Mutable
}

fn shape_zone(
    grid: &mut MapGrid,
    zone: i32,
    settings: &CaveSettings,
    features: &FeatureMask,
    rng: &mut GenRng,
) -> usize {
    let cells = grid.cells_for_zone(zone);
    if cells.is_empty() {
        return 0;
    }

    let states: Vec<CaState> = grid
        .coords()
        .map(|c| classify(grid, c, zone, settings, features))
        .collect();
    let mutable: Vec<usize> = cells
        .iter()
        .filter_map(|&c| grid.index(c))
        .filter(|&i| states[i] == CaState::Mutable)
        .collect();

    let mut alive: Vec<bool> = states
        .iter()
        .map(|s| matches!(s, CaState::FixedWall { .. }))
        .collect();
    for &i in &mutable {
        alive[i] = rng.chance(settings.fill_chance);
    }

    let wall_weight = |n: Coord, alive: &[bool]| -> i32 {
        let Some(ni) = grid.index(n) else {
            return 1;
        };
        match states[ni] {
            CaState::FixedWall { room_wall: true } => 2,
            CaState::FixedWall { room_wall: false } => 1,
            CaState::FixedOpen => 0,
            CaState::Mutable => alive[ni] as i32,
        }
    };

    let mut next = alive.clone();
    for _ in 0..settings.iterations {
        for &i in &mutable {
            let c = grid.coord_of(i);
            let walls: i32 = DIRS8
                .iter()
                .map(|&(dx, dy)| wall_weight(c.offset(dx, dy), &alive))
                .sum();
            next[i] = if alive[i] {
                walls >= settings.survival_limit
            } else {
                walls >= settings.birth_limit
            };
        }
        std::mem::swap(&mut alive, &mut next);
    }

    let mut written = 0;
    for &i in &mutable {
        let c = grid.coord_of(i);
        if alive[i] {
            grid.set_object(c, settings.wall, settings.durability);
            written += 1;
        } else {
            grid.remove_object(c);
        }
    }
    debug!(zone, mutable = mutable.len(), walls = written, "zone shaped");
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::borders::{BorderSettings, collect_boundaries, place_border_walls};
    use crate::generation::passages::carve_passages;
    use crate::generation::rooms::{RoomSettings, RoomSpec, place_rooms};
    use crate::generation::test_support::{context_for, one_zone_grid, split_grid};
    use crate::grid::Cell;

    fn prepared_split() -> MapGrid {
        let mut grid = split_grid(40, 24);
        let settings = BorderSettings::default();
        let b = collect_boundaries(&grid);
        place_border_walls(&mut grid, &b, &settings);
        for p in carve_passages(&mut grid, &b, &settings, &mut GenRng::new(3)) {
            grid.add_passage(p);
        }
        let rooms = RoomSettings {
            rooms: vec![
                RoomSpec {
                    zone: 0,
                    width: 6,
                    height: 5,
                },
                RoomSpec {
                    zone: 1,
                    width: 5,
                    height: 6,
                },
            ],
            ..RoomSettings::default()
        };
        place_rooms(&mut grid, &rooms, &mut GenRng::new(4));
        grid
    }

    #[test]
    fn test_fixed_cells_untouched() {
        let mut grid = prepared_split();
        let before = grid.clone();
        let features = FeatureMask::build(&grid);
        let settings = CaveSettings::default();

        let fixed: Vec<(Coord, Cell)> = grid
            .coords()
            .filter(|&c| {
                let i = grid.index(c).unwrap();
                features.is_room_space(i)
                    || features.is_room_wall(i)
                    || features.is_passage(i)
                    || features.is_entrance_outside(i)
                    || grid.is_edge(c)
            })
            .map(|c| (c, *before.cell(c).unwrap()))
            .collect();
        assert!(!fixed.is_empty());

        shape_caves(&mut grid, &settings, &mut GenRng::new(99));
        for (c, cell) in fixed {
            assert_eq!(*grid.cell(c).unwrap(), cell, "fixed cell changed at {c:?}");
        }
        // the zone border stays intact
        for y in 0..24 {
            assert_eq!(grid.has_object(Coord::new(19, y)), before.has_object(Coord::new(19, y)));
        }
    }

    #[test]
    fn test_full_fill_stays_solid() {
        let mut grid = one_zone_grid(12, 12);
        let settings = CaveSettings {
            fill_chance: 1.0,
            ..CaveSettings::default()
        };
        let walls = shape_caves(&mut grid, &settings, &mut GenRng::new(1));
        assert_eq!(walls, 144);
        assert!(grid.cells().iter().all(|c| c.object_tag() == Some(ROCK)));
    }

    #[test]
    fn test_empty_fill_stays_open() {
        let mut grid = one_zone_grid(12, 12);
        let settings = CaveSettings {
            fill_chance: 0.0,
            ..CaveSettings::default()
        };
        // interior cells see at most the edge as wall, below the birth limit
        let walls = shape_caves(&mut grid, &settings, &mut GenRng::new(1));
        assert!(grid.is_open(Coord::new(6, 6)));
        assert!(walls < 144);
    }

    #[test]
    fn test_deterministic() {
        let mut a = prepared_split();
        let mut b = a.clone();
        shape_caves(&mut a, &CaveSettings::default(), &mut GenRng::new(5));
        shape_caves(&mut b, &CaveSettings::default(), &mut GenRng::new(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_zone_filter() {
        let mut grid = split_grid(20, 10);
        let settings = CaveSettings {
            fill_chance: 1.0,
            zones: vec![1],
            ..CaveSettings::default()
        };
        shape_caves(&mut grid, &settings, &mut GenRng::new(1));
        assert!(grid.cells_for_zone(0).iter().all(|&c| grid.is_open(c)));
    }

    #[test]
    fn test_validation() {
        let bad = CaveSettings {
            fill_chance: 1.5,
            ..CaveSettings::default()
        };
        assert!(bad.validate().is_err());
        let bad = CaveSettings {
            birth_limit: 9,
            ..CaveSettings::default()
        };
        assert!(bad.validate().is_err());

        let mut grid = one_zone_grid(6, 6);
        let mut ctx = context_for(&grid);
        assert!(!bad.execute(&mut grid, &mut ctx, &mut GenRng::new(1)).succeeded());
        assert!(grid.cells().iter().all(|c| c.is_open()));
    }
}
