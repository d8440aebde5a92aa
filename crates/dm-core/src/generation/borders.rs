//! Zone border walls
//!
//! Boundaries are collected per unordered zone pair, walled on the lower-id
//! side (thickened inward when requested), and the map edge is walled all
//! round. Passages are then carved through the result.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::passages::carve_passages;
use super::{GenContext, StepReport};
use crate::consts::{
    BORDER_WALL, DEFAULT_ATTEMPTS_PER_PAIR, DEFAULT_MIN_PASSAGE_DISTANCE, DEFAULT_PASSAGE_WIDTH,
    DEFAULT_WALL_DURABILITY,
};
use crate::error::ConfigError;
use crate::grid::{Coord, MapGrid, Tag};
use crate::rng::GenRng;

/// Cells on either side of the boundary between two zones
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneBoundary {
    /// Boundary cells in the lower-id zone
    pub side_a: BTreeSet<Coord>,
    /// Boundary cells in the higher-id zone
    pub side_b: BTreeSet<Coord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderSettings {
    pub wall: Tag,
    pub durability: i32,
    /// Wall rings on the lower-id side of each boundary
    pub thickness: i32,
    /// Parallel lines per passage
    pub passage_width: i32,
    /// Minimum city-block gap between passages
    pub min_passage_distance: i32,
    pub attempts_per_pair: i32,
    /// Maximum passages per zone; missing or negative means unlimited
    #[serde(with = "super::zone_map")]
    pub max_passages: BTreeMap<i32, i32>,
    pub seed: Option<u64>,
}

impl Default for BorderSettings {
    fn default() -> Self {
        Self {
            wall: BORDER_WALL,
            durability: DEFAULT_WALL_DURABILITY,
            thickness: 1,
            passage_width: DEFAULT_PASSAGE_WIDTH,
            min_passage_distance: DEFAULT_MIN_PASSAGE_DISTANCE,
            attempts_per_pair: DEFAULT_ATTEMPTS_PER_PAIR,
            max_passages: BTreeMap::new(),
            seed: None,
        }
    }
}

impl BorderSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.wall.is_valid() {
            return Err(ConfigError::InvalidTag { what: "border wall" });
        }
        if self.durability <= 0 {
            return Err(ConfigError::TooSmall {
                what: "wall durability",
                min: 1,
                value: self.durability,
            });
        }
        if self.thickness < 1 {
            return Err(ConfigError::TooSmall {
                what: "border thickness",
                min: 1,
                value: self.thickness,
            });
        }
        if self.passage_width < 1 {
            return Err(ConfigError::TooSmall {
                what: "passage width",
                min: 1,
                value: self.passage_width,
            });
        }
        if self.min_passage_distance < 0 {
            return Err(ConfigError::TooSmall {
                what: "passage spacing",
                min: 0,
                value: self.min_passage_distance,
            });
        }
        Ok(())
    }

    /// Passage cap for `zone`, or `None` when unlimited
    pub fn degree_cap(&self, zone: i32) -> Option<i32> {
        self.max_passages.get(&zone).copied().filter(|&cap| cap >= 0)
    }

    pub fn execute(&self, grid: &mut MapGrid, ctx: &mut GenContext, rng: &mut GenRng) -> StepReport {
        if let Err(err) = self.validate().and_then(|_| ctx.require_labels(grid)) {
            return err.into();
        }

        let boundaries = collect_boundaries(grid);
        let walled = place_border_walls(grid, &boundaries, self);
        let passages = carve_passages(grid, &boundaries, self, rng);

        info!(
            pairs = boundaries.len(),
            walled,
            passages = passages.len(),
            "borders placed"
        );
        let missing = boundaries.len() - passages.len();
        for passage in passages {
            grid.add_passage(passage);
        }
        if missing > 0 {
            warn!(missing, "some zone pairs have no passage");
            return StepReport::Partial(format!("{missing} zone pairs left without a passage"));
        }
        StepReport::Completed
    }
}

/// Collect boundary cells for every pair of 4-adjacent zones.
pub fn collect_boundaries(grid: &MapGrid) -> BTreeMap<(i32, i32), ZoneBoundary> {
    let mut boundaries: BTreeMap<(i32, i32), ZoneBoundary> = BTreeMap::new();
    for c in grid.coords() {
        let z = grid.zone(c);
        if z < 0 {
            continue;
        }
        for n in [c.offset(1, 0), c.offset(0, 1)] {
            if !grid.in_bounds(n) {
                continue;
            }
            let zn = grid.zone(n);
            if zn < 0 || zn == z {
                continue;
            }
            let entry = boundaries.entry((z.min(zn), z.max(zn))).or_default();
            if z < zn {
                entry.side_a.insert(c);
                entry.side_b.insert(n);
            } else {
                entry.side_a.insert(n);
                entry.side_b.insert(c);
            }
        }
    }
    boundaries
}

/// Wall the lower-id side of every boundary and the grid edge.
/// Returns the number of cells walled.
pub fn place_border_walls(
    grid: &mut MapGrid,
    boundaries: &BTreeMap<(i32, i32), ZoneBoundary>,
    settings: &BorderSettings,
) -> usize {
    let mut walls: BTreeSet<Coord> = BTreeSet::new();

    for (&(zone_a, _), boundary) in boundaries {
        let mut queue: VecDeque<(Coord, i32)> = VecDeque::new();
        for &c in &boundary.side_a {
            if walls.insert(c) {
                queue.push_back((c, 0));
            }
        }
        // Thicken inward, staying inside zone A
        while let Some((c, ring)) = queue.pop_front() {
            if ring + 1 >= settings.thickness {
                continue;
            }
            for n in c.neighbors4() {
                if grid.in_bounds(n) && grid.zone(n) == zone_a && walls.insert(n) {
                    queue.push_back((n, ring + 1));
                }
            }
        }
    }

    let (w, h) = grid.size();
    for x in 0..w {
        walls.insert(Coord::new(x, 0));
        walls.insert(Coord::new(x, h - 1));
    }
    for y in 0..h {
        walls.insert(Coord::new(0, y));
        walls.insert(Coord::new(w - 1, y));
    }

    for &c in &walls {
        grid.set_object(c, settings.wall, settings.durability);
    }
    walls.len()
}
