//! Zone connectivity repair
//!
//! Open cells of a zone are split into 4-connected components. Starting from
//! the largest, a 0-1 BFS (open cells cost 0, removable walls cost 1) seeded
//! from every connected cell finds the cheapest route to the nearest
//! unconnected component, and the walls on that route are cleared. This
//! repeats until the zone is one component or nothing more can be reached.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::masks::{FeatureMask, guards_boundary};
use super::{GenContext, StepReport};
use crate::consts::{BORDER_WALL, ROOM_WALL};
use crate::error::ConfigError;
use crate::grid::{Coord, MapGrid, Tag};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivitySettings {
    /// Object categories that are never carved
    pub immutable: Vec<Tag>,
    /// Zones to repair; empty means every zone
    pub zones: Vec<i32>,
}

impl Default for ConnectivitySettings {
    fn default() -> Self {
        Self {
            immutable: vec![BORDER_WALL, ROOM_WALL],
            zones: Vec::new(),
        }
    }
}

impl ConnectivitySettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.immutable.iter().any(|t| !t.is_valid()) {
            return Err(ConfigError::InvalidTag {
                what: "immutable wall",
            });
        }
        Ok(())
    }

    pub fn execute(&self, grid: &mut MapGrid, ctx: &mut GenContext) -> StepReport {
        if let Err(err) = self.validate().and_then(|_| ctx.require_labels(grid)) {
            return err.into();
        }
        let zones = if self.zones.is_empty() {
            grid.zone_ids()
        } else {
            self.zones.clone()
        };

        let mut carved = 0;
        let mut stranded = 0;
        for zone in zones {
            let repair = fix_zone_connectivity(grid, zone, &self.immutable);
            carved += repair.carved;
            if repair.unconnected > 0 {
                warn!(zone, components = repair.unconnected, "zone left disconnected");
                stranded += repair.unconnected;
            }
        }
        info!(carved, stranded, "connectivity repaired");
        if stranded > 0 {
            return StepReport::Partial(format!("{stranded} components could not be joined"));
        }
        StepReport::Completed
    }
}

/// Summary of one zone's repair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneRepair {
    /// Open components found before carving
    pub components: usize,
    /// Wall cells cleared
    pub carved: usize,
    /// Components that could not be reached
    pub unconnected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Traverse {
    Open,
    /// Carvable at cost 1
    Wall,
    Blocked,
}

fn classify(
    grid: &MapGrid,
    c: Coord,
    zone: i32,
    immutable: &[Tag],
    features: &FeatureMask,
) -> Traverse {
    let Some(i) = grid.index(c) else {
        return Traverse::Blocked;
    };
    if grid.zone(c) != zone || features.is_room_space(i) || features.is_room_wall(i) {
        return Traverse::Blocked;
    }
    match grid.object(c) {
        None => Traverse::Open,
        Some(obj) => {
            if immutable.contains(&obj.tag) || grid.is_edge(c) || guards_boundary(grid, c, zone) {
                Traverse::Blocked
            } else {
                Traverse::Wall
            }
        }
    }
}

/// Join every open component of `zone` into one where possible.
pub fn fix_zone_connectivity(grid: &mut MapGrid, zone: i32, immutable: &[Tag]) -> ZoneRepair {
    let features = FeatureMask::build(grid);

    // The cell in front of a room entrance is always walkable
    let fronts: Vec<Coord> = grid
        .rooms_for_zone(zone)
        .map(|r| r.outside_entrance())
        .filter(|&c| grid.zone(c) == zone)
        .collect();
    for c in fronts {
        grid.remove_object(c);
    }

    let n = grid.len();
    let mut kinds: Vec<Traverse> = grid
        .coords()
        .map(|c| classify(grid, c, zone, immutable, &features))
        .collect();

    // Label components
    let mut comp = vec![usize::MAX; n];
    let mut sizes: Vec<usize> = Vec::new();
    for start in 0..n {
        if kinds[start] != Traverse::Open || comp[start] != usize::MAX {
            continue;
        }
        let id = sizes.len();
        let mut size = 0;
        let mut queue = VecDeque::from([start]);
        comp[start] = id;
        while let Some(i) = queue.pop_front() {
            size += 1;
            for nb in grid.coord_of(i).neighbors4() {
                if let Some(ni) = grid.index(nb)
                    && kinds[ni] == Traverse::Open
                    && comp[ni] == usize::MAX
                {
                    comp[ni] = id;
                    queue.push_back(ni);
                }
            }
        }
        sizes.push(size);
    }

    let mut repair = ZoneRepair {
        components: sizes.len(),
        ..ZoneRepair::default()
    };
    if sizes.len() <= 1 {
        return repair;
    }

    let main = sizes
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
        .map_or(0, |(id, _)| id);
    let mut connected = vec![false; sizes.len()];
    connected[main] = true;
    let mut remaining = sizes.len() - 1;

    let mut dist = vec![u32::MAX; n];
    let mut prev = vec![usize::MAX; n];
    while remaining > 0 {
        dist.fill(u32::MAX);
        prev.fill(usize::MAX);
        let mut deque: VecDeque<usize> = VecDeque::new();
        for i in 0..n {
            if kinds[i] == Traverse::Open && comp[i] != usize::MAX && connected[comp[i]] {
                dist[i] = 0;
                deque.push_back(i);
            }
        }

        let mut target = None;
        while let Some(i) = deque.pop_front() {
            if kinds[i] == Traverse::Open && comp[i] != usize::MAX && !connected[comp[i]] {
                target = Some(i);
                break;
            }
            for nb in grid.coord_of(i).neighbors4() {
                let Some(ni) = grid.index(nb) else { continue };
                let cost = match kinds[ni] {
                    Traverse::Open => 0,
                    Traverse::Wall => 1,
                    Traverse::Blocked => continue,
                };
                let nd = dist[i] + cost;
                if nd < dist[ni] {
                    dist[ni] = nd;
                    prev[ni] = i;
                    if cost == 0 {
                        deque.push_front(ni);
                    } else {
                        deque.push_back(ni);
                    }
                }
            }
        }

        let Some(target) = target else {
            repair.unconnected = remaining;
            break;
        };

        let reached = comp[target];
        let mut cur = prev[target];
        while cur != usize::MAX {
            if kinds[cur] == Traverse::Wall {
                grid.remove_object(grid.coord_of(cur));
                kinds[cur] = Traverse::Open;
                comp[cur] = main;
                repair.carved += 1;
            }
            cur = prev[cur];
        }
        connected[reached] = true;
        remaining -= 1;
        debug!(zone, component = reached, "component joined");
    }
    repair
}

/// True if every open cell of `zone` (passage cells included) is reachable
/// from every other through open cells of the zone.
pub fn is_zone_connected(grid: &MapGrid, zone: i32) -> bool {
    open_regions(grid, zone).len() <= 1
}

/// The largest 4-connected region of open cells in `zone`; the first found in
/// row-major order wins ties. Empty if the zone has no open cell.
pub fn main_region(grid: &MapGrid, zone: i32) -> Vec<Coord> {
    let mut best: Vec<Coord> = Vec::new();
    for region in open_regions(grid, zone) {
        if region.len() > best.len() {
            best = region;
        }
    }
    best
}

/// 4-connected regions of open cells (passage cells included) in `zone`
fn open_regions(grid: &MapGrid, zone: i32) -> Vec<Vec<Coord>> {
    let features = FeatureMask::build(grid);
    let walkable = |c: Coord| {
        grid.index(c).is_some_and(|i| {
            grid.zone(c) == zone && (grid.is_open(c) || features.is_passage(i))
        })
    };

    let mut seen = vec![false; grid.len()];
    let mut regions = Vec::new();
    for start in grid.cells_for_zone(zone) {
        let Some(si) = grid.index(start) else { continue };
        if seen[si] || !walkable(start) {
            continue;
        }
        seen[si] = true;
        let mut region = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(c) = queue.pop_front() {
            region.push(c);
            for nb in c.neighbors4() {
                if let Some(ni) = grid.index(nb)
                    && !seen[ni]
                    && walkable(nb)
                {
                    seen[ni] = true;
                    queue.push_back(nb);
                }
            }
        }
        regions.push(region);
    }
    regions
}
