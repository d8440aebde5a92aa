//! Doors and keys along the zone dependency graph
//!
//! A door goes on the middle cell of every passage. Zones are then processed
//! by increasing depth: zone 0 claims every door it touches, deeper zones
//! claim the doors leading away from zone 0. Claimed doors take the zone's
//! colour and the zone gets one key of that colour, so a key is always found
//! on the near side of the doors it opens. Keys go in the zone's largest open
//! region, never in a stranded pocket.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::connectivity::main_region;
use super::depth::require_depths;
use super::{GenContext, StepReport};
use crate::consts::KEY_COLOURS;
use crate::entity::{Door, EntityId, EntityKind, Key};
use crate::error::ConfigError;
use crate::grid::{Coord, MapGrid, Tag};
use crate::rng::GenRng;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorSettings {
    /// Lock colour per zone; zones without one neither lock doors nor get keys
    #[serde(with = "super::zone_map")]
    pub zone_colours: BTreeMap<i32, Tag>,
    pub seed: Option<u64>,
}

impl Default for DoorSettings {
    fn default() -> Self {
        Self {
            zone_colours: KEY_COLOURS
                .iter()
                .enumerate()
                .map(|(z, &c)| (z as i32, c))
                .collect(),
            seed: None,
        }
    }
}

impl DoorSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zone_colours.values().any(|t| !t.is_valid()) {
            return Err(ConfigError::InvalidTag { what: "door colour" });
        }
        Ok(())
    }

    pub fn execute(&self, grid: &mut MapGrid, ctx: &mut GenContext, rng: &mut GenRng) -> StepReport {
        if let Err(err) = self
            .validate()
            .and_then(|_| ctx.require_labels(grid))
            .and_then(|_| require_depths(ctx))
        {
            return err.into();
        }
        let placement = place_doors_and_keys(grid, ctx, self, rng);
        info!(
            doors = placement.doors,
            locked = placement.locked,
            keys = placement.keys,
            "gates placed"
        );
        if placement.keyless_zones > 0 {
            return StepReport::Partial(format!(
                "{} zones had no free cell for a key",
                placement.keyless_zones
            ));
        }
        StepReport::Completed
    }
}

/// Counts from a door/key run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatePlacement {
    pub doors: usize,
    pub locked: usize,
    pub keys: usize,
    pub keyless_zones: usize,
}

/// Spawn doors on passages and keys in the zones that lock them.
///
/// Doors nobody claims are left open.
pub fn place_doors_and_keys(
    grid: &mut MapGrid,
    ctx: &mut GenContext,
    settings: &DoorSettings,
    rng: &mut GenRng,
) -> GatePlacement {
    let mut result = GatePlacement::default();

    // (door, zone_a, zone_b, claimed)
    let mut doors: Vec<(EntityId, i32, i32, bool)> = Vec::new();
    let passages = grid.passages().to_vec();
    for passage in &passages {
        let Some(mid) = passage.mid_cell() else {
            continue;
        };
        let door = Door {
            colour: None,
            zones: (passage.zone_a, passage.zone_b),
            open: false,
        };
        match ctx.entities.spawn(grid, mid, EntityKind::Door(door)) {
            Some(id) => doors.push((id, passage.zone_a, passage.zone_b, false)),
            None => debug!(x = mid.x, y = mid.y, "passage midpoint occupied"),
        }
    }
    result.doors = doors.len();

    let mut zones: Vec<i32> = passages
        .iter()
        .flat_map(|p| [p.zone_a, p.zone_b])
        .collect();
    zones.sort_by_key(|&z| (ctx.zone_depth(z), z));
    zones.dedup();

    for zone in zones {
        let depth = ctx.zone_depth(zone);
        if depth < 0 {
            continue;
        }
        let Some(&colour) = settings.zone_colours.get(&zone) else {
            continue;
        };

        let mut claimed = 0;
        for (id, a, b, taken) in doors.iter_mut() {
            if *taken || (*a != zone && *b != zone) {
                continue;
            }
            let other = if *a == zone { *b } else { *a };
            if depth != 0 && ctx.zone_depth(other) == 0 {
                continue;
            }
            if let Some(door) = ctx.entities.door_mut(*id) {
                door.colour = Some(colour);
                *taken = true;
                claimed += 1;
            }
        }
        if claimed == 0 {
            continue;
        }
        result.locked += claimed;

        let free = key_cells(grid, zone);
        let spawned = rng.choose(&free).and_then(|&pos| {
            ctx.entities
                .spawn(grid, pos, EntityKind::Key(Key { colour, zone }))
        });
        match spawned {
            Some(_) => result.keys += 1,
            None => {
                warn!(zone, "no free cell for key");
                result.keyless_zones += 1;
            }
        }
    }

    for (id, _, _, taken) in &doors {
        if !taken {
            ctx.entities.open_door(*id);
        }
    }
    result
}

/// Free cells of `zone` inside its largest open region
fn key_cells(grid: &MapGrid, zone: i32) -> Vec<Coord> {
    let mut region = vec![false; grid.len()];
    for c in main_region(grid, zone) {
        if let Some(i) = grid.index(c) {
            region[i] = true;
        }
    }
    grid.free_cells_for_zone(zone)
        .into_iter()
        .filter(|&c| grid.index(c).is_some_and(|i| region[i]))
        .collect()
}
