//! Prop placement
//!
//! Each placement spawns up to `count_per_zone` props of one kind in every
//! selected zone, either inside room interiors or in the open cave space
//! outside rooms and passages.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::masks::FeatureMask;
use super::{GenContext, StepReport};
use crate::consts::CRATE_PROP;
use crate::entity::{EntityKind, Prop};
use crate::error::ConfigError;
use crate::grid::{Coord, MapGrid, Tag};
use crate::rng::GenRng;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorPlacement {
    pub kind: Tag,
    /// Zones to populate; empty means every zone
    pub zones: Vec<i32>,
    pub count_per_zone: i32,
    pub only_in_rooms: bool,
}

impl Default for ActorPlacement {
    fn default() -> Self {
        Self {
            kind: CRATE_PROP,
            zones: Vec::new(),
            count_per_zone: 1,
            only_in_rooms: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorSettings {
    pub placements: Vec<ActorPlacement>,
    pub seed: Option<u64>,
}

impl ActorSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for placement in &self.placements {
            if !placement.kind.is_valid() {
                return Err(ConfigError::InvalidTag { what: "actor kind" });
            }
            if placement.count_per_zone < 0 {
                return Err(ConfigError::TooSmall {
                    what: "actors per zone",
                    min: 0,
                    value: placement.count_per_zone,
                });
            }
        }
        Ok(())
    }

    pub fn execute(&self, grid: &mut MapGrid, ctx: &mut GenContext, rng: &mut GenRng) -> StepReport {
        if let Err(err) = self.validate().and_then(|_| ctx.require_labels(grid)) {
            return err.into();
        }
        let spawned = place_actors(grid, ctx, self, rng);
        info!(spawned, "actors placed");
        StepReport::Completed
    }
}

/// Spawn props for every placement. Returns the number spawned.
pub fn place_actors(
    grid: &mut MapGrid,
    ctx: &mut GenContext,
    settings: &ActorSettings,
    rng: &mut GenRng,
) -> usize {
    let mut spawned = 0;
    for placement in &settings.placements {
        let zones = if placement.zones.is_empty() {
            grid.zone_ids()
        } else {
            placement.zones.clone()
        };
        for zone in zones {
            let mut candidates = candidate_cells(grid, zone, placement.only_in_rooms);
            rng.shuffle(&mut candidates);

            let mut placed = 0;
            for pos in candidates {
                if placed >= placement.count_per_zone {
                    break;
                }
                let kind = EntityKind::Prop(Prop {
                    kind: placement.kind,
                    zone,
                });
                if ctx.entities.spawn(grid, pos, kind).is_some() {
                    placed += 1;
                }
            }
            debug!(zone, kind = placement.kind.0, placed, "props spawned");
            spawned += placed as usize;
        }
    }
    spawned
}

/// Free cells of `zone`: room interiors, or open space away from rooms,
/// room entrances and passages
fn candidate_cells(grid: &MapGrid, zone: i32, only_in_rooms: bool) -> Vec<Coord> {
    let is_free = |c: Coord| grid.is_open(c) && grid.occupant(c).is_none();
    if only_in_rooms {
        return grid
            .rooms_for_zone(zone)
            .flat_map(|room| room.interior_cells())
            .filter(|&c| is_free(c))
            .collect();
    }

    let features = FeatureMask::build(grid);
    grid.free_cells_for_zone(zone)
        .into_iter()
        .filter(|&c| {
            grid.index(c).is_some_and(|i| {
                !features.is_room_space(i)
                    && !features.is_room_wall(i)
                    && !features.is_entrance_outside(i)
                    && !features.is_passage(i)
            })
        })
        .collect()
}
