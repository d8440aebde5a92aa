//! Level generation pipeline
//!
//! Each step reads and mutates the grid and a shared [`GenContext`]. Steps run
//! strictly in order; a step that cannot run reports why and the pipeline moves
//! on.

mod actors;
mod borders;
mod cave;
mod connectivity;
mod depth;
mod gates;
mod masks;
mod ore;
mod passages;
mod pipeline;
mod rooms;
#[cfg(test)]
mod test_support;
mod zones;

pub use actors::{ActorPlacement, ActorSettings, place_actors};
pub use borders::{BorderSettings, ZoneBoundary, collect_boundaries, place_border_walls};
pub use cave::{CaveSettings, shape_caves};
pub use connectivity::{
    ConnectivitySettings, ZoneRepair, fix_zone_connectivity, is_zone_connected, main_region,
};
pub use depth::{DepthSettings, compute_zone_depths};
pub use gates::{DoorSettings, GatePlacement, place_doors_and_keys};
pub use ore::{OreSettings, OreSpec, ZoneOreConfig, place_ore};
pub use passages::carve_passages;
pub use pipeline::{BuiltMap, GenerationStep, MapBuilder, MapConfig, MapReady};
pub use rooms::{RoomSettings, RoomSpec, place_rooms};
pub use zones::{ZoneSettings, ZoneWeight, partition_zones};

use serde::{Deserialize, Serialize};

use crate::entity::EntityStore;
use crate::error::ConfigError;
use crate::grid::MapGrid;

/// State threaded through every step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenContext {
    /// Zone id per cell (row-major); empty until partitioned
    pub labels: Vec<i32>,
    /// Depth per zone id; empty until computed
    pub depths: Vec<i32>,
    pub entities: EntityStore,
}

impl GenContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// -1 for unknown or unreachable zones
    pub fn zone_depth(&self, zone: i32) -> i32 {
        if zone < 0 {
            return -1;
        }
        self.depths.get(zone as usize).copied().unwrap_or(-1)
    }

    pub fn set_zone_depths(&mut self, depths: Vec<i32>) {
        self.depths = depths;
    }

    /// Fails unless the label array covers the grid with no unassigned cell
    pub fn require_labels(&self, grid: &MapGrid) -> Result<(), ConfigError> {
        if self.labels.len() != grid.len() || self.labels.iter().any(|&z| z < 0) {
            return Err(ConfigError::MissingZoneLabels);
        }
        Ok(())
    }
}

/// Outcome of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepReport {
    Completed,
    /// Ran, but some placements or repairs could not be made
    Partial(String),
    /// Did not run; grid left untouched
    Skipped(String),
}

impl StepReport {
    pub fn succeeded(&self) -> bool {
        !matches!(self, StepReport::Skipped(_))
    }
}

impl From<ConfigError> for StepReport {
    fn from(err: ConfigError) -> Self {
        StepReport::Skipped(err.to_string())
    }
}

/// Zone-keyed maps as `[[zone, value], ...]`.
///
/// JSON object keys are strings, and internally tagged enums cannot turn them
/// back into integers.
pub(crate) mod zone_map {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<V, S>(map: &BTreeMap<i32, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, V, D>(deserializer: D) -> Result<BTreeMap<i32, V>, D::Error>
    where
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let pairs = Vec::<(i32, V)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}
