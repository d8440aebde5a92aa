//! Ore scattering on solid cells

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{GenContext, StepReport};
use crate::consts::{BORDER_WALL, ROOM_WALL};
use crate::error::ConfigError;
use crate::grid::{Coord, MapGrid, Tag};
use crate::rng::GenRng;

/// How many cells of one ore to place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OreSpec {
    pub ore: Tag,
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneOreConfig {
    pub zone: i32,
    pub ores: Vec<OreSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OreSettings {
    pub zones: Vec<ZoneOreConfig>,
    /// Object categories that never carry ore
    pub forbidden: Vec<Tag>,
    pub seed: Option<u64>,
}

impl Default for OreSettings {
    fn default() -> Self {
        Self {
            zones: Vec::new(),
            forbidden: vec![BORDER_WALL, ROOM_WALL],
            seed: None,
        }
    }
}

impl OreSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for config in &self.zones {
            if config.ores.iter().any(|o| !o.ore.is_valid()) {
                return Err(ConfigError::InvalidTag { what: "ore" });
            }
        }
        Ok(())
    }

    pub fn execute(&self, grid: &mut MapGrid, ctx: &mut GenContext, rng: &mut GenRng) -> StepReport {
        if let Err(err) = self.validate().and_then(|_| ctx.require_labels(grid)) {
            return err.into();
        }
        let placed = place_ore(grid, self, rng);
        info!(placed, "ore placed");
        StepReport::Completed
    }
}

/// Tag solid cells with ore. Returns the number of cells tagged.
pub fn place_ore(grid: &mut MapGrid, settings: &OreSettings, rng: &mut GenRng) -> usize {
    let mut total = 0;
    for config in &settings.zones {
        let mut candidates: Vec<Coord> = grid
            .cells_for_zone(config.zone)
            .into_iter()
            .filter(|&c| {
                grid.object(c)
                    .is_some_and(|obj| !settings.forbidden.contains(&obj.tag))
            })
            .collect();
        rng.shuffle(&mut candidates);

        let mut cursor = 0;
        for spec in &config.ores {
            let min = spec.min.max(0);
            let max = spec.max.max(min);
            let remaining = (candidates.len() - cursor) as i32;
            let count = rng.range_inclusive(min, max).clamp(0, remaining) as usize;
            for &c in &candidates[cursor..cursor + count] {
                grid.set_ore(c, spec.ore);
            }
            cursor += count;
            debug!(zone = config.zone, ore = spec.ore.0, count, "ore scattered");
        }
        total += cursor;
    }
    total
}
