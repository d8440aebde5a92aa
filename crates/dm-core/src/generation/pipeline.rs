//! Map configuration and the step orchestrator

use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{info, warn};

use super::{
    ActorPlacement, ActorSettings, BorderSettings, CaveSettings, ConnectivitySettings,
    DepthSettings, DoorSettings, GenContext, OreSettings, OreSpec, RoomSettings, RoomSpec,
    StepReport, ZoneOreConfig, ZoneSettings,
};
use crate::consts::{FLOOR, GEM_ORE, GOLD_ORE, IRON_ORE, MUSHROOM_PROP};
use crate::error::LoadError;
use crate::grid::{MapGrid, Tag};
use crate::rng::{GenRng, derive_step_seed};

/// One stage of the generation pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Display)]
#[serde(tag = "step", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GenerationStep {
    Zones(ZoneSettings),
    Borders(BorderSettings),
    Rooms(RoomSettings),
    Caves(CaveSettings),
    Connectivity(ConnectivitySettings),
    Depth(DepthSettings),
    Ore(OreSettings),
    Doors(DoorSettings),
    Actors(ActorSettings),
}

impl GenerationStep {
    /// Seed fixed by the step's own settings
    pub fn seed_override(&self) -> Option<u64> {
        match self {
            GenerationStep::Zones(s) => s.seed,
            GenerationStep::Borders(s) => s.seed,
            GenerationStep::Rooms(s) => s.seed,
            GenerationStep::Caves(s) => s.seed,
            GenerationStep::Ore(s) => s.seed,
            GenerationStep::Doors(s) => s.seed,
            GenerationStep::Actors(s) => s.seed,
            GenerationStep::Connectivity(_) | GenerationStep::Depth(_) => None,
        }
    }

    pub fn execute(&self, grid: &mut MapGrid, ctx: &mut GenContext, rng: &mut GenRng) -> StepReport {
        match self {
            GenerationStep::Zones(s) => s.execute(grid, ctx, rng),
            GenerationStep::Borders(s) => s.execute(grid, ctx, rng),
            GenerationStep::Rooms(s) => s.execute(grid, ctx, rng),
            GenerationStep::Caves(s) => s.execute(grid, ctx, rng),
            GenerationStep::Connectivity(s) => s.execute(grid, ctx),
            GenerationStep::Depth(s) => s.execute(grid, ctx),
            GenerationStep::Ore(s) => s.execute(grid, ctx, rng),
            GenerationStep::Doors(s) => s.execute(grid, ctx, rng),
            GenerationStep::Actors(s) => s.execute(grid, ctx, rng),
        }
    }
}

/// Everything needed to build a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub width: i32,
    pub height: i32,
    /// Master seed; steps without their own seed derive one from it
    pub seed: u64,
    pub background: Tag,
    pub steps: Vec<GenerationStep>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::with_default_steps(80, 48, 0)
    }
}

impl MapConfig {
    /// Load a configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse_config(&contents)
    }

    /// Parse a JSON configuration; missing fields take their defaults
    pub fn parse_config(contents: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// A four-zone cave level with rooms, ore, locked doors and props
    pub fn with_default_steps(width: i32, height: i32, seed: u64) -> Self {
        let ore = (0..4)
            .map(|zone| {
                let mut ores = vec![OreSpec {
                    ore: IRON_ORE,
                    min: 4,
                    max: 8,
                }];
                if zone >= 2 {
                    ores.push(OreSpec {
                        ore: GOLD_ORE,
                        min: 1,
                        max: 3,
                    });
                }
                if zone == 3 {
                    ores.push(OreSpec {
                        ore: GEM_ORE,
                        min: 0,
                        max: 2,
                    });
                }
                ZoneOreConfig { zone, ores }
            })
            .collect();

        Self {
            width,
            height,
            seed,
            background: FLOOR,
            steps: vec![
                GenerationStep::Zones(ZoneSettings {
                    forbid_adjacent_to_zero: vec![3],
                    ..ZoneSettings::uniform(4)
                }),
                GenerationStep::Borders(BorderSettings::default()),
                GenerationStep::Rooms(RoomSettings {
                    rooms: vec![RoomSpec::default(); 6],
                    ..RoomSettings::default()
                }),
                GenerationStep::Caves(CaveSettings::default()),
                GenerationStep::Connectivity(ConnectivitySettings::default()),
                GenerationStep::Depth(DepthSettings::default()),
                GenerationStep::Ore(OreSettings {
                    zones: ore,
                    ..OreSettings::default()
                }),
                GenerationStep::Doors(DoorSettings::default()),
                GenerationStep::Actors(ActorSettings {
                    placements: vec![
                        ActorPlacement {
                            count_per_zone: 2,
                            ..ActorPlacement::default()
                        },
                        ActorPlacement {
                            kind: MUSHROOM_PROP,
                            count_per_zone: 3,
                            only_in_rooms: false,
                            ..ActorPlacement::default()
                        },
                    ],
                    seed: None,
                }),
            ],
        }
    }
}

/// Published once the grid is sized, before any step runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapReady {
    pub width: i32,
    pub height: i32,
}

/// Result of a full build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltMap {
    pub grid: MapGrid,
    pub context: GenContext,
    /// (step name, outcome) in run order
    pub reports: Vec<(String, StepReport)>,
    pub ready: MapReady,
}

impl BuiltMap {
    /// True when every step ran, fully or partially
    pub fn all_succeeded(&self) -> bool {
        self.reports.iter().all(|(_, r)| r.succeeded())
    }
}

/// Runs a [`MapConfig`] step by step
pub struct MapBuilder {
    config: MapConfig,
    listener: Option<Box<dyn FnMut(&MapReady)>>,
}

impl MapBuilder {
    pub fn new(config: MapConfig) -> Self {
        Self {
            config,
            listener: None,
        }
    }

    /// Called with the grid size once it is known
    pub fn with_listener(mut self, listener: impl FnMut(&MapReady) + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn build(mut self) -> BuiltMap {
        let mut grid = MapGrid::new(self.config.width, self.config.height);
        grid.fill_background(self.config.background);
        let ready = MapReady {
            width: grid.width(),
            height: grid.height(),
        };
        info!(
            width = ready.width,
            height = ready.height,
            seed = self.config.seed,
            steps = self.config.steps.len(),
            "building map"
        );
        if let Some(listener) = self.listener.as_mut() {
            listener(&ready);
        }

        let mut ctx = GenContext::new();
        let mut reports = Vec::with_capacity(self.config.steps.len());
        for (index, step) in self.config.steps.iter().enumerate() {
            let seed = step
                .seed_override()
                .unwrap_or_else(|| derive_step_seed(self.config.seed, index));
            let mut rng = GenRng::new(seed);
            let report = step.execute(&mut grid, &mut ctx, &mut rng);
            match &report {
                StepReport::Completed => {}
                StepReport::Partial(reason) => warn!(step = %step, %reason, "step incomplete"),
                StepReport::Skipped(reason) => warn!(step = %step, %reason, "step skipped"),
            }
            reports.push((step.to_string(), report));
        }

        BuiltMap {
            grid,
            context: ctx,
            reports,
            ready,
        }
    }
}
