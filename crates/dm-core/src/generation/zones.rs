//! Zone partitioning by weighted multi-source region growing
//!
//! 1. Each zone gets a target area proportional to its weight
//! 2. Zone 0 is seeded at the grid centre; other seeds are spread out
//! 3. Zones grow from their frontiers, picked by a roulette wheel that favours
//!    zones furthest below target
//! 4. Whatever is left when every frontier stalls is flooded from labelled
//!    neighbours
//!
//! Zones listed in `forbid_adjacent_to_zero` never touch zone 0, and keep out
//! of the moat around it when one is set.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{GenContext, StepReport};
use crate::consts::{
    DEFAULT_MIN_SEED_SEPARATION, DEFAULT_OVERFILL, DEFAULT_SOFTNESS, FRONTIER_RESHUFFLE_PERIOD,
    MIN_PICK_WEIGHT, SEED_TRIALS,
};
use crate::error::ConfigError;
use crate::grid::{Coord, MapGrid, clamp_dimension};
use crate::rng::GenRng;

/// Relative share of the grid for one zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneWeight {
    pub zone: i32,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneSettings {
    /// One entry per zone; ids must be exactly 0..N-1
    pub weights: Vec<ZoneWeight>,
    pub forbid_adjacent_to_zero: Vec<i32>,
    /// City-block distance from zone 0 that forbidden zones keep clear of (0 = none)
    pub moat: i32,
    pub min_seed_separation: i32,
    /// Added to every growing zone's pick weight
    pub softness: f64,
    /// Zones stop growing once area reaches target × overfill
    pub overfill: f64,
    pub seed: Option<u64>,
}

impl Default for ZoneSettings {
    fn default() -> Self {
        Self {
            weights: vec![ZoneWeight {
                zone: 0,
                weight: 1.0,
            }],
            forbid_adjacent_to_zero: Vec::new(),
            moat: 0,
            min_seed_separation: DEFAULT_MIN_SEED_SEPARATION,
            softness: DEFAULT_SOFTNESS,
            overfill: DEFAULT_OVERFILL,
            seed: None,
        }
    }
}

impl ZoneSettings {
    /// Equal weights for zones 0..count
    pub fn uniform(count: usize) -> Self {
        Self {
            weights: (0..count)
                .map(|zone| ZoneWeight {
                    zone: zone as i32,
                    weight: 1.0,
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn zone_count(&self) -> usize {
        self.weights.len()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let count = self.weights.len();
        if count == 0 {
            return Err(ConfigError::NoZones);
        }
        let mut seen = vec![false; count];
        for w in &self.weights {
            if w.zone < 0 || w.zone as usize >= count {
                return Err(ConfigError::ZoneIdOutOfRange {
                    zone: w.zone,
                    count,
                });
            }
            if seen[w.zone as usize] {
                return Err(ConfigError::DuplicateZone { zone: w.zone });
            }
            seen[w.zone as usize] = true;
            if !w.weight.is_finite() {
                return Err(ConfigError::InvalidWeight { zone: w.zone });
            }
        }
        for &z in &self.forbid_adjacent_to_zero {
            if z == 0 {
                return Err(ConfigError::ForbiddenRootZone { zone: z });
            }
            if z < 0 || z as usize >= count {
                return Err(ConfigError::ZoneIdOutOfRange { zone: z, count });
            }
        }
        if self.moat < 0 {
            return Err(ConfigError::TooSmall {
                what: "moat",
                min: 0,
                value: self.moat,
            });
        }
        if !(self.softness >= 0.0) {
            return Err(ConfigError::Negative {
                what: "softness",
                value: self.softness,
            });
        }
        if !(self.overfill > 0.0) {
            return Err(ConfigError::Negative {
                what: "overfill",
                value: self.overfill,
            });
        }
        Ok(())
    }

    /// Label the grid and store the labels in the context.
    pub fn execute(&self, grid: &mut MapGrid, ctx: &mut GenContext, rng: &mut GenRng) -> StepReport {
        let labels = match partition_zones(grid.width(), grid.height(), self, rng) {
            Ok(labels) => labels,
            Err(err) => return err.into(),
        };
        if let Err(err) = grid.apply_zone_labels(&labels) {
            return StepReport::Skipped(err.to_string());
        }
        ctx.labels = labels;
        info!(zones = self.zone_count(), "zones partitioned");
        StepReport::Completed
    }
}

/// Growth state for one run
struct Partitioner<'a> {
    width: i32,
    height: i32,
    settings: &'a ZoneSettings,
    labels: Vec<i32>,
    forbidden: Vec<bool>,
}

impl Partitioner<'_> {
    fn coord(&self, i: usize) -> Coord {
        let i = i as i32;
        Coord::new(i % self.width, i / self.width)
    }

    fn index(&self, c: Coord) -> Option<usize> {
        if c.x >= 0 && c.y >= 0 && c.x < self.width && c.y < self.height {
            Some((c.x + c.y * self.width) as usize)
        } else {
            None
        }
    }

    fn label(&self, c: Coord) -> i32 {
        self.index(c).map_or(-1, |i| self.labels[i])
    }

    fn is_forbidden(&self, zone: i32) -> bool {
        zone > 0 && self.forbidden[zone as usize]
    }

    /// Whether `zone` may take `idx` without breaking the zone-0 separation rules
    fn can_claim(&self, zone: i32, idx: usize) -> bool {
        let c = self.coord(idx);
        let moat = self.settings.moat;
        if self.is_forbidden(zone) {
            if c.neighbors4().into_iter().any(|n| self.label(n) == 0) {
                return false;
            }
            if moat > 0 && c.diamond(moat).any(|n| self.label(n) == 0) {
                return false;
            }
        } else if zone == 0 {
            if c
                .neighbors4()
                .into_iter()
                .any(|n| self.is_forbidden(self.label(n)))
            {
                return false;
            }
            if moat > 0 && c.diamond(moat).any(|n| self.is_forbidden(self.label(n))) {
                return false;
            }
        }
        true
    }

    fn push_free_neighbors(&self, idx: usize, frontier: &mut Vec<usize>) {
        for n in self.coord(idx).neighbors4() {
            if let Some(ni) = self.index(n)
                && self.labels[ni] == -1
            {
                frontier.push(ni);
            }
        }
    }

    /// Zone 0 at the centre; others sampled to maximise distance to placed seeds.
    fn place_seeds(&self, count: usize, rng: &mut GenRng) -> Vec<Option<usize>> {
        let center = Coord::new(self.width / 2, self.height / 2);
        let total = (self.width * self.height) as u32;
        let min_sep = self.settings.min_seed_separation;
        let moat = self.settings.moat.max(1);

        let mut seeds: Vec<Option<usize>> = Vec::with_capacity(count);
        seeds.push(self.index(center));
        let mut placed: Vec<Coord> = vec![center];

        for zone in 1..count {
            let forbidden = self.forbidden[zone];
            let mut best_spread: Option<(i32, Coord)> = None;
            let mut best_any: Option<(i32, Coord)> = None;

            for _ in 0..SEED_TRIALS {
                let cand = self.coord(rng.rn2(total) as usize);
                if placed.contains(&cand) {
                    continue;
                }
                if forbidden && cand.manhattan(center) <= moat {
                    continue;
                }
                let d = placed
                    .iter()
                    .map(|p| p.manhattan(cand))
                    .min()
                    .unwrap_or(i32::MAX);
                if best_any.is_none_or(|(bd, _)| d > bd) {
                    best_any = Some((d, cand));
                }
                if d >= min_sep && best_spread.is_none_or(|(bd, _)| d > bd) {
                    best_spread = Some((d, cand));
                }
            }

            match best_spread.or(best_any) {
                Some((_, c)) => {
                    placed.push(c);
                    seeds.push(self.index(c));
                }
                None => {
                    debug!(zone, "no seed cell found");
                    seeds.push(None);
                }
            }
        }
        seeds
    }

    /// Label every still-unassigned cell from its labelled neighbours.
    fn flood_remaining(&mut self) {
        let mut queue: VecDeque<usize> = (0..self.labels.len())
            .filter(|&i| self.labels[i] >= 0)
            .collect();

        while let Some(idx) = queue.pop_front() {
            let zone = self.labels[idx];
            for n in self.coord(idx).neighbors4() {
                let Some(ni) = self.index(n) else { continue };
                if self.labels[ni] == -1 && self.can_claim(zone, ni) {
                    self.labels[ni] = zone;
                    queue.push_back(ni);
                }
            }
        }

        // Pockets sealed off by the separation rules
        let zone_count = self.forbidden.len() as i32;
        for idx in 0..self.labels.len() {
            if self.labels[idx] != -1 {
                continue;
            }
            let c = self.coord(idx);
            let neighbor_zone = c
                .neighbors4()
                .into_iter()
                .map(|n| self.label(n))
                .find(|&z| z >= 0 && self.can_claim(z, idx));
            let legal_zone = || (0..zone_count).find(|&z| !self.is_forbidden(z) && self.can_claim(z, idx));
            let zone = neighbor_zone
                .or_else(legal_zone)
                .or_else(|| c.neighbors4().into_iter().map(|n| self.label(n)).find(|&z| z >= 0))
                .unwrap_or(0);
            self.labels[idx] = zone;
        }
    }
}

/// Partition a `width`×`height` grid into zones. Returns one label per cell,
/// row-major, all ≥ 0.
pub fn partition_zones(
    width: i32,
    height: i32,
    settings: &ZoneSettings,
    rng: &mut GenRng,
) -> Result<Vec<i32>, ConfigError> {
    settings.validate()?;
    let width = clamp_dimension(width);
    let height = clamp_dimension(height);
    let total = (width * height) as usize;
    let count = settings.zone_count();

    let mut weights = vec![0.0; count];
    for w in &settings.weights {
        weights[w.zone as usize] = w.weight.max(0.0);
    }
    let mut sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        sum = 1.0;
    }
    let targets: Vec<usize> = weights
        .iter()
        .map(|w| ((w / sum) * total as f64).round() as usize)
        .collect();
    let caps: Vec<usize> = targets
        .iter()
        .map(|&t| (t as f64 * settings.overfill) as usize)
        .collect();

    let mut forbidden = vec![false; count];
    for &z in &settings.forbid_adjacent_to_zero {
        forbidden[z as usize] = true;
    }

    let mut p = Partitioner {
        width,
        height,
        settings,
        labels: vec![-1; total],
        forbidden,
    };

    let seeds = p.place_seeds(count, rng);
    let mut frontiers: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut areas = vec![0usize; count];
    let mut claimed = 0usize;

    for (zone, seed) in seeds.iter().enumerate() {
        let Some(idx) = *seed else { continue };
        if p.labels[idx] != -1 || !p.can_claim(zone as i32, idx) {
            continue;
        }
        p.labels[idx] = zone as i32;
        areas[zone] += 1;
        claimed += 1;
        p.push_free_neighbors(idx, &mut frontiers[zone]);
    }

    let mut pick_weights = vec![0.0; count];
    while claimed < total {
        let mut total_weight = 0.0;
        for z in 0..count {
            let w = if frontiers[z].is_empty() || areas[z] >= caps[z] {
                0.0
            } else {
                let need = targets[z].saturating_sub(areas[z]) as f64;
                need.max(MIN_PICK_WEIGHT) + settings.softness
            };
            pick_weights[z] = w;
            total_weight += w;
        }
        if total_weight <= 0.0 {
            break;
        }

        let mut r = rng.next_f64() * total_weight;
        let mut zone = count;
        for (z, &w) in pick_weights.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            zone = z;
            if r < w {
                break;
            }
            r -= w;
        }
        if zone == count {
            break;
        }

        let frontier = &mut frontiers[zone];
        let pick = rng.index(frontier.len());
        let idx = frontier.swap_remove(pick);
        if p.labels[idx] != -1 || !p.can_claim(zone as i32, idx) {
            continue;
        }

        p.labels[idx] = zone as i32;
        areas[zone] += 1;
        claimed += 1;
        p.push_free_neighbors(idx, &mut frontiers[zone]);
        if areas[zone] % FRONTIER_RESHUFFLE_PERIOD == 0 {
            rng.shuffle(&mut frontiers[zone]);
        }
    }

    if claimed < total {
        debug!(remaining = total - claimed, "frontiers exhausted, flooding");
        p.flood_remaining();
    }

    for (z, &area) in areas.iter().enumerate() {
        debug!(zone = z, target = targets[z], grown = area, "zone grown");
        if area == 0 {
            warn!(zone = z, "zone received no seed cell");
        }
    }
    Ok(p.labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(labels: &[i32], zone: i32) -> usize {
        labels.iter().filter(|&&z| z == zone).count()
    }

    #[test]
    fn test_single_zone_covers_grid() {
        let mut rng = GenRng::new(12345);
        let labels = partition_zones(12, 9, &ZoneSettings::default(), &mut rng).unwrap();
        assert_eq!(labels.len(), 108);
        assert!(labels.iter().all(|&z| z == 0));
    }

    #[test]
    fn test_equal_zones_split() {
        let mut rng = GenRng::new(12345);
        let labels = partition_zones(40, 30, &ZoneSettings::uniform(3), &mut rng).unwrap();
        assert!(labels.iter().all(|&z| (0..3).contains(&z)));
        for z in 0..3 {
            let n = count(&labels, z);
            println!("zone {z}: {n} cells");
            assert!(n > 0, "zone {z} is empty");
        }
    }

    #[test]
    fn test_zero_seed_at_center() {
        let mut rng = GenRng::new(1);
        let labels = partition_zones(21, 21, &ZoneSettings::uniform(4), &mut rng).unwrap();
        assert_eq!(labels[(10 + 10 * 21) as usize], 0);
    }

    #[test]
    fn test_forbidden_zone_never_touches_zero() {
        let settings = ZoneSettings {
            forbid_adjacent_to_zero: vec![2],
            ..ZoneSettings::uniform(3)
        };
        for seed in [1, 2, 3, 4, 5] {
            let mut rng = GenRng::new(seed);
            let labels = partition_zones(30, 20, &settings, &mut rng).unwrap();
            assert!(labels.iter().all(|&z| z >= 0));
            for y in 0..20 {
                for x in 0..30 {
                    let z = labels[(x + y * 30) as usize];
                    if x + 1 < 30 {
                        let r = labels[(x + 1 + y * 30) as usize];
                        assert!(!(z == 0 && r == 2) && !(z == 2 && r == 0));
                    }
                    if y + 1 < 20 {
                        let d = labels[(x + (y + 1) * 30) as usize];
                        assert!(!(z == 0 && d == 2) && !(z == 2 && d == 0));
                    }
                }
            }
        }
    }

    #[test]
    fn test_moat_keeps_distance() {
        let settings = ZoneSettings {
            forbid_adjacent_to_zero: vec![1],
            moat: 3,
            ..ZoneSettings::uniform(3)
        };
        let mut rng = GenRng::new(77);
        let (w, h) = (30, 24);
        let labels = partition_zones(w, h, &settings, &mut rng).unwrap();
        let zero: Vec<Coord> = (0..labels.len())
            .filter(|&i| labels[i] == 0)
            .map(|i| Coord::new(i as i32 % w, i as i32 / w))
            .collect();
        for (i, &z) in labels.iter().enumerate() {
            if z != 1 {
                continue;
            }
            let c = Coord::new(i as i32 % w, i as i32 / w);
            assert!(zero.iter().all(|&o| o.manhattan(c) > 3));
        }
    }

    #[test]
    fn test_deterministic() {
        let settings = ZoneSettings::uniform(5);
        let a = partition_zones(32, 32, &settings, &mut GenRng::new(9)).unwrap();
        let b = partition_zones(32, 32, &settings, &mut GenRng::new(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_weight_zone_still_labels_everything() {
        let settings = ZoneSettings {
            weights: vec![
                ZoneWeight {
                    zone: 0,
                    weight: 1.0,
                },
                ZoneWeight {
                    zone: 1,
                    weight: 0.0,
                },
            ],
            ..ZoneSettings::default()
        };
        let labels = partition_zones(16, 16, &settings, &mut GenRng::new(4)).unwrap();
        assert!(labels.iter().all(|&z| z == 0 || z == 1));
    }

    #[test]
    fn test_validation() {
        let mut settings = ZoneSettings::uniform(2);
        settings.weights[1].zone = 5;
        assert_eq!(
            settings.validate(),
            Err(ConfigError::ZoneIdOutOfRange { zone: 5, count: 2 })
        );

        let mut settings = ZoneSettings::uniform(2);
        settings.weights[1].zone = 0;
        assert_eq!(settings.validate(), Err(ConfigError::DuplicateZone { zone: 0 }));

        let settings = ZoneSettings {
            forbid_adjacent_to_zero: vec![0],
            ..ZoneSettings::uniform(2)
        };
        assert!(settings.validate().is_err());

        let settings = ZoneSettings {
            weights: vec![],
            ..ZoneSettings::default()
        };
        assert_eq!(settings.validate(), Err(ConfigError::NoZones));
    }

    #[test]
    fn test_execute_writes_grid_and_context() {
        let mut grid = MapGrid::new(20, 20);
        let mut ctx = GenContext::new();
        let report = ZoneSettings::uniform(2).execute(&mut grid, &mut ctx, &mut GenRng::new(3));
        assert_eq!(report, StepReport::Completed);
        assert_eq!(ctx.labels, grid.zone_labels());
        assert!(ctx.require_labels(&grid).is_ok());
    }

    #[test]
    fn test_tiny_grid() {
        let labels = partition_zones(1, 1, &ZoneSettings::uniform(3), &mut GenRng::new(2)).unwrap();
        assert_eq!(labels, vec![0]);
    }

    #[test]
    fn test_oversized_request_matches_grid() {
        let settings = ZoneSettings::uniform(2);
        let labels = partition_zones(i32::MAX, 2, &settings, &mut GenRng::new(5)).unwrap();
        let mut grid = MapGrid::new(i32::MAX, 2);
        assert_eq!(labels.len(), grid.len());
        assert!(grid.apply_zone_labels(&labels).is_ok());
    }
}
