//! Zone depth: hop distance from zone 0 over the passage graph

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{GenContext, StepReport};
use crate::error::ConfigError;
use crate::grid::{MapGrid, Passage};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthSettings {}

impl DepthSettings {
    pub fn execute(&self, grid: &mut MapGrid, ctx: &mut GenContext) -> StepReport {
        if let Err(err) = ctx.require_labels(grid) {
            return err.into();
        }
        let depths = compute_zone_depths(grid.passages(), grid.zone_count());
        let unreachable = depths.iter().filter(|&&d| d < 0).count();
        info!(
            zones = depths.len(),
            max_depth = depths.iter().copied().max().unwrap_or(-1),
            unreachable,
            "zone depths computed"
        );
        ctx.set_zone_depths(depths);
        StepReport::Completed
    }
}

/// Depth of every zone in 0..zone_count; -1 where zone 0 cannot reach.
pub fn compute_zone_depths(passages: &[Passage], zone_count: usize) -> Vec<i32> {
    let mut depths = vec![-1; zone_count];
    if zone_count == 0 {
        return depths;
    }

    let mut adjacency: BTreeMap<i32, BTreeSet<i32>> = BTreeMap::new();
    for p in passages {
        adjacency.entry(p.zone_a).or_default().insert(p.zone_b);
        adjacency.entry(p.zone_b).or_default().insert(p.zone_a);
    }

    depths[0] = 0;
    let mut queue = VecDeque::from([0]);
    while let Some(zone) = queue.pop_front() {
        let next = depths[zone as usize] + 1;
        let Some(neighbors) = adjacency.get(&zone) else {
            continue;
        };
        for &n in neighbors {
            if n >= 0 && (n as usize) < zone_count && depths[n as usize] < 0 {
                depths[n as usize] = next;
                queue.push_back(n);
            }
        }
    }
    depths
}

/// Check that depths were computed before a step that needs them
pub(crate) fn require_depths(ctx: &GenContext) -> Result<(), ConfigError> {
    if ctx.depths.is_empty() {
        return Err(ConfigError::MissingZoneDepths);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::test_support::context_for;

    fn p(a: i32, b: i32) -> Passage {
        Passage::new(a, b, Vec::new())
    }

    #[test]
    fn test_chain() {
        let depths = compute_zone_depths(&[p(0, 1), p(2, 1), p(3, 2)], 4);
        assert_eq!(depths, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_shortest_hops() {
        let depths = compute_zone_depths(&[p(0, 1), p(1, 2), p(0, 2), p(2, 3)], 4);
        assert_eq!(depths, vec![0, 1, 1, 2]);
    }

    #[test]
    fn test_unreachable() {
        let depths = compute_zone_depths(&[p(0, 1), p(2, 3)], 5);
        assert_eq!(depths, vec![0, 1, -1, -1, -1]);
        assert!(compute_zone_depths(&[], 0).is_empty());
    }

    #[test]
    fn test_execute_stores_depths() {
        let mut grid = MapGrid::new(4, 1);
        grid.apply_zone_labels(&[0, 0, 1, 2]).unwrap();
        grid.add_passage(p(0, 1));
        let mut ctx = context_for(&grid);
        assert!(require_depths(&ctx).is_err());
        DepthSettings::default().execute(&mut grid, &mut ctx);
        assert_eq!(ctx.zone_depth(0), 0);
        assert_eq!(ctx.zone_depth(1), 1);
        assert_eq!(ctx.zone_depth(2), -1);
        assert_eq!(ctx.zone_depth(7), -1);
        assert!(require_depths(&ctx).is_ok());
    }
}
