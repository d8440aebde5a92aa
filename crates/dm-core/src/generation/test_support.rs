//! Shared fixtures for generation tests

use super::GenContext;
use crate::grid::MapGrid;

/// Left half zone 0, right half zone 1
pub(crate) fn split_grid(w: i32, h: i32) -> MapGrid {
    let mut grid = MapGrid::new(w, h);
    let labels: Vec<i32> = (0..w * h).map(|i| if i % w < w / 2 { 0 } else { 1 }).collect();
    grid.apply_zone_labels(&labels).unwrap();
    grid
}

/// Single-zone grid
pub(crate) fn one_zone_grid(w: i32, h: i32) -> MapGrid {
    let mut grid = MapGrid::new(w, h);
    grid.apply_zone_labels(&vec![0; (w * h) as usize]).unwrap();
    grid
}

/// Context whose labels mirror the grid
pub(crate) fn context_for(grid: &MapGrid) -> GenContext {
    GenContext {
        labels: grid.zone_labels(),
        ..GenContext::default()
    }
}
