//! Passage carving through zone border walls
//!
//! For each adjacent zone pair (shuffled) a random boundary anchor is tried.
//! From the anchor, `passage_width` parallel lines are walked into zone A to
//! its first open cell, and across the boundary into zone B to its first open
//! cell. The stripe is rejected if it leaves the grid, wanders into another
//! zone, opens a mouth onto the wrong zone, or lands too close to an earlier
//! passage.

use std::collections::{BTreeMap, BTreeSet};

use hashbrown::HashSet;
use tracing::debug;

use super::borders::{BorderSettings, ZoneBoundary};
use crate::grid::{Coord, DIRS4, MapGrid, Passage};
use crate::rng::GenRng;

/// Carve passages for every zone pair and return them.
///
/// The grid is modified in place; recording the passages is left to the caller.
pub fn carve_passages(
    grid: &mut MapGrid,
    boundaries: &BTreeMap<(i32, i32), ZoneBoundary>,
    settings: &BorderSettings,
    rng: &mut GenRng,
) -> Vec<Passage> {
    let mut pairs: Vec<(i32, i32)> = boundaries.keys().copied().collect();
    rng.shuffle(&mut pairs);

    let protect_radius = (settings.thickness - 1).max(0) + settings.min_passage_distance;
    let attempts = settings.attempts_per_pair.max(1);
    let mut degrees: BTreeMap<i32, i32> = BTreeMap::new();
    let mut protected: HashSet<Coord> = HashSet::new();
    let mut passages = Vec::new();

    for (zone_a, zone_b) in pairs {
        let under_cap = |z: i32, degrees: &BTreeMap<i32, i32>| {
            let used = degrees.get(&z).copied().unwrap_or(0);
            settings.degree_cap(z).is_none_or(|cap| used < cap)
        };
        if !under_cap(zone_a, &degrees) || !under_cap(zone_b, &degrees) {
            debug!(zone_a, zone_b, "degree cap reached");
            continue;
        }
        let Some(boundary) = boundaries.get(&(zone_a, zone_b)) else {
            continue;
        };

        let mut anchors: Vec<Coord> = boundary.side_a.iter().copied().collect();
        rng.shuffle(&mut anchors);

        for _ in 0..attempts {
            if anchors.is_empty() {
                break;
            }
            let pick = rng.index(anchors.len());
            let anchor = anchors.swap_remove(pick);

            let Some(stripe) = trace_stripe(
                grid,
                anchor,
                zone_a,
                zone_b,
                boundary,
                settings.passage_width,
            ) else {
                continue;
            };
            if stripe.iter().any(|c| protected.contains(c)) {
                continue;
            }

            for &c in &stripe {
                grid.remove_object(c);
                protected.extend(c.diamond(protect_radius));
            }
            *degrees.entry(zone_a).or_insert(0) += 1;
            *degrees.entry(zone_b).or_insert(0) += 1;
            debug!(zone_a, zone_b, cells = stripe.len(), "passage carved");
            passages.push(Passage::new(zone_a, zone_b, stripe));
            break;
        }
    }
    passages
}

/// Direction from an A-side boundary cell to its B neighbour
fn crossing_direction(
    grid: &MapGrid,
    anchor: Coord,
    zone_b: i32,
    boundary: &ZoneBoundary,
) -> Option<(i32, i32)> {
    DIRS4.into_iter().find(|&(dx, dy)| {
        let n = anchor.offset(dx, dy);
        boundary.side_b.contains(&n) && grid.zone(n) == zone_b
    })
}

/// Walk from `start` by (dx, dy) through occupied cells of `zone` until an
/// open one. Returns (occupied cells, open cell).
fn walk_to_open(
    grid: &MapGrid,
    start: Coord,
    (dx, dy): (i32, i32),
    zone: i32,
) -> Option<(Vec<Coord>, Coord)> {
    let mut walled = Vec::new();
    let mut p = start;
    loop {
        if !grid.in_bounds(p) || grid.zone(p) != zone {
            return None;
        }
        if grid.is_open(p) {
            return Some((walled, p));
        }
        walled.push(p);
        p = p.offset(dx, dy);
    }
}

/// Cells to clear for a passage at `anchor`, or `None` if the stripe is invalid.
fn trace_stripe(
    grid: &MapGrid,
    anchor: Coord,
    zone_a: i32,
    zone_b: i32,
    boundary: &ZoneBoundary,
    width: i32,
) -> Option<Vec<Coord>> {
    let (dx, dy) = crossing_direction(grid, anchor, zone_b, boundary)?;
    let (tx, ty) = if dx != 0 { (0, 1) } else { (1, 0) };

    let mut stripe = Vec::new();
    let mut mouths: Vec<(Coord, i32, i32)> = Vec::new();
    for k in 0..width {
        let off = k - (width - 1) / 2;
        let start = anchor.offset(tx * off, ty * off);

        let (walled_a, mouth_a) = walk_to_open(grid, start, (-dx, -dy), zone_a)?;
        let (walled_b, mouth_b) = walk_to_open(grid, start.offset(dx, dy), (dx, dy), zone_b)?;

        stripe.push(mouth_a);
        stripe.extend(walled_a.into_iter().rev());
        stripe.extend(walled_b);
        stripe.push(mouth_b);
        mouths.push((mouth_a, zone_a, zone_b));
        mouths.push((mouth_b, zone_b, zone_a));
    }

    let members: BTreeSet<Coord> = stripe.iter().copied().collect();
    let open_outside = |c: Coord| {
        c.neighbors4()
            .into_iter()
            .filter(|n| grid.in_bounds(*n) && !members.contains(n) && grid.is_open(*n))
    };

    // Never expose a third zone
    for &c in &stripe {
        if open_outside(c).any(|n| {
            let z = grid.zone(n);
            z != zone_a && z != zone_b
        }) {
            return None;
        }
    }

    for &(mouth, own, other) in &mouths {
        if open_outside(mouth).any(|n| grid.zone(n) == other) {
            return None;
        }
        if own == zone_b && !open_outside(mouth).any(|n| grid.zone(n) == own) {
            return None;
        }
    }

    Some(stripe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::borders::{collect_boundaries, place_border_walls};
    use crate::generation::test_support::split_grid;

    fn walled_split(w: i32, h: i32, settings: &BorderSettings) -> (MapGrid, BTreeMap<(i32, i32), ZoneBoundary>) {
        let mut grid = split_grid(w, h);
        let b = collect_boundaries(&grid);
        place_border_walls(&mut grid, &b, settings);
        (grid, b)
    }

    #[test]
    fn test_single_passage_cells() {
        let settings = BorderSettings::default();
        let (mut grid, b) = walled_split(10, 10, &settings);
        let passages = carve_passages(&mut grid, &b, &settings, &mut GenRng::new(5));
        assert_eq!(passages.len(), 1);
        let p = &passages[0];
        // mouth in A, the wall cell, mouth in B
        assert_eq!(p.cells.len(), 3);
        let y = p.cells[0].y;
        assert!((1..9).contains(&y));
        assert!(p.cells.iter().all(|c| c.y == y));
        assert!(p.cells.iter().all(|&c| grid.is_open(c)));
        assert!(p.cells.iter().all(|&c| grid.zone(c) == 0 || grid.zone(c) == 1));
    }

    #[test]
    fn test_wide_passage() {
        let settings = BorderSettings {
            passage_width: 3,
            ..BorderSettings::default()
        };
        let (mut grid, b) = walled_split(12, 12, &settings);
        let passages = carve_passages(&mut grid, &b, &settings, &mut GenRng::new(11));
        assert_eq!(passages.len(), 1);
        let rows: BTreeSet<i32> = passages[0].cells.iter().map(|c| c.y).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(passages[0].cells.len(), 9);
    }

    #[test]
    fn test_thick_wall_carved_through() {
        let settings = BorderSettings {
            thickness: 2,
            ..BorderSettings::default()
        };
        let (mut grid, b) = walled_split(12, 10, &settings);
        let passages = carve_passages(&mut grid, &b, &settings, &mut GenRng::new(2));
        assert_eq!(passages.len(), 1);
        // two wall cells plus both mouths
        assert_eq!(passages[0].cells.len(), 4);
        assert!(passages[0].cells.iter().all(|&c| grid.is_open(c)));
    }

    #[test]
    fn test_degree_cap_zero_blocks() {
        let mut settings = BorderSettings::default();
        settings.max_passages.insert(1, 0);
        let (mut grid, b) = walled_split(10, 10, &settings);
        let passages = carve_passages(&mut grid, &b, &settings, &mut GenRng::new(5));
        assert!(passages.is_empty());
    }

    #[test]
    fn test_third_zone_rejected() {
        // Zone 1 left, zone 2 right, a single zone-0 cell beside the B mouth
        let (w, h) = (9, 5);
        let mut grid = MapGrid::new(w, h);
        let mut labels: Vec<i32> = (0..w * h).map(|i| if i % w < 4 { 1 } else { 2 }).collect();
        labels[(5 + 2 * w) as usize] = 0;
        grid.apply_zone_labels(&labels).unwrap();
        let settings = BorderSettings::default();
        let b = collect_boundaries(&grid);
        place_border_walls(&mut grid, &b, &settings);

        let boundary = &b[&(1, 2)];
        // zone 0 is walled on its side of the boundary, so nothing leaks
        assert!(trace_stripe(&grid, Coord::new(3, 2), 1, 2, boundary, 1).is_some());

        grid.remove_object(Coord::new(5, 2));
        assert!(trace_stripe(&grid, Coord::new(3, 2), 1, 2, boundary, 1).is_none());
        assert!(trace_stripe(&grid, Coord::new(3, 1), 1, 2, boundary, 1).is_some());
    }

    #[test]
    fn test_anchor_on_edge_row_rejected() {
        let settings = BorderSettings::default();
        let (grid, b) = walled_split(10, 10, &settings);
        let boundary = &b[&(0, 1)];
        assert!(trace_stripe(&grid, Coord::new(4, 0), 0, 1, boundary, 1).is_none());
        assert!(trace_stripe(&grid, Coord::new(4, 9), 0, 1, boundary, 1).is_none());
        assert!(trace_stripe(&grid, Coord::new(4, 4), 0, 1, boundary, 1).is_some());
    }
}
