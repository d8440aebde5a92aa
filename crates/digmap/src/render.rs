//! Text output for built maps

use serde::Serialize;

use dm_core::{BuiltMap, Coord, EntityKind, StepReport, Tag};

/// One character per cell, one line per row
pub fn ascii(built: &BuiltMap) -> String {
    let grid = &built.grid;
    let mut out = String::with_capacity(grid.len() + grid.height() as usize);
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            out.push(glyph(built, Coord::new(x, y)));
        }
        out.push('\n');
    }
    out
}

fn glyph(built: &BuiltMap, c: Coord) -> char {
    let grid = &built.grid;
    if let Some(entity) = grid.occupant(c).and_then(|id| built.context.entities.get(id)) {
        return match &entity.kind {
            EntityKind::Door(door) if door.open => '/',
            EntityKind::Door(_) => '+',
            EntityKind::Key(_) => 'k',
            EntityKind::Prop(_) => '&',
        };
    }
    if grid.has_object(c) {
        if grid.ore(c) != Tag::NONE { '*' } else { '#' }
    } else {
        '.'
    }
}

#[derive(Debug, Serialize)]
pub struct ZoneSummary {
    pub zone: i32,
    pub cells: usize,
    pub open: usize,
    pub depth: i32,
    pub rooms: usize,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub seed: u64,
    pub width: i32,
    pub height: i32,
    pub zones: Vec<ZoneSummary>,
    pub passages: usize,
    pub doors: usize,
    pub keys: usize,
    pub props: usize,
    pub steps: Vec<StepSummary>,
}

#[derive(Debug, Serialize)]
pub struct StepSummary {
    pub step: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Summary {
    pub fn new(built: &BuiltMap, seed: u64) -> Self {
        let grid = &built.grid;
        let ctx = &built.context;
        let zones = grid
            .zone_ids()
            .into_iter()
            .map(|zone| {
                let cells = grid.cells_for_zone(zone);
                ZoneSummary {
                    zone,
                    open: cells.iter().filter(|&&c| grid.is_open(c)).count(),
                    cells: cells.len(),
                    depth: ctx.zone_depth(zone),
                    rooms: grid.rooms_for_zone(zone).count(),
                }
            })
            .collect();
        let steps = built
            .reports
            .iter()
            .map(|(step, report)| {
                let (status, reason) = match report {
                    StepReport::Completed => ("completed", None),
                    StepReport::Partial(r) => ("partial", Some(r.clone())),
                    StepReport::Skipped(r) => ("skipped", Some(r.clone())),
                };
                StepSummary {
                    step: step.clone(),
                    status,
                    reason,
                }
            })
            .collect();

        Self {
            seed,
            width: grid.width(),
            height: grid.height(),
            zones,
            passages: grid.passages().len(),
            doors: ctx.entities.doors().count(),
            keys: ctx.entities.keys().count(),
            props: ctx.entities.props().count(),
            steps,
        }
    }
}
