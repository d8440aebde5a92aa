//! Map grid (flat W×H cell storage)

use serde::{Deserialize, Serialize};

use super::{Cell, CellFlags, CellObject, Coord, Passage, Room, Tag};
use crate::consts::MAX_MAP_DIMENSION;
use crate::entity::EntityId;
use crate::error::GridError;

/// Clamp a requested width or height to `1..=MAX_MAP_DIMENSION`
pub fn clamp_dimension(n: i32) -> i32 {
    n.clamp(1, MAX_MAP_DIMENSION)
}

/// Result of damaging an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Out of bounds, no object there, or a non-positive amount
    Rejected,
    /// The object survives with this durability
    Damaged { remaining: i32 },
    /// The object was removed; carries whatever ore the cell held
    Destroyed { object: Tag, ore: Tag },
}

impl DamageOutcome {
    pub fn is_destroyed(&self) -> bool {
        matches!(self, DamageOutcome::Destroyed { .. })
    }
}

/// The level grid
///
/// Mutators return `false` (or do nothing) for out-of-bounds coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapGrid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
    rooms: Vec<Room>,
    passages: Vec<Passage>,
}

impl MapGrid {
    /// Create a grid; sizes below 1 are clamped to 1.
    pub fn new(width: i32, height: i32) -> Self {
        let mut grid = Self {
            width: 0,
            height: 0,
            cells: Vec::new(),
            rooms: Vec::new(),
            passages: Vec::new(),
        };
        grid.initialize(width, height);
        grid
    }

    /// Reset every cell and drop recorded rooms and passages. Dimensions are
    /// clamped with [`clamp_dimension`].
    pub fn initialize(&mut self, width: i32, height: i32) {
        self.width = clamp_dimension(width);
        self.height = clamp_dimension(height);
        self.cells = vec![Cell::empty(); (self.width * self.height) as usize];
        self.rooms.clear();
        self.passages.clear();
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, c: Coord) -> bool {
        c.x >= 0 && c.y >= 0 && c.x < self.width && c.y < self.height
    }

    pub fn is_edge(&self, c: Coord) -> bool {
        self.in_bounds(c)
            && (c.x == 0 || c.y == 0 || c.x == self.width - 1 || c.y == self.height - 1)
    }

    pub fn index(&self, c: Coord) -> Option<usize> {
        if self.in_bounds(c) {
            Some((c.x + c.y * self.width) as usize)
        } else {
            None
        }
    }

    pub fn coord_of(&self, index: usize) -> Coord {
        let i = index as i32;
        Coord::new(i % self.width, i / self.width)
    }

    /// All coordinates in row-major order
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.cells.len()).map(move |i| self.coord_of(i))
    }

    pub fn cell(&self, c: Coord) -> Option<&Cell> {
        self.index(c).map(|i| &self.cells[i])
    }

    fn cell_mut(&mut self, c: Coord) -> Option<&mut Cell> {
        match self.index(c) {
            Some(i) => Some(&mut self.cells[i]),
            None => None,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    // Background

    pub fn background(&self, c: Coord) -> Tag {
        self.cell(c).map_or(Tag::NONE, |cell| cell.background)
    }

    pub fn set_background(&mut self, c: Coord, tag: Tag) -> bool {
        match self.cell_mut(c) {
            Some(cell) => {
                cell.background = tag;
                true
            }
            None => false,
        }
    }

    pub fn fill_background(&mut self, tag: Tag) {
        for cell in &mut self.cells {
            cell.background = tag;
        }
    }

    // Objects

    /// Place or replace an object. An invalid tag or non-positive durability
    /// removes the object instead.
    pub fn set_object(&mut self, c: Coord, tag: Tag, durability: i32) -> bool {
        let Some(cell) = self.cell_mut(c) else {
            return false;
        };
        if !tag.is_valid() || durability <= 0 {
            cell.object = None;
        } else {
            cell.object = Some(CellObject { tag, durability });
        }
        true
    }

    pub fn remove_object(&mut self, c: Coord) -> bool {
        match self.cell_mut(c) {
            Some(cell) => {
                cell.object = None;
                true
            }
            None => false,
        }
    }

    pub fn object(&self, c: Coord) -> Option<CellObject> {
        self.cell(c)
            .and_then(|cell| cell.object)
            .filter(|o| o.durability > 0)
    }

    /// False out of bounds
    pub fn is_open(&self, c: Coord) -> bool {
        self.cell(c).is_some_and(Cell::is_open)
    }

    pub fn has_object(&self, c: Coord) -> bool {
        self.cell(c).is_some_and(Cell::has_object)
    }

    /// Apply `amount` damage to the object at `c`.
    pub fn damage_object_at(&mut self, c: Coord, amount: i32) -> DamageOutcome {
        if amount <= 0 {
            return DamageOutcome::Rejected;
        }
        let Some(cell) = self.cell_mut(c) else {
            return DamageOutcome::Rejected;
        };
        let Some(mut obj) = cell.object.filter(|o| o.durability > 0) else {
            return DamageOutcome::Rejected;
        };
        obj.durability -= amount;
        if obj.durability <= 0 {
            let ore = cell.ore;
            cell.object = None;
            cell.ore = Tag::NONE;
            DamageOutcome::Destroyed {
                object: obj.tag,
                ore,
            }
        } else {
            cell.object = Some(obj);
            DamageOutcome::Damaged {
                remaining: obj.durability,
            }
        }
    }

    // Zones

    /// -1 when unassigned or out of bounds
    pub fn zone(&self, c: Coord) -> i32 {
        self.cell(c).map_or(-1, |cell| cell.zone)
    }

    pub fn set_zone(&mut self, c: Coord, zone: i32) -> bool {
        match self.cell_mut(c) {
            Some(cell) => {
                cell.zone = zone;
                true
            }
            None => false,
        }
    }

    /// Copy a full label array onto the cells.
    pub fn apply_zone_labels(&mut self, labels: &[i32]) -> Result<(), GridError> {
        if labels.len() != self.cells.len() {
            return Err(GridError::LabelCount {
                expected: self.cells.len(),
                got: labels.len(),
            });
        }
        for (cell, &zone) in self.cells.iter_mut().zip(labels) {
            cell.zone = zone;
        }
        Ok(())
    }

    pub fn zone_labels(&self) -> Vec<i32> {
        self.cells.iter().map(|c| c.zone).collect()
    }

    /// Highest zone id + 1 (0 if nothing is labelled)
    pub fn zone_count(&self) -> usize {
        self.cells
            .iter()
            .map(|c| c.zone)
            .max()
            .map_or(0, |z| (z + 1).max(0) as usize)
    }

    /// Zone ids that own at least one cell, ascending
    pub fn zone_ids(&self) -> Vec<i32> {
        let mut seen = vec![false; self.zone_count()];
        for cell in &self.cells {
            if cell.zone >= 0 {
                seen[cell.zone as usize] = true;
            }
        }
        seen.iter()
            .enumerate()
            .filter(|(_, s)| **s)
            .map(|(z, _)| z as i32)
            .collect()
    }

    pub fn cells_for_zone(&self, zone: i32) -> Vec<Coord> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.zone == zone)
            .map(|(i, _)| self.coord_of(i))
            .collect()
    }

    /// Zone cells with no object and no occupant
    pub fn free_cells_for_zone(&self, zone: i32) -> Vec<Coord> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.zone == zone && cell.is_open() && cell.occupant.is_none())
            .map(|(i, _)| self.coord_of(i))
            .collect()
    }

    // Ore

    pub fn ore(&self, c: Coord) -> Tag {
        self.cell(c).map_or(Tag::NONE, |cell| cell.ore)
    }

    pub fn set_ore(&mut self, c: Coord, ore: Tag) -> bool {
        match self.cell_mut(c) {
            Some(cell) => {
                cell.ore = ore;
                true
            }
            None => false,
        }
    }

    // Occupants

    pub fn occupant(&self, c: Coord) -> Option<EntityId> {
        self.cell(c).and_then(|cell| cell.occupant)
    }

    pub fn set_occupant(&mut self, c: Coord, occupant: Option<EntityId>) -> bool {
        match self.cell_mut(c) {
            Some(cell) => {
                cell.occupant = occupant;
                true
            }
            None => false,
        }
    }

    // Render flags

    pub fn set_viewed(&mut self, c: Coord, viewed: bool) -> bool {
        match self.cell_mut(c) {
            Some(cell) => {
                cell.flags.set(CellFlags::VIEWED, viewed);
                true
            }
            None => false,
        }
    }

    pub fn is_viewed(&self, c: Coord) -> bool {
        self.cell(c).is_some_and(Cell::is_viewed)
    }

    // Rooms and passages

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn rooms_for_zone(&self, zone: i32) -> impl Iterator<Item = &Room> {
        self.rooms.iter().filter(move |r| r.zone == zone)
    }

    pub fn add_room(&mut self, room: Room) {
        self.rooms.push(room);
    }

    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    pub fn add_passage(&mut self, passage: Passage) {
        self.passages.push(passage);
    }

    pub fn set_passages(&mut self, passages: Vec<Passage>) {
        self.passages = passages;
    }
}
