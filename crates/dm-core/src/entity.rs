//! Entities placed on the grid: doors, keys and props
//!
//! The grid only records an [`EntityId`] per occupied cell; the entity data
//! lives here. Doors and keys mutate their own state, never the generation
//! structures.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::grid::{Coord, MapGrid, Tag};

/// Unique identifier for placed entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    pub const NONE: EntityId = EntityId(0);
}

/// A gate sitting in a passage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    /// Lock colour; `None` until a zone claims the door
    pub colour: Option<Tag>,
    /// The two zones the passage joins (lower id first)
    pub zones: (i32, i32),
    pub open: bool,
}

/// Opens every door of the same colour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub colour: Tag,
    pub zone: i32,
}

/// Non-blocking room or cave dressing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prop {
    pub kind: Tag,
    pub zone: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum EntityKind {
    Door(Door),
    Key(Key),
    Prop(Prop),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub pos: Coord,
    pub kind: EntityKind,
}

impl Entity {
    /// Closed doors block movement; everything else is passable
    pub fn is_blocking(&self) -> bool {
        matches!(&self.kind, EntityKind::Door(door) if !door.open)
    }
}

/// Owns every placed entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStore {
    entities: Vec<Entity>,
    next_id: u32,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    /// Spawn an entity and record it as the occupant of `pos`.
    ///
    /// Returns `None` if `pos` is out of bounds or already occupied.
    pub fn spawn(&mut self, grid: &mut MapGrid, pos: Coord, kind: EntityKind) -> Option<EntityId> {
        if !grid.in_bounds(pos) || grid.occupant(pos).is_some() {
            return None;
        }
        let id = EntityId(self.next_id);
        self.next_id += 1;
        grid.set_occupant(pos, Some(id));
        self.entities.push(Entity { id, pos, kind });
        Some(id)
    }

    /// Remove an entity and clear its cell's occupant.
    pub fn remove(&mut self, grid: &mut MapGrid, id: EntityId) -> Option<Entity> {
        let idx = self.entities.iter().position(|e| e.id == id)?;
        let entity = self.entities.remove(idx);
        if grid.occupant(entity.pos) == Some(id) {
            grid.set_occupant(entity.pos, None);
        }
        Some(entity)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn doors(&self) -> impl Iterator<Item = (&Entity, &Door)> {
        self.entities.iter().filter_map(|e| match &e.kind {
            EntityKind::Door(door) => Some((e, door)),
            _ => None,
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = (&Entity, &Key)> {
        self.entities.iter().filter_map(|e| match &e.kind {
            EntityKind::Key(key) => Some((e, key)),
            _ => None,
        })
    }

    pub fn props(&self) -> impl Iterator<Item = (&Entity, &Prop)> {
        self.entities.iter().filter_map(|e| match &e.kind {
            EntityKind::Prop(prop) => Some((e, prop)),
            _ => None,
        })
    }

    pub fn door_mut(&mut self, id: EntityId) -> Option<&mut Door> {
        match &mut self.get_mut(id)?.kind {
            EntityKind::Door(door) => Some(door),
            _ => None,
        }
    }

    /// True if the entity at `pos` blocks movement
    pub fn is_blocking_at(&self, grid: &MapGrid, pos: Coord) -> bool {
        grid.occupant(pos)
            .and_then(|id| self.get(id))
            .is_some_and(Entity::is_blocking)
    }

    /// Open a door. Returns false if `id` is not a door.
    pub fn open_door(&mut self, id: EntityId) -> bool {
        match self.door_mut(id) {
            Some(door) => {
                door.open = true;
                true
            }
            None => false,
        }
    }

    /// Consume a key: opens every door of its colour and removes the key.
    ///
    /// Returns the number of doors opened, or `None` if `id` is not a key.
    pub fn use_key(&mut self, grid: &mut MapGrid, id: EntityId) -> Option<usize> {
        let colour = match &self.get(id)?.kind {
            EntityKind::Key(key) => key.colour,
            _ => return None,
        };
        let mut opened = 0;
        for entity in &mut self.entities {
            if let EntityKind::Door(door) = &mut entity.kind
                && door.colour == Some(colour)
                && !door.open
            {
                door.open = true;
                opened += 1;
            }
        }
        self.remove(grid, id);
        Some(opened)
    }
}
