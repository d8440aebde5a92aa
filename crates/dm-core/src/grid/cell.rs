//! Grid cell types

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Category of a background, object, ore, colour or prop.
///
/// `Tag::NONE` is the empty category and never names anything.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Tag(pub u16);

impl Tag {
    pub const NONE: Tag = Tag(0);

    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

bitflags! {
    /// Per-cell render state
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct CellFlags: u8 {
        const VIEWED = 0x01;
    }
}

// Manual serde impl for CellFlags
impl Serialize for CellFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CellFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(CellFlags::from_bits_truncate(bits))
    }
}

/// A blocking object standing on a cell (wall, rock, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellObject {
    pub tag: Tag,
    /// Always positive while the object exists
    pub durability: i32,
}

/// A single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Cosmetic ground category, never blocks
    pub background: Tag,

    /// Blocking object, if any
    pub object: Option<CellObject>,

    /// Ore category; independent of the object
    pub ore: Tag,

    /// Zone id, -1 while unassigned
    pub zone: i32,

    pub flags: CellFlags,

    /// Entity standing here (door, key, prop)
    pub occupant: Option<EntityId>,
}

impl Default for Cell {
    fn default() -> Self {
        Self::empty()
    }
}

impl Cell {
    /// An unassigned cell with no background or object
    pub const fn empty() -> Self {
        Self {
            background: Tag::NONE,
            object: None,
            ore: Tag::NONE,
            zone: -1,
            flags: CellFlags::empty(),
            occupant: None,
        }
    }

    /// True when nothing blocks this cell
    pub fn is_open(&self) -> bool {
        match self.object {
            None => true,
            Some(obj) => obj.durability <= 0,
        }
    }

    pub fn has_object(&self) -> bool {
        !self.is_open()
    }

    /// Category of the blocking object, if there is one
    pub fn object_tag(&self) -> Option<Tag> {
        self.object.filter(|o| o.durability > 0).map(|o| o.tag)
    }

    pub fn is_viewed(&self) -> bool {
        self.flags.contains(CellFlags::VIEWED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cell_is_open_and_unassigned() {
        let cell = Cell::default();
        assert!(cell.is_open());
        assert_eq!(cell.zone, -1);
        assert_eq!(cell.object_tag(), None);
    }

    #[test]
    fn test_spent_object_counts_as_open() {
        let mut cell = Cell::empty();
        cell.object = Some(CellObject {
            tag: Tag(2),
            durability: 0,
        });
        assert!(cell.is_open());
        assert_eq!(cell.object_tag(), None);
    }

    #[test]
    fn test_flags_serde() {
        let mut cell = Cell::empty();
        cell.flags.insert(CellFlags::VIEWED);
        let json = serde_json::to_string(&cell).unwrap();
        let back: Cell = serde_json::from_str(&json).unwrap();
        assert!(back.is_viewed());
    }
}
