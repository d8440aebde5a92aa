//! Tile grid
//!
//! Contains cells, coordinates, the grid itself and the rooms and passages
//! recorded on it by generation steps.

mod cell;
mod coord;
mod features;
mod map;

pub use cell::{Cell, CellFlags, CellObject, Tag};
pub use coord::{Coord, DIRS4, DIRS8};
pub use features::{Passage, Room};
pub(crate) use features::outward_neighbor;
pub use map::{DamageOutcome, MapGrid, clamp_dimension};
