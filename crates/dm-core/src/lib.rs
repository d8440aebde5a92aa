//! dm-core: procedural generation of zoned cave/dungeon tile grids
//!
//! The crate holds the grid data structure, the entity store for gates and
//! props, and every generation step. A level is built by running an ordered
//! list of [`GenerationStep`]s through [`MapBuilder`].
//!
//! All generation is deterministic for a given master seed.

pub mod consts;
pub mod entity;
pub mod error;
pub mod generation;
pub mod grid;
pub mod rng;

pub use entity::{Door, Entity, EntityId, EntityKind, EntityStore, Key, Prop};
pub use error::{ConfigError, GridError, LoadError};
pub use generation::{
    BuiltMap, GenContext, GenerationStep, MapBuilder, MapConfig, MapReady, StepReport,
};
pub use grid::{Cell, CellFlags, CellObject, Coord, DamageOutcome, MapGrid, Passage, Room, Tag};
pub use rng::GenRng;
