//! Default categories and tuning values

use crate::grid::Tag;

/// Default floor background
pub const FLOOR: Tag = Tag(1);
/// Walls placed on zone boundaries and the map edge
pub const BORDER_WALL: Tag = Tag(2);
/// Room perimeter walls
pub const ROOM_WALL: Tag = Tag(3);
/// Cave rock grown by the cellular automaton
pub const ROCK: Tag = Tag(4);

pub const IRON_ORE: Tag = Tag(10);
pub const GOLD_ORE: Tag = Tag(11);
pub const GEM_ORE: Tag = Tag(12);

/// Door/key colours, one per zone in the default layout
pub const KEY_COLOURS: [Tag; 6] = [Tag(20), Tag(21), Tag(22), Tag(23), Tag(24), Tag(25)];

/// Decorative prop placed in rooms
pub const CRATE_PROP: Tag = Tag(30);
/// Decorative prop placed in caves
pub const MUSHROOM_PROP: Tag = Tag(31);

pub const DEFAULT_WALL_DURABILITY: i32 = 100;

/// Largest width or height a grid may have; keeps W×H well inside `i32`
pub const MAX_MAP_DIMENSION: i32 = 4096;

// Zone partitioner
pub const DEFAULT_SOFTNESS: f64 = 0.25;
pub const DEFAULT_OVERFILL: f64 = 1.08;
pub const DEFAULT_MIN_SEED_SEPARATION: i32 = 6;
pub const SEED_TRIALS: u32 = 64;
pub const FRONTIER_RESHUFFLE_PERIOD: usize = 16;
pub const MIN_PICK_WEIGHT: f64 = 1e-4;

// Passages
pub const DEFAULT_PASSAGE_WIDTH: i32 = 1;
pub const DEFAULT_MIN_PASSAGE_DISTANCE: i32 = 2;
pub const DEFAULT_ATTEMPTS_PER_PAIR: i32 = 6;

// Rooms
pub const DEFAULT_ROOM_SIZE: i32 = 6;
pub const MIN_ROOM_SIZE: i32 = 3;
pub const DEFAULT_ROOM_ATTEMPTS: i32 = 512;

// Cave automaton
pub const DEFAULT_FILL_CHANCE: f64 = 0.45;
pub const DEFAULT_CA_ITERATIONS: i32 = 5;
pub const DEFAULT_BIRTH_LIMIT: i32 = 5;
pub const DEFAULT_SURVIVAL_LIMIT: i32 = 4;
