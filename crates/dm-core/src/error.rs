//! Error types for configuration, grid access and config loading

use thiserror::Error;

/// A settings value that fails validation. The owning step is skipped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("no zone weights configured")]
    NoZones,

    #[error("zone ids must be dense 0..{count}, found {zone}")]
    ZoneIdOutOfRange { zone: i32, count: usize },

    #[error("zone id {zone} listed more than once")]
    DuplicateZone { zone: i32 },

    #[error("zone weight for {zone} is not a finite number")]
    InvalidWeight { zone: i32 },

    #[error("zone {zone} cannot be forbidden from touching itself")]
    ForbiddenRootZone { zone: i32 },

    #[error("{what} must be at least {min}, got {value}")]
    TooSmall {
        what: &'static str,
        min: i32,
        value: i32,
    },

    #[error("{what} must be in [0, 1], got {value}")]
    OutOfUnitRange { what: &'static str, value: f64 },

    #[error("{what} must not be negative, got {value}")]
    Negative { what: &'static str, value: f64 },

    #[error("{what} must be between 0 and 8, got {value}")]
    NeighbourLimit { what: &'static str, value: i32 },

    #[error("{what} uses the empty category")]
    InvalidTag { what: &'static str },

    #[error("room {width}x{height} is smaller than 3x3")]
    RoomTooSmall { width: i32, height: i32 },

    #[error("zone labels have not been assigned")]
    MissingZoneLabels,

    #[error("zone depths have not been computed")]
    MissingZoneDepths,
}

/// Grid-level failures that callers may want to handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("zone label array has {got} entries, grid has {expected} cells")]
    LabelCount { expected: usize, got: usize },
}

/// Failure to read a map configuration.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("could not read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid map configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
