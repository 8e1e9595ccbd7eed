//! Error types for module construction.

use thiserror::Error;

/// Errors constructing a module. All of them are fatal for the setup that
/// triggered them; a failed constructor leaves no subscription behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModuleError {
    /// Requested start cell lies outside the map.
    #[error("Start position ({x}, {y}) is out of map bounds")]
    StartOutOfBounds { x: i64, y: i64 },

    /// Requested start cell is an obstacle.
    #[error("Start position ({x}, {y}) is occupied")]
    StartOccupied { x: i64, y: i64 },

    /// A numeric parameter is outside its valid range.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}
