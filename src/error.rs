use thiserror::Error;

use crate::geometry::Rect;

/// Why a generation pass stopped before finishing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The cancel token was raised. Units already applied stay on the surface.
    #[error("generation cancelled after {units_completed} units")]
    Cancelled { units_completed: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Recoverable problem found while placing a room. The pass carries on with a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementWarning {
    #[error("leaf {leaf:?} is smaller than the minimum room size {min_room_size}, using the leaf bounds")]
    LeafTooSmall { leaf: Rect, min_room_size: i32 },
}
