//! Level generation library
//!
//! Re-exports modules for use by binaries and tools.

pub mod config;
pub mod error;
pub mod export;
pub mod generation;
pub mod geometry;
pub mod pacing;
pub mod rng;
pub mod seeds;
pub mod surface;
pub mod tilemap;

pub use config::{LevelConfig, StrategyKind};
pub use error::{ConfigError, GenerationError, PlacementWarning};
pub use generation::Strategy;
pub use geometry::{Point, Rect};
pub use pacing::{CancelToken, GenerationPass, GenerationReport};
pub use rng::{seeded_rng, LevelRng};
pub use surface::{Cell, LevelMap, Surface, TerrainKind};
