//! Level configuration
//!
//! A level is described by its size, an optional seed and one [`Strategy`].
//! Configurations are plain serde structs and load from JSON. Nothing here
//! rejects or repairs a configuration: [`LevelConfig::check`] only reports
//! settings that will produce degenerate output.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::generation::Strategy;

/// Which generation algorithm to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Binary space partitioning: rooms in a split tree joined by corridors
    Bsp,
    /// Greedy random room placement chained by corridors
    Scatter,
    /// Cellular automaton caves
    Caves,
    /// Noise classified into water, sand, grass and rock
    Terrain,
}

impl StrategyKind {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Bsp => "bsp",
            StrategyKind::Scatter => "scatter",
            StrategyKind::Caves => "caves",
            StrategyKind::Terrain => "terrain",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub width: usize,
    pub height: usize,
    /// Master seed. A random one is drawn when absent.
    pub seed: Option<u64>,
    pub strategy: Strategy,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 50,
            seed: None,
            strategy: Strategy::default(),
        }
    }
}

impl LevelConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of cells on the surface, `None` when a side does not fit the
    /// signed grid coordinates or the product overflows.
    pub fn cell_count(&self) -> Option<usize> {
        i32::try_from(self.width).ok()?;
        i32::try_from(self.height).ok()?;
        self.width.checked_mul(self.height)
    }

    /// Advisory checks for the whole level, including the strategy settings.
    pub fn check(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        match self.cell_count() {
            None => issues.push(ConfigIssue::new(
                "size",
                format!("{}x{} surface is too large to address", self.width, self.height),
            )),
            Some(0) => issues.push(ConfigIssue::new(
                "size",
                format!("{}x{} surface has no cells", self.width, self.height),
            )),
            Some(_) => {}
        }
        issues.extend(self.strategy.check());
        issues
    }
}

/// A setting that generation will accept but that gives degenerate output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigIssue {
    pub field: &'static str,
    pub message: String,
}

impl ConfigIssue {
    fn new(field: &'static str, message: String) -> Self {
        Self { field, message }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check_room_sizes(issues: &mut Vec<ConfigIssue>, min: i32, max: i32) {
    if min < 1 {
        issues.push(ConfigIssue::new("room_min_size", format!("{} is below 1", min)));
    }
    if min > max {
        issues.push(ConfigIssue::new(
            "room_max_size",
            format!("minimum {} exceeds maximum {}", min, max),
        ));
    }
}

fn check_neighbor_count(issues: &mut Vec<ConfigIssue>, field: &'static str, value: u8) {
    if value > 8 {
        issues.push(ConfigIssue::new(field, format!("{} can never be reached with 8 neighbors", value)));
    }
}

impl Strategy {
    pub fn check(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        match self {
            Strategy::Bsp(config) => {
                check_room_sizes(&mut issues, config.room_min_size, config.room_max_size);
                if config.min_leaf_size < 1 {
                    issues.push(ConfigIssue::new("min_leaf_size", format!("{} is below 1", config.min_leaf_size)));
                }
                if config.depth > 16 {
                    let leaves = 1u64.checked_shl(config.depth).map_or_else(|| "over 2^63".to_string(), |n| n.to_string());
                    issues.push(ConfigIssue::new("depth", format!("{} allows up to {} leaves", config.depth, leaves)));
                }
            }
            Strategy::Scatter(config) => {
                check_room_sizes(&mut issues, config.room_min_size, config.room_max_size);
                if config.spacing < 0 {
                    issues.push(ConfigIssue::new("spacing", format!("{} lets rooms overlap", config.spacing)));
                }
            }
            Strategy::Caves(config) => {
                if !(0.0..=1.0).contains(&config.fill_chance) {
                    issues.push(ConfigIssue::new("fill_chance", format!("{} is outside [0, 1]", config.fill_chance)));
                }
                check_neighbor_count(&mut issues, "birth_threshold", config.birth_threshold);
                check_neighbor_count(&mut issues, "death_threshold", config.death_threshold);
            }
            Strategy::Terrain(config) => {
                let factors = [
                    ("frequency", config.frequency),
                    ("amplitude", config.amplitude),
                    ("lacunarity", config.lacunarity),
                    ("gain", config.gain),
                    ("water_threshold", config.water_threshold),
                    ("sand_threshold", config.sand_threshold),
                    ("grass_threshold", config.grass_threshold),
                    ("rock_threshold", config.rock_threshold),
                ];
                for (field, value) in factors {
                    if !value.is_finite() {
                        issues.push(ConfigIssue::new(field, format!("{} is not a finite number", value)));
                    }
                }
                let thresholds = [
                    ("sand_threshold", config.water_threshold, config.sand_threshold),
                    ("grass_threshold", config.sand_threshold, config.grass_threshold),
                    ("rock_threshold", config.grass_threshold, config.rock_threshold),
                ];
                for (field, below, value) in thresholds {
                    if value < below {
                        issues.push(ConfigIssue::new(field, format!("{} is below the previous threshold {}", value, below)));
                    }
                }
                if config.octaves == 0 {
                    issues.push(ConfigIssue::new("octaves", "no octaves, the field is flat".to_string()));
                }
            }
        }
        issues
    }
}
