//! Level generation strategies
//!
//! Every strategy turns into a [`GenerationPass`] for a given surface area.
//! [`Strategy::generate`] is the one-call entry point; orchestrators that
//! pace generation themselves use [`Strategy::begin`] with the drivers in
//! [`crate::pacing`].

pub mod automaton;
pub mod bsp;
pub mod corridor;
pub mod scatter;
pub mod terrain;

use serde::{Deserialize, Serialize};

use crate::config::StrategyKind;
use crate::error::GenerationError;
use crate::geometry::Rect;
use crate::pacing::{drive, drive_with, CancelToken, GenerationPass, GenerationReport, UnitReport};
use crate::rng::LevelRng;
use crate::surface::Surface;

pub use automaton::{AutomatonConfig, CavePass, CellularAutomaton, Region};
pub use bsp::{BspConfig, BspNode, BspPass};
pub use scatter::{ScatterConfig, ScatterPass};
pub use terrain::{NoiseConfig, TerrainClassifier, TerrainPass};

/// A configured generation algorithm.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Strategy {
    Bsp(BspConfig),
    Scatter(ScatterConfig),
    #[serde(alias = "automaton")]
    Caves(AutomatonConfig),
    #[serde(alias = "noise")]
    Terrain(NoiseConfig),
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Bsp(BspConfig::default())
    }
}

impl Strategy {
    /// The strategy of `kind` with default settings.
    pub fn default_for(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::Bsp => Strategy::Bsp(BspConfig::default()),
            StrategyKind::Scatter => Strategy::Scatter(ScatterConfig::default()),
            StrategyKind::Caves => Strategy::Caves(AutomatonConfig::default()),
            StrategyKind::Terrain => Strategy::Terrain(NoiseConfig::default()),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Bsp(_) => StrategyKind::Bsp,
            Strategy::Scatter(_) => StrategyKind::Scatter,
            Strategy::Caves(_) => StrategyKind::Caves,
            Strategy::Terrain(_) => StrategyKind::Terrain,
        }
    }

    /// Start a fresh pass over `bounds`. No state is shared with earlier passes.
    pub fn begin(&self, bounds: Rect) -> Box<dyn GenerationPass> {
        match self {
            Strategy::Bsp(config) => Box::new(BspPass::new(config.clone(), bounds)),
            Strategy::Scatter(config) => Box::new(ScatterPass::new(config.clone(), bounds)),
            Strategy::Caves(config) => Box::new(CavePass::new(config.clone(), bounds)),
            Strategy::Terrain(config) => Box::new(TerrainPass::new(config.clone(), bounds)),
        }
    }

    /// Generate over the whole surface, checking `cancel` between units.
    pub fn generate<S: Surface>(
        &self,
        surface: &mut S,
        rng: &mut dyn LevelRng,
        cancel: &CancelToken,
    ) -> Result<GenerationReport, GenerationError> {
        let mut pass = self.begin(surface.bounds());
        drive(pass.as_mut(), surface, rng, cancel)
    }

    /// Like [`Strategy::generate`], reporting every applied unit to `on_unit`.
    pub fn generate_with<S, F>(
        &self,
        surface: &mut S,
        rng: &mut dyn LevelRng,
        cancel: &CancelToken,
        on_unit: F,
    ) -> Result<GenerationReport, GenerationError>
    where
        S: Surface,
        F: FnMut(UnitReport, &S),
    {
        let mut pass = self.begin(surface.bounds());
        drive_with(pass.as_mut(), surface, rng, cancel, on_unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded_rng;
    use crate::surface::{Cell, LevelMap};

    #[test]
    fn test_kind_round_trips_through_defaults() {
        for kind in [StrategyKind::Bsp, StrategyKind::Scatter, StrategyKind::Caves, StrategyKind::Terrain] {
            assert_eq!(Strategy::default_for(kind).kind(), kind);
        }
    }

    #[test]
    fn test_tagged_json_fills_defaults() {
        let strategy: Strategy = serde_json::from_str(r#"{"kind": "caves", "steps": 2}"#).unwrap();
        match strategy {
            Strategy::Caves(config) => {
                assert_eq!(config.steps, 2);
                assert_eq!(config.birth_threshold, AutomatonConfig::default().birth_threshold);
            }
            other => panic!("unexpected strategy {:?}", other),
        }

        let alias: Strategy = serde_json::from_str(r#"{"kind": "noise"}"#).unwrap();
        assert_eq!(alias, Strategy::Terrain(NoiseConfig::default()));
    }

    #[test]
    fn test_pass_names_match_kind() {
        let bounds = Rect::new(0, 0, 10, 10);
        assert_eq!(Strategy::default_for(StrategyKind::Bsp).begin(bounds).name(), "bsp");
        assert_eq!(Strategy::default_for(StrategyKind::Scatter).begin(bounds).name(), "scatter");
        assert_eq!(Strategy::default_for(StrategyKind::Caves).begin(bounds).name(), "caves");
        assert_eq!(Strategy::default_for(StrategyKind::Terrain).begin(bounds).name(), "terrain");
    }

    fn extreme_strategies() -> Vec<Strategy> {
        vec![
            Strategy::Bsp(BspConfig {
                depth: u32::MAX,
                room_min_size: i32::MIN,
                room_max_size: i32::MAX,
                min_leaf_size: i32::MAX,
            }),
            Strategy::Bsp(BspConfig {
                depth: 3,
                room_min_size: i32::MAX,
                room_max_size: i32::MIN,
                min_leaf_size: i32::MIN,
            }),
            Strategy::Scatter(ScatterConfig {
                max_rooms: 50,
                room_min_size: i32::MIN,
                room_max_size: i32::MAX,
                spacing: i32::MAX,
            }),
            Strategy::Scatter(ScatterConfig {
                max_rooms: 50,
                room_min_size: i32::MAX,
                room_max_size: i32::MAX,
                spacing: i32::MIN,
            }),
            Strategy::Caves(AutomatonConfig {
                fill_chance: f64::NAN,
                birth_threshold: u8::MAX,
                death_threshold: 0,
                border_walls: false,
                steps: 3,
                min_region_size: Some(usize::MAX),
            }),
            Strategy::Terrain(NoiseConfig {
                frequency: f64::MAX,
                amplitude: f64::NAN,
                octaves: 64,
                lacunarity: f64::MAX,
                gain: f64::INFINITY,
                water_threshold: f64::NAN,
                sand_threshold: f64::NAN,
                grass_threshold: f64::NAN,
                rock_threshold: f64::NAN,
                chunk_rows: usize::MAX,
            }),
        ]
    }

    #[test]
    fn test_extreme_configs_degrade_without_panicking() {
        for strategy in extreme_strategies() {
            assert!(!strategy.check().is_empty(), "{:?} reported no issues", strategy);
            for seed in 0..3 {
                let mut map = LevelMap::new(24, 16);
                let report = strategy
                    .generate(&mut map, &mut seeded_rng(seed), &CancelToken::new())
                    .unwrap();
                assert!(report.units_completed > 0, "{:?}", strategy);
            }
        }
    }

    #[test]
    fn test_extreme_configs_give_degenerate_levels() {
        let strategies = extreme_strategies();
        let run = |strategy: &Strategy| {
            let mut map = LevelMap::new(24, 16);
            let report = strategy
                .generate(&mut map, &mut seeded_rng(4), &CancelToken::new())
                .unwrap();
            (map, report)
        };

        // Oversized minimum rooms fall back to the leaf bounds, which tile the surface
        let (map, report) = run(&strategies[1]);
        assert!(!report.rooms.is_empty());
        assert_eq!(report.warnings.len(), report.rooms.len());
        assert_eq!(map.count(Cell::Ground), 24 * 16);

        // Rooms larger than the surface are never accepted
        let (map, report) = run(&strategies[3]);
        assert!(report.rooms.is_empty());
        assert_eq!(map.count(Cell::Wall), 24 * 16);

        // A NaN fill chance seeds nothing and nothing can be born
        let (map, _) = run(&strategies[4]);
        assert_eq!(map.count(Cell::Wall), 24 * 16);

        // NaN values fail every threshold test
        let (map, report) = run(&strategies[5]);
        assert_eq!(report.units_completed, 2);
        assert_eq!(map.count(Cell::Terrain(crate::surface::TerrainKind::Rock)), 24 * 16);
    }

    #[test]
    fn test_generate_writes_to_surface() {
        let mut map = LevelMap::new(48, 32);
        let report = Strategy::default()
            .generate(&mut map, &mut seeded_rng(2), &CancelToken::new())
            .unwrap();
        assert!(report.units_completed > 0);
        assert!(map.count(Cell::Ground) > 0);
    }
}
