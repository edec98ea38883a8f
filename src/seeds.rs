//! Seed management for level generation
//!
//! Each strategy gets its own seed derived from a master seed, so a layout can
//! be shared as a single number while the strategies stay independent.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::config::StrategyKind;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    pub bsp: u64,
    pub scatter: u64,
    pub caves: u64,
    pub terrain: u64,
}

impl LevelSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            bsp: derive_seed(master, "bsp"),
            scatter: derive_seed(master, "scatter"),
            caves: derive_seed(master, "caves"),
            terrain: derive_seed(master, "terrain"),
        }
    }

    pub fn for_strategy(&self, kind: StrategyKind) -> u64 {
        match kind {
            StrategyKind::Bsp => self.bsp,
            StrategyKind::Scatter => self.scatter,
            StrategyKind::Caves => self.caves,
            StrategyKind::Terrain => self.terrain,
        }
    }
}

impl Default for LevelSeeds {
    fn default() -> Self {
        Self::from_master(rand::random())
    }
}

fn derive_seed(master: u64, system: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    system.hash(&mut hasher);
    hasher.finish()
}

impl std::fmt::Display for LevelSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LevelSeeds {{ master: {}, bsp: {}, scatter: {}, caves: {}, terrain: {} }}",
            self.master, self.bsp, self.scatter, self.caves, self.terrain,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_derivation() {
        assert_eq!(LevelSeeds::from_master(12345), LevelSeeds::from_master(12345));
    }

    #[test]
    fn test_strategies_get_different_seeds() {
        let seeds = LevelSeeds::from_master(12345);
        assert_ne!(seeds.bsp, seeds.scatter);
        assert_ne!(seeds.scatter, seeds.caves);
        assert_ne!(seeds.caves, seeds.terrain);
        assert_eq!(seeds.for_strategy(StrategyKind::Caves), seeds.caves);
    }
}
