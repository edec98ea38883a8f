//! Noise-driven terrain classification
//!
//! A fractal Perlin field is sampled once per cell, scaled by `amplitude` and
//! clamped to [-1, 1]. Each value is then mapped to a [`TerrainKind`] by
//! testing the thresholds in ascending order.

use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};
use crate::pacing::{GenerationPass, GenerationReport};
use crate::rng::LevelRng;
use crate::surface::{Surface, TerrainKind};
use crate::tilemap::Tilemap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub frequency: f64,
    pub amplitude: f64,
    pub octaves: u32,
    pub lacunarity: f64,
    /// Amplitude falloff per octave
    pub gain: f64,
    pub water_threshold: f64,
    pub sand_threshold: f64,
    pub grass_threshold: f64,
    /// Everything above grass is rock; this only takes part in ordering checks
    pub rock_threshold: f64,
    /// Rows classified per unit of work
    pub chunk_rows: usize,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            frequency: 0.05,
            amplitude: 1.2,
            octaves: 4,
            lacunarity: 2.0,
            gain: 0.5,
            water_threshold: -0.25,
            sand_threshold: -0.1,
            grass_threshold: 0.35,
            rock_threshold: 1.0,
            chunk_rows: 8,
        }
    }
}

/// Perlin lattice lookups overflow this far from the origin.
const MAX_SAMPLE_COORD: f64 = 1.0e12;

/// Fractal Brownian motion over `noise`, normalised back to the range of one octave.
/// Octaves whose sample point is not finite or too far out are dropped.
fn fbm(noise: &Perlin, x: f64, y: f64, octaves: u32, gain: f64, lacunarity: f64) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves {
        let (sx, sy) = (x * frequency, y * frequency);
        if !(sx.abs() < MAX_SAMPLE_COORD && sy.abs() < MAX_SAMPLE_COORD) {
            break;
        }
        total += amplitude * noise.get([sx, sy]);
        max_value += amplitude;
        amplitude *= gain;
        frequency *= lacunarity;
    }

    if max_value > 0.0 {
        total / max_value
    } else {
        0.0
    }
}

/// Cached noise map plus the threshold table that classifies it.
#[derive(Clone, Debug)]
pub struct TerrainClassifier {
    config: NoiseConfig,
    origin: Point,
    values: Tilemap<f64>,
}

impl TerrainClassifier {
    pub fn new(config: NoiseConfig) -> Self {
        Self {
            config,
            origin: Point::new(0, 0),
            values: Tilemap::new(0, 0),
        }
    }

    /// Sample the field at every cell of `bounds`, replacing any previous map.
    pub fn build_noise_map(&mut self, bounds: Rect, seed: u32) {
        let noise = Perlin::new(seed);
        let width = bounds.width.max(0) as usize;
        let height = bounds.height.max(0) as usize;
        let mut values = Tilemap::new_with(width, height, 0.0);

        for y in 0..height {
            for x in 0..width {
                let wx = (bounds.x + x as i32) as f64 * self.config.frequency;
                let wy = (bounds.y + y as i32) as f64 * self.config.frequency;
                let raw = fbm(&noise, wx, wy, self.config.octaves, self.config.gain, self.config.lacunarity);
                values.set(x, y, (raw * self.config.amplitude).clamp(-1.0, 1.0));
            }
        }

        self.origin = bounds.min();
        self.values = values;
    }

    /// Map a value to a category: the first threshold it does not exceed wins.
    pub fn classify(&self, value: f64) -> TerrainKind {
        if value <= self.config.water_threshold {
            TerrainKind::Water
        } else if value <= self.config.sand_threshold {
            TerrainKind::Sand
        } else if value <= self.config.grass_threshold {
            TerrainKind::Grass
        } else {
            TerrainKind::Rock
        }
    }

    /// Cached value at a surface coordinate, 0.0 outside the last built map.
    pub fn value_at(&self, x: i32, y: i32) -> f64 {
        let (Some(lx), Some(ly)) = (x.checked_sub(self.origin.x), y.checked_sub(self.origin.y)) else {
            return 0.0;
        };
        self.values.try_get(lx, ly).copied().unwrap_or(0.0)
    }

    pub fn noise_map(&self) -> &Tilemap<f64> {
        &self.values
    }
}

enum Phase {
    Sample,
    Classify { next_row: usize },
    Done,
}

/// Stepwise terrain: one unit builds the noise map, then each unit classifies
/// `chunk_rows` rows.
pub struct TerrainPass {
    bounds: Rect,
    classifier: TerrainClassifier,
    phase: Phase,
}

impl TerrainPass {
    pub fn new(config: NoiseConfig, bounds: Rect) -> Self {
        Self {
            bounds,
            classifier: TerrainClassifier::new(config),
            phase: Phase::Sample,
        }
    }

    pub fn classifier(&self) -> &TerrainClassifier {
        &self.classifier
    }

    fn rows(&self) -> usize {
        self.bounds.height.max(0) as usize
    }
}

impl GenerationPass for TerrainPass {
    fn name(&self) -> &'static str {
        "terrain"
    }

    fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    fn step(&mut self, surface: &mut dyn Surface, rng: &mut dyn LevelRng) -> &'static str {
        match self.phase {
            Phase::Sample => {
                let seed = rng.range(0, i32::MAX) as u32;
                log::debug!("terrain: noise seed {}", seed);
                self.classifier.build_noise_map(self.bounds, seed);
                self.phase = if self.rows() > 0 { Phase::Classify { next_row: 0 } } else { Phase::Done };
                "noise"
            }
            Phase::Classify { next_row } => {
                let end = next_row.saturating_add(self.classifier.config.chunk_rows.max(1)).min(self.rows());
                for row in next_row..end {
                    let y = self.bounds.y + row as i32;
                    for x in self.bounds.x..self.bounds.max_x() {
                        let kind = self.classifier.classify(self.classifier.value_at(x, y));
                        surface.set_tile(Point::new(x, y), kind);
                    }
                }
                self.phase = if end < self.rows() { Phase::Classify { next_row: end } } else { Phase::Done };
                "rows"
            }
            Phase::Done => "idle",
        }
    }

    fn report(&self) -> GenerationReport {
        GenerationReport::default()
    }
}
