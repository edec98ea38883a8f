//! Random source contract used by every generation pass.
//!
//! Passes only ever draw integers from a half-open range and weighted coin
//! flips, so the trait stays object safe and any seeded `rand::Rng` fits.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub trait LevelRng {
    /// Uniform integer in `min..max_exclusive`. Returns `min` when the range is empty.
    fn range(&mut self, min: i32, max_exclusive: i32) -> i32;

    /// `true` with probability `p`, clamped to `[0, 1]`.
    fn chance(&mut self, p: f64) -> bool;
}

impl<R: Rng + ?Sized> LevelRng for R {
    fn range(&mut self, min: i32, max_exclusive: i32) -> i32 {
        if max_exclusive <= min {
            return min;
        }
        self.gen_range(min..max_exclusive)
    }

    fn chance(&mut self, p: f64) -> bool {
        if p.is_nan() || p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.gen_bool(p)
    }
}

/// The generator every pass is driven with unless the caller brings its own.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}
