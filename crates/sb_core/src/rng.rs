//! Deterministic simulation RNG.
//!
//! Everything random in a session (roam headings, spawn points) draws from one
//! `SimRng` so a seed plus an input recording reproduces the whole run.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed used when the caller does not provide one.
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone)]
pub struct SimRng(pub ChaCha8Rng);

impl Default for SimRng {
    fn default() -> Self {
        Self::from_seed_u64(DEFAULT_SEED)
    }
}

impl SimRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Uniform angle in `[0, 2pi)`.
    pub fn angle(&mut self) -> f32 {
        self.0.gen_range(0.0..std::f32::consts::TAU)
    }

    /// Uniform value in the closed range `[min, max]`. A degenerate range
    /// returns `min`.
    pub fn range_inclusive(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.0.gen_range(min..=max)
    }
}
