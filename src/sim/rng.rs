//! Seeded random source for the simulation
//!
//! Every random decision (AI rolls, personality jitter, spawn points) draws
//! from one of these, so a world replays identically from the same seed.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// RNG wrapper that remembers its seed and serializes its stream position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimRng {
    pub seed: u64,
    inner: Pcg32,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: Pcg32::seed_from_u64(seed),
        }
    }

    /// Uniform in [0, 1)
    pub fn unit(&mut self) -> f32 {
        self.inner.random::<f32>()
    }

    /// Uniform in [lo, hi); returns `lo` for an empty range
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        lo + self.unit() * (hi - lo)
    }

    /// True with probability `p` (clamped to [0, 1])
    pub fn chance(&mut self, p: f32) -> bool {
        self.unit() < p.clamp(0.0, 1.0)
    }

    /// Uniform index in [0, n)
    pub fn index(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.inner.random_range(0..n)
    }

    /// `base ± variance`, clamped to [0, 1]
    pub fn jitter(&mut self, base: f32, variance: f32) -> f32 {
        (base + self.range(-variance, variance)).clamp(0.0, 1.0)
    }

    /// Uniform point inside the rectangle [margin, size - margin]
    pub fn point_in(&mut self, size: Vec2, margin: f32) -> Vec2 {
        Vec2::new(
            self.range(margin, size.x - margin),
            self.range(margin, size.y - margin),
        )
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::new(0)
    }
}
