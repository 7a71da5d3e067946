//! Random source for jitter and delay variance
//!
//! The generator is seeded once when the humanizer is built. Tests pass a
//! fixed seed instead of reseeding a live instance.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Jitter range in tenths of a pixel (±1.5 units per axis)
const JITTER_TENTHS: i32 = 15;

/// Humanizer for generating jitter and delay variance
pub struct Humanizer {
    rng: StdRng,
}

impl Default for Humanizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Humanizer {
    /// Create a humanizer seeded from the high-resolution system clock
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::with_seed(seed)
    }

    /// Create a deterministic humanizer
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Create a humanizer around an existing generator
    pub fn with_rng(rng: StdRng) -> Self {
        Self { rng }
    }

    /// Per-axis jitter to add to a pointer delta.
    ///
    /// Drawn uniformly from ±1.5 units and truncated to whole pixels, so each
    /// axis moves by -1, 0 or +1.
    pub fn jitter(&mut self) -> (i32, i32) {
        let x = self.rng.gen_range(-JITTER_TENTHS..=JITTER_TENTHS) / 10;
        let y = self.rng.gen_range(-JITTER_TENTHS..=JITTER_TENTHS) / 10;
        (x, y)
    }

    /// `base_ms` plus a uniform offset in ±`variation_ms`, never negative
    pub fn varied_delay(&mut self, base_ms: u64, variation_ms: u64) -> u64 {
        if variation_ms == 0 {
            return base_ms;
        }

        let variation = variation_ms as i64;
        let offset = self.rng.gen_range(-variation..=variation);

        (base_ms as i64 + offset).max(0) as u64
    }
}
