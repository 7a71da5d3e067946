//! Motion randomization
//!
//! Corrections are never emitted as a perfectly repeatable signal:
//! - every pointer delta gets a small per-axis jitter
//! - each correction is split into several sub-moves
//! - a randomized pause follows every correction

pub mod humanize;

use serde::{Deserialize, Serialize};

pub use humanize::*;

/// Timing knobs for how corrections are emitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StealthConfig {
    /// Sub-moves per correction
    pub smoothing_steps: u32,
    /// Pause between sub-moves (ms)
    pub step_delay_ms: u64,
    /// Base pause after a correction (ms)
    pub correction_delay_ms: u64,
    /// Random spread applied to the post-correction pause (ms)
    pub correction_delay_variation_ms: u64,
    /// How long synthetic clicks hold the button down (ms)
    pub click_hold_ms: u64,
}

impl Default for StealthConfig {
    fn default() -> Self {
        Self {
            smoothing_steps: 3,
            step_delay_ms: 2,
            correction_delay_ms: 5,
            correction_delay_variation_ms: 10,
            click_hold_ms: 10,
        }
    }
}
