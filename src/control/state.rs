//! Control loop state and per-tick results

use std::time::Duration;

use serde::Serialize;

/// Mutable state owned by the control loop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlState {
    /// Whether compensation is running
    pub active: bool,
    /// Next pattern point to apply
    pub pattern_index: usize,
    /// When the last correction was applied; `None` right after a reset
    pub last_shot_time: Option<Duration>,
    /// Toggle key state seen on the last poll
    pub last_toggle_key_pressed: bool,
    /// Corrections applied since the engine was created
    pub corrections_applied: u64,
}

impl ControlState {
    /// Restart the pattern from its first point
    pub fn reset_pattern(&mut self) {
        self.pattern_index = 0;
        self.last_shot_time = None;
    }
}

/// What one `update()` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Engine is stopped; only the toggle key was polled
    Inactive,
    /// No flash this tick
    Idle,
    /// Flash seen but too soon after the last correction
    Gated { elapsed_ms: u64 },
    /// Flash seen but the pattern has no points left
    Exhausted,
    /// A correction was applied for pattern point `index`
    Corrected {
        index: usize,
        delta_x: i32,
        delta_y: i32,
    },
}

impl TickOutcome {
    pub fn is_correction(&self) -> bool {
        matches!(self, TickOutcome::Corrected { .. })
    }
}

/// Snapshot of the engine for host UIs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStatus {
    pub active: bool,
    pub status_text: String,
    pub profile_name: String,
    pub profile_index: usize,
    pub pattern_index: usize,
    pub pattern_len: usize,
    pub corrections_applied: u64,
    pub vertical_sensitivity: f32,
    pub horizontal_sensitivity: f32,
    pub shot_delay_ms: u64,
    pub detector: String,
    pub capture_available: bool,
    pub input_available: bool,
}
