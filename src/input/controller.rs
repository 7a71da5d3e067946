//! Humanized pointer movement and edge-triggered key queries

use std::collections::HashMap;
use std::time::Duration;

use super::{InputBackend, InputError, MouseButton, VirtualKey};
use crate::clock::SharedClock;
use crate::stealth::{Humanizer, StealthConfig};

/// Split a displacement into `steps` sub-moves that add up to it exactly.
///
/// Uses running rounding so no pixel is lost or duplicated. `steps <= 1`
/// yields the whole displacement as a single move.
pub fn split_delta(delta_x: i32, delta_y: i32, steps: u32) -> Vec<(i32, i32)> {
    if steps <= 1 {
        return vec![(delta_x, delta_y)];
    }

    let at = |delta: i32, i: u32| (delta as f64 * i as f64 / steps as f64).round() as i32;

    (0..steps)
        .map(|i| {
            (
                at(delta_x, i + 1) - at(delta_x, i),
                at(delta_y, i + 1) - at(delta_y, i),
            )
        })
        .collect()
}

/// Input controller wrapping a platform backend
pub struct InputController<B> {
    backend: B,
    clock: SharedClock,
    humanizer: Humanizer,
    stealth: StealthConfig,
    /// Key states seen on the previous poll, for edge detection
    key_states: HashMap<VirtualKey, bool>,
    /// Set while pointer output keeps failing, so the failure is only warned once
    output_failing: bool,
    /// Same for key reads, tracked apart so one cannot mask the other
    key_read_failing: bool,
}

impl<B: InputBackend> InputController<B> {
    /// Create a controller with a clock-seeded humanizer
    pub fn new(backend: B, clock: SharedClock) -> Self {
        Self::with_humanizer(backend, clock, Humanizer::new())
    }

    /// Create a controller with an explicit random source
    pub fn with_humanizer(backend: B, clock: SharedClock, humanizer: Humanizer) -> Self {
        Self {
            backend,
            clock,
            humanizer,
            stealth: StealthConfig::default(),
            key_states: HashMap::new(),
            output_failing: false,
            key_read_failing: false,
        }
    }

    /// Replace the movement timing settings
    pub fn set_stealth(&mut self, stealth: StealthConfig) {
        self.stealth = stealth;
    }

    /// Movement timing settings
    pub fn stealth(&self) -> &StealthConfig {
        &self.stealth
    }

    /// Move the pointer by a jittered relative offset
    pub fn move_mouse(&mut self, delta_x: i32, delta_y: i32) {
        let (jitter_x, jitter_y) = self.humanizer.jitter();
        let result = self
            .backend
            .move_relative(delta_x + jitter_x, delta_y + jitter_y);
        self.report(result);
    }

    /// Move the pointer in `steps` jittered sub-moves with a short pause between them
    pub fn move_mouse_smooth(&mut self, delta_x: i32, delta_y: i32, steps: u32) {
        let step_delay = Duration::from_millis(self.stealth.step_delay_ms);

        for (i, (dx, dy)) in split_delta(delta_x, delta_y, steps).into_iter().enumerate() {
            if i > 0 {
                self.clock.sleep(step_delay);
            }
            self.move_mouse(dx, dy);
        }
    }

    /// Move the pointer to absolute coordinates
    pub fn move_to(&mut self, x: i32, y: i32) {
        let result = self.backend.move_absolute(x, y);
        self.report(result);
    }

    /// Press and release a button with a short hold
    pub fn click(&mut self, button: MouseButton) {
        let result = self.backend.press_button(button);
        let pressed = result.is_ok();
        self.report(result);
        if !pressed {
            return;
        }

        self.clock
            .sleep(Duration::from_millis(self.stealth.click_hold_ms));
        let result = self.backend.release_button(button);
        self.report(result);
    }

    /// Instantaneous key state; `false` when the backend cannot tell
    pub fn is_key_pressed(&mut self, key: VirtualKey) -> bool {
        match self.backend.key_state(key) {
            Ok(pressed) => {
                self.key_read_failing = false;
                pressed
            }
            Err(e) => {
                log_failure(&mut self.key_read_failing, "key read", &e);
                false
            }
        }
    }

    /// True only on the poll where `key` goes from released to pressed
    pub fn is_key_toggled(&mut self, key: VirtualKey) -> bool {
        let pressed = self.is_key_pressed(key);
        let was_pressed = self.key_states.insert(key, pressed).unwrap_or(false);
        pressed && !was_pressed
    }

    /// Key state recorded by the last `is_key_toggled` poll
    pub fn last_key_state(&self, key: VirtualKey) -> bool {
        self.key_states.get(&key).copied().unwrap_or(false)
    }

    /// Block for `base_ms` ± `variation_ms`, clamped at zero
    pub fn wait_random_delay(&mut self, base_ms: u64, variation_ms: u64) {
        let delay = self.humanizer.varied_delay(base_ms, variation_ms);
        self.clock.sleep(Duration::from_millis(delay));
    }

    /// The underlying backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The underlying backend, mutably
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Whether the last pointer output or key read failed
    pub fn is_backend_failing(&self) -> bool {
        self.output_failing || self.key_read_failing
    }

    fn report(&mut self, result: Result<(), InputError>) {
        match result {
            Ok(()) => self.output_failing = false,
            Err(e) => log_failure(&mut self.output_failing, "output", &e),
        }
    }
}

/// Warn on the first failure of a streak, then drop to debug
fn log_failure(failing: &mut bool, what: &str, error: &InputError) {
    if *failing {
        log::debug!("Input backend {} still failing: {}", what, error);
    } else {
        log::warn!("Input backend {} failed: {}", what, error);
        *failing = true;
    }
}
