//! Demo-mode backends
//!
//! Let the engine run end to end without a display or input device: the
//! sensor produces a flash every few seconds and the backend holds the
//! toggle key for alternating periods, logging every move it receives.

use std::time::Duration;

use image::{Rgba, RgbaImage};

use crate::clock::SharedClock;
use crate::input::{InputBackend, InputError, MouseButton, VirtualKey};
use crate::vision::{ScanRegion, ScreenSensor, VisionError};

/// Default time between simulated flashes
pub const FLASH_PERIOD: Duration = Duration::from_secs(5);

/// Default time the simulated toggle key stays in each state
pub const TOGGLE_PERIOD: Duration = Duration::from_secs(10);

/// Sensor that shows a flash once per period
pub struct SimulatedSensor {
    clock: SharedClock,
    period: Duration,
    flash_color: [u8; 3],
    last_flash: Duration,
}

impl SimulatedSensor {
    pub fn new(clock: SharedClock, flash_color: [u8; 3]) -> Self {
        let last_flash = clock.now();
        Self {
            clock,
            period: FLASH_PERIOD,
            flash_color,
            last_flash,
        }
    }

    /// Change the flash period
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }
}

impl ScreenSensor for SimulatedSensor {
    fn sample_region(&mut self, region: &ScanRegion) -> Result<RgbaImage, VisionError> {
        let now = self.clock.now();
        let pixel = if now.saturating_sub(self.last_flash) >= self.period {
            self.last_flash = now;
            log::info!("Simulated muzzle flash at {:?}", now);
            let [r, g, b] = self.flash_color;
            Rgba([r, g, b, 255])
        } else {
            Rgba([16, 16, 16, 255])
        };

        Ok(RgbaImage::from_pixel(region.width, region.height, pixel))
    }
}

/// Backend that logs output and holds one key for alternating periods
pub struct SimulatedBackend {
    clock: SharedClock,
    toggle_key: VirtualKey,
    period: Duration,
    moves: u64,
    displacement: (i64, i64),
}

impl SimulatedBackend {
    pub fn new(clock: SharedClock, toggle_key: VirtualKey) -> Self {
        Self {
            clock,
            toggle_key,
            period: TOGGLE_PERIOD,
            moves: 0,
            displacement: (0, 0),
        }
    }

    /// Change how long the key stays in each state
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Number of relative moves received
    pub fn move_count(&self) -> u64 {
        self.moves
    }

    /// Sum of all relative moves received
    pub fn displacement(&self) -> (i64, i64) {
        self.displacement
    }
}

impl InputBackend for SimulatedBackend {
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), InputError> {
        log::info!("Mouse move: dx={}, dy={}", dx, dy);
        self.moves += 1;
        self.displacement.0 += dx as i64;
        self.displacement.1 += dy as i64;
        Ok(())
    }

    fn move_absolute(&mut self, x: i32, y: i32) -> Result<(), InputError> {
        log::info!("Mouse move to: x={}, y={}", x, y);
        Ok(())
    }

    fn press_button(&mut self, button: MouseButton) -> Result<(), InputError> {
        log::info!("Mouse press: {:?}", button);
        Ok(())
    }

    fn release_button(&mut self, button: MouseButton) -> Result<(), InputError> {
        log::info!("Mouse release: {:?}", button);
        Ok(())
    }

    fn key_state(&mut self, key: VirtualKey) -> Result<bool, InputError> {
        let period = self.period.as_micros();
        if key != self.toggle_key || period == 0 {
            return Ok(false);
        }
        let phase = self.clock.now().as_micros() / period;
        Ok(phase % 2 == 1)
    }
}
