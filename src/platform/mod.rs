//! Capability implementations that need no OS access
//!
//! Real screen capture and input injection belong to the host. This module
//! only carries the stand-ins the engine ships with:
//! - [`NullBackend`] for hosts without an input backend
//! - [`RecordingBackend`] for embedding and tests
//! - [`simulated`] demo backends driven by the clock

pub mod recording;
pub mod simulated;

pub use recording::{RecordedEvent, RecordingBackend};
pub use simulated::{SimulatedBackend, SimulatedSensor};

use crate::input::{InputBackend, InputError, MouseButton, VirtualKey};

/// Input backend for environments with no input capability
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl NullBackend {
    fn unavailable() -> InputError {
        InputError::Unavailable("no input backend".to_string())
    }
}

impl InputBackend for NullBackend {
    fn move_relative(&mut self, _dx: i32, _dy: i32) -> Result<(), InputError> {
        Err(Self::unavailable())
    }

    fn move_absolute(&mut self, _x: i32, _y: i32) -> Result<(), InputError> {
        Err(Self::unavailable())
    }

    fn press_button(&mut self, _button: MouseButton) -> Result<(), InputError> {
        Err(Self::unavailable())
    }

    fn release_button(&mut self, _button: MouseButton) -> Result<(), InputError> {
        Err(Self::unavailable())
    }

    fn key_state(&mut self, _key: VirtualKey) -> Result<bool, InputError> {
        Err(Self::unavailable())
    }
}
