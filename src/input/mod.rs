//! Pointer output and key polling
//!
//! The platform side is reached only through [`InputBackend`];
//! [`InputController`] layers jitter, smoothing and edge detection on top.

pub mod controller;

use serde::{Deserialize, Serialize};

pub use controller::{split_delta, InputController};

/// Platform virtual key code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VirtualKey(pub u32);

impl VirtualKey {
    pub const F8: Self = Self(0x77);
    pub const F9: Self = Self(0x78);
}

impl std::fmt::Display for VirtualKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::F8 => write!(f, "F8"),
            Self::F9 => write!(f, "F9"),
            Self(code) => write!(f, "VK 0x{:02X}", code),
        }
    }
}

/// Mouse buttons that can be synthesized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer and keyboard capability provided by the platform
pub trait InputBackend {
    /// Move the pointer by a relative offset
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), InputError>;

    /// Move the pointer to absolute screen coordinates
    fn move_absolute(&mut self, x: i32, y: i32) -> Result<(), InputError>;

    /// Press a mouse button down
    fn press_button(&mut self, button: MouseButton) -> Result<(), InputError>;

    /// Release a mouse button
    fn release_button(&mut self, button: MouseButton) -> Result<(), InputError>;

    /// Instantaneous state of a key
    fn key_state(&mut self, key: VirtualKey) -> Result<bool, InputError>;
}

impl<B: InputBackend + ?Sized> InputBackend for Box<B> {
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), InputError> {
        (**self).move_relative(dx, dy)
    }

    fn move_absolute(&mut self, x: i32, y: i32) -> Result<(), InputError> {
        (**self).move_absolute(x, y)
    }

    fn press_button(&mut self, button: MouseButton) -> Result<(), InputError> {
        (**self).press_button(button)
    }

    fn release_button(&mut self, button: MouseButton) -> Result<(), InputError> {
        (**self).release_button(button)
    }

    fn key_state(&mut self, key: VirtualKey) -> Result<bool, InputError> {
        (**self).key_state(key)
    }
}

/// Input backend errors
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Input backend unavailable: {0}")]
    Unavailable(String),
    #[error("Input event rejected: {0}")]
    Rejected(String),
}
