//! In-memory input backend
//!
//! Records every emitted event and answers key queries from states set by
//! the caller.

use std::collections::HashMap;

use crate::input::{InputBackend, InputError, MouseButton, VirtualKey};

/// An event received by [`RecordingBackend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedEvent {
    Move(i32, i32),
    MoveTo(i32, i32),
    Press(MouseButton),
    Release(MouseButton),
}

/// Backend that records output and replays scripted key states
#[derive(Debug, Default)]
pub struct RecordingBackend {
    events: Vec<RecordedEvent>,
    keys: HashMap<VirtualKey, bool>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the state reported for a key
    pub fn set_key(&mut self, key: VirtualKey, pressed: bool) {
        self.keys.insert(key, pressed);
    }

    /// Everything received so far, in order
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Relative moves only
    pub fn relative_moves(&self) -> Vec<(i32, i32)> {
        self.events
            .iter()
            .filter_map(|event| match *event {
                RecordedEvent::Move(dx, dy) => Some((dx, dy)),
                _ => None,
            })
            .collect()
    }

    /// Sum of all relative moves
    pub fn total_displacement(&self) -> (i32, i32) {
        self.relative_moves()
            .into_iter()
            .fold((0, 0), |(ax, ay), (dx, dy)| (ax + dx, ay + dy))
    }

    /// Forget recorded events (key states are kept)
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl InputBackend for RecordingBackend {
    fn move_relative(&mut self, dx: i32, dy: i32) -> Result<(), InputError> {
        self.events.push(RecordedEvent::Move(dx, dy));
        Ok(())
    }

    fn move_absolute(&mut self, x: i32, y: i32) -> Result<(), InputError> {
        self.events.push(RecordedEvent::MoveTo(x, y));
        Ok(())
    }

    fn press_button(&mut self, button: MouseButton) -> Result<(), InputError> {
        self.events.push(RecordedEvent::Press(button));
        Ok(())
    }

    fn release_button(&mut self, button: MouseButton) -> Result<(), InputError> {
        self.events.push(RecordedEvent::Release(button));
        Ok(())
    }

    fn key_state(&mut self, key: VirtualKey) -> Result<bool, InputError> {
        Ok(self.keys.get(&key).copied().unwrap_or(false))
    }
}
