//! RCS - reactive recoil compensation
//!
//! This library watches a small screen region for a muzzle flash and, on
//! each detected shot, moves the pointer against the active weapon's recoil
//! pattern. Host applications drive it by calling
//! [`RecoilControl::update`] once per tick.
//!
//! ## Capabilities
//!
//! Screen capture and input injection are not implemented here. The engine
//! reaches them through [`vision::ScreenSensor`] and [`input::InputBackend`],
//! which the host implements for its platform. When either is missing the
//! engine stays inert rather than failing.
//!
//! ## Anti-Detection
//!
//! The `stealth` module jitters every pointer delta, splits corrections
//! into sub-moves and randomizes the pause after each correction.

pub mod clock;
pub mod config;
pub mod control;
pub mod input;
pub mod platform;
pub mod stealth;
pub mod vision;
pub mod weapons;

pub use clock::{Clock, ManualClock, MonotonicClock, SharedClock};
pub use config::{ConfigError, Settings};
pub use control::{EngineStatus, RecoilControl, TickOutcome};
pub use input::{InputBackend, InputController, MouseButton, VirtualKey};
pub use vision::{DetectorConfig, FlashDetector, ScanRegion, ScreenSensor};
pub use weapons::{ProfileCollection, RecoilPoint, WeaponProfile};
