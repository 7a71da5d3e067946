//! Recoil control loop
//!
//! [`RecoilControl`] owns the profiles, the flash detector and the input
//! controller, and advances them once per `update()` call. It never spawns
//! threads or timers: the host calls `update()` every tick, and the only
//! blocking it does is the short randomized pause after a correction.
//!
//! Hosts that touch settings from another thread must wrap the engine in
//! their own lock.

pub mod state;

use crate::clock::{elapsed_ms, SharedClock};
use crate::config::Settings;
use crate::input::{InputBackend, InputController, VirtualKey};
use crate::stealth::Humanizer;
use crate::vision::{DetectorConfig, FlashDetector, ScreenSensor};
use crate::weapons::{ProfileCollection, RecoilPoint, WeaponProfile};

pub use state::{ControlState, EngineStatus, TickOutcome};

/// Turn a recoil point into the pixel delta that cancels it.
///
/// Components are negated, scaled and truncated toward zero.
pub fn compensation(
    point: RecoilPoint,
    profile: &WeaponProfile,
    vertical_sensitivity: f32,
    horizontal_sensitivity: f32,
) -> (i32, i32) {
    let x = -point.x * horizontal_sensitivity * profile.horizontal_sway;
    let y = -point.y * vertical_sensitivity * profile.vertical_control;
    (x as i32, y as i32)
}

/// The recoil compensation engine
pub struct RecoilControl<S, B> {
    profiles: ProfileCollection,
    detector: FlashDetector<S>,
    input: InputController<B>,
    clock: SharedClock,
    vertical_sensitivity: f32,
    horizontal_sensitivity: f32,
    shot_delay_ms: u64,
    toggle_key: VirtualKey,
    state: ControlState,
}

impl<S: ScreenSensor, B: InputBackend> RecoilControl<S, B> {
    /// Create an engine with default settings
    pub fn new(sensor: S, backend: B, clock: SharedClock) -> Self {
        Self::from_settings(&Settings::default(), sensor, backend, clock)
    }

    /// Create an engine from settings, with a clock-seeded random source
    pub fn from_settings(settings: &Settings, sensor: S, backend: B, clock: SharedClock) -> Self {
        Self::with_humanizer(settings, sensor, backend, clock, Humanizer::new())
    }

    /// Create an engine with an explicit random source.
    ///
    /// Detector settings that fail validation are replaced by the defaults.
    pub fn with_humanizer(
        settings: &Settings,
        sensor: S,
        backend: B,
        clock: SharedClock,
        humanizer: Humanizer,
    ) -> Self {
        let mut profiles = ProfileCollection::new();
        for profile in &settings.custom_profiles {
            profiles.add_custom_profile(profile.clone());
        }
        profiles.set_current_profile(settings.active_profile);

        let detector_config = match settings.validate() {
            Ok(()) => settings.detector.clone(),
            Err(e) => {
                log::warn!("{}; using default detector settings", e);
                DetectorConfig::default()
            }
        };
        let detector = FlashDetector::new(sensor, detector_config, clock.clone());

        let mut input = InputController::with_humanizer(backend, clock.clone(), humanizer);
        input.set_stealth(settings.stealth.clone());

        Self {
            profiles,
            detector,
            input,
            clock,
            vertical_sensitivity: settings.vertical_sensitivity,
            horizontal_sensitivity: settings.horizontal_sensitivity,
            shot_delay_ms: settings.shot_delay_ms,
            toggle_key: settings.toggle_key,
            state: ControlState::default(),
        }
    }

    /// Snapshot the live configuration back into settings
    pub fn settings(&self) -> Settings {
        Settings {
            vertical_sensitivity: self.vertical_sensitivity,
            horizontal_sensitivity: self.horizontal_sensitivity,
            shot_delay_ms: self.shot_delay_ms,
            toggle_key: self.toggle_key,
            detector: self.detector.config().clone(),
            stealth: self.input.stealth().clone(),
            active_profile: self.profiles.current_index(),
            custom_profiles: self.profiles.custom_profiles().to_vec(),
        }
    }

    /// Start compensating from the first pattern point
    pub fn start(&mut self) {
        if !self.state.active {
            self.state.active = true;
            self.reset_pattern();
            log::info!(
                "Recoil control started ({})",
                self.profiles.current_profile().name
            );
        }
    }

    /// Stop compensating
    pub fn stop(&mut self) {
        if self.state.active {
            self.state.active = false;
            self.reset_pattern();
            log::info!("Recoil control stopped");
        }
    }

    /// Flip between started and stopped
    pub fn toggle(&mut self) {
        if self.state.active {
            self.stop();
        } else {
            self.start();
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Run one control tick
    pub fn update(&mut self) -> TickOutcome {
        // The toggle key is polled even while stopped
        if self.input.is_key_toggled(self.toggle_key) {
            self.toggle();
        }
        self.state.last_toggle_key_pressed = self.input.last_key_state(self.toggle_key);

        if !self.state.active {
            return TickOutcome::Inactive;
        }

        if self.detector.should_reset_pattern() && self.state.pattern_index > 0 {
            log::debug!(
                "Trigger idle, restarting pattern at shot 0 (was {})",
                self.state.pattern_index
            );
            self.state.pattern_index = 0;
        }

        if !self.detector.detect_flash() {
            return TickOutcome::Idle;
        }

        self.process_shot()
    }

    fn process_shot(&mut self) -> TickOutcome {
        let index = self.state.pattern_index;
        let profile = self.profiles.current_profile();
        let Some(point) = profile.point(index) else {
            return TickOutcome::Exhausted;
        };

        let now = self.clock.now();
        if let Some(last_shot) = self.state.last_shot_time {
            let elapsed = elapsed_ms(last_shot, now);
            if elapsed < self.shot_delay_ms {
                log::debug!(
                    "Flash {} ms after last correction, below {} ms gate",
                    elapsed,
                    self.shot_delay_ms
                );
                return TickOutcome::Gated {
                    elapsed_ms: elapsed,
                };
            }
        }

        let (delta_x, delta_y) = compensation(
            point,
            profile,
            self.vertical_sensitivity,
            self.horizontal_sensitivity,
        );
        log::debug!(
            "Shot {} of '{}': compensating ({}, {})",
            index + 1,
            profile.name,
            delta_x,
            delta_y
        );

        let stealth = self.input.stealth().clone();
        self.input
            .move_mouse_smooth(delta_x, delta_y, stealth.smoothing_steps);

        self.state.pattern_index += 1;
        self.state.last_shot_time = Some(now);
        self.state.corrections_applied += 1;

        self.input.wait_random_delay(
            stealth.correction_delay_ms,
            stealth.correction_delay_variation_ms,
        );

        TickOutcome::Corrected {
            index,
            delta_x,
            delta_y,
        }
    }

    fn reset_pattern(&mut self) {
        self.state.reset_pattern();
        self.detector.reset_timer();
    }

    pub fn vertical_sensitivity(&self) -> f32 {
        self.vertical_sensitivity
    }

    pub fn set_vertical_sensitivity(&mut self, sensitivity: f32) {
        self.vertical_sensitivity = sensitivity;
    }

    pub fn horizontal_sensitivity(&self) -> f32 {
        self.horizontal_sensitivity
    }

    pub fn set_horizontal_sensitivity(&mut self, sensitivity: f32) {
        self.horizontal_sensitivity = sensitivity;
    }

    /// Minimum time between two corrections (ms)
    pub fn shot_delay_ms(&self) -> u64 {
        self.shot_delay_ms
    }

    pub fn set_shot_delay_ms(&mut self, delay_ms: u64) {
        self.shot_delay_ms = delay_ms;
    }

    pub fn toggle_key(&self) -> VirtualKey {
        self.toggle_key
    }

    pub fn set_toggle_key(&mut self, key: VirtualKey) {
        self.toggle_key = key;
    }

    pub fn profiles(&self) -> &ProfileCollection {
        &self.profiles
    }

    pub fn profiles_mut(&mut self) -> &mut ProfileCollection {
        &mut self.profiles
    }

    pub fn detector(&self) -> &FlashDetector<S> {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut FlashDetector<S> {
        &mut self.detector
    }

    pub fn input(&self) -> &InputController<B> {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputController<B> {
        &mut self.input
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    pub fn pattern_index(&self) -> usize {
        self.state.pattern_index
    }

    /// "Active" or "Inactive"
    pub fn status_text(&self) -> &'static str {
        if self.state.active {
            "Active"
        } else {
            "Inactive"
        }
    }

    /// Snapshot of the engine for display
    pub fn status(&self) -> EngineStatus {
        let profile = self.profiles.current_profile();
        EngineStatus {
            active: self.state.active,
            status_text: self.status_text().to_string(),
            profile_name: profile.name.clone(),
            profile_index: self.profiles.current_index(),
            pattern_index: self.state.pattern_index,
            pattern_len: profile.len(),
            corrections_applied: self.state.corrections_applied,
            vertical_sensitivity: self.vertical_sensitivity,
            horizontal_sensitivity: self.horizontal_sensitivity,
            shot_delay_ms: self.shot_delay_ms,
            detector: self.detector.status_text(),
            capture_available: !self.detector.is_capture_failing(),
            input_available: !self.input.is_backend_failing(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::platform::{NullBackend, RecordingBackend};
    use crate::vision::{FrameSensor, NullSensor, ScanRegion};
    use image::{Rgba, RgbaImage};

    type TestEngine = RecoilControl<FrameSensor, RecordingBackend>;

    fn test_settings() -> Settings {
        let mut settings = Settings::default();
        settings.detector.region = ScanRegion::new(0, 0, 10, 10);
        settings
    }

    fn engine(clock: &ManualClock) -> TestEngine {
        RecoilControl::with_humanizer(
            &test_settings(),
            FrameSensor::new(),
            RecordingBackend::new(),
            clock.shared(),
            Humanizer::with_seed(99),
        )
    }

    fn show_flash(engine: &mut TestEngine, lit: bool) {
        let pixel = if lit {
            Rgba([240, 240, 240, 255])
        } else {
            Rgba([0, 0, 0, 255])
        };
        engine
            .detector_mut()
            .sensor_mut()
            .push_image(RgbaImage::from_pixel(10, 10, pixel));
    }

    #[test]
    fn test_compensation_negates_and_scales() {
        let profile = WeaponProfile::new("Test", Vec::new(), 1.2, 0.8, 90);

        assert_eq!(
            compensation(RecoilPoint::new(2.0, 15.0), &profile, 1.0, 1.0),
            (-1, -18)
        );
        assert_eq!(
            compensation(RecoilPoint::new(-3.0, 10.0), &profile, 0.5, 2.0),
            (4, -6)
        );
    }

    #[test]
    fn test_starts_inactive_and_toggles() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        assert!(!engine.is_active());
        assert_eq!(engine.status_text(), "Inactive");

        engine.toggle();
        assert!(engine.is_active());
        assert_eq!(engine.status_text(), "Active");

        engine.toggle();
        assert!(!engine.is_active());
    }

    #[test]
    fn test_toggle_key_rising_edge_drives_state() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        let key = engine.toggle_key();

        engine.input_mut().backend_mut().set_key(key, true);
        assert_eq!(engine.update(), TickOutcome::Idle);
        assert!(engine.is_active());
        assert!(engine.state().last_toggle_key_pressed);

        // Held key does not toggle again
        engine.update();
        assert!(engine.is_active());

        engine.input_mut().backend_mut().set_key(key, false);
        engine.update();
        engine.input_mut().backend_mut().set_key(key, true);
        assert_eq!(engine.update(), TickOutcome::Inactive);
        assert!(!engine.is_active());
    }

    #[test]
    fn test_inactive_engine_ignores_flashes() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        show_flash(&mut engine, true);

        assert_eq!(engine.update(), TickOutcome::Inactive);
        assert!(engine.input().backend().events().is_empty());
    }

    #[test]
    fn test_correction_moves_pointer() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.start();
        show_flash(&mut engine, true);

        let outcome = engine.update();
        // Assault rifle first point (0, 14) with vertical control 1.2
        assert_eq!(
            outcome,
            TickOutcome::Corrected {
                index: 0,
                delta_x: 0,
                delta_y: -16
            }
        );
        assert_eq!(engine.pattern_index(), 1);

        let moves = engine.input().backend().relative_moves();
        assert_eq!(moves.len(), 3);
        let (x, y) = engine.input().backend().total_displacement();
        assert!(x.abs() <= 3);
        assert!((-19..=-13).contains(&y));
    }

    #[test]
    fn test_gate_blocks_rapid_flashes() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.start();
        show_flash(&mut engine, true);

        assert!(engine.update().is_correction());
        clock.set_ms(40);
        assert!(matches!(engine.update(), TickOutcome::Gated { .. }));
        assert_eq!(engine.pattern_index(), 1);

        clock.set_ms(100);
        assert!(engine.update().is_correction());
        assert_eq!(engine.pattern_index(), 2);
    }

    #[test]
    fn test_idle_timeout_restarts_pattern() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.start();

        show_flash(&mut engine, true);
        engine.update();
        clock.advance_ms(200);
        engine.update();
        assert_eq!(engine.pattern_index(), 2);

        show_flash(&mut engine, false);
        clock.advance_ms(3000);
        assert_eq!(engine.update(), TickOutcome::Idle);
        assert_eq!(engine.pattern_index(), 0);
        assert!(engine.is_active());
    }

    #[test]
    fn test_exhausted_pattern_stops_corrections() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine
            .profiles_mut()
            .add_custom_pattern("One", vec![RecoilPoint::new(0.0, 10.0)]);
        engine.profiles_mut().set_current_profile(3);
        engine.start();
        show_flash(&mut engine, true);

        assert!(engine.update().is_correction());
        for _ in 0..5 {
            clock.advance_ms(150);
            assert_eq!(engine.update(), TickOutcome::Exhausted);
        }
        assert_eq!(engine.input().backend().relative_moves().len(), 3);
    }

    #[test]
    fn test_empty_pattern_is_nothing_to_do() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.profiles_mut().add_custom_pattern("Empty", Vec::new());
        engine.profiles_mut().set_current_profile(3);
        engine.start();
        show_flash(&mut engine, true);

        assert_eq!(engine.update(), TickOutcome::Exhausted);
        assert!(engine.input().backend().events().is_empty());
    }

    #[test]
    fn test_reactivation_restarts_pattern() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.start();
        show_flash(&mut engine, true);

        engine.update();
        clock.advance_ms(150);
        engine.update();
        assert_eq!(engine.pattern_index(), 2);

        engine.stop();
        engine.start();
        assert_eq!(engine.pattern_index(), 0);
        // The gate does not carry over a reset
        assert!(engine.update().is_correction());
    }

    #[test]
    fn test_degraded_capabilities_never_halt() {
        let clock = ManualClock::new();
        let mut engine = RecoilControl::new(NullSensor, NullBackend, clock.shared());
        engine.start();

        for _ in 0..10 {
            clock.advance_ms(16);
            assert_eq!(engine.update(), TickOutcome::Idle);
        }
        assert!(engine.is_active());

        let status = engine.status();
        assert!(!status.capture_available);
        assert!(!status.input_available);
    }

    #[test]
    fn test_invalid_detector_settings_fall_back_to_defaults() {
        let clock = ManualClock::new();
        let mut settings = test_settings();
        settings.detector.match_threshold = 0.0;
        settings.shot_delay_ms = 70;

        let mut engine = RecoilControl::with_humanizer(
            &settings,
            FrameSensor::new(),
            RecordingBackend::new(),
            clock.shared(),
            Humanizer::with_seed(99),
        );
        assert_eq!(engine.detector().config(), &DetectorConfig::default());
        assert_eq!(engine.shot_delay_ms(), 70);

        // A zero threshold would have counted this dark frame as a flash
        engine
            .detector_mut()
            .sensor_mut()
            .push_image(RgbaImage::from_pixel(1920, 1080, Rgba([0, 0, 0, 255])));
        engine.start();
        assert_eq!(engine.update(), TickOutcome::Idle);
        assert!(engine.input().backend().relative_moves().is_empty());
    }

    #[test]
    fn test_settings_snapshot() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.set_vertical_sensitivity(0.6);
        engine.set_horizontal_sensitivity(1.4);
        engine.set_shot_delay_ms(120);
        engine
            .profiles_mut()
            .add_custom_pattern("Custom", vec![RecoilPoint::new(1.0, 1.0)]);
        engine.profiles_mut().set_current_profile(1);
        engine.detector_mut().update_flash_color([255, 200, 0]);

        let settings = engine.settings();
        assert_eq!(settings.vertical_sensitivity, 0.6);
        assert_eq!(settings.horizontal_sensitivity, 1.4);
        assert_eq!(settings.shot_delay_ms, 120);
        assert_eq!(settings.active_profile, 1);
        assert_eq!(settings.custom_profiles.len(), 1);
        assert_eq!(settings.detector.reference_color, [255, 200, 0]);

        let rebuilt = RecoilControl::from_settings(
            &settings,
            NullSensor,
            NullBackend,
            clock.shared(),
        );
        assert_eq!(rebuilt.profiles().len(), 4);
        assert_eq!(rebuilt.profiles().current_index(), 1);
        assert_eq!(rebuilt.shot_delay_ms(), 120);
    }

    #[test]
    fn test_status_snapshot() {
        let clock = ManualClock::new();
        let mut engine = engine(&clock);
        engine.start();
        show_flash(&mut engine, true);
        engine.update();

        let status = engine.status();
        assert!(status.active);
        assert_eq!(status.profile_name, "Assault Rifle");
        assert_eq!(status.pattern_index, 1);
        assert_eq!(status.pattern_len, 15);
        assert_eq!(status.corrections_applied, 1);
        assert!(status.capture_available);

        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"status_text\":\"Active\""));
    }
}
