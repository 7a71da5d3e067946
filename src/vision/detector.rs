//! Muzzle-flash detection
//!
//! Polls a small screen region and reports a flash when enough of its
//! pixels sit close to the reference colour. A percentage threshold keeps
//! one antialiased edge pixel from firing compensation.

use std::time::Duration;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use super::{ScanRegion, ScreenSensor};
use crate::clock::{elapsed_ms, SharedClock};

/// Fraction of sampled pixels that must match for a flash
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.25;

/// Default scan region edge length in pixels
const DEFAULT_REGION_SIZE: u32 = 10;

/// Detector settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Region polled for the flash
    pub region: ScanRegion,
    /// Flash colour as RGB
    pub reference_color: [u8; 3],
    /// Per-channel absolute difference still counted as a match
    pub tolerance: u8,
    /// Trigger inactivity after which the pattern restarts (ms)
    pub reset_timeout_ms: u64,
    /// Fraction of matching pixels needed, in (0, 1]
    pub match_threshold: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::centered(1920, 1080)
    }
}

impl DetectorConfig {
    /// Default settings with the scan region centred on a screen of this size
    pub fn centered(screen_width: u32, screen_height: u32) -> Self {
        Self {
            region: ScanRegion::centered(
                screen_width,
                screen_height,
                DEFAULT_REGION_SIZE,
                DEFAULT_REGION_SIZE,
            ),
            reference_color: [240, 240, 240],
            tolerance: 20,
            reset_timeout_ms: 3000,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

/// Flash detector over a [`ScreenSensor`]
pub struct FlashDetector<S> {
    sensor: S,
    config: DetectorConfig,
    clock: SharedClock,
    /// Time of the last confirmed flash
    last_trigger: Duration,
    /// Set while the sensor keeps failing, so the failure is only warned once
    capture_failing: bool,
}

impl<S: ScreenSensor> FlashDetector<S> {
    /// Create a detector; the reset timer starts now
    pub fn new(sensor: S, config: DetectorConfig, clock: SharedClock) -> Self {
        let last_trigger = clock.now();
        Self {
            sensor,
            config,
            clock,
            last_trigger,
            capture_failing: false,
        }
    }

    /// Sample the region and report whether a flash is visible.
    ///
    /// Returns `false` whenever the sensor cannot capture.
    pub fn detect_flash(&mut self) -> bool {
        let region = match self.sensor.sample_region(&self.config.region) {
            Ok(region) => {
                if self.capture_failing {
                    log::info!("Screen capture recovered");
                    self.capture_failing = false;
                }
                region
            }
            Err(e) => {
                if self.capture_failing {
                    log::debug!("Screen capture still failing: {}", e);
                } else {
                    log::warn!("Screen capture failed, detection disabled: {}", e);
                    self.capture_failing = true;
                }
                return false;
            }
        };

        let flash = self.region_has_flash(&region);
        if flash {
            self.last_trigger = self.clock.now();
        }
        flash
    }

    fn region_has_flash(&self, region: &RgbaImage) -> bool {
        let total = region.width() as u64 * region.height() as u64;
        if total == 0 {
            return false;
        }

        let matching = region
            .pixels()
            .filter(|pixel| {
                color_matches(pixel, self.config.reference_color, self.config.tolerance)
            })
            .count() as u64;

        matching as f64 >= total as f64 * self.config.match_threshold as f64
    }

    /// Whether the trigger has been quiet for at least the reset timeout
    pub fn should_reset_pattern(&self) -> bool {
        elapsed_ms(self.last_trigger, self.clock.now()) >= self.config.reset_timeout_ms
    }

    /// Restart the inactivity timer from now
    pub fn reset_timer(&mut self) {
        self.last_trigger = self.clock.now();
    }

    /// Replace the scan region. Empty regions are ignored.
    pub fn set_scan_region(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let region = ScanRegion::new(x, y, width, height);
        if !region.is_valid() {
            log::warn!("Ignoring empty scan region {}x{}", width, height);
            return;
        }
        self.config.region = region;
    }

    /// Change the flash colour
    pub fn update_flash_color(&mut self, color: [u8; 3]) {
        self.config.reference_color = color;
    }

    /// Change the colour tolerance
    pub fn set_tolerance(&mut self, tolerance: u8) {
        self.config.tolerance = tolerance;
    }

    /// Change the reset timeout
    pub fn set_reset_timeout(&mut self, timeout_ms: u64) {
        self.config.reset_timeout_ms = timeout_ms;
    }

    /// Change the match threshold. Values outside (0, 1] are ignored.
    pub fn set_match_threshold(&mut self, threshold: f32) {
        if threshold > 0.0 && threshold <= 1.0 {
            self.config.match_threshold = threshold;
        } else {
            log::warn!("Ignoring match threshold {}", threshold);
        }
    }

    /// Current settings
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Whether the last sample attempt failed
    pub fn is_capture_failing(&self) -> bool {
        self.capture_failing
    }

    /// The underlying sensor
    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// The underlying sensor, mutably (hosts push frames through this)
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    /// Human-readable summary of the detector settings
    pub fn status_text(&self) -> String {
        let c = &self.config;
        let [r, g, b] = c.reference_color;
        format!(
            "Scan region {}x{} at ({}, {}) | Flash color RGB({}, {}, {}) ±{} | \
             Match {:.0}% | Auto-reset {} ms{}",
            c.region.width,
            c.region.height,
            c.region.x,
            c.region.y,
            r,
            g,
            b,
            c.tolerance,
            c.match_threshold * 100.0,
            c.reset_timeout_ms,
            if self.capture_failing {
                " | capture unavailable"
            } else {
                ""
            }
        )
    }
}

/// Check if a pixel matches a colour within tolerance on every channel
fn color_matches(pixel: &Rgba<u8>, reference: [u8; 3], tolerance: u8) -> bool {
    pixel.0[..3]
        .iter()
        .zip(reference)
        .all(|(&channel, target)| channel.abs_diff(target) <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::vision::{FrameSensor, NullSensor};

    const FLASH: Rgba<u8> = Rgba([240, 240, 240, 255]);
    const DARK: Rgba<u8> = Rgba([20, 20, 20, 255]);

    fn small_config() -> DetectorConfig {
        DetectorConfig {
            region: ScanRegion::new(0, 0, 10, 10),
            ..DetectorConfig::default()
        }
    }

    /// 10x10 frame with the first `lit` pixels (row-major) set to the flash colour
    fn frame_with_lit_pixels(lit: u32) -> RgbaImage {
        RgbaImage::from_fn(10, 10, |x, y| if y * 10 + x < lit { FLASH } else { DARK })
    }

    fn detector_with_frame(frame: RgbaImage, clock: &ManualClock) -> FlashDetector<FrameSensor> {
        let mut sensor = FrameSensor::new();
        sensor.push_image(frame);
        FlashDetector::new(sensor, small_config(), clock.shared())
    }

    #[test]
    fn test_color_matching() {
        assert!(color_matches(&Rgba([100, 100, 100, 255]), [105, 95, 100], 10));
        assert!(!color_matches(&Rgba([100, 100, 100, 255]), [105, 95, 100], 3));
        assert!(color_matches(&Rgba([0, 255, 0, 0]), [0, 255, 0], 0));
    }

    #[test]
    fn test_default_region_is_centered() {
        let config = DetectorConfig::default();
        assert_eq!(config.region, ScanRegion::new(955, 535, 10, 10));
        assert_eq!(config.match_threshold, DEFAULT_MATCH_THRESHOLD);
    }

    #[test]
    fn test_threshold_boundary() {
        let clock = ManualClock::new();

        let mut detector = detector_with_frame(frame_with_lit_pixels(24), &clock);
        assert!(!detector.detect_flash());

        let mut detector = detector_with_frame(frame_with_lit_pixels(25), &clock);
        assert!(detector.detect_flash());
    }

    #[test]
    fn test_single_pixel_does_not_fire() {
        let clock = ManualClock::new();
        let mut detector = detector_with_frame(frame_with_lit_pixels(1), &clock);
        assert!(!detector.detect_flash());
    }

    #[test]
    fn test_configurable_threshold() {
        let clock = ManualClock::new();
        let mut detector = detector_with_frame(frame_with_lit_pixels(30), &clock);

        detector.set_match_threshold(0.5);
        assert!(!detector.detect_flash());

        detector.set_match_threshold(0.0);
        assert_eq!(detector.config().match_threshold, 0.5);
    }

    #[test]
    fn test_flash_stamps_trigger_time() {
        let clock = ManualClock::new();
        let mut detector = detector_with_frame(frame_with_lit_pixels(100), &clock);

        clock.advance_ms(2900);
        assert!(detector.detect_flash());

        clock.advance_ms(2900);
        assert!(!detector.should_reset_pattern());
        clock.advance_ms(100);
        assert!(detector.should_reset_pattern());
    }

    #[test]
    fn test_reset_timer_and_timeout() {
        let clock = ManualClock::new();
        let mut detector = FlashDetector::new(NullSensor, small_config(), clock.shared());

        clock.advance_ms(5000);
        detector.reset_timer();
        assert!(!detector.should_reset_pattern());

        clock.advance_ms(2999);
        assert!(!detector.should_reset_pattern());
        clock.advance_ms(1);
        assert!(detector.should_reset_pattern());
        // Pure query
        assert!(detector.should_reset_pattern());
    }

    #[test]
    fn test_unavailable_sensor_degrades_to_false() {
        let clock = ManualClock::new();
        let mut detector = FlashDetector::new(NullSensor, small_config(), clock.shared());

        for _ in 0..3 {
            assert!(!detector.detect_flash());
        }
        assert!(detector.is_capture_failing());
        assert!(detector.status_text().contains("capture unavailable"));
    }

    #[test]
    fn test_capture_recovers() {
        let clock = ManualClock::new();
        let mut detector = FlashDetector::new(FrameSensor::new(), small_config(), clock.shared());

        assert!(!detector.detect_flash());
        assert!(detector.is_capture_failing());

        detector.sensor_mut().push_image(frame_with_lit_pixels(100));
        assert!(detector.detect_flash());
        assert!(!detector.is_capture_failing());
    }

    #[test]
    fn test_set_scan_region() {
        let clock = ManualClock::new();
        let mut sensor = FrameSensor::new();
        let mut frame = RgbaImage::from_pixel(40, 40, DARK);
        for y in 20..30 {
            for x in 20..30 {
                frame.put_pixel(x, y, FLASH);
            }
        }
        sensor.push_image(frame);
        let mut detector = FlashDetector::new(sensor, small_config(), clock.shared());

        assert!(!detector.detect_flash());
        detector.set_scan_region(20, 20, 10, 10);
        assert!(detector.detect_flash());

        detector.set_scan_region(0, 0, 0, 10);
        assert_eq!(detector.config().region, ScanRegion::new(20, 20, 10, 10));
    }

    #[test]
    fn test_update_flash_color() {
        let clock = ManualClock::new();
        let red = Rgba([220, 30, 30, 255]);
        let mut detector = detector_with_frame(RgbaImage::from_pixel(10, 10, red), &clock);

        assert!(!detector.detect_flash());
        detector.update_flash_color([220, 30, 30]);
        assert!(detector.detect_flash());
        assert!(detector.status_text().contains("RGB(220, 30, 30)"));
    }
}
