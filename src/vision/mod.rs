//! Screen sensing and flash detection
//!
//! The engine never talks to a display server directly. It samples pixels
//! through the [`ScreenSensor`] capability, and [`FlashDetector`] decides
//! from those samples whether a shot was just fired.

pub mod capture;
pub mod detector;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

pub use capture::{FrameSensor, NullSensor};
pub use detector::{DetectorConfig, FlashDetector, DEFAULT_MATCH_THRESHOLD};

/// Rectangle of screen pixels, in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ScanRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A `width` x `height` region centred on a screen of the given size
    pub fn centered(screen_width: u32, screen_height: u32, width: u32, height: u32) -> Self {
        Self {
            x: (screen_width / 2).saturating_sub(width / 2),
            y: (screen_height / 2).saturating_sub(height / 2),
            width,
            height,
        }
    }

    /// Whether the region covers at least one pixel
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Number of pixels covered
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Screen pixel sampling capability
pub trait ScreenSensor {
    /// Capture the pixels inside `region`.
    ///
    /// Returns an error instead of panicking when capture is unavailable.
    fn sample_region(&mut self, region: &ScanRegion) -> Result<RgbaImage, VisionError>;
}

impl<S: ScreenSensor + ?Sized> ScreenSensor for Box<S> {
    fn sample_region(&mut self, region: &ScanRegion) -> Result<RgbaImage, VisionError> {
        (**self).sample_region(region)
    }
}

/// Vision system errors
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("Screen capture unavailable: {0}")]
    CaptureUnavailable(String),
    #[error("Invalid frame data")]
    InvalidFrameData,
    #[error("Region {0:?} lies outside the captured frame")]
    RegionOutOfBounds(ScanRegion),
}
