//! Frame-buffer screen sensors
//!
//! [`FrameSensor`] serves regions out of the latest frame a host pushed in
//! (from whatever capture API it owns). [`NullSensor`] stands in when no
//! capture is available at all.

use image::{ImageBuffer, RgbaImage};

use super::{ScanRegion, ScreenSensor, VisionError};

/// Sensor backed by host-supplied RGBA frames
pub struct FrameSensor {
    /// Current frame as RGBA image
    current_frame: Option<RgbaImage>,
    /// Frame counter
    frame_count: u64,
}

impl FrameSensor {
    /// Create a sensor with no frame yet
    pub fn new() -> Self {
        Self {
            current_frame: None,
            frame_count: 0,
        }
    }

    /// Replace the current frame with raw RGBA bytes
    pub fn update(
        &mut self,
        frame_data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<(), VisionError> {
        let expected_size = width as usize * height as usize * 4;
        if frame_data.len() != expected_size {
            return Err(VisionError::InvalidFrameData);
        }

        let image: RgbaImage = ImageBuffer::from_raw(width, height, frame_data.to_vec())
            .ok_or(VisionError::InvalidFrameData)?;

        self.push_image(image);
        Ok(())
    }

    /// Replace the current frame with an already decoded image
    pub fn push_image(&mut self, image: RgbaImage) {
        self.current_frame = Some(image);
        self.frame_count += 1;
    }

    /// Drop the current frame, as if capture stopped
    pub fn clear(&mut self) {
        self.current_frame = None;
    }

    /// Check if we have a valid frame
    pub fn has_frame(&self) -> bool {
        self.current_frame.is_some()
    }

    /// Frame dimensions, `(0, 0)` without a frame
    pub fn dimensions(&self) -> (u32, u32) {
        self.current_frame
            .as_ref()
            .map_or((0, 0), |frame| frame.dimensions())
    }

    /// Number of frames received
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Extract a region of the current frame
    pub fn extract_region(&self, region: &ScanRegion) -> Result<RgbaImage, VisionError> {
        let frame = self.current_frame.as_ref().ok_or_else(|| {
            VisionError::CaptureUnavailable("no frame has been captured".to_string())
        })?;

        let (width, height) = frame.dimensions();
        let fits = region
            .x
            .checked_add(region.width)
            .is_some_and(|right| right <= width)
            && region
                .y
                .checked_add(region.height)
                .is_some_and(|bottom| bottom <= height);
        if !fits {
            return Err(VisionError::RegionOutOfBounds(*region));
        }

        let sub_image =
            image::imageops::crop_imm(frame, region.x, region.y, region.width, region.height);
        Ok(sub_image.to_image())
    }
}

impl Default for FrameSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenSensor for FrameSensor {
    fn sample_region(&mut self, region: &ScanRegion) -> Result<RgbaImage, VisionError> {
        self.extract_region(region)
    }
}

/// Sensor for environments without screen capture
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSensor;

impl ScreenSensor for NullSensor {
    fn sample_region(&mut self, _region: &ScanRegion) -> Result<RgbaImage, VisionError> {
        Err(VisionError::CaptureUnavailable(
            "no screen capture backend".to_string(),
        ))
    }
}
