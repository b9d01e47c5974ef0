use std::ops::Range;

use super::working_image::WorkingImage;
use crate::config::domain::global_settings::GlobalSettings;

/// Semi-transparent letterbox previewing a target aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropMask {
    height: u32,
    bar: u32,
    opacity: f32,
}

impl CropMask {
    /// Mask for an output of `width x height`.
    ///
    /// Returns `None` when the mask is disabled, or when it is enabled
    /// without both an aspect ratio and an opacity, in which case a warning
    /// is logged.
    pub fn from_settings(globals: &GlobalSettings, width: u32, height: u32) -> Option<Self> {
        if !globals.cropmask {
            return None;
        }
        match (globals.cropmask_ar, globals.cropmask_opacity) {
            (Some(ar), Some(opacity)) if ar > 0.0 && opacity > 0.0 => {
                Some(Self::new(width, height, ar, opacity as f32))
            }
            _ => {
                log::warn!("Cropmask enabled, but cropmask_ar or cropmask_opacity missing. Skipping cropmask");
                None
            }
        }
    }

    pub fn new(width: u32, height: u32, aspect_ratio: f64, opacity: f32) -> Self {
        let mask_height = (width as f64 / aspect_ratio).round();
        let bar = ((height as f64 - mask_height) / 2.0).round().max(0.0) as u32;
        let bar = bar.min(height / 2);
        log::debug!(
            "Cropmask height {mask_height} for {width}x{height} at {aspect_ratio}, bars of {bar}"
        );
        Self {
            height,
            bar,
            opacity: opacity.clamp(0.0, 1.0),
        }
    }

    pub fn bar(&self) -> u32 {
        self.bar
    }

    /// Rows left untouched by the mask.
    pub fn band(&self) -> Range<u32> {
        self.bar..self.height - self.bar
    }

    /// Composites the mask over `image`.
    pub fn apply(&self, image: &mut WorkingImage) {
        let band = self.band();
        image.darken_rows(0..band.start, self.opacity);
        image.darken_rows(band.end..self.height, self.opacity);
    }
}
