use std::path::Path;

use crate::imaging::domain::frame_decoder::FrameDecoder;
use crate::imaging::domain::working_image::WorkingImage;
use crate::shared::error::BoxError;

/// Decodes frames with the `image` crate.
///
/// Integer formats are normalized to `[0, 1]`; EXR keeps its float values.
/// Alpha is kept here and dropped by the transform pipeline.
pub struct ImageCrateDecoder;

impl ImageCrateDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageCrateDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder for ImageCrateDecoder {
    fn decode(&self, path: &Path) -> Result<WorkingImage, BoxError> {
        let img = image::open(path)?;
        let (width, height) = (img.width(), img.height());
        if img.color().has_alpha() {
            let rgba = img.to_rgba32f();
            Ok(WorkingImage::from_interleaved(width, height, 4, rgba.into_raw())?)
        } else {
            let rgb = img.to_rgb32f();
            Ok(WorkingImage::from_interleaved(width, height, 3, rgb.into_raw())?)
        }
    }

    fn dimensions(&self, path: &Path) -> Result<(u32, u32), BoxError> {
        Ok(image::image_dimensions(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_decode_png_normalizes_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plate.0001.png");
        image::RgbImage::from_pixel(6, 4, image::Rgb([255, 51, 0]))
            .save(&path)
            .unwrap();

        let decoder = ImageCrateDecoder::new();
        let img = decoder.decode(&path).unwrap();

        assert_eq!((img.width(), img.height(), img.channels()), (6, 4, 3));
        assert_relative_eq!(img.pixels()[[3, 5, 0]], 1.0);
        assert_relative_eq!(img.pixels()[[3, 5, 1]], 0.2, epsilon = 1e-6);
        assert_eq!(decoder.dimensions(&path).unwrap(), (6, 4));
    }

    #[test]
    fn test_decode_keeps_alpha_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matte.0001.png");
        image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 128]))
            .save(&path)
            .unwrap();

        let img = ImageCrateDecoder::new().decode(&path).unwrap();

        assert_eq!(img.channels(), 4);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let decoder = ImageCrateDecoder::new();
        assert!(decoder.decode(&dir.path().join("gone.png")).is_err());
        assert!(decoder.dimensions(&dir.path().join("gone.png")).is_err());
    }
}
