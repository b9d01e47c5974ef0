use image::imageops::FilterType;
use image::{ImageBuffer, Rgb};
use ndarray::{s, Array3, ArrayView3, Axis};

use crate::shared::pixel_buffer::{PixelBuffer, SampleType};

/// Float image being transformed, laid out `(row, column, channel)`.
///
/// Values are nominally in `[0, 1]`; anything outside is clamped only when
/// quantized for the encoder.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkingImage {
    pixels: Array3<f32>,
}

impl WorkingImage {
    pub fn new(pixels: Array3<f32>) -> Self {
        Self { pixels }
    }

    /// Interleaved samples in row-major order.
    pub fn from_interleaved(
        width: u32,
        height: u32,
        channels: u8,
        data: Vec<f32>,
    ) -> Result<Self, String> {
        let shape = (height as usize, width as usize, channels as usize);
        Array3::from_shape_vec(shape, data)
            .map(Self::new)
            .map_err(|e| format!("sample count does not match {width}x{height}x{channels}: {e}"))
    }

    pub fn filled(width: u32, height: u32, channels: u8, value: f32) -> Self {
        Self::new(Array3::from_elem(
            (height as usize, width as usize, channels as usize),
            value,
        ))
    }

    pub fn width(&self) -> u32 {
        self.pixels.dim().1 as u32
    }

    pub fn height(&self) -> u32 {
        self.pixels.dim().0 as u32
    }

    pub fn channels(&self) -> u8 {
        self.pixels.dim().2 as u8
    }

    pub fn pixels(&self) -> ArrayView3<'_, f32> {
        self.pixels.view()
    }

    pub fn into_pixels(self) -> Array3<f32> {
        self.pixels
    }

    /// Exactly three channels: extra channels (alpha) are dropped and
    /// single-channel images are replicated to grey RGB.
    pub fn into_rgb(self) -> Self {
        match self.channels() {
            3 => self,
            0 => Self::filled(self.width(), self.height(), 3, 0.0),
            1 | 2 => {
                let grey = self.pixels.slice(s![.., .., 0..1]);
                let mut rgb = Array3::<f32>::zeros((grey.dim().0, grey.dim().1, 3));
                for c in 0..3 {
                    rgb.slice_mut(s![.., .., c..c + 1]).assign(&grey);
                }
                Self::new(rgb)
            }
            _ => Self::new(self.pixels.slice(s![.., .., 0..3]).to_owned()),
        }
    }

    /// Region of interest starting at `(x, y)`. Must lie inside the image.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let (x, y) = (x as usize, y as usize);
        Self::new(
            self.pixels
                .slice(s![y..y + height as usize, x..x + width as usize, ..])
                .to_owned(),
        )
    }

    /// Canvas resized to `width x height`, anchored top-left: content beyond
    /// the new bounds is cut, new area is black.
    pub fn reframe(&self, width: u32, height: u32) -> Self {
        let mut out = Array3::<f32>::zeros((height as usize, width as usize, self.pixels.dim().2));
        let h = (height as usize).min(self.pixels.dim().0);
        let w = (width as usize).min(self.pixels.dim().1);
        out.slice_mut(s![..h, ..w, ..])
            .assign(&self.pixels.slice(s![..h, ..w, ..]));
        Self::new(out)
    }

    /// Moves content down by `dy` rows (up when negative) inside the same
    /// canvas. Uncovered rows become black.
    pub fn shift_vertical(&self, dy: i64) -> Self {
        let rows = self.pixels.dim().0 as i64;
        let mut out = Array3::<f32>::zeros(self.pixels.raw_dim());
        for (dst, mut row) in out.axis_iter_mut(Axis(0)).enumerate() {
            let src = dst as i64 - dy;
            if (0..rows).contains(&src) {
                row.assign(&self.pixels.index_axis(Axis(0), src as usize));
            }
        }
        Self::new(out)
    }

    /// Resamples an RGB image to `width x height`.
    pub fn resize(&self, width: u32, height: u32, filter: FilterType) -> Result<Self, String> {
        if self.channels() != 3 {
            return Err(format!("resize expects 3 channels, got {}", self.channels()));
        }
        let data: Vec<f32> = self.pixels.iter().copied().collect();
        let src = ImageBuffer::<Rgb<f32>, Vec<f32>>::from_raw(self.width(), self.height(), data)
            .ok_or("failed to wrap image for resizing")?;
        let resized = image::imageops::resize(&src, width, height, filter);
        Self::from_interleaved(width, height, 3, resized.into_raw())
    }

    /// Darkens whole rows by `opacity`, as compositing a black layer of that
    /// alpha over them would.
    pub fn darken_rows(&mut self, rows: std::ops::Range<u32>, opacity: f32) {
        let keep = 1.0 - opacity;
        let end = rows.end.min(self.height()) as usize;
        let start = (rows.start as usize).min(end);
        self.pixels
            .slice_mut(s![start..end, .., ..])
            .mapv_inplace(|v| v * keep);
    }

    /// Quantizes to the encoder's sample type, clamping to `[0, 1]`.
    pub fn to_pixel_buffer(&self, sample_type: SampleType, frame_number: Option<i64>) -> PixelBuffer {
        let max = sample_type.max_value();
        let quantize = |v: f32| (v.clamp(0.0, 1.0) * max).round();
        let (w, h, c) = (self.width(), self.height(), self.channels());
        match sample_type {
            SampleType::U8 => PixelBuffer::from_u8(
                self.pixels.iter().map(|&v| quantize(v) as u8).collect(),
                w,
                h,
                c,
                frame_number,
            ),
            SampleType::U16 => PixelBuffer::from_u16(
                self.pixels.iter().map(|&v| quantize(v) as u16).collect(),
                w,
                h,
                c,
                frame_number,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Every sample of row `r` holds `r`.
    fn rows(width: u32, height: u32, channels: u8) -> WorkingImage {
        let mut img = WorkingImage::filled(width, height, channels, 0.0);
        for (r, mut row) in img.pixels.axis_iter_mut(Axis(0)).enumerate() {
            row.fill(r as f32);
        }
        img
    }

    #[test]
    fn test_into_rgb_drops_alpha() {
        let img = WorkingImage::filled(4, 2, 4, 0.5).into_rgb();
        assert_eq!(img.channels(), 3);
        assert_eq!((img.width(), img.height()), (4, 2));
    }

    #[test]
    fn test_into_rgb_replicates_grey() {
        let img = WorkingImage::filled(2, 2, 1, 0.25).into_rgb();
        assert_eq!(img.channels(), 3);
        assert_relative_eq!(img.pixels()[[1, 1, 2]], 0.25);
    }

    #[test]
    fn test_crop_takes_region() {
        let img = rows(4, 6, 3).crop(1, 2, 2, 3);
        assert_eq!((img.width(), img.height()), (2, 3));
        assert_relative_eq!(img.pixels()[[0, 0, 0]], 2.0);
        assert_relative_eq!(img.pixels()[[2, 1, 0]], 4.0);
    }

    #[test]
    fn test_reframe_pads_bottom_and_cuts() {
        let taller = rows(2, 2, 3).reframe(3, 4);
        assert_eq!((taller.width(), taller.height()), (3, 4));
        assert_relative_eq!(taller.pixels()[[1, 0, 0]], 1.0);
        assert_relative_eq!(taller.pixels()[[3, 0, 0]], 0.0);
        assert_relative_eq!(taller.pixels()[[0, 2, 0]], 0.0);

        let shorter = rows(2, 4, 3).reframe(2, 2);
        assert_eq!(shorter.height(), 2);
        assert_relative_eq!(shorter.pixels()[[1, 0, 0]], 1.0);
    }

    #[test]
    fn test_shift_vertical_both_directions() {
        let down = rows(1, 4, 3).shift_vertical(1);
        let col: Vec<f32> = (0..4).map(|r| down.pixels()[[r, 0, 0]]).collect();
        assert_eq!(col, vec![0.0, 0.0, 1.0, 2.0]);

        let up = rows(1, 4, 3).shift_vertical(-2);
        let col: Vec<f32> = (0..4).map(|r| up.pixels()[[r, 0, 0]]).collect();
        assert_eq!(col, vec![2.0, 3.0, 0.0, 0.0]);
    }

    #[test]
    fn test_resize_changes_dimensions_and_keeps_flat_color() {
        let img = WorkingImage::filled(8, 4, 3, 0.5)
            .resize(4, 2, FilterType::Triangle)
            .unwrap();
        assert_eq!((img.width(), img.height()), (4, 2));
        assert_relative_eq!(img.pixels()[[1, 3, 1]], 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_resize_rejects_non_rgb() {
        let img = WorkingImage::filled(2, 2, 4, 0.5);
        assert!(img.resize(1, 1, FilterType::Nearest).is_err());
    }

    #[test]
    fn test_darken_rows_scales_only_selected_rows() {
        let mut img = WorkingImage::filled(2, 4, 3, 1.0);
        img.darken_rows(0..1, 0.5);
        img.darken_rows(3..9, 1.0);
        assert_relative_eq!(img.pixels()[[0, 0, 0]], 0.5);
        assert_relative_eq!(img.pixels()[[1, 1, 2]], 1.0);
        assert_relative_eq!(img.pixels()[[3, 1, 2]], 0.0);
    }

    #[test]
    fn test_quantize_clamps_and_scales() {
        let mut img = WorkingImage::filled(1, 1, 3, 0.0);
        img.pixels[[0, 0, 0]] = 1.5;
        img.pixels[[0, 0, 1]] = 0.5;
        img.pixels[[0, 0, 2]] = -0.2;

        let eight = img.to_pixel_buffer(SampleType::U8, Some(3));
        assert_eq!(
            (eight.sample(0, 0, 0), eight.sample(0, 0, 1), eight.sample(0, 0, 2)),
            (255, 128, 0)
        );
        assert_eq!(eight.frame_number(), Some(3));

        let sixteen = img.to_pixel_buffer(SampleType::U16, None);
        assert_eq!(sixteen.sample(0, 0, 0), 65535);
        assert_eq!(sixteen.sample(0, 0, 1), 32768);
    }
}
