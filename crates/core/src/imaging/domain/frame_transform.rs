use std::sync::Arc;

use super::color_plan::ColorPlan;
use super::color_transformer::ColorTransformer;
use super::crop_mask::CropMask;
use super::frame_decoder::FrameDecoder;
use super::geometry::{FitAdjust, GeometryPlan};
use super::resize_filter::ResizeFilter;
use super::working_image::WorkingImage;
use crate::config::domain::config_error::ConfigError;
use crate::config::domain::settings_document::RenderSettings;
use crate::shared::error::BoxError;
use crate::shared::frame_ref::FrameRef;
use crate::shared::pixel_buffer::{FrameShape, PixelBuffer, SampleType};

/// Per-frame processing: decode → RGB → color → crop → resize → fit →
/// crop mask → quantize.
///
/// Every decision that depends only on settings and the source size is
/// made once in [`FrameTransformPipeline::new`], so each frame produces a
/// buffer of exactly [`FrameTransformPipeline::output_shape`].
pub struct FrameTransformPipeline {
    decoder: Arc<dyn FrameDecoder>,
    color: Option<(Arc<dyn ColorTransformer>, ColorPlan)>,
    geometry: GeometryPlan,
    filter: ResizeFilter,
    mask: Option<CropMask>,
    sample_type: SampleType,
}

impl FrameTransformPipeline {
    pub fn new(
        settings: &RenderSettings,
        geometry: GeometryPlan,
        decoder: Arc<dyn FrameDecoder>,
        color_transformer: Option<Arc<dyn ColorTransformer>>,
    ) -> Result<Self, ConfigError> {
        let globals = &settings.globals;
        let filter = ResizeFilter::from_setting(globals.filter.as_deref())?;

        let color = match (ColorPlan::from_settings(globals)?, color_transformer) {
            (Some(plan), Some(transformer)) => Some((transformer, plan)),
            (Some(_), None) => {
                return Err(ConfigError::invalid(
                    "color operations are configured but no color engine is available",
                ))
            }
            (None, _) => None,
        };

        let (out_w, out_h) = geometry.output;
        let mask = CropMask::from_settings(globals, out_w, out_h);

        Ok(Self {
            decoder,
            color,
            geometry,
            filter,
            mask,
            sample_type: settings.sample_type(),
        })
    }

    pub fn geometry(&self) -> &GeometryPlan {
        &self.geometry
    }

    pub fn output_shape(&self) -> FrameShape {
        FrameShape::rgb(
            self.geometry.output_width(),
            self.geometry.output_height(),
            self.sample_type,
        )
    }

    /// Produces the encoder-ready buffer for one frame. Never touches
    /// shared state; safe to call from several threads at once.
    pub fn transform(&self, frame: &FrameRef) -> Result<PixelBuffer, BoxError> {
        let mut image = self.decoder.decode(&frame.path)?;
        if (image.width(), image.height()) != self.geometry.source {
            return Err(format!(
                "frame is {}x{} but the sequence started at {}x{}",
                image.width(),
                image.height(),
                self.geometry.source.0,
                self.geometry.source.1
            )
            .into());
        }

        image = image.into_rgb();

        if let Some((transformer, plan)) = &self.color {
            image = transformer.apply(image, plan)?;
        }

        if let Some(crop) = self.geometry.crop {
            image = image.crop(crop.x, crop.y, crop.width, crop.height);
        }

        if let Some((w, h)) = self.geometry.resize {
            image = image.resize(w, h, self.filter.filter_type())?;
        }

        let (out_w, out_h) = self.geometry.output;
        image = match self.geometry.fit {
            Some(FitAdjust::CropDown { shift }) => image.shift_vertical(shift).reframe(out_w, out_h),
            Some(FitAdjust::PadUp { shift }) => image.reframe(out_w, out_h).shift_vertical(shift),
            None => image,
        };

        if let Some(mask) = &self.mask {
            mask.apply(&mut image);
        }

        let buffer = image.to_pixel_buffer(self.sample_type, frame.frame_number);
        if buffer.shape() != self.output_shape() {
            return Err(format!(
                "transform produced {}x{}x{} instead of {}x{}x3",
                buffer.width(),
                buffer.height(),
                buffer.channels(),
                out_w,
                out_h
            )
            .into());
        }
        log::debug!("Transformed frame {}", frame.label());
        Ok(buffer)
    }
}
