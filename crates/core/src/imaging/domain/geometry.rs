use crate::config::domain::config_error::ConfigError;
use crate::config::domain::global_settings::GlobalSettings;

/// Edge trim as a region of interest on the source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Vertical adjustment applied after the width-preserving resize.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FitAdjust {
    /// Move content by `shift` rows (negative is up), then cut to the
    /// target height.
    CropDown { shift: i64 },
    /// Extend the canvas at the bottom to the target height, then move
    /// content down by `shift` rows.
    PadUp { shift: i64 },
}

/// Every geometric decision for one source size, computed once per run so
/// all frames share it and the encoder can be told the output size up
/// front.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeometryPlan {
    pub source: (u32, u32),
    pub crop: Option<CropWindow>,
    pub resize: Option<(u32, u32)>,
    pub fit: Option<FitAdjust>,
    pub output: (u32, u32),
}

impl GeometryPlan {
    pub fn output_width(&self) -> u32 {
        self.output.0
    }

    pub fn output_height(&self) -> u32 {
        self.output.1
    }
}

/// Plans crop, resize and fit for a `src_width x src_height` source.
///
/// A zero target width disables resizing and fitting; a zero target height
/// keeps the aspect ratio. Heights derived from the aspect ratio use floor
/// division.
pub fn plan_geometry(
    src_width: u32,
    src_height: u32,
    globals: &GlobalSettings,
) -> Result<GeometryPlan, ConfigError> {
    if src_width == 0 || src_height == 0 {
        return Err(ConfigError::invalid(format!(
            "source image has no pixels ({src_width}x{src_height})"
        )));
    }

    let crop = plan_crop(src_width, src_height, globals)?;
    let (work_w, work_h) = crop
        .map(|c| (c.width, c.height))
        .unwrap_or((src_width, src_height));

    let mut plan = GeometryPlan {
        source: (src_width, src_height),
        crop,
        resize: None,
        fit: None,
        output: (work_w, work_h),
    };

    let target_w = globals.width;
    if target_w == 0 {
        return Ok(plan);
    }

    let height_noar = (target_w as u64 * work_h as u64 / work_w as u64) as u32;
    if height_noar == 0 {
        return Err(ConfigError::invalid(format!(
            "width {target_w} gives a zero-height image for a {work_w}x{work_h} source"
        )));
    }
    let target_h = if globals.height > 0 {
        globals.height
    } else {
        height_noar
    };

    if target_w == work_w && target_h == work_h {
        return Ok(plan);
    }

    if work_w != target_w {
        plan.resize = Some((target_w, height_noar));
    }

    let diff = target_h as i64 - height_noar as i64;
    plan.fit = if !globals.fit || diff == 0 {
        None
    } else if diff < 0 {
        Some(FitAdjust::CropDown {
            shift: diff.div_euclid(2),
        })
    } else {
        Some(FitAdjust::PadUp { shift: diff / 2 })
    };

    plan.output = match plan.fit {
        Some(_) => (target_w, target_h),
        None => (target_w, height_noar),
    };
    Ok(plan)
}

fn plan_crop(
    width: u32,
    height: u32,
    globals: &GlobalSettings,
) -> Result<Option<CropWindow>, ConfigError> {
    let crop_w = globals.cropwidth.map(|c| c.resolve(width)).unwrap_or(0);
    let crop_h = globals.cropheight.map(|c| c.resolve(height)).unwrap_or(0);
    if crop_w == 0 && crop_h == 0 {
        return Ok(None);
    }

    let (x0, y0) = (crop_w / 2, crop_h / 2);
    let x1 = width.saturating_sub(crop_w / 2);
    let y1 = height.saturating_sub(crop_h / 2);
    if x1 <= x0 || y1 <= y0 {
        return Err(ConfigError::invalid(format!(
            "crop {crop_w}x{crop_h} leaves nothing of a {width}x{height} image"
        )));
    }

    Ok(Some(CropWindow {
        x: x0,
        y: y0,
        width: x1 - x0,
        height: y1 - y0,
    }))
}
