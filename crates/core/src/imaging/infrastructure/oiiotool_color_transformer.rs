use std::path::Path;
use std::process::Command;

use image::{ImageFormat, Rgb32FImage};

use crate::imaging::domain::color_plan::{ColorOperation, ColorPlan};
use crate::imaging::domain::color_transformer::ColorTransformer;
use crate::imaging::domain::working_image::WorkingImage;
use crate::shared::constants::COLOR_TOOL_PROGRAM;
use crate::shared::error::BoxError;

/// Runs color plans through OpenImageIO's `oiiotool`, exchanging float EXR
/// files in a private temporary directory.
///
/// A look is applied from the configured view's color space
/// (`--ociolook:from=<view>`); its destination is left to oiiotool.
pub struct OiiotoolColorTransformer {
    program: String,
}

impl OiiotoolColorTransformer {
    pub fn new() -> Self {
        Self::with_program(COLOR_TOOL_PROGRAM)
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for OiiotoolColorTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorTransformer for OiiotoolColorTransformer {
    fn apply(&self, image: WorkingImage, plan: &ColorPlan) -> Result<WorkingImage, BoxError> {
        let workdir = tempfile::tempdir()?;
        let input = workdir.path().join("in.exr");
        let output = workdir.path().join("out.exr");

        let (width, height) = (image.width(), image.height());
        let samples: Vec<f32> = image.pixels().iter().copied().collect();
        let rgb = Rgb32FImage::from_raw(width, height, samples)
            .ok_or("color transform expects an RGB image")?;
        rgb.save_with_format(&input, ImageFormat::OpenExr)?;

        let args = color_args(plan, &input, &output);
        log::debug!("{} {}", self.program, args.join(" "));
        let result = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| format!("failed to run {}: {e}", self.program))?;
        if !result.status.success() {
            return Err(format!(
                "{} failed ({}): {}",
                self.program,
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )
            .into());
        }

        let converted = image::open(&output)?.to_rgb32f();
        if converted.dimensions() != (width, height) {
            return Err(format!(
                "{} changed the image size to {}x{}",
                self.program,
                converted.width(),
                converted.height()
            )
            .into());
        }
        Ok(WorkingImage::from_interleaved(
            width,
            height,
            3,
            converted.into_raw(),
        )?)
    }
}

/// Command-line arguments for `oiiotool`, operations in plan order.
pub fn color_args(plan: &ColorPlan, input: &Path, output: &Path) -> Vec<String> {
    let mut args = vec![
        "--colorconfig".to_string(),
        plan.config.to_string_lossy().into_owned(),
        input.to_string_lossy().into_owned(),
    ];
    for op in &plan.operations {
        match op {
            ColorOperation::Convert { from, to } => {
                args.extend(["--colorconvert".to_string(), from.clone(), to.clone()]);
            }
            ColorOperation::Look { looks, space } => {
                args.extend([format!("--ociolook:from={space}"), looks.clone()]);
            }
            ColorOperation::Display { display, view } => {
                args.extend(["--ociodisplay".to_string(), display.clone(), view.clone()]);
            }
        }
    }
    args.extend([
        "-d".to_string(),
        "float".to_string(),
        "-o".to_string(),
        output.to_string_lossy().into_owned(),
    ]);
    args
}
