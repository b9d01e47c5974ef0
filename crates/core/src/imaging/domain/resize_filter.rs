use std::str::FromStr;

use image::imageops::FilterType;

use crate::config::domain::config_error::ConfigError;

/// Resampling kernel, named the way color pipelines usually spell them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl ResizeFilter {
    pub fn from_setting(name: Option<&str>) -> Result<Self, ConfigError> {
        match name {
            None => Ok(Self::default()),
            Some(name) => name.parse(),
        }
    }

    pub fn filter_type(self) -> FilterType {
        match self {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl FromStr for ResizeFilter {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" | "point" | "box" => Ok(ResizeFilter::Nearest),
            "triangle" | "bilinear" | "linear" => Ok(ResizeFilter::Triangle),
            "catmull-rom" | "catmullrom" | "catrom" | "cubic" | "bicubic" | "mitchell" => {
                Ok(ResizeFilter::CatmullRom)
            }
            "gaussian" | "blackman-harris" => Ok(ResizeFilter::Gaussian),
            "lanczos3" | "lanczos" | "sinc" => Ok(ResizeFilter::Lanczos3),
            other => Err(ConfigError::invalid(format!(
                "unknown resize filter '{other}' (use box, triangle, catmull-rom, gaussian or lanczos3)"
            ))),
        }
    }
}
