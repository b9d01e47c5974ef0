use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

use super::scalar::{opt_path, opt_string, or_default};
use crate::shared::constants::{DEFAULT_ENCODER_PROGRAM, DEFAULT_HIGH_BITDEPTH_ENCODER_PROGRAM};
use crate::timecode::FrameRate;

const DEFAULT_MOVIE_EXT: &str = "mov";

/// Amount trimmed from an axis, as pixels or a percentage of the source.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "CropSpec")]
pub enum CropSize {
    Pixels(u32),
    Percent(f64),
}

impl CropSize {
    pub fn resolve(&self, source: u32) -> u32 {
        match *self {
            CropSize::Pixels(px) => px,
            CropSize::Percent(pct) => (pct / 100.0 * source as f64).round().max(0.0) as u32,
        }
    }

    pub fn is_zero(&self) -> bool {
        match *self {
            CropSize::Pixels(px) => px == 0,
            CropSize::Percent(pct) => pct == 0.0,
        }
    }
}

impl FromStr for CropSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if let Some(pct) = text.strip_suffix('%') {
            let pct = pct
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid crop percentage '{text}'"))?;
            if !(0.0..100.0).contains(&pct) {
                return Err(format!("crop percentage '{text}' must be in [0, 100)"));
            }
            return Ok(CropSize::Percent(pct));
        }
        text.parse::<u32>()
            .map(CropSize::Pixels)
            .map_err(|_| format!("invalid crop size '{text}'"))
    }
}

impl fmt::Display for CropSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CropSize::Pixels(px) => write!(f, "{px}"),
            CropSize::Percent(pct) => write!(f, "{pct}%"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CropSpec {
    Int(u32),
    Text(String),
}

impl TryFrom<CropSpec> for CropSize {
    type Error = String;

    fn try_from(spec: CropSpec) -> Result<Self, Self::Error> {
        match spec {
            CropSpec::Int(px) => Ok(CropSize::Pixels(px)),
            CropSpec::Text(text) => text.parse(),
        }
    }
}

/// The `globals` block of a settings document.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    #[serde(deserialize_with = "or_default")]
    pub width: u32,
    #[serde(deserialize_with = "or_default")]
    pub height: u32,
    #[serde(deserialize_with = "opt_string")]
    pub filter: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub fit: bool,
    pub cropwidth: Option<CropSize>,
    pub cropheight: Option<CropSize>,
    #[serde(deserialize_with = "or_default")]
    pub cropmask: bool,
    pub cropmask_ar: Option<f64>,
    pub cropmask_opacity: Option<f64>,
    #[serde(deserialize_with = "opt_path")]
    pub ocioconfig: Option<PathBuf>,
    #[serde(deserialize_with = "opt_string")]
    pub ociocolorconvert: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub ociolook: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub ociodisplay: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub ocioview: Option<String>,
    pub framerate: FrameRate,
    #[serde(deserialize_with = "opt_string")]
    pub movie_ext: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub movie_append_codec: bool,
    #[serde(deserialize_with = "opt_string")]
    pub movie_location: Option<String>,
    #[serde(deserialize_with = "or_default")]
    pub debug: bool,
    #[serde(deserialize_with = "opt_string")]
    pub default_codec: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub encoder_program: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub encoder_program_high_bitdepth: Option<String>,
    /// Parallel frame transforms; 0 picks the logical CPU count.
    #[serde(deserialize_with = "or_default")]
    pub workers: usize,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            filter: None,
            fit: false,
            cropwidth: None,
            cropheight: None,
            cropmask: false,
            cropmask_ar: None,
            cropmask_opacity: None,
            ocioconfig: None,
            ociocolorconvert: None,
            ociolook: None,
            ociodisplay: None,
            ocioview: None,
            framerate: FrameRate::integer(24),
            movie_ext: None,
            movie_append_codec: false,
            movie_location: None,
            debug: false,
            default_codec: None,
            encoder_program: None,
            encoder_program_high_bitdepth: None,
            workers: 0,
        }
    }
}

impl GlobalSettings {
    pub fn movie_ext(&self) -> &str {
        self.movie_ext
            .as_deref()
            .map(|ext| ext.trim_start_matches('.'))
            .unwrap_or(DEFAULT_MOVIE_EXT)
    }

    pub fn encoder_program(&self, high_bitdepth: bool) -> &str {
        if high_bitdepth {
            self.encoder_program_high_bitdepth
                .as_deref()
                .unwrap_or(DEFAULT_HIGH_BITDEPTH_ENCODER_PROGRAM)
        } else {
            self.encoder_program
                .as_deref()
                .unwrap_or(DEFAULT_ENCODER_PROGRAM)
        }
    }

    /// Returns a copy with every truthy override applied. Zero, `false`
    /// and empty values in `overrides` leave the global value untouched.
    pub fn overlay(&self, overrides: &GlobalOverrides) -> GlobalSettings {
        GlobalSettings {
            width: pick(self.width, overrides.width),
            height: pick(self.height, overrides.height),
            filter: pick_opt(&self.filter, &overrides.filter),
            fit: pick(self.fit, overrides.fit),
            cropwidth: pick_opt(&self.cropwidth, &overrides.cropwidth),
            cropheight: pick_opt(&self.cropheight, &overrides.cropheight),
            cropmask: pick(self.cropmask, overrides.cropmask),
            cropmask_ar: pick_opt(&self.cropmask_ar, &overrides.cropmask_ar),
            cropmask_opacity: pick_opt(&self.cropmask_opacity, &overrides.cropmask_opacity),
            ocioconfig: pick_opt(&self.ocioconfig, &overrides.ocioconfig),
            ociocolorconvert: pick_opt(&self.ociocolorconvert, &overrides.ociocolorconvert),
            ociolook: pick_opt(&self.ociolook, &overrides.ociolook),
            ociodisplay: pick_opt(&self.ociodisplay, &overrides.ociodisplay),
            ocioview: pick_opt(&self.ocioview, &overrides.ocioview),
            framerate: overrides.framerate.unwrap_or(self.framerate),
            movie_ext: pick_opt(&self.movie_ext, &overrides.movie_ext),
            movie_append_codec: pick(self.movie_append_codec, overrides.movie_append_codec),
            movie_location: pick_opt(&self.movie_location, &overrides.movie_location),
            debug: pick(self.debug, overrides.debug),
            default_codec: self.default_codec.clone(),
            encoder_program: pick_opt(&self.encoder_program, &overrides.encoder_program),
            encoder_program_high_bitdepth: pick_opt(
                &self.encoder_program_high_bitdepth,
                &overrides.encoder_program_high_bitdepth,
            ),
            workers: pick(self.workers, overrides.workers),
        }
    }
}

/// Global keys a codec entry may override.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GlobalOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(deserialize_with = "opt_string")]
    pub filter: Option<String>,
    pub fit: Option<bool>,
    pub cropwidth: Option<CropSize>,
    pub cropheight: Option<CropSize>,
    pub cropmask: Option<bool>,
    pub cropmask_ar: Option<f64>,
    pub cropmask_opacity: Option<f64>,
    #[serde(deserialize_with = "opt_path")]
    pub ocioconfig: Option<PathBuf>,
    #[serde(deserialize_with = "opt_string")]
    pub ociocolorconvert: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub ociolook: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub ociodisplay: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub ocioview: Option<String>,
    pub framerate: Option<FrameRate>,
    #[serde(deserialize_with = "opt_string")]
    pub movie_ext: Option<String>,
    pub movie_append_codec: Option<bool>,
    #[serde(deserialize_with = "opt_string")]
    pub movie_location: Option<String>,
    pub debug: Option<bool>,
    #[serde(deserialize_with = "opt_string")]
    pub encoder_program: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub encoder_program_high_bitdepth: Option<String>,
    pub workers: Option<usize>,
}

trait Truthy {
    fn is_truthy(&self) -> bool;
}

impl Truthy for u32 {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

impl Truthy for usize {
    fn is_truthy(&self) -> bool {
        *self != 0
    }
}

impl Truthy for f64 {
    fn is_truthy(&self) -> bool {
        *self != 0.0
    }
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for PathBuf {
    fn is_truthy(&self) -> bool {
        !self.as_os_str().is_empty()
    }
}

impl Truthy for CropSize {
    fn is_truthy(&self) -> bool {
        !self.is_zero()
    }
}

fn pick<T: Truthy + Copy>(base: T, over: Option<T>) -> T {
    match over {
        Some(value) if value.is_truthy() => value,
        _ => base,
    }
}

fn pick_opt<T: Truthy + Clone>(base: &Option<T>, over: &Option<T>) -> Option<T> {
    match over {
        Some(value) if value.is_truthy() => Some(value.clone()),
        _ => base.clone(),
    }
}
