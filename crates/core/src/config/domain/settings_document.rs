use std::collections::BTreeMap;

use serde::Deserialize;

use super::codec_settings::CodecSettings;
use super::config_error::ConfigError;
use super::global_settings::GlobalSettings;
use crate::shared::constants::{DEFAULT_CODEC_NAME, HIGH_BITDEPTH_THRESHOLD};
use crate::shared::pixel_buffer::SampleType;

/// A parsed settings file: shared `globals` plus named `output_codecs`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SettingsDocument {
    pub globals: GlobalSettings,
    pub output_codecs: BTreeMap<String, CodecSettings>,
}

impl SettingsDocument {
    /// Codec names in sorted order.
    pub fn codec_names(&self) -> Vec<String> {
        self.output_codecs.keys().cloned().collect()
    }

    /// The codec used when none is requested explicitly.
    pub fn default_codec_name(&self) -> &str {
        self.globals
            .default_codec
            .as_deref()
            .unwrap_or(DEFAULT_CODEC_NAME)
    }

    /// Merges the chosen codec's overrides into the globals.
    ///
    /// The document itself is never modified, so resolving several codecs
    /// from one document gives independent results.
    pub fn resolve(&self, codec: Option<&str>) -> Result<RenderSettings, ConfigError> {
        let codec_key = codec.unwrap_or_else(|| self.default_codec_name());
        let codec = self
            .output_codecs
            .get(codec_key)
            .ok_or_else(|| ConfigError::UnknownCodec {
                name: codec_key.to_string(),
                available: self.codec_names(),
            })?;

        let settings = RenderSettings {
            codec_key: codec_key.to_string(),
            globals: self.globals.overlay(&codec.overrides),
            codec: codec.clone(),
        };
        settings.validate()?;
        Ok(settings)
    }
}

/// Effective settings for one render: globals with a codec's overrides
/// applied, plus that codec's encoder options.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    pub codec_key: String,
    pub globals: GlobalSettings,
    pub codec: CodecSettings,
}

impl RenderSettings {
    pub fn sample_type(&self) -> SampleType {
        SampleType::for_bit_depth(self.codec.bitdepth)
    }

    pub fn is_high_bitdepth(&self) -> bool {
        self.codec.bitdepth >= HIGH_BITDEPTH_THRESHOLD
    }

    pub fn encoder_program(&self) -> &str {
        self.globals.encoder_program(self.is_high_bitdepth())
    }

    /// Label spliced into movie names; the entry's `name`, else its key.
    pub fn codec_label(&self) -> &str {
        self.codec.name.as_deref().unwrap_or(&self.codec_key)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.codec.bitdepth == 0 || self.codec.bitdepth > 16 {
            return Err(ConfigError::invalid(format!(
                "bitdepth {} of codec '{}' must be between 1 and 16",
                self.codec.bitdepth, self.codec_key
            )));
        }
        if let Some(ar) = self.globals.cropmask_ar {
            if ar <= 0.0 {
                return Err(ConfigError::invalid("cropmask_ar must be positive"));
            }
        }
        if let Some(opacity) = self.globals.cropmask_opacity {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(ConfigError::invalid(
                    "cropmask_opacity must be between 0 and 1",
                ));
            }
        }
        Ok(())
    }
}
