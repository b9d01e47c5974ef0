use serde::Deserialize;

use super::global_settings::GlobalOverrides;
use super::scalar::opt_string;

const DEFAULT_BITDEPTH: u32 = 8;

/// One entry of `output_codecs`: encoder options plus any global keys the
/// entry overrides.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CodecSettings {
    /// Short label appended to the movie name when `movie_append_codec` is set.
    #[serde(deserialize_with = "opt_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub codec: Option<String>,
    pub bitdepth: u32,
    #[serde(deserialize_with = "opt_string")]
    pub pix_fmt: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub profile: Option<String>,
    pub qscale: Option<f64>,
    #[serde(deserialize_with = "opt_string")]
    pub preset: Option<String>,
    pub keyint: Option<u32>,
    pub bframes: Option<u32>,
    #[serde(deserialize_with = "opt_string")]
    pub tune: Option<String>,
    pub crf: Option<f64>,
    #[serde(deserialize_with = "opt_string")]
    pub bitrate: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub vf: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub vendor: Option<String>,
    #[serde(deserialize_with = "opt_string")]
    pub metadata_s: Option<String>,
    #[serde(flatten)]
    pub overrides: GlobalOverrides,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self {
            name: None,
            codec: None,
            bitdepth: DEFAULT_BITDEPTH,
            pix_fmt: None,
            profile: None,
            qscale: None,
            preset: None,
            keyint: None,
            bframes: None,
            tune: None,
            crf: None,
            bitrate: None,
            vf: None,
            vendor: None,
            metadata_s: None,
            overrides: GlobalOverrides::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_codec_entry_with_overrides() {
        let yaml = "
name: hq
codec: libx264
bitdepth: 8
profile: high
preset: slow
keyint: 1
bframes: 0
tune: film
crf: 13
pix_fmt: yuv420p
bitrate: 20000000
width: 1280
cropmask: true
";
        let codec: CodecSettings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(codec.name.as_deref(), Some("hq"));
        assert_eq!(codec.codec.as_deref(), Some("libx264"));
        assert_eq!(codec.keyint, Some(1));
        assert_eq!(codec.bframes, Some(0));
        assert_eq!(codec.crf, Some(13.0));
        assert_eq!(codec.bitrate.as_deref(), Some("20000000"));
        assert_eq!(codec.overrides.width, Some(1280));
        assert_eq!(codec.overrides.cropmask, Some(true));
        assert!(codec.overrides.height.is_none());
    }

    #[test]
    fn test_bitdepth_defaults_to_eight() {
        let codec: CodecSettings = serde_yaml::from_str("codec: prores_ks").unwrap();
        assert_eq!(codec.bitdepth, 8);
        assert!(codec.qscale.is_none());
    }
}
