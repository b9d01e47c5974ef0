/// Raster formats a sequence may consist of (compared case-insensitively).
pub const RASTER_EXTENSIONS: &[&str] = &[
    "tiff", "tif", "jpg", "jpeg", "exr", "png", "jp2", "j2c", "tga", "dpx",
];

/// Environment variable naming the dailies settings file.
pub const CONFIG_ENV_VAR: &str = "DAILIES_CONFIG";

/// Environment variable naming the default color-management config.
pub const OCIO_ENV_VAR: &str = "OCIO";

pub const CONFIG_DIR_NAME: &str = "dailies";
pub const CONFIG_FILE_NAME: &str = "dailies.yaml";

/// Codec profile used when neither the CLI nor the settings pick one.
pub const DEFAULT_CODEC_NAME: &str = "h264_hq";

pub const DEFAULT_ENCODER_PROGRAM: &str = "ffmpeg";
pub const DEFAULT_HIGH_BITDEPTH_ENCODER_PROGRAM: &str = "ffmpeg-10bit";

/// Bit depth from which the high-bit-depth encoder build is required.
pub const HIGH_BITDEPTH_THRESHOLD: u32 = 10;

pub const COLOR_TOOL_PROGRAM: &str = "oiiotool";
