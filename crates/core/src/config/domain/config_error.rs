use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not find config file {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("no config file given and no default location available (set $DAILIES_CONFIG)")]
    NoConfigPath,

    #[error("invalid codec '{name}'. Possible options are\n\t{}", available.join("\n\t"))]
    UnknownCodec { name: String, available: Vec<String> },

    #[error("invalid setting: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}
