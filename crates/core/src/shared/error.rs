use std::path::PathBuf;

use thiserror::Error;

use crate::config::domain::config_error::ConfigError;
use crate::sequence::domain::discovery_error::DiscoveryError;

/// Error type crossing capability traits and worker threads.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Fatal outcomes of a dailies run.
///
/// Every variant aborts the whole run; nothing is retried.
#[derive(Error, Debug)]
pub enum DailiesError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("frame {frame} ({}): {message}", path.display())]
    Frame {
        frame: String,
        path: PathBuf,
        message: String,
    },

    #[error("encoder failed: {message}")]
    Encoder { message: String, output: String },

    #[error("run cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DailiesError {
    pub fn frame(frame: Option<i64>, path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Frame {
            frame: frame.map_or_else(|| "?".to_string(), |n| n.to_string()),
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn encoder(message: impl Into<String>) -> Self {
        Self::Encoder {
            message: message.into(),
            output: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_error_names_frame_and_path() {
        let err = DailiesError::frame(Some(1001), "/shots/a.1001.exr", "corrupt header");
        let text = err.to_string();
        assert!(text.contains("1001"));
        assert!(text.contains("/shots/a.1001.exr"));
        assert!(text.contains("corrupt header"));
    }

    #[test]
    fn test_frame_error_without_number_uses_placeholder() {
        let err = DailiesError::frame(None, "a.exr", "boom");
        assert!(err.to_string().starts_with("frame ?"));
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err: DailiesError = ConfigError::UnknownCodec {
            name: "nope".into(),
            available: vec!["h264_hq".into(), "prores".into()],
        }
        .into();
        let text = err.to_string();
        assert!(text.contains("nope"));
        assert!(text.contains("h264_hq"));
    }

    #[test]
    fn test_io_error_preserves_source() {
        let err: DailiesError = std::io::Error::other("pipe closed").into();
        assert!(err.to_string().contains("pipe closed"));
    }
}
