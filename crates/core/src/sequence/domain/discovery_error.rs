use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("could not find any frames to operate on matching {pattern}")]
    NoFrames { pattern: String },

    #[error("cannot derive a sequence from {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("failed to list frames: {0}")]
    Glob(String),

    #[error("frame {number} appears twice: {} and {}", first.display(), second.display())]
    DuplicateFrame {
        number: i64,
        first: PathBuf,
        second: PathBuf,
    },
}
