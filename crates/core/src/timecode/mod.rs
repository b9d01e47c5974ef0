//! Broadcast timecode arithmetic.
//!
//! Only used to annotate the encoder invocation with the start timecode of a
//! sequence, so players show absolute frame numbers.

pub mod frame_rate;
pub mod smpte;

pub use frame_rate::FrameRate;
pub use smpte::Timecode;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimecodeError {
    #[error("invalid frame rate '{0}'")]
    InvalidRate(String),

    #[error("malformed timecode '{0}' (expected HH:MM:SS:FF, HH:MM:SS;FF or HH:MM:SS.fff)")]
    Malformed(String),

    #[error("timecode '{text}' out of range: {reason}")]
    OutOfRange { text: String, reason: String },
}
