//! Turns numbered image sequences into review movies.
//!
//! Frames are located on disk, pushed one by one through a color and
//! geometry pipeline, and streamed as raw video into an external encoder.

pub mod config;
pub mod encoding;
pub mod imaging;
pub mod pipeline;
pub mod sequence;
pub mod shared;
pub mod timecode;
