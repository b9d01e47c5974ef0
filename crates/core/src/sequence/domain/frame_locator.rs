use std::path::Path;

use super::discovery_error::DiscoveryError;
use super::frame_sequence::FrameSequence;

/// Finds every frame belonging to the sequence a user pointed at.
///
/// `input` may be a directory, any existing frame, or a pattern path
/// (`shot.%04d.exr`, `shot.####.exr`).
pub trait FrameLocator: Send + Sync {
    fn locate(&self, input: &Path) -> Result<FrameSequence, DiscoveryError>;
}
