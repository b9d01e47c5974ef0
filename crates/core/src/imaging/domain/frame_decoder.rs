use std::path::Path;

use super::working_image::WorkingImage;
use crate::shared::error::BoxError;

/// Reads source frames into float images.
pub trait FrameDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<WorkingImage, BoxError>;

    /// Width and height from the file header, without decoding pixels.
    fn dimensions(&self, path: &Path) -> Result<(u32, u32), BoxError>;
}
