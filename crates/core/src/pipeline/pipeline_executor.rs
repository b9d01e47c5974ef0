use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::encoding::domain::encoder_sink::EncoderSink;
use crate::imaging::domain::frame_transform::FrameTransformPipeline;
use crate::shared::error::DailiesError;
use crate::shared::frame_ref::FrameRef;

use super::pipeline_logger::PipelineLogger;

/// Configuration for one streaming run.
pub struct PipelineConfig {
    /// Called after every frame reaches the encoder; returning `false`
    /// cancels the run.
    pub on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    pub cancelled: Arc<AtomicBool>,
}

impl PipelineConfig {
    pub fn new(cancelled: Arc<AtomicBool>) -> Self {
        Self {
            on_progress: None,
            cancelled,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Reports progress and raises the cancel flag if the callback asks
    /// to stop.
    pub(crate) fn report(&self, written: usize, total: usize) {
        if let Some(callback) = &self.on_progress {
            if !callback(written, total) {
                self.cancelled.store(true, Ordering::Relaxed);
            }
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(Arc::new(AtomicBool::new(false)))
    }
}

/// Abstracts how frames are transformed and fed to the encoder.
///
/// Implementations must write frames to `sink` in exactly the order of
/// `frames`, and stop at the first failure. They never finish or abort the
/// sink; that stays with the caller. Returns the number of frames written.
pub trait PipelineExecutor: Send {
    fn execute(
        &self,
        frames: &[FrameRef],
        transform: &FrameTransformPipeline,
        sink: &mut dyn EncoderSink,
        config: &PipelineConfig,
        logger: &mut dyn PipelineLogger,
    ) -> Result<usize, DailiesError>;
}

/// Fatal error for a frame whose transform failed.
pub(crate) fn frame_failed(frame: &FrameRef, err: impl ToString) -> DailiesError {
    DailiesError::frame(frame.frame_number, &frame.path, err)
}

/// Fatal error for a frame the encoder would not accept.
pub(crate) fn write_failed(frame: &FrameRef, err: impl std::fmt::Display) -> DailiesError {
    DailiesError::encoder(format!("frame {}: {err}", frame.label()))
}
