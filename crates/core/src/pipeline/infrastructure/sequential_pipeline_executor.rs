use std::time::Instant;

use crate::encoding::domain::encoder_sink::EncoderSink;
use crate::imaging::domain::frame_transform::FrameTransformPipeline;
use crate::pipeline::pipeline_executor::{
    frame_failed, write_failed, PipelineConfig, PipelineExecutor,
};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::error::DailiesError;
use crate::shared::frame_ref::FrameRef;

/// Transforms and writes one frame at a time on the calling thread.
pub struct SequentialPipelineExecutor;

impl PipelineExecutor for SequentialPipelineExecutor {
    fn execute(
        &self,
        frames: &[FrameRef],
        transform: &FrameTransformPipeline,
        sink: &mut dyn EncoderSink,
        config: &PipelineConfig,
        logger: &mut dyn PipelineLogger,
    ) -> Result<usize, DailiesError> {
        let total = frames.len();
        for (written, frame) in frames.iter().enumerate() {
            if config.is_cancelled() {
                return Err(DailiesError::Cancelled);
            }

            let t0 = Instant::now();
            let buffer = transform
                .transform(frame)
                .map_err(|e| frame_failed(frame, e))?;
            logger.timing("transform", t0.elapsed().as_secs_f64() * 1000.0);

            let t0 = Instant::now();
            sink.write_frame(&buffer)
                .map_err(|e| write_failed(frame, e))?;
            logger.timing("write", t0.elapsed().as_secs_f64() * 1000.0);

            log::info!(
                "Processing frame {}: \t{:04} of {total:04}",
                frame.label(),
                written + 1
            );
            logger.progress(written + 1, total);
            config.report(written + 1, total);
        }
        Ok(total)
    }
}
