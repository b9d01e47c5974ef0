use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};

use crate::encoding::domain::encoder_sink::EncoderSink;
use crate::imaging::domain::frame_transform::FrameTransformPipeline;
use crate::pipeline::pipeline_executor::{
    frame_failed, write_failed, PipelineConfig, PipelineExecutor,
};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::error::DailiesError;
use crate::shared::frame_ref::FrameRef;
use crate::shared::pixel_buffer::PixelBuffer;

const FRAMES_IN_FLIGHT_PER_WORKER: usize = 2;

type Job<'a> = (usize, &'a FrameRef);
type Done = (usize, Result<(PixelBuffer, f64), DailiesError>);

/// Transforms frames on a pool of worker threads while the calling thread
/// writes them to the encoder strictly in order.
///
/// Layout: `feeder → workers [transform] → main [reorder → sink]`
///
/// A credit channel caps the frames between the feeder and the sink at
/// `workers * 2`, so memory stays bounded however slow a single frame is.
pub struct ThreadedPipelineExecutor {
    workers: usize,
}

impl ThreadedPipelineExecutor {
    /// `0` uses one worker per logical CPU.
    pub fn new(workers: usize) -> Self {
        let workers = if workers == 0 {
            num_cpus::get()
        } else {
            workers
        };
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    fn window(&self) -> usize {
        self.workers * FRAMES_IN_FLIGHT_PER_WORKER
    }
}

impl Default for ThreadedPipelineExecutor {
    fn default() -> Self {
        Self::new(0)
    }
}

impl PipelineExecutor for ThreadedPipelineExecutor {
    fn execute(
        &self,
        frames: &[FrameRef],
        transform: &FrameTransformPipeline,
        sink: &mut dyn EncoderSink,
        config: &PipelineConfig,
        logger: &mut dyn PipelineLogger,
    ) -> Result<usize, DailiesError> {
        if frames.is_empty() {
            return Ok(0);
        }
        let window = self.window().min(frames.len());
        let stop = AtomicBool::new(false);

        let (job_tx, job_rx) = crossbeam_channel::bounded::<Job>(window);
        let (done_tx, done_rx) = crossbeam_channel::bounded::<Done>(window);
        let (credit_tx, credit_rx) = crossbeam_channel::bounded::<()>(window);
        for _ in 0..window {
            let _ = credit_tx.send(());
        }

        thread::scope(|s| {
            let stop = &stop;
            let cancelled = config.cancelled.clone();
            let feeder = s.spawn(move || feed(frames, job_tx, credit_rx, cancelled, stop));

            let workers: Vec<_> = (0..self.workers)
                .map(|_| {
                    let jobs = job_rx.clone();
                    let done = done_tx.clone();
                    s.spawn(move || work(transform, jobs, done, stop))
                })
                .collect();
            drop(job_rx);
            drop(done_tx);

            let mut result = write_in_order(frames, done_rx, credit_tx, sink, config, logger);
            if result.is_err() {
                stop.store(true, Ordering::Relaxed);
            }

            let mut panicked = feeder.join().is_err();
            for handle in workers {
                panicked |= handle.join().is_err();
            }
            if panicked && result.is_ok() {
                result = Err(DailiesError::encoder("a pipeline thread panicked"));
            }
            result
        })
    }
}

/// Hands out frame indices, one per credit.
fn feed<'a>(
    frames: &'a [FrameRef],
    jobs: Sender<Job<'a>>,
    credits: Receiver<()>,
    cancelled: Arc<AtomicBool>,
    stop: &AtomicBool,
) {
    for job in frames.iter().enumerate() {
        if credits.recv().is_err()
            || stop.load(Ordering::Relaxed)
            || cancelled.load(Ordering::Relaxed)
        {
            break;
        }
        if jobs.send(job).is_err() {
            break;
        }
    }
}

fn work(
    transform: &FrameTransformPipeline,
    jobs: Receiver<Job>,
    done: Sender<Done>,
    stop: &AtomicBool,
) {
    for (index, frame) in jobs {
        if stop.load(Ordering::Relaxed) {
            break;
        }
        let t0 = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| transform.transform(frame)))
            .unwrap_or_else(|_| Err("transform panicked".into()))
            .map(|buffer| (buffer, t0.elapsed().as_secs_f64() * 1000.0))
            .map_err(|e| frame_failed(frame, e));
        if done.send((index, result)).is_err() {
            break;
        }
    }
}

/// Collects finished frames, holding early arrivals back until every
/// frame before them has been written.
fn write_in_order(
    frames: &[FrameRef],
    done: Receiver<Done>,
    credits: Sender<()>,
    sink: &mut dyn EncoderSink,
    config: &PipelineConfig,
    logger: &mut dyn PipelineLogger,
) -> Result<usize, DailiesError> {
    let total = frames.len();
    let mut pending: BTreeMap<usize, PixelBuffer> = BTreeMap::new();
    let mut next = 0;

    for (index, result) in done {
        if config.is_cancelled() {
            return Err(DailiesError::Cancelled);
        }
        let (buffer, transform_ms) = result?;
        logger.timing("transform", transform_ms);
        pending.insert(index, buffer);
        logger.metric("reorder_depth", pending.len() as f64);

        while let Some(buffer) = pending.remove(&next) {
            if config.is_cancelled() {
                return Err(DailiesError::Cancelled);
            }
            let frame = &frames[next];
            let t0 = Instant::now();
            sink.write_frame(&buffer)
                .map_err(|e| write_failed(frame, e))?;
            logger.timing("write", t0.elapsed().as_secs_f64() * 1000.0);
            next += 1;
            log::info!("Processing frame {}: \t{next:04} of {total:04}", frame.label());
            logger.progress(next, total);
            config.report(next, total);
            let _ = credits.send(());
        }
        if next == total {
            break;
        }
    }

    if next == total {
        return Ok(next);
    }
    if config.is_cancelled() {
        return Err(DailiesError::Cancelled);
    }
    Err(frame_failed(
        &frames[next],
        "transform workers stopped before this frame",
    ))
}
