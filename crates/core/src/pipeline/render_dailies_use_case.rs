use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::domain::settings_document::RenderSettings;
use crate::encoding::domain::encoder_command::{movie_path, EncoderCommand};
use crate::encoding::domain::encoder_sink::EncoderLauncher;
use crate::imaging::domain::color_transformer::ColorTransformer;
use crate::imaging::domain::frame_decoder::FrameDecoder;
use crate::imaging::domain::frame_transform::FrameTransformPipeline;
use crate::imaging::domain::geometry::plan_geometry;
use crate::sequence::domain::discovery_error::DiscoveryError;
use crate::sequence::domain::frame_locator::FrameLocator;
use crate::sequence::domain::frame_sequence::FrameSequence;
use crate::shared::error::DailiesError;
use crate::shared::frame_ref::FrameRef;
use crate::timecode::Timecode;

use super::pipeline_executor::{PipelineConfig, PipelineExecutor};
use super::pipeline_logger::{NullPipelineLogger, PipelineLogger};

/// Lifecycle of one render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Draining,
    Done,
    Failed,
}

/// Everything decided before the encoder starts.
pub struct RenderPlan {
    pub sequence: FrameSequence,
    /// Frames in the order they are fed to the encoder.
    pub frames: Vec<FrameRef>,
    pub transform: FrameTransformPipeline,
    pub start: Timecode,
    pub movie_path: PathBuf,
    pub command: EncoderCommand,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderReport {
    pub movie_path: PathBuf,
    pub frames_written: usize,
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
    pub encoder_output: String,
}

/// Streams an image sequence through the transform pipeline into one
/// encoder process.
///
/// [`prepare`](Self::prepare) does all the checking that needs no encoder:
/// frame discovery, the first frame's header, geometry and color
/// pre-flight, the encoder command. [`run`](Self::run) then launches the
/// encoder and feeds it. Any failure after launch kills the encoder and
/// removes the partial movie.
pub struct RenderDailiesUseCase {
    locator: Box<dyn FrameLocator>,
    decoder: Arc<dyn FrameDecoder>,
    color: Option<Arc<dyn ColorTransformer>>,
    launcher: Box<dyn EncoderLauncher>,
    executor: Box<dyn PipelineExecutor>,
    logger: Box<dyn PipelineLogger>,
    on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    cancelled: Arc<AtomicBool>,
    state: RunState,
}

impl RenderDailiesUseCase {
    pub fn new(
        locator: Box<dyn FrameLocator>,
        decoder: Arc<dyn FrameDecoder>,
        launcher: Box<dyn EncoderLauncher>,
        executor: Box<dyn PipelineExecutor>,
    ) -> Self {
        Self {
            locator,
            decoder,
            color: None,
            launcher,
            executor,
            logger: Box::new(NullPipelineLogger),
            on_progress: None,
            cancelled: Arc::new(AtomicBool::new(false)),
            state: RunState::NotStarted,
        }
    }

    pub fn with_color_transformer(mut self, color: Arc<dyn ColorTransformer>) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_progress(mut self, on_progress: Box<dyn Fn(usize, usize) -> bool + Send>) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    /// Shares a flag that, once set, stops the run before the next frame.
    pub fn with_cancel_flag(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn prepare(&self, input: &Path, settings: &RenderSettings) -> Result<RenderPlan, DailiesError> {
        let sequence = self.locator.locate(input)?;
        let frames = sequence.feed_ordered();
        let first = frames.first().ok_or_else(|| DiscoveryError::NoFrames {
            pattern: input.display().to_string(),
        })?;

        let (width, height) = self
            .decoder
            .dimensions(&first.path)
            .map_err(|e| DailiesError::frame(first.frame_number, &first.path, e))?;
        let geometry = plan_geometry(width, height, &settings.globals)?;
        log::debug!("Geometry for {width}x{height} source: {geometry:?}");

        let transform = FrameTransformPipeline::new(
            settings,
            geometry,
            self.decoder.clone(),
            self.color.clone(),
        )?;

        let start = Timecode::from_frames(settings.globals.framerate, 0)
            + sequence.first_frame_number().unwrap_or(0);
        let movie_path = movie_path(settings, &sequence.directory, &sequence.base_name);
        let command = EncoderCommand::build(settings, geometry.output, &start, &movie_path);

        Ok(RenderPlan {
            sequence,
            frames,
            transform,
            start,
            movie_path,
            command,
        })
    }

    pub fn run(&mut self, plan: RenderPlan) -> Result<RenderReport, DailiesError> {
        let started = Instant::now();
        self.state = RunState::Running;
        let result = self.stream(&plan, started);
        self.state = if result.is_ok() {
            RunState::Done
        } else {
            RunState::Failed
        };
        result
    }

    /// [`prepare`](Self::prepare) then [`run`](Self::run).
    pub fn execute(&mut self, input: &Path, settings: &RenderSettings) -> Result<RenderReport, DailiesError> {
        let plan = self.prepare(input, settings).map_err(|e| {
            self.state = RunState::Failed;
            e
        })?;
        self.run(plan)
    }

    fn stream(&mut self, plan: &RenderPlan, started: Instant) -> Result<RenderReport, DailiesError> {
        if let Some(dir) = plan.movie_path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let shape = plan.transform.output_shape();
        self.logger.info(&format!(
            "Encoding {} frames at {}x{} to {}",
            plan.frames.len(),
            shape.width,
            shape.height,
            plan.movie_path.display()
        ));
        log::debug!("{}", plan.command);

        let mut sink = self
            .launcher
            .launch(&plan.command, shape)
            .map_err(|e| DailiesError::encoder(format!("failed to start encoder: {e}")))?;

        let config = PipelineConfig {
            on_progress: self.on_progress.take(),
            cancelled: self.cancelled.clone(),
        };
        let fed = self.executor.execute(
            &plan.frames,
            &plan.transform,
            sink.as_mut(),
            &config,
            self.logger.as_mut(),
        );

        let frames_written = match fed {
            Ok(n) => n,
            Err(err) => {
                let output = match sink.abort() {
                    Ok(outcome) => outcome.output,
                    Err(e) => format!("could not stop encoder: {e}"),
                };
                discard_partial(&plan.movie_path);
                return Err(match err {
                    DailiesError::Encoder { message, .. } => {
                        log_encoder_output(&output);
                        DailiesError::Encoder { message, output }
                    }
                    other => other,
                });
            }
        };

        self.state = RunState::Draining;
        let outcome = match sink.finish() {
            Ok(outcome) => outcome,
            Err(e) => {
                discard_partial(&plan.movie_path);
                return Err(DailiesError::encoder(format!(
                    "{} did not finish cleanly: {e}",
                    plan.command.program
                )));
            }
        };
        if !outcome.success() {
            log_encoder_output(&outcome.output);
            discard_partial(&plan.movie_path);
            let status = outcome
                .exit_code
                .map_or_else(|| "was killed".to_string(), |c| format!("exited with status {c}"));
            return Err(DailiesError::Encoder {
                message: format!("{} {status}", plan.command.program),
                output: outcome.output,
            });
        }

        let elapsed = started.elapsed();
        self.logger.summary();
        Ok(RenderReport {
            movie_path: plan.movie_path.clone(),
            frames_written,
            exit_code: outcome.exit_code,
            elapsed,
            encoder_output: outcome.output,
        })
    }
}

fn log_encoder_output(output: &str) {
    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        log::error!("encoder: {line}");
    }
}

fn discard_partial(path: &Path) {
    if path.exists() {
        match fs::remove_file(path) {
            Ok(()) => log::warn!("Removed incomplete movie {}", path.display()),
            Err(e) => log::warn!("Could not remove incomplete movie {}: {e}", path.display()),
        }
    }
}
