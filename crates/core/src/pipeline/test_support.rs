//! Stubs shared by the executor and use-case tests.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::domain::codec_settings::CodecSettings;
use crate::config::domain::global_settings::GlobalSettings;
use crate::config::domain::settings_document::RenderSettings;
use crate::encoding::domain::encoder_command::EncoderCommand;
use crate::encoding::domain::encoder_sink::{EncoderLauncher, EncoderOutcome, EncoderSink};
use crate::imaging::domain::frame_decoder::FrameDecoder;
use crate::imaging::domain::frame_transform::FrameTransformPipeline;
use crate::imaging::domain::geometry::plan_geometry;
use crate::imaging::domain::working_image::WorkingImage;
use crate::sequence::domain::frame_sequence::frame_number;
use crate::shared::error::BoxError;
use crate::shared::frame_ref::FrameRef;
use crate::shared::pixel_buffer::{FrameShape, PixelBuffer};

/// Fills every sample of frame `n` with `n / 255`, so the 8-bit output
/// carries the frame number.
pub struct NumberedDecoder {
    pub width: u32,
    pub height: u32,
    pub fail_on: Option<i64>,
    pub panic_on: Option<i64>,
    /// Sleep so that lower frame numbers finish last.
    pub stagger_ms: u64,
}

impl NumberedDecoder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fail_on: None,
            panic_on: None,
            stagger_ms: 0,
        }
    }
}

impl FrameDecoder for NumberedDecoder {
    fn decode(&self, path: &Path) -> Result<WorkingImage, BoxError> {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let n = frame_number(stem).unwrap_or(0);
        if self.fail_on == Some(n) {
            return Err(format!("corrupt frame {n}").into());
        }
        if self.panic_on == Some(n) {
            panic!("decoder crashed on {n}");
        }
        if self.stagger_ms > 0 {
            let delay = (20 - n.clamp(0, 20)) as u64 * self.stagger_ms;
            std::thread::sleep(Duration::from_millis(delay));
        }
        Ok(WorkingImage::filled(
            self.width,
            self.height,
            3,
            (n % 256) as f32 / 255.0,
        ))
    }

    fn dimensions(&self, _path: &Path) -> Result<(u32, u32), BoxError> {
        Ok((self.width, self.height))
    }
}

pub fn render_settings(globals: GlobalSettings) -> RenderSettings {
    RenderSettings {
        codec_key: "h264_hq".into(),
        globals,
        codec: CodecSettings::default(),
    }
}

pub fn transform_for(decoder: NumberedDecoder) -> FrameTransformPipeline {
    let settings = render_settings(GlobalSettings::default());
    let geometry = plan_geometry(decoder.width, decoder.height, &settings.globals).unwrap();
    FrameTransformPipeline::new(&settings, geometry, Arc::new(decoder), None).unwrap()
}

pub fn frames(numbers: &[i64]) -> Vec<FrameRef> {
    numbers
        .iter()
        .map(|n| FrameRef::new(format!("/shots/plate.{n:04}.png"), Some(*n)))
        .collect()
}

#[derive(Debug, Default)]
pub struct SinkLog {
    /// First sample of every frame written, i.e. its frame number.
    pub written: Vec<u16>,
    pub shapes: Vec<FrameShape>,
    pub finished: bool,
    pub aborted: bool,
}

pub struct RecordingSink {
    pub log: Arc<Mutex<SinkLog>>,
    pub fail_on_write: Option<usize>,
    pub fail_on_finish: bool,
    pub exit_code: Option<i32>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(SinkLog::default())),
            fail_on_write: None,
            fail_on_finish: false,
            exit_code: Some(0),
        }
    }
}

impl EncoderSink for RecordingSink {
    fn write_frame(&mut self, frame: &PixelBuffer) -> Result<(), BoxError> {
        let mut log = self.log.lock().unwrap();
        if self.fail_on_write == Some(log.written.len()) {
            return Err("Broken pipe".into());
        }
        log.written.push(frame.sample(0, 0, 0));
        log.shapes.push(frame.shape());
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<EncoderOutcome, BoxError> {
        self.log.lock().unwrap().finished = true;
        if self.fail_on_finish {
            return Err("wait failed: interrupted".into());
        }
        Ok(EncoderOutcome {
            exit_code: self.exit_code,
            output: "encoder says hi".into(),
        })
    }

    fn abort(self: Box<Self>) -> Result<EncoderOutcome, BoxError> {
        self.log.lock().unwrap().aborted = true;
        Ok(EncoderOutcome {
            exit_code: None,
            output: "killed".into(),
        })
    }
}

/// Hands out [`RecordingSink`]s sharing one log and records every launch.
pub struct RecordingLauncher {
    pub log: Arc<Mutex<SinkLog>>,
    pub launches: Arc<Mutex<Vec<(EncoderCommand, FrameShape)>>>,
    pub fail_on_write: Option<usize>,
    pub fail_on_finish: bool,
    pub exit_code: Option<i32>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(SinkLog::default())),
            launches: Arc::new(Mutex::new(Vec::new())),
            fail_on_write: None,
            fail_on_finish: false,
            exit_code: Some(0),
        }
    }
}

impl EncoderLauncher for RecordingLauncher {
    fn launch(
        &self,
        command: &EncoderCommand,
        shape: FrameShape,
    ) -> Result<Box<dyn EncoderSink>, BoxError> {
        self.launches.lock().unwrap().push((command.clone(), shape));
        Ok(Box::new(RecordingSink {
            log: self.log.clone(),
            fail_on_write: self.fail_on_write,
            fail_on_finish: self.fail_on_finish,
            exit_code: self.exit_code,
        }))
    }
}
