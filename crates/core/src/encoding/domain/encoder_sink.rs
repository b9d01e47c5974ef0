use super::encoder_command::EncoderCommand;
use crate::shared::error::BoxError;
use crate::shared::pixel_buffer::{FrameShape, PixelBuffer};

/// How the encoder ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncoderOutcome {
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Everything the encoder printed on stdout and stderr.
    pub output: String,
}

impl EncoderOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Starts an encoder that accepts frames of exactly `shape`.
pub trait EncoderLauncher: Send + Sync {
    fn launch(
        &self,
        command: &EncoderCommand,
        shape: FrameShape,
    ) -> Result<Box<dyn EncoderSink>, BoxError>;
}

/// The input side of a running encoder.
///
/// Must be consumed by either [`finish`](EncoderSink::finish) or
/// [`abort`](EncoderSink::abort); implementations also clean up on drop.
pub trait EncoderSink: Send {
    /// Writes one frame as raw interleaved samples. Blocks while the
    /// encoder applies backpressure.
    fn write_frame(&mut self, frame: &PixelBuffer) -> Result<(), BoxError>;

    /// Closes the input stream and waits for the encoder to exit.
    fn finish(self: Box<Self>) -> Result<EncoderOutcome, BoxError>;

    /// Stops the encoder without letting it finalize the movie.
    fn abort(self: Box<Self>) -> Result<EncoderOutcome, BoxError>;
}
