use std::fs;
use std::io::{BufWriter, Read, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::{self, JoinHandle};

use crate::encoding::domain::encoder_command::EncoderCommand;
use crate::encoding::domain::encoder_sink::{EncoderLauncher, EncoderOutcome, EncoderSink};
use crate::shared::error::BoxError;
use crate::shared::pixel_buffer::{FrameShape, PixelBuffer};

/// Launches the encoder as a child process fed through its stdin.
///
/// Stdout and stderr are drained on background threads so a chatty
/// encoder never blocks on a full pipe while we are still writing frames.
pub struct ProcessEncoderLauncher;

impl ProcessEncoderLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProcessEncoderLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderLauncher for ProcessEncoderLauncher {
    fn launch(
        &self,
        command: &EncoderCommand,
        shape: FrameShape,
    ) -> Result<Box<dyn EncoderSink>, BoxError> {
        if let Some(parent) = command.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to start {}: {e}", command.program))?;

        let stdin = child
            .stdin
            .take()
            .ok_or("failed to open encoder stdin")?;
        let drains = [
            drain(child.stdout.take().map(|s| Box::new(s) as Box<dyn Read + Send>)),
            drain(child.stderr.take().map(|s| Box::new(s) as Box<dyn Read + Send>)),
        ]
        .into_iter()
        .flatten()
        .collect();

        log::debug!("Started {} (pid {})", command.program, child.id());
        Ok(Box::new(ProcessEncoderSink {
            program: command.program.clone(),
            shape,
            child: Some(child),
            stdin: Some(BufWriter::new(stdin)),
            drains,
        }))
    }
}

fn drain(reader: Option<Box<dyn Read + Send>>) -> Option<JoinHandle<String>> {
    reader.map(|mut reader| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = reader.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

struct ProcessEncoderSink {
    program: String,
    shape: FrameShape,
    child: Option<Child>,
    stdin: Option<BufWriter<ChildStdin>>,
    drains: Vec<JoinHandle<String>>,
}

impl ProcessEncoderSink {
    fn collect_output(&mut self) -> String {
        self.drains
            .drain(..)
            .filter_map(|h| h.join().ok())
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn wait(&mut self) -> Result<EncoderOutcome, BoxError> {
        let mut child = self.child.take().ok_or("encoder already finished")?;
        let status = child.wait()?;
        Ok(EncoderOutcome {
            exit_code: status.code(),
            output: self.collect_output(),
        })
    }
}

impl EncoderSink for ProcessEncoderSink {
    fn write_frame(&mut self, frame: &PixelBuffer) -> Result<(), BoxError> {
        let shape = frame.shape();
        if shape != self.shape {
            return Err(format!(
                "frame size mismatch: got {}x{}x{} {:?}, expected {}x{}x{} {:?}",
                shape.width,
                shape.height,
                shape.channels,
                shape.sample_type,
                self.shape.width,
                self.shape.height,
                self.shape.channels,
                self.shape.sample_type
            )
            .into());
        }
        let stdin = self.stdin.as_mut().ok_or("encoder input is already closed")?;
        frame
            .write_raw(stdin)
            .map_err(|e| format!("failed to write frame to {}: {e}", self.program))?;
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<EncoderOutcome, BoxError> {
        let flushed = match self.stdin.take() {
            Some(mut stdin) => stdin.flush(),
            None => Ok(()),
        };
        let outcome = self.wait()?;
        if let Err(e) = flushed {
            if outcome.success() {
                return Err(format!("failed to flush frames to {}: {e}", self.program).into());
            }
            log::debug!("Flush to {} failed after it exited: {e}", self.program);
        }
        Ok(outcome)
    }

    fn abort(mut self: Box<Self>) -> Result<EncoderOutcome, BoxError> {
        drop(self.stdin.take());
        if let Some(child) = self.child.as_mut() {
            let _ = child.kill();
        }
        self.wait()
    }
}

impl Drop for ProcessEncoderSink {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::shared::pixel_buffer::SampleType;
    use std::path::PathBuf;

    fn shell(script: &str, output: PathBuf) -> EncoderCommand {
        EncoderCommand {
            program: "sh".into(),
            args: vec![
                "-c".into(),
                script.into(),
                output.to_string_lossy().into_owned(),
            ],
            output_path: output,
        }
    }

    fn frame(value: u8) -> PixelBuffer {
        PixelBuffer::from_u8(vec![value; 4 * 2 * 3], 4, 2, 3, None)
    }

    #[test]
    fn test_frames_reach_encoder_stdin_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("movies").join("a.raw");
        let cmd = shell("cat > \"$0\"", out.clone());

        let mut sink = ProcessEncoderLauncher::new()
            .launch(&cmd, FrameShape::rgb(4, 2, SampleType::U8))
            .unwrap();
        sink.write_frame(&frame(1)).unwrap();
        sink.write_frame(&frame(2)).unwrap();
        let outcome = sink.finish().unwrap();

        assert!(outcome.success());
        let bytes = fs::read(&out).unwrap();
        assert_eq!(bytes.len(), 2 * 24);
        assert!(bytes[..24].iter().all(|&b| b == 1));
        assert!(bytes[24..].iter().all(|&b| b == 2));
    }

    #[test]
    fn test_sixteen_bit_frames_are_little_endian() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a.raw");
        let cmd = shell("cat > \"$0\"", out.clone());

        let mut sink = ProcessEncoderLauncher::new()
            .launch(&cmd, FrameShape::rgb(1, 1, SampleType::U16))
            .unwrap();
        sink.write_frame(&PixelBuffer::from_u16(vec![0x0102, 0, 0xffff], 1, 1, 3, None))
            .unwrap();
        sink.finish().unwrap();

        assert_eq!(fs::read(&out).unwrap(), vec![0x02, 0x01, 0, 0, 0xff, 0xff]);
    }

    #[test]
    fn test_nonzero_exit_reports_code_and_output() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = shell(
            "cat > /dev/null; echo 'unknown encoder' >&2; exit 3",
            dir.path().join("a.mov"),
        );

        let sink = ProcessEncoderLauncher::new()
            .launch(&cmd, FrameShape::rgb(4, 2, SampleType::U8))
            .unwrap();
        let outcome = sink.finish().unwrap();

        assert_eq!(outcome.exit_code, Some(3));
        assert!(outcome.output.contains("unknown encoder"));
    }

    #[test]
    fn test_shape_mismatch_is_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a.raw");
        let cmd = shell("cat > \"$0\"", out.clone());

        let mut sink = ProcessEncoderLauncher::new()
            .launch(&cmd, FrameShape::rgb(8, 8, SampleType::U8))
            .unwrap();
        assert!(sink.write_frame(&frame(1)).is_err());
        sink.finish().unwrap();

        assert_eq!(fs::read(&out).unwrap().len(), 0);
    }

    #[test]
    fn test_abort_kills_encoder() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = shell("exec sleep 30", dir.path().join("a.mov"));

        let sink = ProcessEncoderLauncher::new()
            .launch(&cmd, FrameShape::rgb(4, 2, SampleType::U8))
            .unwrap();
        let outcome = sink.abort().unwrap();

        assert!(!outcome.success());
    }

    #[test]
    fn test_missing_program_fails_to_launch() {
        let cmd = EncoderCommand {
            program: "no-such-encoder-xyz".into(),
            args: vec![],
            output_path: PathBuf::from("a.mov"),
        };
        let err = ProcessEncoderLauncher::new()
            .launch(&cmd, FrameShape::rgb(1, 1, SampleType::U8))
            .err()
            .unwrap();
        assert!(err.to_string().contains("no-such-encoder-xyz"));
    }
}
