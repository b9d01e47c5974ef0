use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::domain::settings_document::RenderSettings;
use crate::timecode::Timecode;

/// A fully resolved encoder invocation reading raw video from stdin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncoderCommand {
    pub program: String,
    pub args: Vec<String>,
    pub output_path: PathBuf,
}

impl EncoderCommand {
    /// Builds the command line. Input framing comes first, then every
    /// non-empty codec option in a fixed order, then the output path, so
    /// equal inputs always give an identical command.
    pub fn build(
        settings: &RenderSettings,
        frame_size: (u32, u32),
        start: &Timecode,
        output_path: &Path,
    ) -> Self {
        let codec = &settings.codec;
        let framerate = settings.globals.framerate.to_string();

        let mut args: Vec<String> = vec![
            "-y".into(),
            "-f".into(),
            "rawvideo".into(),
            "-pixel_format".into(),
            settings.sample_type().raw_pixel_format().into(),
            "-video_size".into(),
            format!("{}x{}", frame_size.0, frame_size.1),
            "-framerate".into(),
            framerate.clone(),
            "-i".into(),
            "pipe:0".into(),
            "-timecode".into(),
            start.to_string(),
        ];

        push_text(&mut args, "-c:v", &codec.codec);
        push_text(&mut args, "-profile:v", &codec.profile);
        push_number(&mut args, "-qscale:v", codec.qscale);
        push_text(&mut args, "-preset", &codec.preset);
        push_number(&mut args, "-g", codec.keyint.map(f64::from));
        push_number(&mut args, "-bf", codec.bframes.map(f64::from));
        push_text(&mut args, "-tune", &codec.tune);
        push_number(&mut args, "-crf", codec.crf);
        push_text(&mut args, "-pix_fmt", &codec.pix_fmt);
        args.push("-r".into());
        args.push(framerate);
        push_text(&mut args, "-vf", &codec.vf);
        push_text(&mut args, "-vendor", &codec.vendor);
        push_text(&mut args, "-metadata:s", &codec.metadata_s);
        push_text(&mut args, "-b:v", &codec.bitrate);

        args.push(output_path.to_string_lossy().into_owned());

        Self {
            program: settings.encoder_program().to_string(),
            args,
            output_path: output_path.to_path_buf(),
        }
    }
}

impl fmt::Display for EncoderCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// `<dir>/<movie_location>/<base>[_<codec label>].<ext>`
pub fn movie_path(settings: &RenderSettings, sequence_dir: &Path, base_name: &str) -> PathBuf {
    let globals = &settings.globals;
    let mut name = base_name.to_string();
    if globals.movie_append_codec {
        name.push('_');
        name.push_str(settings.codec_label());
    }
    name.push('.');
    name.push_str(globals.movie_ext());

    let mut dir = sequence_dir.to_path_buf();
    if let Some(location) = &globals.movie_location {
        dir.push(location);
    }
    dir.join(name)
}

fn push_text(args: &mut Vec<String>, flag: &str, value: &Option<String>) {
    if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}

fn push_number(args: &mut Vec<String>, flag: &str, value: Option<f64>) {
    if let Some(value) = value.filter(|v| *v != 0.0) {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}
