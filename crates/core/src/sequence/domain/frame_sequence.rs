use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;

use crate::shared::frame_ref::FrameRef;

/// A discovered sequence: where it lives, its shared name and its frames
/// in lexicographic filename order.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSequence {
    pub directory: PathBuf,
    pub base_name: String,
    pub extension: String,
    pub frames: Vec<FrameRef>,
}

impl FrameSequence {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames in the order they must reach the encoder.
    pub fn feed_ordered(&self) -> Vec<FrameRef> {
        let mut frames = self.frames.clone();
        frames.sort_by(FrameRef::feed_order);
        frames
    }

    /// Lowest frame number in the sequence, used to offset the start timecode.
    pub fn first_frame_number(&self) -> Option<i64> {
        self.frames.iter().filter_map(|f| f.frame_number).min()
    }
}

fn frame_suffix() -> &'static Regex {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    SUFFIX.get_or_init(|| {
        Regex::new(r"^(?P<base>.*?)[_.](?:\d+|%0?\d*d|#+|@+)$").expect("valid frame suffix regex")
    })
}

/// Strips a trailing `_`/`.` separated frame number or padding token
/// (`1001`, `%04d`, `####`, `@@@@`) from a file stem.
pub fn base_name(stem: &str) -> &str {
    match frame_suffix().captures(stem).and_then(|c| c.name("base")) {
        Some(base) => base.as_str(),
        None => stem,
    }
}

/// The number after the last `_` or `.` of a file stem, when that run is
/// purely numeric.
pub fn frame_number(stem: &str) -> Option<i64> {
    let (_, run) = stem.rsplit_once(['_', '.'])?;
    if run.is_empty() || !run.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    run.parse().ok()
}
