use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::sequence::domain::discovery_error::DiscoveryError;
use crate::sequence::domain::frame_locator::FrameLocator;
use crate::sequence::domain::frame_sequence::{base_name, frame_number, FrameSequence};
use crate::shared::constants::RASTER_EXTENSIONS;
use crate::shared::frame_ref::FrameRef;

/// Discovers sequences on the local filesystem with a prefix glob.
#[derive(Clone, Debug, Default)]
pub struct GlobFrameLocator;

impl GlobFrameLocator {
    pub fn new() -> Self {
        Self
    }
}

impl FrameLocator for GlobFrameLocator {
    fn locate(&self, input: &Path) -> Result<FrameSequence, DiscoveryError> {
        let source = if input.is_dir() {
            first_raster_file(input)?
        } else {
            input.to_path_buf()
        };

        let directory = source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| DiscoveryError::InvalidPath(input.to_path_buf()))?;
        let extension = source
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let base = base_name(stem).to_string();

        let search_dir = if directory.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            directory.clone()
        };
        let pattern = format!(
            "{}*",
            glob::Pattern::escape(&search_dir.join(&base).to_string_lossy())
        );
        log::debug!("Globbing frames with {pattern}");

        let mut paths = Vec::new();
        for entry in glob::glob(&pattern).map_err(|e| DiscoveryError::Glob(e.to_string()))? {
            let path = entry.map_err(|e| DiscoveryError::Glob(e.to_string()))?;
            if path.is_file() && is_raster(&path) && belongs_to(&path, &base, &extension) {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(DiscoveryError::NoFrames { pattern });
        }

        let frames = to_frame_refs(paths)?;
        log::info!(
            "Found {} {} frames named {} in {}",
            frames.len(),
            extension,
            base,
            directory.display()
        );

        Ok(FrameSequence {
            directory,
            base_name: base,
            extension,
            frames,
        })
    }
}

fn is_raster(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            RASTER_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}

/// True when `path` is a frame of the `base` sequence in `extension`, so
/// proxies in another format and sibling sequences sharing the prefix
/// (`plate_matte` next to `plate`) stay out.
fn belongs_to(path: &Path, base: &str, extension: &str) -> bool {
    let same_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(extension.is_empty());
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    if !same_extension {
        return false;
    }

    if base_name(stem) == base {
        return true;
    }
    // Unnumbered members such as `plate.final` are still listed.
    frame_number(stem).is_none() && stem.rsplit_once(['_', '.']).map(|(head, _)| head) == Some(base)
}

fn first_raster_file(dir: &Path) -> Result<PathBuf, DiscoveryError> {
    let entries = fs::read_dir(dir).map_err(|e| DiscoveryError::Glob(e.to_string()))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_raster(p))
        .collect();
    files.sort();
    files
        .into_iter()
        .next()
        .ok_or_else(|| DiscoveryError::NoFrames {
            pattern: dir.join("*").to_string_lossy().into_owned(),
        })
}

fn to_frame_refs(paths: Vec<PathBuf>) -> Result<Vec<FrameRef>, DiscoveryError> {
    let mut seen: HashMap<i64, PathBuf> = HashMap::new();
    let mut frames = Vec::with_capacity(paths.len());
    for path in paths {
        let number = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(frame_number);
        match number {
            Some(n) => {
                if let Some(first) = seen.insert(n, path.clone()) {
                    return Err(DiscoveryError::DuplicateFrame {
                        number: n,
                        first,
                        second: path,
                    });
                }
            }
            None => log::warn!("No frame number in {}", path.display()),
        }
        frames.push(FrameRef::new(path, number));
    }
    Ok(frames)
}
