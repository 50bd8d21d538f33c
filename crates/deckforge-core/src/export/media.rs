//! Media references in field values.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static SOUND_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[sound:(.+)\]$").expect("sound tag pattern is valid"));

/// File extensions bundled into packages.
pub const MEDIA_EXTENSIONS: &[&str] = &["mp3", "png", "jpg", "jpeg", "gif"];

/// File name a field value refers to, if it looks like a media file.
///
/// `[sound:name.mp3]` is unwrapped first. Only bare file names with a known
/// extension qualify; anything with a directory component is ignored.
pub fn media_reference(value: &str) -> Option<&str> {
    let name = SOUND_TAG
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(value);

    let extension = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    if !MEDIA_EXTENSIONS.contains(&extension.as_str()) {
        return None;
    }
    let file_name = Path::new(name).file_name()?.to_str()?;
    if file_name != name {
        return None;
    }
    Some(name)
}

/// Collects media files referenced by packed fields.
#[derive(Debug, Clone)]
pub struct MediaCollector {
    media_dir: PathBuf,
    found: Vec<PathBuf>,
}

impl MediaCollector {
    pub fn new(media_dir: impl Into<PathBuf>) -> Self {
        Self {
            media_dir: media_dir.into(),
            found: Vec::new(),
        }
    }

    /// Register the file `value` refers to, if any and if it exists.
    ///
    /// Missing files are logged and skipped.
    pub fn scan(&mut self, value: &str) {
        let Some(name) = media_reference(value) else {
            return;
        };
        let path = self.media_dir.join(name);
        if !path.is_file() {
            warn!(file = %path.display(), "Referenced media file not found; skipping");
            return;
        }
        if !self.found.contains(&path) {
            self.found.push(path);
        }
    }

    /// Files found so far, in discovery order.
    pub fn into_files(self) -> Vec<PathBuf> {
        self.found
    }
}
