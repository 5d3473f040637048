//! Sound device: plays named theme sounds (or an explicit file override)
//! through the default audio sink, with per-feedback cancellation (§4.7).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use crate::error::FeedbackError;

/// Opaque handle returned by [`SoundDevice::play`], used to cancel a
/// specific in-flight sound without touching any other.
pub type SoundHandle = u64;

pub struct SoundDevice {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    sinks: HashMap<SoundHandle, Sink>,
    next_handle: SoundHandle,
}

impl SoundDevice {
    pub fn open() -> Result<Self, FeedbackError> {
        let (stream, stream_handle) = OutputStream::try_default().map_err(|e| FeedbackError::DeviceDriveError {
            device: "sound".into(),
            reason: e.to_string(),
        })?;
        Ok(SoundDevice { _stream: stream, stream_handle, sinks: HashMap::new(), next_handle: 1 })
    }

    /// Play `path`, returning a handle that [`end`](Self::end) can later cancel.
    pub fn play(&mut self, path: &Path) -> Result<SoundHandle, FeedbackError> {
        let file = std::fs::File::open(path)?;
        let source = Decoder::new(std::io::BufReader::new(file)).map_err(|e| FeedbackError::DeviceDriveError {
            device: "sound".into(),
            reason: e.to_string(),
        })?;
        let sink = Sink::try_new(&self.stream_handle).map_err(|e| FeedbackError::DeviceDriveError {
            device: "sound".into(),
            reason: e.to_string(),
        })?;
        sink.append(source);

        let handle = self.next_handle;
        self.next_handle += 1;
        self.sinks.insert(handle, sink);
        Ok(handle)
    }

    /// Stop and drop the sink for `handle`. Idempotent: ending an unknown
    /// or already-finished handle is not an error.
    pub fn end(&mut self, handle: SoundHandle) {
        if let Some(sink) = self.sinks.remove(&handle) {
            sink.stop();
        }
    }

    /// Drop sinks whose playback has finished naturally, so `end()` calls
    /// for stale handles stay cheap and the map doesn't grow unbounded.
    pub fn reap_finished(&mut self) {
        self.sinks.retain(|_, sink| !sink.empty());
    }

    pub fn is_playing(&self, handle: SoundHandle) -> bool {
        self.sinks.get(&handle).map(|s| !s.empty()).unwrap_or(false)
    }
}

/// Resolve a theme event name (e.g. `"message-new-instant"`) to a sound
/// file, following the freedesktop sound theme layout: `<dir>/<theme>/
/// stereo/<event-name>.<ext>`, falling back to the `freedesktop` theme,
/// then to any bare `<dir>/<event-name>.<ext>`.
pub fn resolve_sound_file(search_dirs: &[PathBuf], theme: &str, event_name: &str) -> Option<PathBuf> {
    const EXTENSIONS: &[&str] = &["oga", "ogg", "wav"];

    for dir in search_dirs {
        for candidate_theme in [theme, "freedesktop"] {
            for ext in EXTENSIONS {
                let path = dir.join(candidate_theme).join("stereo").join(format!("{}.{}", event_name, ext));
                if path.is_file() {
                    return Some(path);
                }
            }
        }
    }
    for dir in search_dirs {
        for ext in EXTENSIONS {
            let path = dir.join(format!("{}.{}", event_name, ext));
            if path.is_file() {
                return Some(path);
            }
        }
    }
    None
}

/// Default sound theme search path: `$XDG_DATA_HOME/sounds` then each
/// `$XDG_DATA_DIRS/sounds` entry, finally `/usr/share/sounds`.
pub fn default_sound_search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(data_home) = dirs::data_dir() {
        dirs.push(data_home.join("sounds"));
    }
    if let Ok(data_dirs) = std::env::var("XDG_DATA_DIRS") {
        for dir in data_dirs.split(':').filter(|s| !s.is_empty()) {
            dirs.push(PathBuf::from(dir).join("sounds"));
        }
    }
    dirs.push(PathBuf::from("/usr/share/sounds"));
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_event_sound_in_named_theme() {
        let tmp = tempfile::tempdir().unwrap();
        let stereo = tmp.path().join("my-theme").join("stereo");
        std::fs::create_dir_all(&stereo).unwrap();
        std::fs::write(stereo.join("click.oga"), b"fake").unwrap();

        let found = resolve_sound_file(&[tmp.path().to_path_buf()], "my-theme", "click");
        assert_eq!(found, Some(stereo.join("click.oga")));
    }

    #[test]
    fn falls_back_to_freedesktop_theme_when_named_theme_lacks_event() {
        let tmp = tempfile::tempdir().unwrap();
        let stereo = tmp.path().join("freedesktop").join("stereo");
        std::fs::create_dir_all(&stereo).unwrap();
        std::fs::write(stereo.join("bell.oga"), b"fake").unwrap();

        let found = resolve_sound_file(&[tmp.path().to_path_buf()], "my-theme", "bell");
        assert_eq!(found, Some(stereo.join("bell.oga")));
    }

    #[test]
    fn returns_none_when_no_candidate_exists() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(resolve_sound_file(&[tmp.path().to_path_buf()], "my-theme", "missing"), None);
    }
}
