use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use feedbackd_types::{EndReason, SoundSpec};

use crate::device::sound::{default_sound_search_dirs, resolve_sound_file, SoundHandle};
use crate::error::FeedbackError;

use super::{FeedbackRunner, FeedbackState, RunContext};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

struct Shared {
    handle: Option<SoundHandle>,
    ended_explicitly: bool,
}

/// Plays the theme's named event sound (or, per hints, an explicit file
/// override applied upstream by the orchestrator) and reports completion
/// when the sink drains naturally or is cancelled (§4.3 "Sound").
pub struct SoundFeedback {
    spec: SoundSpec,
    file_override: Option<String>,
    state: FeedbackState,
    shared: Rc<RefCell<Shared>>,
}

impl SoundFeedback {
    pub fn new(spec: SoundSpec) -> Self {
        SoundFeedback {
            spec,
            file_override: None,
            state: FeedbackState::None,
            shared: Rc::new(RefCell::new(Shared { handle: None, ended_explicitly: false })),
        }
    }

    /// Hints may carry a `sound-file` override that takes precedence over
    /// the theme's `event-name` lookup.
    pub fn with_file_override(mut self, file: Option<String>) -> Self {
        self.file_override = file;
        self
    }
}

impl FeedbackRunner for SoundFeedback {
    fn run(&mut self, ctx: RunContext) -> Result<(), FeedbackError> {
        self.state = FeedbackState::Running;

        let path = match &self.file_override {
            Some(path) => Some(std::path::PathBuf::from(path)),
            None => {
                let theme_name = ctx.theme.name();
                resolve_sound_file(&default_sound_search_dirs(), &theme_name, &self.spec.event_name)
            }
        };

        let Some(path) = path else {
            log::warn!(target: "sound", "no sound file for event {}", self.spec.event_name);
            ctx.complete(EndReason::Natural);
            return Ok(());
        };

        let handle = {
            let mut devices = ctx.devices.borrow_mut();
            let sound = devices.require_sound()?;
            sound.play(&path)?
        };
        self.shared.borrow_mut().handle = Some(handle);

        let shared = self.shared.clone();
        tokio::task::spawn_local(async move {
            loop {
                tokio::time::sleep(POLL_INTERVAL).await;
                let mut s = shared.borrow_mut();
                let Some(h) = s.handle else { return };
                if s.ended_explicitly {
                    s.handle = None;
                    drop(s);
                    ctx.complete(EndReason::Explicit);
                    return;
                }
                let still_playing = ctx
                    .devices
                    .borrow_mut()
                    .sound
                    .as_ref()
                    .map(|sound| sound.is_playing(h))
                    .unwrap_or(false);
                if !still_playing {
                    s.handle = None;
                    drop(s);
                    ctx.complete(EndReason::Natural);
                    return;
                }
            }
        });

        Ok(())
    }

    fn end(&mut self, ctx: &RunContext) {
        self.state = FeedbackState::Ending;
        let mut shared = self.shared.borrow_mut();
        shared.ended_explicitly = true;
        if let Some(handle) = shared.handle {
            if let Some(sound) = ctx.devices.borrow_mut().sound.as_mut() {
                sound.end(handle);
            }
        }
    }

    fn state(&self) -> FeedbackState {
        self.state
    }
}
