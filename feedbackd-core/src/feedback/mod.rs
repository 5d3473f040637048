//! Polymorphic feedback objects: a tagged sum over the six variants a theme
//! can name, each implementing the same `run`/`end` contract and reporting
//! completion asynchronously through a shared channel (§4.3).

mod dummy;
mod led;
mod sound;
mod vibra;

use std::cell::RefCell;
use std::rc::Rc;

use feedbackd_types::{EventId, FeedbackSpec};

use crate::device::Devices;
use crate::error::FeedbackError;
use crate::theme::ThemeStore;

pub use dummy::DummyFeedback;
pub use led::LedFeedback;
pub use sound::SoundFeedback;
pub use vibra::{VibraPatternFeedback, VibraPeriodicFeedback, VibraRumbleFeedback};

/// One feedback's lifecycle state, independent of the owning event's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackState {
    None,
    Running,
    Ending,
    Ended,
}

/// Posted by a running feedback onto the dispatcher's completion queue when
/// it finishes, is cancelled, or errors — never delivered by direct callback
/// into the owning `Event`, to avoid reentrant mutation (§9 "design notes").
#[derive(Debug, Clone, Copy)]
pub struct CompletionMsg {
    pub event_id: EventId,
    pub feedback_index: usize,
    pub reason: feedbackd_types::EndReason,
}

/// Shared context a running feedback needs: which (event, index) to tag its
/// completion with, the devices to drive, the active theme (for sound
/// theme-name lookups), and where to post completions.
#[derive(Clone)]
pub struct RunContext {
    pub event_id: EventId,
    pub feedback_index: usize,
    pub devices: Rc<RefCell<Devices>>,
    pub theme: ThemeStore,
    pub completions: crossbeam_channel::Sender<CompletionMsg>,
}

impl RunContext {
    pub fn complete(&self, reason: feedbackd_types::EndReason) {
        let _ = self.completions.send(CompletionMsg {
            event_id: self.event_id,
            feedback_index: self.feedback_index,
            reason,
        });
    }
}

/// The `run`/`end` contract every feedback variant implements. `run` is
/// non-blocking; completion is always reported later through
/// [`RunContext::complete`], even when it happens "immediately" (on the next
/// dispatcher turn) — never by direct return (§4.3).
pub trait FeedbackRunner {
    fn run(&mut self, ctx: RunContext) -> Result<(), FeedbackError>;

    /// Idempotent: calling `end` before `run`'s effects are visible, or
    /// calling it twice, is always safe and never panics.
    fn end(&mut self, ctx: &RunContext);

    fn state(&self) -> FeedbackState;
}

/// Construct the concrete runner for a theme-resolved spec. Branches on the
/// JSON `type` tag already resolved into [`FeedbackSpec`] — no inheritance,
/// just a match (§9 "Polymorphic feedbacks").
pub fn build(spec: &FeedbackSpec) -> Box<dyn FeedbackRunner> {
    match spec {
        FeedbackSpec::Dummy => Box::new(DummyFeedback::new()),
        FeedbackSpec::Sound(s) => Box::new(SoundFeedback::new(s.clone())),
        FeedbackSpec::VibraRumble(r) => Box::new(VibraRumbleFeedback::new(r.clone())),
        FeedbackSpec::VibraPeriodic(p) => Box::new(VibraPeriodicFeedback::new(p.clone())),
        FeedbackSpec::VibraPattern(p) => Box::new(VibraPatternFeedback::new(p.clone())),
        FeedbackSpec::Led(l) => Box::new(LedFeedback::new(l.clone())),
    }
}

/// Like [`build`], but lets the triggering call's hints override a sound
/// feedback's file (`hints.sound-file`) — the only per-trigger override a
/// theme entry supports.
pub fn build_with_hints(spec: &FeedbackSpec, hints: &feedbackd_types::Hints) -> Box<dyn FeedbackRunner> {
    match spec {
        FeedbackSpec::Sound(s) => {
            Box::new(SoundFeedback::new(s.clone()).with_file_override(hints.sound_file.clone()))
        }
        other => build(other),
    }
}
