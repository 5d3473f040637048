//! # feedbackd-types
//!
//! Shared type definitions for the feedbackd ecosystem: the runtime event
//! model, the feedback variant tags, and the small value types (profile
//! levels, LED colors, end reasons) that cross the boundary between the
//! daemon core and its bus-facing RPC layer.

mod color;
mod end_reason;
mod feedback_spec;
mod hints;
mod profile;

pub use color::ColorTag;
pub use end_reason::EndReason;
pub use feedback_spec::{FeedbackSpec, LedSpec, SoundSpec, VibraPatternSpec, VibraPeriodicSpec, VibraRumbleSpec};
pub use hints::Hints;
pub use profile::ProfileLevel;

/// Server-allocated, monotone, nonzero identifier for a triggered event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct EventId(u32);

impl EventId {
    /// Wrap a raw id. Panics if `id == 0` — ids are allocated starting at 1.
    pub fn new(id: u32) -> Self {
        assert!(id > 0, "EventId cannot be zero");
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
