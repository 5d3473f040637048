use std::path::PathBuf;

use feedbackd_types::{ColorTag, LedSpec};

use crate::error::FeedbackError;

use super::{FeedbackRunner, FeedbackState, RunContext};

/// Drives an LED at the requested color and blink frequency until `end()` —
/// LED feedback never completes on its own (§4.3 "Led": "considered
/// infinite otherwise").
pub struct LedFeedback {
    spec: LedSpec,
    state: FeedbackState,
    driven_path: Option<PathBuf>,
}

impl LedFeedback {
    pub fn new(spec: LedSpec) -> Self {
        LedFeedback { spec, state: FeedbackState::None, driven_path: None }
    }
}

impl FeedbackRunner for LedFeedback {
    fn run(&mut self, ctx: RunContext) -> Result<(), FeedbackError> {
        self.state = FeedbackState::Running;
        let color = ColorTag::parse(&self.spec.color)
            .ok_or_else(|| FeedbackError::InvalidArgument(format!("unknown LED color: {}", self.spec.color)))?;

        let path = ctx.devices.borrow().leds.drive_for_color(color, self.spec.frequency, self.spec.max_brightness)?;
        self.driven_path = Some(path);
        Ok(())
    }

    fn end(&mut self, ctx: &RunContext) {
        self.state = FeedbackState::Ending;
        if let Some(path) = &self.driven_path {
            let _ = ctx.devices.borrow().leds.stop_path(path);
        }
        ctx.complete(feedbackd_types::EndReason::Explicit);
    }

    fn state(&self) -> FeedbackState {
        self.state
    }
}
