use feedbackd_types::EndReason;

use crate::error::FeedbackError;

use super::{FeedbackRunner, FeedbackState, RunContext};

/// Schedules an immediate `on_done(Natural)` on the next dispatcher turn —
/// used for theme entries that exist only to acknowledge an event with no
/// hardware effect.
pub struct DummyFeedback {
    state: FeedbackState,
}

impl DummyFeedback {
    pub fn new() -> Self {
        DummyFeedback { state: FeedbackState::None }
    }
}

impl FeedbackRunner for DummyFeedback {
    fn run(&mut self, ctx: RunContext) -> Result<(), FeedbackError> {
        self.state = FeedbackState::Running;
        tokio::task::spawn_local(async move {
            tokio::task::yield_now().await;
            ctx.complete(EndReason::Natural);
        });
        Ok(())
    }

    fn end(&mut self, _ctx: &RunContext) {
        self.state = FeedbackState::Ending;
    }

    fn state(&self) -> FeedbackState {
        self.state
    }
}
