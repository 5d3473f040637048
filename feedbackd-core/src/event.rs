//! The per-event aggregator: a set of concurrently running feedbacks, their
//! combined state, and the end reason reported once every constituent has
//! finished (§4.4).

use feedbackd_types::{EndReason, EventId, FeedbackSpec, Hints};

use crate::feedback::{build_with_hints, FeedbackRunner, FeedbackState, RunContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventState {
    None,
    Running,
    Ended,
    Errored,
}

pub struct Event {
    pub id: EventId,
    pub app_id: String,
    pub name: String,
    pub hints: Hints,
    pub timeout_s: i32,
    state: EventState,
    end_reason: EndReason,
    feedbacks: Vec<Box<dyn FeedbackRunner>>,
    pending: usize,
}

impl Event {
    /// Construct an event from the theme-resolved specs for this
    /// `(profile, event-name)` pair. An empty spec list means the theme
    /// lookup found nothing — the event is born already `Ended(NotFound)`,
    /// never transitioning through `Running` (§3 "Event (runtime)").
    pub fn new(id: EventId, app_id: String, name: String, hints: Hints, timeout_s: i32, specs: &[FeedbackSpec]) -> Self {
        let feedbacks: Vec<Box<dyn FeedbackRunner>> = specs.iter().map(|s| build_with_hints(s, &hints)).collect();
        let pending = feedbacks.len();
        let (state, end_reason) =
            if feedbacks.is_empty() { (EventState::Ended, EndReason::NotFound) } else { (EventState::None, EndReason::Natural) };
        Event { id, app_id, name, hints, timeout_s, state, end_reason, feedbacks, pending }
    }

    pub fn state(&self) -> EventState {
        self.state
    }

    pub fn end_reason(&self) -> EndReason {
        self.end_reason
    }

    /// Fold a reason in directly, without waiting for a feedback completion
    /// — used when the event's own timeout fires, since `Expired` must
    /// outrank whatever `Explicit` completions `end_all` triggers next.
    pub fn force_reason(&mut self, reason: EndReason) {
        self.end_reason = self.end_reason.merge(reason);
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.state, EventState::Ended)
    }

    /// Start every feedback, tagging each with its index via `ctx_for`. A
    /// feedback that fails to start counts as already-done (its failure is
    /// folded into the aggregate end reason rather than left dangling).
    ///
    /// An empty spec list (no theme match) never reaches the loop below —
    /// the event is already `Ended(NotFound)` from [`Event::new`], but
    /// nothing has told the orchestrator yet. Post the `NotFound`
    /// completion through the same channel every other feedback reports
    /// through, so `drain_completions` picks it up on its next turn instead
    /// of this event leaking in the table forever (§4.1, scenario S3).
    pub fn start(&mut self, ctx_for: impl Fn(usize) -> RunContext) {
        if self.feedbacks.is_empty() {
            ctx_for(0).complete(EndReason::NotFound);
            return;
        }
        self.state = EventState::Running;
        for (index, feedback) in self.feedbacks.iter_mut().enumerate() {
            if let Err(e) = feedback.run(ctx_for(index)) {
                log::warn!(target: "orchestrator", "feedback {} for event {} failed to start: {}", index, self.id, e);
                self.pending -= 1;
            }
        }
        // `pending` only reaches 0 here if every feedback failed to start —
        // successes never decrement it in this loop, only later through
        // `record_completion`. So "nothing ran" is exactly "pending == 0",
        // and a partial failure (some feedbacks still running) must not
        // drag the reason up to NotFound (§7: "if all fail ... else Natural").
        if self.pending == 0 {
            self.end_reason = self.end_reason.merge(EndReason::NotFound);
            self.state = EventState::Ended;
        }
    }

    /// Fold in a feedback's completion. Returns `true` once every feedback
    /// has reported, at which point the caller should emit `FeedbackEnded`.
    pub fn record_completion(&mut self, reason: EndReason) -> bool {
        self.end_reason = self.end_reason.merge(reason);
        self.pending = self.pending.saturating_sub(1);
        if self.pending == 0 {
            self.state = EventState::Ended;
            true
        } else {
            false
        }
    }

    /// Invoke `end()` on every feedback that hasn't already finished. Safe
    /// to call more than once — already-`Ended` feedbacks are skipped.
    pub fn end_all(&mut self, ctx_for: impl Fn(usize) -> RunContext) {
        for (index, feedback) in self.feedbacks.iter_mut().enumerate() {
            if feedback.state() != FeedbackState::Ended {
                let ctx = ctx_for(index);
                feedback.end(&ctx);
            }
        }
    }
}
