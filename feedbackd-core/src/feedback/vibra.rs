use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use feedbackd_types::{EndReason, VibraPatternSpec, VibraPeriodicSpec, VibraRumbleSpec};

use crate::error::FeedbackError;

use super::{FeedbackRunner, FeedbackState, RunContext};

/// Default re-trigger interval for an "infinite" periodic rumble, since the
/// underlying force-feedback effect is always uploaded with a finite length.
const PERIODIC_RETRIGGER_MS: u32 = 500;

fn stop_haptic(ctx: &RunContext) {
    if let Some(haptic) = ctx.devices.borrow_mut().haptic.as_mut() {
        let _ = haptic.stop();
    }
}

/// Plays a single periodic effect `count` times with `pause_ms` gaps between
/// repetitions, then reports natural completion (§4.3 "VibraRumble").
pub struct VibraRumbleFeedback {
    spec: VibraRumbleSpec,
    state: FeedbackState,
    ended: Rc<RefCell<bool>>,
}

impl VibraRumbleFeedback {
    pub fn new(spec: VibraRumbleSpec) -> Self {
        VibraRumbleFeedback { spec, state: FeedbackState::None, ended: Rc::new(RefCell::new(false)) }
    }
}

impl FeedbackRunner for VibraRumbleFeedback {
    fn run(&mut self, ctx: RunContext) -> Result<(), FeedbackError> {
        self.state = FeedbackState::Running;
        if ctx.devices.borrow().haptic.is_none() {
            return Err(FeedbackError::NoDeviceForFeedback { variant: "VibraRumble" });
        }

        let spec = self.spec.clone();
        let ended = self.ended.clone();
        tokio::task::spawn_local(async move {
            for rep in 0..spec.count {
                if *ended.borrow() {
                    ctx.complete(EndReason::Explicit);
                    return;
                }
                if let Some(haptic) = ctx.devices.borrow_mut().haptic.as_mut() {
                    let _ = haptic.play(spec.magnitude, spec.duration);
                }
                tokio::time::sleep(Duration::from_millis(spec.duration as u64)).await;
                if rep + 1 < spec.count {
                    tokio::time::sleep(Duration::from_millis(spec.pause as u64)).await;
                }
            }
            stop_haptic(&ctx);
            if *ended.borrow() {
                ctx.complete(EndReason::Explicit);
            } else {
                ctx.complete(EndReason::Natural);
            }
        });
        Ok(())
    }

    fn end(&mut self, ctx: &RunContext) {
        self.state = FeedbackState::Ending;
        *self.ended.borrow_mut() = true;
        stop_haptic(ctx);
    }

    fn state(&self) -> FeedbackState {
        self.state
    }
}

/// Uploads a periodic effect and re-triggers it until `end()` or the
/// event's own timeout fires (§4.3 "VibraPeriodic").
pub struct VibraPeriodicFeedback {
    spec: VibraPeriodicSpec,
    state: FeedbackState,
    ended: Rc<RefCell<bool>>,
}

impl VibraPeriodicFeedback {
    pub fn new(spec: VibraPeriodicSpec) -> Self {
        VibraPeriodicFeedback { spec, state: FeedbackState::None, ended: Rc::new(RefCell::new(false)) }
    }
}

impl FeedbackRunner for VibraPeriodicFeedback {
    fn run(&mut self, ctx: RunContext) -> Result<(), FeedbackError> {
        self.state = FeedbackState::Running;
        if ctx.devices.borrow().haptic.is_none() {
            return Err(FeedbackError::NoDeviceForFeedback { variant: "VibraPeriodic" });
        }

        let magnitude = self.spec.magnitude;
        let ended = self.ended.clone();
        tokio::task::spawn_local(async move {
            loop {
                if *ended.borrow() {
                    stop_haptic(&ctx);
                    ctx.complete(EndReason::Explicit);
                    return;
                }
                if let Some(haptic) = ctx.devices.borrow_mut().haptic.as_mut() {
                    let _ = haptic.play(magnitude, PERIODIC_RETRIGGER_MS);
                }
                tokio::time::sleep(Duration::from_millis(PERIODIC_RETRIGGER_MS as u64)).await;
            }
        });
        Ok(())
    }

    fn end(&mut self, ctx: &RunContext) {
        self.state = FeedbackState::Ending;
        *self.ended.borrow_mut() = true;
        stop_haptic(ctx);
    }

    fn state(&self) -> FeedbackState {
        self.state
    }
}

/// Sequences `(magnitudes[i], durations_ms[i])` back to back, uploading a
/// fresh effect at each step boundary (§4.3 "VibraPattern").
pub struct VibraPatternFeedback {
    spec: VibraPatternSpec,
    state: FeedbackState,
    ended: Rc<RefCell<bool>>,
}

impl VibraPatternFeedback {
    pub fn new(spec: VibraPatternSpec) -> Self {
        VibraPatternFeedback { spec, state: FeedbackState::None, ended: Rc::new(RefCell::new(false)) }
    }
}

impl FeedbackRunner for VibraPatternFeedback {
    fn run(&mut self, ctx: RunContext) -> Result<(), FeedbackError> {
        self.state = FeedbackState::Running;
        if ctx.devices.borrow().haptic.is_none() {
            return Err(FeedbackError::NoDeviceForFeedback { variant: "VibraPattern" });
        }

        let spec = self.spec.clone();
        let ended = self.ended.clone();
        tokio::task::spawn_local(async move {
            for (magnitude, duration_ms) in spec.magnitudes.iter().zip(spec.durations.iter()) {
                if *ended.borrow() {
                    ctx.complete(EndReason::Explicit);
                    return;
                }
                if let Some(haptic) = ctx.devices.borrow_mut().haptic.as_mut() {
                    let _ = haptic.play(*magnitude, *duration_ms);
                }
                tokio::time::sleep(Duration::from_millis(*duration_ms as u64)).await;
            }
            stop_haptic(&ctx);
            if *ended.borrow() {
                ctx.complete(EndReason::Explicit);
            } else {
                ctx.complete(EndReason::Natural);
            }
        });
        Ok(())
    }

    fn end(&mut self, ctx: &RunContext) {
        self.state = FeedbackState::Ending;
        *self.ended.borrow_mut() = true;
        stop_haptic(ctx);
    }

    fn state(&self) -> FeedbackState {
        self.state
    }
}
