//! The `Feedback` bus interface: `TriggerFeedback`, `EndFeedback`, the
//! `FeedbackEnded` signal, and the read-write `Profile` property (§6).

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use feedbackd_core::orchestrator::Orchestrator;
use feedbackd_types::{Hints, ProfileLevel};
use zbus::object_server::SignalEmitter;
use zbus::{interface, zvariant::Value};

pub const BUS_NAME: &str = "org.sigxcpu.Feedback";
pub const OBJECT_PATH: &str = "/org/sigxcpu/Feedback";
pub const FEEDBACK_INTERFACE: &str = "org.sigxcpu.Feedback";

pub struct FeedbackIface {
    pub orchestrator: Rc<RefCell<Orchestrator>>,
}

fn parse_hints(raw: BTreeMap<String, Value<'_>>) -> Hints {
    let mut hints = Hints::default();
    if let Some(Value::Str(level)) = raw.get("profile") {
        hints.profile = ProfileLevel::parse(level.as_str());
    }
    if let Some(Value::Bool(important)) = raw.get("important") {
        hints.important = *important;
    }
    if let Some(Value::Str(file)) = raw.get("sound-file") {
        hints.sound_file = Some(file.as_str().to_string());
    }
    hints
}

#[interface(name = "org.sigxcpu.Feedback")]
impl FeedbackIface {
    /// `TriggerFeedback(app_id, event, hints, timeout) -> id`.
    async fn trigger_feedback(
        &self,
        #[zbus(header)] header: zbus::message::Header<'_>,
        app_id: &str,
        event: &str,
        hints: BTreeMap<String, Value<'_>>,
        timeout: i32,
    ) -> zbus::fdo::Result<u32> {
        let bus_name = header.sender().map(|n| n.to_string()).unwrap_or_default();
        let hints = parse_hints(hints);
        let id = self.orchestrator.borrow_mut().trigger_feedback(&bus_name, app_id, event, hints, timeout);
        Ok(id.get())
    }

    /// `EndFeedback(id) -> ()`. Idempotent.
    async fn end_feedback(&self, id: u32) -> zbus::fdo::Result<()> {
        self.orchestrator.borrow_mut().end_feedback(feedbackd_types::EventId::new(id));
        Ok(())
    }

    /// `FeedbackEnded(id, reason)` — `reason`: 0 Natural, 1 Expired, 2 Explicit, 3 NotFound.
    #[zbus(signal)]
    pub async fn feedback_ended(emitter: &SignalEmitter<'_>, id: u32, reason: u32) -> zbus::Result<()>;

    #[zbus(property)]
    fn profile(&self) -> String {
        self.orchestrator.borrow().profile().as_str().to_string()
    }

    #[zbus(property)]
    fn set_profile(&self, value: String) -> zbus::fdo::Result<()> {
        let level = ProfileLevel::parse(&value)
            .ok_or_else(|| zbus::fdo::Error::InvalidArgs(format!("unknown profile level: {}", value)))?;
        self.orchestrator.borrow_mut().set_profile(level);
        Ok(())
    }
}
