//! The Orchestrator: the single owner of the event table and the client
//! registry, and the entry point `TriggerFeedback`/`EndFeedback` resolve
//! into (§4.1, §9).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use feedbackd_types::{EndReason, EventId, Hints};

use crate::client::ClientRegistry;
use crate::config::Settings;
use crate::device::Devices;
use crate::error::FeedbackError;
use crate::event::Event;
use crate::feedback::{CompletionMsg, RunContext};
use crate::theme::ThemeStore;

/// An event whose natural-expiry timer fired and needs cancelling with
/// reason `Expired`, posted on its own channel so the completion-queue
/// drain can apply it alongside ordinary feedback completions.
struct ExpireMsg(EventId);

pub struct Orchestrator {
    settings: Settings,
    theme: ThemeStore,
    devices: Rc<RefCell<Devices>>,
    events: HashMap<EventId, Event>,
    next_id: u32,
    clients: ClientRegistry,
    completion_tx: crossbeam_channel::Sender<CompletionMsg>,
    completion_rx: crossbeam_channel::Receiver<CompletionMsg>,
    expire_tx: crossbeam_channel::Sender<ExpireMsg>,
    expire_rx: crossbeam_channel::Receiver<ExpireMsg>,
}

impl Orchestrator {
    pub fn new(settings: Settings, theme: ThemeStore, devices: Devices) -> Self {
        let (completion_tx, completion_rx) = crossbeam_channel::unbounded();
        let (expire_tx, expire_rx) = crossbeam_channel::unbounded();
        Orchestrator {
            settings,
            theme,
            devices: Rc::new(RefCell::new(devices)),
            events: HashMap::new(),
            next_id: 0,
            clients: ClientRegistry::new(),
            completion_tx,
            completion_rx,
            expire_tx,
            expire_rx,
        }
    }

    pub fn profile(&self) -> feedbackd_types::ProfileLevel {
        self.settings.profile()
    }

    /// Update the active profile, persist it, and report whether the bus
    /// layer should emit a `PropertiesChanged` for `Profile`.
    pub fn set_profile(&mut self, level: feedbackd_types::ProfileLevel) {
        self.settings.set_profile(level);
    }

    pub fn has_haptic(&self) -> bool {
        self.devices.borrow().has_haptic()
    }

    /// Shared handle to the device set, for bus-layer features that bypass
    /// the event/feedback machinery entirely (the `Haptic.Vibrate` direct
    /// pattern RPC, §4.6).
    pub fn devices(&self) -> Rc<RefCell<Devices>> {
        self.devices.clone()
    }

    /// Reload the active theme from disk. In-flight events are unaffected —
    /// they already hold their constructed feedback objects (§4.2, §9).
    pub fn reload_theme(&mut self) -> Result<(), FeedbackError> {
        self.theme.reload()
    }

    /// Build an owned context-factory closure for `event_id` — owned
    /// (cloned `Rc`/channel handles, not a borrow of `self`) so it can be
    /// handed to `Event::start`/`end_all` while `self.events` is mutably
    /// borrowed.
    fn ctx_factory(&self, event_id: EventId) -> impl Fn(usize) -> RunContext {
        let devices = self.devices.clone();
        let theme = self.theme.clone();
        let completions = self.completion_tx.clone();
        move |feedback_index| RunContext { event_id, feedback_index, devices: devices.clone(), theme: theme.clone(), completions: completions.clone() }
    }

    /// `TriggerFeedback(app_id, event, hints, timeout) -> id`. Resolves the
    /// effective profile level, looks up the theme, constructs and starts
    /// the event, arms its timeout, and registers it to `bus_name` for
    /// disconnect-cascade cancellation.
    pub fn trigger_feedback(&mut self, bus_name: &str, app_id: &str, event_name: &str, hints: Hints, timeout_s: i32) -> EventId {
        self.next_id += 1;
        let id = EventId::new(self.next_id);

        let per_app = self.settings.per_app_override(app_id);
        let level = hints.effective_level(self.settings.profile(), per_app);
        let specs = self.theme.resolve(level, event_name);

        let ctx_fn = self.ctx_factory(id);
        let mut event = Event::new(id, app_id.to_string(), event_name.to_string(), hints, timeout_s, &specs);
        event.start(ctx_fn);

        self.clients.register_event(bus_name, id);
        self.arm_timeout(id, timeout_s);
        self.events.insert(id, event);
        id
    }

    /// `timeout_s`: `-1` natural (no timer), `0` loop forever (no timer,
    /// only explicit end), `>0` expire after N seconds.
    fn arm_timeout(&self, id: EventId, timeout_s: i32) {
        if timeout_s <= 0 {
            return;
        }
        let expire_tx = self.expire_tx.clone();
        tokio::task::spawn_local(async move {
            tokio::time::sleep(Duration::from_secs(timeout_s as u64)).await;
            let _ = expire_tx.send(ExpireMsg(id));
        });
    }

    /// `EndFeedback(id)`. Idempotent: ending an already-ended or unknown
    /// event is not an error (§8 Testable Property 8).
    pub fn end_feedback(&mut self, id: EventId) {
        let ctx_fn = self.ctx_factory(id);
        let Some(event) = self.events.get_mut(&id) else { return };
        if event.is_ended() {
            return;
        }
        event.end_all(ctx_fn);
    }

    /// A bus name vanished: cancel every event it still owns (§3, §9
    /// "Cancellation").
    pub fn on_client_disconnected(&mut self, bus_name: &str) {
        for id in self.clients.remove_client(bus_name) {
            self.end_feedback(id);
        }
    }

    /// SIGTERM/SIGINT: cancel every outstanding event before the process
    /// releases its devices and exits.
    pub fn cancel_all(&mut self) {
        let ids: Vec<EventId> = self.events.keys().copied().collect();
        for id in ids {
            self.end_feedback(id);
        }
    }

    /// Drain the completion and expiry queues, fold each into its event,
    /// and return the events that just transitioned to `Ended` so the bus
    /// layer can emit `FeedbackEnded(id, reason)` for each.
    pub fn drain_completions(&mut self) -> Vec<(EventId, EndReason)> {
        while let Ok(ExpireMsg(id)) = self.expire_rx.try_recv() {
            let ctx_fn = self.ctx_factory(id);
            if let Some(event) = self.events.get_mut(&id) {
                if !event.is_ended() {
                    event.force_reason(EndReason::Expired);
                    event.end_all(ctx_fn);
                }
            }
        }

        let mut ended = Vec::new();
        while let Ok(msg) = self.completion_rx.try_recv() {
            if let Some(event) = self.events.get_mut(&msg.event_id) {
                if event.record_completion(msg.reason) {
                    ended.push((msg.event_id, event.end_reason()));
                }
            }
        }

        for (id, _) in &ended {
            self.events.remove(id);
            self.clients.unregister_event(*id);
        }
        ended
    }
}
