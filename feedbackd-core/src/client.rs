//! Client registration: tracks which events belong to which bus name, so a
//! name owner disappearing cascades into cancelling its events (§3 "Client
//! registration").

use std::collections::{HashMap, HashSet};

use feedbackd_types::EventId;

#[derive(Default)]
struct ClientInfo {
    active_event_ids: HashSet<EventId>,
}

/// Owned exclusively by the orchestrator, alongside the event table.
#[derive(Default)]
pub struct ClientRegistry {
    clients: HashMap<String, ClientInfo>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        ClientRegistry::default()
    }

    pub fn register_event(&mut self, bus_name: &str, event_id: EventId) {
        self.clients.entry(bus_name.to_string()).or_default().active_event_ids.insert(event_id);
    }

    pub fn unregister_event(&mut self, event_id: EventId) {
        for info in self.clients.values_mut() {
            info.active_event_ids.remove(&event_id);
        }
    }

    /// Remove the client's registration entirely, returning every event id
    /// it still owned so the caller can cancel each one.
    pub fn remove_client(&mut self, bus_name: &str) -> Vec<EventId> {
        self.clients.remove(bus_name).map(|info| info.active_event_ids.into_iter().collect()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disconnect_returns_every_event_owned_by_that_client() {
        let mut registry = ClientRegistry::new();
        registry.register_event(":1.42", EventId::new(1));
        registry.register_event(":1.42", EventId::new(2));
        registry.register_event(":1.7", EventId::new(3));

        let mut cancelled = registry.remove_client(":1.42");
        cancelled.sort();
        assert_eq!(cancelled, vec![EventId::new(1), EventId::new(2)]);
        assert!(registry.remove_client(":1.7").contains(&EventId::new(3)));
    }

    #[test]
    fn unregistering_a_single_event_leaves_others_intact() {
        let mut registry = ClientRegistry::new();
        registry.register_event(":1.42", EventId::new(1));
        registry.register_event(":1.42", EventId::new(2));

        registry.unregister_event(EventId::new(1));

        let remaining = registry.remove_client(":1.42");
        assert_eq!(remaining, vec![EventId::new(2)]);
    }

    #[test]
    fn disconnecting_an_unknown_client_returns_empty() {
        let mut registry = ClientRegistry::new();
        assert!(registry.remove_client(":1.99").is_empty());
    }
}
