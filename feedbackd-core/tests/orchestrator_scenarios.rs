//! Scenario-level integration tests over the orchestrator/event/client
//! machinery, run against `Dummy` feedbacks so no real hardware is needed.
//!
//! These mutate `FEEDBACK_THEME` to point `ThemeStore::load` at a fixture
//! file, following the same pattern already used by
//! `feedbackd-core::theme::loader`'s own unit test — sequential by
//! necessity, so each test owns the env var for its own duration only.

use std::io::Write;
use std::time::Duration;

use feedbackd_core::config::Settings;
use feedbackd_core::device::Devices;
use feedbackd_core::orchestrator::Orchestrator;
use feedbackd_core::theme::ThemeStore;
use feedbackd_types::{EndReason, Hints, ProfileLevel};

const THEME_JSON: &str = r#"{
    "name": "test",
    "profiles": [
        { "name": "full", "feedbacks": [
            { "event-name": "click", "type": "Dummy" },
            { "event-name": "two-feedbacks", "type": "Dummy" }
        ] }
    ]
}"#;

fn load_test_theme() -> ThemeStore {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test-theme.json");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(THEME_JSON.as_bytes()).unwrap();

    std::env::set_var("FEEDBACK_THEME", &path);
    let theme = ThemeStore::load().expect("fixture theme should load");
    std::env::remove_var("FEEDBACK_THEME");
    // Keep the tempdir alive long enough for the load above; the loader
    // reads the file eagerly so it's safe to drop `dir` once this returns.
    theme
}

fn new_orchestrator() -> Orchestrator {
    Orchestrator::new(Settings::load(), load_test_theme(), Devices::discover())
}

async fn drain_until_ended(orchestrator: &mut Orchestrator, expect: usize) -> Vec<(feedbackd_types::EventId, EndReason)> {
    let mut collected = Vec::new();
    for _ in 0..200 {
        collected.extend(orchestrator.drain_completions());
        if collected.len() >= expect {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    collected
}

#[tokio::test]
async fn event_ids_are_unique_and_monotonic() {
    tokio::task::LocalSet::new()
        .run_until(async {
            let mut orchestrator = new_orchestrator();
            let a = orchestrator.trigger_feedback("org.example.App", "app", "click", Hints::default(), -1);
            let b = orchestrator.trigger_feedback("org.example.App", "app", "click", Hints::default(), -1);
            assert_ne!(a, b);
            assert!(b.get() > a.get());
        })
        .await;
}

#[tokio::test]
async fn unknown_event_name_ends_immediately_as_not_found() {
    tokio::task::LocalSet::new()
        .run_until(async {
            let mut orchestrator = new_orchestrator();
            orchestrator.trigger_feedback("org.example.App", "app", "no-such-event", Hints::default(), -1);
            let ended = drain_until_ended(&mut orchestrator, 1).await;
            assert_eq!(ended.len(), 1);
            assert_eq!(ended[0].1, EndReason::NotFound);
        })
        .await;
}

#[tokio::test]
async fn dummy_event_completes_naturally() {
    tokio::task::LocalSet::new()
        .run_until(async {
            let mut orchestrator = new_orchestrator();
            let id = orchestrator.trigger_feedback("org.example.App", "app", "click", Hints::default(), -1);
            let ended = drain_until_ended(&mut orchestrator, 1).await;
            assert_eq!(ended, vec![(id, EndReason::Natural)]);
        })
        .await;
}

#[tokio::test]
async fn event_with_multiple_feedbacks_waits_for_all_before_ending() {
    tokio::task::LocalSet::new()
        .run_until(async {
            let mut orchestrator = new_orchestrator();
            let id = orchestrator.trigger_feedback("org.example.App", "app", "two-feedbacks", Hints::default(), -1);
            let ended = drain_until_ended(&mut orchestrator, 1).await;
            assert_eq!(ended, vec![(id, EndReason::Natural)]);
        })
        .await;
}

#[tokio::test]
async fn end_feedback_is_idempotent() {
    tokio::task::LocalSet::new()
        .run_until(async {
            let mut orchestrator = new_orchestrator();
            let id = orchestrator.trigger_feedback("org.example.App", "app", "click", Hints::default(), -1);
            orchestrator.end_feedback(id);
            orchestrator.end_feedback(id);
            let ended = drain_until_ended(&mut orchestrator, 1).await;
            assert_eq!(ended.len(), 1);
        })
        .await;
}

#[tokio::test]
async fn client_disconnect_cancels_only_its_own_events() {
    tokio::task::LocalSet::new()
        .run_until(async {
            let mut orchestrator = new_orchestrator();
            let mine = orchestrator.trigger_feedback(":1.1", "app.a", "click", Hints::default(), -1);
            let theirs = orchestrator.trigger_feedback(":1.2", "app.b", "click", Hints::default(), -1);

            orchestrator.on_client_disconnected(":1.1");
            let ended = drain_until_ended(&mut orchestrator, 2).await;

            let mine_reason = ended.iter().find(|(id, _)| *id == mine).map(|(_, r)| *r);
            assert_eq!(mine_reason, Some(EndReason::Explicit));

            assert!(ended.iter().any(|(id, _)| *id == theirs));
        })
        .await;
}

#[tokio::test]
async fn silent_profile_without_per_app_override_still_resolves_full_entries_when_requested() {
    tokio::task::LocalSet::new()
        .run_until(async {
            let mut orchestrator = new_orchestrator();
            assert_eq!(orchestrator.profile(), ProfileLevel::Full);
            orchestrator.set_profile(ProfileLevel::Silent);
            assert_eq!(orchestrator.profile(), ProfileLevel::Silent);
            // "click" is only mapped under the "full" profile slice, so at
            // Silent (which only searches Silent) it resolves to no
            // feedbacks and ends immediately as NotFound.
            let id = orchestrator.trigger_feedback("org.example.App", "app", "click", Hints::default(), -1);
            let ended = drain_until_ended(&mut orchestrator, 1).await;
            assert_eq!(ended, vec![(id, EndReason::NotFound)]);
        })
        .await;
}
