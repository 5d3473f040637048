//! # feedbackd-core
//!
//! Backend library for the feedback daemon. Provides theme loading and
//! resolution, the device drivers (LED, haptic, sound), the polymorphic
//! feedback objects, the per-event aggregator, and the orchestrator that
//! ties RPC requests to running feedbacks — independent of any bus
//! transport.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use feedbackd_core::config::Settings;
//! use feedbackd_core::theme::Theme;
//! use feedbackd_core::device::Devices;
//! use feedbackd_core::orchestrator::Orchestrator;
//!
//! let settings = Settings::load();
//! let theme = Theme::load_active(None)?;
//! let devices = Devices::discover();
//! let mut orchestrator = Orchestrator::new(settings, theme, devices);
//!
//! let id = orchestrator.trigger_feedback("org.example.App", "phone-incoming-call", Default::default(), -1);
//! // ... drain orchestrator.completions() on every dispatcher turn ...
//! ```
//!
//! ## Module overview
//!
//! - [`config`] — daemon settings (profile, theme name, per-app overrides),
//!   persisted as TOML with an embedded-default + user-file merge.
//! - [`theme`] — theme file model, search-path loader, parent-chain
//!   resolution.
//! - [`device`] — the LED set, the haptic (vibrator) device, and the sound
//!   device — the three backends feedbacks are driven through.
//! - [`feedback`] — the polymorphic `Feedback` trait and its six variants.
//! - [`event`] — the per-event aggregator (`Event`), holding N concurrent
//!   feedbacks and their combined end-reason.
//! - [`orchestrator`] — the `Orchestrator`, the single owner of the event
//!   table and the client registry; the entry point for `TriggerFeedback`
//!   and `EndFeedback`.
//! - [`client`] — per-bus-name client registration and disconnect cascade.
//! - [`error`] — the daemon's error taxonomy.

pub mod client;
pub mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod feedback;
pub mod orchestrator;
pub mod theme;
