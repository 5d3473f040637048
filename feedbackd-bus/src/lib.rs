//! D-Bus transport for feedbackd-core: the `Feedback` and conditional
//! `Haptic` interfaces, bus-name-loss watching, and the dispatcher loop
//! that ties it all to a single-threaded tokio `LocalSet`.

mod feedback_iface;
mod haptic_iface;
mod name_watcher;
mod service;

pub use feedback_iface::{BUS_NAME, OBJECT_PATH};
pub use service::run;
