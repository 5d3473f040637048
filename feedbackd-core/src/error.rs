//! The daemon's error taxonomy (§7 of the design).
//!
//! These are kinds, not exception hierarchies: most of them are handled
//! locally (logged, and the affected feedback or theme file is skipped)
//! rather than propagated. Only [`ThemeMissing`](FeedbackError::ThemeMissing)
//! is fatal; only [`InvalidArgument`](FeedbackError::InvalidArgument) and
//! [`UnknownEventId`](FeedbackError::UnknownEventId) cross the RPC boundary.

use std::fmt;

/// Error taxonomy for theme loading, device driving, and RPC validation.
#[derive(Debug)]
pub enum FeedbackError {
    /// Malformed theme JSON or an unknown feedback variant tag.
    ThemeParseError { path: String, reason: String },
    /// No theme found, including the `default` fallback. Fatal at init.
    ThemeMissing { candidates: Vec<String> },
    /// A parent theme chain references itself, directly or transitively.
    CyclicThemeParent { chain: Vec<String> },
    /// A feedback variant has no eligible device (e.g. `Led` with no LEDs present).
    NoDeviceForFeedback { variant: &'static str },
    /// A sysfs or ioctl write to a device failed.
    DeviceDriveError { device: String, reason: String },
    /// An RPC argument failed validation (magnitude range, pattern length, unknown color, ...).
    InvalidArgument(String),
    /// I/O failure loading a theme file or settings file.
    Io(std::io::Error),
}

impl fmt::Display for FeedbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackError::ThemeParseError { path, reason } => {
                write!(f, "failed to parse theme {}: {}", path, reason)
            }
            FeedbackError::ThemeMissing { candidates } => {
                write!(f, "no theme found (tried: {})", candidates.join(", "))
            }
            FeedbackError::CyclicThemeParent { chain } => {
                write!(f, "cyclic theme parent chain: {}", chain.join(" -> "))
            }
            FeedbackError::NoDeviceForFeedback { variant } => {
                write!(f, "no device available for {} feedback", variant)
            }
            FeedbackError::DeviceDriveError { device, reason } => {
                write!(f, "device {} drive error: {}", device, reason)
            }
            FeedbackError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            FeedbackError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for FeedbackError {}

impl From<std::io::Error> for FeedbackError {
    fn from(e: std::io::Error) -> Self {
        FeedbackError::Io(e)
    }
}
