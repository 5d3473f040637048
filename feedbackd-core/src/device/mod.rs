//! Device layer: LED, haptic, and sound drivers, and the `Devices` handle
//! the orchestrator constructs once at startup (§4.5-§4.7).

pub mod haptic;
pub mod led;
pub mod sound;

pub use haptic::HapticDevice;
pub use led::LedSet;
pub use sound::SoundDevice;

use crate::error::FeedbackError;

/// All hardware the daemon drives, discovered once at startup. `haptic` is
/// `None` on systems with no vibrator — callers use that to decide whether
/// to publish the `Haptic` bus interface at all (§1).
pub struct Devices {
    pub leds: LedSet,
    pub haptic: Option<HapticDevice>,
    pub sound: Option<SoundDevice>,
}

impl Devices {
    /// Probe every subsystem. A missing sound card or vibrator is not
    /// fatal — only the feedback variants that need it become unavailable.
    pub fn discover() -> Self {
        let leds = LedSet::discover();
        let haptic = HapticDevice::discover();
        let sound = match SoundDevice::open() {
            Ok(device) => Some(device),
            Err(e) => {
                log::warn!(target: "orchestrator", "no sound output available: {}", e);
                None
            }
        };
        Devices { leds, haptic, sound }
    }

    pub fn has_haptic(&self) -> bool {
        self.haptic.is_some()
    }

    pub fn require_sound(&mut self) -> Result<&mut SoundDevice, FeedbackError> {
        self.sound.as_mut().ok_or(FeedbackError::NoDeviceForFeedback { variant: "Sound" })
    }

    pub fn require_haptic(&mut self) -> Result<&mut HapticDevice, FeedbackError> {
        self.haptic.as_mut().ok_or(FeedbackError::NoDeviceForFeedback { variant: "Vibra" })
    }
}
