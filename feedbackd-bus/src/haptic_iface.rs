//! The conditional `Haptic` bus interface: a direct pattern RPC bypassing
//! the theme/event machinery entirely, published only when a vibrator
//! device was discovered at startup (§4.6).

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use feedbackd_core::device::Devices;
use zbus::interface;

pub const HAPTIC_INTERFACE: &str = "org.sigxcpu.Feedback.Haptic";

pub struct HapticIface {
    devices: Rc<RefCell<Devices>>,
    /// Bumped on every `Vibrate` call; a running pattern task checks it
    /// before each step and abandons itself once superseded — the single
    /// physical motor means the most recent caller always wins (§4.6).
    generation: Rc<Cell<u64>>,
}

impl HapticIface {
    pub fn new(devices: Rc<RefCell<Devices>>) -> Self {
        HapticIface { devices, generation: Rc::new(Cell::new(0)) }
    }
}

#[interface(name = "org.sigxcpu.Feedback.Haptic")]
impl HapticIface {
    /// `Vibrate(app_id, pattern)`. An empty pattern cancels whatever is
    /// currently running; a non-empty one replaces it immediately — the
    /// superseded caller receives no explicit notification.
    async fn vibrate(&self, _app_id: &str, pattern: Vec<(f64, u32)>) -> zbus::fdo::Result<()> {
        for (magnitude, _) in &pattern {
            if !(0.0..=1.0).contains(magnitude) {
                return Err(zbus::fdo::Error::InvalidArgs(format!(
                    "magnitude {} out of range [0,1]",
                    magnitude
                )));
            }
        }

        let gen = self.generation.get() + 1;
        self.generation.set(gen);

        if let Some(haptic) = self.devices.borrow_mut().haptic.as_mut() {
            let _ = haptic.stop();
        }
        if pattern.is_empty() {
            return Ok(());
        }

        let devices = self.devices.clone();
        let generation = self.generation.clone();
        tokio::task::spawn_local(async move {
            for (magnitude, duration_ms) in pattern {
                if generation.get() != gen {
                    return;
                }
                if let Some(haptic) = devices.borrow_mut().haptic.as_mut() {
                    let _ = haptic.play(magnitude, duration_ms);
                }
                tokio::time::sleep(Duration::from_millis(duration_ms as u64)).await;
            }
            if generation.get() == gen {
                if let Some(haptic) = devices.borrow_mut().haptic.as_mut() {
                    let _ = haptic.stop();
                }
            }
        });
        Ok(())
    }
}
