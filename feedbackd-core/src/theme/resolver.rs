use std::cell::RefCell;
use std::rc::Rc;

use feedbackd_types::{FeedbackSpec, ProfileLevel};

use crate::error::FeedbackError;

use super::loader::load_active_theme;
use super::model::Theme;

/// Holds the daemon's active theme and swaps it atomically on reload.
///
/// In-flight events keep their already-constructed `Feedback` instances —
/// they reference devices, not theme entries — so a swap here never
/// disturbs anything currently running (§4.2 "SIGHUP path").
#[derive(Clone)]
pub struct ThemeStore {
    active: Rc<RefCell<Theme>>,
}

impl ThemeStore {
    pub fn load() -> Result<Self, FeedbackError> {
        let theme = load_active_theme()?;
        Ok(ThemeStore { active: Rc::new(RefCell::new(theme)) })
    }

    /// Reload the active theme from disk, replacing the current one.
    /// On failure the previous theme is kept and the error is returned.
    pub fn reload(&self) -> Result<(), FeedbackError> {
        let theme = load_active_theme()?;
        *self.active.borrow_mut() = theme;
        Ok(())
    }

    pub fn resolve(&self, level: ProfileLevel, event_name: &str) -> Vec<FeedbackSpec> {
        self.active.borrow().resolve(level, event_name)
    }

    pub fn name(&self) -> String {
        self.active.borrow().name.clone()
    }
}
