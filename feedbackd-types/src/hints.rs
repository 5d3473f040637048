use crate::ProfileLevel;

/// Validated view of the `a{sv}` hints bag passed to `TriggerFeedback`.
///
/// Unknown keys are ignored at the RPC boundary; this type is the only shape
/// the core ever sees — no untyped map crosses into the orchestration logic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hints {
    /// Requested profile level — only honored when `important` is set.
    pub profile: Option<ProfileLevel>,
    /// Allows `profile` to override a lower global level upward.
    pub important: bool,
    /// Absolute path forcing a specific sound feedback payload.
    pub sound_file: Option<String>,
}

impl Hints {
    /// Resolve the effective profile level given the global level and any
    /// per-app override, per the precedence in §4.1: per-app override beats
    /// the `important` hint, which in turn beats the global level.
    pub fn effective_level(&self, global_level: ProfileLevel, per_app_override: Option<ProfileLevel>) -> ProfileLevel {
        if let Some(level) = per_app_override {
            return level;
        }
        if self.important {
            if let Some(requested) = self.profile {
                return requested;
            }
        }
        global_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn important_hint_overrides_global_level() {
        let hints = Hints {
            profile: Some(ProfileLevel::Full),
            important: true,
            sound_file: None,
        };
        assert_eq!(hints.effective_level(ProfileLevel::Silent, None), ProfileLevel::Full);
    }

    #[test]
    fn non_important_hint_is_ignored() {
        let hints = Hints {
            profile: Some(ProfileLevel::Full),
            important: false,
            sound_file: None,
        };
        assert_eq!(hints.effective_level(ProfileLevel::Silent, None), ProfileLevel::Silent);
    }

    #[test]
    fn per_app_override_wins_over_hint() {
        let hints = Hints {
            profile: Some(ProfileLevel::Full),
            important: true,
            sound_file: None,
        };
        assert_eq!(
            hints.effective_level(ProfileLevel::Silent, Some(ProfileLevel::Quiet)),
            ProfileLevel::Quiet
        );
    }
}
