use std::collections::HashMap;

use feedbackd_types::{FeedbackSpec, ProfileLevel};
use serde::Deserialize;

/// On-disk theme file shape (§6 "Theme file layout").
#[derive(Debug, Deserialize)]
pub struct ThemeFile {
    pub name: String,
    #[serde(rename = "parent-name")]
    pub parent_name: Option<String>,
    pub profiles: Vec<ThemeFileProfile>,
}

#[derive(Debug, Deserialize)]
pub struct ThemeFileProfile {
    pub name: String,
    pub feedbacks: Vec<ThemeFileFeedback>,
}

#[derive(Debug, Deserialize)]
pub struct ThemeFileFeedback {
    #[serde(rename = "event-name")]
    pub event_name: String,
    #[serde(flatten)]
    pub spec: FeedbackSpec,
}

/// A loaded and (possibly) parent-merged theme, indexed for fast lookup.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub parent_name: Option<String>,
    /// profile → event-name → feedbacks mapped to that event in that profile.
    pub profiles: HashMap<ProfileLevel, HashMap<String, Vec<FeedbackSpec>>>,
}

impl Theme {
    /// Build an indexed [`Theme`] from a parsed [`ThemeFile`], validating
    /// every feedback spec and skipping (with a log) any that fail.
    pub fn from_file(file: ThemeFile, path: &str) -> Self {
        let mut profiles: HashMap<ProfileLevel, HashMap<String, Vec<FeedbackSpec>>> = HashMap::new();
        for profile in file.profiles {
            let Some(level) = ProfileLevel::parse(&profile.name) else {
                log::warn!(target: "theme", "{}: unknown profile name {:?}, skipping", path, profile.name);
                continue;
            };
            let entry = profiles.entry(level).or_default();
            for fb in profile.feedbacks {
                if let Err(e) = fb.spec.validate() {
                    log::warn!(target: "theme", "{}: invalid feedback for event {:?}: {}", path, fb.event_name, e);
                    continue;
                }
                entry.entry(fb.event_name).or_default().push(fb.spec);
            }
        }
        Theme { name: file.name, parent_name: file.parent_name, profiles }
    }

    /// Override `self`'s entries with `child`'s on every `(profile, event-name)`
    /// key the child defines. Used to apply a child theme over its parent.
    pub fn override_with(mut self, child: Theme) -> Self {
        for (level, events) in child.profiles {
            let entry = self.profiles.entry(level).or_default();
            for (event_name, specs) in events {
                entry.insert(event_name, specs);
            }
        }
        // The merged theme keeps the child's own identity (name/parent),
        // since the parent's content is now folded in, not the parent itself.
        Theme { name: self.name, parent_name: self.parent_name, profiles: self.profiles }
    }

    /// All feedbacks mapped to `event_name` across the profiles searched for `level`.
    pub fn resolve(&self, level: ProfileLevel, event_name: &str) -> Vec<FeedbackSpec> {
        let mut result = Vec::new();
        for profile in level.search_order() {
            if let Some(events) = self.profiles.get(profile) {
                if let Some(specs) = events.get(event_name) {
                    result.extend(specs.iter().cloned());
                }
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedbackd_types::{SoundSpec, VibraRumbleSpec};

    fn sound(event_name: &str) -> ThemeFileFeedback {
        ThemeFileFeedback {
            event_name: event_name.to_string(),
            spec: FeedbackSpec::Sound(SoundSpec { event_name: event_name.to_string(), media_role: "event".into() }),
        }
    }

    #[test]
    fn resolve_widens_search_for_quieter_levels() {
        let file = ThemeFile {
            name: "t".into(),
            parent_name: None,
            profiles: vec![
                ThemeFileProfile { name: "full".into(), feedbacks: vec![sound("click")] },
                ThemeFileProfile { name: "silent".into(), feedbacks: vec![sound("click")] },
            ],
        };
        let theme = Theme::from_file(file, "test");
        assert_eq!(theme.resolve(ProfileLevel::Full, "click").len(), 1);
        assert_eq!(theme.resolve(ProfileLevel::Silent, "click").len(), 1);
        assert_eq!(theme.resolve(ProfileLevel::Silent, "missing").len(), 0);
    }

    #[test]
    fn resolve_collects_from_multiple_matching_profiles() {
        // full.click = Sound, quiet.click = Sound too; under Full level, both
        // full and quiet are searched, so both entries are returned.
        let file = ThemeFile {
            name: "t".into(),
            parent_name: None,
            profiles: vec![
                ThemeFileProfile { name: "full".into(), feedbacks: vec![sound("click")] },
                ThemeFileProfile { name: "quiet".into(), feedbacks: vec![sound("click")] },
            ],
        };
        let theme = Theme::from_file(file, "test");
        assert_eq!(theme.resolve(ProfileLevel::Full, "click").len(), 2);
    }

    #[test]
    fn child_overrides_parent_on_same_key() {
        let parent_file = ThemeFile {
            name: "parent".into(),
            parent_name: None,
            profiles: vec![ThemeFileProfile { name: "full".into(), feedbacks: vec![sound("click")] }],
        };
        let child_file = ThemeFile {
            name: "child".into(),
            parent_name: Some("parent".into()),
            profiles: vec![ThemeFileProfile {
                name: "full".into(),
                feedbacks: vec![ThemeFileFeedback {
                    event_name: "click".into(),
                    spec: FeedbackSpec::VibraRumble(VibraRumbleSpec { count: 1, pause: 0, duration: 100, magnitude: 1.0 }),
                }],
            }],
        };
        let parent = Theme::from_file(parent_file, "parent");
        let child = Theme::from_file(child_file, "child");
        let merged = parent.override_with(child);
        let resolved = merged.resolve(ProfileLevel::Full, "click");
        assert_eq!(resolved.len(), 1);
        assert!(matches!(resolved[0], FeedbackSpec::VibraRumble(_)));
    }

    #[test]
    fn invalid_feedback_spec_is_skipped_not_fatal() {
        let file = ThemeFile {
            name: "t".into(),
            parent_name: None,
            profiles: vec![ThemeFileProfile {
                name: "full".into(),
                feedbacks: vec![ThemeFileFeedback {
                    event_name: "click".into(),
                    spec: FeedbackSpec::VibraRumble(VibraRumbleSpec { count: 1, pause: 0, duration: 100, magnitude: 9.0 }),
                }],
            }],
        };
        let theme = Theme::from_file(file, "test");
        assert_eq!(theme.resolve(ProfileLevel::Full, "click").len(), 0);
    }
}
