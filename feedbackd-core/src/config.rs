//! Daemon settings: active profile, theme name, and per-app profile overrides.
//!
//! Persisted as TOML under `$XDG_CONFIG_HOME/feedbackd/config.toml`. An
//! embedded default document is parsed first, then the user file is merged
//! over it field-by-field — a malformed or unreadable user file is logged
//! and skipped rather than treated as fatal, matching the rest of the
//! daemon's "degrade, don't crash" posture toward optional local state.

use std::collections::HashMap;
use std::path::PathBuf;

use feedbackd_types::ProfileLevel;
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Serialize, Default, Clone)]
struct ConfigFile {
    #[serde(default)]
    profile: Option<String>,
    #[serde(default)]
    theme: Option<String>,
    #[serde(default)]
    per_app: HashMap<String, String>,
}

/// Runtime daemon settings. The single owned root for "what's the active
/// profile, what theme, and which apps have their own override".
pub struct Settings {
    profile: ProfileLevel,
    theme: String,
    per_app: HashMap<String, ProfileLevel>,
}

impl Settings {
    /// Load settings, merging the embedded defaults with the user's config
    /// file if present and well-formed.
    pub fn load() -> Self {
        let mut base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("failed to parse embedded config.toml");

        if let Some(path) = user_config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => merge(&mut base, user),
                        Err(e) => log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e),
                    },
                    Err(e) => log::warn!(target: "config", "could not read config {}: {}", path.display(), e),
                }
            }
        }

        let profile = base
            .profile
            .as_deref()
            .and_then(ProfileLevel::parse)
            .unwrap_or_default();
        let theme = base.theme.unwrap_or_else(|| "default".to_string());
        let per_app = base
            .per_app
            .into_iter()
            .filter_map(|(k, v)| ProfileLevel::parse(&v).map(|level| (k, level)))
            .collect();

        Settings { profile, theme, per_app }
    }

    pub fn profile(&self) -> ProfileLevel {
        self.profile
    }

    pub fn theme_name(&self) -> &str {
        &self.theme
    }

    /// Per-app profile override, keyed by the mangled app id (`.`/`/` → `_`).
    pub fn per_app_override(&self, app_id: &str) -> Option<ProfileLevel> {
        self.per_app.get(&mangle_app_id(app_id)).copied()
    }

    /// Update the active profile and persist it.
    pub fn set_profile(&mut self, level: ProfileLevel) {
        self.profile = level;
        self.save();
    }

    fn save(&self) {
        let file = ConfigFile {
            profile: Some(self.profile.as_str().to_string()),
            theme: Some(self.theme.clone()),
            per_app: self
                .per_app
                .iter()
                .map(|(k, v)| (k.clone(), v.as_str().to_string()))
                .collect(),
        };
        let Some(path) = user_config_path() else { return };
        let Some(parent) = path.parent() else { return };
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
        let Ok(serialized) = toml::to_string_pretty(&file) else { return };
        // Write-then-rename keeps a reader from ever observing a torn file.
        let tmp_path = parent.join(".config.toml.tmp");
        if std::fs::write(&tmp_path, serialized).is_ok() {
            let _ = std::fs::rename(&tmp_path, &path);
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("feedbackd").join("config.toml"))
}

/// Mangle an app id into a TOML-table-safe key.
pub fn mangle_app_id(app_id: &str) -> String {
    app_id.replace(['.', '/'], "_")
}

fn merge(base: &mut ConfigFile, user: ConfigFile) {
    if user.profile.is_some() {
        base.profile = user.profile;
    }
    if user.theme.is_some() {
        base.theme = user.theme;
    }
    for (k, v) in user.per_app {
        base.per_app.insert(k, v);
    }
}
