//! Runtime settings: the environment, plus the profile saved by the setup
//! wizard in `~/.config/pokemon-terminal/kitty-profile.json`.
//!
//! Environment variables always win over the saved profile.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::palette::TextMode;

/// Set by Kitty in every window it spawns.
pub const KITTY_WINDOW_ID: &str = "KITTY_WINDOW_ID";
/// `light`, `dark` or `auto`.
pub const TEXT_MODE_VAR: &str = "POKEMON_TERMINAL_KITTY_TEXT_MODE";
/// Password for Kitty remote control, read by `kitty @`.
pub const RC_PASSWORD_VAR: &str = "KITTY_RC_PASSWORD";
/// Overrides the brightness dataset location.
pub const DATA_VAR: &str = "POKEMON_TERMINAL_DATA";
/// Overrides the converted image cache directory.
pub const CACHE_VAR: &str = "POKEMON_TERMINAL_CACHE";

const APP_DIR: &str = "pokemon-terminal";

/// Profile persisted by the setup wizard. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Profile {
    /// Saved text mode.
    #[serde(default)]
    pub text_mode: Option<String>,
    /// Saved Kitty remote control password.
    #[serde(default)]
    pub kitty_rc_password: Option<String>,
}

impl Profile {
    /// Default profile location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        Some(home.join(".config").join(APP_DIR).join("kitty-profile.json"))
    }

    /// Read a profile file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON object.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse profile {}", path.display()))
    }

    /// The profile at the default location, or nothing if it is missing or
    /// unreadable.
    #[must_use]
    pub fn load_default() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            return None;
        }
        Profile::load(&path)
            .inspect_err(|err| debug!("ignoring saved profile: {err:#}"))
            .ok()
    }
}

/// Everything the adapters need to know about the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Kitty window id, present when running inside Kitty.
    pub session_id: Option<String>,
    /// Requested text mode.
    pub text_mode: TextMode,
    /// Kitty remote control password.
    pub rc_password: Option<String>,
    /// Brightness dataset.
    pub data_path: PathBuf,
    /// Directory for converted images.
    pub cache_dir: PathBuf,
}

impl Settings {
    /// Settings from the process environment and the saved profile.
    #[must_use]
    pub fn from_env() -> Self {
        Self::resolve(|key| env::var(key).ok(), Profile::load_default())
    }

    /// Settings from a variable lookup and an optional profile.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>, profile: Option<Profile>) -> Self {
        let profile = profile.unwrap_or_default();

        let text_mode = lookup(TEXT_MODE_VAR)
            .or(profile.text_mode)
            .map(|mode| TextMode::parse(&mode))
            .unwrap_or_default();
        let rc_password = lookup(RC_PASSWORD_VAR)
            .or(profile.kitty_rc_password)
            .filter(|p| !p.is_empty());
        let data_path = lookup(DATA_VAR).map_or_else(default_data_path, PathBuf::from);
        let cache_dir = lookup(CACHE_VAR).map_or_else(default_cache_dir, PathBuf::from);

        Self {
            session_id: lookup(KITTY_WINDOW_ID),
            text_mode,
            rc_password,
            data_path,
            cache_dir,
        }
    }
}

fn default_data_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("pokemon.txt")
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".cache")))
        .unwrap_or_else(env::temp_dir)
        .join(APP_DIR)
        .join("kitty-images")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        move |key| vars.get(key).map(ToString::to_string)
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(lookup(&[]), None);
        assert_eq!(settings.session_id, None);
        assert_eq!(settings.text_mode, TextMode::Auto);
        assert_eq!(settings.rc_password, None);
        assert!(settings.data_path.ends_with("pokemon-terminal/pokemon.txt"));
        assert!(settings.cache_dir.ends_with("pokemon-terminal/kitty-images"));
    }

    #[test]
    fn test_env_overrides() {
        let settings = Settings::resolve(
            lookup(&[
                (KITTY_WINDOW_ID, "12"),
                (TEXT_MODE_VAR, "DARK"),
                (RC_PASSWORD_VAR, "secret"),
                (DATA_VAR, "/data/pokemon.txt"),
                (CACHE_VAR, "/tmp/cache"),
            ]),
            None,
        );
        assert_eq!(settings.session_id.as_deref(), Some("12"));
        assert_eq!(settings.text_mode, TextMode::Dark);
        assert_eq!(settings.rc_password.as_deref(), Some("secret"));
        assert_eq!(settings.data_path, PathBuf::from("/data/pokemon.txt"));
        assert_eq!(settings.cache_dir, PathBuf::from("/tmp/cache"));
    }

    #[test]
    fn test_profile_fills_gaps() {
        let profile = Profile {
            text_mode: Some("light".into()),
            kitty_rc_password: Some("saved".into()),
        };

        let settings = Settings::resolve(lookup(&[]), Some(profile.clone()));
        assert_eq!(settings.text_mode, TextMode::Light);
        assert_eq!(settings.rc_password.as_deref(), Some("saved"));

        let settings = Settings::resolve(
            lookup(&[(TEXT_MODE_VAR, "auto"), (RC_PASSWORD_VAR, "env")]),
            Some(profile),
        );
        assert_eq!(settings.text_mode, TextMode::Auto);
        assert_eq!(settings.rc_password.as_deref(), Some("env"));
    }

    #[test]
    fn test_empty_password_is_none() {
        let settings = Settings::resolve(lookup(&[(RC_PASSWORD_VAR, "")]), None);
        assert_eq!(settings.rc_password, None);
    }

    #[test]
    fn test_profile_load() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("kitty-profile.json");
        let json = r#"{"pokemon_selector": "25", "text_mode": "dark", "kitty_rc_password": "pw"}"#;
        fs::write(&path, json)?;
        let profile = Profile::load(&path)?;
        assert_eq!(profile.text_mode.as_deref(), Some("dark"));
        assert_eq!(profile.kitty_rc_password.as_deref(), Some("pw"));

        fs::write(&path, "{}")?;
        assert_eq!(Profile::load(&path)?, Profile::default());

        fs::write(&path, "{not json")?;
        assert!(Profile::load(&path).is_err());
        Ok(())
    }
}
