use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Presentation theme, reapplied at every load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}

/// Locally persisted preferences
///
/// Not part of the record engine's contract - a plain key-value read/write
/// under the home directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Theme,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            api_url: default_api_url(),
        }
    }
}

impl Preferences {
    /// Loads preferences, falling back to defaults when no file exists yet
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read preferences file: {:?}", path.as_ref()))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse preferences file: {:?}", path.as_ref()))
    }

    /// Saves preferences, creating parent directories as needed
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(&self)?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write preferences to {:?}", path.as_ref()))?;

        Ok(())
    }
}

/// Path to the preferences file
///
/// `DATAREQ_CONFIG` overrides the default `~/.datareq.yaml`.
pub fn preferences_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("DATAREQ_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    let home_dir = dirs::home_dir().context("Failed to determine home directory")?;
    Ok(home_dir.join(".datareq.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::load(dir.path().join("nope.yaml")).unwrap();
        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.yaml");

        let prefs = Preferences {
            theme: Theme::Light,
            api_url: "http://backend:9000".to_string(),
        };
        prefs.save(&path).unwrap();

        let loaded = Preferences::load(&path).unwrap();
        assert_eq!(loaded.theme, Theme::Light);
        assert_eq!(loaded.api_url, "http://backend:9000");
    }

    #[test]
    fn test_theme_serializes_lowercase() {
        let yaml = serde_yaml::to_string(&Preferences::default()).unwrap();
        assert!(yaml.contains("theme: dark"));
    }

    #[test]
    fn test_toggle() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.yaml");
        fs::write(&path, "theme: [not, a, theme]").unwrap();
        assert!(Preferences::load(&path).is_err());
    }
}
