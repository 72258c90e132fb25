use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tauri::AppHandle;
use tauri::Manager;

use crate::error::ShellResult;
use crate::modules::theme::Theme;

pub const DEFAULT_HOMEPAGE: &str = "https://www.google.com";
pub const DEFAULT_HISTORY_FILE: &str = "history.txt";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Start page for new tabs and the home control.
    pub homepage: String,
    pub theme: Theme,
    /// History file name, relative to the app data dir.
    pub history_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            homepage: DEFAULT_HOMEPAGE.to_string(),
            theme: Theme::default(),
            history_file: DEFAULT_HISTORY_FILE.to_string(),
        }
    }
}

impl Settings {
    pub fn get_path(app: &AppHandle) -> ShellResult<PathBuf> {
        Ok(app.path().app_data_dir()?.join("settings.json"))
    }

    /// Loads settings, falling back to defaults on any read or parse failure.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("[Settings] Failed to parse settings: {}, returning defaults", e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("[Settings] Failed to read file: {}, returning defaults", e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> ShellResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        // Write to tmp, then rename, so a crash never leaves a half-written file.
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(tmp_path, path)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("settings.json"));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.homepage, "https://www.google.com");
        assert_eq!(settings.theme, Theme::Light);
    }

    #[test]
    fn test_round_trip_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conf/settings.json");

        let mut settings = Settings::default();
        settings.theme = Theme::Dark;
        settings.homepage = "https://duckduckgo.com".to_string();
        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path), settings);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "theme": "dark" }"#).unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.homepage, DEFAULT_HOMEPAGE);
        assert_eq!(settings.history_file, DEFAULT_HISTORY_FILE);
    }

    #[test]
    fn test_garbage_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }
}
