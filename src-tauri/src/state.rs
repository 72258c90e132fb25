// Shared state structs to avoid circular dependencies.
// These are used by the shell and commands and can be tested independently.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use serde::Serialize;

use crate::history::HistoryLog;
use crate::modules::downloads::DownloadTracker;
use crate::modules::tabs::TabStrip;
use crate::settings::Settings;

#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TabKind {
    /// An external page.
    Web,
    /// The bundled history listing.
    History,
}

#[derive(Clone, Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: u64,
    pub webview_label: String,
    pub kind: TabKind,
    pub title: String,
    pub url: String,
}

/// Snapshot pushed to the toolbar on every tab change.
#[derive(Clone, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TabsPayload {
    pub tabs: Vec<Tab>,
    pub active_index: Option<usize>,
}

/// Partial downloads wait here, under the data dir, until a save path is chosen.
pub const DOWNLOAD_STAGING_DIR: &str = "downloads";

pub struct AppState {
    pub tabs: Mutex<TabStrip>,
    pub settings: RwLock<Settings>,
    pub settings_path: PathBuf,
    pub history: Arc<HistoryLog>,
    pub downloads: DownloadTracker,
}

impl AppState {
    pub fn new(settings: Settings, settings_path: PathBuf, data_dir: PathBuf) -> Self {
        let history = HistoryLog::new(data_dir.join(&settings.history_file));
        Self {
            tabs: Mutex::new(TabStrip::default()),
            settings: RwLock::new(settings),
            settings_path,
            history: Arc::new(history),
            downloads: DownloadTracker::new(data_dir.join(DOWNLOAD_STAGING_DIR)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_lives_in_data_dir() {
        let settings = Settings::default();
        let state = AppState::new(
            settings,
            PathBuf::from("/data/settings.json"),
            PathBuf::from("/data"),
        );
        assert_eq!(state.history.path(), PathBuf::from("/data/history.txt").as_path());
        assert!(state.tabs.lock().unwrap().is_empty());
        assert_eq!(state.downloads.staging_dir(), PathBuf::from("/data/downloads").as_path());
    }

    #[test]
    fn test_tab_serializes_camel_case() {
        let tab = Tab {
            id: 1,
            webview_label: "tab-1".to_string(),
            kind: TabKind::History,
            title: "History".to_string(),
            url: String::new(),
        };
        let json = serde_json::to_value(&tab).unwrap();
        assert_eq!(json["webviewLabel"], "tab-1");
        assert_eq!(json["kind"], "history");
    }
}
