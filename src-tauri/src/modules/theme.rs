// Window theme - pure logic, no Tauri imports.
// The stylesheet is injected as a global override by the toolbar and
// history pages; no per-tab styling exists.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

const LIGHT_STYLESHEET: &str = r#"
:root {
    --window-bg: #ffffff;
    --window-fg: #000000;
    --pane-bg: #dddddd;
    --tab-bg: #eeeeee;
    --tab-fg: #000000;
    --tab-selected-bg: #cccccc;
    --field-bg: #ffffff;
    --field-fg: #000000;
    --button-bg: #dddddd;
    --button-fg: #000000;
    --button-hover-bg: #bbbbbb;
}
"#;

const DARK_STYLESHEET: &str = r#"
:root {
    --window-bg: #121212;
    --window-fg: #ffffff;
    --pane-bg: #1e1e1e;
    --tab-bg: #333333;
    --tab-fg: #ffffff;
    --tab-selected-bg: #444444;
    --field-bg: #333333;
    --field-fg: #ffffff;
    --button-bg: #444444;
    --button-fg: #ffffff;
    --button-hover-bg: #555555;
}
"#;

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// CSS custom properties consumed by `ui/styles.css`.
    pub fn stylesheet(self) -> &'static str {
        match self {
            Self::Light => LIGHT_STYLESHEET,
            Self::Dark => DARK_STYLESHEET,
        }
    }
}

/// Event payload sent to every page that renders shell chrome.
#[derive(Debug, Clone, Serialize)]
pub struct ThemePayload {
    pub theme: Theme,
    pub stylesheet: &'static str,
}

impl From<Theme> for ThemePayload {
    fn from(theme: Theme) -> Self {
        Self {
            theme,
            stylesheet: theme.stylesheet(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_light() {
        assert_eq!(Theme::default(), Theme::Light);
    }

    #[test]
    fn test_toggle_twice_restores_style() {
        for start in [Theme::Light, Theme::Dark] {
            let once = start.toggled();
            assert_ne!(once, start);
            assert_ne!(once.stylesheet(), start.stylesheet());

            let twice = once.toggled();
            assert_eq!(twice, start);
            assert_eq!(twice.stylesheet(), start.stylesheet());
        }
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"dark\"");
        let parsed: Theme = serde_json::from_str("\"light\"").unwrap();
        assert_eq!(parsed, Theme::Light);
    }

    #[test]
    fn test_payload_carries_matching_stylesheet() {
        let payload = ThemePayload::from(Theme::Dark);
        assert_eq!(payload.theme, Theme::Dark);
        assert!(payload.stylesheet.contains("#121212"));
    }
}
