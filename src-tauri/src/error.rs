// Shell-wide error type. Commands return it across the IPC boundary,
// where it is flattened to its display string.

use serde::{Serialize, Serializer};
use std::sync::PoisonError;

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("no tab at index {0}")]
    NoSuchTab(usize),

    #[error("no active tab")]
    NoActiveTab,

    #[error("window `{0}` not found")]
    WindowNotFound(String),

    #[error("webview `{0}` not found")]
    WebviewNotFound(String),

    #[error("invalid address: {0}")]
    InvalidAddress(#[from] url::ParseError),

    #[error("clipboard error: {0}")]
    Clipboard(String),

    #[error("shell state lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Tauri(#[from] tauri::Error),
}

impl<T> From<PoisonError<T>> for ShellError {
    fn from(_: PoisonError<T>) -> Self {
        Self::Poisoned
    }
}

impl Serialize for ShellError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

pub type ShellResult<T> = Result<T, ShellError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_display_string() {
        let json = serde_json::to_string(&ShellError::NoSuchTab(3)).unwrap();
        assert_eq!(json, "\"no tab at index 3\"");
    }

    #[test]
    fn test_poison_maps_to_poisoned() {
        let lock = std::sync::Mutex::new(0);
        let _ = std::panic::catch_unwind(|| {
            let _guard = lock.lock().unwrap();
            panic!("poison");
        });
        let err: ShellError = lock.lock().unwrap_err().into();
        assert!(matches!(err, ShellError::Poisoned));
    }
}
