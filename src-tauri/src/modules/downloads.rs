// Download bookkeeping - pure logic, no Tauri imports.
//
// The engine reports a download on the UI thread, where the save dialog
// cannot block. The request is accepted straight away into a
// staging file while the dialog is open. Whichever of "dialog answered" and
// "transfer finished" comes second settles the download: the staging file
// is moved to the chosen path, or deleted when the dialog was cancelled or
// the transfer failed.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use url::Url;

use crate::error::ShellResult;

const FALLBACK_FILE_NAME: &str = "download";

#[derive(Debug, Clone, PartialEq)]
enum SaveChoice {
    Pending,
    Chosen(PathBuf),
    Cancelled,
}

#[derive(Debug)]
struct Download {
    label: String,
    url: String,
    staging: PathBuf,
    choice: SaveChoice,
    /// `Some(success)` once the engine reported the end of the transfer.
    finished: Option<bool>,
}

/// What the shell has to do after a download changed state.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadAction {
    /// Still waiting on the dialog or on the transfer.
    Wait,
    /// Transfer done and a path chosen.
    Move { url: String, from: PathBuf, to: PathBuf },
    /// Dialog cancelled, or the transfer failed.
    Discard { url: String, staging: PathBuf, failed: bool },
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    downloads: HashMap<u64, Download>,
}

#[derive(Debug)]
pub struct DownloadTracker {
    staging_dir: PathBuf,
    inner: Mutex<Inner>,
}

impl DownloadTracker {
    pub fn new(staging_dir: PathBuf) -> Self {
        Self {
            staging_dir,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    pub fn len(&self) -> ShellResult<usize> {
        Ok(self.inner.lock()?.downloads.len())
    }

    pub fn is_empty(&self) -> ShellResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Registers a download started by the webview `label` and returns its
    /// id and the staging file the engine should write to.
    pub fn begin(&self, label: &str, url: &Url) -> ShellResult<(u64, PathBuf)> {
        let mut inner = self.inner.lock()?;
        inner.next_id += 1;
        let id = inner.next_id;

        let staging = self
            .staging_dir
            .join(format!("{}-{}", id, suggested_file_name(url)));
        inner.downloads.insert(
            id,
            Download {
                label: label.to_string(),
                url: url.to_string(),
                staging: staging.clone(),
                choice: SaveChoice::Pending,
                finished: None,
            },
        );
        Ok((id, staging))
    }

    /// Records the save dialog's answer for download `id`.
    pub fn choose(&self, id: u64, destination: Option<PathBuf>) -> ShellResult<DownloadAction> {
        let mut inner = self.inner.lock()?;
        let Some(download) = inner.downloads.get_mut(&id) else {
            return Ok(DownloadAction::Wait);
        };

        download.choice = match destination {
            Some(path) => SaveChoice::Chosen(path),
            None => SaveChoice::Cancelled,
        };
        if download.finished.is_none() {
            return Ok(DownloadAction::Wait);
        }

        Ok(inner.downloads.remove(&id).map(settle).unwrap_or(DownloadAction::Wait))
    }

    /// Records the end of a transfer in webview `label`. The download is
    /// matched by its staging file when the engine reports one, otherwise by
    /// URL. Unknown transfers yield `Wait`.
    pub fn finish(
        &self,
        label: &str,
        url: &Url,
        path: Option<&Path>,
        success: bool,
    ) -> ShellResult<DownloadAction> {
        let mut inner = self.inner.lock()?;
        let found = inner
            .downloads
            .iter()
            .filter(|(_, d)| d.label == label && d.finished.is_none())
            .find(|(_, d)| match path {
                Some(path) => d.staging == path,
                None => d.url == url.as_str(),
            })
            .map(|(id, _)| *id);

        let Some(id) = found else {
            return Ok(DownloadAction::Wait);
        };
        let Some(download) = inner.downloads.get_mut(&id) else {
            return Ok(DownloadAction::Wait);
        };

        download.finished = Some(success);
        if download.choice == SaveChoice::Pending {
            return Ok(DownloadAction::Wait);
        }

        Ok(inner.downloads.remove(&id).map(settle).unwrap_or(DownloadAction::Wait))
    }
}

fn settle(download: Download) -> DownloadAction {
    let failed = download.finished != Some(true);
    match download.choice {
        SaveChoice::Chosen(to) if !failed => DownloadAction::Move {
            url: download.url,
            from: download.staging,
            to,
        },
        _ => DownloadAction::Discard {
            url: download.url,
            staging: download.staging,
            failed,
        },
    }
}

/// Moves a finished staging file to its destination, copying when the two
/// paths are on different filesystems.
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}

/// Default file name offered by the save dialog: the last non-empty path
/// segment of the URL, percent-decoded.
pub fn suggested_file_name(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("");

    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());

    // Never hand a path separator to the dialog.
    let name = decoded.replace(['/', '\\'], "_");
    if name.trim().is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShellError;
    use rstest::rstest;
    use tempfile::tempdir;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn tracker() -> DownloadTracker {
        DownloadTracker::new(PathBuf::from("/staging"))
    }

    #[test]
    fn test_begin_stages_under_staging_dir() {
        let tracker = tracker();
        let (id, staging) = tracker.begin("tab-1", &url("https://example.com/a.zip")).unwrap();
        assert_eq!(id, 1);
        assert_eq!(staging, PathBuf::from("/staging/1-a.zip"));
        assert_eq!(tracker.len().unwrap(), 1);
    }

    #[test]
    fn test_chosen_then_finished_moves() {
        let tracker = tracker();
        let target = url("https://example.com/a.zip");
        let (id, staging) = tracker.begin("tab-1", &target).unwrap();

        let action = tracker.choose(id, Some(PathBuf::from("/home/a.zip"))).unwrap();
        assert_eq!(action, DownloadAction::Wait);

        let action = tracker.finish("tab-1", &target, Some(&staging), true).unwrap();
        assert_eq!(
            action,
            DownloadAction::Move {
                url: target.to_string(),
                from: staging,
                to: PathBuf::from("/home/a.zip"),
            }
        );
        assert!(tracker.is_empty().unwrap());
    }

    #[test]
    fn test_finished_then_chosen_moves() {
        let tracker = tracker();
        let target = url("https://example.com/a.zip");
        let (id, _) = tracker.begin("tab-1", &target).unwrap();

        assert_eq!(tracker.finish("tab-1", &target, None, true).unwrap(), DownloadAction::Wait);
        let action = tracker.choose(id, Some(PathBuf::from("/home/a.zip"))).unwrap();
        assert!(matches!(action, DownloadAction::Move { .. }));
        assert!(tracker.is_empty().unwrap());
    }

    #[test]
    fn test_cancelled_dialog_discards() {
        let tracker = tracker();
        let target = url("https://example.com/a.zip");
        let (id, staging) = tracker.begin("tab-1", &target).unwrap();

        assert_eq!(tracker.choose(id, None).unwrap(), DownloadAction::Wait);
        let action = tracker.finish("tab-1", &target, Some(&staging), true).unwrap();
        assert_eq!(
            action,
            DownloadAction::Discard {
                url: target.to_string(),
                staging,
                failed: false,
            }
        );
        assert!(tracker.is_empty().unwrap());
    }

    #[test]
    fn test_failed_transfer_discards_even_when_chosen() {
        let tracker = tracker();
        let target = url("https://example.com/a.zip");
        let (id, _) = tracker.begin("tab-1", &target).unwrap();

        tracker.choose(id, Some(PathBuf::from("/home/a.zip"))).unwrap();
        let action = tracker.finish("tab-1", &target, None, false).unwrap();
        assert!(matches!(action, DownloadAction::Discard { failed: true, .. }));
    }

    #[test]
    fn test_finish_from_other_tab_or_url_is_ignored() {
        let tracker = tracker();
        let target = url("https://example.com/a.zip");
        let (id, _) = tracker.begin("tab-1", &target).unwrap();
        tracker.choose(id, Some(PathBuf::from("/home/a.zip"))).unwrap();

        let other = url("https://example.com/b.zip");
        assert_eq!(tracker.finish("tab-2", &target, None, true).unwrap(), DownloadAction::Wait);
        assert_eq!(tracker.finish("tab-1", &other, None, true).unwrap(), DownloadAction::Wait);
        assert_eq!(
            tracker.finish("tab-1", &target, Some(Path::new("/elsewhere")), true).unwrap(),
            DownloadAction::Wait
        );
        assert_eq!(tracker.len().unwrap(), 1);
    }

    #[test]
    fn test_same_url_twice_settles_separately() {
        let tracker = tracker();
        let target = url("https://example.com/a.zip");
        let (first, first_staging) = tracker.begin("tab-1", &target).unwrap();
        let (second, second_staging) = tracker.begin("tab-1", &target).unwrap();
        assert_ne!(first_staging, second_staging);

        tracker.choose(first, Some(PathBuf::from("/home/one.zip"))).unwrap();
        tracker.choose(second, None).unwrap();

        let action = tracker.finish("tab-1", &target, Some(&second_staging), true).unwrap();
        assert!(matches!(action, DownloadAction::Discard { failed: false, .. }));
        let action = tracker.finish("tab-1", &target, Some(&first_staging), true).unwrap();
        assert!(matches!(action, DownloadAction::Move { ref to, .. } if to == Path::new("/home/one.zip")));
        assert!(tracker.is_empty().unwrap());
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let tracker = tracker();
        let _ = std::panic::catch_unwind(|| {
            let _guard = tracker.inner.lock().unwrap();
            panic!("poison");
        });

        let target = url("https://example.com/a.zip");
        assert!(matches!(tracker.begin("tab-1", &target), Err(ShellError::Poisoned)));
        assert!(matches!(tracker.choose(1, None), Err(ShellError::Poisoned)));
        assert!(matches!(
            tracker.finish("tab-1", &target, None, true),
            Err(ShellError::Poisoned)
        ));
    }

    #[test]
    fn test_choose_unknown_id_waits() {
        assert_eq!(tracker().choose(42, None).unwrap(), DownloadAction::Wait);
    }

    #[test]
    fn test_move_file() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("1-a.zip");
        let to = dir.path().join("a.zip");
        fs::write(&from, b"payload").unwrap();

        move_file(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), b"payload");
    }

    #[rstest]
    #[case("https://example.com/files/report.pdf", "report.pdf")]
    #[case("https://example.com/files/my%20report.pdf?x=1", "my report.pdf")]
    #[case("https://example.com/dir/", "dir")]
    #[case("https://example.com/", "download")]
    #[case("https://example.com/a%2Fb.txt", "a_b.txt")]
    #[case("data:text/plain,hello", "download")]
    fn test_suggested_file_name(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(suggested_file_name(&url(input)), expected);
    }
}
