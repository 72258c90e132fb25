use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Append-only log of explicitly navigated addresses, one per line.
///
/// The file is opened, appended and closed on every write; there is no
/// persistent handle and no locking, so only one process may use it.
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: PathBuf) -> Self {
        HistoryLog { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `url` as a new line. No deduplication, no timestamps.
    pub fn append(&self, url: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        writeln!(file, "{}", url)
    }

    /// Reads every entry in file order. A missing file is an empty history.
    pub fn entries(&self) -> io::Result<Vec<String>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        Ok(String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }
}
