//! Per-file conversion state, keyed by file identity.
//!
//! A batch converts many files concurrently, and each task reports its own
//! lifecycle: `Pending → Processing → Completed | Error`. The
//! [`StatusBoard`] is the keyed mapping the tasks write into — a mutex-held
//! map from [`FileId`] to [`FileStatus`], with every update applied
//! atomically per key. Only the selection pass and the file's own task ever
//! touch a given key, so the lock is held for map access only, never across
//! an await point.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::UNIX_EPOCH;

/// Identity of an uploaded file: name plus modification time.
///
/// Two selections of the same path produce the same id as long as the file
/// has not been rewritten in between; re-saving the source PDF yields a new
/// identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId {
    /// File name (no directory components).
    pub name: String,
    /// Modification time in milliseconds since the epoch; 0 for URL inputs,
    /// which have no local timestamp at selection time.
    pub modified_ms: u64,
}

impl FileId {
    /// Derive the identity of a local file from its name and mtime.
    pub fn for_path(path: &Path) -> std::io::Result<FileId> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let modified_ms = std::fs::metadata(path)?
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Ok(FileId { name, modified_ms })
    }

    /// Identity for a URL input, named after the last path segment.
    pub fn for_url(url: &str) -> FileId {
        let name = url
            .rsplit('/')
            .find(|s| !s.is_empty())
            .unwrap_or(url)
            .to_string();
        FileId {
            name,
            modified_ms: 0,
        }
    }

    /// The file name without its `.pdf` extension, used to derive output
    /// file names.
    pub fn stem(&self) -> &str {
        self.name
            .strip_suffix(".pdf")
            .or_else(|| self.name.strip_suffix(".PDF"))
            .unwrap_or(&self.name)
    }
}

/// Lifecycle state of one file in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStatus {
    /// Selected but not yet started.
    Pending,
    /// A conversion task is working on it.
    Processing,
    /// Conversion and export finished.
    Completed,
    /// Conversion failed; the message is the per-file error rendered for
    /// display.
    Error(String),
}

/// Thread-safe store of per-file statuses.
///
/// Updates are atomic per key; a snapshot observes a consistent point in
/// time across all keys.
#[derive(Debug, Default)]
pub struct StatusBoard {
    inner: Mutex<HashMap<FileId, FileStatus>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly selected file as pending.
    pub fn select(&self, id: FileId) {
        self.inner.lock().unwrap().insert(id, FileStatus::Pending);
    }

    /// Transition a file to a new status.
    pub fn set(&self, id: &FileId, status: FileStatus) {
        self.inner.lock().unwrap().insert(id.clone(), status);
    }

    /// Remove a file from the board (user removed it from the list).
    pub fn remove(&self, id: &FileId) {
        self.inner.lock().unwrap().remove(id);
    }

    /// Current status of a file, if it is on the board.
    pub fn get(&self, id: &FileId) -> Option<FileStatus> {
        self.inner.lock().unwrap().get(id).cloned()
    }

    /// Number of files on the board.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }

    /// Consistent snapshot of every file's status, sorted by name for
    /// stable display.
    pub fn snapshot(&self) -> Vec<(FileId, FileStatus)> {
        let mut entries: Vec<_> = self
            .inner
            .lock()
            .unwrap()
            .iter()
            .map(|(id, st)| (id.clone(), st.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.name.cmp(&b.0.name));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn id(name: &str) -> FileId {
        FileId {
            name: name.into(),
            modified_ms: 1,
        }
    }

    #[test]
    fn lifecycle_transitions() {
        let board = StatusBoard::new();
        let f = id("lecture.pdf");
        board.select(f.clone());
        assert_eq!(board.get(&f), Some(FileStatus::Pending));

        board.set(&f, FileStatus::Processing);
        assert_eq!(board.get(&f), Some(FileStatus::Processing));

        board.set(&f, FileStatus::Completed);
        assert_eq!(board.get(&f), Some(FileStatus::Completed));
    }

    #[test]
    fn removal_forgets_the_file() {
        let board = StatusBoard::new();
        let f = id("scratch.pdf");
        board.select(f.clone());
        board.remove(&f);
        assert_eq!(board.get(&f), None);
        assert!(board.is_empty());
    }

    #[test]
    fn same_name_different_mtime_are_distinct() {
        let board = StatusBoard::new();
        let a = FileId {
            name: "notes.pdf".into(),
            modified_ms: 1,
        };
        let b = FileId {
            name: "notes.pdf".into(),
            modified_ms: 2,
        };
        board.select(a.clone());
        board.select(b.clone());
        assert_eq!(board.len(), 2);
        board.set(&a, FileStatus::Error("boom".into()));
        assert_eq!(board.get(&b), Some(FileStatus::Pending));
    }

    #[test]
    fn stem_strips_pdf_extension() {
        assert_eq!(id("algebra.pdf").stem(), "algebra");
        assert_eq!(id("ALGEBRA.PDF").stem(), "ALGEBRA");
        assert_eq!(id("no-extension").stem(), "no-extension");
    }

    #[test]
    fn url_identity_uses_last_segment() {
        let f = FileId::for_url("https://example.com/notes/week3.pdf");
        assert_eq!(f.name, "week3.pdf");
        assert_eq!(f.modified_ms, 0);
    }

    #[test]
    fn concurrent_updates_stay_per_key() {
        let board = Arc::new(StatusBoard::new());
        let ids: Vec<FileId> = (0..8).map(|i| id(&format!("f{i}.pdf"))).collect();
        for f in &ids {
            board.select(f.clone());
        }

        let handles: Vec<_> = ids
            .iter()
            .cloned()
            .map(|f| {
                let board = Arc::clone(&board);
                std::thread::spawn(move || {
                    board.set(&f, FileStatus::Processing);
                    board.set(&f, FileStatus::Completed);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        for f in &ids {
            assert_eq!(board.get(f), Some(FileStatus::Completed));
        }
    }
}
