//! Input selection and resolution.
//!
//! Two responsibilities: filter a user selection down to its PDF entries
//! (everything else is dropped silently, like a file picker with a `.pdf`
//! filter), and normalise each surviving entry — local path or URL — to a
//! file pdfium can open.
//!
//! URLs are downloaded into a `TempDir` because pdfium only reads from the
//! file system; the directory is kept alive inside [`ResolvedInput`] so the
//! file survives exactly as long as the conversion does. Both paths and
//! downloads are checked for the `%PDF` header up front — a mislabelled file
//! should fail with a clear error here, not as a pdfium crash three stages
//! later.

use crate::error::FileError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// A selection entry normalised to a local PDF file.
pub enum ResolvedInput {
    /// The entry was already a local file.
    Local(PathBuf),
    /// The entry was a URL; the download lives in a temp directory that is
    /// cleaned up when this value drops.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }
}

/// Whether a selection entry is an HTTP(S) URL rather than a path.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Whether an entry survives selection.
///
/// Local files are judged by extension; URLs are always kept here and
/// validated by magic bytes once downloaded.
fn is_pdf_selection(input: &str) -> bool {
    is_url(input)
        || Path::new(input)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Filter a user selection down to its PDF entries.
///
/// Dropping a non-PDF entry is not an error and produces no user-facing
/// message, only a debug log.
pub fn filter_selection(inputs: &[String]) -> Vec<&str> {
    inputs
        .iter()
        .map(String::as_str)
        .filter(|input| {
            let keep = is_pdf_selection(input);
            if !keep {
                debug!("Ignoring non-PDF selection entry: {input}");
            }
            keep
        })
        .collect()
}

/// Resolve one selection entry to a local PDF file.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, FileError> {
    if is_url(input) {
        fetch_remote(input, timeout_secs).await
    } else {
        open_local(input)
    }
}

fn open_local(path_str: &str) -> Result<ResolvedInput, FileError> {
    let path = PathBuf::from(path_str);

    let mut file = std::fs::File::open(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => FileError::PermissionDenied { path: path.clone() },
        _ => FileError::FileNotFound { path: path.clone() },
    })?;

    let mut magic = [0u8; 4];
    if file.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
        return Err(FileError::NotAPdf { path, magic });
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

async fn fetch_remote(url: &str, timeout_secs: u64) -> Result<ResolvedInput, FileError> {
    let fail = |reason: String| FileError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    info!("Downloading PDF from {url}");
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| fail(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| fail(e.to_string()))?;
    if !response.status().is_success() {
        return Err(fail(format!("HTTP {}", response.status())));
    }
    let body = response.bytes().await.map_err(|e| fail(e.to_string()))?;

    let temp_dir = TempDir::new().map_err(|e| fail(format!("temp dir: {e}")))?;
    let path = temp_dir.path().join(remote_file_name(url));

    // Check the header before anything touches disk.
    if body.len() < 4 || &body[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        magic[..body.len().min(4)].copy_from_slice(&body[..body.len().min(4)]);
        return Err(FileError::NotAPdf { path, magic });
    }

    tokio::fs::write(&path, &body)
        .await
        .map_err(|e| fail(format!("write temp file: {e}")))?;

    info!("Downloaded {} bytes to {}", body.len(), path.display());
    Ok(ResolvedInput::Downloaded {
        path,
        _temp_dir: temp_dir,
    })
}

/// A file name for the download, taken from the URL's last path segment when
/// it has one worth keeping.
fn remote_file_name(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()?
                .next_back()
                .filter(|seg| !seg.is_empty() && seg.contains('.'))
                .map(str::to_string)
        })
        .unwrap_or_else(|| String::from("download.pdf"))
}
