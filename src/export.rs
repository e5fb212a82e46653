//! File export: write conversion results to disk.
//!
//! Both exporters are fire-and-forget and local: PDF bytes go to
//! `<stem>_converted.pdf`, markup text to `<stem>.tex`. Writes are atomic
//! (temp file in the target directory, then rename) so a crash mid-write
//! never leaves a half-written output behind.

use crate::error::NotepressError;
use std::path::{Path, PathBuf};
use tracing::info;

/// Output file name for a typeset PDF derived from `stem`.
pub fn pdf_output_name(stem: &str) -> String {
    format!("{stem}_converted.pdf")
}

/// Output file name for exported markup derived from `stem`.
pub fn markup_output_name(stem: &str) -> String {
    format!("{stem}.tex")
}

/// Write PDF bytes to `<out_dir>/<stem>_converted.pdf`.
pub async fn export_pdf(bytes: &[u8], stem: &str, out_dir: &Path) -> Result<PathBuf, NotepressError> {
    write_atomic(out_dir, &pdf_output_name(stem), bytes).await
}

/// Write markup text to `<out_dir>/<stem>.tex`.
pub async fn export_markup(text: &str, stem: &str, out_dir: &Path) -> Result<PathBuf, NotepressError> {
    write_atomic(out_dir, &markup_output_name(stem), text.as_bytes()).await
}

/// Atomic write: temp file + rename.
///
/// The temp file lives in the target directory so the rename never crosses
/// a filesystem boundary.
async fn write_atomic(out_dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, NotepressError> {
    let path = out_dir.join(name);

    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(|e| NotepressError::ExportFailed {
            path: path.clone(),
            source: e,
        })?;

    let tmp_path = path.with_extension("tmp");
    tokio::fs::write(&tmp_path, bytes)
        .await
        .map_err(|e| NotepressError::ExportFailed {
            path: path.clone(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, &path)
        .await
        .map_err(|e| NotepressError::ExportFailed {
            path: path.clone(),
            source: e,
        })?;

    info!("Exported {}", path.display());
    Ok(path)
}
