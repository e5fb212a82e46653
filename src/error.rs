//! Error types for the notepress library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`NotepressError`] — **Fatal**: the batch cannot proceed at all
//!   (invalid configuration, provider not configured, empty selection).
//!   Returned as `Err(NotepressError)` from the top-level `convert*`
//!   functions.
//!
//! * [`FileError`] — **Non-fatal**: a single file failed (corrupt PDF,
//!   synthesis failure, malformed model response) but all other files in the
//!   batch are fine. Stored inside [`crate::output::FileReport`] so callers
//!   can inspect partial success rather than losing the whole batch to one
//!   bad file.
//!
//! A failed file sets its status to [`crate::status::FileStatus::Error`] and
//! never aborts the sibling tasks; that isolation is the whole point of the
//! split.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the notepress library.
///
/// File-level failures use [`FileError`] and are stored in
/// [`crate::output::FileReport`] rather than propagated here.
#[derive(Debug, Error)]
pub enum NotepressError {
    /// No convertible inputs remain after non-PDF entries were filtered out.
    #[error("No PDF files to convert.\nOnly files ending in .pdf (or HTTP/HTTPS URLs) are accepted.")]
    EmptySelection,

    /// The configured provider is not initialised (missing API key etc.).
    #[error("VLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Could not create or write an exported output file.
    #[error("Failed to write output file '{path}': {source}")]
    ExportFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single file in a batch.
///
/// Stored alongside [`crate::output::FileReport`] when a file fails.
/// The overall batch continues; sibling files are unaffected.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum FileError {
    /// Input file was not found at the given path.
    #[error("file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// The file exists and was read, but is not a PDF.
    #[error("not a valid PDF: '{path}' (first bytes: {magic:?})")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("corrupt PDF '{path}': {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided, or the password is wrong.
    #[error("PDF '{path}' is encrypted and the password is missing or wrong")]
    BadPassword { path: PathBuf },

    /// pdfium produced no page images at all for this document.
    #[error("no page images could be extracted from '{name}'")]
    ExtractionEmpty { name: String },

    /// pdfium returned an error for a specific page.
    #[error("rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The VLM call failed (network, provider, or service error).
    #[error("content synthesis failed: {detail}")]
    SynthesisFailed { detail: String },

    /// The VLM returned structured output that does not conform to the
    /// document schema.
    #[error("malformed structured response: {detail}")]
    MalformedDocument { detail: String },

    /// The paginating renderer could not produce the output PDF.
    #[error("document rendering failed: {detail}")]
    RenderFailed { detail: String },
}
