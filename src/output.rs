//! Output types: per-file reports, batch results, and document metadata.

use crate::document::NoteDocument;
use crate::error::FileError;
use crate::layout::LayoutSummary;
use crate::status::{FileId, FileStatus};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What the synthesizer produced for one file.
///
/// The variant is decided by the requested [`crate::config::OutputFormat`]:
/// structured documents feed the paginating renderer, markup text goes
/// straight to the `.tex` exporter. The pairing is done in exactly one place
/// ([`crate::convert`]), so a payload/format mismatch cannot reach either
/// consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SynthesizedContent {
    /// A document model for PDF layout.
    Structured(NoteDocument),
    /// Raw LaTeX markup for `.tex` export.
    Markup(String),
}

/// Timing and token statistics for one converted file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileStats {
    /// Page images sent to the synthesizer.
    pub pages_rendered: usize,
    /// Prompt tokens reported by the provider.
    pub input_tokens: usize,
    /// Completion tokens reported by the provider.
    pub output_tokens: usize,
    /// Time spent rasterising pages.
    pub render_duration_ms: u64,
    /// Time spent in the VLM call.
    pub synthesis_duration_ms: u64,
    /// Time spent in pagination and PDF emission (zero for markup output).
    pub layout_duration_ms: u64,
    /// Wall-clock time for the whole file.
    pub total_duration_ms: u64,
}

/// The result of converting one file in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    /// Identity of the source file.
    pub file: FileId,
    /// Final status (`Completed` or `Error`).
    pub status: FileStatus,
    /// Structured error when the file failed.
    pub error: Option<FileError>,
    /// Where the exported file was written, when conversion succeeded.
    pub output_path: Option<PathBuf>,
    /// Timing and token statistics.
    pub stats: FileStats,
    /// Layout decisions, present for PDF output only.
    pub layout: Option<LayoutSummary>,
}

impl FileReport {
    pub(crate) fn completed(
        file: FileId,
        output_path: PathBuf,
        stats: FileStats,
        layout: Option<LayoutSummary>,
    ) -> Self {
        Self {
            file,
            status: FileStatus::Completed,
            error: None,
            output_path: Some(output_path),
            stats,
            layout,
        }
    }

    pub(crate) fn failed(file: FileId, error: FileError, stats: FileStats) -> Self {
        Self {
            file,
            status: FileStatus::Error(error.to_string()),
            error: Some(error),
            output_path: None,
            stats,
            layout: None,
        }
    }

    /// True when the file converted and exported without error.
    pub fn is_success(&self) -> bool {
        self.status == FileStatus::Completed
    }
}

/// The result of a whole conversion batch.
///
/// Returned even when some (or all) files failed; per-file failures are
/// isolated by design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    /// One report per selected file, in selection order.
    pub files: Vec<FileReport>,
    /// Wall-clock time for the whole batch.
    pub duration_ms: u64,
}

impl BatchOutput {
    /// Number of files that converted successfully.
    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.is_success()).count()
    }

    /// Number of files that failed.
    pub fn failed(&self) -> usize {
        self.files.len() - self.succeeded()
    }
}

/// PDF document metadata, extracted without any VLM call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}
