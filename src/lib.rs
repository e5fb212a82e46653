//! # notepress
//!
//! Convert scanned and handwritten PDF notes into typeset documents using
//! Vision Language Models (VLMs).
//!
//! ## Why this crate?
//!
//! OCR engines built for printed text fall apart on handwriting — margin
//! arrows, crossed-out words, sketched diagrams and half-shorthand prose
//! come out as noise. Instead this crate rasterises each page into a PNG and
//! lets a VLM read the notes as a human would, returning either a structured
//! document that is laid out into a clean, paginated PDF, or a complete
//! LaTeX source file.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF(s)
//!  │
//!  ├─ 1. Select    filter the selection to PDFs, resolve paths/URLs
//!  ├─ 2. Render    rasterise every page via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Encode    PNG → base64 ImageData
//!  ├─ 4. Synthesize one VLM call per document: images in, document out
//!  ├─ 5. Paginate  first-fit layout across A4 pages (PDF output only)
//!  └─ 6. Export    <name>_converted.pdf  or  <name>.tex
//! ```
//!
//! Files in a batch are converted concurrently, each as its own task; one
//! file's failure never affects the others.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use notepress::{convert_batch, ConversionConfig, OutputFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / …
//!     let config = ConversionConfig::builder()
//!         .format(OutputFormat::Pdf)
//!         .out_dir("converted")
//!         .build()?;
//!     let inputs = vec!["week1.pdf".to_string(), "week2.pdf".to_string()];
//!     let batch = convert_batch(&inputs, &config).await?;
//!     for report in &batch.files {
//!         println!("{}: {:?}", report.file.name, report.status);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `notepress` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! notepress = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod export;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod status;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, OutputFormat};
pub use convert::{convert_batch, inspect};
pub use document::{BlockKind, ContentBlock, NoteDocument};
pub use error::{FileError, NotepressError};
pub use layout::{render_document, LayoutSummary, PageGeometry, Placement};
pub use output::{BatchOutput, DocumentMetadata, FileReport, FileStats, SynthesizedContent};
pub use progress::{ConversionProgress, NoopProgress, ProgressCallback};
pub use status::{FileId, FileStatus, StatusBoard};
