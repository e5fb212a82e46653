//! Batch conversion entry points.
//!
//! A batch is the unit the user surface works in: select files, pick a
//! format, convert. Every selected PDF becomes one independent async task;
//! the tasks run concurrently with **no concurrency cap** and are joined
//! when all complete. One file's failure never touches its siblings — the
//! per-file [`FileError`] lands in that file's [`FileReport`] and the batch
//! carries on. There is no retry at any layer and no cancellation once a
//! batch has started.

use crate::config::{ConversionConfig, OutputFormat};
use crate::error::{FileError, NotepressError};
use crate::export;
use crate::layout;
use crate::output::{BatchOutput, DocumentMetadata, FileReport, FileStats, SynthesizedContent};
use crate::pipeline::{encode, input, render, synthesize};
use crate::progress::ProgressCallback;
use crate::status::{FileId, FileStatus, StatusBoard};
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Model used when the caller names a provider but no model.
const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Convert a selection of PDF files (paths or URLs) in one batch.
///
/// Non-PDF entries are filtered out silently before anything starts; if
/// nothing remains the batch refuses to run. The returned [`BatchOutput`]
/// contains one report per converted file, in selection order, including
/// the files that failed.
///
/// # Errors
/// Returns `Err(NotepressError)` only for batch-fatal conditions: an empty
/// selection after filtering, or no usable VLM provider.
pub async fn convert_batch(
    inputs: &[String],
    config: &ConversionConfig,
) -> Result<BatchOutput, NotepressError> {
    let batch_start = Instant::now();

    let selection = input::filter_selection(inputs);
    if selection.is_empty() {
        return Err(NotepressError::EmptySelection);
    }
    info!(
        "Converting {} of {} selected file(s)",
        selection.len(),
        inputs.len()
    );

    let provider = resolve_provider(config)?;
    let board = Arc::new(StatusBoard::new());

    // Register everything as pending before the first task starts so a
    // status observer sees the whole selection immediately.
    let entries: Vec<(String, FileId)> = selection
        .iter()
        .map(|entry| {
            let id = if input::is_url(entry) {
                FileId::for_url(entry)
            } else {
                FileId::for_path(std::path::Path::new(entry)).unwrap_or_else(|_| FileId {
                    name: entry.to_string(),
                    modified_ms: 0,
                })
            };
            board.select(id.clone());
            (entry.to_string(), id)
        })
        .collect();

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(entries.len());
    }

    let tasks = entries.into_iter().map(|(entry, id)| {
        let provider = Arc::clone(&provider);
        let board = Arc::clone(&board);
        let config = config.clone();
        async move { convert_one(&entry, id, &provider, &config, &board).await }
    });

    let files: Vec<FileReport> = futures::future::join_all(tasks).await;

    let succeeded = files.iter().filter(|f| f.is_success()).count();
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(files.len(), succeeded);
    }
    info!(
        "Batch complete: {}/{} file(s) converted in {}ms",
        succeeded,
        files.len(),
        batch_start.elapsed().as_millis()
    );

    Ok(BatchOutput {
        files,
        duration_ms: batch_start.elapsed().as_millis() as u64,
    })
}

/// Extract PDF metadata without converting content.
///
/// Does not require a VLM provider or API key.
pub async fn inspect(input_str: impl AsRef<str>) -> Result<DocumentMetadata, FileError> {
    let resolved = input::resolve_input(input_str.as_ref(), 120).await?;
    render::probe(resolved.path(), None).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Drive one file through the pipeline, translating the outcome into status
/// transitions, progress events, and a report.
async fn convert_one(
    entry: &str,
    id: FileId,
    provider: &Arc<dyn LLMProvider>,
    config: &ConversionConfig,
    board: &StatusBoard,
) -> FileReport {
    let start = Instant::now();
    board.set(&id, FileStatus::Processing);
    if let Some(ref cb) = config.progress_callback {
        cb.on_file_start(&id.name);
    }

    match convert_file(entry, &id, provider, config).await {
        Ok((output_path, stats, layout_summary)) => {
            board.set(&id, FileStatus::Completed);
            if let Some(ref cb) = config.progress_callback {
                cb.on_file_completed(&id.name, stats.pages_rendered);
            }
            FileReport::completed(id, output_path, stats, layout_summary)
        }
        Err(e) => {
            warn!("File '{}' failed: {}", id.name, e);
            board.set(&id, FileStatus::Error(e.to_string()));
            if let Some(ref cb) = config.progress_callback {
                cb.on_file_failed(&id.name, &e.to_string());
            }
            let stats = FileStats {
                total_duration_ms: start.elapsed().as_millis() as u64,
                ..FileStats::default()
            };
            FileReport::failed(id, e, stats)
        }
    }
}

/// The per-file pipeline: resolve → rasterise → encode → synthesize →
/// (paginate) → export.
async fn convert_file(
    entry: &str,
    id: &FileId,
    provider: &Arc<dyn LLMProvider>,
    config: &ConversionConfig,
) -> Result<(std::path::PathBuf, FileStats, Option<layout::LayoutSummary>), FileError> {
    let total_start = Instant::now();

    let resolved = input::resolve_input(entry, config.download_timeout_secs).await?;

    // ── Rasterise ────────────────────────────────────────────────────────
    let render_start = Instant::now();
    let pages = render::rasterize(
        resolved.path(),
        config.max_rendered_pixels,
        config.password.as_deref(),
    )
    .await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    // ── Encode ───────────────────────────────────────────────────────────
    let images = encode::encode_pages(&pages, &id.name);
    if images.is_empty() {
        return Err(FileError::ExtractionEmpty {
            name: id.name.clone(),
        });
    }
    let pages_rendered = images.len();
    debug!("'{}': {} page image(s) ready", id.name, pages_rendered);

    // ── Synthesize (one call for the whole document) ─────────────────────
    let synth_start = Instant::now();
    let (content, usage) = synthesize::synthesize(provider, images, config).await?;
    let synthesis_duration_ms = synth_start.elapsed().as_millis() as u64;

    // ── Paginate + export ────────────────────────────────────────────────
    // The payload variant is fixed by the requested format at synthesis
    // time, so the pairing below is total; a mismatch cannot be reached
    // through the public API.
    let layout_start = Instant::now();
    let (output_path, layout_summary) = match (config.format, content) {
        (OutputFormat::Pdf, SynthesizedContent::Structured(document)) => {
            let geometry = config.geometry;
            let oversample = config.oversample;
            let (bytes, summary) =
                tokio::task::spawn_blocking(move || {
                    layout::render_document(&document, &geometry, oversample)
                })
                .await
                .map_err(|e| FileError::RenderFailed {
                    detail: format!("layout task panicked: {e}"),
                })??;

            let path = export::export_pdf(&bytes, id.stem(), &config.out_dir)
                .await
                .map_err(|e| FileError::RenderFailed {
                    detail: format!("export: {e}"),
                })?;
            (path, Some(summary))
        }
        (OutputFormat::Latex, SynthesizedContent::Markup(markup)) => {
            let path = export::export_markup(&markup, id.stem(), &config.out_dir)
                .await
                .map_err(|e| FileError::RenderFailed {
                    detail: format!("export: {e}"),
                })?;
            (path, None)
        }
        _ => unreachable!("synthesized payload always matches the requested output format"),
    };
    let layout_duration_ms = layout_start.elapsed().as_millis() as u64;

    let stats = FileStats {
        pages_rendered,
        input_tokens: usage.input_tokens,
        output_tokens: usage.output_tokens,
        render_duration_ms,
        synthesis_duration_ms,
        layout_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    Ok((output_path, stats, layout_summary))
}

/// Resolve the VLM provider, from most-specific to least-specific.
///
/// The fallback chain lets library users and CLI users each set exactly as
/// much or as little as they need:
///
/// 1. **Pre-built provider** (`config.provider`) — the caller constructed
///    and configured the provider entirely; we use it as-is. Useful in tests
///    or when the caller needs custom middleware.
///
/// 2. **Named provider + model** (`config.provider_name`) — the caller named
///    a provider (e.g. `"openai"`) and optional model. The factory reads the
///    corresponding API key (`OPENAI_API_KEY`, etc.) from the environment.
///
/// 3. **Environment pair** (`NOTEPRESS_PROVIDER` + `NOTEPRESS_MODEL`) —
///    both set means the execution environment (Makefile, shell script, CI)
///    chose; honoured before auto-detection so the model choice survives
///    even when multiple API keys are present.
///
/// 4. **Full auto-detection** (`ProviderFactory::from_env`) — the factory
///    scans all known API key variables and picks the first available
///    provider, preferring OpenAI when its key is present.
fn resolve_provider(config: &ConversionConfig) -> Result<Arc<dyn LLMProvider>, NotepressError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_vision_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("NOTEPRESS_PROVIDER"),
        std::env::var("NOTEPRESS_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_vision_provider(&prov, &model);
        }
    }

    // Prefer OpenAI explicitly when an OpenAI API key is present so users
    // with multiple provider keys get a predictable default.
    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_vision_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| NotepressError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No VLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

/// Instantiate a named provider with the given model.
fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, NotepressError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        NotepressError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}
