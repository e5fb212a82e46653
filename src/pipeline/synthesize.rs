//! Content synthesis: one vision call per document.
//!
//! This module converts the ordered page images of a single document into a
//! VLM API call and returns the synthesised content. It is intentionally
//! thin — all prompt engineering lives in [`crate::prompts`] so it can be
//! changed without touching the request plumbing here.
//!
//! Unlike page-at-a-time converters, the whole document travels in ONE
//! request: the model needs to see every page to merge content that runs
//! across page boundaries and to pick a single title. There is no retry
//! loop — a failed call fails the file, and the error is isolated to it.

use crate::config::{ConversionConfig, OutputFormat};
use crate::document::NoteDocument;
use crate::error::FileError;
use crate::output::SynthesizedContent;
use crate::pipeline::cleanup;
use crate::prompts;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Token usage reported by the provider for one synthesis call.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

/// Synthesise one document from its page images.
///
/// ## Message Layout
///
/// The request contains (in order):
/// 1. **System message** — the format-specific transcription prompt (or a
///    user-supplied override)
/// 2. **User message** — every page image as a base64 attachment, in page
///    order (empty text; the images carry all the content)
///
/// ## Errors
///
/// [`FileError::SynthesisFailed`] for provider/network failures;
/// [`FileError::MalformedDocument`] when structured output does not parse
/// against the document schema. Both are per-file and non-fatal to the batch.
pub async fn synthesize(
    provider: &Arc<dyn LLMProvider>,
    images: Vec<ImageData>,
    config: &ConversionConfig,
) -> Result<(SynthesizedContent, TokenUsage), FileError> {
    let start = Instant::now();
    let system_prompt = config
        .system_prompt
        .as_deref()
        .unwrap_or_else(|| prompts::default_prompt(config.format));

    let messages = vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user_with_images("", images),
    ];

    let options = build_options(config);

    let response = provider
        .chat(&messages, Some(&options))
        .await
        .map_err(|e| FileError::SynthesisFailed {
            detail: format!("{e}"),
        })?;

    let usage = TokenUsage {
        input_tokens: response.prompt_tokens as usize,
        output_tokens: response.completion_tokens as usize,
    };
    debug!(
        "Synthesis finished: {} in / {} out tokens, {:?}",
        usage.input_tokens,
        usage.output_tokens,
        start.elapsed()
    );

    let content = match config.format {
        OutputFormat::Pdf => SynthesizedContent::Structured(parse_document(&response.content)?),
        OutputFormat::Latex => SynthesizedContent::Markup(cleanup::clean_markup(&response.content)),
    };

    Ok((content, usage))
}

/// Parse the model's structured response into a [`NoteDocument`].
///
/// Malformed output is a hard error for this file; there is no repair pass
/// beyond stripping an outer code fence.
fn parse_document(raw: &str) -> Result<NoteDocument, FileError> {
    let cleaned = cleanup::clean_structured_response(raw);
    serde_json::from_str(&cleaned).map_err(|e| FileError::MalformedDocument {
        detail: e.to_string(),
    })
}

/// Build `CompletionOptions` from the conversion config.
fn build_options(config: &ConversionConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}
