//! Configuration types for note conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across the per-file tasks, serialise the
//! interesting fields for logging, and diff two runs to understand why their
//! outputs differ.
//!
//! # Design choice: builder over constructor
//! A fifteen-field constructor is unreadable and breaks on every new field.
//! The builder pattern lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::NotepressError;
use crate::layout::PageGeometry;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// The requested output kind for a conversion batch.
///
/// This is the binary format toggle of the user surface. It decides which
/// system prompt the synthesizer sends and which exporter runs; the payload
/// type is matched to it at the type level (the paginating renderer only
/// accepts a structured document, the markup exporter only text).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Lay the synthesised document model out as a typeset PDF. (default)
    #[default]
    Pdf,
    /// Write the raw LaTeX markup returned by the model to a `.tex` file.
    Latex,
}

/// Configuration for a note-conversion batch.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use notepress::{ConversionConfig, OutputFormat};
///
/// let config = ConversionConfig::builder()
///     .format(OutputFormat::Latex)
///     .model("gpt-4.1-mini")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Requested output kind. Default: [`OutputFormat::Pdf`].
    pub format: OutputFormat,

    /// Maximum rendered page-image dimension (width or height) in pixels.
    /// Default: 2000.
    ///
    /// Handwritten pages need enough pixel density for the VLM to resolve
    /// individual strokes, but an A3 sketchbook page rendered unbounded could
    /// exhaust memory. This caps either dimension, scaling the other
    /// proportionally.
    pub max_rendered_pixels: u32,

    /// VLM model identifier, e.g. "gpt-4.1-mini", "claude-sonnet-4-20250514".
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// VLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, uses `ProviderFactory::from_env()`.
    pub provider_name: Option<String>,

    /// Pre-constructed VLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for the completion. Default: 0.1.
    ///
    /// Low temperature keeps the model faithful to what is actually on the
    /// page — exactly what you want for transcription.
    pub temperature: f32,

    /// Maximum tokens the model may generate per document. Default: 8192.
    ///
    /// Unlike page-at-a-time converters, notepress sends every page image in
    /// one request and receives the whole document back, so the ceiling must
    /// cover dense multi-page notes. Setting it too low truncates the JSON
    /// mid-structure, which surfaces as a malformed-response error.
    pub max_tokens: usize,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Custom system prompt. If None, uses the built-in prompt for the
    /// selected [`OutputFormat`].
    pub system_prompt: Option<String>,

    /// Page geometry for the paginating renderer. Default: A4 with 20 mm
    /// vertical and 15 mm horizontal margins.
    pub geometry: PageGeometry,

    /// Diagram oversampling factor. Default: 2.0.
    ///
    /// SVG diagrams are rasterised at this multiple of the output pixel
    /// density and placed scaled down, so curves stay sharp in the final PDF
    /// instead of blurring at print resolution.
    pub oversample: f32,

    /// Directory exported files are written into. Default: ".".
    pub out_dir: PathBuf,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional per-file progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Pdf,
            max_rendered_pixels: 2000,
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.1,
            max_tokens: 8192,
            password: None,
            system_prompt: None,
            geometry: PageGeometry::default(),
            oversample: 2.0,
            out_dir: PathBuf::from("."),
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("format", &self.format)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("geometry", &self.geometry)
            .field("oversample", &self.oversample)
            .field("out_dir", &self.out_dir)
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn geometry(mut self, geometry: PageGeometry) -> Self {
        self.config.geometry = geometry;
        self
    }

    pub fn oversample(mut self, factor: f32) -> Self {
        self.config.oversample = factor.clamp(1.0, 4.0);
        self
    }

    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.out_dir = dir.into();
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, NotepressError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(NotepressError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if !c.geometry.is_usable() {
            return Err(NotepressError::InvalidConfig(format!(
                "page geometry leaves no usable content area: {:?}",
                c.geometry
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_format_is_pdf() {
        assert_eq!(ConversionConfig::default().format, OutputFormat::Pdf);
    }

    #[test]
    fn builder_clamps_temperature() {
        let config = ConversionConfig::builder()
            .temperature(7.5)
            .build()
            .unwrap();
        assert_eq!(config.temperature, 2.0);
    }

    #[test]
    fn builder_clamps_oversample() {
        let config = ConversionConfig::builder().oversample(0.1).build().unwrap();
        assert_eq!(config.oversample, 1.0);
    }

    #[test]
    fn builder_rejects_zero_max_tokens() {
        assert!(ConversionConfig::builder().max_tokens(0).build().is_err());
    }

    #[test]
    fn builder_rejects_degenerate_geometry() {
        let geometry = PageGeometry {
            page_height_mm: 30.0,
            margin_top_mm: 20.0,
            margin_bottom_mm: 20.0,
            ..PageGeometry::default()
        };
        assert!(ConversionConfig::builder().geometry(geometry).build().is_err());
    }
}
