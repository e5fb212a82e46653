//! CLI binary for notepress.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` and prints per-file results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use notepress::{
    convert_batch, inspect, ConversionConfig, ConversionProgress, OutputFormat, ProgressCallback,
};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// ── Terminal styling ─────────────────────────────────────────────────────────

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

fn styled(style: &str, s: &str) -> String {
    format!("{style}{s}{RESET}")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Mutable progress state; files complete out of order, so start times are
/// keyed by file name.
#[derive(Default)]
struct BatchState {
    started: HashMap<String, Instant>,
    failed: usize,
}

/// Terminal progress: a cargo-style bar at the bottom plus one printed line
/// per finished file.
struct CliProgress {
    bar: ProgressBar,
    state: Mutex<BatchState>,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: ProgressBar::hidden(),
            state: Mutex::new(BatchState::default()),
        })
    }

    fn elapsed_secs(&self, name: &str) -> f64 {
        self.state
            .lock()
            .unwrap()
            .started
            .remove(name)
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ConversionProgress for CliProgress {
    fn on_batch_start(&self, total_files: usize) {
        let style = ProgressStyle::with_template(
            "{prefix:>12.cyan.bold} [{bar:30}] {pos}/{len}: {wide_msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");

        self.bar.set_style(style);
        self.bar.set_prefix("Converting");
        self.bar.set_length(total_files as u64);
        self.bar
            .set_draw_target(indicatif::ProgressDrawTarget::stderr());
    }

    fn on_file_start(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .started
            .insert(name.to_string(), Instant::now());
        self.bar.set_message(name.to_string());
    }

    fn on_file_completed(&self, name: &str, pages: usize) {
        let secs = self.elapsed_secs(name);
        self.bar.println(format!(
            "{} {name} {}",
            styled(GREEN, " converted"),
            styled(DIM, &format!("({pages} page(s), {secs:.1}s)")),
        ));
        self.bar.inc(1);
    }

    fn on_file_failed(&self, name: &str, error: &str) {
        let secs = self.elapsed_secs(name);
        self.state.lock().unwrap().failed += 1;

        let mut reason = error.to_string();
        if reason.chars().count() > 100 {
            reason = reason.chars().take(99).chain(['…']).collect();
        }
        self.bar.println(format!(
            "{} {name} {} — {reason}",
            styled(RED, "    failed"),
            styled(DIM, &format!("({secs:.1}s)")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_files: usize, succeeded: usize) {
        self.bar.finish_and_clear();
        let summary = format!("{succeeded} of {total_files} file(s) converted");
        if succeeded == total_files {
            eprintln!("{}", styled(GREEN, &summary));
        } else {
            eprintln!("{} {}", styled(RED, &summary), styled(DIM, "(see above)"));
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert handwritten notes to a typeset PDF (written next to the input)
  notepress lecture4.pdf

  # Several files at once; non-PDFs in the selection are ignored
  notepress week1.pdf week2.pdf sketch.jpg

  # LaTeX output instead of PDF
  notepress --format latex lecture4.pdf

  # Choose model and output directory
  notepress --model gpt-4.1 --provider openai -o converted/ notes.pdf

  # Convert from a URL
  notepress https://example.com/scans/week3.pdf

  # Inspect PDF metadata (no API key needed)
  notepress --inspect-only notes.pdf

  # JSON batch report
  notepress --json notes.pdf > report.json

OUTPUT:
  PDF format    <name>_converted.pdf   typeset from the transcribed document
  LaTeX format  <name>.tex             complete LaTeX source from the model

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY        OpenAI API key
  ANTHROPIC_API_KEY     Anthropic API key
  GEMINI_API_KEY        Google Gemini API key
  NOTEPRESS_PROVIDER    Override provider (openai, anthropic, gemini, ollama)
  NOTEPRESS_MODEL       Override model ID
  PDFIUM_LIB_PATH       Path to an existing libpdfium build

SETUP:
  1. Install pdfium:    https://github.com/bblanchon/pdfium-binaries
  2. Set API key:       export OPENAI_API_KEY=sk-...
  3. Convert:           notepress notes.pdf
"#;

/// Convert scanned and handwritten PDF notes using Vision LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "notepress",
    version,
    about = "Convert scanned and handwritten PDF notes into typeset PDF or LaTeX using Vision LLMs",
    long_about = "Convert PDFs of scanned or handwritten notes (local files or URLs) into a clean \
typeset PDF or a LaTeX document. Transcription and structuring are delegated to a Vision Language \
Model; supports OpenAI, Anthropic, Google Gemini, and any OpenAI-compatible endpoint.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file paths or HTTP/HTTPS URLs. Non-PDF entries are ignored.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output format.
    #[arg(long, env = "NOTEPRESS_FORMAT", value_enum, default_value = "pdf")]
    format: FormatArg,

    /// Directory exported files are written into.
    #[arg(short, long, env = "NOTEPRESS_OUT_DIR", default_value = ".")]
    out_dir: PathBuf,

    /// VLM model ID (e.g. gpt-4.1-mini, gpt-4.1, claude-sonnet-4-20250514).
    #[arg(long, env = "NOTEPRESS_MODEL")]
    model: Option<String>,

    /// VLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "NOTEPRESS_PROVIDER")]
    provider: Option<String>,

    /// Maximum rendered page-image dimension in pixels.
    #[arg(long, env = "NOTEPRESS_MAX_PIXELS", default_value_t = 2000)]
    max_pixels: u32,

    /// Max VLM output tokens per document.
    #[arg(long, env = "NOTEPRESS_MAX_TOKENS", default_value_t = 8192)]
    max_tokens: usize,

    /// VLM temperature (0.0–2.0).
    #[arg(long, env = "NOTEPRESS_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Diagram oversampling factor (1.0–4.0).
    #[arg(long, env = "NOTEPRESS_OVERSAMPLE", default_value_t = 2.0)]
    oversample: f32,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "NOTEPRESS_PASSWORD")]
    password: Option<String>,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "NOTEPRESS_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Output the batch report as JSON instead of human-readable lines.
    #[arg(long, env = "NOTEPRESS_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "NOTEPRESS_NO_PROGRESS")]
    no_progress: bool,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "NOTEPRESS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "NOTEPRESS_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "NOTEPRESS_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Pdf,
    Latex,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Pdf => OutputFormat::Pdf,
            FormatArg::Latex => OutputFormat::Latex,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Library INFO logs repeat what the progress bar already shows, so they
    // stay off while the bar is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let default_filter = match (cli.verbose, cli.quiet || show_progress) {
        (true, _) => "debug",
        (false, true) => "error",
        (false, false) => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.inspect_only {
        return run_inspect(&cli).await;
    }

    let progress_cb: Option<ProgressCallback> = show_progress
        .then(|| CliProgress::new() as Arc<dyn ConversionProgress>);

    let config = build_config(&cli, progress_cb).await?;
    let batch = convert_batch(&cli.inputs, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&batch).context("Failed to serialise batch report")?
        );
    } else if !cli.quiet && !show_progress {
        // Plain per-file lines when the progress callback is disabled.
        for report in &batch.files {
            match &report.output_path {
                Some(path) => eprintln!("{}  →  {}", report.file.name, path.display()),
                None => eprintln!(
                    "{}  failed: {}",
                    report.file.name,
                    report
                        .error
                        .as_ref()
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "unknown error".into())
                ),
            }
        }
        eprintln!(
            "Converted {}/{} file(s) in {}ms",
            batch.succeeded(),
            batch.files.len(),
            batch.duration_ms
        );
    }

    if batch.succeeded() == 0 {
        anyhow::bail!("all {} file(s) failed to convert", batch.files.len());
    }

    Ok(())
}

/// `--inspect-only`: print metadata for every input, no VLM involved.
async fn run_inspect(cli: &Cli) -> Result<()> {
    for input in &cli.inputs {
        let meta = inspect(input)
            .await
            .with_context(|| format!("Failed to inspect '{input}'"))?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialise metadata")?
            );
            continue;
        }

        println!("{}", styled(BOLD, input));
        for (label, value) in [
            ("Title", meta.title.as_deref()),
            ("Author", meta.author.as_deref()),
            ("Producer", meta.producer.as_deref()),
        ] {
            if let Some(v) = value {
                println!("  {label:<12} {v}");
            }
        }
        println!("  {:<12} {}", "Pages", meta.page_count);
        println!("  {:<12} {}", "PDF version", meta.pdf_version);
        println!();
    }
    Ok(())
}

/// Map CLI args to `ConversionConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {:?}", path))?,
        )
    } else {
        None
    };

    let mut builder = ConversionConfig::builder()
        .format(cli.format.into())
        .out_dir(cli.out_dir.clone())
        .max_rendered_pixels(cli.max_pixels)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .oversample(cli.oversample)
        .download_timeout_secs(cli.download_timeout);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref password) = cli.password {
        builder = builder.password(password);
    }
    if let Some(prompt) = system_prompt {
        builder = builder.system_prompt(prompt);
    }

    builder.build().context("Invalid configuration")
}
