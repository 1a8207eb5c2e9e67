//! CLI binary for edgequake-pdf2docx.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, prints results, and owns the process exit policy:
//! every failure exits with status 1, and a missing PDF renderer first
//! prints platform-specific install instructions.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2docx::{
    convert, renderer_install_guidance, ConversionConfig, ConversionProgressCallback,
    PageSelection, PathLayout, Pdf2DocxError, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar with one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// Spinner until the page count is known.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Rendering");
        bar.set_message("Rasterising PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("OCR");
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, paragraphs: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{paragraphs:>5} paragraphs")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(error),
        ));
        self.bar.abandon();
    }

    fn on_conversion_complete(&self, _total_pages: usize, _paragraphs: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert pdf/input.pdf → output/output.docx (next to the binary)
  pdf2docx

  # Named files, resolved against pdf/ and output/
  pdf2docx scan.pdf scan.docx

  # Absolute paths bypass the pdf/ and output/ folders
  pdf2docx /data/scan.pdf -o /tmp/scan.docx

  # Higher resolution, German + English, stricter filter
  pdf2docx --dpi 300 --lang deu+eng --min-confidence 75 scan.pdf

  # Machine-readable statistics
  pdf2docx --json scan.pdf

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  PDF2DOCX_INPUT_DIR      Override the pdf/ input folder
  PDF2DOCX_OUTPUT_DIR     Override the output/ folder
  PDF2DOCX_TESSDATA_DIR   Directory with Tesseract language data
  RUST_LOG                Fine-grained log filter (overrides -v / -q)

REQUIREMENTS:
  pdfium       https://github.com/bblanchon/pdfium-binaries/releases
  tesseract    apt install tesseract-ocr  |  brew install tesseract
"#;

/// Convert scanned PDF files to editable DOCX using OCR.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2docx",
    version,
    about = "Convert scanned PDF files to editable DOCX using OCR",
    long_about = "Rasterise each page of a scanned PDF, binarise it, read it with Tesseract, \
and write one aligned paragraph per recognised token into a Word document.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input PDF name (resolved against --input-dir unless absolute).
    #[arg(default_value = "input.pdf")]
    input: PathBuf,

    /// Output DOCX name (resolved against --output-dir unless absolute).
    #[arg(default_value = "output.docx")]
    output_name: PathBuf,

    /// Output DOCX path; takes precedence over the positional output name.
    #[arg(short, long, env = "PDF2DOCX_OUTPUT")]
    output: Option<PathBuf>,

    /// Folder bare input names are resolved against. Default: <exe dir>/pdf.
    #[arg(long, env = "PDF2DOCX_INPUT_DIR")]
    input_dir: Option<PathBuf>,

    /// Folder bare output names are resolved against. Default: <exe dir>/output.
    #[arg(long, env = "PDF2DOCX_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Rendering DPI (72–600).
    #[arg(long, env = "PDF2DOCX_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Page selection: all, 5, 3-15, 1,3,5,7, or 1-3,7.
    #[arg(long, env = "PDF2DOCX_PAGES", default_value = "all")]
    pages: PageSelection,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2DOCX_PASSWORD")]
    password: Option<String>,

    /// Tesseract language(s), e.g. eng or eng+deu.
    #[arg(long = "lang", env = "PDF2DOCX_LANG", default_value = "eng")]
    language: String,

    /// Drop OCR tokens at or below this confidence (0–100).
    #[arg(long, env = "PDF2DOCX_MIN_CONFIDENCE", default_value_t = 60)]
    min_confidence: i32,

    /// Font applied to every paragraph.
    #[arg(long, env = "PDF2DOCX_FONT", default_value = "Arial")]
    font: String,

    /// Font size in points applied to every paragraph.
    #[arg(long, env = "PDF2DOCX_FONT_SIZE", default_value_t = 12)]
    font_size: u32,

    /// Path to the tesseract executable.
    #[arg(long, env = "PDF2DOCX_TESSERACT")]
    tesseract: Option<PathBuf>,

    /// Directory holding Tesseract's *.traineddata files.
    #[arg(long, env = "PDF2DOCX_TESSDATA_DIR")]
    tessdata_dir: Option<PathBuf>,

    /// Path to libpdfium (file or directory).
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium: Option<PathBuf>,

    /// Print conversion statistics as JSON on stdout.
    #[arg(long, env = "PDF2DOCX_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2DOCX_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2DOCX_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2DOCX_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Initialised once per process. Library INFO logs are hidden while the
    // progress bar is active; the bar already reports per-page progress.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli, show_progress).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Conversion failed: {:#}", err);
            debug!("Error detail: {:?}", err);

            for line in failure_report(&err, std::env::consts::OS) {
                eprintln!("{line}");
            }
            ExitCode::from(1)
        }
    }
}

async fn run(cli: &Cli, show_progress: bool) -> Result<()> {
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(cli, progress_cb)?;
    let output_name = cli.output.as_ref().unwrap_or(&cli.output_name);
    let output_path = config.paths.resolve_output(output_name);

    let stats = convert(&cli.input, output_name, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("Failed to serialise statistics")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{}  {} pages  {} paragraphs  {}ms  →  {}",
            green("✔"),
            stats.total_pages,
            stats.paragraphs,
            stats.total_duration_ms,
            bold(&output_path.display().to_string()),
        );
        eprintln!(
            "   {} OCR rows seen  /  {} kept",
            dim(&stats.tokens_seen.to_string()),
            dim(&stats.tokens_kept.to_string()),
        );
        println!("Conversion completed successfully!");
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut paths = PathLayout::default();
    if let Some(ref dir) = cli.input_dir {
        paths.input_dir = dir.clone();
    }
    if let Some(ref dir) = cli.output_dir {
        paths.output_dir = dir.clone();
    }

    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .pages(cli.pages.clone())
        .language(&cli.language)
        .min_confidence(cli.min_confidence)
        .font(&cli.font, cli.font_size)
        .paths(paths);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(ref program) = cli.tesseract {
        builder = builder.tesseract_path(program);
    }
    if let Some(ref dir) = cli.tessdata_dir {
        builder = builder.tessdata_dir(dir);
    }
    if let Some(ref lib) = cli.pdfium {
        builder = builder.pdfium_lib_path(lib);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// `true` when any error in the chain is a missing PDF renderer.
fn renderer_missing(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|e| e.downcast_ref::<Pdf2DocxError>())
        .any(Pdf2DocxError::is_renderer_missing)
}

/// Lines printed to stderr for a failed run on `os`.
fn failure_report(err: &anyhow::Error, os: &str) -> Vec<String> {
    if renderer_missing(err) {
        let mut lines = vec![
            format!(
                "{} The PDF renderer (pdfium) is not installed or could not be loaded.",
                red("Error:")
            ),
            "Installation instructions:".to_string(),
        ];
        lines.extend(renderer_install_guidance(os));
        lines
    } else {
        vec![format!("{} {:#}", red("Error:"), err)]
    }
}
