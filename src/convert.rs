//! Conversion entry points and the pipeline orchestrator.
//!
//! A run moves through a fixed sequence of states:
//!
//! ```text
//! INIT ─▶ RASTERIZED ─▶ (PREPROCESS ─▶ OCR ─▶ LAYOUT) × pages ─▶ ASSEMBLED ─▶ SAVED
//!   └──────────────┴───────────── any error ─────────────────────┴──▶ FAILED
//! ```
//!
//! Every page is rasterised before the first one is recognised, pages are
//! processed strictly in order, and the document is saved exactly once after
//! the last page succeeds. Any failure aborts the run and nothing is written.
//!
//! The pipeline itself is blocking (pdfium and Tesseract are blocking calls).
//! [`convert`] and [`convert_to_file`] move the whole run onto one
//! `spawn_blocking` thread so async callers don't stall their executor;
//! [`convert_blocking`] runs it on the caller's thread.

use crate::config::ConversionConfig;
use crate::error::{PageError, Pdf2DocxError};
use crate::output::{ConversionStats, OutputDocument, OutputParagraph};
use crate::pipeline::input::{ensure_parent_dir, validate_pdf};
use crate::pipeline::layout::{classify, is_accepted};
use crate::pipeline::ocr::{OcrEngine, TesseractCli};
use crate::pipeline::preprocess::preprocess;
use crate::pipeline::render::{PageImage, PdfiumRasterizer, Rasterizer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span};

/// Convert `input_name` (resolved against `config.paths.input_dir`) into
/// `output_name` (resolved against `config.paths.output_dir`).
///
/// This is the primary entry point for the library. Absolute names bypass
/// the path layout.
///
/// # Errors
/// Any failure aborts the run; see [`Pdf2DocxError`]. A missing pdfium
/// library is reported as [`Pdf2DocxError::RendererNotInstalled`].
pub async fn convert(
    input_name: impl AsRef<Path>,
    output_name: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Pdf2DocxError> {
    let input = config.paths.resolve_input(input_name);
    let output = config.paths.resolve_output(output_name);
    convert_to_file(input, output, config).await
}

/// Convert the PDF at `input_path` and write the `.docx` to `output_path`.
///
/// Paths are used as given. The output directory is created if missing.
pub async fn convert_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Pdf2DocxError> {
    let converter = Converter::new(config.clone());
    let input = input_path.as_ref().to_path_buf();
    let output = output_path.as_ref().to_path_buf();

    converter.run_blocking(input, output).await
}

/// Synchronous variant of [`convert_to_file`].
pub fn convert_blocking(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Pdf2DocxError> {
    Converter::new(config.clone()).convert_paths(input_path.as_ref(), output_path.as_ref())
}

/// The pipeline orchestrator.
///
/// Holds the run configuration and the two engine-backed stages. Both stages
/// sit behind traits so tests (or embedders) can swap them out.
#[derive(Clone)]
pub struct Converter {
    config: ConversionConfig,
    rasterizer: Arc<dyn Rasterizer>,
    engine: Arc<dyn OcrEngine>,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Converter {
    /// pdfium rasteriser and the default Tesseract engine for `config`.
    pub fn new(config: ConversionConfig) -> Self {
        let rasterizer: Arc<dyn Rasterizer> = Arc::new(PdfiumRasterizer::from_config(&config));
        let engine = default_engine(&config);
        Self {
            config,
            rasterizer,
            engine,
        }
    }

    pub fn with_rasterizer(mut self, rasterizer: impl Rasterizer + 'static) -> Self {
        self.rasterizer = Arc::new(rasterizer);
        self
    }

    pub fn with_engine(mut self, engine: impl OcrEngine + 'static) -> Self {
        self.engine = Arc::new(engine);
        self
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Resolve names through the configured [`crate::config::PathLayout`], then convert.
    pub fn convert(
        &self,
        input_name: impl AsRef<Path>,
        output_name: impl AsRef<Path>,
    ) -> Result<ConversionStats, Pdf2DocxError> {
        let input = self.config.paths.resolve_input(input_name);
        let output = self.config.paths.resolve_output(output_name);
        self.convert_paths(&input, &output)
    }

    /// Run the whole pipeline and save the document to `output_path`.
    pub fn convert_paths(
        &self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<ConversionStats, Pdf2DocxError> {
        let span = info_span!(
            "convert",
            input = %input_path.display(),
            output = %output_path.display()
        );
        let _enter = span.enter();

        let total_start = Instant::now();
        info!("Converting PDF: {}", input_path.display());
        info!("Output will be saved to: {}", output_path.display());

        validate_pdf(input_path)?;
        ensure_parent_dir(output_path)?;

        let (doc, mut stats) = self.build_document(input_path)?;

        doc.save(output_path)?;
        stats.total_duration_ms = total_start.elapsed().as_millis() as u64;

        info!(
            "Conversion completed: {} pages, {} paragraphs, {}ms",
            stats.total_pages, stats.paragraphs, stats.total_duration_ms
        );
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_conversion_complete(stats.total_pages, stats.paragraphs);
        }

        Ok(stats)
    }

    /// Rasterise and lay out every page without saving anything.
    pub fn build_document(
        &self,
        input_path: &Path,
    ) -> Result<(OutputDocument, ConversionStats), Pdf2DocxError> {
        debug!("Converting PDF to images");
        let render_start = Instant::now();
        let pages = self.rasterizer.rasterize(input_path)?;
        let render_duration_ms = render_start.elapsed().as_millis() as u64;
        let total_pages = pages.len();
        info!("Rendered {} pages in {}ms", total_pages, render_duration_ms);

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_conversion_start(total_pages);
        }

        let mut doc = OutputDocument::new();
        let mut stats = ConversionStats {
            total_pages,
            render_duration_ms,
            ..ConversionStats::default()
        };

        let ocr_start = Instant::now();
        for (i, page) in pages.iter().enumerate() {
            let page_num = i + 1;
            info!("Processing page {}/{}", page_num, total_pages);
            if let Some(ref cb) = self.config.progress_callback {
                cb.on_page_start(page_num, total_pages);
            }

            let (paragraphs, seen) = match self.process_page(page) {
                Ok(result) => result,
                Err(source) => {
                    error!("Page {} failed: {}", page.index + 1, source);
                    if let Some(ref cb) = self.config.progress_callback {
                        cb.on_page_error(page_num, total_pages, &source.to_string());
                    }
                    return Err(Pdf2DocxError::PageFailed {
                        page: page.index + 1,
                        source,
                    });
                }
            };

            stats.tokens_seen += seen;
            stats.tokens_kept += paragraphs.len();
            if let Some(ref cb) = self.config.progress_callback {
                cb.on_page_complete(page_num, total_pages, paragraphs.len());
            }
            doc.push_page(paragraphs);
        }
        stats.ocr_duration_ms = ocr_start.elapsed().as_millis() as u64;

        stats.paragraphs = doc.paragraph_count();
        stats.page_breaks = doc.page_break_count();
        Ok((doc, stats))
    }

    /// Preprocess → OCR → layout for one page.
    ///
    /// Returns the page's paragraphs and the number of OCR rows seen.
    fn process_page(
        &self,
        page: &PageImage,
    ) -> Result<(Vec<OutputParagraph>, usize), PageError> {
        debug!(
            "Preprocessing page {} ({}x{} px)",
            page.index + 1,
            page.width(),
            page.height()
        );
        let binary = preprocess(&page.image)?;

        debug!("Performing OCR on page {}", page.index + 1);
        let tokens = self.engine.recognize(&binary, page.index, &self.config.ocr)?;

        debug!("Processing OCR data for page {}", page.index + 1);
        let paragraphs = classify(&tokens, binary.width(), &self.config.layout);
        debug!(
            "Page {}: {} of {} OCR rows kept",
            page.index + 1,
            tokens
                .iter()
                .filter(|t| is_accepted(t, &self.config.layout))
                .count(),
            tokens.len()
        );

        Ok((paragraphs, tokens.len()))
    }

    /// Run [`Converter::convert_paths`] on a blocking worker thread.
    pub async fn run_blocking(
        self,
        input_path: PathBuf,
        output_path: PathBuf,
    ) -> Result<ConversionStats, Pdf2DocxError> {
        tokio::task::spawn_blocking(move || self.convert_paths(&input_path, &output_path))
            .await
            .map_err(|e| Pdf2DocxError::Internal(format!("Conversion task panicked: {}", e)))?
    }
}

#[cfg(not(feature = "leptess"))]
fn default_engine(config: &ConversionConfig) -> Arc<dyn OcrEngine> {
    match config.tesseract_path {
        Some(ref program) => Arc::new(TesseractCli::with_program(program)),
        None => Arc::new(TesseractCli::default()),
    }
}

/// With `leptess` compiled in, Tesseract runs in-process unless an explicit
/// executable was configured.
#[cfg(feature = "leptess")]
fn default_engine(config: &ConversionConfig) -> Arc<dyn OcrEngine> {
    use crate::pipeline::ocr::LeptessEngine;
    match config.tesseract_path {
        Some(ref program) => Arc::new(TesseractCli::with_program(program)),
        None => Arc::new(LeptessEngine::default()),
    }
}
