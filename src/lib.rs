//! # edgequake-pdf2docx
//!
//! Convert scanned PDF documents into editable Word (`.docx`) files with OCR.
//!
//! ## Why this crate?
//!
//! A scanned PDF is a stack of pictures: there is no text layer to extract.
//! This crate rasterises each page, cleans the bitmap, reads it with
//! Tesseract, and writes one paragraph per recognised token, aligned left,
//! centre, or right depending on where the token sits on the page.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input       validate path and %PDF magic
//!  ├─ 2. Render      rasterise every page via pdfium
//!  ├─ 3. Preprocess  grayscale + Otsu binarisation
//!  ├─ 4. OCR         Tesseract, single-block mode, TSV tokens
//!  ├─ 5. Layout      drop conf ≤ 60, align by page thirds
//!  └─ 6. Assemble    paragraphs + page breaks → .docx (atomic save)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2docx::{convert_to_file, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let stats = convert_to_file("scan.pdf", "scan.docx", &config).await?;
//!     eprintln!("{} pages, {} paragraphs", stats.total_pages, stats.paragraphs);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature   | Default | Description |
//! |-----------|---------|-------------|
//! | `cli`     | on      | Enables the `pdf2docx` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `leptess` | off     | Run Tesseract in-process instead of spawning `tesseract` |
//!
//! ## Runtime requirements
//!
//! * the pdfium shared library (`PDFIUM_LIB_PATH`, next to the binary, or on
//!   the system library path)
//! * the `tesseract` executable with the requested language data

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, PageSelection, PathLayout};
pub use convert::{convert, convert_blocking, convert_to_file, Converter};
pub use error::{PageError, Pdf2DocxError};
pub use output::{Alignment, Block, ConversionStats, OutputDocument, OutputParagraph};
pub use pipeline::layout::LayoutOptions;
pub use pipeline::ocr::{OcrEngine, OcrError, OcrOptions, OcrToken, TesseractCli};
pub use pipeline::preprocess::PreprocessError;
pub use pipeline::render::{renderer_install_guidance, PageImage, PdfiumRasterizer, Rasterizer};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
