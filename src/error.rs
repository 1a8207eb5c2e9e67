//! Error types for the edgequake-pdf2docx library.
//!
//! Two layers reflect where a failure happens:
//!
//! * [`Pdf2DocxError`] — **Fatal**: returned from the `convert*` entry points.
//!   Every failure aborts the whole run; no partial document is ever saved.
//!
//! * [`PageError`] — the stage-level cause (preprocessing or OCR) of a failed
//!   page. It is never returned on its own; it travels as the `#[source]` of
//!   [`Pdf2DocxError::PageFailed`] so callers can walk the full error chain.
//!
//! The missing-renderer case is a distinct variant rather than a process exit:
//! only the outermost boundary (the CLI) decides to terminate.

use crate::pipeline::ocr::OcrError;
use crate::pipeline::preprocess::PreprocessError;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-pdf2docx library.
#[derive(Debug, Error)]
pub enum Pdf2DocxError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Rasterisation errors ──────────────────────────────────────────────
    /// The pdfium shared library could not be located or loaded.
    #[error("PDF renderer (pdfium) is not installed or could not be loaded: {detail}")]
    RendererNotInstalled { detail: String },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The page selection matches none of the document's pages.
    #[error("Page selection {selection} is out of range (document has {total} pages)")]
    PageOutOfRange { selection: String, total: usize },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── Page pipeline errors ──────────────────────────────────────────────
    /// Preprocessing or OCR failed for one page; the run is aborted.
    #[error("Conversion failed on page {page}")]
    PageFailed {
        page: usize,
        #[source]
        source: PageError,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output document.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2DocxError {
    /// `true` when the run failed because pdfium could not be loaded.
    ///
    /// The CLI uses this to print install instructions and exit with status 1.
    pub fn is_renderer_missing(&self) -> bool {
        matches!(self, Pdf2DocxError::RendererNotInstalled { .. })
    }

    /// 1-indexed page number the error is attached to, if any.
    pub fn page(&self) -> Option<usize> {
        match self {
            Pdf2DocxError::PageFailed { page, .. }
            | Pdf2DocxError::RasterisationFailed { page, .. } => Some(*page),
            _ => None,
        }
    }
}

/// Stage-level cause of a failed page.
#[derive(Debug, Error)]
pub enum PageError {
    /// Grayscale conversion or thresholding failed.
    #[error("preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),

    /// The OCR engine failed or is unavailable.
    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),
}
