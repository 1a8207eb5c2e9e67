//! Configuration types for PDF-to-DOCX conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Every knob is fixed for the duration
//! of one run: the same OCR options and layout rules apply to every page.
//!
//! # Design choice: builder over constructor
//! The builder lets callers set only what they care about and rely on
//! documented defaults for the rest; `build()` is the single place where
//! invariants are checked.

use crate::error::Pdf2DocxError;
use crate::pipeline::layout::LayoutOptions;
use crate::pipeline::ocr::OcrOptions;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Configuration for a PDF-to-DOCX conversion.
///
/// # Example
/// ```rust
/// use edgequake_pdf2docx::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .dpi(300)
///     .min_confidence(70)
///     .language("eng+deu")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 72–600. Default: 200.
    ///
    /// Tesseract is tuned for glyphs around 20–30 px tall; 200 DPI gets body
    /// text of a typical scan into that band. Raise it for small print.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 5000.
    ///
    /// A safety cap independent of DPI. Every page stays resident in memory
    /// until the run finishes, so one huge page must not dominate.
    pub max_rendered_pixels: u32,

    /// Page selection. Default: All pages.
    pub pages: PageSelection,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Explicit pdfium library file or directory. Falls back to `PDFIUM_LIB_PATH`.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Tesseract options, fixed per run.
    pub ocr: OcrOptions,

    /// Path to the `tesseract` executable. Default: looked up on `PATH`.
    pub tesseract_path: Option<PathBuf>,

    /// Confidence filter and paragraph font.
    pub layout: LayoutOptions,

    /// Where bare input/output file names are resolved.
    pub paths: PathLayout,

    /// Observer notified as pages are processed.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            max_rendered_pixels: 5000,
            pages: PageSelection::default(),
            password: None,
            pdfium_lib_path: None,
            ocr: OcrOptions::default(),
            tesseract_path: None,
            layout: LayoutOptions::default(),
            paths: PathLayout::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("pages", &self.pages)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("ocr", &self.ocr)
            .field("tesseract_path", &self.tesseract_path)
            .field("layout", &self.layout)
            .field("paths", &self.paths)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
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
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn ocr(mut self, options: OcrOptions) -> Self {
        self.config.ocr = options;
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr.language = lang.into();
        self
    }

    pub fn tessdata_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.ocr.tessdata_dir = Some(dir.into());
        self
    }

    pub fn tesseract_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tesseract_path = Some(path.into());
        self
    }

    pub fn layout(mut self, options: LayoutOptions) -> Self {
        self.config.layout = options;
        self
    }

    pub fn min_confidence(mut self, c: i32) -> Self {
        self.config.layout.min_confidence = c;
        self
    }

    pub fn font(mut self, name: impl Into<String>, size_pt: u32) -> Self {
        self.config.layout.font_name = name.into();
        self.config.layout.font_size_pt = size_pt;
        self
    }

    pub fn paths(mut self, paths: PathLayout) -> Self {
        self.config.paths = paths;
        self
    }

    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.paths.input_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.paths.output_dir = dir.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2DocxError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 600 {
            return Err(Pdf2DocxError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if !(0..=100).contains(&c.layout.min_confidence) {
            return Err(Pdf2DocxError::InvalidConfig(format!(
                "Minimum confidence must be 0–100, got {}",
                c.layout.min_confidence
            )));
        }
        if c.layout.font_name.trim().is_empty() {
            return Err(Pdf2DocxError::InvalidConfig(
                "Font name must not be empty".into(),
            ));
        }
        if c.layout.font_size_pt == 0 {
            return Err(Pdf2DocxError::InvalidConfig(
                "Font size must be ≥ 1pt".into(),
            ));
        }
        if c.ocr.language.trim().is_empty() {
            return Err(Pdf2DocxError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Path layout ──────────────────────────────────────────────────────────

/// Directories bare file names are resolved against.
///
/// Defaults to `pdf/` and `output/` next to the running executable. Absolute
/// names bypass the layout entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathLayout {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathLayout {
    fn default() -> Self {
        let base = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::relative_to(base)
    }
}

impl PathLayout {
    /// `base/pdf` for inputs and `base/output` for outputs.
    pub fn relative_to(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            input_dir: base.join("pdf"),
            output_dir: base.join("output"),
        }
    }

    pub fn resolve_input(&self, name: impl AsRef<Path>) -> PathBuf {
        self.input_dir.join(name)
    }

    pub fn resolve_output(&self, name: impl AsRef<Path>) -> PathBuf {
        self.output_dir.join(name)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Specifies which pages of the PDF to convert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Convert all pages (default).
    #[default]
    All,
    /// Convert a single page (1-indexed).
    Single(usize),
    /// Convert a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Convert specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Selected pages that exist in a `total_pages` document, as sorted,
    /// deduplicated 0-based indices.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let in_document = |p: &usize| (1..=total_pages).contains(p);
        let pages: BTreeSet<usize> = match self {
            PageSelection::All => (1..=total_pages).collect(),
            PageSelection::Single(p) => Some(*p).into_iter().filter(in_document).collect(),
            PageSelection::Range(start, end) => ((*start).max(1)..=(*end).min(total_pages)).collect(),
            PageSelection::Set(pages) => pages.iter().copied().filter(in_document).collect(),
        };
        pages.into_iter().map(|p| p - 1).collect()
    }
}

/// Parses `all`, `5`, `3-15`, `1,3,5` and mixed lists such as `1-3,7,9-10`.
///
/// A mixed list expands into [`PageSelection::Set`]. Pages are 1-indexed.
impl FromStr for PageSelection {
    type Err = Pdf2DocxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        let bad = |msg: String| Pdf2DocxError::InvalidConfig(format!("--pages '{s}': {msg}"));
        let page = |p: &str| -> Result<usize, Pdf2DocxError> {
            match p.trim().parse::<usize>() {
                Ok(0) => Err(bad("pages start at 1".into())),
                Ok(n) => Ok(n),
                Err(_) => Err(bad(format!("'{}' is not a page number", p.trim()))),
            }
        };

        let mut parts = Vec::new();
        for item in s.split(',') {
            let part = match item.split_once('-') {
                Some((a, b)) => {
                    let (a, b) = (page(a)?, page(b)?);
                    if a > b {
                        return Err(bad(format!("range {a}-{b} runs backwards")));
                    }
                    PageSelection::Range(a, b)
                }
                None => PageSelection::Single(page(item)?),
            };
            parts.push(part);
        }

        if parts.len() == 1 {
            return Ok(parts.remove(0));
        }
        let pages = parts
            .into_iter()
            .flat_map(|part| match part {
                PageSelection::Range(a, b) => (a..=b).collect::<Vec<_>>(),
                PageSelection::Single(p) => vec![p],
                _ => Vec::new(),
            })
            .collect();
        Ok(PageSelection::Set(pages))
    }
}
