//! PDF rasterisation: render pages to `DynamicImage` via pdfium.
//!
//! All selected pages are rendered up front and held in memory together;
//! the rest of the pipeline then walks them one at a time. Memory therefore
//! scales with page count × resolution. `max_rendered_pixels` caps either
//! edge so one oversized page cannot exhaust memory on its own.
//!
//! ## Binding pdfium
//!
//! pdfium is a shared library loaded at runtime. We look for it, in order:
//!
//! 1. `pdfium_lib_path` from the config, else the `PDFIUM_LIB_PATH` env var
//!    (a library file or the directory holding it)
//! 2. the directory of the running executable
//! 3. the current working directory
//! 4. the system library search path
//!
//! If none loads, rasterisation fails with
//! [`Pdf2DocxError::RendererNotInstalled`]; see
//! [`renderer_install_guidance`] for what to tell the user.

use crate::config::{ConversionConfig, PageSelection};
use crate::error::Pdf2DocxError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One rasterised page.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 0-based page index in the source PDF.
    pub index: usize,
    pub image: DynamicImage,
}

impl PageImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Anything that can turn a PDF file into page bitmaps.
///
/// Implementations return one image per selected page, in page order.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, pdf_path: &Path) -> Result<Vec<PageImage>, Pdf2DocxError>;
}

/// Rasteriser backed by the pdfium shared library.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    dpi: u32,
    max_pixels: u32,
    pages: PageSelection,
    password: Option<String>,
    lib_path: Option<PathBuf>,
}

impl PdfiumRasterizer {
    pub fn from_config(config: &ConversionConfig) -> Self {
        Self {
            dpi: config.dpi,
            max_pixels: config.max_rendered_pixels,
            pages: config.pages.clone(),
            password: config.password.clone(),
            lib_path: config.pdfium_lib_path.clone(),
        }
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf_path: &Path) -> Result<Vec<PageImage>, Pdf2DocxError> {
        let pdfium = bind_pdfium(self.lib_path.as_deref())?;
        let password = self.password.as_deref();

        let document = pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                if password.is_some() {
                    Pdf2DocxError::WrongPassword {
                        path: pdf_path.to_path_buf(),
                    }
                } else {
                    Pdf2DocxError::PasswordRequired {
                        path: pdf_path.to_path_buf(),
                    }
                }
            } else {
                Pdf2DocxError::CorruptPdf {
                    path: pdf_path.to_path_buf(),
                    detail: err_str,
                }
            }
        })?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        info!("PDF loaded: {} pages", total_pages);

        let indices = self.pages.to_indices(total_pages);
        if indices.is_empty() && total_pages > 0 {
            return Err(Pdf2DocxError::PageOutOfRange {
                selection: format!("{:?}", self.pages),
                total: total_pages,
            });
        }

        let render_config = PdfRenderConfig::new()
            .scale_page_by_factor(self.dpi as f32 / 72.0)
            .set_maximum_width(self.max_pixels as i32)
            .set_maximum_height(self.max_pixels as i32);

        let mut results = Vec::with_capacity(indices.len());

        for idx in indices {
            let page = pages
                .get(idx as u16)
                .map_err(|e| Pdf2DocxError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                })?;

            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                Pdf2DocxError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );

            results.push(PageImage { index: idx, image });
        }

        Ok(results)
    }
}

/// Bind to the pdfium library, trying each known location in turn.
fn bind_pdfium(explicit: Option<&Path>) -> Result<Pdfium, Pdf2DocxError> {
    let mut attempts: Vec<String> = Vec::new();

    for candidate in library_candidates(explicit) {
        match Pdfium::bind_to_library(&candidate) {
            Ok(bindings) => {
                debug!("Bound pdfium from {}", candidate.display());
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => attempts.push(format!("{}: {:?}", candidate.display(), e)),
        }
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => {
            debug!("Bound pdfium from system library path");
            Ok(Pdfium::new(bindings))
        }
        Err(e) => {
            attempts.push(format!("system library: {:?}", e));
            warn!("Could not bind pdfium ({} locations tried)", attempts.len());
            Err(Pdf2DocxError::RendererNotInstalled {
                detail: attempts.join("; "),
            })
        }
    }
}

/// Candidate library file paths, most specific first.
fn library_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    let from_env = std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from);
    if let Some(p) = explicit.map(Path::to_path_buf).or(from_env) {
        if p.is_dir() {
            candidates.push(Pdfium::pdfium_platform_library_name_at_path(&p));
        } else {
            candidates.push(p);
        }
    }

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(Pdfium::pdfium_platform_library_name_at_path(&exe_dir));
    }
    candidates.push(Pdfium::pdfium_platform_library_name_at_path("./"));

    candidates
}

/// Platform-specific instructions for installing pdfium.
///
/// `os` is a value of [`std::env::consts::OS`]; anything other than
/// `"windows"` or `"macos"` gets the Linux instructions.
pub fn renderer_install_guidance(os: &str) -> Vec<String> {
    const RELEASES: &str = "https://github.com/bblanchon/pdfium-binaries/releases";
    match os {
        "windows" => vec![
            format!("1. Download pdfium-win-x64.tgz from {RELEASES}"),
            "2. Extract bin\\pdfium.dll next to pdf2docx.exe, or set PDFIUM_LIB_PATH to its full path"
                .to_string(),
        ],
        "macos" => vec![
            format!(
                "1. Download pdfium-mac-arm64.tgz (Apple Silicon) or pdfium-mac-x64.tgz (Intel) from {RELEASES}"
            ),
            "2. Run: export PDFIUM_LIB_PATH=/path/to/lib/libpdfium.dylib".to_string(),
        ],
        _ => vec![
            format!("1. Download pdfium-linux-x64.tgz (or pdfium-linux-arm64.tgz) from {RELEASES}"),
            "2. Run: sudo cp lib/libpdfium.so /usr/local/lib/ && sudo ldconfig".to_string(),
        ],
    }
}
