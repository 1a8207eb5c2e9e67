//! OCR engine adapter: preprocessed bitmap → ordered OCR tokens.
//!
//! The pipeline talks to Tesseract through the [`OcrEngine`] trait so the
//! orchestrator never depends on how recognition is actually performed. Two
//! engines ship with the crate:
//!
//! * [`TesseractCli`] (default) — spawns the `tesseract` executable and reads
//!   its TSV report from stdout. Needs nothing at build time.
//! * `LeptessEngine` (feature `leptess`) — links libtesseract in-process.
//!
//! Both produce TSV and share [`parse_tsv`], so their token streams are
//! identical for the same image and options.

use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;
use tracing::debug;

/// One recognised unit of text with its geometry in the preprocessed image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrToken {
    /// Recognised text; may be empty or whitespace-only.
    pub text: String,
    /// Engine confidence, 0–100. `-1` marks rows with no usable text.
    pub confidence: i32,
    /// Bounding-box left edge in pixels.
    pub left: i32,
    /// Bounding-box top edge in pixels.
    pub top: i32,
    /// Bounding-box width in pixels.
    pub width: i32,
    /// Bounding-box height in pixels.
    pub height: i32,
    /// 0-based index of the page the token was read from.
    pub page: usize,
}

/// Recognition options, fixed for the whole conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrOptions {
    /// Tesseract language code(s), e.g. `"eng"` or `"eng+deu"`. Default: `"eng"`.
    pub language: String,

    /// Page segmentation mode. Default: 6 (a single uniform block of text).
    pub page_seg_mode: u8,

    /// OCR engine mode. Default: 3 (default engine, LSTM network when available).
    pub engine_mode: u8,

    /// Use the old x-height estimation (`textord_old_xheight`). Default: true.
    ///
    /// Copes better with pages mixing irregular text sizes.
    pub old_xheight: bool,

    /// Directory holding `*.traineddata`. Default: the engine's own tessdata dir.
    pub tessdata_dir: Option<PathBuf>,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            page_seg_mode: 6,
            engine_mode: 3,
            old_xheight: true,
            tessdata_dir: None,
        }
    }
}

impl OcrOptions {
    /// Command-line flags understood by the `tesseract` executable.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(ref dir) = self.tessdata_dir {
            args.push("--tessdata-dir".to_string());
            args.push(dir.display().to_string());
        }
        args.extend([
            "--oem".to_string(),
            self.engine_mode.to_string(),
            "--psm".to_string(),
            self.page_seg_mode.to_string(),
            "-l".to_string(),
            self.language.clone(),
            "-c".to_string(),
            format!("textord_old_xheight={}", u8::from(self.old_xheight)),
        ]);
        args
    }
}

/// Errors raised by an OCR engine.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The engine binary or library is not installed.
    #[error("OCR engine '{program}' is not installed or not in PATH")]
    EngineUnavailable { program: String },

    /// The engine ran but reported failure.
    #[error("OCR engine exited with {status}: {stderr}")]
    EngineFailed { status: String, stderr: String },

    /// The engine cannot honour one of the configured options.
    #[error("OCR option '{option}' is not supported: {detail}")]
    UnsupportedOption { option: String, detail: String },

    /// The engine produced output we could not parse.
    #[error("malformed OCR output at line {line}: {detail}")]
    MalformedOutput { line: usize, detail: String },

    /// The page bitmap could not be handed to the engine.
    #[error("failed to encode page image for OCR: {0}")]
    Encode(#[from] image::ImageError),

    /// Temp-file or process I/O failed.
    #[error("OCR I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything that can turn a preprocessed bitmap into OCR tokens.
///
/// Implementations must return tokens in the engine's scan order and must not
/// drop low-confidence rows; filtering is the layout stage's job.
pub trait OcrEngine: Send + Sync {
    /// Recognise text on one page.
    fn recognize(
        &self,
        image: &GrayImage,
        page: usize,
        options: &OcrOptions,
    ) -> Result<Vec<OcrToken>, OcrError>;
}

// ── Tesseract executable ─────────────────────────────────────────────────

/// Drives the `tesseract` command-line program.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: PathBuf,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self {
            program: PathBuf::from("tesseract"),
        }
    }
}

impl TesseractCli {
    /// Use a specific `tesseract` binary instead of the one on `PATH`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(
        &self,
        image: &GrayImage,
        page: usize,
        options: &OcrOptions,
    ) -> Result<Vec<OcrToken>, OcrError> {
        let input = tempfile::Builder::new()
            .prefix("pdf2docx-page-")
            .suffix(".png")
            .tempfile()?;
        image.save_with_format(input.path(), image::ImageFormat::Png)?;

        debug!(
            "Running {} on page {} ({}x{} px)",
            self.program.display(),
            page + 1,
            image.width(),
            image.height()
        );

        let output = Command::new(&self.program)
            .arg(input.path())
            .arg("stdout")
            .args(options.to_args())
            .arg("tsv")
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    OcrError::EngineUnavailable {
                        program: self.program.display().to_string(),
                    }
                } else {
                    OcrError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(OcrError::EngineFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_tsv(&String::from_utf8_lossy(&output.stdout), page)
    }
}

// ── In-process Tesseract ─────────────────────────────────────────────────

#[cfg(feature = "leptess")]
const LEPTESS_ENGINE_MODE: u8 = 3;

/// Runs Tesseract in-process through `leptess`.
///
/// `LepTess` always initialises with the default engine mode (3), so any
/// other `engine_mode` is rejected rather than silently ignored.
#[cfg(feature = "leptess")]
#[derive(Debug, Clone, Default)]
pub struct LeptessEngine;

#[cfg(feature = "leptess")]
impl OcrEngine for LeptessEngine {
    fn recognize(
        &self,
        image: &GrayImage,
        page: usize,
        options: &OcrOptions,
    ) -> Result<Vec<OcrToken>, OcrError> {
        use leptess::{LepTess, Variable};

        let unavailable = |e: &dyn std::fmt::Display| OcrError::EngineFailed {
            status: "libtesseract".to_string(),
            stderr: e.to_string(),
        };

        if options.engine_mode != LEPTESS_ENGINE_MODE {
            return Err(OcrError::UnsupportedOption {
                option: "engine_mode".to_string(),
                detail: format!(
                    "in-process Tesseract only runs mode {LEPTESS_ENGINE_MODE}, got {}",
                    options.engine_mode
                ),
            });
        }

        let data_path = options
            .tessdata_dir
            .as_ref()
            .map(|dir| dir.to_string_lossy().into_owned());
        let mut lt = LepTess::new(data_path.as_deref(), &options.language).map_err(|_| {
            OcrError::EngineUnavailable {
                program: format!("libtesseract ({})", options.language),
            }
        })?;
        lt.set_variable(
            Variable::TesseditPagesegMode,
            &options.page_seg_mode.to_string(),
        )
        .map_err(|e| unavailable(&e))?;
        lt.set_variable(
            Variable::TextordOldXheight,
            if options.old_xheight { "1" } else { "0" },
        )
        .map_err(|e| unavailable(&e))?;

        let mut png = std::io::Cursor::new(Vec::new());
        image.write_to(&mut png, image::ImageFormat::Png)?;
        lt.set_image_from_mem(png.get_ref())
            .map_err(|e| unavailable(&e))?;

        let tsv = lt.get_tsv_text(0).map_err(|e| unavailable(&e))?;
        parse_tsv(&tsv, page)
    }
}

// ── TSV parsing ──────────────────────────────────────────────────────────

const TSV_COLUMNS: usize = 12;

/// Parse Tesseract's TSV report into tokens, preserving row order.
///
/// Every data row becomes a token, including block/line rows that carry
/// confidence `-1` and empty text. Fractional confidences are truncated
/// toward zero. A leading header row is skipped; blank lines are ignored.
pub fn parse_tsv(tsv: &str, page: usize) -> Result<Vec<OcrToken>, OcrError> {
    let mut tokens = Vec::new();

    for (i, raw) in tsv.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with("level\t") {
            continue;
        }

        let fields: Vec<&str> = line.splitn(TSV_COLUMNS, '\t').collect();
        if fields.len() < TSV_COLUMNS - 1 {
            return Err(OcrError::MalformedOutput {
                line: line_no,
                detail: format!("expected {} columns, got {}", TSV_COLUMNS, fields.len()),
            });
        }

        let int = |idx: usize, name: &str| -> Result<i32, OcrError> {
            fields[idx]
                .trim()
                .parse::<i32>()
                .map_err(|e| OcrError::MalformedOutput {
                    line: line_no,
                    detail: format!("bad {name} '{}': {e}", fields[idx]),
                })
        };

        let confidence = fields[10]
            .trim()
            .parse::<f32>()
            .map(|c| c.trunc() as i32)
            .map_err(|e| OcrError::MalformedOutput {
                line: line_no,
                detail: format!("bad conf '{}': {e}", fields[10]),
            })?;

        tokens.push(OcrToken {
            text: fields.get(11).copied().unwrap_or_default().to_string(),
            confidence,
            left: int(6, "left")?,
            top: int(7, "top")?,
            width: int(8, "width")?,
            height: int(9, "height")?,
            page,
        });
    }

    debug!("Parsed {} OCR rows for page {}", tokens.len(), page + 1);
    Ok(tokens)
}
