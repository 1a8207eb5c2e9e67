//! Image preprocessing: grayscale + Otsu binarisation.
//!
//! Tesseract reads clean black-on-white glyphs far more reliably than the
//! anti-aliased, sometimes tinted bitmaps pdfium produces for scanned pages.
//! Collapsing every page to pure black and white with an automatically chosen
//! global threshold removes paper texture and scanner noise before OCR.

use image::{DynamicImage, GrayImage};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::stats::histogram;
use thiserror::Error;
use tracing::debug;

/// Errors produced while preparing a page image for OCR.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PreprocessError {
    /// The page image has no pixels to threshold.
    #[error("image is empty ({width}x{height} px)")]
    EmptyImage { width: u32, height: u32 },
}

/// Convert a rasterised page to a single-channel black/white bitmap.
///
/// Every output pixel is either `0` or `255`; a pixel becomes white when its
/// luminance is strictly above the Otsu level. Output dimensions always match
/// the input. Same input, same output.
pub fn preprocess(image: &DynamicImage) -> Result<GrayImage, PreprocessError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(PreprocessError::EmptyImage { width, height });
    }

    let gray = image.to_luma8();
    let level = otsu_level(&gray);
    debug!("Preprocessing {}x{} px, Otsu level {}", width, height, level);

    Ok(threshold(&gray, level, ThresholdType::Binary))
}

/// Otsu's threshold: the intensity that maximises between-class variance.
///
/// Accumulates in `u64`/`f64` so pages with tens of millions of pixels of one
/// shade (a 600 DPI mostly-white page) cannot overflow. Ties keep the lowest
/// level.
fn otsu_level(gray: &GrayImage) -> u8 {
    let luma = histogram(gray);
    let hist = &luma.channels[0];

    let total: u64 = hist.iter().map(|&c| u64::from(c)).sum();
    let weighted_total: u64 = hist
        .iter()
        .enumerate()
        .map(|(level, &c)| level as u64 * u64::from(c))
        .sum();

    let mut best_level = 0u8;
    let mut best_variance = 0.0f64;
    let mut background = 0u64;
    let mut weighted_background = 0u64;

    for (level, &count) in hist.iter().enumerate() {
        background += u64::from(count);
        if background == 0 {
            continue;
        }
        let foreground = total - background;
        if foreground == 0 {
            break;
        }
        weighted_background += level as u64 * u64::from(count);

        let mean_bg = weighted_background as f64 / background as f64;
        let mean_fg = (weighted_total - weighted_background) as f64 / foreground as f64;
        let variance = background as f64 * foreground as f64 * (mean_bg - mean_fg).powi(2);

        if variance > best_variance {
            best_variance = variance;
            best_level = level as u8;
        }
    }

    best_level
}
