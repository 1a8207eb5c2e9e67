//! Layout heuristic: OCR tokens → aligned output paragraphs.
//!
//! The heuristic is intentionally crude. Each token that clears the confidence
//! bar becomes its own paragraph, and its alignment is read off which third of
//! the page its left edge falls in. Nothing is merged, trimmed, or reflowed.
//!
//! ```text
//!  0          W/3         2W/3          W
//!  |   Left    |   Center   |   Right    |
//!              ^            ^
//!        boundaries fall into Center
//! ```

use crate::output::{Alignment, OutputParagraph};
use crate::pipeline::ocr::OcrToken;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Knobs for the layout stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutOptions {
    /// Tokens with confidence at or below this value are dropped. Default: 60.
    pub min_confidence: i32,
    /// Font applied to every paragraph. Default: `"Arial"`.
    pub font_name: String,
    /// Font size in points applied to every paragraph. Default: 12.
    pub font_size_pt: u32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            min_confidence: 60,
            font_name: "Arial".to_string(),
            font_size_pt: 12,
        }
    }
}

impl Alignment {
    /// Classify a token by the page third its left edge falls in.
    ///
    /// Comparisons are strict, so `left == W/3` and `left == 2W/3` are Center.
    pub fn from_position(left: i32, page_width: u32) -> Self {
        let left = f64::from(left);
        let width = f64::from(page_width);
        if left < width / 3.0 {
            Alignment::Left
        } else if left > 2.0 * width / 3.0 {
            Alignment::Right
        } else {
            Alignment::Center
        }
    }
}

/// `true` when the token clears the (strict) confidence threshold.
pub fn is_accepted(token: &OcrToken, options: &LayoutOptions) -> bool {
    token.confidence > options.min_confidence
}

/// Turn one page's tokens into paragraphs, preserving token order.
///
/// Whitespace-only tokens that pass the confidence filter are kept as
/// (visually empty) paragraphs.
pub fn classify(
    tokens: &[OcrToken],
    page_width: u32,
    options: &LayoutOptions,
) -> Vec<OutputParagraph> {
    tokens
        .iter()
        .filter(|t| is_accepted(t, options))
        .map(|t| {
            let alignment = Alignment::from_position(t.left, page_width);
            debug!(
                "Added text: '{}' with confidence {} ({:?})",
                t.text, t.confidence, alignment
            );
            OutputParagraph {
                text: t.text.clone(),
                font_name: options.font_name.clone(),
                font_size_pt: options.font_size_pt,
                alignment,
            }
        })
        .collect()
}
