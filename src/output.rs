//! Output types: the in-memory document and per-run statistics.
//!
//! [`OutputDocument`] is the only state that grows across pages. It is owned
//! by the orchestrator for the whole run and persisted exactly once, after
//! every page has succeeded (see [`crate::pipeline::assemble`]).

use serde::{Deserialize, Serialize};

/// Horizontal alignment of an output paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// One paragraph of the output document, built from a single OCR token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputParagraph {
    pub text: String,
    pub font_name: String,
    pub font_size_pt: u32,
    pub alignment: Alignment,
}

/// A document element in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    Paragraph(OutputParagraph),
    /// Hard page break between two consecutive source pages.
    PageBreak,
}

/// Ordered paragraphs interleaved with page breaks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDocument {
    blocks: Vec<Block>,
    pages: usize,
}

impl OutputDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one page's paragraphs.
    ///
    /// A page break is inserted before every page except the first, so a
    /// document with N pages always holds N − 1 breaks. A page with no
    /// paragraphs still counts as a page.
    pub fn push_page(&mut self, paragraphs: impl IntoIterator<Item = OutputParagraph>) {
        if self.pages > 0 {
            self.blocks.push(Block::PageBreak);
        }
        self.blocks
            .extend(paragraphs.into_iter().map(Block::Paragraph));
        self.pages += 1;
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of pages pushed so far.
    pub fn page_count(&self) -> usize {
        self.pages
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &OutputParagraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::PageBreak => None,
        })
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    pub fn page_break_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::PageBreak))
            .count()
    }
}

/// Statistics for a completed conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages rasterised and processed.
    pub total_pages: usize,
    /// Every row the OCR engine reported, accepted or not.
    pub tokens_seen: usize,
    /// Rows that cleared the confidence filter.
    pub tokens_kept: usize,
    /// Paragraphs written to the document (equals `tokens_kept`).
    pub paragraphs: usize,
    /// Page breaks written to the document.
    pub page_breaks: usize,
    pub render_duration_ms: u64,
    pub ocr_duration_ms: u64,
    pub total_duration_ms: u64,
}
