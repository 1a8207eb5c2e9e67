//! Document assembly: [`OutputDocument`] → `.docx` on disk.
//!
//! Rendering goes through `docx-rs`. Each paragraph carries exactly one run
//! with the configured font and size; page breaks become a paragraph holding a
//! single page-break run, which is how Word itself serialises a hard break.
//!
//! The file is packed into a temp file in the destination directory and then
//! renamed over the target, so a failed save never leaves a truncated
//! document behind.

use crate::error::Pdf2DocxError;
use crate::output::{Alignment, Block, OutputDocument, OutputParagraph};
use docx_rs::{AlignmentType, BreakType, Docx, Paragraph, Run, RunFonts};
use std::path::Path;
use tracing::{debug, info};

impl From<Alignment> for AlignmentType {
    fn from(a: Alignment) -> Self {
        match a {
            Alignment::Left => AlignmentType::Left,
            Alignment::Center => AlignmentType::Center,
            Alignment::Right => AlignmentType::Right,
        }
    }
}

fn render_paragraph(p: &OutputParagraph) -> Paragraph {
    let fonts = RunFonts::new()
        .ascii(&p.font_name)
        .hi_ansi(&p.font_name)
        .cs(&p.font_name);
    // Word sizes are in half-points.
    let run = Run::new()
        .add_text(&p.text)
        .fonts(fonts)
        .size(p.font_size_pt as usize * 2);
    Paragraph::new().add_run(run).align(p.alignment.into())
}

/// Build the `docx-rs` document for `doc` without touching the file system.
pub fn to_docx(doc: &OutputDocument) -> Docx {
    doc.blocks()
        .iter()
        .fold(Docx::new(), |docx, block| match block {
            Block::Paragraph(p) => docx.add_paragraph(render_paragraph(p)),
            Block::PageBreak => {
                docx.add_paragraph(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)))
            }
        })
}

impl OutputDocument {
    /// Persist the document as `.docx` at `path`, atomically.
    ///
    /// The parent directory must already exist.
    pub fn save(&self, path: &Path) -> Result<(), Pdf2DocxError> {
        let write_failed = |source: std::io::Error| Pdf2DocxError::OutputWriteFailed {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::Builder::new()
            .prefix(".pdf2docx-")
            .suffix(".docx.tmp")
            .tempfile_in(dir)
            .map_err(write_failed)?;

        debug!(
            "Packing {} blocks into {}",
            self.blocks().len(),
            tmp.path().display()
        );
        to_docx(self)
            .build()
            .pack(tmp.as_file_mut())
            .map_err(|e| write_failed(std::io::Error::other(e.to_string())))?;

        tmp.persist(path).map_err(|e| write_failed(e.error))?;

        info!(
            "Saved {} paragraphs, {} page breaks to {}",
            self.paragraph_count(),
            self.page_break_count(),
            path.display()
        );
        Ok(())
    }
}
