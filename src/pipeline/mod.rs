//! Pipeline stages for PDF-to-DOCX conversion.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested on its own and the engine-backed stages can be swapped behind their
//! traits ([`render::Rasterizer`], [`ocr::OcrEngine`]).
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ preprocess ──▶ ocr ──▶ layout ──▶ assemble
//! (check)   (pdfium)   (Otsu b/w)    (tess)  (thirds)   (docx-rs)
//!                      └────────── once per page ──────┘
//! ```
//!
//! 1. [`input`]      — validate the source PDF, prepare the output directory
//! 2. [`render`]     — rasterise every selected page up front
//! 3. [`preprocess`] — grayscale + Otsu binarisation
//! 4. [`ocr`]        — recognise tokens with geometry and confidence
//! 5. [`layout`]     — confidence filter, alignment by page thirds
//! 6. [`assemble`]   — write paragraphs and page breaks as `.docx`

pub mod assemble;
pub mod input;
pub mod layout;
pub mod ocr;
pub mod preprocess;
pub mod render;
