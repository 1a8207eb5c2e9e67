//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline walks the document. This is the pipeline's explicit
//! observability context: the library never reaches for a global reporter,
//! and logging goes through `tracing` spans owned by the caller's subscriber.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2docx::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct ParagraphCounter {
//!     paragraphs: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for ParagraphCounter {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, paragraphs: usize) {
//!         self.paragraphs.fetch_add(paragraphs, Ordering::SeqCst);
//!         eprintln!("Page {}/{}: {} paragraphs", page_num, total_pages, paragraphs);
//!     }
//! }
//!
//! let counter = Arc::new(ParagraphCounter { paragraphs: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the conversion pipeline as it processes each page.
///
/// Pages are processed strictly one after another, so callbacks never
/// overlap; the `Send + Sync` bound only lets the config cross into the
/// blocking worker thread. All methods default to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after rasterisation, before the first page is processed.
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before a page is preprocessed.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — pages in this run
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page has been laid out.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — pages in this run
    /// * `paragraphs`  — paragraphs the page contributed
    fn on_page_complete(&self, page_num: usize, total_pages: usize, paragraphs: usize) {
        let _ = (page_num, total_pages, paragraphs);
    }

    /// Called when a page fails. The run aborts right after.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after the document has been saved.
    fn on_conversion_complete(&self, total_pages: usize, paragraphs: usize) {
        let _ = (total_pages, paragraphs);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
