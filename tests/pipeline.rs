//! Pipeline integration tests with scripted engines.
//!
//! The pdfium and Tesseract stages are replaced by in-memory fakes through
//! the `Rasterizer` and `OcrEngine` traits, so these tests run without any
//! native library installed. Everything between them (preprocessing, layout,
//! assembly, atomic save, error propagation) is the real code.
//!
//! Run with:
//!   cargo test --test pipeline

use edgequake_pdf2docx::{
    Alignment, Block, ConversionConfig, ConversionProgressCallback, Converter, OcrEngine,
    OcrError, OcrOptions, OcrToken, PageError, PageImage, Pdf2DocxError, PreprocessError,
    Rasterizer,
};
use image::{DynamicImage, GrayImage, Luma};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

// ── Fakes ────────────────────────────────────────────────────────────────────

const PAGE_WIDTH: u32 = 300;
const PAGE_HEIGHT: u32 = 120;

/// Produces `pages` synthetic scans, or a fixed error.
struct FakeRasterizer {
    pages: usize,
    fail_with_missing_renderer: bool,
    blank_page: Option<usize>,
    calls: Arc<AtomicUsize>,
}

impl FakeRasterizer {
    fn pages(pages: usize) -> Self {
        Self {
            pages,
            fail_with_missing_renderer: false,
            blank_page: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// `pages` pages, with a zero-width bitmap at index `page`.
    fn with_blank_page(pages: usize, page: usize) -> Self {
        Self {
            blank_page: Some(page),
            ..Self::pages(pages)
        }
    }

    fn missing_renderer() -> Self {
        Self {
            pages: 0,
            fail_with_missing_renderer: true,
            blank_page: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Rasterizer for FakeRasterizer {
    fn rasterize(&self, _pdf_path: &Path) -> Result<Vec<PageImage>, Pdf2DocxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_with_missing_renderer {
            return Err(Pdf2DocxError::RendererNotInstalled {
                detail: "libpdfium.so: not found".to_string(),
            });
        }

        Ok((0..self.pages)
            .map(|index| {
                if self.blank_page == Some(index) {
                    return PageImage {
                        index,
                        image: DynamicImage::ImageLuma8(GrayImage::new(0, PAGE_HEIGHT)),
                    };
                }
                // Light paper with a dark stripe: something for Otsu to split.
                let gray = GrayImage::from_fn(PAGE_WIDTH, PAGE_HEIGHT, |x, _| {
                    if (40..80).contains(&x) {
                        Luma([20u8])
                    } else {
                        Luma([230u8])
                    }
                });
                PageImage {
                    index,
                    image: DynamicImage::ImageLuma8(gray),
                }
            })
            .collect())
    }
}

/// Returns scripted tokens per page; pages listed in `fail_on` error out.
#[derive(Default)]
struct ScriptedEngine {
    tokens: HashMap<usize, Vec<(String, i32, i32)>>,
    fail_on: Vec<usize>,
    seen_pages: Arc<Mutex<Vec<usize>>>,
    seen_widths: Arc<Mutex<Vec<u32>>>,
}

impl ScriptedEngine {
    fn page(mut self, page: usize, tokens: &[(&str, i32, i32)]) -> Self {
        self.tokens.insert(
            page,
            tokens
                .iter()
                .map(|(t, c, l)| (t.to_string(), *c, *l))
                .collect(),
        );
        self
    }

    fn failing_on(mut self, page: usize) -> Self {
        self.fail_on.push(page);
        self
    }
}

impl OcrEngine for ScriptedEngine {
    fn recognize(
        &self,
        image: &GrayImage,
        page: usize,
        _options: &OcrOptions,
    ) -> Result<Vec<OcrToken>, OcrError> {
        self.seen_pages.lock().unwrap().push(page);
        self.seen_widths.lock().unwrap().push(image.width());

        // Preprocessing must hand us a strictly black-and-white bitmap.
        assert!(image.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));

        if self.fail_on.contains(&page) {
            return Err(OcrError::EngineFailed {
                status: "exit status: 1".to_string(),
                stderr: "Error in pixReadMem".to_string(),
            });
        }

        Ok(self
            .tokens
            .get(&page)
            .map(|rows| {
                rows.iter()
                    .map(|(text, confidence, left)| OcrToken {
                        text: text.clone(),
                        confidence: *confidence,
                        left: *left,
                        top: 10,
                        width: 20,
                        height: 12,
                        page,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Records callback events in order.
#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl ConversionProgressCallback for Recorder {
    fn on_conversion_start(&self, total_pages: usize) {
        self.events.lock().unwrap().push(format!("start {total_pages}"));
    }
    fn on_page_complete(&self, page_num: usize, _total: usize, paragraphs: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("page {page_num} {paragraphs}"));
    }
    fn on_page_error(&self, page_num: usize, _total: usize, _error: &str) {
        self.events.lock().unwrap().push(format!("error {page_num}"));
    }
    fn on_conversion_complete(&self, total_pages: usize, paragraphs: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("done {total_pages} {paragraphs}"));
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

struct Workspace {
    dir: TempDir,
    input: PathBuf,
    output: PathBuf,
}

/// Route library logs through the test harness; `RUST_LOG=debug` to see them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn workspace() -> Workspace {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("pdf").join("input.pdf");
    std::fs::create_dir_all(input.parent().unwrap()).unwrap();
    std::fs::write(&input, b"%PDF-1.4\n%fake scan\n").unwrap();
    let output = dir.path().join("output").join("output.docx");
    Workspace { dir, input, output }
}

fn converter(rasterizer: FakeRasterizer, engine: ScriptedEngine) -> Converter {
    Converter::new(ConversionConfig::default())
        .with_rasterizer(rasterizer)
        .with_engine(engine)
}

fn docx_children(path: &Path) -> usize {
    let bytes = std::fs::read(path).unwrap();
    let docx = docx_rs::read_docx(&bytes).expect("output must be a readable docx");
    docx.document.children.len()
}

fn texts(blocks: &[Block]) -> Vec<Option<&str>> {
    blocks
        .iter()
        .map(|b| match b {
            Block::Paragraph(p) => Some(p.text.as_str()),
            Block::PageBreak => None,
        })
        .collect()
}

// ── Happy path ───────────────────────────────────────────────────────────────

#[test]
fn three_pages_produce_two_page_breaks_in_order() {
    let ws = workspace();
    let engine = ScriptedEngine::default()
        .page(0, &[("Title", 95, 120), ("first", 90, 0)])
        .page(1, &[("second", 88, 10)])
        .page(2, &[("third", 70, 250), ("end", 99, 0)]);

    let conv = converter(FakeRasterizer::pages(3), engine);
    let (doc, stats) = conv.build_document(&ws.input).unwrap();

    assert_eq!(
        texts(doc.blocks()),
        vec![
            Some("Title"),
            Some("first"),
            None,
            Some("second"),
            None,
            Some("third"),
            Some("end"),
        ]
    );
    assert_eq!(doc.page_count(), 3);
    assert_eq!(stats.page_breaks, 2);
    assert_eq!(stats.paragraphs, 5);
    assert!(!matches!(doc.blocks().last(), Some(Block::PageBreak)));
}

#[test]
fn convert_paths_writes_readable_docx() {
    let ws = workspace();
    let engine = ScriptedEngine::default()
        .page(0, &[("Hello", 91, 5), ("World", 92, 200)])
        .page(1, &[("Again", 93, 5)]);

    let stats = converter(FakeRasterizer::pages(2), engine)
        .convert_paths(&ws.input, &ws.output)
        .unwrap();

    assert!(ws.output.is_file(), "output directory must be created");
    assert_eq!(stats.total_pages, 2);
    assert_eq!(stats.paragraphs, 3);
    // Three paragraphs plus one page break.
    assert_eq!(docx_children(&ws.output), 4);
}

#[test]
fn convert_resolves_names_through_path_layout() {
    let ws = workspace();
    let config = ConversionConfig::builder()
        .input_dir(ws.dir.path().join("pdf"))
        .output_dir(ws.dir.path().join("output"))
        .build()
        .unwrap();
    let conv = Converter::new(config)
        .with_rasterizer(FakeRasterizer::pages(1))
        .with_engine(ScriptedEngine::default().page(0, &[("only", 80, 0)]));

    conv.convert("input.pdf", "output.docx").unwrap();
    assert!(ws.output.is_file());
}

#[test]
fn rasterizer_runs_once_and_pages_are_recognised_in_order() {
    let ws = workspace();
    let rasterizer = FakeRasterizer::pages(4);
    let calls = Arc::clone(&rasterizer.calls);
    let engine = ScriptedEngine::default();
    let seen = Arc::clone(&engine.seen_pages);
    let widths = Arc::clone(&engine.seen_widths);

    converter(rasterizer, engine)
        .convert_paths(&ws.input, &ws.output)
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3]);
    assert!(widths.lock().unwrap().iter().all(|&w| w == PAGE_WIDTH));
}

// ── Layout rules through the pipeline ────────────────────────────────────────

#[test]
fn confidence_sixty_is_dropped_sixty_one_is_kept() {
    let ws = workspace();
    let engine = ScriptedEngine::default().page(
        0,
        &[("noise", -1, 0), ("borderline", 60, 0), ("kept", 61, 0)],
    );

    let (doc, stats) = converter(FakeRasterizer::pages(1), engine)
        .build_document(&ws.input)
        .unwrap();

    assert_eq!(texts(doc.blocks()), vec![Some("kept")]);
    assert_eq!(stats.tokens_seen, 3);
    assert_eq!(stats.tokens_kept, 1);
}

#[test]
fn alignment_follows_page_thirds() {
    let ws = workspace();
    // PAGE_WIDTH = 300: thirds at 100 and 200, boundaries go to Center.
    let engine = ScriptedEngine::default().page(
        0,
        &[
            ("left", 90, 99),
            ("edge-low", 90, 100),
            ("middle", 90, 150),
            ("edge-high", 90, 200),
            ("right", 90, 201),
        ],
    );

    let (doc, _) = converter(FakeRasterizer::pages(1), engine)
        .build_document(&ws.input)
        .unwrap();

    let alignments: Vec<Alignment> = doc.paragraphs().map(|p| p.alignment).collect();
    assert_eq!(
        alignments,
        vec![
            Alignment::Left,
            Alignment::Center,
            Alignment::Center,
            Alignment::Center,
            Alignment::Right,
        ]
    );
    assert!(doc
        .paragraphs()
        .all(|p| p.font_name == "Arial" && p.font_size_pt == 12));
}

#[test]
fn whitespace_tokens_become_empty_paragraphs() {
    let ws = workspace();
    let engine = ScriptedEngine::default().page(0, &[("a", 90, 0), (" ", 90, 0), ("b", 90, 0)]);

    let (doc, _) = converter(FakeRasterizer::pages(1), engine)
        .build_document(&ws.input)
        .unwrap();

    assert_eq!(doc.paragraph_count(), 3);
}

#[test]
fn page_without_tokens_still_counts_as_a_page() {
    let ws = workspace();
    let engine = ScriptedEngine::default().page(1, &[("text", 90, 0)]);

    let (doc, stats) = converter(FakeRasterizer::pages(3), engine)
        .build_document(&ws.input)
        .unwrap();

    assert_eq!(texts(doc.blocks()), vec![None, Some("text"), None]);
    assert_eq!(stats.page_breaks, 2);
}

#[test]
fn zero_page_pdf_saves_empty_document() {
    let ws = workspace();
    let stats = converter(FakeRasterizer::pages(0), ScriptedEngine::default())
        .convert_paths(&ws.input, &ws.output)
        .unwrap();

    assert_eq!(stats.total_pages, 0);
    assert_eq!(stats.page_breaks, 0);
    assert!(ws.output.is_file());
    assert_eq!(docx_children(&ws.output), 0);
}

// ── Failure handling ─────────────────────────────────────────────────────────

#[test]
fn page_failure_aborts_without_writing_output() {
    let ws = workspace();
    let engine = ScriptedEngine::default()
        .page(0, &[("fine", 90, 0)])
        .failing_on(1)
        .page(2, &[("never", 90, 0)]);
    let seen = Arc::clone(&engine.seen_pages);

    let err = converter(FakeRasterizer::pages(3), engine)
        .convert_paths(&ws.input, &ws.output)
        .unwrap_err();

    assert!(matches!(
        err,
        Pdf2DocxError::PageFailed {
            page: 2,
            source: PageError::Ocr(OcrError::EngineFailed { .. })
        }
    ));
    assert_eq!(err.page(), Some(2));
    assert_eq!(*seen.lock().unwrap(), vec![0, 1], "page 3 must not run");
    assert!(!ws.output.exists());
}

#[test]
fn preprocess_failure_aborts_before_ocr_and_writes_nothing() {
    let ws = workspace();
    let engine = ScriptedEngine::default()
        .page(0, &[("fine", 90, 0)])
        .page(1, &[("unreachable", 90, 0)]);
    let seen = Arc::clone(&engine.seen_pages);

    let err = converter(FakeRasterizer::with_blank_page(3, 1), engine)
        .convert_paths(&ws.input, &ws.output)
        .unwrap_err();

    assert!(
        matches!(
            err,
            Pdf2DocxError::PageFailed {
                page: 2,
                source: PageError::Preprocess(PreprocessError::EmptyImage { width: 0, .. })
            }
        ),
        "got: {err:?}"
    );
    assert_eq!(*seen.lock().unwrap(), vec![0], "OCR must not see the blank page");
    assert!(!ws.output.exists());
}

#[test]
fn failed_run_leaves_existing_output_untouched() {
    let ws = workspace();
    std::fs::create_dir_all(ws.output.parent().unwrap()).unwrap();
    std::fs::write(&ws.output, b"previous result").unwrap();

    let engine = ScriptedEngine::default().failing_on(0);
    converter(FakeRasterizer::pages(1), engine)
        .convert_paths(&ws.input, &ws.output)
        .unwrap_err();

    assert_eq!(std::fs::read(&ws.output).unwrap(), b"previous result");
}

#[test]
fn missing_renderer_is_reported_distinctly() {
    let ws = workspace();
    let err = converter(FakeRasterizer::missing_renderer(), ScriptedEngine::default())
        .convert_paths(&ws.input, &ws.output)
        .unwrap_err();

    assert!(err.is_renderer_missing());
    assert!(!ws.output.exists());
}

#[test]
fn missing_input_fails_before_rasterising() {
    let ws = workspace();
    let rasterizer = FakeRasterizer::pages(1);
    let calls = Arc::clone(&rasterizer.calls);

    let err = converter(rasterizer, ScriptedEngine::default())
        .convert_paths(&ws.dir.path().join("nope.pdf"), &ws.output)
        .unwrap_err();

    assert!(matches!(err, Pdf2DocxError::FileNotFound { .. }));
    assert!(!err.is_renderer_missing());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!ws.output.exists());
}

#[test]
fn non_pdf_input_is_rejected() {
    let ws = workspace();
    let bogus = ws.dir.path().join("notes.pdf");
    std::fs::write(&bogus, b"just text").unwrap();

    let err = converter(FakeRasterizer::pages(1), ScriptedEngine::default())
        .convert_paths(&bogus, &ws.output)
        .unwrap_err();

    assert!(matches!(err, Pdf2DocxError::NotAPdf { .. }));
}

// ── Progress callbacks ───────────────────────────────────────────────────────

#[test]
fn callbacks_fire_in_page_order() {
    let ws = workspace();
    let recorder = Arc::new(Recorder::default());
    let config = ConversionConfig::builder()
        .progress_callback(Arc::clone(&recorder) as Arc<dyn ConversionProgressCallback>)
        .build()
        .unwrap();
    let engine = ScriptedEngine::default()
        .page(0, &[("a", 90, 0), ("b", 90, 0)])
        .page(1, &[("c", 90, 0)]);

    Converter::new(config)
        .with_rasterizer(FakeRasterizer::pages(2))
        .with_engine(engine)
        .convert_paths(&ws.input, &ws.output)
        .unwrap();

    assert_eq!(
        *recorder.events.lock().unwrap(),
        vec!["start 2", "page 1 2", "page 2 1", "done 2 3"]
    );
}

#[test]
fn callbacks_report_page_error_and_skip_completion() {
    let ws = workspace();
    let recorder = Arc::new(Recorder::default());
    let config = ConversionConfig::builder()
        .progress_callback(Arc::clone(&recorder) as Arc<dyn ConversionProgressCallback>)
        .build()
        .unwrap();

    Converter::new(config)
        .with_rasterizer(FakeRasterizer::pages(2))
        .with_engine(ScriptedEngine::default().failing_on(1))
        .convert_paths(&ws.input, &ws.output)
        .unwrap_err();

    assert_eq!(
        *recorder.events.lock().unwrap(),
        vec!["start 2", "page 1 0", "error 2"]
    );
}

// ── Async entry ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn run_blocking_converts_off_the_async_executor() {
    let ws = workspace();
    let conv = converter(
        FakeRasterizer::pages(2),
        ScriptedEngine::default().page(0, &[("async", 90, 0)]),
    );

    let stats = conv
        .run_blocking(ws.input.clone(), ws.output.clone())
        .await
        .unwrap();

    assert_eq!(stats.total_pages, 2);
    assert_eq!(docx_children(&ws.output), 2);
}

#[tokio::test]
async fn convert_to_file_reports_missing_input() {
    let ws = workspace();
    let err = edgequake_pdf2docx::convert_to_file(
        ws.dir.path().join("absent.pdf"),
        &ws.output,
        &ConversionConfig::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Pdf2DocxError::FileNotFound { .. }));
}

#[test]
fn convert_resolves_bare_names_against_input_dir() {
    let ws = workspace();
    let config = ConversionConfig::builder()
        .input_dir(ws.dir.path().join("elsewhere"))
        .output_dir(ws.dir.path().join("output"))
        .build()
        .unwrap();

    let err = tokio_test::block_on(edgequake_pdf2docx::convert(
        "input.pdf",
        "output.docx",
        &config,
    ))
    .unwrap_err();

    match err {
        Pdf2DocxError::FileNotFound { path } => {
            assert_eq!(path, ws.dir.path().join("elsewhere").join("input.pdf"));
        }
        other => panic!("expected FileNotFound, got {other:?}"),
    }
    assert!(!ws.output.exists());
}

#[test]
fn converter_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Converter>();
}
