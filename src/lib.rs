//! # pdfsift
//!
//! Find text in a folder of PDFs, page by page, with OCR for scanned pages.
//!
//! pdfsift owns the search orchestration: pattern compilation, document and
//! page traversal, the "is this page's text good enough" heuristic, snippets,
//! progress and cancellation. PDF decoding and OCR sit behind the
//! [`DocumentBackend`] and [`OcrEngine`] traits; [`backend`] ships adapters
//! for `lopdf`, `pdftoppm` and `tesseract`.
//!
//! Documents are visited one at a time in sorted path order and pages in
//! ascending order, so two runs over the same folder report matches in the
//! same order.
//!
//! # Quick Start
//!
//! ```rust
//! use std::path::Path;
//! use pdfsift::{Document, DocumentBackend, PageImage, SearchError};
//!
//! // A backend that serves the same two-page document for every path
//! struct Fixed;
//! struct TwoPages;
//!
//! impl Document for TwoPages {
//!     fn page_count(&self) -> usize { 2 }
//!     fn extract_text(&self, i: usize) -> Result<String, SearchError> {
//!         Ok(["cover page", "quarterly revenue was up"][i].to_string())
//!     }
//!     fn rasterize(&self, _i: usize, _dpi: u32) -> Result<PageImage, SearchError> {
//!         Err(SearchError::Raster("not supported".into()))
//!     }
//! }
//!
//! impl DocumentBackend for Fixed {
//!     fn name(&self) -> &str { "fixed" }
//!     fn open(&self, _path: &Path) -> Result<Box<dyn Document>, SearchError> {
//!         Ok(Box::new(TwoPages))
//!     }
//! }
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("report.pdf"), b"").unwrap();
//!
//! let outcome = pdfsift::search()
//!     .folder(dir.path())
//!     .query("Quarterly Revenue")
//!     .backend(Fixed)
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(outcome.matches.len(), 1);
//! assert_eq!(outcome.matches[0].page, 2);
//! ```
//!
//! # Running in the background
//!
//! [`SearchBuilder::spawn`] runs the search on a worker thread and streams
//! [`Event`]s over a channel. Events serialize to tagged JSON, so the same
//! stream can be forwarded to another process line by line.

#![forbid(unsafe_code)]

pub mod backend;
pub mod engine;
pub mod export;
pub mod pattern;
pub mod resolver;
pub mod snippet;
pub mod walker;

mod builder;
mod error;
mod events;
mod request;
mod results;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use backend::Capabilities;
pub use builder::{search_pdfs, SearchBuilder, SearchHandle};
pub use error::SearchError;
pub use events::{CancelToken, Event, EventSink, FnSink, NullSink};
pub use request::SearchRequest;
pub use results::{Match, Progress, ScanStats, SearchOutcome, SearchStatus};
pub use traits::{Document, DocumentBackend, OcrEngine, PageImage};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`SearchBuilder`] to configure and run a search.
///
/// # Example
///
/// ```rust,no_run
/// let outcome = pdfsift::search()
///     .folder("/srv/reports")
///     .query("net income")
///     .recursive(false)
///     .run()
///     .unwrap();
///
/// for m in &outcome.matches {
///     println!("{} | page {} | {}", m.path.display(), m.page, m.snippet);
/// }
/// ```
pub fn search() -> SearchBuilder {
    SearchBuilder::default()
}
