use std::path::Path;

use crate::error::SearchError;

/// A rasterized page handed to an [`OcrEngine`].
///
/// `data` holds an encoded image (PNG for the bundled backends). Engines that
/// need raw pixels decode it themselves.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub data: Vec<u8>,
    pub dpi:  u32,
}

/// Opens PDF documents.
///
/// Implement this to plug in any PDF library. pdfsift never parses PDF bytes
/// itself, it only asks the backend for page counts, page text, and page
/// rasters.
///
/// # Thread Safety
///
/// `Send + Sync` are required so a backend can be built once at startup and
/// shared with a worker thread.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use pdfsift::{Document, DocumentBackend, PageImage, SearchError};
///
/// struct InMemory(Vec<String>);
///
/// impl Document for InMemory {
///     fn page_count(&self) -> usize { self.0.len() }
///     fn extract_text(&self, page_index: usize) -> Result<String, SearchError> {
///         Ok(self.0[page_index].clone())
///     }
///     fn rasterize(&self, _page_index: usize, _dpi: u32) -> Result<PageImage, SearchError> {
///         Err(SearchError::Raster("no raster support".into()))
///     }
/// }
///
/// struct InMemoryBackend;
///
/// impl DocumentBackend for InMemoryBackend {
///     fn name(&self) -> &str { "in-memory" }
///     fn open(&self, _path: &Path) -> Result<Box<dyn Document>, SearchError> {
///         Ok(Box::new(InMemory(vec!["hello".into()])))
///     }
/// }
/// ```
pub trait DocumentBackend: Send + Sync {
    /// Short human-readable name, used in logs.
    fn name(&self) -> &str;

    /// Open the document at `path`.
    ///
    /// Fail with [`SearchError::DocumentUnreadable`] for corrupt or unreadable
    /// files; the orchestrator skips the document and continues.
    fn open(&self, path: &Path) -> Result<Box<dyn Document>, SearchError>;
}

/// An open document handle.
///
/// The handle is released when dropped, so every exit path of a walk
/// (cancellation, errors) closes it.
pub trait Document {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Embedded text of the page at zero-based `page_index`.
    ///
    /// Return an empty string, not an error, when the page has no text layer.
    fn extract_text(&self, page_index: usize) -> Result<String, SearchError>;

    /// Render the page at `dpi` for OCR.
    fn rasterize(&self, page_index: usize, dpi: u32) -> Result<PageImage, SearchError>;
}

/// Turns a page image into text.
pub trait OcrEngine: Send + Sync {
    /// Whether the engine can run in this environment at all.
    ///
    /// Checked once per run; an unavailable engine is reported as a warning
    /// and OCR is skipped instead of failing every page.
    fn is_available(&self) -> bool {
        true
    }

    fn recognize(&self, image: &PageImage) -> Result<String, SearchError>;
}
