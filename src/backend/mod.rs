//! Bundled adapters for the [`DocumentBackend`] and [`OcrEngine`] contracts.
//!
//! Text comes from `lopdf`. Rasterization and OCR shell out to poppler's
//! `pdftoppm` and to `tesseract`, so neither needs native bindings at build
//! time. Both executables are optional: without them the search runs on
//! embedded text only.

mod ocr;
mod pdf;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::traits::{DocumentBackend, OcrEngine};

pub use self::ocr::TesseractCli;
pub use self::pdf::{LopdfBackend, Pdftoppm};

/// Overrides the `pdftoppm` executable used for rasterization.
pub const PDFTOPPM_ENV: &str = "PDFSIFT_PDFTOPPM";

/// Overrides the `tesseract` executable used for OCR.
pub const TESSERACT_ENV: &str = "PDFSIFT_TESSERACT";

/// The external collaborators a search runs with.
///
/// Resolved once at startup and passed into the search. A `None` is a typed
/// "not available here", checked before use.
#[derive(Clone, Default)]
pub struct Capabilities {
    pub backend: Option<Arc<dyn DocumentBackend>>,
    pub ocr:     Option<Arc<dyn OcrEngine>>,
}

impl Capabilities {
    /// Wire up the bundled adapters.
    ///
    /// The lopdf backend is always present. Rasterization is attached only
    /// when `pdftoppm` runs, and OCR only when `tesseract` does.
    pub fn detect() -> Self {
        let pdftoppm = Pdftoppm::new(program_from_env(PDFTOPPM_ENV, "pdftoppm"));
        let rasterizer = if pdftoppm.is_available() {
            Some(pdftoppm)
        } else {
            log::info!("pdftoppm not found, page rasterization disabled");
            None
        };

        let tesseract = TesseractCli::new(program_from_env(TESSERACT_ENV, "tesseract"));
        let ocr: Option<Arc<dyn OcrEngine>> = if tesseract.is_available() {
            Some(Arc::new(tesseract))
        } else {
            log::info!("tesseract not found, OCR disabled");
            None
        };

        Self {
            backend: Some(Arc::new(LopdfBackend::new(rasterizer))),
            ocr,
        }
    }

    pub fn with_backend(mut self, backend: impl DocumentBackend + 'static) -> Self {
        self.backend = Some(Arc::new(backend));
        self
    }

    pub fn with_ocr(mut self, ocr: impl OcrEngine + 'static) -> Self {
        self.ocr = Some(Arc::new(ocr));
        self
    }

    pub fn without_ocr(mut self) -> Self {
        self.ocr = None;
        self
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("backend", &self.backend.as_ref().map(|b| b.name().to_string()))
            .field("ocr", &self.ocr.is_some())
            .finish()
    }
}

fn program_from_env(var: &str, default: &str) -> PathBuf {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(default))
}
