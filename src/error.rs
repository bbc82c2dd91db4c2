use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    // Request
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("folder not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    // Per-document
    #[error("unreadable document {}: {reason}", .path.display())]
    DocumentUnreadable {
        path:   PathBuf,
        reason: String,
    },

    #[error("IO error at {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Per-page, swallowed by the resolver
    #[error("page rasterization failed: {0}")]
    Raster(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    // Environment
    #[error("PDF backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("OCR unavailable: {0}")]
    OcrUnavailable(String),

    // Runtime
    #[error("search worker failed: {0}")]
    Worker(String),
}

impl SearchError {
    /// The path this error occurred at, if applicable.
    /// Callers use this to present "Skipped: <path>" without pattern matching on variants.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::NotFound(p)
            | Self::NotADirectory(p)
            | Self::DocumentUnreadable { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            _ => None,
        }
    }

    /// Whether the search can continue after this error.
    ///
    /// Recoverable errors (an unreadable document, a failed OCR pass, a missing
    /// OCR engine) are reported and the run keeps going.
    ///
    /// Request and environment errors (bad folder, bad regex, no PDF backend)
    /// fail the run before any document is opened.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DocumentUnreadable { .. }
                | Self::Io { .. }
                | Self::Raster(_)
                | Self::Ocr(_)
                | Self::OcrUnavailable(_)
        )
    }

    pub(crate) fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::DocumentUnreadable {
            path:   path.into(),
            reason: reason.to_string(),
        }
    }
}
