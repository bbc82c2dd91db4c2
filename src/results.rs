use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// One occurrence of the pattern on one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Absolute path of the document.
    #[serde(rename = "pdf_path")]
    pub path: PathBuf,

    /// 1-based page number.
    #[serde(rename = "page_number_1based")]
    pub page: usize,

    /// Whitespace-normalized excerpt around the hit.
    pub snippet: String,

    /// Whether the page text came from OCR rather than the embedded text layer.
    pub used_ocr: bool,
}

/// A point-in-time view of a running search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Pages processed so far, across all documents.
    pub processed: usize,

    /// Total pages in the run, or `0` when the pre-scan could not count them.
    pub total: usize,

    /// Document currently being processed. `None` between documents.
    pub current_file: Option<PathBuf>,

    /// Matches found so far.
    pub matches_found: usize,
}

impl Progress {
    /// Completed fraction in `0.0..=1.0`, or `None` when the total is unknown.
    pub fn fraction(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some((self.processed as f64 / self.total as f64).min(1.0))
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Completed,
    Cancelled,
}

/// The output of a finished (or cancelled) search.
///
/// Matches collected before a cancellation are always kept.
#[derive(Debug)]
pub struct SearchOutcome {
    /// Every match, in document then page then position order.
    pub matches: Vec<Match>,

    pub status: SearchStatus,

    /// Non-fatal errors (unreadable documents, missing OCR engine).
    pub errors: Vec<SearchError>,

    pub stats: ScanStats,
}

impl SearchOutcome {
    pub fn is_cancelled(&self) -> bool {
        self.status == SearchStatus::Cancelled
    }
}

/// Counters for a completed scan.
#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    /// PDF files found under the folder.
    pub documents: usize,

    /// Documents skipped because they could not be opened or read.
    pub failed_documents: usize,

    /// Pages whose text was scanned.
    pub pages: usize,

    /// Pages whose text came from OCR.
    pub ocr_pages: usize,

    /// Wall-clock time from search start to completion.
    pub duration: Duration,

    /// Pages scanned per second, clamped to 0 on zero-duration runs.
    pub pages_per_sec: usize,
}

impl ScanStats {
    pub(crate) fn finish(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self.pages_per_sec = if duration.as_secs_f64() > 0.0 {
            (self.pages as f64 / duration.as_secs_f64()) as usize
        } else {
            0
        };
        self
    }
}
