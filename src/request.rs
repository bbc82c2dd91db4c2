use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::resolver::{DEFAULT_MIN_TEXT_CHARS, DEFAULT_OCR_DPI};
use crate::snippet::DEFAULT_SNIPPET_RADIUS;

/// Configuration for one search run.
///
/// Deserializes with defaults for every missing field, so a worker process can
/// receive `{"folder": "...", "query": "..."}` and nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub folder:         PathBuf,
    pub query:          String,
    pub recursive:      bool,
    pub use_regex:      bool,
    pub ignore_case:    bool,
    pub include_ocr:    bool,
    pub ocr_dpi:        u32,
    pub snippet_radius: usize,
    /// Normalized character count below which a page counts as scanned.
    pub min_text_chars: usize,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            folder:         PathBuf::new(),
            query:          String::new(),
            recursive:      true,
            use_regex:      false,
            ignore_case:    true,
            include_ocr:    false,
            ocr_dpi:        DEFAULT_OCR_DPI,
            snippet_radius: DEFAULT_SNIPPET_RADIUS,
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
        }
    }
}

impl SearchRequest {
    pub fn new(folder: impl Into<PathBuf>, query: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            query: query.into(),
            ..Self::default()
        }
    }

    /// Check the request and normalize it for a run.
    ///
    /// The returned request has a trimmed query and an absolute, canonical
    /// folder, so paths reported in matches are stable.
    ///
    /// # Errors
    ///
    /// [`SearchError::InvalidRequest`] for an empty query or a zero DPI,
    /// [`SearchError::NotFound`] / [`SearchError::NotADirectory`] for a bad
    /// folder.
    pub fn validate(&self) -> Result<SearchRequest, SearchError> {
        let query = self.query.trim();
        if query.is_empty() {
            return Err(SearchError::InvalidRequest("query is empty".into()));
        }
        if self.include_ocr && self.ocr_dpi == 0 {
            return Err(SearchError::InvalidRequest("OCR DPI must be positive".into()));
        }

        if !self.folder.exists() {
            return Err(SearchError::NotFound(self.folder.clone()));
        }
        if !self.folder.is_dir() {
            return Err(SearchError::NotADirectory(self.folder.clone()));
        }
        let folder = self.folder.canonicalize().map_err(|source| SearchError::Io {
            path: self.folder.clone(),
            source,
        })?;

        Ok(SearchRequest {
            folder,
            query: query.to_string(),
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let req = SearchRequest::default();
        assert!(req.recursive);
        assert!(req.ignore_case);
        assert!(!req.use_regex);
        assert!(!req.include_ocr);
        assert_eq!(req.ocr_dpi, 200);
        assert_eq!(req.snippet_radius, 70);
        assert_eq!(req.min_text_chars, 25);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let json = r#"{"folder": "/tmp", "query": "invoice", "include_ocr": true}"#;
        let req: SearchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.query, "invoice");
        assert!(req.include_ocr);
        assert_eq!(req.ocr_dpi, 200);
    }

    #[test]
    fn blank_query_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = SearchRequest::new(dir.path(), "   \n").validate().unwrap_err();
        assert!(matches!(err, SearchError::InvalidRequest(_)));
    }

    #[test]
    fn missing_folder_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = SearchRequest::new(dir.path().join("nope"), "x").validate().unwrap_err();
        assert!(matches!(err, SearchError::NotFound(_)));
    }

    #[test]
    fn file_is_not_a_folder() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.pdf");
        std::fs::write(&file, b"").unwrap();
        let err = SearchRequest::new(&file, "x").validate().unwrap_err();
        assert!(matches!(err, SearchError::NotADirectory(_)));
    }

    #[test]
    fn validate_trims_and_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let req = SearchRequest::new(dir.path(), "  revenue  ").validate().unwrap();
        assert_eq!(req.query, "revenue");
        assert!(req.folder.is_absolute());
    }
}
