use crate::error::SearchError;
use crate::snippet::normalize_whitespace;
use crate::traits::{Document, OcrEngine};

/// Pages with fewer normalized characters than this are treated as likely
/// scanned and become OCR candidates.
pub const DEFAULT_MIN_TEXT_CHARS: usize = 25;

/// Default render resolution for OCR.
pub const DEFAULT_OCR_DPI: u32 = 200;

/// Text for one page and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedText {
    pub text:     String,
    pub used_ocr: bool,
}

/// Decides per page whether the embedded text is enough or OCR should run.
///
/// `ocr` is `None` when OCR was not requested or no engine is available; the
/// resolver then always returns the extracted text.
pub struct PageTextResolver<'a> {
    pub ocr:            Option<&'a dyn OcrEngine>,
    pub ocr_dpi:        u32,
    pub min_text_chars: usize,
}

impl<'a> PageTextResolver<'a> {
    /// Whether `text` is too sparse to trust.
    pub fn is_sparse(&self, text: &str) -> bool {
        normalize_whitespace(text).chars().count() < self.min_text_chars
    }

    /// Resolve the text for `page_index`.
    ///
    /// Extraction errors propagate (the document is unreadable). Rasterization
    /// and OCR errors never do: the page keeps its extracted text.
    pub fn resolve(
        &self,
        document: &dyn Document,
        page_index: usize,
    ) -> Result<ResolvedText, SearchError> {
        let text = document.extract_text(page_index)?;

        let Some(ocr) = self.ocr else {
            return Ok(ResolvedText { text, used_ocr: false });
        };

        if !self.is_sparse(&text) {
            return Ok(ResolvedText { text, used_ocr: false });
        }

        match run_ocr(document, ocr, page_index, self.ocr_dpi) {
            Ok(ocr_text) => Ok(ResolvedText { text: ocr_text, used_ocr: true }),
            Err(e) => {
                // OCR is best effort: keep the sparse text.
                log::debug!("OCR fallback on page {}: {}", page_index + 1, e);
                Ok(ResolvedText { text, used_ocr: false })
            }
        }
    }
}

fn run_ocr(
    document: &dyn Document,
    ocr: &dyn OcrEngine,
    page_index: usize,
    dpi: u32,
) -> Result<String, SearchError> {
    let image = document.rasterize(page_index, dpi)?;
    ocr.recognize(&image)
}

/// Free-function form of [`PageTextResolver::resolve`] with the default
/// sufficiency threshold.
pub fn resolve_text(
    document:    &dyn Document,
    page_index:  usize,
    ocr:         Option<&dyn OcrEngine>,
    ocr_dpi:     u32,
) -> Result<ResolvedText, SearchError> {
    PageTextResolver {
        ocr,
        ocr_dpi,
        min_text_chars: DEFAULT_MIN_TEXT_CHARS,
    }
    .resolve(document, page_index)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::traits::PageImage;

    struct OnePage {
        text:       &'static str,
        rasterized: Cell<usize>,
    }

    impl OnePage {
        fn new(text: &'static str) -> Self {
            Self { text, rasterized: Cell::new(0) }
        }
    }

    impl Document for OnePage {
        fn page_count(&self) -> usize {
            1
        }

        fn extract_text(&self, _page_index: usize) -> Result<String, SearchError> {
            Ok(self.text.to_string())
        }

        fn rasterize(&self, _page_index: usize, dpi: u32) -> Result<PageImage, SearchError> {
            self.rasterized.set(self.rasterized.get() + 1);
            Ok(PageImage { data: vec![0u8; 4], dpi })
        }
    }

    struct FixedOcr(&'static str);

    impl OcrEngine for FixedOcr {
        fn recognize(&self, _image: &PageImage) -> Result<String, SearchError> {
            Ok(self.0.to_string())
        }
    }

    struct BrokenOcr;

    impl OcrEngine for BrokenOcr {
        fn recognize(&self, _image: &PageImage) -> Result<String, SearchError> {
            Err(SearchError::Ocr("engine crashed".into()))
        }
    }

    #[test]
    fn sparse_page_uses_ocr_when_enabled() {
        let doc = OnePage::new("Fig. 1");
        let ocr = FixedOcr("Revenue growth increased 12% year over year");
        let resolved = resolve_text(&doc, 0, Some(&ocr), DEFAULT_OCR_DPI).unwrap();
        assert!(resolved.used_ocr);
        assert_eq!(resolved.text, "Revenue growth increased 12% year over year");
    }

    #[test]
    fn sparse_page_keeps_text_without_ocr() {
        let doc = OnePage::new("Fig. 1");
        let resolved = resolve_text(&doc, 0, None, DEFAULT_OCR_DPI).unwrap();
        assert!(!resolved.used_ocr);
        assert_eq!(resolved.text, "Fig. 1");
        assert_eq!(doc.rasterized.get(), 0);
    }

    #[test]
    fn dense_page_skips_ocr() {
        let doc = OnePage::new("This page has plenty of embedded text to search through.");
        let ocr = FixedOcr("should not be used");
        let resolved = resolve_text(&doc, 0, Some(&ocr), DEFAULT_OCR_DPI).unwrap();
        assert!(!resolved.used_ocr);
        assert_eq!(doc.rasterized.get(), 0);
    }

    #[test]
    fn ocr_failure_falls_back_to_extracted_text() {
        let doc = OnePage::new("Fig. 1");
        let resolved = resolve_text(&doc, 0, Some(&BrokenOcr), DEFAULT_OCR_DPI).unwrap();
        assert!(!resolved.used_ocr);
        assert_eq!(resolved.text, "Fig. 1");
    }

    #[test]
    fn whitespace_does_not_count_toward_threshold() {
        let resolver = PageTextResolver { ocr: None, ocr_dpi: 200, min_text_chars: 25 };
        assert!(resolver.is_sparse("a\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\nb"));
        assert!(!resolver.is_sparse("abcdefghijklmnopqrstuvwxy"));
    }
}
