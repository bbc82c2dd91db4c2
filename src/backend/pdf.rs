use std::path::{Path, PathBuf};
use std::process::Command;

use lopdf::Document as PdfDocument;

use crate::error::SearchError;
use crate::traits::{Document, DocumentBackend, PageImage};

/// Text extraction through `lopdf`, with optional rasterization via
/// [`Pdftoppm`].
pub struct LopdfBackend {
    rasterizer: Option<Pdftoppm>,
}

impl LopdfBackend {
    pub fn new(rasterizer: Option<Pdftoppm>) -> Self {
        Self { rasterizer }
    }
}

impl DocumentBackend for LopdfBackend {
    fn name(&self) -> &str {
        "lopdf"
    }

    fn open(&self, path: &Path) -> Result<Box<dyn Document>, SearchError> {
        let doc = PdfDocument::load(path).map_err(|e| SearchError::unreadable(path, e))?;
        // get_pages() is keyed by 1-based page number, in page order.
        let pages = doc.get_pages().keys().copied().collect();

        Ok(Box::new(LopdfDocument {
            path: path.to_path_buf(),
            doc,
            pages,
            rasterizer: self.rasterizer.clone(),
        }))
    }
}

struct LopdfDocument {
    path:       PathBuf,
    doc:        PdfDocument,
    pages:      Vec<u32>,
    rasterizer: Option<Pdftoppm>,
}

impl LopdfDocument {
    fn page_number(&self, page_index: usize) -> Result<u32, SearchError> {
        self.pages.get(page_index).copied().ok_or_else(|| {
            SearchError::unreadable(&self.path, format!("page index {page_index} out of range"))
        })
    }
}

impl Document for LopdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn extract_text(&self, page_index: usize) -> Result<String, SearchError> {
        let number = self.page_number(page_index)?;
        self.doc
            .extract_text(&[number])
            .map_err(|e| SearchError::unreadable(&self.path, e))
    }

    fn rasterize(&self, page_index: usize, dpi: u32) -> Result<PageImage, SearchError> {
        let rasterizer = self
            .rasterizer
            .as_ref()
            .ok_or_else(|| SearchError::Raster("no rasterizer configured".into()))?;
        rasterizer.render(&self.path, page_index + 1, dpi)
    }
}

/// Renders single pages to PNG with poppler's `pdftoppm`.
#[derive(Debug, Clone)]
pub struct Pdftoppm {
    program: PathBuf,
}

impl Pdftoppm {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    pub fn is_available(&self) -> bool {
        Command::new(&self.program).arg("-v").output().is_ok()
    }

    /// Render 1-based `page` of `pdf` at `dpi`.
    pub fn render(&self, pdf: &Path, page: usize, dpi: u32) -> Result<PageImage, SearchError> {
        let dir = tempfile::tempdir().map_err(|e| SearchError::Raster(e.to_string()))?;
        let root = dir.path().join("page");
        let page = page.to_string();

        let output = Command::new(&self.program)
            .args(["-f", &page, "-l", &page])
            .args(["-r", &dpi.to_string()])
            .args(["-png", "-singlefile"])
            .arg(pdf)
            .arg(&root)
            .output()
            .map_err(|e| SearchError::Raster(format!("failed to run pdftoppm: {e}")))?;

        if !output.status.success() {
            return Err(SearchError::Raster(format!(
                "pdftoppm failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let data = std::fs::read(root.with_extension("png"))
            .map_err(|e| SearchError::Raster(format!("failed to read rendered page: {e}")))?;

        Ok(PageImage { data, dpi })
    }
}

#[cfg(test)]
mod tests {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    use super::*;

    /// Write a two-page PDF: `text` on the first page, nothing on the second.
    fn write_two_page_pdf(path: &Path, text: &str) {
        let mut doc = PdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let first = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let second = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![first.into(), second.into()],
                "Count" => 2,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn extracts_text_per_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        write_two_page_pdf(&path, "quarterly revenue");

        let document = LopdfBackend::new(None).open(&path).unwrap();
        assert_eq!(document.page_count(), 2);
        assert!(document.extract_text(0).unwrap().contains("quarterly revenue"));
        assert_eq!(document.extract_text(1).unwrap(), "");
        assert!(document.extract_text(2).is_err());
        assert!(matches!(document.rasterize(0, 200), Err(SearchError::Raster(_))));
    }

    #[test]
    fn search_over_real_pdf_reports_first_page() {
        let dir = tempfile::tempdir().unwrap();
        write_two_page_pdf(&dir.path().join("report.pdf"), "quarterly revenue");

        let outcome = crate::search()
            .folder(dir.path())
            .query("Quarterly Revenue")
            .backend(LopdfBackend::new(None))
            .run()
            .unwrap();

        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].page, 1);
        assert!(!outcome.matches[0].used_ocr);
        assert!(outcome.matches[0].path.ends_with("report.pdf"));
        assert_eq!(outcome.stats.pages, 2);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn garbage_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let err = LopdfBackend::new(None).open(&path).err().unwrap();
        assert!(matches!(err, SearchError::DocumentUnreadable { .. }));
        assert_eq!(err.path(), Some(&path));
    }

    #[test]
    fn missing_rasterizer_is_a_raster_error() {
        let missing = Pdftoppm::new("/nonexistent/pdftoppm-binary");
        assert!(!missing.is_available());
        let err = missing.render(Path::new("/nonexistent.pdf"), 1, 200).unwrap_err();
        assert!(matches!(err, SearchError::Raster(_)));
    }
}
