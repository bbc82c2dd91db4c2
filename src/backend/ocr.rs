use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use crate::error::SearchError;
use crate::traits::{OcrEngine, PageImage};

/// OCR through the `tesseract` command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program:  PathBuf,
    language: String,
}

impl TesseractCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program:  program.into(),
            language: "eng".into(),
        }
    }

    /// Tesseract language code(s), e.g. `"eng"` or `"eng+deu"`.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

impl OcrEngine for TesseractCli {
    fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn recognize(&self, image: &PageImage) -> Result<String, SearchError> {
        let mut input = tempfile::Builder::new()
            .prefix("pdfsift-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| SearchError::Ocr(format!("failed to create temp file: {e}")))?;
        input
            .write_all(&image.data)
            .map_err(|e| SearchError::Ocr(format!("failed to write temp file: {e}")))?;

        let output = Command::new(&self.program)
            .arg(input.path())
            .arg("stdout")
            .args(["-l", &self.language])
            .args(["--dpi", &image.dpi.to_string()])
            .output()
            .map_err(|e| SearchError::Ocr(format!("failed to run tesseract: {e}")))?;

        if !output.status.success() {
            return Err(SearchError::Ocr(format!(
                "tesseract failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_is_unavailable() {
        let engine = TesseractCli::new("/nonexistent/tesseract-binary");
        assert!(!engine.is_available());

        let image = PageImage { data: vec![0x89, b'P', b'N', b'G'], dpi: 200 };
        let err = engine.recognize(&image).unwrap_err();
        assert!(matches!(err, SearchError::Ocr(_)));
    }
}
