use std::ops::ControlFlow;
use std::path::Path;

use crate::error::SearchError;
use crate::pattern::CompiledPattern;
use crate::resolver::PageTextResolver;
use crate::results::Match;
use crate::snippet::snippet;
use crate::traits::Document;

/// What the walker found on one page.
#[derive(Debug, Clone)]
pub struct PageReport {
    /// Zero-based page index.
    pub page_index: usize,

    /// Matches on this page, left to right.
    pub matches: Vec<Match>,

    pub used_ocr: bool,
}

/// Per-document traversal settings.
pub struct WalkOptions<'a> {
    pub resolver:       PageTextResolver<'a>,
    pub snippet_radius: usize,
}

/// Visit every page of `document` in ascending order.
///
/// `on_page` runs exactly once per visited page, match or not, so callers can
/// drive progress from it. Returning [`ControlFlow::Break`] stops the walk
/// before the next page.
///
/// `path` is recorded on every [`Match`]; the walker never touches the
/// filesystem itself.
pub fn walk<F>(
    path:     &Path,
    document: &dyn Document,
    pattern:  &CompiledPattern,
    options:  &WalkOptions<'_>,
    mut on_page: F,
) -> Result<ControlFlow<()>, SearchError>
where
    F: FnMut(PageReport) -> ControlFlow<()>,
{
    for page_index in 0..document.page_count() {
        let resolved = options.resolver.resolve(document, page_index)?;

        let matches = if resolved.text.is_empty() {
            Vec::new()
        } else {
            pattern
                .find_iter(&resolved.text)
                .map(|(start, end)| Match {
                    path:     path.to_path_buf(),
                    page:     page_index + 1,
                    snippet:  snippet(&resolved.text, start, end, options.snippet_radius),
                    used_ocr: resolved.used_ocr,
                })
                .collect()
        };

        let report = PageReport {
            page_index,
            matches,
            used_ocr: resolved.used_ocr,
        };

        if on_page(report).is_break() {
            return Ok(ControlFlow::Break(()));
        }
    }

    Ok(ControlFlow::Continue(()))
}
