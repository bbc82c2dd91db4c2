use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::Instant;

use ignore::WalkBuilder;

use crate::backend::Capabilities;
use crate::error::SearchError;
use crate::events::{Event, EventSink};
use crate::pattern::compile;
use crate::request::SearchRequest;
use crate::resolver::PageTextResolver;
use crate::results::{Match, Progress, ScanStats, SearchOutcome, SearchStatus};
use crate::traits::{DocumentBackend, OcrEngine};
use crate::walker::{walk, WalkOptions};

/// With a known total, progress is emitted every this many pages.
pub const PROGRESS_EVERY_PAGES: usize = 5;

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Internal options passed from the builder to `run()`.
pub(crate) struct EngineOptions<'a> {
    pub request:       SearchRequest,
    pub capabilities:  &'a Capabilities,
    pub sink:          &'a dyn EventSink,
    pub should_cancel: &'a dyn Fn() -> bool,
}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// Execute a search over the request's folder.
///
/// This is the orchestrator: validation, document enumeration, progress and
/// cancellation all live here. Documents and pages are processed one at a
/// time in sorted order. A document that fails to open or read is recorded
/// in [`SearchOutcome::errors`] and skipped.
///
/// # Errors
///
/// Only failures before the first document is touched: a bad request, a bad
/// pattern, or no PDF backend.
pub(crate) fn run(opts: EngineOptions<'_>) -> Result<SearchOutcome, SearchError> {
    let start = Instant::now();

    let request = opts.request.validate()?;
    let backend = opts
        .capabilities
        .backend
        .as_deref()
        .ok_or_else(|| SearchError::BackendUnavailable("no PDF backend configured".into()))?;
    let pattern = compile(&request.query, request.use_regex, request.ignore_case)?;

    let (documents, mut errors) = find_documents(&request.folder, request.recursive);
    log::debug!(
        "found {} PDF(s) under {} (recursive: {})",
        documents.len(),
        request.folder.display(),
        request.recursive
    );

    let mut stats = ScanStats {
        documents: documents.len(),
        ..ScanStats::default()
    };

    if documents.is_empty() {
        opts.sink.emit(Event::Finished { status: SearchStatus::Completed, matches: 0 });
        return Ok(SearchOutcome {
            matches: Vec::new(),
            status: SearchStatus::Completed,
            errors,
            stats: stats.finish(start.elapsed()),
        });
    }

    let ocr = if request.include_ocr {
        resolve_ocr(opts.capabilities, opts.sink, &mut errors)
    } else {
        None
    };

    let (total, mut status) = match count_total_pages(backend, &documents, opts.should_cancel) {
        Ok(ControlFlow::Continue(total)) => (total, SearchStatus::Completed),
        Ok(ControlFlow::Break(())) => (0, SearchStatus::Cancelled),
        Err(e) => {
            log::debug!("page pre-scan failed, progress total unknown: {e}");
            (0, SearchStatus::Completed)
        }
    };

    let options = WalkOptions {
        resolver: PageTextResolver {
            ocr,
            ocr_dpi: request.ocr_dpi,
            min_text_chars: request.min_text_chars,
        },
        snippet_radius: request.snippet_radius,
    };

    let mut matches: Vec<Match> = Vec::new();
    let mut processed = 0usize;

    let progress = |processed: usize, matches_found: usize, current_file: Option<&Path>| {
        opts.sink.emit(Event::Progress(Progress {
            processed,
            total,
            current_file: current_file.map(Path::to_path_buf),
            matches_found,
        }));
    };

    progress(processed, 0, None);

    for path in &documents {
        if status == SearchStatus::Cancelled || (opts.should_cancel)() {
            status = SearchStatus::Cancelled;
            break;
        }

        progress(processed, matches.len(), Some(path.as_path()));

        let document = match backend.open(path) {
            Ok(document) => document,
            Err(e) => {
                record_failure(opts.sink, &mut errors, &mut stats, path, e);
                progress(processed, matches.len(), Some(path.as_path()));
                continue;
            }
        };

        let walked = walk(path, document.as_ref(), &pattern, &options, |report| {
            processed += 1;
            stats.pages += 1;
            if report.used_ocr {
                stats.ocr_pages += 1;
            }

            for m in report.matches {
                opts.sink.emit(Event::Match(m.clone()));
                matches.push(m);
            }

            if total > 0 && processed % PROGRESS_EVERY_PAGES == 0 {
                progress(processed, matches.len(), Some(path.as_path()));
            }

            if (opts.should_cancel)() {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        // The handle is released here on every path, cancellation included.
        drop(document);

        match walked {
            Ok(ControlFlow::Break(())) => {
                status = SearchStatus::Cancelled;
                break;
            }
            Ok(ControlFlow::Continue(())) => {}
            Err(e) => {
                record_failure(opts.sink, &mut errors, &mut stats, path, e);
                progress(processed, matches.len(), Some(path.as_path()));
            }
        }
    }

    progress(processed, matches.len(), None);
    opts.sink.emit(Event::Finished { status, matches: matches.len() });

    log::info!(
        "search {:?}: {} match(es), {} page(s), {} document(s) skipped",
        status,
        matches.len(),
        stats.pages,
        stats.failed_documents
    );

    Ok(SearchOutcome {
        matches,
        status,
        errors,
        stats: stats.finish(start.elapsed()),
    })
}

// ---------------------------------------------------------------------------
// Document enumeration
// ---------------------------------------------------------------------------

/// All `*.pdf` files under `root`, sorted by path.
///
/// Only direct children unless `recursive`. The extension check ignores
/// case. Traversal errors (unreadable subfolders) are returned alongside the
/// documents rather than aborting the enumeration.
pub fn find_documents(root: &Path, recursive: bool) -> (Vec<PathBuf>, Vec<SearchError>) {
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .ignore(false)
        .parents(false)
        .hidden(false)
        .follow_links(false)
        .same_file_system(false);

    if !recursive {
        builder.max_depth(Some(1));
    }

    let mut documents = Vec::new();
    let mut errors = Vec::new();

    for res in builder.build() {
        let entry = match res {
            Ok(e) => e,
            Err(e) => {
                errors.push(map_ignore_error(e));
                continue;
            }
        };

        if entry.depth() == 0 || !is_pdf(entry.path()) {
            continue;
        }

        documents.push(entry.path().to_path_buf());
    }

    documents.sort();
    (documents, errors)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
        && path.is_file()
}

/// Sum page counts across `documents`.
///
/// `should_cancel` is polled before each open; `Break` means the run was
/// cancelled before the total was known. Fails on the first document that
/// cannot be opened; the caller then runs with an unknown total.
pub fn count_total_pages(
    backend: &dyn DocumentBackend,
    documents: &[PathBuf],
    should_cancel: &dyn Fn() -> bool,
) -> Result<ControlFlow<(), usize>, SearchError> {
    let mut total = 0usize;
    for path in documents {
        if should_cancel() {
            return Ok(ControlFlow::Break(()));
        }
        total += backend.open(path)?.page_count();
    }
    Ok(ControlFlow::Continue(total))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn resolve_ocr<'a>(
    capabilities: &'a Capabilities,
    sink: &dyn EventSink,
    errors: &mut Vec<SearchError>,
) -> Option<&'a dyn OcrEngine> {
    match capabilities.ocr.as_deref() {
        Some(engine) if engine.is_available() => Some(engine),
        _ => {
            let err = SearchError::OcrUnavailable(
                "no OCR engine found, install tesseract or set PDFSIFT_TESSERACT".into(),
            );
            log::warn!("{err}; searching embedded text only");
            sink.emit(Event::Warning(err.to_string()));
            errors.push(err);
            None
        }
    }
}

fn record_failure(
    sink: &dyn EventSink,
    errors: &mut Vec<SearchError>,
    stats: &mut ScanStats,
    path: &Path,
    err: SearchError,
) {
    log::warn!("skipping {}: {}", path.display(), err);
    stats.failed_documents += 1;

    let err = match err {
        e @ (SearchError::DocumentUnreadable { .. } | SearchError::Io { .. }) => e,
        other => SearchError::unreadable(path, other),
    };
    let reason = match &err {
        SearchError::DocumentUnreadable { reason, .. } => reason.clone(),
        other => other.to_string(),
    };

    sink.emit(Event::DocumentFailed { path: path.to_path_buf(), reason });
    errors.push(err);
}

fn map_ignore_error(e: ignore::Error) -> SearchError {
    match e {
        ignore::Error::WithPath { path, err } => match *err {
            ignore::Error::Io(source) => SearchError::Io { path, source },
            other => SearchError::unreadable(path, other),
        },
        ignore::Error::Io(source) => SearchError::Io {
            path: PathBuf::new(),
            source,
        },
        other => SearchError::InvalidRequest(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn finds_pdfs_sorted_and_respects_depth() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("b.pdf"), b"").unwrap();
        fs::write(root.join("a.PDF"), b"").unwrap();
        fs::write(root.join("notes.txt"), b"").unwrap();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join("sub").join("c.pdf"), b"").unwrap();
        fs::create_dir(root.join("folder.pdf")).unwrap();

        let (flat, errors) = find_documents(root, false);
        assert!(errors.is_empty());
        let names: Vec<_> = flat
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);

        let (deep, _) = find_documents(root, true);
        assert_eq!(deep.len(), 3);
        assert!(deep.windows(2).all(|w| w[0] <= w[1]));
        assert!(deep.iter().any(|p| p.ends_with("sub/c.pdf")));
    }
}
