use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread::JoinHandle;

use crate::backend::Capabilities;
use crate::engine::{run, EngineOptions};
use crate::error::SearchError;
use crate::events::{CancelToken, Event, EventSink, FnSink};
use crate::request::SearchRequest;
use crate::results::{Progress, SearchOutcome};
use crate::traits::{DocumentBackend, OcrEngine};

// ---------------------------------------------------------------------------
// SearchBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing a PDF search.
///
/// Created via [`pdfsift::search()`](crate::search). Configure with chained
/// builder methods, then call [`run()`](SearchBuilder::run) to block until
/// done, or [`spawn()`](SearchBuilder::spawn) to run on a worker thread.
///
/// # Example
///
/// ```rust,ignore
/// let outcome = pdfsift::search()
///     .folder("~/invoices")
///     .query("quarterly revenue")
///     .include_ocr(true)
///     .on_progress(|p| eprintln!("{}/{}", p.processed, p.total))
///     .run()?;
/// ```
pub struct SearchBuilder {
    request:       SearchRequest,
    capabilities:  Option<Capabilities>,
    on_progress:   Option<Box<dyn Fn(&Progress) + Send>>,
    sinks:         Vec<Box<dyn EventSink>>,
    should_cancel: Option<Box<dyn Fn() -> bool + Send>>,
    cancel:        Option<CancelToken>,
}

impl Default for SearchBuilder {
    fn default() -> Self {
        Self {
            request:       SearchRequest::default(),
            capabilities:  None,
            on_progress:   None,
            sinks:         Vec::new(),
            should_cancel: None,
            cancel:        None,
        }
    }
}

impl SearchBuilder {
    // ── Request ───────────────────────────────────────────────────────────

    /// Replace the whole request, e.g. one received from another process.
    pub fn request(mut self, request: SearchRequest) -> Self {
        self.request = request;
        self
    }

    /// Folder to search. Must exist and be a directory.
    pub fn folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.request.folder = folder.into();
        self
    }

    /// Text (or pattern, with `.regex(true)`) to find. Trimmed before use.
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.request.query = query.into();
        self
    }

    /// Descend into subfolders. On by default.
    pub fn recursive(mut self, yes: bool) -> Self {
        self.request.recursive = yes;
        self
    }

    /// Treat the query as a regular expression instead of literal text.
    pub fn regex(mut self, yes: bool) -> Self {
        self.request.use_regex = yes;
        self
    }

    /// Case-insensitive matching. On by default.
    pub fn ignore_case(mut self, yes: bool) -> Self {
        self.request.ignore_case = yes;
        self
    }

    /// OCR pages whose embedded text is too sparse. Slow; off by default.
    pub fn include_ocr(mut self, yes: bool) -> Self {
        self.request.include_ocr = yes;
        self
    }

    pub fn ocr_dpi(mut self, dpi: u32) -> Self {
        self.request.ocr_dpi = dpi;
        self
    }

    /// Characters of context kept on each side of a match.
    pub fn snippet_radius(mut self, radius: usize) -> Self {
        self.request.snippet_radius = radius;
        self
    }

    /// Normalized character count below which a page is an OCR candidate.
    pub fn min_text_chars(mut self, n: usize) -> Self {
        self.request.min_text_chars = n;
        self
    }

    // ── Collaborators ─────────────────────────────────────────────────────

    /// Use these collaborators instead of [`Capabilities::detect()`].
    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Shorthand for a custom PDF backend with no OCR engine.
    pub fn backend(mut self, backend: impl DocumentBackend + 'static) -> Self {
        let caps = self.capabilities.take().unwrap_or_default();
        self.capabilities = Some(caps.with_backend(backend));
        self
    }

    pub fn ocr_engine(mut self, ocr: impl OcrEngine + 'static) -> Self {
        let caps = self.capabilities.take().unwrap_or_default();
        self.capabilities = Some(caps.with_ocr(ocr));
        self
    }

    // ── Progress & cancellation ───────────────────────────────────────────

    /// Called with a snapshot as pages are processed.
    pub fn on_progress(mut self, f: impl Fn(&Progress) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Called with every event: progress, matches, skipped documents, warnings.
    pub fn on_event(mut self, f: impl Fn(Event) + Send + 'static) -> Self {
        self.sinks.push(Box::new(FnSink(f)));
        self
    }

    /// Forward every event to `sink` (a channel, a pipe writer, ...).
    pub fn sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Polled before each document and after each page.
    pub fn should_cancel(mut self, f: impl Fn() -> bool + Send + 'static) -> Self {
        self.should_cancel = Some(Box::new(f));
        self
    }

    /// Stop when `token` is cancelled.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Execute the search and return its outcome.
    ///
    /// Blocks until every document is processed or cancellation is observed.
    /// A cancelled run still returns `Ok` with the matches found so far and
    /// [`SearchStatus::Cancelled`](crate::SearchStatus::Cancelled).
    ///
    /// # Errors
    ///
    /// Returns `Err` only before any document is processed: invalid folder or
    /// query, malformed regex, no PDF backend. The error is also emitted as
    /// [`Event::Error`]. Unreadable documents are collected into
    /// [`SearchOutcome::errors`].
    pub fn run(self) -> Result<SearchOutcome, SearchError> {
        let capabilities = self.capabilities.unwrap_or_else(Capabilities::detect);
        log::debug!("running search with {:?}", capabilities);

        let sink = RunSink {
            on_progress: self.on_progress,
            sinks:       self.sinks,
        };

        let token = self.cancel;
        let should_cancel = self.should_cancel;
        let cancelled = move || {
            token.as_ref().is_some_and(CancelToken::is_cancelled)
                || should_cancel.as_ref().is_some_and(|f| f())
        };

        let opts = EngineOptions {
            request:       self.request,
            capabilities:  &capabilities,
            sink:          &sink,
            should_cancel: &cancelled,
        };

        run(opts).map_err(|e| {
            sink.emit(Event::Error(e.to_string()));
            e
        })
    }

    /// Run the search on a background thread.
    ///
    /// Events stream through [`SearchHandle::events`]; the handle's token
    /// cancels the run. Any sinks and callbacks already configured still
    /// receive events.
    ///
    /// # Errors
    ///
    /// [`SearchError::Worker`] if the thread could not be started.
    pub fn spawn(mut self) -> Result<SearchHandle, SearchError> {
        let (tx, rx) = mpsc::channel();
        let token = self.cancel.clone().unwrap_or_default();
        self.cancel = Some(token.clone());
        self.sinks.push(Box::new(tx));

        let thread = std::thread::Builder::new()
            .name("pdfsift-search".into())
            .spawn(move || self.run())
            .map_err(|e| SearchError::Worker(e.to_string()))?;

        Ok(SearchHandle {
            events: rx,
            cancel: token,
            thread,
        })
    }
}

// ---------------------------------------------------------------------------
// SearchHandle
// ---------------------------------------------------------------------------

/// A search running on a worker thread.
pub struct SearchHandle {
    /// Every event of the run, ending with [`Event::Finished`] or
    /// [`Event::Error`]. Disconnects when the worker exits.
    pub events: Receiver<Event>,

    cancel: CancelToken,
    thread: JoinHandle<Result<SearchOutcome, SearchError>>,
}

impl SearchHandle {
    /// Ask the worker to stop. Matches found so far are kept.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Wait for the worker and return its outcome.
    pub fn join(self) -> Result<SearchOutcome, SearchError> {
        self.thread
            .join()
            .map_err(|_| SearchError::Worker("search thread panicked".into()))?
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fans one event out to the progress callback and every configured sink.
struct RunSink {
    on_progress: Option<Box<dyn Fn(&Progress) + Send>>,
    sinks:       Vec<Box<dyn EventSink>>,
}

impl EventSink for RunSink {
    fn emit(&self, event: Event) {
        if let (Some(f), Event::Progress(p)) = (&self.on_progress, &event) {
            f(p);
        }
        for sink in &self.sinks {
            sink.emit(event.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// One-call entry point
// ---------------------------------------------------------------------------

/// Run `request` with borrowed callbacks and no builder.
///
/// For callers that keep their progress and cancel state on the stack, such
/// as a CLI loop. Same semantics as [`SearchBuilder::run`].
pub fn search_pdfs(
    request:       SearchRequest,
    capabilities:  &Capabilities,
    on_progress:   Option<&(dyn Fn(&Progress) + Sync)>,
    should_cancel: Option<&(dyn Fn() -> bool + Sync)>,
) -> Result<SearchOutcome, SearchError> {
    let sink = ProgressOnly(on_progress);
    let cancelled = || should_cancel.is_some_and(|f| f());

    run(EngineOptions {
        request,
        capabilities,
        sink: &sink,
        should_cancel: &cancelled,
    })
}

struct ProgressOnly<'a>(Option<&'a (dyn Fn(&Progress) + Sync)>);

impl EventSink for ProgressOnly<'_> {
    fn emit(&self, event: Event) {
        if let (Some(f), Event::Progress(p)) = (self.0, &event) {
            f(p);
        }
    }
}
