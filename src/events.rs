use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::results::{Match, Progress, SearchStatus};

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// A shared "stop now" flag.
///
/// Clones share the same flag, so a UI thread can hold one clone and the
/// worker running the search another. The search polls it before opening each
/// document and around every page.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Everything a running search reports.
///
/// Serialized as `{"type": "...", "data": ...}` so events can be written as
/// JSON lines across a process boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Event {
    Progress(Progress),

    Match(Match),

    /// A document was skipped. The run continues.
    DocumentFailed { path: PathBuf, reason: String },

    /// A non-fatal environment problem, reported once per run.
    Warning(String),

    /// The run failed before any document was processed.
    Error(String),

    /// Always the last event of a run that started.
    Finished { status: SearchStatus, matches: usize },
}

impl Event {
    /// Encode as a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Receives events from a running search.
///
/// The one seam between the search and whatever transport the caller uses: a
/// direct callback, a channel to a UI thread, or a pipe to another process.
/// `emit` must not block on a UI round trip.
pub trait EventSink: Send {
    fn emit(&self, event: Event);
}

/// Discards every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: Event) {}
}

/// Forwards events to a closure.
pub struct FnSink<F>(pub F);

impl<F> EventSink for FnSink<F>
where
    F: Fn(Event) + Send,
{
    fn emit(&self, event: Event) {
        (self.0)(event)
    }
}

impl EventSink for Sender<Event> {
    fn emit(&self, event: Event) {
        // A dropped receiver means nobody is listening any more.
        let _ = self.send(event);
    }
}

impl<S: EventSink + Sync + ?Sized> EventSink for Arc<S> {
    fn emit(&self, event: Event) {
        (**self).emit(event)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn token_clones_share_state() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn events_round_trip_as_tagged_json() {
        let event = Event::Match(Match {
            path:     PathBuf::from("/docs/a.pdf"),
            page:     2,
            snippet:  "quarterly revenue".into(),
            used_ocr: false,
        });
        let line = event.to_json_line().unwrap();
        assert!(line.contains(r#""type":"match""#));
        assert!(line.contains(r#""page_number_1based":2"#));
        assert_eq!(Event::from_json_line(&line).unwrap(), event);
    }

    #[test]
    fn finished_event_uses_snake_case_status() {
        let line = Event::Finished { status: SearchStatus::Cancelled, matches: 3 }
            .to_json_line()
            .unwrap();
        assert_eq!(line, r#"{"type":"finished","data":{"status":"cancelled","matches":3}}"#);
    }

    #[test]
    fn sender_sink_survives_dropped_receiver() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        tx.emit(Event::Warning("nobody listening".into()));
    }
}
