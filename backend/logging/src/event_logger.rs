//! Event Logger
//!
//! Engine events (pane clicks, video starts, belief changes) written as
//! timestamped entries under their own tracing target, so a file layer or
//! filter can split them from diagnostics.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use tractstack_core::{EventSink, EventStream};

/// Tracing target for engine events.
pub const EVENTS_TARGET: &str = "tractstack_events";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLogEntry<'a> {
    pub timestamp: DateTime<Utc>,
    pub event: &'a EventStream,
}

pub struct EventLogger;

impl EventLogger {
    pub fn log_event(event: &EventStream) {
        let entry = EventLogEntry { timestamp: Utc::now(), event };
        match serde_json::to_string(&entry) {
            Ok(json) => info!(target: EVENTS_TARGET, kind = %event.kind, verb = %event.verb, entry = %json, "Engine event"),
            Err(e) => info!(target: EVENTS_TARGET, kind = %event.kind, error = %e, "Engine event (unserializable)"),
        }
    }
}

/// An event sink that logs every event before handing it on.
pub struct LoggedSink<S> {
    inner: S,
}

impl<S: EventSink> LoggedSink<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: EventSink> EventSink for LoggedSink<S> {
    fn push(&mut self, event: EventStream) {
        EventLogger::log_event(&event);
        self.inner.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tractstack_core::EventLog;

    #[test]
    fn test_entry_shape() {
        let event = EventStream::pane_clicked("pane-1", "pricing");
        let entry = EventLogEntry { timestamp: Utc::now(), event: &event };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json["timestamp"].is_string());
        assert_eq!(json["event"]["type"], "PaneClicked");
        assert_eq!(json["event"]["targetSlug"], "pricing");
    }

    #[test]
    fn test_logged_sink_forwards() {
        let mut sink = LoggedSink::new(EventLog::new());
        sink.push(EventStream::start_video("pane-1", "hello"));
        sink.push(EventStream::belief("A", "yes", None));
        let log = sink.into_inner();
        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[0].verb, "WATCHED");
    }
}
