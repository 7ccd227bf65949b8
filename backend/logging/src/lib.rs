//! Logging for the TractStack engine.
//!
//! Installs the global tracing subscriber and records emitted engine events
//! as structured log entries.

pub mod event_logger;
pub mod logger;

pub use event_logger::{EventLogEntry, EventLogger, LoggedSink, EVENTS_TARGET};
pub use logger::init_logger;
