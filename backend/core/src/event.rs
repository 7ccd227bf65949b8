use serde::{Deserialize, Serialize};

/// Well-known event verbs.
pub mod verbs {
    /// A visitor followed a link or button to another pane or page.
    pub const CLICKED: &str = "CLICKED";
    /// A visitor started a video at a cue point on the current page.
    pub const WATCHED: &str = "WATCHED";
    /// Removes a belief from the visitor's belief set.
    pub const UNSET: &str = "UNSET";
}

/// An entry in the append-only event stream consumed by analytics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStream {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub verb: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_slug: Option<String>,
}

/// Categories of events the engine emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A link or button on a pane navigated somewhere
    PaneClicked,
    /// A video cue was triggered on the current page
    StartVideo,
    /// A belief was set or unset
    Belief,
}

impl EventStream {
    pub fn pane_clicked(pane_id: impl Into<String>, target_slug: impl Into<String>) -> Self {
        Self {
            id: pane_id.into(),
            kind: EventKind::PaneClicked,
            verb: verbs::CLICKED.to_string(),
            object: None,
            target_slug: Some(target_slug.into()),
        }
    }

    pub fn start_video(pane_id: impl Into<String>, target_slug: impl Into<String>) -> Self {
        Self {
            id: pane_id.into(),
            kind: EventKind::StartVideo,
            verb: verbs::WATCHED.to_string(),
            object: None,
            target_slug: Some(target_slug.into()),
        }
    }

    /// A belief event; the id of a belief event is the belief slug.
    pub fn belief(slug: impl Into<String>, verb: impl Into<String>, object: Option<String>) -> Self {
        Self {
            id: slug.into(),
            kind: EventKind::Belief,
            verb: verb.into(),
            object,
            target_slug: None,
        }
    }

    pub fn is_unset(&self) -> bool {
        self.kind == EventKind::Belief && self.verb == verbs::UNSET
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_else(|| format!("{:?}", self));
        write!(f, "{}", s)
    }
}

/// Destination for emitted events.
pub trait EventSink {
    fn push(&mut self, event: EventStream);
}

impl EventSink for Vec<EventStream> {
    fn push(&mut self, event: EventStream) {
        Vec::push(self, event);
    }
}

/// In-memory append-only event log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<EventStream>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[EventStream] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take every event recorded so far, leaving the log empty.
    pub fn drain(&mut self) -> Vec<EventStream> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for EventLog {
    fn push(&mut self, event: EventStream) {
        tracing::debug!(kind = %event.kind, verb = %event.verb, id = %event.id, "Event recorded");
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_shape() {
        let event = EventStream::pane_clicked("pane-1", "hello");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "PaneClicked");
        assert_eq!(json["verb"], "CLICKED");
        assert_eq!(json["targetSlug"], "hello");
        assert!(json.get("object").is_none());
    }

    #[test]
    fn test_event_roundtrip() {
        let event = EventStream::belief("topic", "INTERESTED", None);
        let json = serde_json::to_string(&event).unwrap();
        let back: EventStream = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_event_kind_display() {
        assert_eq!(EventKind::StartVideo.to_string(), "StartVideo");
        assert_eq!(EventKind::Belief.to_string(), "Belief");
    }

    #[test]
    fn test_log_is_append_only() {
        let mut log = EventLog::new();
        log.push(EventStream::belief("a", "YES", None));
        log.push(EventStream::belief("a", verbs::UNSET, None));
        assert_eq!(log.len(), 2);
        assert!(log.events()[1].is_unset());
        assert_eq!(log.drain().len(), 2);
        assert!(log.is_empty());
    }
}
