//! Click handling for resolved actions.
//!
//! A video cue that targets the page being viewed (same slug, same context
//! flag) seeks in place instead of navigating; everything else navigates.

use serde::Serialize;
use tracing::debug;
use tractstack_core::{EventSink, EventStream, VideoCue};

use crate::evaluator::{ActionContext, Target};
use crate::Resolution;

/// What the surface should do in response to a click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "camelCase")]
pub enum ClickOutcome {
    /// Navigate to the target.
    Navigate(Target),
    /// Stay on the page and seek the embedded video.
    SeekVideo(VideoCue),
    /// The action is not yet actionable.
    Inert,
}

/// Decide between navigation and an in-page video seek, pushing the
/// matching analytics event onto `sink`.
pub fn dispatch_click<S: EventSink + ?Sized>(
    resolution: &Resolution,
    ctx: &ActionContext,
    pane_id: &str,
    sink: &mut S,
) -> ClickOutcome {
    if let Some(cue) = &resolution.cue {
        let cue_slug = cue.slug.as_deref().unwrap_or(&ctx.current_slug);
        if cue_slug == ctx.current_slug && cue.is_context == ctx.is_context {
            debug!(pane_id, t = cue.t, "Seeking video on current page");
            sink.push(EventStream::start_video(pane_id, cue_slug));
            return ClickOutcome::SeekVideo(cue.clone());
        }
    }

    match &resolution.target {
        Some(target) => {
            if let Some(slug) = target.slug() {
                sink.push(EventStream::pane_clicked(pane_id, slug));
            }
            ClickOutcome::Navigate(target.clone())
        }
        None => ClickOutcome::Inert,
    }
}
