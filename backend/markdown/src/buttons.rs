//! Link-to-button processing.

use tractstack_actions::{resolve, ActionContext};
use tractstack_core::ButtonPayload;

/// How a link backed by a button payload renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedButton {
    /// `a` when the action navigates, `button` otherwise.
    pub tag_name: &'static str,
    pub href: Option<String>,
    pub payload: ButtonPayload,
}

/// Resolve a button's callback and decide how its link renders.
///
/// Actions that carry a video cue, or resolve to nothing navigable, render
/// as buttons with no `href`.
pub fn process_button_payload(payload: &ButtonPayload, ctx: &ActionContext) -> ProcessedButton {
    let resolution = resolve(&payload.callback_payload, ctx);
    let mut processed = payload.clone();
    processed.is_external_url = resolution.target.as_ref().map(|t| t.is_external());
    processed.bunny_payload = resolution.cue.clone();

    match (&resolution.target, &resolution.cue) {
        (Some(target), None) => ProcessedButton {
            tag_name: "a",
            href: Some(target.href().to_string()),
            payload: processed,
        },
        _ => ProcessedButton { tag_name: "button", href: None, payload: processed },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(callback: &str) -> ButtonPayload {
        ButtonPayload {
            callback_payload: callback.to_string(),
            class_name: Some("btn".into()),
            ..Default::default()
        }
    }

    fn ctx() -> ActionContext {
        ActionContext::new("about", "hello")
    }

    #[test]
    fn test_navigating_button_stays_link() {
        let out = process_button_payload(&button("(goto (storyFragment pricing))"), &ctx());
        assert_eq!(out.tag_name, "a");
        assert_eq!(out.href.as_deref(), Some("/pricing"));
        assert_eq!(out.payload.is_external_url, Some(false));
        assert_eq!(out.payload.class_name.as_deref(), Some("btn"));
    }

    #[test]
    fn test_external_link() {
        let out = process_button_payload(&button("(goto (url https://example.com))"), &ctx());
        assert_eq!(out.href.as_deref(), Some("https://example.com"));
        assert_eq!(out.payload.is_external_url, Some(true));
    }

    #[test]
    fn test_video_cue_becomes_button() {
        let out = process_button_payload(&button("(goto (bunny hello 42))"), &ctx());
        assert_eq!(out.tag_name, "button");
        assert_eq!(out.href, None);
        assert_eq!(out.payload.bunny_payload.unwrap().t, 42);

        let out = process_button_payload(&button("(bunnyMoment (vid 5))"), &ctx());
        assert_eq!(out.tag_name, "button");
        assert_eq!(out.payload.is_external_url, None);
    }

    #[test]
    fn test_incomplete_action_becomes_button() {
        let out = process_button_payload(&button("(goto (storyFragmentPane hello))"), &ctx());
        assert_eq!(out.tag_name, "button");
        assert!(out.payload.bunny_payload.is_none());
    }
}
