//! `tractstack action`

use anyhow::Result;
use clap::Args;
use serde_json::{json, Value};

use tractstack_actions::{dispatch_click, resolve, ActionContext};
use tractstack_config::EngineConfig;
use tractstack_core::EventLog;
use tractstack_logging::LoggedSink;

#[derive(Args, Debug)]
pub struct ActionArgs {
    /// Action expression, e.g. "(goto (storyFragment pricing))"
    pub expr: String,
    /// Slug of the page the action is clicked on (defaults to the home slug)
    #[arg(long)]
    pub slug: Option<String>,
    /// The page is a context page
    #[arg(long)]
    pub context: bool,
    /// Pane the click happens in
    #[arg(long, default_value = "pane")]
    pub pane: String,
}

pub fn run(args: ActionArgs, config: &EngineConfig) -> Result<Value> {
    let slug = args.slug.unwrap_or_else(|| config.home_slug().to_string());
    let ctx = ActionContext::new(slug, config.home_slug()).with_context(args.context);

    let resolution = resolve(&args.expr, &ctx);
    let mut sink = LoggedSink::new(EventLog::new());
    let outcome = dispatch_click(&resolution, &ctx, &args.pane, &mut sink);
    let events = sink.into_inner().drain();

    Ok(json!({
        "actionable": resolution.is_actionable(),
        "target": resolution.target,
        "cue": resolution.cue,
        "outcome": outcome,
        "events": events,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(expr: &str, slug: Option<&str>) -> ActionArgs {
        ActionArgs {
            expr: expr.to_string(),
            slug: slug.map(str::to_string),
            context: false,
            pane: "pane-1".to_string(),
        }
    }

    #[test]
    fn test_navigate() {
        let out = run(args("(goto (storyFragment pricing))", None), &EngineConfig::default()).unwrap();
        assert_eq!(out["actionable"], true);
        assert_eq!(out["target"]["path"], "/pricing");
        assert_eq!(out["outcome"]["outcome"], "navigate");
        assert_eq!(out["events"][0]["verb"], "CLICKED");
    }

    #[test]
    fn test_video_on_current_page() {
        let out = run(args("(goto (bunny hello 42))", Some("hello")), &EngineConfig::default()).unwrap();
        assert_eq!(out["outcome"]["outcome"], "seekVideo");
        assert_eq!(out["cue"]["t"], 42);
        assert_eq!(out["events"][0]["verb"], "WATCHED");
    }

    #[test]
    fn test_malformed_is_inert() {
        let out = run(args("(goto (home)", None), &EngineConfig::default()).unwrap();
        assert_eq!(out["actionable"], false);
        assert_eq!(out["outcome"]["outcome"], "inert");
        assert!(out["events"].as_array().unwrap().is_empty());
    }
}
