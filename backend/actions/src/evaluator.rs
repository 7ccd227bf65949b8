//! Resolves parsed actions into navigation targets and video cues.
//!
//! Both the route and the cue are read off the same parsed expression, so a
//! payload that seeks a video on one page and navigates from another can
//! never disagree about its slug or timestamp.

use serde::Serialize;
use tracing::{debug, warn};
use tractstack_core::VideoCue;

use crate::syntax::{Action, ActionExpr};
use crate::targets::GotoTarget;

/// Where the action is being evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionContext {
    /// Slug of the page the action is rendered on.
    pub current_slug: String,
    /// Whether the current page is a context page.
    pub is_context: bool,
    /// Slug served at `/`.
    pub home_slug: String,
}

impl ActionContext {
    pub fn new(current_slug: impl Into<String>, home_slug: impl Into<String>) -> Self {
        Self {
            current_slug: current_slug.into(),
            is_context: false,
            home_slug: home_slug.into(),
        }
    }

    pub fn with_context(mut self, is_context: bool) -> Self {
        self.is_context = is_context;
        self
    }
}

/// An internal route within the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub path: String,
    /// Page slug the route lands on, when it names one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Pane anchor within the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
}

impl Route {
    fn path(path: impl Into<String>) -> Self {
        Self { path: path.into(), slug: None, anchor: None }
    }

    fn page(path: impl Into<String>, slug: &str) -> Self {
        Self {
            path: path.into(),
            slug: Some(slug.to_string()),
            anchor: None,
        }
    }
}

/// A resolved, navigable destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Target {
    Internal(Route),
    External { url: String },
}

impl Target {
    pub fn href(&self) -> &str {
        match self {
            Target::Internal(route) => &route.path,
            Target::External { url } => url,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, Target::External { .. })
    }

    pub fn slug(&self) -> Option<&str> {
        match self {
            Target::Internal(route) => route.slug.as_deref(),
            Target::External { .. } => None,
        }
    }
}

/// Split a `(goto (target args...))` call into its target and arguments.
pub(crate) fn goto_parts(expr: &ActionExpr) -> Option<(GotoTarget, Vec<&str>)> {
    if expr.command != "goto" {
        return None;
    }
    let words = expr.params.first()?.words();
    let (name, args) = words.split_first()?;
    match GotoTarget::from_name(name) {
        Some(target) => Some((target, args.to_vec())),
        None => {
            warn!(target_name = %name, "Unknown goto target");
            None
        }
    }
}

fn parse_seconds(raw: &str) -> Option<u32> {
    let digits = raw.strip_suffix('s').unwrap_or(raw);
    let t = if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    };
    if t.is_none() {
        debug!(raw = %raw, "Video cue time is not a whole number of seconds");
    }
    t
}

/// Resolve an action to a navigable target.
///
/// Returns `None` when the action is incomplete, unrecognized, or names no
/// navigable place; callers treat that as "not yet actionable".
pub fn evaluate(action: &Action, ctx: &ActionContext) -> Option<Target> {
    match action {
        Action::Link { url } => resolve_url(url),
        Action::Call(expr) if expr.command == "goto" => {
            let (target, args) = goto_parts(expr)?;
            if !target.is_complete(&args) && target != GotoTarget::Storykeep {
                debug!(target = target.name(), "Incomplete goto expression");
                return None;
            }
            resolve_goto(target, &args, ctx)
        }
        Action::Call(expr) if expr.command == "bunnyMoment" => None,
        Action::Call(expr) => {
            warn!(command = %expr.command, "Unknown action command");
            None
        }
    }
}

fn resolve_url(url: &str) -> Option<Target> {
    if url.starts_with("https://") {
        Some(Target::External { url: url.to_string() })
    } else if url.starts_with('/') {
        Some(Target::Internal(Route::path(url)))
    } else {
        debug!(url = %url, "Link is neither https nor site-relative");
        None
    }
}

fn resolve_goto(target: GotoTarget, args: &[&str], ctx: &ActionContext) -> Option<Target> {
    // The home page is served at `/`, never at `/<home-slug>`.
    let page_root = |slug: &str| {
        if slug == ctx.home_slug {
            "/".to_string()
        } else {
            format!("/{}", slug)
        }
    };

    let route = match (target, args) {
        (GotoTarget::Home, _) => Route::page("/", &ctx.home_slug),
        (GotoTarget::Storykeep, [sub, ..]) => match *sub {
            "dashboard" => Route::path("/storykeep"),
            "settings" => Route::path("/storykeep/settings"),
            "login" => Route::path("/storykeep/login?force=true"),
            "logout" => Route::path("/storykeep/logout"),
            other => {
                warn!(subcommand = %other, "Unknown storykeep subcommand");
                return None;
            }
        },
        (GotoTarget::Storykeep, []) if ctx.is_context => {
            Route::path(format!("/context/{}/edit", ctx.current_slug))
        }
        (GotoTarget::Storykeep, []) => Route::path(format!("/{}/edit", ctx.current_slug)),
        (GotoTarget::Concierge, [op, ..]) => Route::path(format!("/concierge/{}", op)),
        (GotoTarget::Context, [slug, ..]) => Route::page(format!("/context/{}", slug), slug),
        (GotoTarget::Product, [id, ..]) => Route::path(format!("/products/{}", id)),
        (GotoTarget::StoryFragment, [slug, ..]) => Route::page(page_root(slug), slug),
        (GotoTarget::StoryFragmentPane, [slug, pane, ..]) => Route {
            path: format!("{}#{}", page_root(slug), pane),
            slug: Some(slug.to_string()),
            anchor: Some(pane.to_string()),
        },
        (GotoTarget::Bunny, [slug, t, ..]) => {
            let t = parse_seconds(t)?;
            Route::page(format!("{}?t={}s#bunny", page_root(slug), t), slug)
        }
        (GotoTarget::BunnyContext, [slug, t, ..]) => {
            let t = parse_seconds(t)?;
            Route::page(format!("/context/{}?t={}s#bunny", slug, t), slug)
        }
        (GotoTarget::Url, [url, ..]) => return resolve_url(url),
        _ => return None,
    };
    Some(Target::Internal(route))
}

/// Extract the video cue an action carries, if any.
pub fn video_cue(action: &Action, ctx: &ActionContext) -> Option<VideoCue> {
    let Action::Call(expr) = action else {
        return None;
    };
    if expr.command == "bunnyMoment" {
        let words = expr.params.first()?.words();
        let [video_id, t, ..] = words.as_slice() else {
            debug!("Incomplete bunnyMoment expression");
            return None;
        };
        return Some(VideoCue {
            t: parse_seconds(t)?,
            video_id: Some(video_id.to_string()),
            slug: Some(ctx.current_slug.clone()),
            is_context: ctx.is_context,
        });
    }
    let (target, args) = goto_parts(expr)?;
    let is_context = match target {
        GotoTarget::Bunny => false,
        GotoTarget::BunnyContext => true,
        _ => return None,
    };
    let [slug, t, ..] = args.as_slice() else {
        return None;
    };
    Some(VideoCue {
        t: parse_seconds(t)?,
        video_id: None,
        slug: Some(slug.to_string()),
        is_context,
    })
}
