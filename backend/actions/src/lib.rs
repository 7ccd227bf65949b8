//! The action expression language used by links and buttons.
//!
//! `resolve` lexes and parses an expression once and reads both the
//! navigation target and any video cue off that single parse.

pub mod dispatch;
pub mod evaluator;
pub mod syntax;
pub mod targets;

pub use dispatch::{dispatch_click, ClickOutcome};
pub use evaluator::{evaluate, video_cue, ActionContext, Route, Target};
pub use syntax::{lex, parse, parse_action, Action, ActionExpr, Expr, Param, SyntaxError};
pub use targets::{Arity, GotoTarget};

use serde::Serialize;
use tracing::debug;
use tractstack_core::VideoCue;

/// Everything an action expression resolves to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub target: Option<Target>,
    pub cue: Option<VideoCue>,
}

impl Resolution {
    /// Whether a click on this action does anything.
    pub fn is_actionable(&self) -> bool {
        self.target.is_some() || self.cue.is_some()
    }
}

/// Resolve an action expression in the given page context.
///
/// Malformed input resolves to an empty `Resolution`.
pub fn resolve(input: &str, ctx: &ActionContext) -> Resolution {
    match parse(input) {
        Ok(action) => Resolution {
            target: evaluate(&action, ctx),
            cue: video_cue(&action, ctx),
        },
        Err(e) => {
            debug!(input, error = %e, "Action expression did not parse");
            Resolution::default()
        }
    }
}
