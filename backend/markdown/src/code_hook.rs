//! Code hooks: `name(params)` directives embedded in text and code nodes.
//!
//! A hook names an interactive widget (`belief(SLUG|yn|Prompt)`). Parameters
//! are `|`-separated sections; a section containing `,` is a list.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use tractstack_core::HookParam;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HookName {
    IdentifyAs,
    Youtube,
    Bunny,
    BunnyContext,
    Toggle,
    Resource,
    Belief,
    Signup,
}

impl HookName {
    pub const ALL: [HookName; 8] = [
        HookName::IdentifyAs,
        HookName::Youtube,
        HookName::Bunny,
        HookName::BunnyContext,
        HookName::Toggle,
        HookName::Resource,
        HookName::Belief,
        HookName::Signup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HookName::IdentifyAs => "identifyAs",
            HookName::Youtube => "youtube",
            HookName::Bunny => "bunny",
            HookName::BunnyContext => "bunnyContext",
            HookName::Toggle => "toggle",
            HookName::Resource => "resource",
            HookName::Belief => "belief",
            HookName::Signup => "signup",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.as_str() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookParseError {
    #[error("hook '{0}' has no closing parenthesis")]
    Unterminated(&'static str),
}

/// A recognized hook with its parsed parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeHook {
    pub name: HookName,
    pub params: Vec<HookParam>,
}

/// Locate the first hook in `text`.
///
/// A hook name matches wherever it is immediately followed by `(`; its
/// parameters run to the first `)` after that.
pub fn scan_code_hook(text: &str) -> Result<Option<CodeHook>, HookParseError> {
    for (start, c) in text.char_indices() {
        if !c.is_ascii_lowercase() {
            continue;
        }
        let rest = &text[start..];
        let Some(name) = HookName::ALL.into_iter().find(|h| {
            rest.strip_prefix(h.as_str())
                .is_some_and(|after| after.starts_with('('))
        }) else {
            continue;
        };
        let open = start + name.as_str().len() + 1;
        let Some(len) = text[open..].find(')') else {
            return Err(HookParseError::Unterminated(name.as_str()));
        };
        return Ok(Some(CodeHook {
            name,
            params: parse_hook_params(&text[open..open + len]),
        }));
    }
    Ok(None)
}

/// Locate the first hook in `text`, treating malformed directives as absent.
pub fn find_code_hook(text: &str) -> Option<CodeHook> {
    match scan_code_hook(text) {
        Ok(hook) => hook,
        Err(e) => {
            debug!(error = %e, "Ignoring malformed code hook");
            None
        }
    }
}

/// Split the text between a hook's parentheses into parameters.
pub fn parse_hook_params(inner: &str) -> Vec<HookParam> {
    inner
        .split('|')
        .map(|section| {
            let section = section.trim();
            if section.contains(',') {
                HookParam::List(section.split(',').map(|s| s.trim().to_string()).collect())
            } else {
                HookParam::Scalar(section.to_string())
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Typed widgets
// ---------------------------------------------------------------------------

/// A hook decoded into the widget it renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "widget", rename_all = "camelCase")]
pub enum Widget {
    Belief { slug: String, scale: String, prompt: String },
    IdentifyAs { slug: String, targets: Vec<String>, prompt: String },
    Toggle { slug: String, prompt: String },
    Youtube { embed: String, title: String },
    Bunny { embed: String, title: String, context: bool },
    Resource { kind: String, variation: String },
    #[serde(rename_all = "camelCase")]
    Signup { persona: String, prompt: String, clarify_consent: bool },
}

fn scalar(params: &[HookParam], index: usize, default: &str) -> String {
    match params.get(index) {
        Some(HookParam::Scalar(s)) if !s.is_empty() => s.clone(),
        Some(HookParam::List(items)) => items.join(","),
        _ => default.to_string(),
    }
}

impl CodeHook {
    pub fn widget(&self) -> Widget {
        let p = self.params.as_slice();
        match self.name {
            HookName::Belief => Widget::Belief {
                slug: scalar(p, 0, "BELIEF"),
                scale: scalar(p, 1, "yn"),
                prompt: scalar(p, 2, "Prompt"),
            },
            HookName::IdentifyAs => Widget::IdentifyAs {
                slug: scalar(p, 0, "BELIEF"),
                targets: match p.get(1) {
                    Some(HookParam::Scalar(s)) if s.is_empty() => vec!["*".to_string()],
                    Some(param) => param.to_list(),
                    None => vec!["*".to_string()],
                },
                prompt: scalar(p, 2, "Prompt"),
            },
            HookName::Toggle => Widget::Toggle {
                slug: scalar(p, 0, "BELIEF"),
                prompt: scalar(p, 1, "Prompt"),
            },
            HookName::Youtube => Widget::Youtube {
                embed: scalar(p, 0, "*"),
                title: scalar(p, 1, "Descriptive Title"),
            },
            HookName::Bunny | HookName::BunnyContext => Widget::Bunny {
                embed: scalar(p, 0, "*"),
                title: scalar(p, 1, "Descriptive Title"),
                context: self.name == HookName::BunnyContext,
            },
            HookName::Resource => Widget::Resource {
                kind: scalar(p, 0, "?"),
                variation: scalar(p, 1, "?"),
            },
            HookName::Signup => Widget::Signup {
                persona: scalar(p, 0, "Major Updates Only"),
                prompt: scalar(p, 1, "Keep in touch!"),
                clarify_consent: scalar(p, 2, "false") == "true",
            },
        }
    }
}
