//! Per-occurrence style resolution for tracked tags.

use std::collections::BTreeMap;

use serde::Serialize;
use tractstack_core::{Breakpoint, ClassSpec, OptionsPayload, ResponsiveStyles, StyleTuple};

/// Tags whose occurrences are counted and styled.
pub const TRACKED_TAGS: [&str; 9] = ["p", "h2", "h3", "h4", "code", "img", "ul", "ol", "li"];

pub fn is_tracked(tag: &str) -> bool {
    TRACKED_TAGS.contains(&tag)
}

/// Styles for one occurrence of a tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_css: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_classes: Option<ResponsiveStyles>,
}

/// Default class for the `index`-th occurrence of a tag.
pub fn resolve_default_class(spec: &ClassSpec, index: usize) -> Option<String> {
    match spec {
        ClassSpec::Scalar(class) => Some(class.clone()),
        ClassSpec::Alternates(list) if list.is_empty() => None,
        ClassSpec::Alternates(list) => Some(list[index % list.len()].clone()),
        ClassSpec::PerBreakpoint(_) => None,
    }
}

/// Override classes for the `index`-th occurrence.
///
/// A breakpoint value equal to the previous tuple position is omitted.
pub fn resolve_overrides(
    overrides: &BTreeMap<String, Vec<Option<StyleTuple>>>,
    index: usize,
) -> ResponsiveStyles {
    let mut styles = ResponsiveStyles::default();
    for (property, occurrences) in overrides {
        let Some(Some(tuple)) = occurrences.get(index) else {
            continue;
        };
        for (position, value) in tuple.iter().enumerate() {
            let Some(breakpoint) = Breakpoint::from_position(position) else {
                break;
            };
            let Some(value) = value else {
                continue;
            };
            if position > 0 && tuple[position - 1].as_ref() == Some(value) {
                continue;
            }
            styles.insert(breakpoint, property.clone(), value.to_string());
        }
    }
    styles
}

/// Resolves styles against one options payload.
pub struct StyleResolver<'a> {
    payload: &'a OptionsPayload,
}

impl<'a> StyleResolver<'a> {
    pub fn new(payload: &'a OptionsPayload) -> Self {
        Self { payload }
    }

    pub fn resolve(&self, tag: &str, index: usize) -> ResolvedStyle {
        let element_css = self
            .payload
            .class_names
            .all
            .get(tag)
            .and_then(|spec| resolve_default_class(spec, index));
        let override_classes = self
            .payload
            .class_names_payload
            .get(tag)
            .map(|t| resolve_overrides(&t.overrides, index))
            .filter(|styles| !styles.is_empty());
        ResolvedStyle { element_css, override_classes }
    }
}

/// Classes applied to the pane wrapper, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParentClasses {
    /// Plain class strings.
    pub css: Vec<String>,
    /// Responsive layers.
    pub layers: Vec<ResponsiveStyles>,
}

pub fn resolve_parent_classes(payload: &OptionsPayload) -> ParentClasses {
    match &payload.class_names_parent {
        None => ParentClasses::default(),
        Some(ClassSpec::Scalar(class)) => ParentClasses { css: vec![class.clone()], layers: Vec::new() },
        Some(ClassSpec::Alternates(list)) => ParentClasses { css: list.clone(), layers: Vec::new() },
        Some(ClassSpec::PerBreakpoint(layers)) => ParentClasses { css: Vec::new(), layers: layers.clone() },
    }
}
