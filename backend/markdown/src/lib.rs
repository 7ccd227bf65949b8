//! Markdown compilation
//!
//! Turns authored Markdown (or a hast-shaped element tree) into a flat,
//! parent-referencing node list with per-occurrence styles, code-hook
//! parameters and resolved button actions attached.

pub mod ast;
pub mod buttons;
pub mod code_hook;
pub mod flatten;
pub mod graph;
pub mod lookup;
pub mod styles;

pub use ast::{parse_markdown, HastNode};
pub use buttons::{process_button_payload, ProcessedButton};
pub use code_hook::{find_code_hook, parse_hook_params, scan_code_hook, CodeHook, HookName, HookParseError, Widget};
pub use flatten::{
    classify_list_item, clean_text, compile, compile_markdown, compile_with_ids, CompileContext,
};
pub use graph::NodeGraph;
pub use lookup::{LookupKind, MarkdownLookup, NodePosition};
pub use styles::{
    is_tracked, resolve_default_class, resolve_overrides, resolve_parent_classes, ParentClasses,
    ResolvedStyle, StyleResolver, TRACKED_TAGS,
};
