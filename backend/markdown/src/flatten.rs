//! Flattens an element tree into parent-referencing `FlatNode`s.

use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::{debug, info};
use tractstack_actions::ActionContext;
use tractstack_core::{FileNode, FlatNode, IdSource, OptionsPayload, UuidIds, DEFAULT_FALLBACK_ALT};

use crate::ast::{parse_markdown, HastNode};
use crate::buttons::process_button_payload;
use crate::code_hook::find_code_hook;
use crate::graph::NodeGraph;
use crate::styles::{is_tracked, StyleResolver};

/// List items whose only text child is longer than this render as paragraphs.
const LONG_ITEM_CHARS: usize = 80;

/// Inputs to one compilation pass.
#[derive(Debug, Clone)]
pub struct CompileContext<'a> {
    pub options: &'a OptionsPayload,
    pub files: &'a [FileNode],
    pub actions: ActionContext,
    /// Parent assigned to top-level blocks.
    pub container_id: String,
    pub fallback_alt: String,
}

impl<'a> CompileContext<'a> {
    pub fn new(options: &'a OptionsPayload, files: &'a [FileNode], actions: ActionContext) -> Self {
        Self {
            options,
            files,
            actions,
            container_id: "markdown".to_string(),
            fallback_alt: DEFAULT_FALLBACK_ALT.to_string(),
        }
    }

    pub fn with_container_id(mut self, id: impl Into<String>) -> Self {
        self.container_id = id.into();
        self
    }

    pub fn with_fallback_alt(mut self, alt: impl Into<String>) -> Self {
        self.fallback_alt = alt.into();
        self
    }
}

/// Compile an element tree with random node ids.
pub fn compile(root: &HastNode, ctx: &CompileContext<'_>) -> NodeGraph {
    compile_with_ids(root, ctx, &mut UuidIds)
}

/// Parse and compile Markdown text.
pub fn compile_markdown(markdown: &str, ctx: &CompileContext<'_>) -> NodeGraph {
    compile(&parse_markdown(markdown), ctx)
}

pub fn compile_with_ids(root: &HastNode, ctx: &CompileContext<'_>, ids: &mut dyn IdSource) -> NodeGraph {
    let mut flattener = Flattener {
        ctx,
        styles: StyleResolver::new(ctx.options),
        ids,
        counts: HashMap::new(),
        out: Vec::new(),
    };
    flattener.visit(root, None);

    let nodes: Vec<FlatNode> = flattener
        .out
        .into_iter()
        .map(|mut node| {
            if node.parent_id.is_none() {
                node.parent_id = Some(ctx.container_id.clone());
            }
            node
        })
        .collect();
    info!(container = %ctx.container_id, nodes = nodes.len(), "Compiled markdown");
    NodeGraph::new(ctx.container_id.clone(), nodes)
}

/// Collapse whitespace runs to a single space.
pub fn clean_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_space = false;
    for c in raw.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn first_text(children: &[HastNode]) -> Option<&str> {
    children.iter().find_map(|c| match c {
        HastNode::Text { value } => Some(value.as_str()),
        _ => None,
    })
}

/// Render hint for a list item, from the shape of its children.
pub fn classify_list_item(children: &[HastNode]) -> Option<&'static str> {
    let kept: Vec<&HastNode> = children
        .iter()
        .filter(|c| matches!(c, HastNode::Text { .. }) || c.tag_name().is_some())
        .collect();
    match kept.as_slice() {
        [] => None,
        [first, ..] if first.tag_name() == Some("img") => Some("img"),
        [first, ..] if first.tag_name() == Some("code") => Some("widget"),
        [HastNode::Text { value }] if clean_text(value).chars().count() > LONG_ITEM_CHARS => Some("p"),
        [HastNode::Text { .. }] => Some("h3"),
        [HastNode::Text { .. }, _, ..] => Some("p"),
        _ => None,
    }
}

struct Flattener<'a, 'c> {
    ctx: &'a CompileContext<'c>,
    styles: StyleResolver<'a>,
    ids: &'a mut dyn IdSource,
    counts: HashMap<String, usize>,
    out: Vec<FlatNode>,
}

impl Flattener<'_, '_> {
    fn visit(&mut self, node: &HastNode, parent: Option<&str>) {
        match node {
            HastNode::Root { children } => {
                for child in children {
                    self.visit(child, parent);
                }
            }
            HastNode::Text { value } => {
                let mut flat = FlatNode::new(self.ids.next_id(), parent.map(str::to_string), "text");
                flat.copy = Some(clean_text(value));
                flat.code_hook_params = find_code_hook(value).map(|h| h.params);
                self.out.push(flat);
            }
            HastNode::Element { tag_name: Some(tag), properties, children } => {
                self.visit_element(tag, properties, children, parent);
            }
            HastNode::Element { tag_name: None, .. } => {
                debug!("Skipping element without tagName");
            }
            HastNode::Other => debug!("Skipping unsupported node"),
        }
    }

    fn visit_element(
        &mut self,
        tag: &str,
        properties: &Map<String, Value>,
        children: &[HastNode],
        parent: Option<&str>,
    ) {
        let id = self.ids.next_id();
        let mut flat = FlatNode::new(id.clone(), parent.map(str::to_string), tag);

        if is_tracked(tag) {
            let count = self.counts.entry(tag.to_string()).or_insert(0);
            let style = self.styles.resolve(tag, *count);
            *count += 1;
            flat.element_css = style.element_css;
            flat.override_classes = style.override_classes;
        }

        let prop = |key: &str| properties.get(key).and_then(Value::as_str);

        match tag {
            "code" => {
                if let Some(text) = first_text(children) {
                    flat.copy = Some(text.to_string());
                    flat.code_hook_params = find_code_hook(text).map(|h| h.params);
                }
                self.out.push(flat);
                return;
            }
            "img" => self.apply_image(&mut flat, prop("src"), prop("alt")),
            "a" => {
                if let Some(href) = prop("href") {
                    flat.href = Some(href.to_string());
                    if let Some(button) = self.ctx.options.button(href) {
                        let processed = process_button_payload(button, &self.ctx.actions);
                        flat.tag_name = processed.tag_name.to_string();
                        flat.href = processed.href;
                        flat.button_payload = Some(processed.payload);
                    }
                }
            }
            "li" => flat.tag_name_custom = classify_list_item(children).map(str::to_string),
            _ => {}
        }

        self.out.push(flat);
        for child in children {
            self.visit(child, Some(&id));
        }
    }

    fn apply_image(&self, flat: &mut FlatNode, src: Option<&str>, alt: Option<&str>) {
        let alt = alt.filter(|a| !a.is_empty());
        let file = src.and_then(|s| self.ctx.files.iter().find(|f| f.filename == s));
        match file {
            Some(file) => {
                flat.src = Some(file.src.clone());
                flat.src_set = file.src_set.clone();
                flat.file_id = Some(file.id.clone());
                flat.alt = Some(
                    alt.or(file.alt_description.as_deref().filter(|a| !a.is_empty()))
                        .unwrap_or(&self.ctx.fallback_alt)
                        .to_string(),
                );
            }
            None => {
                if let Some(src) = src {
                    debug!(src, "Image not in file table; keeping literal path");
                }
                flat.src = src.map(str::to_string);
                flat.alt = alt.map(str::to_string);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tractstack_core::SequentialIds;

    fn options(value: serde_json::Value) -> OptionsPayload {
        OptionsPayload::from_value(Some(&value))
    }

    fn run(root: &HastNode, ctx: &CompileContext<'_>) -> NodeGraph {
        compile_with_ids(root, ctx, &mut SequentialIds::new("n"))
    }

    fn p(text: &str) -> HastNode {
        HastNode::element("p", vec![HastNode::text(text)])
    }

    #[test]
    fn test_zebra_paragraphs() {
        let opts = options(json!({"classNames": {"all": {"p": ["a", "b"]}}}));
        let ctx = CompileContext::new(&opts, &[], ActionContext::default());
        let root = HastNode::root(vec![p("one"), p("two"), p("three")]);
        let graph = run(&root, &ctx);

        let css: Vec<_> = graph
            .nodes()
            .iter()
            .filter(|n| n.tag_name == "p")
            .map(|n| n.element_css.clone().unwrap())
            .collect();
        assert_eq!(css, vec!["a", "b", "a"]);
    }

    #[test]
    fn test_parent_links_and_order() {
        let opts = OptionsPayload::default();
        let ctx = CompileContext::new(&opts, &[], ActionContext::default()).with_container_id("pane-1");
        let root = HastNode::root(vec![
            HastNode::element("h2", vec![HastNode::text("Title")]),
            HastNode::element(
                "ul",
                vec![
                    HastNode::element("li", vec![HastNode::text("first")]),
                    HastNode::element("li", vec![HastNode::text("second")]),
                ],
            ),
        ]);
        let graph = run(&root, &ctx);

        let tags: Vec<_> = graph.nodes().iter().map(|n| n.tag_name.as_str()).collect();
        assert_eq!(tags, vec!["h2", "text", "ul", "li", "text", "li", "text"]);
        assert!(graph.nodes().iter().all(|n| n.parent_id.is_some()));
        assert_eq!(graph.roots().count(), 2);

        let ul = &graph.nodes()[2];
        assert_eq!(graph.children_of(&ul.id).count(), 2);
        for (i, node) in graph.nodes().iter().enumerate() {
            let parent = node.parent_id.as_deref().unwrap();
            if parent != "pane-1" {
                let at = graph.nodes().iter().position(|n| n.id == parent).unwrap();
                assert!(at < i, "parent must precede child");
            }
        }
    }

    #[test]
    fn test_text_whitespace_collapses() {
        let opts = OptionsPayload::default();
        let ctx = CompileContext::new(&opts, &[], ActionContext::default());
        let graph = run(&HastNode::root(vec![p("a  \n\t b ")]), &ctx);
        assert_eq!(graph.nodes()[1].copy.as_deref(), Some("a b "));
    }

    #[test]
    fn test_code_collapses_with_hook() {
        let opts = OptionsPayload::default();
        let ctx = CompileContext::new(&opts, &[], ActionContext::default());
        let root = HastNode::root(vec![HastNode::element(
            "ul",
            vec![HastNode::element(
                "li",
                vec![HastNode::element("code", vec![HastNode::text("belief(BELIEF|yn|Prompt)")])],
            )],
        )]);
        let graph = run(&root, &ctx);
        assert_eq!(graph.len(), 3);

        let li = &graph.nodes()[1];
        assert_eq!(li.tag_name_custom.as_deref(), Some("widget"));
        let code = &graph.nodes()[2];
        assert_eq!(code.copy.as_deref(), Some("belief(BELIEF|yn|Prompt)"));
        assert_eq!(code.code_hook_params.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn test_list_item_classification() {
        let long = "x".repeat(81);
        let short = "x".repeat(80);
        let img = HastNode::element("img", vec![]);
        assert_eq!(classify_list_item(&[HastNode::text(long.clone())]), Some("p"));
        assert_eq!(classify_list_item(&[HastNode::text(short)]), Some("h3"));
        assert_eq!(classify_list_item(&[img.clone(), HastNode::text("caption")]), Some("img"));
        assert_eq!(
            classify_list_item(&[HastNode::text("see "), HastNode::element("a", vec![])]),
            Some("p")
        );
        assert_eq!(classify_list_item(&[]), None);
    }

    #[test]
    fn test_image_file_table() {
        let opts = OptionsPayload::default();
        let files = vec![FileNode {
            id: "f1".into(),
            filename: "cat.png".into(),
            src: "/media/cat-1200.png".into(),
            alt_description: Some("A cat".into()),
            src_set: Some("/media/cat-600.png 600w".into()),
        }];
        let ctx = CompileContext::new(&opts, &files, ActionContext::default());

        let mut props = Map::new();
        props.insert("src".into(), json!("cat.png"));
        let graph = run(&HastNode::root(vec![HastNode::element_with("img", props, vec![])]), &ctx);
        let img = &graph.nodes()[0];
        assert_eq!(img.src.as_deref(), Some("/media/cat-1200.png"));
        assert_eq!(img.file_id.as_deref(), Some("f1"));
        assert_eq!(img.alt.as_deref(), Some("A cat"));
        assert!(img.src_set.is_some());

        let mut props = Map::new();
        props.insert("src".into(), json!("dog.png"));
        props.insert("alt".into(), json!("A dog"));
        let graph = run(&HastNode::root(vec![HastNode::element_with("img", props, vec![])]), &ctx);
        let img = &graph.nodes()[0];
        assert_eq!(img.src.as_deref(), Some("dog.png"));
        assert_eq!(img.alt.as_deref(), Some("A dog"));
        assert!(img.file_id.is_none());
    }

    #[test]
    fn test_image_apology_alt() {
        let opts = OptionsPayload::default();
        let files = vec![FileNode {
            id: "f2".into(),
            filename: "x.png".into(),
            src: "/x.png".into(),
            ..Default::default()
        }];
        let ctx = CompileContext::new(&opts, &files, ActionContext::default());
        let mut props = Map::new();
        props.insert("src".into(), json!("x.png"));
        let graph = run(&HastNode::root(vec![HastNode::element_with("img", props, vec![])]), &ctx);
        assert_eq!(graph.nodes()[0].alt.as_deref(), Some(DEFAULT_FALLBACK_ALT));
    }

    #[test]
    fn test_button_links() {
        let opts = options(json!({
            "buttons": {
                "#watch": {"callbackPayload": "(goto (bunny about 30))"},
                "#go": {"callbackPayload": "(goto (storyFragment pricing))"}
            }
        }));
        let ctx = CompileContext::new(&opts, &[], ActionContext::new("about", "hello"));
        let link = |href: &str| {
            let mut props = Map::new();
            props.insert("href".into(), json!(href));
            HastNode::element_with("a", props, vec![HastNode::text("click")])
        };
        let root = HastNode::root(vec![HastNode::element(
            "p",
            vec![link("#watch"), link("#go"), link("/plain")],
        )]);
        let graph = run(&root, &ctx);
        let anchors: Vec<_> = graph
            .nodes()
            .iter()
            .filter(|n| n.tag_name == "a" || n.tag_name == "button")
            .collect();

        assert_eq!(anchors[0].tag_name, "button");
        assert_eq!(anchors[0].href, None);
        assert_eq!(anchors[0].button_payload.as_ref().unwrap().bunny_payload.as_ref().unwrap().t, 30);
        assert_eq!(anchors[1].tag_name, "a");
        assert_eq!(anchors[1].href.as_deref(), Some("/pricing"));
        assert_eq!(anchors[2].href.as_deref(), Some("/plain"));
        assert!(anchors[2].button_payload.is_none());
    }

    #[test]
    fn test_malformed_nodes_skipped() {
        let opts = OptionsPayload::default();
        let ctx = CompileContext::new(&opts, &[], ActionContext::default());
        let root = HastNode::root(vec![
            HastNode::Other,
            HastNode::Element { tag_name: None, properties: Map::new(), children: vec![p("lost")] },
            p("kept"),
        ]);
        let graph = run(&root, &ctx);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.nodes()[1].copy.as_deref(), Some("kept"));
    }

    #[test]
    fn test_compile_markdown_is_deterministic() {
        let opts = options(json!({
            "classNames": {"all": {"p": ["a", "b"], "h2": "title"}},
            "classNamesPayload": {"p": {"override": {"size": [["lg", "xl"]]}}}
        }));
        let ctx = CompileContext::new(&opts, &[], ActionContext::default());
        let text = "## Hello\n\nFirst para.\n\nSecond para.\n\n- item `belief(B|yn|Q)`\n";
        let root = parse_markdown(text);
        let once = serde_json::to_string(run(&root, &ctx).nodes()).unwrap();
        let twice = serde_json::to_string(run(&root, &ctx).nodes()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_child_counts_match_tree() {
        let opts = OptionsPayload::default();
        let ctx = CompileContext::new(&opts, &[], ActionContext::default());
        let root = parse_markdown("Some *mixed* **text** here.\n\n1. a\n2. b\n3. c\n");
        let graph = run(&root, &ctx);

        let ast_para = &root.children()[0];
        let flat_para = graph.roots().next().unwrap();
        assert_eq!(graph.children_of(&flat_para.id).count(), ast_para.children().len());

        let flat_ol = graph.roots().nth(1).unwrap();
        assert_eq!(flat_ol.tag_name, "ol");
        assert_eq!(graph.children_of(&flat_ol.id).count(), 3);
    }
}
