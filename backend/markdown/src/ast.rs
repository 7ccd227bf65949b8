//! Markdown element tree
//!
//! A hast-shaped tree (`root`, `element`, `text`) that the flattener walks.
//! Trees arrive either as JSON from an external parser or from
//! [`parse_markdown`], which builds the same shape from pulldown-cmark events.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use tractstack_core::EngineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HastNode {
    Root {
        #[serde(default)]
        children: Vec<HastNode>,
    },
    Element {
        #[serde(rename = "tagName", default, skip_serializing_if = "Option::is_none")]
        tag_name: Option<String>,
        #[serde(default)]
        properties: Map<String, Value>,
        #[serde(default)]
        children: Vec<HastNode>,
    },
    Text {
        #[serde(default)]
        value: String,
    },
    /// Comments, doctypes, and anything else the flattener ignores.
    #[serde(other)]
    Other,
}

impl HastNode {
    pub fn root(children: Vec<HastNode>) -> Self {
        HastNode::Root { children }
    }

    pub fn element(tag: &str, children: Vec<HastNode>) -> Self {
        HastNode::Element {
            tag_name: Some(tag.to_string()),
            properties: Map::new(),
            children,
        }
    }

    pub fn element_with(tag: &str, properties: Map<String, Value>, children: Vec<HastNode>) -> Self {
        HastNode::Element {
            tag_name: Some(tag.to_string()),
            properties,
            children,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        HastNode::Text { value: value.into() }
    }

    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        serde_json::from_str(raw).map_err(|e| EngineError::InvalidTree(e.to_string()))
    }

    pub fn children(&self) -> &[HastNode] {
        match self {
            HastNode::Root { children } | HastNode::Element { children, .. } => children,
            HastNode::Text { .. } | HastNode::Other => &[],
        }
    }

    pub fn tag_name(&self) -> Option<&str> {
        match self {
            HastNode::Element { tag_name, .. } => tag_name.as_deref(),
            _ => None,
        }
    }

    /// String-valued property, e.g. `src` or `href`.
    pub fn property(&self, key: &str) -> Option<&str> {
        match self {
            HastNode::Element { properties, .. } => properties.get(key).and_then(Value::as_str),
            _ => None,
        }
    }
}

struct Frame {
    tag: &'static str,
    properties: Map<String, Value>,
    children: Vec<HastNode>,
}

impl Frame {
    fn new(tag: &'static str) -> Self {
        Self { tag, properties: Map::new(), children: Vec::new() }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(HastNode::Text { value }) = self.children.last_mut() {
            value.push_str(text);
        } else {
            self.children.push(HastNode::text(text));
        }
    }

    fn finish(self) -> HastNode {
        HastNode::element_with(self.tag, self.properties, self.children)
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

/// Parse Markdown text into an element tree.
pub fn parse_markdown(markdown: &str) -> HastNode {
    let parser = Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH);

    // The bottom frame collects the root's children.
    let mut stack = vec![Frame::new("root")];
    // Alt text of the image being read, if any.
    let mut image_alt: Option<String> = None;

    for event in parser {
        if let Some(alt) = image_alt.as_mut() {
            match &event {
                Event::Text(text) | Event::Code(text) => {
                    alt.push_str(text);
                    continue;
                }
                Event::End(Tag::Image(..)) => {}
                _ => continue,
            }
        }

        match event {
            Event::Start(tag) => match tag {
                Tag::Paragraph => stack.push(Frame::new("p")),
                Tag::Heading(level, _, _) => stack.push(Frame::new(heading_tag(level))),
                Tag::BlockQuote => stack.push(Frame::new("blockquote")),
                Tag::CodeBlock(kind) => {
                    stack.push(Frame::new("pre"));
                    let mut code = Frame::new("code");
                    if let CodeBlockKind::Fenced(lang) = kind {
                        if !lang.is_empty() {
                            code.properties.insert(
                                "className".into(),
                                Value::Array(vec![Value::String(format!("language-{}", lang))]),
                            );
                        }
                    }
                    stack.push(code);
                }
                Tag::List(Some(_)) => stack.push(Frame::new("ol")),
                Tag::List(None) => stack.push(Frame::new("ul")),
                Tag::Item => stack.push(Frame::new("li")),
                Tag::Emphasis => stack.push(Frame::new("em")),
                Tag::Strong => stack.push(Frame::new("strong")),
                Tag::Strikethrough => stack.push(Frame::new("del")),
                Tag::Link(_, dest, title) => {
                    let mut frame = Frame::new("a");
                    frame.properties.insert("href".into(), Value::String(dest.to_string()));
                    if !title.is_empty() {
                        frame.properties.insert("title".into(), Value::String(title.to_string()));
                    }
                    stack.push(frame);
                }
                Tag::Image(_, dest, _) => {
                    let mut frame = Frame::new("img");
                    frame.properties.insert("src".into(), Value::String(dest.to_string()));
                    stack.push(frame);
                    image_alt = Some(String::new());
                }
                other => {
                    debug!(tag = ?other, "Unsupported markdown block; keeping its text");
                    stack.push(Frame::new("div"));
                }
            },
            Event::End(tag) => {
                if let Tag::Image(..) = tag {
                    if let (Some(alt), Some(frame)) = (image_alt.take(), stack.last_mut()) {
                        if !alt.is_empty() {
                            frame.properties.insert("alt".into(), Value::String(alt));
                        }
                    }
                }
                let closes = if matches!(tag, Tag::CodeBlock(_)) { 2 } else { 1 };
                for _ in 0..closes {
                    if stack.len() < 2 {
                        break;
                    }
                    if let Some(frame) = stack.pop() {
                        let node = frame.finish();
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(node);
                        }
                    }
                }
            }
            Event::Text(text) => {
                if let Some(frame) = stack.last_mut() {
                    frame.push_text(&text);
                }
            }
            Event::Code(text) => {
                if let Some(frame) = stack.last_mut() {
                    frame.children.push(HastNode::element("code", vec![HastNode::text(text.to_string())]));
                }
            }
            Event::SoftBreak => {
                if let Some(frame) = stack.last_mut() {
                    frame.push_text("\n");
                }
            }
            Event::HardBreak => {
                if let Some(frame) = stack.last_mut() {
                    frame.children.push(HastNode::element("br", Vec::new()));
                }
            }
            Event::Rule => {
                if let Some(frame) = stack.last_mut() {
                    frame.children.push(HastNode::element("hr", Vec::new()));
                }
            }
            other => debug!(event = ?other, "Ignoring markdown event"),
        }
    }

    let children = stack.into_iter().next().map(|f| f.children).unwrap_or_default();
    HastNode::root(children)
}
