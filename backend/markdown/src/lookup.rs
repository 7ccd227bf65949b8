//! Positional index over a compiled document.
//!
//! Every image, list item, code item and link gets a running occurrence
//! index in document order, along with its position as
//! (top-level block, nth of its kind within that block). The editor uses
//! these to map a click on rendered output back to the markdown source.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tractstack_core::FlatNode;

use crate::graph::NodeGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LookupKind {
    Image,
    ListItem,
    CodeItem,
    Link,
}

impl LookupKind {
    fn of(node: &FlatNode) -> Option<Self> {
        match node.tag_name.as_str() {
            "img" => Some(LookupKind::Image),
            "li" => Some(LookupKind::ListItem),
            "code" => Some(LookupKind::CodeItem),
            "a" => Some(LookupKind::Link),
            "button" if node.button_payload.is_some() => Some(LookupKind::Link),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePosition {
    pub node_id: String,
    /// Index of the enclosing top-level block.
    pub parent_nth: usize,
    /// Index among nodes of the same kind inside that block.
    pub child_nth: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkdownLookup {
    pub images: BTreeMap<usize, NodePosition>,
    pub list_items: BTreeMap<usize, NodePosition>,
    pub code_items: BTreeMap<usize, NodePosition>,
    pub links: BTreeMap<usize, NodePosition>,
    /// Link occurrences keyed by callback payload, or href for plain links.
    pub links_by_target: BTreeMap<String, Vec<usize>>,
}

impl MarkdownLookup {
    pub fn build(graph: &NodeGraph) -> Self {
        let mut lookup = Self::default();
        let mut block_of: HashMap<&str, usize> = HashMap::new();
        let mut blocks = 0usize;
        let mut per_block: HashMap<(LookupKind, usize), usize> = HashMap::new();

        for node in graph.nodes() {
            let parent = node.parent_id.as_deref().unwrap_or_default();
            let block = if parent == graph.container_id() {
                blocks += 1;
                blocks - 1
            } else {
                match block_of.get(parent) {
                    Some(b) => *b,
                    None => continue,
                }
            };
            block_of.insert(node.id.as_str(), block);

            let Some(kind) = LookupKind::of(node) else {
                continue;
            };
            let slot = per_block.entry((kind, block)).or_insert(0);
            let position = NodePosition {
                node_id: node.id.clone(),
                parent_nth: block,
                child_nth: *slot,
            };
            *slot += 1;

            let table = lookup.table_mut(kind);
            let index = table.len();
            table.insert(index, position);

            if kind == LookupKind::Link {
                let target = node
                    .button_payload
                    .as_ref()
                    .map(|b| b.callback_payload.clone())
                    .or_else(|| node.href.clone());
                if let Some(target) = target {
                    lookup.links_by_target.entry(target).or_default().push(index);
                }
            }
        }
        lookup
    }

    fn table_mut(&mut self, kind: LookupKind) -> &mut BTreeMap<usize, NodePosition> {
        match kind {
            LookupKind::Image => &mut self.images,
            LookupKind::ListItem => &mut self.list_items,
            LookupKind::CodeItem => &mut self.code_items,
            LookupKind::Link => &mut self.links,
        }
    }

    pub fn table(&self, kind: LookupKind) -> &BTreeMap<usize, NodePosition> {
        match kind {
            LookupKind::Image => &self.images,
            LookupKind::ListItem => &self.list_items,
            LookupKind::CodeItem => &self.code_items,
            LookupKind::Link => &self.links,
        }
    }

    pub fn get(&self, kind: LookupKind, index: usize) -> Option<&NodePosition> {
        self.table(kind).get(&index)
    }

    /// Occurrence index at a (block, nth-in-block) position.
    pub fn find(&self, kind: LookupKind, parent_nth: usize, child_nth: usize) -> Option<usize> {
        self.table(kind)
            .iter()
            .find(|(_, p)| p.parent_nth == parent_nth && p.child_nth == child_nth)
            .map(|(index, _)| *index)
    }

    /// Occurrence index of a node.
    pub fn occurrence_of(&self, kind: LookupKind, node_id: &str) -> Option<usize> {
        self.table(kind)
            .iter()
            .find(|(_, p)| p.node_id == node_id)
            .map(|(index, _)| *index)
    }

    pub fn links_to(&self, target: &str) -> &[usize] {
        self.links_by_target.get(target).map(Vec::as_slice).unwrap_or_default()
    }
}
