//! The compiled node list and parent/child queries over it.

use serde::Serialize;
use tractstack_core::FlatNode;

use crate::lookup::MarkdownLookup;

/// Output of one compilation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGraph {
    container_id: String,
    nodes: Vec<FlatNode>,
}

impl NodeGraph {
    pub(crate) fn new(container_id: String, nodes: Vec<FlatNode>) -> Self {
        Self { container_id, nodes }
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// All nodes in document order.
    pub fn nodes(&self) -> &[FlatNode] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<FlatNode> {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FlatNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Direct children of `parent_id`, in document order.
    pub fn children_of<'a>(&'a self, parent_id: &'a str) -> impl Iterator<Item = &'a FlatNode> + 'a {
        self.nodes
            .iter()
            .filter(move |n| n.parent_id.as_deref() == Some(parent_id))
    }

    /// Top-level blocks: the container's direct children.
    pub fn roots(&self) -> impl Iterator<Item = &FlatNode> + '_ {
        self.children_of(&self.container_id)
    }

    pub fn lookup(&self) -> MarkdownLookup {
        MarkdownLookup::build(self)
    }
}
