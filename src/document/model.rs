/*!
 * In-memory caption document.
 *
 * The document owns its caption nodes and hands out `NodeId`s as opaque,
 * stable handles. Node order is the caption order of the serialized file.
 */

use crate::caption::{Millis, Region, UNSET_TIME};
use crate::errors::DocumentError;

/// Opaque handle of a caption node, stable until the node is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

/// Where a new or moved node goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Before every other node
    Front,
    /// Directly after the given node
    After(NodeId),
    /// After every other node
    Back,
}

/// Attributes of a node being added
#[derive(Debug, Clone, PartialEq)]
pub struct NodeAttrs {
    pub begin: Millis,
    pub end: Millis,
    pub region: Option<Region>,
    pub start_of_paragraph: bool,
}

impl Default for NodeAttrs {
    fn default() -> Self {
        Self {
            begin: UNSET_TIME,
            end: UNSET_TIME,
            region: None,
            start_of_paragraph: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CaptionNode {
    pub(crate) id: NodeId,
    pub(crate) begin: Millis,
    pub(crate) end: Millis,
    pub(crate) text: String,
    pub(crate) region: Option<Region>,
    pub(crate) start_of_paragraph: bool,
}

/// A parsed DFXP caption document
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionDocument {
    /// Attributes of the `<tt>` root, in document order
    pub(crate) root_attributes: Vec<(String, String)>,
    /// The `<head>` element, kept verbatim
    pub(crate) head: String,
    /// Region attribute of `<body>`
    pub(crate) body_region: Option<String>,
    pub(crate) nodes: Vec<CaptionNode>,
    next_node: u64,
}

impl CaptionDocument {
    pub(crate) fn from_parts(
        root_attributes: Vec<(String, String)>,
        head: String,
        body_region: Option<String>,
    ) -> Self {
        Self {
            root_attributes,
            head,
            body_region,
            nodes: Vec::new(),
            next_node: 0,
        }
    }

    /// Language declared on the root element, empty if none
    pub fn language(&self) -> &str {
        self.root_attributes
            .iter()
            .find(|(key, _)| key == "xml:lang")
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node handles in document order
    pub fn nodes(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|node| node.id).collect()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.iter().any(|n| n.id == node)
    }

    /// Index of a node in document order
    pub fn position(&self, node: NodeId) -> Result<usize, DocumentError> {
        self.nodes
            .iter()
            .position(|n| n.id == node)
            .ok_or(DocumentError::UnknownNode(node))
    }

    fn node(&self, node: NodeId) -> Result<&CaptionNode, DocumentError> {
        let index = self.position(node)?;
        Ok(&self.nodes[index])
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut CaptionNode, DocumentError> {
        let index = self.position(node)?;
        Ok(&mut self.nodes[index])
    }

    pub fn start_time(&self, node: NodeId) -> Result<Millis, DocumentError> {
        Ok(self.node(node)?.begin)
    }

    pub fn set_start_time(&mut self, node: NodeId, time: Millis) -> Result<(), DocumentError> {
        self.node_mut(node)?.begin = time;
        Ok(())
    }

    pub fn end_time(&self, node: NodeId) -> Result<Millis, DocumentError> {
        Ok(self.node(node)?.end)
    }

    pub fn set_end_time(&mut self, node: NodeId, time: Millis) -> Result<(), DocumentError> {
        self.node_mut(node)?.end = time;
        Ok(())
    }

    /// Caption text in markup form
    pub fn text(&self, node: NodeId) -> Result<&str, DocumentError> {
        Ok(self.node(node)?.text.as_str())
    }

    pub fn set_text(&mut self, node: NodeId, markup: &str) -> Result<(), DocumentError> {
        self.node_mut(node)?.text = markup.to_string();
        Ok(())
    }

    pub fn start_of_paragraph(&self, node: NodeId) -> Result<bool, DocumentError> {
        Ok(self.node(node)?.start_of_paragraph)
    }

    pub fn set_start_of_paragraph(&mut self, node: NodeId, value: bool) -> Result<(), DocumentError> {
        self.node_mut(node)?.start_of_paragraph = value;
        Ok(())
    }

    pub fn region(&self, node: NodeId) -> Result<Option<Region>, DocumentError> {
        Ok(self.node(node)?.region)
    }

    pub fn set_region(&mut self, node: NodeId, region: Option<Region>) -> Result<(), DocumentError> {
        self.node_mut(node)?.region = region;
        Ok(())
    }

    fn insertion_index(&self, placement: Placement) -> Result<usize, DocumentError> {
        match placement {
            Placement::Front => Ok(0),
            Placement::After(node) => Ok(self.position(node)? + 1),
            Placement::Back => Ok(self.nodes.len()),
        }
    }

    /// Add a caption node and return its handle
    pub fn add_caption(
        &mut self,
        placement: Placement,
        attrs: NodeAttrs,
        markup: &str,
    ) -> Result<NodeId, DocumentError> {
        let index = self.insertion_index(placement)?;
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(
            index,
            CaptionNode {
                id,
                begin: attrs.begin,
                end: attrs.end,
                text: markup.to_string(),
                region: attrs.region,
                start_of_paragraph: attrs.start_of_paragraph,
            },
        );
        Ok(id)
    }

    pub fn remove_caption(&mut self, node: NodeId) -> Result<(), DocumentError> {
        let index = self.position(node)?;
        self.nodes.remove(index);
        Ok(())
    }

    /// Move an existing node to a new place
    pub fn move_caption(&mut self, node: NodeId, placement: Placement) -> Result<(), DocumentError> {
        if placement == Placement::After(node) {
            return Ok(());
        }
        // Resolve the anchor before detaching so failures leave the order intact
        self.insertion_index(placement)?;
        let index = self.position(node)?;
        let detached = self.nodes.remove(index);
        match self.insertion_index(placement) {
            Ok(target) => {
                self.nodes.insert(target, detached);
                Ok(())
            }
            Err(e) => {
                self.nodes.insert(index, detached);
                Err(e)
            }
        }
    }

    /// Put the nodes in the given order; `order` must be a permutation of the nodes
    pub fn reorder(&mut self, order: &[NodeId]) -> Result<(), DocumentError> {
        if order.len() != self.nodes.len() {
            return Err(DocumentError::Parse(format!(
                "reorder expects {} nodes, got {}",
                self.nodes.len(),
                order.len()
            )));
        }
        let mut remaining = self.nodes.clone();
        let mut reordered = Vec::with_capacity(order.len());
        for id in order {
            let index = remaining
                .iter()
                .position(|n| n.id == *id)
                .ok_or(DocumentError::UnknownNode(*id))?;
            reordered.push(remaining.swap_remove(index));
        }
        self.nodes = reordered;
        Ok(())
    }
}
