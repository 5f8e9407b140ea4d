// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and links.

use crate::link::{Link, LinkId};
use crate::node::{Node, NodeId, NodeKind};
use crate::ratio::RatioTarget;
use crate::socket::{Direction, Socket, SocketRef};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A shading graph
///
/// Node insertion order is significant: resolution picks the first
/// matching node, so removal keeps the remaining order intact.
///
/// Nodes are immutable once added. Every link endpoint must stay a socket
/// of this graph, so sockets cannot be replaced from outside the crate:
///
/// ```compile_fail
/// use texmix_graph::{Graph, NodeKind, Socket};
///
/// let mut graph = Graph::new("Material");
/// let id = graph.add_node_of(NodeKind::OutputSink, "Output", [Socket::input("Surface")]);
/// graph.node_mut(id).unwrap().push_socket(Socket::input("Surface"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name
    pub name: String,
    nodes: IndexMap<NodeId, Node>,
    links: IndexMap<LinkId, Link>,
    terminal: Option<NodeId>,
    sink: Option<NodeId>,
    ratio_target: Option<RatioTarget>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            links: IndexMap::new(),
            terminal: None,
            sink: None,
            ratio_target: None,
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Build a node from `kind` and `sockets` and add it
    pub fn add_node_of(
        &mut self,
        kind: NodeKind,
        name: impl Into<String>,
        sockets: impl IntoIterator<Item = Socket>,
    ) -> NodeId {
        self.add_node(Node::new(kind, name, sockets))
    }

    /// Remove a node, its links and any designation pointing at it
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.links.retain(|_, l| !l.involves_node(node_id));
        if self.terminal == Some(node_id) {
            self.terminal = None;
        }
        if self.sink == Some(node_id) {
            self.sink = None;
        }
        if self.ratio_target.is_some_and(|t| t.node == node_id) {
            self.ratio_target = None;
        }
        self.nodes.shift_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub(crate) fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Whether the node belongs to this graph
    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(&node_id)
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All node IDs in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Look up a socket through its owning node
    pub fn socket(&self, socket_ref: SocketRef) -> Option<&Socket> {
        self.nodes.get(&socket_ref.node)?.socket(socket_ref.socket)
    }

    /// Mutable socket lookup
    pub(crate) fn socket_mut(&mut self, socket_ref: SocketRef) -> Option<&mut Socket> {
        self.nodes
            .get_mut(&socket_ref.node)?
            .socket_mut(socket_ref.socket)
    }

    /// Link an output socket to an input socket.
    ///
    /// An input accepts a single link: whatever was linked into `to`
    /// before is evicted.
    pub fn add_link(&mut self, from: SocketRef, to: SocketRef) -> Result<LinkId, LinkError> {
        let source = self.socket(from).ok_or(LinkError::ForeignSocket(from))?;
        let target = self.socket(to).ok_or(LinkError::ForeignSocket(to))?;

        if source.direction != Direction::Output || target.direction != Direction::Input {
            return Err(LinkError::DirectionMismatch {
                from: source.direction,
                to: target.direction,
            });
        }

        if from.node == to.node {
            return Err(LinkError::SelfLoop(from.node));
        }

        let before = self.links.len();
        self.links.retain(|_, l| l.to != to);
        if self.links.len() != before {
            tracing::trace!("Replaced existing link into {:?}", to);
        }

        let link = Link::new(from, to);
        let id = link.id;
        self.links.insert(id, link);
        Ok(id)
    }

    /// Remove a link
    pub fn remove_link(&mut self, link_id: LinkId) -> Option<Link> {
        self.links.shift_remove(&link_id)
    }

    /// Get a link by ID
    pub fn link(&self, link_id: LinkId) -> Option<&Link> {
        self.links.get(&link_id)
    }

    /// All links in insertion order
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    /// Links leaving an output socket
    pub fn links_from(&self, socket: SocketRef) -> impl Iterator<Item = &Link> {
        self.links.values().filter(move |l| l.from == socket)
    }

    /// The link feeding an input socket, if any
    pub fn link_to(&self, socket: SocketRef) -> Option<&Link> {
        self.links.values().find(|l| l.to == socket)
    }

    /// Links involving a node
    pub fn links_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Link> {
        self.links.values().filter(move |l| l.involves_node(node_id))
    }

    /// Get the number of links
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Designate the node carrying this graph's final shading result
    pub fn designate_terminal(&mut self, node_id: NodeId) -> Result<(), UnknownNode> {
        if !self.contains_node(node_id) {
            return Err(UnknownNode(node_id));
        }
        self.set_terminal(node_id);
        Ok(())
    }

    /// Designate the node the result is delivered to
    pub fn designate_sink(&mut self, node_id: NodeId) -> Result<(), UnknownNode> {
        if !self.contains_node(node_id) {
            return Err(UnknownNode(node_id));
        }
        self.set_sink(node_id);
        Ok(())
    }

    /// Designated terminal node
    pub fn terminal(&self) -> Option<NodeId> {
        self.terminal
    }

    /// Designated sink node
    pub fn sink(&self) -> Option<NodeId> {
        self.sink
    }

    /// Blend factor recorded by composition
    pub fn ratio_target(&self) -> Option<RatioTarget> {
        self.ratio_target
    }

    pub(crate) fn set_terminal(&mut self, node_id: NodeId) {
        self.terminal = Some(node_id);
    }

    pub(crate) fn set_sink(&mut self, node_id: NodeId) {
        self.sink = Some(node_id);
    }

    pub(crate) fn set_ratio_target(&mut self, target: RatioTarget) {
        self.ratio_target = Some(target);
    }

    #[cfg(test)]
    pub(crate) fn insert_link_unchecked(&mut self, link: Link) {
        self.links.insert(link.id, link);
    }

    /// Get nodes in topological order (sources first)
    pub fn topological_order(&self) -> Result<Vec<NodeId>, CycleError> {
        let mut visited = HashSet::new();
        let mut temp_mark = HashSet::new();
        let mut order = Vec::new();

        for node_id in self.nodes.keys() {
            if !visited.contains(node_id) {
                self.visit(*node_id, &mut visited, &mut temp_mark, &mut order)?;
            }
        }

        Ok(order)
    }

    fn visit(
        &self,
        node_id: NodeId,
        visited: &mut HashSet<NodeId>,
        temp_mark: &mut HashSet<NodeId>,
        order: &mut Vec<NodeId>,
    ) -> Result<(), CycleError> {
        if temp_mark.contains(&node_id) {
            return Err(CycleError);
        }
        if visited.contains(&node_id) {
            return Ok(());
        }

        temp_mark.insert(node_id);

        // Upstream first
        for link in self.links_for_node(node_id) {
            if link.to.node == node_id {
                self.visit(link.from.node, visited, temp_mark, order)?;
            }
        }

        temp_mark.remove(&node_id);
        visited.insert(node_id);
        order.push(node_id);

        Ok(())
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Error when creating a link
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LinkError {
    /// Socket is not owned by a node of this graph
    #[error("Socket {0:?} does not belong to this graph")]
    ForeignSocket(SocketRef),

    /// Link must run from an output to an input
    #[error("Cannot link {from} socket to {to} socket")]
    DirectionMismatch {
        /// Direction of the source socket
        from: Direction,
        /// Direction of the target socket
        to: Direction,
    },

    /// Both endpoints on the same node
    #[error("Self-loop not allowed on node {0:?}")]
    SelfLoop(NodeId),
}

/// Node is not part of the graph
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("Node not found: {0:?}")]
pub struct UnknownNode(pub NodeId);

/// Error when graph contains a cycle
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("Graph contains a cycle")]
pub struct CycleError;
