// SPDX-License-Identifier: MIT OR Apache-2.0
//! Deep copy of one graph into another under fresh identities.

use crate::graph::{Graph, LinkError};
use crate::link::LinkId;
use crate::node::{Node, NodeId, NodeKind};
use crate::socket::SocketRef;
use indexmap::IndexMap;
use std::collections::HashMap;

/// Source-to-destination identity mapping produced by [`clone_graph`]
#[derive(Debug, Clone, Default)]
pub struct CloneMap {
    nodes: IndexMap<NodeId, NodeId>,
    sockets: HashMap<SocketRef, SocketRef>,
}

impl CloneMap {
    /// Destination node for a source node
    pub fn node(&self, source: NodeId) -> Option<NodeId> {
        self.nodes.get(&source).copied()
    }

    /// Destination socket for a source socket
    pub fn socket(&self, source: SocketRef) -> Option<SocketRef> {
        self.sockets.get(&source).copied()
    }

    /// Destination nodes, in the source graph's node order
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.values().copied()
    }

    /// Number of cloned nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing was cloned
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Error while cloning a graph
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CloneError {
    /// Link endpoint is not one of the source graph's own sockets
    #[error("Link {0:?} points outside its graph")]
    UnresolvedEndpoint(LinkId),

    /// Destination refused a replayed link
    #[error("Failed to replay link: {0}")]
    Link(#[from] LinkError),
}

/// Role-equivalent kinds collapse into one when merged
fn merged_kind(kind: &NodeKind) -> NodeKind {
    match kind {
        NodeKind::PrincipledShader | NodeKind::OutputSink => NodeKind::PrincipledShader,
        other => other.clone(),
    }
}

/// Copy every node and link of `source` into `destination`.
///
/// `source` is only read. Designations (terminal, sink, ratio target)
/// are not carried over.
pub fn clone_graph(source: &Graph, destination: &mut Graph) -> Result<CloneMap, CloneError> {
    let mut map = CloneMap::default();

    for node in source.nodes() {
        let mut sockets = Vec::with_capacity(node.inputs().len() + node.outputs().len());
        let mut pending = Vec::with_capacity(sockets.capacity());
        for socket in node.inputs().iter().chain(node.outputs()) {
            let copy = socket.duplicate();
            pending.push((socket.id, copy.id));
            sockets.push(copy);
        }

        let copy = Node::new(merged_kind(&node.kind), node.name.clone(), sockets)
            .with_position(node.position[0], node.position[1]);

        for (old, new) in pending {
            map.sockets
                .insert(SocketRef::new(node.id, old), SocketRef::new(copy.id, new));
        }
        map.nodes.insert(node.id, copy.id);
        destination.add_node(copy);
    }

    for link in source.links() {
        let (Some(from), Some(to)) = (map.socket(link.from), map.socket(link.to)) else {
            return Err(CloneError::UnresolvedEndpoint(link.id));
        };
        destination.add_link(from, to)?;
    }

    tracing::debug!(
        "Cloned '{}' into '{}': {} nodes, {} links",
        source.name,
        destination.name,
        map.len(),
        source.link_count()
    );
    Ok(map)
}
