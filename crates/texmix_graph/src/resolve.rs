// SPDX-License-Identifier: MIT OR Apache-2.0
//! Name-based socket lookup.
//!
//! Names match exactly and case-sensitively. A miss is an error rather
//! than a nearest-name guess, since similarly named sockets on different
//! node kinds rarely carry the same meaning.

use crate::graph::{Graph, LinkError};
use crate::link::LinkId;
use crate::node::{NodeId, NodeKind};
use crate::socket::{Direction, SocketRef};

/// Error while resolving a socket by name
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    /// No node of the requested kind
    #[error("No {0} node found")]
    NodeNotFound(NodeKind),

    /// Node exists but carries no socket with that name
    #[error("No socket named '{0}'")]
    SocketNotFound(String),

    /// Node ID is not part of the graph
    #[error("Node not found: {0:?}")]
    UnknownNode(NodeId),
}

/// First node of `kind` in graph order, then its socket called `name`
pub fn find_socket(
    graph: &Graph,
    kind: &NodeKind,
    name: &str,
    direction: Direction,
) -> Result<SocketRef, ResolveError> {
    find_socket_among(graph, graph.node_ids(), kind, name, direction)
}

/// Like [`find_socket`], but only nodes in `candidates` are considered, in the order given
pub fn find_socket_among(
    graph: &Graph,
    candidates: impl IntoIterator<Item = NodeId>,
    kind: &NodeKind,
    name: &str,
    direction: Direction,
) -> Result<SocketRef, ResolveError> {
    let mut matches = candidates
        .into_iter()
        .filter_map(|id| graph.node(id))
        .filter(|node| node.kind == *kind);

    let node = matches
        .next()
        .ok_or_else(|| ResolveError::NodeNotFound(kind.clone()))?;

    let extra = matches.count();
    if extra > 0 {
        tracing::debug!(
            "{} further {} node(s) besides '{}'; using the first",
            extra,
            kind,
            node.name
        );
    }

    find_socket_on(graph, node.id, name, direction)
}

/// Socket called `name` on a known node
pub fn find_socket_on(
    graph: &Graph,
    node_id: NodeId,
    name: &str,
    direction: Direction,
) -> Result<SocketRef, ResolveError> {
    let node = graph.node(node_id).ok_or(ResolveError::UnknownNode(node_id))?;
    node.socket_named(name, direction)
        .map(|socket| SocketRef::new(node.id, socket.id))
        .ok_or_else(|| ResolveError::SocketNotFound(name.to_string()))
}

/// Error while linking two sockets addressed by name
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WireError {
    /// An endpoint could not be resolved
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The graph refused the link
    #[error(transparent)]
    Link(#[from] LinkError),
}

/// Link output `output` of `from` to input `input` of `to`
pub fn connect_named(
    graph: &mut Graph,
    from: NodeId,
    output: &str,
    to: NodeId,
    input: &str,
) -> Result<LinkId, WireError> {
    let source = find_socket_on(graph, from, output, Direction::Output)?;
    let target = find_socket_on(graph, to, input, Direction::Input)?;
    Ok(graph.add_link(source, target)?)
}
