// SPDX-License-Identifier: MIT OR Apache-2.0
//! Link (edge) definitions for the graph.

use crate::node::NodeId;
use crate::socket::SocketRef;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkId(pub Uuid);

impl LinkId {
    /// Create a new random link ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LinkId {
    fn default() -> Self {
        Self::new()
    }
}

/// A directed link from an output socket to an input socket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    /// Unique link ID
    pub id: LinkId,
    /// Source (output) socket
    pub from: SocketRef,
    /// Target (input) socket
    pub to: SocketRef,
}

impl Link {
    /// Create a new link
    pub fn new(from: SocketRef, to: SocketRef) -> Self {
        Self {
            id: LinkId::new(),
            from,
            to,
        }
    }

    /// Check if this link involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.from.node == node_id || self.to.node == node_id
    }

    /// Whether both links join the same pair of sockets
    pub fn same_endpoints(&self, other: &Link) -> bool {
        self.from == other.from && self.to == other.to
    }
}
