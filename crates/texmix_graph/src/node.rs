// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for shading graphs.

use crate::socket::{Direction, Socket, SocketId};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Role a node plays in a shading graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Physically based surface shader
    PrincipledShader,
    /// Image/texture lookup
    ImageSource,
    /// Weighted combination of two shading inputs
    Blend,
    /// Delivery point of the final result
    OutputSink,
    /// Anything else, tagged with its type id
    Generic(String),
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrincipledShader => f.write_str("principled-shader"),
            Self::ImageSource => f.write_str("image-source"),
            Self::Blend => f.write_str("blend"),
            Self::OutputSink => f.write_str("output-sink"),
            Self::Generic(id) => write!(f, "generic({id})"),
        }
    }
}

/// Node type definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeType {
    /// Unique type identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Role of nodes created from this type
    pub kind: NodeKind,
    /// Description
    pub description: String,
    /// Default input sockets
    pub inputs: Vec<Socket>,
    /// Default output sockets
    pub outputs: Vec<Socket>,
}

/// A node instance in a graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Role tag
    pub kind: NodeKind,
    /// Display name
    pub name: String,
    /// Placement hint
    pub position: [f32; 2],
    inputs: Vec<Socket>,
    outputs: Vec<Socket>,
}

impl Node {
    /// Create a node of `kind`; sockets are sorted into inputs and outputs by direction.
    pub fn new(
        kind: NodeKind,
        name: impl Into<String>,
        sockets: impl IntoIterator<Item = Socket>,
    ) -> Self {
        let mut node = Self {
            id: NodeId::new(),
            kind,
            name: name.into(),
            position: [0.0, 0.0],
            inputs: Vec::new(),
            outputs: Vec::new(),
        };
        for socket in sockets {
            node.push_socket(socket);
        }
        node
    }

    /// Instantiate a type definition. Every socket gets a fresh ID.
    pub fn from_type(node_type: &NodeType) -> Self {
        Self::new(
            node_type.kind.clone(),
            node_type.name.clone(),
            node_type
                .inputs
                .iter()
                .chain(node_type.outputs.iter())
                .map(Socket::duplicate),
        )
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Add a socket, replacing any socket with the same name and direction
    pub fn push_socket(&mut self, socket: Socket) {
        let list = match socket.direction {
            Direction::Input => &mut self.inputs,
            Direction::Output => &mut self.outputs,
        };
        match list.iter_mut().find(|s| s.name == socket.name) {
            Some(existing) => *existing = socket,
            None => list.push(socket),
        }
    }

    /// Input sockets in declaration order
    pub fn inputs(&self) -> &[Socket] {
        &self.inputs
    }

    /// Output sockets in declaration order
    pub fn outputs(&self) -> &[Socket] {
        &self.outputs
    }

    /// Sockets of one direction
    pub fn sockets(&self, direction: Direction) -> &[Socket] {
        match direction {
            Direction::Input => &self.inputs,
            Direction::Output => &self.outputs,
        }
    }

    /// Get a socket by ID
    pub fn socket(&self, socket_id: SocketId) -> Option<&Socket> {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .find(|s| s.id == socket_id)
    }

    /// Get a mutable socket by ID
    pub fn socket_mut(&mut self, socket_id: SocketId) -> Option<&mut Socket> {
        self.inputs
            .iter_mut()
            .chain(self.outputs.iter_mut())
            .find(|s| s.id == socket_id)
    }

    /// Get a socket by exact name
    pub fn socket_named(&self, name: &str, direction: Direction) -> Option<&Socket> {
        self.sockets(direction).iter().find(|s| s.name == name)
    }
}

/// Registry of available node types
pub struct NodeRegistry {
    types: indexmap::IndexMap<String, NodeType>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            types: indexmap::IndexMap::new(),
        }
    }

    /// Register a node type
    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.id.clone(), node_type);
    }

    /// Get a node type by ID
    pub fn get(&self, id: &str) -> Option<&NodeType> {
        self.types.get(id)
    }

    /// Get all registered types
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Get types of a given kind
    pub fn types_of_kind<'a>(&'a self, kind: &'a NodeKind) -> impl Iterator<Item = &'a NodeType> {
        self.types.values().filter(move |t| t.kind == *kind)
    }

    /// Create a node from a type ID
    pub fn create_node(&self, type_id: &str) -> Option<Node> {
        self.get(type_id).map(Node::from_type)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
