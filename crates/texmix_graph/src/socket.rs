// SPDX-License-Identifier: MIT OR Apache-2.0
//! Socket definitions for node inputs/outputs.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SocketId(pub Uuid);

impl SocketId {
    /// Create a new random socket ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SocketId {
    fn default() -> Self {
        Self::new()
    }
}

/// Socket direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Input socket
    Input,
    /// Output socket
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// Value an unconnected input falls back to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SocketValue {
    /// Scalar
    Float(f64),
    /// Color (RGBA)
    Color([f32; 4]),
}

impl SocketValue {
    /// The scalar payload, if this is a scalar
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Color(_) => None,
        }
    }
}

/// A socket on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Socket {
    /// Unique socket ID
    pub id: SocketId,
    /// Socket name, unique per direction on its node
    pub name: String,
    /// Socket direction
    pub direction: Direction,
    /// Default value (inputs only)
    pub default_value: Option<SocketValue>,
}

impl Socket {
    /// Create a new input socket
    pub fn input(name: impl Into<String>) -> Self {
        Self {
            id: SocketId::new(),
            name: name.into(),
            direction: Direction::Input,
            default_value: None,
        }
    }

    /// Create a new output socket
    pub fn output(name: impl Into<String>) -> Self {
        Self {
            id: SocketId::new(),
            name: name.into(),
            direction: Direction::Output,
            default_value: None,
        }
    }

    /// Set the default value. Ignored on outputs.
    pub fn with_default(mut self, value: SocketValue) -> Self {
        if self.direction == Direction::Input {
            self.default_value = Some(value);
        }
        self
    }

    /// Copy of this socket under a fresh identity
    pub fn duplicate(&self) -> Self {
        Self {
            id: SocketId::new(),
            ..self.clone()
        }
    }
}

/// Address of a socket inside a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SocketRef {
    /// Owning node
    pub node: NodeId,
    /// Socket on that node
    pub socket: SocketId,
}

impl SocketRef {
    /// Create a new socket reference
    pub fn new(node: NodeId, socket: SocketId) -> Self {
        Self { node, socket }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_ignores_default() {
        let socket = Socket::output("Color").with_default(SocketValue::Float(1.0));
        assert!(socket.default_value.is_none());
    }

    #[test]
    fn test_duplicate_gets_fresh_id() {
        let socket = Socket::input("Fac").with_default(SocketValue::Float(0.25));
        let copy = socket.duplicate();
        assert_ne!(copy.id, socket.id);
        assert_eq!(copy.name, "Fac");
        assert_eq!(copy.default_value, Some(SocketValue::Float(0.25)));
    }
}
