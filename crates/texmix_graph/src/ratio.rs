// SPDX-License-Identifier: MIT OR Apache-2.0
//! Blend ratio validation and post-composition updates.
//!
//! [`set_ratio`] is the only mutation a composed graph accepts: it
//! rewrites the default value of the blend node's factor input and
//! leaves every node and link untouched.

use crate::graph::Graph;
use crate::node::NodeId;
use crate::socket::{SocketId, SocketRef, SocketValue};
use serde::{Deserialize, Serialize};

/// A blend factor known to lie in `[0.0, 1.0]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Ratio(f64);

impl Ratio {
    /// Validate a raw factor. NaN is rejected.
    pub fn new(value: f64) -> Result<Self, RatioError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatioError::OutOfRange(value))
        }
    }

    /// The raw factor
    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Ratio {
    type Error = RatioError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Ratio> for f64 {
    fn from(ratio: Ratio) -> Self {
        ratio.0
    }
}

/// Where a composed graph keeps its blend factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioTarget {
    /// Blend node
    pub node: NodeId,
    /// Factor input on the blend node
    pub socket: SocketId,
}

impl RatioTarget {
    /// Address of the factor input
    pub fn socket_ref(&self) -> SocketRef {
        SocketRef::new(self.node, self.socket)
    }
}

/// Error when reading or updating a blend ratio
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RatioError {
    /// Graph was not produced by composition, or its blend node is gone
    #[error("Graph has no blend node to adjust")]
    NoBlendNode,

    /// Factor outside `[0, 1]`
    #[error("Ratio must be between 0 and 1, got {0}")]
    OutOfRange(f64),
}

/// Overwrite the blend factor of a composed graph in place
pub fn set_ratio(graph: &mut Graph, new_ratio: f64) -> Result<(), RatioError> {
    let target = graph.ratio_target().ok_or(RatioError::NoBlendNode)?;
    let ratio = Ratio::new(new_ratio)?;
    let socket = graph
        .socket_mut(target.socket_ref())
        .ok_or(RatioError::NoBlendNode)?;

    socket.default_value = Some(SocketValue::Float(ratio.get()));
    tracing::debug!("Blend ratio of {:?} set to {}", target.node, ratio.get());
    Ok(())
}

/// Current blend factor of a composed graph
pub fn ratio(graph: &Graph) -> Result<f64, RatioError> {
    let target = graph.ratio_target().ok_or(RatioError::NoBlendNode)?;
    graph
        .socket(target.socket_ref())
        .and_then(|s| s.default_value.as_ref())
        .and_then(SocketValue::as_float)
        .ok_or(RatioError::NoBlendNode)
}
