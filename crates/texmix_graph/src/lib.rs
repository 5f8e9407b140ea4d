// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shading graph composition engine for TexMix.
//!
//! Combines two independently authored material graphs into one by
//! blending their final shading outputs with a single ratio:
//! - Graph model with single-writer inputs
//! - Deep cloning under fresh identities
//! - Exact-name socket resolution
//! - Composition and in-place ratio updates
//!
//! ## Example
//!
//! ```
//! use texmix_graph::{compose, set_ratio, shading};
//!
//! let red = shading::principled_material("Red", [1.0, 0.0, 0.0, 1.0])?;
//! let blue = shading::principled_material("Blue", [0.0, 0.0, 1.0, 1.0])?;
//!
//! let mut mixed = compose(&red, &blue, 0.25)?;
//! set_ratio(&mut mixed, 0.75)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod node;
pub mod socket;
pub mod link;
pub mod graph;
pub mod clone;
pub mod resolve;
pub mod compose;
pub mod ratio;
pub mod settings;
pub mod shading;
pub mod library;

pub use node::{Node, NodeId, NodeKind, NodeRegistry, NodeType};
pub use socket::{Direction, Socket, SocketId, SocketRef, SocketValue};
pub use link::{Link, LinkId};
pub use graph::{CycleError, Graph, LinkError, UnknownNode};
pub use clone::{clone_graph, CloneError, CloneMap};
pub use resolve::{connect_named, find_socket, find_socket_among, find_socket_on, ResolveError, WireError};
pub use compose::{compose, ComposeError, Composer, Operand};
pub use ratio::{ratio, set_ratio, Ratio, RatioError, RatioTarget};
pub use settings::{ComposeSettings, SettingsError};
pub use library::{LibraryError, MaterialLibrary, MaterialRef};
