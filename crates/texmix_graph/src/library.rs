// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host-owned material graphs addressed by handle.

use crate::compose::{ComposeError, Composer, Operand};
use crate::graph::Graph;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle naming a material graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialRef(String);

impl MaterialRef {
    /// Handle for the material called `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Material name
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MaterialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error when composing materials from a library
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LibraryError {
    /// Handle does not name a stored material
    #[error("Please select a valid {0}")]
    UnknownMaterial(Operand),

    /// Composition failed
    #[error(transparent)]
    Compose(#[from] ComposeError),
}

/// Material graphs keyed by name
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    materials: IndexMap<MaterialRef, Graph>,
}

impl MaterialLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a graph under its own name, replacing any material of that name
    pub fn insert(&mut self, graph: Graph) -> MaterialRef {
        let handle = MaterialRef::new(graph.name.clone());
        self.materials.insert(handle.clone(), graph);
        handle
    }

    /// Look up a material
    pub fn get(&self, handle: &MaterialRef) -> Option<&Graph> {
        self.materials.get(handle)
    }

    /// All handles in insertion order
    pub fn refs(&self) -> impl Iterator<Item = &MaterialRef> {
        self.materials.keys()
    }

    /// Number of stored materials
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Whether the library is empty
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Blend two stored materials into a new graph
    pub fn compose(
        &self,
        composer: &Composer,
        first: &MaterialRef,
        second: &MaterialRef,
        ratio: f64,
    ) -> Result<Graph, LibraryError> {
        let a = self
            .get(first)
            .ok_or(LibraryError::UnknownMaterial(Operand::First))?;
        let b = self
            .get(second)
            .ok_or(LibraryError::UnknownMaterial(Operand::Second))?;
        Ok(composer.compose(a, b, ratio)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shading::principled_material;

    #[test]
    fn test_insert_and_get() {
        let mut library = MaterialLibrary::new();
        let red = library.insert(principled_material("Red", [1.0, 0.0, 0.0, 1.0]).unwrap());

        assert_eq!(red.name(), "Red");
        assert_eq!(library.refs().collect::<Vec<_>>(), vec![&red]);
        assert_eq!(library.len(), 1);
        assert_eq!(library.get(&red).unwrap().node_count(), 2);

        library.insert(Graph::new("Red"));
        assert_eq!(library.len(), 1);
        assert_eq!(library.get(&red).unwrap().node_count(), 0);
    }

    #[test]
    fn test_compose_by_handle() {
        let mut library = MaterialLibrary::new();
        let red = library.insert(principled_material("Red", [1.0, 0.0, 0.0, 1.0]).unwrap());
        let blue = library.insert(principled_material("Blue", [0.0, 0.0, 1.0, 1.0]).unwrap());

        let result = library.compose(&Composer::default(), &red, &blue, 0.5).unwrap();
        assert_eq!(result.name, "Red + Blue");
        assert_eq!(result.node_count(), 6);
    }

    #[test]
    fn test_unknown_handle() {
        let mut library = MaterialLibrary::new();
        let red = library.insert(principled_material("Red", [1.0, 0.0, 0.0, 1.0]).unwrap());
        let missing = MaterialRef::new("Missing");

        let err = library.compose(&Composer::default(), &red, &missing, 0.5).unwrap_err();
        assert_eq!(err, LibraryError::UnknownMaterial(Operand::Second));
        assert_eq!(err.to_string(), "Please select a valid second material");
    }
}
