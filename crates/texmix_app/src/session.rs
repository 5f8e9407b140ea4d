// SPDX-License-Identifier: MIT OR Apache-2.0
//! Mix session: the two selected materials, the ratio slider and the
//! composed result.

use texmix_graph::{
    ratio, set_ratio, ComposeSettings, Composer, Graph, LibraryError, MaterialLibrary, MaterialRef,
    RatioError,
};
use thiserror::Error;

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// Mixing failed
    #[error(transparent)]
    Mix(#[from] LibraryError),

    /// Slider update failed
    #[error(transparent)]
    Ratio(#[from] RatioError),
}

/// State behind the mix panel
pub struct MixSession {
    composer: Composer,
    library: MaterialLibrary,
    result: Option<Graph>,
}

impl MixSession {
    /// Create a session over a library of materials
    pub fn new(settings: ComposeSettings, library: MaterialLibrary) -> Self {
        Self {
            composer: Composer::new(settings),
            library,
            result: None,
        }
    }

    /// Compose the two selections at the settings' default ratio
    pub fn mix(&mut self, first: &MaterialRef, second: &MaterialRef) -> Result<&Graph, SessionError> {
        let ratio = self.composer.settings().default_ratio;
        self.mix_at(first, second, ratio)
    }

    /// Compose the two selections at `ratio`
    pub fn mix_at(
        &mut self,
        first: &MaterialRef,
        second: &MaterialRef,
        ratio: f64,
    ) -> Result<&Graph, SessionError> {
        let graph = self.library.compose(&self.composer, first, second, ratio)?;
        tracing::info!(
            "Mixed '{}' and '{}': {} nodes, {} links",
            first,
            second,
            graph.node_count(),
            graph.link_count()
        );
        let graph: &Graph = self.result.insert(graph);
        Ok(graph)
    }

    /// Move the ratio slider without recomposing
    pub fn slide(&mut self, new_ratio: f64) -> Result<(), SessionError> {
        let graph = self.result.as_mut().ok_or(RatioError::NoBlendNode)?;
        set_ratio(graph, new_ratio)?;
        Ok(())
    }

    /// Current slider position
    pub fn ratio(&self) -> Option<f64> {
        self.result.as_ref().and_then(|g| ratio(g).ok())
    }

    /// Last composed graph
    pub fn result(&self) -> Option<&Graph> {
        self.result.as_ref()
    }

    /// Materials to choose from
    pub fn library(&self) -> &MaterialLibrary {
        &self.library
    }
}
