// SPDX-License-Identifier: MIT OR Apache-2.0
//! Composition of two material graphs into one blended graph.
//!
//! Both sources are cloned into the destination, the terminal output of
//! each clone is wired into a fresh blend node, and the blend output is
//! delivered to the destination's sink:
//!
//! ```text
//! [first clone]  terminal ──► Color1 ┐
//!                                    ├─ Mix ── Color ──► Surface [sink]
//! [second clone] terminal ──► Color2 ┘
//!                         ratio ─► Fac
//! ```

use crate::clone::{clone_graph, CloneError, CloneMap};
use crate::graph::Graph;
use crate::node::{NodeId, NodeRegistry};
use crate::ratio::{set_ratio, Ratio, RatioError, RatioTarget};
use crate::resolve::{connect_named, find_socket_among, find_socket_on, ResolveError, WireError};
use crate::settings::ComposeSettings;
use crate::shading::create_shading_registry;
use crate::socket::{Direction, SocketRef};
use std::fmt;

/// Which of the two source materials an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    /// First material, wired into the first blend input
    First,
    /// Second material, wired into the second blend input
    Second,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first material"),
            Self::Second => f.write_str("second material"),
        }
    }
}

/// Error while composing two graphs
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComposeError {
    /// Ratio outside `[0, 1]`
    #[error("Ratio must be between 0 and 1, got {0}")]
    RatioOutOfRange(f64),

    /// Source graph loops back on itself
    #[error("The {0} contains a cycle")]
    Cyclic(Operand),

    /// Cloning a source failed
    #[error("Failed to copy the {0}: {1}")]
    Clone(Operand, #[source] CloneError),

    /// Source has no terminal output to blend
    #[error("The {0} has no shading output: {1}")]
    MissingTerminal(Operand, #[source] ResolveError),

    /// Settings wire two blend roles into the same input
    #[error("Blend input '{0}' is assigned more than once")]
    SharedBlendInput(String),

    /// Blend or sink template is not registered
    #[error("No node type '{0}' is registered")]
    UnknownTemplate(String),

    /// Blend node could not be wired in
    #[error("Failed to wire the blend node: {0}")]
    Wiring(#[from] WireError),

    /// Ratio could not be applied to the blend node
    #[error("Failed to apply the blend ratio: {0}")]
    Ratio(#[from] RatioError),
}

/// Blends two material graphs according to its settings
pub struct Composer {
    settings: ComposeSettings,
    registry: NodeRegistry,
}

impl Composer {
    /// Composer backed by the built-in shading registry
    pub fn new(settings: ComposeSettings) -> Self {
        Self::with_registry(settings, create_shading_registry())
    }

    /// Composer building blend and sink nodes from a custom registry
    pub fn with_registry(settings: ComposeSettings, registry: NodeRegistry) -> Self {
        Self { settings, registry }
    }

    /// Active settings
    pub fn settings(&self) -> &ComposeSettings {
        &self.settings
    }

    /// Blend `a` and `b` into a new graph.
    ///
    /// The sources are only read; `a` and `b` may be the same graph.
    pub fn compose(&self, a: &Graph, b: &Graph, ratio: f64) -> Result<Graph, ComposeError> {
        let mut destination = Graph::new(format!("{} + {}", a.name, b.name));
        self.compose_into(&mut destination, a, b, ratio)?;
        Ok(destination)
    }

    /// Blend `a` and `b` into an existing graph, reusing its sink if it has one.
    ///
    /// `destination` is left as it was when an error is returned.
    pub fn compose_into(
        &self,
        destination: &mut Graph,
        a: &Graph,
        b: &Graph,
        ratio: f64,
    ) -> Result<RatioTarget, ComposeError> {
        let ratio = Ratio::new(ratio).map_err(|_| ComposeError::RatioOutOfRange(ratio))?;

        let mut staged = destination.clone();
        let target = self.build(&mut staged, a, b, ratio)?;
        *destination = staged;

        tracing::debug!(
            "Composed '{}' and '{}' into '{}' at ratio {}",
            a.name,
            b.name,
            destination.name,
            ratio.get()
        );
        Ok(target)
    }

    fn build(
        &self,
        graph: &mut Graph,
        a: &Graph,
        b: &Graph,
        ratio: Ratio,
    ) -> Result<RatioTarget, ComposeError> {
        if let Some(name) = self.settings.shared_blend_input() {
            return Err(ComposeError::SharedBlendInput(name.to_string()));
        }
        let spacing = self.settings.spacing;

        let first = self.clone_operand(graph, a, Operand::First)?;
        let second = self.clone_operand(graph, b, Operand::Second)?;
        offset(graph, &first, [-2.0 * spacing, spacing]);
        offset(graph, &second, [-2.0 * spacing, -spacing]);

        let first_out = self.terminal_output(graph, &first, Operand::First)?;
        let second_out = self.terminal_output(graph, &second, Operand::Second)?;

        let blend = self.instantiate(graph, &self.settings.blend_template, [0.0, 0.0])?;
        let [first_in, second_in] = &self.settings.blend_inputs;
        link_into(graph, first_out, blend, first_in)?;
        link_into(graph, second_out, blend, second_in)?;
        tracing::debug!("Wired both terminals into blend node {:?}", blend);

        let factor = find_socket_on(graph, blend, &self.settings.factor_socket, Direction::Input)
            .map_err(WireError::from)?;
        let target = RatioTarget {
            node: blend,
            socket: factor.socket,
        };
        graph.set_ratio_target(target);
        set_ratio(graph, ratio.get())?;

        let sink = match graph.sink() {
            Some(sink) => sink,
            None => {
                let sink = self.instantiate(graph, &self.settings.sink_template, [spacing, 0.0])?;
                graph.set_sink(sink);
                sink
            }
        };
        connect_named(
            graph,
            blend,
            &self.settings.blend_output,
            sink,
            &self.settings.sink_input,
        )?;
        graph.set_terminal(blend);

        Ok(target)
    }

    fn clone_operand(
        &self,
        graph: &mut Graph,
        source: &Graph,
        which: Operand,
    ) -> Result<CloneMap, ComposeError> {
        source
            .topological_order()
            .map_err(|_| ComposeError::Cyclic(which))?;
        clone_graph(source, graph).map_err(|e| ComposeError::Clone(which, e))
    }

    fn terminal_output(
        &self,
        graph: &Graph,
        clone: &CloneMap,
        which: Operand,
    ) -> Result<SocketRef, ComposeError> {
        find_socket_among(
            graph,
            clone.nodes(),
            &self.settings.terminal_kind,
            &self.settings.terminal_socket,
            Direction::Output,
        )
        .map_err(|e| ComposeError::MissingTerminal(which, e))
    }

    fn instantiate(
        &self,
        graph: &mut Graph,
        template: &str,
        position: [f32; 2],
    ) -> Result<NodeId, ComposeError> {
        let node = self
            .registry
            .create_node(template)
            .ok_or_else(|| ComposeError::UnknownTemplate(template.to_string()))?;
        Ok(graph.add_node(node.with_position(position[0], position[1])))
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(ComposeSettings::default())
    }
}

fn offset(graph: &mut Graph, clone: &CloneMap, by: [f32; 2]) {
    for id in clone.nodes() {
        if let Some(node) = graph.node_mut(id) {
            node.position[0] += by[0];
            node.position[1] += by[1];
        }
    }
}

fn link_into(graph: &mut Graph, from: SocketRef, to: NodeId, input: &str) -> Result<(), WireError> {
    let input = find_socket_on(graph, to, input, Direction::Input)?;
    graph.add_link(from, input)?;
    Ok(())
}

/// Blend `a` and `b` with the default settings
pub fn compose(a: &Graph, b: &Graph, ratio: f64) -> Result<Graph, ComposeError> {
    Composer::default().compose(a, b, ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeKind};
    use crate::ratio::ratio;
    use crate::shading::{image_material, principled_material};
    use crate::socket::{Socket, SocketValue};

    fn single(name: &str) -> Graph {
        let mut graph = Graph::new(name);
        graph.add_node(Node::new(NodeKind::PrincipledShader, name, [Socket::output("Color")]));
        graph
    }

    fn output_of(graph: &Graph, name: &str, socket: &str) -> SocketRef {
        let node = graph.nodes().find(|n| n.name == name).unwrap();
        SocketRef::new(node.id, node.socket_named(socket, Direction::Output).unwrap().id)
    }

    fn input_of(graph: &Graph, id: NodeId, socket: &str) -> SocketRef {
        let node = graph.node(id).unwrap();
        SocketRef::new(id, node.socket_named(socket, Direction::Input).unwrap().id)
    }

    #[test]
    fn test_two_single_shaders() {
        let result = compose(&single("P1"), &single("P2"), 0.5).unwrap();

        assert_eq!(result.node_count(), 4);
        assert_eq!(result.link_count(), 3);

        let blend = result.ratio_target().unwrap().node;
        let sink = result.sink().unwrap();
        assert_eq!(result.node(blend).unwrap().kind, NodeKind::Blend);
        assert_eq!(result.node(sink).unwrap().kind, NodeKind::OutputSink);
        assert_eq!(result.terminal(), Some(blend));

        let expected = [
            (output_of(&result, "P1", "Color"), input_of(&result, blend, "Color1")),
            (output_of(&result, "P2", "Color"), input_of(&result, blend, "Color2")),
            (output_of(&result, "Mix", "Color"), input_of(&result, sink, "Surface")),
        ];
        for (from, to) in expected {
            assert_eq!(result.link_to(to).map(|l| l.from), Some(from));
        }
    }

    #[test]
    fn test_factor_equals_ratio() {
        for r in [0.0, 0.25, 0.5, 1.0 / 3.0, 1.0] {
            let result = compose(&single("P1"), &single("P2"), r).unwrap();
            let target = result.ratio_target().unwrap();
            assert_eq!(
                result.socket(target.socket_ref()).unwrap().default_value,
                Some(SocketValue::Float(r))
            );
            assert_eq!(ratio(&result), Ok(r));
        }
    }

    #[test]
    fn test_ratio_out_of_range() {
        for r in [-0.01, 1.01, f64::INFINITY] {
            assert!(matches!(
                compose(&single("P1"), &single("P2"), r),
                Err(ComposeError::RatioOutOfRange(_))
            ));
        }
    }

    #[test]
    fn test_missing_terminal_reports_operand() {
        let mut no_shader = Graph::new("Empty");
        no_shader.add_node(Node::new(NodeKind::ImageSource, "Image", [Socket::output("Color")]));

        assert!(matches!(
            compose(&no_shader, &single("P2"), 0.5),
            Err(ComposeError::MissingTerminal(Operand::First, ResolveError::NodeNotFound(_)))
        ));
        assert!(matches!(
            compose(&single("P1"), &Graph::new("Empty"), 0.5),
            Err(ComposeError::MissingTerminal(Operand::Second, _))
        ));
    }

    #[test]
    fn test_missing_terminal_socket() {
        let mut wrong_socket = Graph::new("Shader");
        wrong_socket.add_node(Node::new(NodeKind::PrincipledShader, "P", [Socket::output("BSDF")]));

        assert_eq!(
            compose(&single("P1"), &wrong_socket, 0.5).unwrap_err(),
            ComposeError::MissingTerminal(
                Operand::Second,
                ResolveError::SocketNotFound("Color".to_string())
            )
        );
    }

    #[test]
    fn test_sources_not_mutated() {
        let a = principled_material("Red", [1.0, 0.0, 0.0, 1.0]).unwrap();
        let b = image_material("Brick", "brick.png").unwrap();
        let snapshot = |g: &Graph| {
            (
                g.node_ids().collect::<Vec<_>>(),
                g.links().map(|l| (l.id, l.from, l.to)).collect::<Vec<_>>(),
                g.terminal(),
                g.sink(),
            )
        };
        let (before_a, before_b) = (snapshot(&a), snapshot(&b));

        let result = compose(&a, &b, 0.7).unwrap();

        assert_eq!(snapshot(&a), before_a);
        assert_eq!(snapshot(&b), before_b);
        assert!(a.node_ids().chain(b.node_ids()).all(|id| !result.contains_node(id)));
        assert_eq!(result.node_count(), a.node_count() + b.node_count() + 2);
        assert_eq!(result.link_count(), a.link_count() + b.link_count() + 3);
    }

    #[test]
    fn test_same_graph_twice() {
        let a = principled_material("Red", [1.0, 0.0, 0.0, 1.0]).unwrap();
        let result = compose(&a, &a, 0.5).unwrap();

        assert_eq!(result.node_count(), 2 * a.node_count() + 2);
        let blend = result.ratio_target().unwrap().node;
        let first = result.link_to(input_of(&result, blend, "Color1")).unwrap().from;
        let second = result.link_to(input_of(&result, blend, "Color2")).unwrap().from;
        assert_ne!(first.node, second.node);
    }

    #[test]
    fn test_texture_mode() {
        let composer = Composer::new(ComposeSettings::textures());
        let a = image_material("Brick", "brick.png").unwrap();
        let b = image_material("Moss", "moss.png").unwrap();
        let result = composer.compose(&a, &b, 0.4).unwrap();

        let blend = result.ratio_target().unwrap().node;
        let first = result.link_to(input_of(&result, blend, "Color1")).unwrap().from;
        assert_eq!(result.node(first.node).unwrap().name, "brick.png");

        assert!(matches!(
            composer.compose(&principled_material("Plain", [1.0; 4]).unwrap(), &b, 0.4),
            Err(ComposeError::MissingTerminal(Operand::First, _))
        ));
    }

    #[test]
    fn test_compose_into_reuses_sink() {
        let mut active = principled_material("Active", [0.2, 0.2, 0.2, 1.0]).unwrap();
        let sink = active.sink().unwrap();
        let nodes_before = active.node_count();

        let target = Composer::default()
            .compose_into(&mut active, &single("P1"), &single("P2"), 0.5)
            .unwrap();

        assert_eq!(active.sink(), Some(sink));
        assert_eq!(active.node_count(), nodes_before + 3);
        let surface = input_of(&active, sink, "Surface");
        assert_eq!(active.link_to(surface).unwrap().from.node, target.node);
    }

    #[test]
    fn test_compose_into_untouched_on_error() {
        let mut active = principled_material("Active", [0.2, 0.2, 0.2, 1.0]).unwrap();
        let nodes_before: Vec<_> = active.node_ids().collect();

        let err = Composer::default().compose_into(&mut active, &single("P1"), &Graph::new("Empty"), 0.5);

        assert!(err.is_err());
        assert_eq!(active.node_ids().collect::<Vec<_>>(), nodes_before);
        assert_eq!(active.ratio_target(), None);
    }

    #[test]
    fn test_cyclic_source() {
        let mut looped = single("P1");
        let a = looped.add_node_of(
            NodeKind::Generic("math".into()),
            "A",
            [Socket::input("In"), Socket::output("Out")],
        );
        let b = looped.add_node_of(
            NodeKind::Generic("math".into()),
            "B",
            [Socket::input("In"), Socket::output("Out")],
        );
        connect_named(&mut looped, a, "Out", b, "In").unwrap();
        connect_named(&mut looped, b, "Out", a, "In").unwrap();

        assert_eq!(
            compose(&single("P2"), &looped, 0.5).unwrap_err(),
            ComposeError::Cyclic(Operand::Second)
        );
    }

    #[test]
    fn test_misconfigured_templates() {
        let settings = ComposeSettings {
            blend_template: "missing".to_string(),
            ..ComposeSettings::default()
        };
        assert_eq!(
            Composer::new(settings).compose(&single("P1"), &single("P2"), 0.5).unwrap_err(),
            ComposeError::UnknownTemplate("missing".to_string())
        );

        let settings = ComposeSettings {
            sink_input: "Shader".to_string(),
            ..ComposeSettings::default()
        };
        assert_eq!(
            Composer::new(settings).compose(&single("P1"), &single("P2"), 0.5).unwrap_err(),
            ComposeError::Wiring(WireError::Resolve(ResolveError::SocketNotFound("Shader".to_string())))
        );
    }

    #[test]
    fn test_shared_blend_input_rejected() {
        let settings = ComposeSettings {
            blend_inputs: ["Color1".to_string(), "Color1".to_string()],
            ..ComposeSettings::default()
        };
        let mut destination = Graph::new("Target");
        let err = Composer::new(settings)
            .compose_into(&mut destination, &single("P1"), &single("P2"), 0.5)
            .unwrap_err();

        assert_eq!(err, ComposeError::SharedBlendInput("Color1".to_string()));
        assert_eq!(destination.node_count(), 0);

        let settings = ComposeSettings {
            factor_socket: "Color2".to_string(),
            ..ComposeSettings::default()
        };
        assert_eq!(
            Composer::new(settings).compose(&single("P1"), &single("P2"), 0.5).unwrap_err(),
            ComposeError::SharedBlendInput("Color2".to_string())
        );
    }

    #[test]
    fn test_error_messages() {
        let err = compose(&single("P1"), &Graph::new("Empty"), 0.5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The second material has no shading output: No principled-shader node found"
        );
        assert_eq!(
            ComposeError::RatioOutOfRange(1.5).to_string(),
            "Ratio must be between 0 and 1, got 1.5"
        );
    }
}
