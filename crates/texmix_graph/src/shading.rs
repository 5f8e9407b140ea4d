// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in shading node vocabulary.
//!
//! Provides the node types a material graph is authored from, and
//! helpers that lay out the two default materials a host usually
//! starts with: a lone surface shader, and an image texture feeding
//! that shader.

use crate::graph::Graph;
use crate::node::{Node, NodeKind, NodeRegistry, NodeType};
use crate::resolve::{connect_named, WireError};
use crate::socket::{Socket, SocketValue};

/// Principled surface shader type ID
pub const PRINCIPLED_BSDF: &str = "principled_bsdf";
/// Image texture type ID
pub const IMAGE_TEXTURE: &str = "image_texture";
/// Color mix type ID
pub const MIX_RGB: &str = "mix_rgb";
/// Material output type ID
pub const MATERIAL_OUTPUT: &str = "material_output";
/// Texture coordinate type ID
pub const TEXTURE_COORDINATE: &str = "texture_coordinate";

const GREY: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

fn principled_bsdf() -> NodeType {
    NodeType {
        id: PRINCIPLED_BSDF.to_string(),
        name: "Principled BSDF".to_string(),
        kind: NodeKind::PrincipledShader,
        description: "Physically based surface shader".to_string(),
        inputs: vec![
            Socket::input("Base Color").with_default(SocketValue::Color(GREY)),
            Socket::input("Metallic").with_default(SocketValue::Float(0.0)),
            Socket::input("Roughness").with_default(SocketValue::Float(0.5)),
            Socket::input("IOR").with_default(SocketValue::Float(1.45)),
            Socket::input("Alpha").with_default(SocketValue::Float(1.0)),
            Socket::input("Normal"),
        ],
        outputs: vec![Socket::output("Color")],
    }
}

fn image_texture() -> NodeType {
    NodeType {
        id: IMAGE_TEXTURE.to_string(),
        name: "Image Texture".to_string(),
        kind: NodeKind::ImageSource,
        description: "Sample an image".to_string(),
        inputs: vec![Socket::input("Vector")],
        outputs: vec![Socket::output("Color"), Socket::output("Alpha")],
    }
}

fn mix_rgb() -> NodeType {
    NodeType {
        id: MIX_RGB.to_string(),
        name: "Mix".to_string(),
        kind: NodeKind::Blend,
        description: "Blend two colors by a factor".to_string(),
        inputs: vec![
            Socket::input("Fac").with_default(SocketValue::Float(0.5)),
            Socket::input("Color1").with_default(SocketValue::Color([0.5, 0.5, 0.5, 1.0])),
            Socket::input("Color2").with_default(SocketValue::Color([0.5, 0.5, 0.5, 1.0])),
        ],
        outputs: vec![Socket::output("Color")],
    }
}

fn material_output() -> NodeType {
    NodeType {
        id: MATERIAL_OUTPUT.to_string(),
        name: "Material Output".to_string(),
        kind: NodeKind::OutputSink,
        description: "Final material result".to_string(),
        inputs: vec![
            Socket::input("Surface"),
            Socket::input("Volume"),
            Socket::input("Displacement"),
        ],
        outputs: vec![],
    }
}

fn texture_coordinate() -> NodeType {
    NodeType {
        id: TEXTURE_COORDINATE.to_string(),
        name: "Texture Coordinate".to_string(),
        kind: NodeKind::Generic(TEXTURE_COORDINATE.to_string()),
        description: "Mesh coordinate spaces".to_string(),
        inputs: vec![],
        outputs: vec![
            Socket::output("UV"),
            Socket::output("Generated"),
            Socket::output("Normal"),
        ],
    }
}

/// Create the shading node registry with all built-in node types
pub fn create_shading_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    registry.register(material_output());
    registry.register(principled_bsdf());
    registry.register(image_texture());
    registry.register(texture_coordinate());
    registry.register(mix_rgb());

    registry
}

/// A material made of one principled shader feeding a material output
pub fn principled_material(name: &str, base_color: [f32; 4]) -> Result<Graph, WireError> {
    let mut graph = Graph::new(name);

    let mut shader = Node::from_type(&principled_bsdf()).with_position(-300.0, 0.0);
    shader.push_socket(Socket::input("Base Color").with_default(SocketValue::Color(base_color)));
    let shader = graph.add_node(shader);
    let output = graph.add_node(Node::from_type(&material_output()));

    connect_named(&mut graph, shader, "Color", output, "Surface")?;
    finish(&mut graph, shader, output);
    Ok(graph)
}

/// A material whose shader takes its base color from an image
pub fn image_material(name: &str, image: &str) -> Result<Graph, WireError> {
    let mut graph = Graph::new(name);

    let mut texture = Node::from_type(&image_texture()).with_position(-600.0, 0.0);
    texture.name = image.to_string();
    let texture = graph.add_node(texture);
    let coords = graph.add_node(Node::from_type(&texture_coordinate()).with_position(-900.0, 0.0));
    let shader = graph.add_node(Node::from_type(&principled_bsdf()).with_position(-300.0, 0.0));
    let output = graph.add_node(Node::from_type(&material_output()));

    connect_named(&mut graph, coords, "UV", texture, "Vector")?;
    connect_named(&mut graph, texture, "Color", shader, "Base Color")?;
    connect_named(&mut graph, texture, "Alpha", shader, "Alpha")?;
    connect_named(&mut graph, shader, "Color", output, "Surface")?;
    finish(&mut graph, shader, output);
    Ok(graph)
}

fn finish(graph: &mut Graph, shader: crate::NodeId, output: crate::NodeId) {
    graph.set_terminal(shader);
    graph.set_sink(output);
}
