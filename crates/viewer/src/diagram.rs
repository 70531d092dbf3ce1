//! KDL diagram documents: connection settings, nodes with their handles, and edges

use connect::{ConnectionConfig, ConnectionMode, HandleType};
use graphview::{GraphEdge, GraphNode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("invalid KDL document")]
    Parse(#[from] kdl::KdlError),
    #[error("unknown connection mode {0:?}, expected \"strict\" or \"loose\"")]
    UnknownMode(String),
    #[error("unknown handle type {0:?}, expected \"source\" or \"target\"")]
    UnknownHandleType(String),
    #[error("setting `{0}` has an invalid value")]
    InvalidSetting(String),
    #[error("unknown setting `{0}`")]
    UnknownSetting(String),
    #[error("`{node}` is missing `{key}`")]
    Missing { node: String, key: &'static str },
}

pub struct Diagram {
    pub config: ConnectionConfig,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

fn entry<'a>(node: &'a kdl::KdlNode, key: &str) -> Option<&'a kdl::KdlValue> {
    node.entries()
        .iter()
        .find(|e| e.name().map(|n| n.value() == key).unwrap_or(false))
        .map(|e| e.value())
}

fn argument(node: &kdl::KdlNode) -> Option<&kdl::KdlValue> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .map(|e| e.value())
}

fn number(value: &kdl::KdlValue) -> Option<f32> {
    value
        .as_float()
        .or_else(|| value.as_integer().map(|i| i as f64))
        .map(|v| v as f32)
}

/// A finite number no smaller than `min`
fn at_least(value: &kdl::KdlValue, min: f32) -> Option<f32> {
    number(value).filter(|v| v.is_finite() && *v >= min)
}

fn string<'a>(node: &'a kdl::KdlNode, key: &'static str) -> Result<&'a str, DiagramError> {
    entry(node, key)
        .and_then(|v| v.as_string())
        .ok_or_else(|| DiagramError::Missing {
            node: node.name().value().to_string(),
            key,
        })
}

fn handle_type(value: &str) -> Result<HandleType, DiagramError> {
    match value {
        "source" => Ok(HandleType::Source),
        "target" => Ok(HandleType::Target),
        other => Err(DiagramError::UnknownHandleType(other.to_string())),
    }
}

/// Applies a `settings { .. }` block on top of the defaults
fn parse_settings(block: &kdl::KdlNode, config: &mut ConnectionConfig) -> Result<(), DiagramError> {
    let Some(children) = block.children() else {
        return Ok(());
    };
    for setting in children.nodes() {
        let key = setting.name().value();
        let invalid = || DiagramError::InvalidSetting(key.to_string());
        let value = argument(setting).ok_or_else(invalid)?;
        match key {
            "connection-mode" => {
                let mode = value.as_string().ok_or_else(invalid)?;
                config.connection_mode = match mode {
                    "strict" => ConnectionMode::Strict,
                    "loose" => ConnectionMode::Loose,
                    other => return Err(DiagramError::UnknownMode(other.to_string())),
                };
            }
            "connection-radius" => config.connection_radius = at_least(value, 0.0).ok_or_else(invalid)?,
            "auto-pan-on-connect" => config.auto_pan_on_connect = value.as_bool().ok_or_else(invalid)?,
            "auto-pan-edge" => config.auto_pan.edge_distance = at_least(value, 0.0).ok_or_else(invalid)?,
            "auto-pan-speed" => config.auto_pan.speed = at_least(value, 0.0).ok_or_else(invalid)?,
            "auto-pan-ramp" => config.auto_pan.ramp = at_least(value, 1.0).ok_or_else(invalid)?,
            other => return Err(DiagramError::UnknownSetting(other.to_string())),
        }
    }
    Ok(())
}

fn parse_node(kdl_node: &kdl::KdlNode) -> Result<GraphNode, DiagramError> {
    let missing = |key| DiagramError::Missing {
        node: kdl_node.name().value().to_string(),
        key,
    };
    let id = argument(kdl_node)
        .and_then(|v| v.as_string())
        .ok_or_else(|| missing("id"))?;
    let name = entry(kdl_node, "name").and_then(|v| v.as_string()).unwrap_or(id);
    let node_type = entry(kdl_node, "type").and_then(|v| v.as_string()).unwrap_or("node");
    let x = entry(kdl_node, "x").and_then(number).ok_or_else(|| missing("x"))?;
    let y = entry(kdl_node, "y").and_then(number).ok_or_else(|| missing("y"))?;

    let mut node = GraphNode::new(id, name, node_type, x, y);
    if let Some(children) = kdl_node.children() {
        for child in children.nodes().iter().filter(|c| c.name().value() == "handle") {
            let handle_id = argument(child)
                .and_then(|v| v.as_string())
                .ok_or_else(|| missing("handle id"))?;
            node = node.with_handle(handle_id, handle_type(string(child, "type")?)?);
        }
    }
    Ok(node)
}

fn parse_edge(kdl_node: &kdl::KdlNode) -> Result<GraphEdge, DiagramError> {
    let handle = |key| entry(kdl_node, key).and_then(|v| v.as_string());
    Ok(GraphEdge::new(
        string(kdl_node, "from")?,
        handle("from-handle"),
        string(kdl_node, "to")?,
        handle("to-handle"),
    ))
}

pub fn parse_diagram(content: &str) -> Result<Diagram, DiagramError> {
    let doc = kdl::KdlDocument::parse(content)?;
    let mut diagram = Diagram {
        config: ConnectionConfig::default(),
        nodes: Vec::new(),
        edges: Vec::new(),
    };

    for kdl_node in doc.nodes() {
        match kdl_node.name().value() {
            "settings" => parse_settings(kdl_node, &mut diagram.config)?,
            "node" => diagram.nodes.push(parse_node(kdl_node)?),
            "edge" => diagram.edges.push(parse_edge(kdl_node)?),
            other => tracing::warn!(name = other, "ignoring unknown diagram entry"),
        }
    }
    Ok(diagram)
}
