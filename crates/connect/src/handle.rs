use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::{Point, point};

pub type NodeId = String;
pub type HandleId = String;

/// Role of a handle on its node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleType {
    Source,
    Target,
}

impl HandleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandleType::Source => "source",
            HandleType::Target => "target",
        }
    }
}

impl fmt::Display for HandleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a handle: node, optional handle id and role
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleKey {
    pub node_id: NodeId,
    pub handle_id: Option<HandleId>,
    pub handle_type: HandleType,
}

impl HandleKey {
    pub fn new(node_id: impl Into<NodeId>, handle_id: Option<&str>, handle_type: HandleType) -> Self {
        Self {
            node_id: node_id.into(),
            handle_id: handle_id.map(str::to_string),
            handle_type,
        }
    }
}

impl fmt::Display for HandleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.node_id,
            self.handle_id.as_deref().unwrap_or(""),
            self.handle_type
        )
    }
}

/// Handle rectangle relative to the node origin, in diagram units
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandleBound {
    pub id: Option<HandleId>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl HandleBound {
    pub fn center(&self) -> Point {
        point(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HandleBounds {
    pub source: Vec<HandleBound>,
    pub target: Vec<HandleBound>,
}

impl HandleBounds {
    pub fn of_type(&self, handle_type: HandleType) -> &[HandleBound] {
        match handle_type {
            HandleType::Source => &self.source,
            HandleType::Target => &self.target,
        }
    }
}

/// Geometry of a node as seen by the connection engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeGeometry {
    pub id: NodeId,
    /// Absolute position in diagram space
    pub position: Point,
    /// `None` until the node has been measured
    pub handle_bounds: Option<HandleBounds>,
}

/// A connectable handle positioned at its center in diagram space
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandleDescriptor {
    pub node_id: NodeId,
    pub handle_id: Option<HandleId>,
    pub handle_type: HandleType,
    pub position: Point,
}

impl HandleDescriptor {
    pub fn key(&self) -> HandleKey {
        HandleKey {
            node_id: self.node_id.clone(),
            handle_id: self.handle_id.clone(),
            handle_type: self.handle_type,
        }
    }

    fn is(&self, key: &HandleKey) -> bool {
        self.node_id == key.node_id
            && self.handle_id == key.handle_id
            && self.handle_type == key.handle_type
    }
}

/// Candidate handles for one connection session.
///
/// Built once at pointer-down and never mutated afterwards. Iteration order is
/// node order, then source handles before target handles.
#[derive(Clone, Debug, Default)]
pub struct HandleLookup {
    handles: Vec<HandleDescriptor>,
}

impl HandleLookup {
    /// Collect every measured handle except the one the drag starts from.
    pub fn build(nodes: &[NodeGeometry], from: &HandleKey) -> Self {
        let mut handles = Vec::new();
        for node in nodes {
            let Some(bounds) = &node.handle_bounds else {
                continue;
            };
            for handle_type in [HandleType::Source, HandleType::Target] {
                for bound in bounds.of_type(handle_type) {
                    let descriptor = HandleDescriptor {
                        node_id: node.id.clone(),
                        handle_id: bound.id.clone(),
                        handle_type,
                        position: node.position + bound.center(),
                    };
                    if !descriptor.is(from) {
                        handles.push(descriptor);
                    }
                }
            }
        }
        Self { handles }
    }

    pub fn iter(&self) -> impl Iterator<Item = &HandleDescriptor> {
        self.handles.iter()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl FromIterator<HandleDescriptor> for HandleLookup {
    fn from_iter<I: IntoIterator<Item = HandleDescriptor>>(iter: I) -> Self {
        Self {
            handles: iter.into_iter().collect(),
        }
    }
}

/// Handle type for a new gesture: the edge updater's override wins over the
/// type of the surface under the pointer.
pub fn resolve_handle_type(
    edge_updater_type: Option<HandleType>,
    surface_type: Option<HandleType>,
) -> Option<HandleType> {
    edge_updater_type.or(surface_type)
}
