//! Port types and connection endpoints

use super::node::NodeId;
use serde::{Deserialize, Serialize};

/// Index of a port within its node
pub type PortId = usize;

/// Direction of a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    Input,
    Output,
}

/// Address of one port on one node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRef {
    pub node: NodeId,
    pub port: PortId,
}

impl PortRef {
    pub fn new(node: NodeId, port: PortId) -> Self {
        Self { node, port }
    }
}

/// A connection endpoint on a node
///
/// Connections are stored as back-references on both endpoints; the
/// [`GraphSurface`](super::graph::GraphSurface) keeps the two sides in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: PortId,
    pub name: String,
    pub direction: PortDirection,
    /// Holds at most one connection; creating a new one evicts the old
    pub single_connection: bool,
    /// Remote endpoints, in connection order
    pub connections: Vec<PortRef>,
}

impl Port {
    /// Creates a new, unconnected port
    pub fn new(
        id: PortId,
        name: impl Into<String>,
        direction: PortDirection,
        single_connection: bool,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            direction,
            single_connection,
            connections: Vec::new(),
        }
    }

    /// Checks if this port is an input
    pub fn is_input(&self) -> bool {
        matches!(self.direction, PortDirection::Input)
    }

    /// Checks if this port is an output
    pub fn is_output(&self) -> bool {
        matches!(self.direction, PortDirection::Output)
    }

    /// Whether any connection is attached to this port
    pub fn has_any_connection(&self) -> bool {
        !self.connections.is_empty()
    }
}
