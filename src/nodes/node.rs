//! Node types and core node functionality

use super::port::{Port, PortDirection, PortId};
use crate::value::Value;
use egui::Pos2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node, issued by its owning surface
pub type NodeId = usize;

/// Kind of node - a closed set, fixed when the node is spawned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Holds immutable values set at spawn time
    Constant,
    /// Reads a named parameter by id
    ParameterGet { param: Uuid },
    /// Computes outputs from connected inputs
    Operation,
}

/// A vertex in the visual graph
///
/// Nodes are owned exclusively by the [`GraphSurface`](super::graph::GraphSurface)
/// and destroyed only through explicit removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Name of the archetype this node was spawned from
    pub archetype: String,
    pub kind: NodeKind,
    #[serde(with = "pos2_serde")]
    pub position: Pos2,
    /// Initial values, used as defaults/constants
    pub values: Vec<Value>,
    /// Ports in layout order; structurally compatible archetypes share
    /// the same indexing
    pub ports: Vec<Port>,
}

impl Node {
    /// Creates a new node with no ports or values
    pub fn new(id: NodeId, archetype: impl Into<String>, kind: NodeKind, position: Pos2) -> Self {
        Self {
            id,
            archetype: archetype.into(),
            kind,
            position,
            values: Vec::new(),
            ports: Vec::new(),
        }
    }

    /// Appends a port, returning its index
    pub fn add_port(
        &mut self,
        name: impl Into<String>,
        direction: PortDirection,
        single_connection: bool,
    ) -> PortId {
        let id = self.ports.len();
        self.ports
            .push(Port::new(id, name, direction, single_connection));
        id
    }

    /// Port at `id`, if the node has one
    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(id)
    }

    /// Mutable port at `id`
    pub fn port_mut(&mut self, id: PortId) -> Option<&mut Port> {
        self.ports.get_mut(id)
    }
}

// Serde helper module for egui's Pos2
mod pos2_serde {
    use super::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(pos: &Pos2, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [pos.x, pos.y].serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Pos2, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [x, y] = <[f32; 2]>::deserialize(deserializer)?;
        Ok(Pos2::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ports_are_indexed_in_insertion_order() {
        let mut node = Node::new(0, "Test", NodeKind::Constant, Pos2::ZERO);
        assert_eq!(node.add_port("Value", PortDirection::Output, false), 0);
        assert_eq!(node.add_port("X", PortDirection::Output, false), 1);
        assert!(node.port(1).unwrap().is_output());
        assert!(node.port(2).is_none());
    }
}
