//! Node system - data structures for the editable graph surface

pub mod archetype;
pub mod graph;
pub mod node;
pub mod port;

// Re-export core types
pub use archetype::{ArchetypeKind, NodeArchetype, NodeInit, PortSpec, ValueDerive};
pub use graph::{GraphError, GraphSurface, HistoryPause};
pub use node::{Node, NodeId, NodeKind};
pub use port::{Port, PortDirection, PortId, PortRef};
