//! Nodewire - node graph editing core with undoable operations
//!
//! This library provides the data model for an editable node-graph surface
//! (nodes, ports, connections, named parameters), an undo/redo history built
//! from reversible editor actions, and the convert-to-parameter operation
//! that turns a constant node into a named parameter as a single undo step.

pub mod convert;
pub mod nodes;
pub mod params;
pub mod undo;
pub mod value;

pub use convert::{Asset, ConvertToParameter, EditorWindow, MenuContext};
pub use nodes::{
    GraphError, GraphSurface, Node, NodeArchetype, NodeId, NodeInit, NodeKind, Port,
    PortDirection, PortId, PortRef,
};
pub use params::{unique_name, ParamError, Parameter, ParameterRegistry};
pub use undo::{EditorAction, NodeAction, ParamAction, UndoHistory};
pub use value::{Value, ValueType};

// Re-export commonly used egui types
pub use egui::Pos2;
