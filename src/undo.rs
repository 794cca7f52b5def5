//! Reversible editor actions and the undo/redo history
//!
//! Each [`EditorAction`] captures enough state to apply and reverse one
//! mutation of a [`GraphSurface`]. [`EditorAction::Batch`] groups several
//! actions into a single history entry: executed in declaration order,
//! reverted in reverse order.

use crate::nodes::graph::GraphSurface;
use crate::nodes::node::{Node, NodeId};
use crate::nodes::port::{PortId, PortRef};
use crate::value::{Value, ValueType};
use log::warn;
use uuid::Uuid;

/// A single undoable editor operation
#[derive(Debug, Clone)]
pub enum EditorAction {
    AddRemoveParam(ParamAction),
    AddRemoveNode(NodeAction),
    /// Ordered group that undoes and redoes as one unit
    Batch(Vec<EditorAction>),
}

impl EditorAction {
    /// Applies the action's forward effect
    pub fn execute(&mut self, surface: &mut GraphSurface) {
        match self {
            EditorAction::AddRemoveParam(action) => action.execute(surface),
            EditorAction::AddRemoveNode(action) => action.execute(surface),
            EditorAction::Batch(actions) => {
                for action in actions.iter_mut() {
                    action.execute(surface);
                }
            }
        }
    }

    /// Restores the state from before [`execute`](Self::execute)
    pub fn revert(&mut self, surface: &mut GraphSurface) {
        match self {
            EditorAction::AddRemoveParam(action) => action.revert(surface),
            EditorAction::AddRemoveNode(action) => action.revert(surface),
            EditorAction::Batch(actions) => {
                for action in actions.iter_mut().rev() {
                    action.revert(surface);
                }
            }
        }
    }
}

/// Adds a parameter on execute, removes it on revert
///
/// The id is fixed at construction so a redo recreates the parameter under
/// the same id any getter nodes reference.
#[derive(Debug, Clone)]
pub struct ParamAction {
    id: Uuid,
    name: String,
    value_type: ValueType,
    init_value: Value,
}

impl ParamAction {
    pub fn add(name: String, value_type: ValueType, init_value: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            value_type,
            init_value,
        }
    }

    /// Id the parameter is (re)created under
    pub fn param_id(&self) -> Uuid {
        self.id
    }

    pub fn execute(&mut self, surface: &mut GraphSurface) {
        if let Err(err) = surface.params_mut().add_with_id(
            self.id,
            self.name.clone(),
            self.value_type,
            self.init_value.clone(),
        ) {
            warn!("parameter action could not add `{}`: {err}", self.name);
        }
    }

    pub fn revert(&mut self, surface: &mut GraphSurface) {
        if surface.params_mut().remove(self.id).is_none() {
            warn!("parameter action could not remove `{}`", self.name);
        }
    }
}

/// One recorded connection of a snapshotted node
///
/// `remote_index` is where this node's back-reference sat in the remote
/// port's connection list; restoring at that index keeps multi-connection
/// remotes ordered as they were.
#[derive(Debug, Clone, PartialEq)]
struct SnapshotLink {
    port: PortId,
    remote: PortRef,
    remote_index: usize,
}

/// A node plus the connections its ports held when it was captured
#[derive(Debug, Clone, PartialEq)]
struct NodeSnapshot {
    node: Node,
    links: Vec<SnapshotLink>,
}

impl NodeSnapshot {
    /// Captures `node_id` as it currently exists on the surface
    fn capture(surface: &GraphSurface, node_id: NodeId) -> Self {
        let mut node = surface
            .node(node_id)
            .unwrap_or_else(|| panic!("cannot snapshot unknown node {node_id}"))
            .clone();
        let mut links = Vec::new();
        for port in &node.ports {
            let local = PortRef::new(node_id, port.id);
            for remote in &port.connections {
                let remote_index = surface
                    .port(*remote)
                    .and_then(|p| p.connections.iter().position(|r| *r == local))
                    .unwrap_or(0);
                links.push(SnapshotLink {
                    port: port.id,
                    remote: *remote,
                    remote_index,
                });
            }
        }
        for port in &mut node.ports {
            port.connections.clear();
        }
        Self { node, links }
    }

    /// Re-inserts the node and recreates its recorded connections, each at
    /// its recorded position in the remote's list
    fn restore(&self, surface: &mut GraphSurface) {
        surface.restore_node(self.node.clone());
        for link in &self.links {
            let local = PortRef::new(self.node.id, link.port);
            if let Err(err) = surface.create_connection_at(local, link.remote, link.remote_index) {
                warn!(
                    "could not restore connection {local:?} -> {:?}: {err}",
                    link.remote
                );
            }
        }
    }
}

/// Adds or removes one node, connections included
///
/// The snapshot is taken when the action is constructed and never refreshed.
/// For a removal wrapped around a connection transplant this matters: the
/// snapshot must hold the node's connections from before the transplant, so
/// reverting recreates links that single-connection eviction dropped.
#[derive(Debug, Clone)]
pub struct NodeAction {
    node_id: NodeId,
    is_add: bool,
    snapshot: NodeSnapshot,
}

impl NodeAction {
    /// Wraps a node that was already spawned (with history suppressed) as an
    /// undoable add
    pub fn added(surface: &GraphSurface, node_id: NodeId) -> Self {
        Self {
            node_id,
            is_add: true,
            snapshot: NodeSnapshot::capture(surface, node_id),
        }
    }

    /// Prepares removal of `node_id`, capturing its current connections
    pub fn removed(surface: &GraphSurface, node_id: NodeId) -> Self {
        Self {
            node_id,
            is_add: false,
            snapshot: NodeSnapshot::capture(surface, node_id),
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn execute(&mut self, surface: &mut GraphSurface) {
        if self.is_add {
            self.snapshot.restore(surface);
        } else {
            self.detach(surface);
        }
    }

    pub fn revert(&mut self, surface: &mut GraphSurface) {
        if self.is_add {
            self.detach(surface);
        } else {
            self.snapshot.restore(surface);
        }
    }

    /// Severs whatever connections the node currently holds, then removes it
    fn detach(&self, surface: &mut GraphSurface) {
        surface.sever_node(self.node_id);
        if surface.remove_node(self.node_id).is_none() {
            warn!("node action could not remove node {}", self.node_id);
        }
    }
}

/// Bounded undo/redo history for one surface
///
/// Pushing a new entry clears the redo stack; pushes are ignored while
/// recording is disabled (see
/// [`GraphSurface::pause_history`](crate::nodes::graph::GraphSurface::pause_history)).
#[derive(Debug, Clone)]
pub struct UndoHistory {
    undo_stack: Vec<EditorAction>,
    redo_stack: Vec<EditorAction>,
    enabled: bool,
    max_depth: usize,
}

impl UndoHistory {
    /// Creates a history with the given maximum undo depth
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            enabled: true,
            max_depth,
        }
    }

    /// Records an already-executed action as one history entry
    pub fn push(&mut self, action: EditorAction) {
        if !self.enabled {
            return;
        }
        self.undo_stack.push(action);
        self.redo_stack.clear();
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    // Stack plumbing for GraphSurface::undo/redo; bypasses the enabled flag
    // so undo/redo keep working while recording is paused.

    pub(crate) fn pop_undo(&mut self) -> Option<EditorAction> {
        self.undo_stack.pop()
    }

    pub(crate) fn push_undo(&mut self, action: EditorAction) {
        self.undo_stack.push(action);
    }

    pub(crate) fn pop_redo(&mut self) -> Option<EditorAction> {
        self.redo_stack.pop()
    }

    pub(crate) fn push_redo(&mut self, action: EditorAction) {
        self.redo_stack.push(action);
    }
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(256)
    }
}
