//! Graph surface: node ownership, connections, parameters and history

use super::archetype::{ArchetypeKind, NodeArchetype, NodeInit};
use super::node::{Node, NodeId, NodeKind};
use super::port::{Port, PortDirection, PortId, PortRef};
use crate::params::ParameterRegistry;
use crate::undo::{EditorAction, NodeAction, UndoHistory};
use egui::Pos2;
use log::debug;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use thiserror::Error;

/// Errors produced by connection mutation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    #[error("node {node} has no port {port}")]
    UnknownPort { node: NodeId, port: PortId },
    #[error("cannot connect a node to itself")]
    SelfConnection,
    #[error("cannot connect two {0:?} ports")]
    SameDirection(PortDirection),
    #[error("ports are already connected")]
    AlreadyConnected,
}

/// The owning context for nodes, ports, connections and parameters within
/// one editable graph
#[derive(Debug, Default)]
pub struct GraphSurface {
    nodes: HashMap<NodeId, Node>,
    next_node_id: NodeId,
    params: ParameterRegistry,
    history: UndoHistory,
}

impl GraphSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and registers a node from `archetype` at `position`
    ///
    /// Records an add-node history entry unless recording is paused (see
    /// [`pause_history`](Self::pause_history)).
    ///
    /// # Panics
    ///
    /// Panics when `init` does not match the archetype's kind; archetype and
    /// constructor arguments are chosen together at the call site, so a
    /// mismatch is a bug there.
    pub fn spawn_node(
        &mut self,
        archetype: &NodeArchetype,
        position: Pos2,
        init: NodeInit,
    ) -> NodeId {
        let (kind, values) = match (archetype.kind, init) {
            (ArchetypeKind::Constant, NodeInit::Constant(values)) => (NodeKind::Constant, values),
            (ArchetypeKind::ParameterGet, NodeInit::ParameterGet(param)) => {
                (NodeKind::ParameterGet { param }, Vec::new())
            }
            (ArchetypeKind::Operation, NodeInit::Operation) => (NodeKind::Operation, Vec::new()),
            (kind, init) => panic!(
                "archetype `{}` ({kind:?}) cannot be initialised with {init:?}",
                archetype.name
            ),
        };

        let id = self.next_node_id;
        self.next_node_id += 1;
        let mut node = Node::new(id, archetype.name, kind, position);
        node.values = values;
        for spec in archetype.ports {
            node.add_port(spec.name, spec.direction, spec.single_connection);
        }
        self.nodes.insert(id, node);
        debug!("spawned node {} (`{}`)", id, archetype.name);

        if self.history.is_enabled() {
            let action = NodeAction::added(self, id);
            self.history.push(EditorAction::AddRemoveNode(action));
        }
        id
    }

    /// Re-inserts a node that was previously removed (undo/redo path)
    pub(crate) fn restore_node(&mut self, node: Node) {
        if node.id >= self.next_node_id {
            self.next_node_id = node.id + 1;
        }
        self.nodes.insert(node.id, node);
    }

    /// Detaches and destroys a node
    ///
    /// Connections are not cascaded; callers sever or transplant them first
    /// (the undo actions do this via [`sever_node`](Self::sever_node)).
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&node_id);
        if node.is_some() {
            debug!("removed node {}", node_id);
        }
        node
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All live nodes, in no particular order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Ports of `node`, in layout order
    pub fn ports(&self, node: NodeId) -> Option<&[Port]> {
        self.nodes.get(&node).map(|n| n.ports.as_slice())
    }

    /// Port at `at`, if both node and port exist
    pub fn port(&self, at: PortRef) -> Option<&Port> {
        self.nodes.get(&at.node).and_then(|n| n.port(at.port))
    }

    /// Establishes a link between `a` and `b`
    ///
    /// If either port is single-connection, its pre-existing connection is
    /// severed first. Callers transplanting a port's connection list must
    /// iterate it in reverse index order: the eviction removes the entry
    /// currently being transplanted from the source list.
    pub fn create_connection(&mut self, a: PortRef, b: PortRef) -> Result<(), GraphError> {
        if a.node == b.node {
            return Err(GraphError::SelfConnection);
        }
        let (a_dir, a_single) = self.port_flags(a)?;
        let (b_dir, b_single) = self.port_flags(b)?;
        if a_dir == b_dir {
            return Err(GraphError::SameDirection(a_dir));
        }
        if self
            .port(a)
            .is_some_and(|port| port.connections.contains(&b))
        {
            return Err(GraphError::AlreadyConnected);
        }

        if a_single {
            self.sever_port(a);
        }
        if b_single {
            self.sever_port(b);
        }
        self.link(a, b);
        self.link(b, a);
        Ok(())
    }

    /// Like [`create_connection`](Self::create_connection), but places the
    /// back-reference on `b` at `b_index` instead of appending it
    ///
    /// Snapshot restores use this so a remote port's connection order is the
    /// same after undo as it was when the snapshot was taken. The index is
    /// clamped to the list's current length.
    pub(crate) fn create_connection_at(
        &mut self,
        a: PortRef,
        b: PortRef,
        b_index: usize,
    ) -> Result<(), GraphError> {
        self.create_connection(a, b)?;
        if let Some(port) = self
            .nodes
            .get_mut(&b.node)
            .and_then(|n| n.port_mut(b.port))
        {
            if let Some(pos) = port.connections.iter().position(|r| *r == a) {
                let link = port.connections.remove(pos);
                port.connections.insert(b_index.min(port.connections.len()), link);
            }
        }
        Ok(())
    }

    /// Removes the link between `a` and `b`, both directions
    pub fn disconnect(&mut self, a: PortRef, b: PortRef) {
        self.unlink(a, b);
        self.unlink(b, a);
    }

    /// Severs every connection held by the port at `at`
    pub fn sever_port(&mut self, at: PortRef) {
        let Some(remotes) = self.port(at).map(|port| port.connections.clone()) else {
            return;
        };
        for remote in remotes {
            self.disconnect(at, remote);
        }
    }

    /// Severs every connection on every port of `node`
    pub fn sever_node(&mut self, node: NodeId) {
        let port_count = self.nodes.get(&node).map(|n| n.ports.len()).unwrap_or(0);
        for port in 0..port_count {
            self.sever_port(PortRef::new(node, port));
        }
    }

    /// Total number of connections on the surface
    pub fn connection_count(&self) -> usize {
        let endpoints: usize = self
            .nodes
            .values()
            .map(|node| {
                node.ports
                    .iter()
                    .map(|port| port.connections.len())
                    .sum::<usize>()
            })
            .sum();
        endpoints / 2
    }

    pub fn params(&self) -> &ParameterRegistry {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParameterRegistry {
        &mut self.params
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut UndoHistory {
        &mut self.history
    }

    /// Suppresses history recording until the returned guard drops
    ///
    /// The guard dereferences to the surface, and restores the previous
    /// recording state on every exit path, early returns included.
    pub fn pause_history(&mut self) -> HistoryPause<'_> {
        let prev = self.history.is_enabled();
        self.history.set_enabled(false);
        HistoryPause {
            surface: self,
            prev,
        }
    }

    /// Reverts the most recent history entry; returns false when there is
    /// nothing to undo
    pub fn undo(&mut self) -> bool {
        let Some(mut action) = self.history.pop_undo() else {
            return false;
        };
        action.revert(self);
        self.history.push_redo(action);
        true
    }

    /// Re-applies the most recently undone entry
    pub fn redo(&mut self) -> bool {
        let Some(mut action) = self.history.pop_redo() else {
            return false;
        };
        action.execute(self);
        self.history.push_undo(action);
        true
    }

    fn port_flags(&self, at: PortRef) -> Result<(PortDirection, bool), GraphError> {
        let node = self
            .nodes
            .get(&at.node)
            .ok_or(GraphError::UnknownNode(at.node))?;
        let port = node.port(at.port).ok_or(GraphError::UnknownPort {
            node: at.node,
            port: at.port,
        })?;
        Ok((port.direction, port.single_connection))
    }

    fn link(&mut self, at: PortRef, remote: PortRef) {
        if let Some(port) = self
            .nodes
            .get_mut(&at.node)
            .and_then(|n| n.port_mut(at.port))
        {
            port.connections.push(remote);
        }
    }

    fn unlink(&mut self, at: PortRef, remote: PortRef) {
        if let Some(port) = self
            .nodes
            .get_mut(&at.node)
            .and_then(|n| n.port_mut(at.port))
        {
            port.connections.retain(|r| *r != remote);
        }
    }
}

/// Keeps history recording off for the lifetime of the guard
pub struct HistoryPause<'a> {
    surface: &'a mut GraphSurface,
    prev: bool,
}

impl Deref for HistoryPause<'_> {
    type Target = GraphSurface;

    fn deref(&self) -> &GraphSurface {
        self.surface
    }
}

impl DerefMut for HistoryPause<'_> {
    fn deref_mut(&mut self) -> &mut GraphSurface {
        self.surface
    }
}

impl Drop for HistoryPause<'_> {
    fn drop(&mut self) {
        self.surface.history.set_enabled(self.prev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::archetype::{ADD, FLOAT_CONSTANT, OUTPUT, PARAMETER_GET};
    use crate::value::Value;

    fn spawn_constant(surface: &mut GraphSurface, x: f32) -> NodeId {
        let mut paused = surface.pause_history();
        paused.spawn_node(
            &FLOAT_CONSTANT,
            Pos2::new(x, 0.0),
            NodeInit::Constant(vec![Value::Float(1.0)]),
        )
    }

    #[test]
    fn basic_node_lifecycle() {
        let mut surface = GraphSurface::new();
        let id = spawn_constant(&mut surface, 0.0);
        assert_eq!(surface.node_count(), 1);
        assert_eq!(surface.node(id).unwrap().kind, NodeKind::Constant);
        assert_eq!(surface.ports(id).unwrap().len(), 1);

        assert!(surface.remove_node(id).is_some());
        assert_eq!(surface.node_count(), 0);
        assert!(surface.remove_node(id).is_none());
    }

    #[test]
    fn connection_links_both_endpoints() {
        let mut surface = GraphSurface::new();
        let constant = spawn_constant(&mut surface, 0.0);
        let add = {
            let mut paused = surface.pause_history();
            paused.spawn_node(&ADD, Pos2::new(120.0, 0.0), NodeInit::Operation)
        };
        let out = PortRef::new(constant, 0);
        let input = PortRef::new(add, 0);

        surface.create_connection(out, input).unwrap();
        assert_eq!(surface.port(out).unwrap().connections, vec![input]);
        assert_eq!(surface.port(input).unwrap().connections, vec![out]);
        assert_eq!(surface.connection_count(), 1);

        surface.disconnect(out, input);
        assert_eq!(surface.connection_count(), 0);
        assert!(!surface.port(out).unwrap().has_any_connection());
    }

    #[test]
    fn single_connection_port_evicts_previous_link() {
        let mut surface = GraphSurface::new();
        let first = spawn_constant(&mut surface, 0.0);
        let second = spawn_constant(&mut surface, 60.0);
        let add = {
            let mut paused = surface.pause_history();
            paused.spawn_node(&ADD, Pos2::new(120.0, 0.0), NodeInit::Operation)
        };
        let input = PortRef::new(add, 0);

        surface
            .create_connection(PortRef::new(first, 0), input)
            .unwrap();
        surface
            .create_connection(PortRef::new(second, 0), input)
            .unwrap();

        assert_eq!(surface.port(input).unwrap().connections.len(), 1);
        assert_eq!(
            surface.port(input).unwrap().connections[0],
            PortRef::new(second, 0)
        );
        assert!(!surface.port(PortRef::new(first, 0)).unwrap().has_any_connection());
    }

    #[test]
    fn multi_connection_port_accumulates_links() {
        let mut surface = GraphSurface::new();
        let first = spawn_constant(&mut surface, 0.0);
        let second = spawn_constant(&mut surface, 60.0);
        let sink = {
            let mut paused = surface.pause_history();
            paused.spawn_node(&OUTPUT, Pos2::new(120.0, 0.0), NodeInit::Operation)
        };
        let input = PortRef::new(sink, 0);

        surface
            .create_connection(PortRef::new(first, 0), input)
            .unwrap();
        surface
            .create_connection(PortRef::new(second, 0), input)
            .unwrap();
        assert_eq!(surface.port(input).unwrap().connections.len(), 2);
    }

    #[test]
    fn positioned_connection_lands_at_the_requested_index() {
        let mut surface = GraphSurface::new();
        let first = spawn_constant(&mut surface, 0.0);
        let second = spawn_constant(&mut surface, 60.0);
        let sink = {
            let mut paused = surface.pause_history();
            paused.spawn_node(&OUTPUT, Pos2::new(120.0, 0.0), NodeInit::Operation)
        };
        let input = PortRef::new(sink, 0);

        surface
            .create_connection(PortRef::new(second, 0), input)
            .unwrap();
        surface
            .create_connection_at(PortRef::new(first, 0), input, 0)
            .unwrap();

        assert_eq!(
            surface.port(input).unwrap().connections,
            vec![PortRef::new(first, 0), PortRef::new(second, 0)]
        );
        // Out-of-range indices clamp to an append.
        let third = spawn_constant(&mut surface, 120.0);
        surface
            .create_connection_at(PortRef::new(third, 0), input, 9)
            .unwrap();
        assert_eq!(
            surface.port(input).unwrap().connections.last(),
            Some(&PortRef::new(third, 0))
        );
    }

    #[test]
    fn invalid_connections_are_rejected() {
        let mut surface = GraphSurface::new();
        let first = spawn_constant(&mut surface, 0.0);
        let second = spawn_constant(&mut surface, 60.0);
        let add = {
            let mut paused = surface.pause_history();
            paused.spawn_node(&ADD, Pos2::new(120.0, 0.0), NodeInit::Operation)
        };

        assert_eq!(
            surface.create_connection(PortRef::new(first, 0), PortRef::new(second, 0)),
            Err(GraphError::SameDirection(PortDirection::Output))
        );
        assert_eq!(
            surface.create_connection(PortRef::new(add, 0), PortRef::new(add, 2)),
            Err(GraphError::SelfConnection)
        );
        assert_eq!(
            surface.create_connection(PortRef::new(99, 0), PortRef::new(add, 0)),
            Err(GraphError::UnknownNode(99))
        );
        assert_eq!(
            surface.create_connection(PortRef::new(first, 7), PortRef::new(add, 0)),
            Err(GraphError::UnknownPort { node: first, port: 7 })
        );

        surface
            .create_connection(PortRef::new(first, 0), PortRef::new(add, 0))
            .unwrap();
        assert_eq!(
            surface.create_connection(PortRef::new(first, 0), PortRef::new(add, 0)),
            Err(GraphError::AlreadyConnected)
        );
    }

    #[test]
    fn spawn_records_one_undoable_entry() {
        let mut surface = GraphSurface::new();
        let id = surface.spawn_node(
            &FLOAT_CONSTANT,
            Pos2::ZERO,
            NodeInit::Constant(vec![Value::Float(2.0)]),
        );
        assert_eq!(surface.history().undo_count(), 1);

        assert!(surface.undo());
        assert!(surface.node(id).is_none());
        assert!(surface.redo());
        assert!(surface.node(id).is_some());
    }

    #[test]
    fn paused_history_records_nothing() {
        let mut surface = GraphSurface::new();
        {
            let mut paused = surface.pause_history();
            paused.spawn_node(
                &FLOAT_CONSTANT,
                Pos2::ZERO,
                NodeInit::Constant(vec![Value::Float(2.0)]),
            );
            assert!(!paused.history().is_enabled());
        }
        assert!(surface.history().is_enabled());
        assert_eq!(surface.history().undo_count(), 0);
    }

    #[test]
    fn nested_pause_restores_previous_state() {
        let mut surface = GraphSurface::new();
        let mut outer = surface.pause_history();
        {
            let inner = outer.pause_history();
            assert!(!inner.history().is_enabled());
        }
        // inner guard restores the state the outer guard set up
        assert!(!outer.history().is_enabled());
        drop(outer);
        assert!(surface.history().is_enabled());
    }

    #[test]
    #[should_panic(expected = "cannot be initialised with")]
    fn mismatched_spawn_arguments_panic() {
        let mut surface = GraphSurface::new();
        surface.spawn_node(
            &PARAMETER_GET,
            Pos2::ZERO,
            NodeInit::Constant(vec![Value::Float(1.0)]),
        );
    }
}
