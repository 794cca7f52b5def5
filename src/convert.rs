//! Constant-to-parameter conversion
//!
//! Turns a constant node into a named parameter plus a parameter-getter node
//! wired in its place, recorded as a single undo step. The operation is a
//! plain value invoked with a [`MenuContext`], so any context-menu plumbing
//! can trigger it without the algorithm knowing about the UI.

use crate::nodes::archetype::{NodeArchetype, NodeInit, ValueDerive, PARAMETER_GET};
use crate::nodes::graph::GraphSurface;
use crate::nodes::node::{NodeId, NodeKind};
use crate::nodes::port::PortRef;
use crate::params::unique_name;
use crate::undo::{EditorAction, NodeAction, ParamAction};
use egui::Pos2;
use log::{debug, error, warn};
use uuid::Uuid;

/// Asset the edited surface belongs to
#[derive(Debug, Clone)]
pub struct Asset {
    pub name: String,
    pub loaded: bool,
}

impl Asset {
    pub fn loaded(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            loaded: true,
        }
    }

    pub fn unloaded(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            loaded: false,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

/// Editing window that owns a surface and its backing asset
#[derive(Debug, Default)]
pub struct EditorWindow {
    pub surface: GraphSurface,
    pub asset: Option<Asset>,
}

impl EditorWindow {
    pub fn new(surface: GraphSurface, asset: Asset) -> Self {
        Self {
            surface,
            asset: Some(asset),
        }
    }
}

/// Context handed to commands triggered from a node's context menu
pub struct MenuContext<'a> {
    /// The window the menu was opened in, if the menu is still bound to one
    pub window: Option<&'a mut EditorWindow>,
    /// Screen location of the triggering click
    pub location: Pos2,
}

impl<'a> MenuContext<'a> {
    pub fn new(window: &'a mut EditorWindow, location: Pos2) -> Self {
        Self {
            window: Some(window),
            location,
        }
    }
}

/// Converts a constant node into a named parameter
///
/// The conversion creates a parameter seeded from the node's values, spawns
/// a [`PARAMETER_GET`] node at the same placement, transplants every
/// connection to it, removes the original node, and pushes the whole
/// sequence to the history as one entry.
#[derive(Debug, Clone, Copy)]
pub struct ConvertToParameter {
    node: NodeId,
    derive_value: Option<ValueDerive>,
}

impl ConvertToParameter {
    /// Conversion that seeds the parameter with the node's first value
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            derive_value: None,
        }
    }

    /// Conversion using the derivation function of the node's archetype,
    /// for constants whose exposed value is composed from the stored ones
    pub fn from_archetype(node: NodeId, archetype: &NodeArchetype) -> Self {
        Self {
            node,
            derive_value: archetype.derive_value,
        }
    }

    /// Seeds the parameter with `derive` applied to all stored values
    pub fn with_derive(mut self, derive: ValueDerive) -> Self {
        self.derive_value = Some(derive);
        self
    }

    /// Runs the conversion; returns the new parameter's id
    ///
    /// When the window's asset is missing or not loaded the operation logs
    /// an error and returns `None` without mutating anything.
    ///
    /// # Panics
    ///
    /// Panics when the context carries no window binding, when the target
    /// node does not exist, or when a constant node has no stored values.
    /// These are caller bugs, not user errors.
    pub fn invoke(&self, ctx: MenuContext<'_>) -> Option<Uuid> {
        let window = ctx
            .window
            .expect("convert-to-parameter invoked without a surface window");
        debug!(
            "converting node {} to a parameter (menu at {:?})",
            self.node, ctx.location
        );
        match &window.asset {
            Some(asset) if asset.is_loaded() => {}
            _ => {
                error!("surface asset is missing or not loaded");
                return None;
            }
        }
        let surface = &mut window.surface;
        let source = surface
            .node(self.node)
            .unwrap_or_else(|| panic!("convert-to-parameter target node {} is gone", self.node));
        let position = source.position;

        let init_value = match self.derive_value {
            Some(derive) => derive(&source.values),
            None => source
                .values
                .first()
                .cloned()
                .unwrap_or_else(|| panic!("node {} has no values to convert", self.node)),
        };
        let value_type = init_value.value_type();
        let name = unique_name("New parameter", |candidate| {
            surface.params().is_name_free(candidate)
        });

        // Executed immediately: the getter node needs the parameter id.
        let mut param_action = ParamAction::add(name, value_type, init_value);
        param_action.execute(surface);
        let param_id = param_action.param_id();

        let getter = {
            let mut paused = surface.pause_history();
            paused.spawn_node(&PARAMETER_GET, position, NodeInit::ParameterGet(param_id))
        };
        match surface.node(getter).map(|node| &node.kind) {
            Some(NodeKind::ParameterGet { .. }) => {}
            other => panic!("spawned node is not a parameter getter: {other:?}"),
        }

        // The removal snapshot is taken before the transplant so that undo
        // can put back links that single-connection eviction drops below.
        let mut remove_action = NodeAction::removed(surface, self.node);

        self.transplant_connections(surface, getter);

        let spawn_action = NodeAction::added(surface, getter);
        remove_action.execute(surface);
        surface.history_mut().push(EditorAction::Batch(vec![
            EditorAction::AddRemoveParam(param_action),
            EditorAction::AddRemoveNode(spawn_action),
            EditorAction::AddRemoveNode(remove_action),
        ]));
        Some(param_id)
    }

    /// Recreates every connection of the source node on the getter's port
    /// with the same index; indices the getter lacks are skipped
    fn transplant_connections(&self, surface: &mut GraphSurface, getter: NodeId) {
        let source_ports = surface.ports(self.node).map(|p| p.len()).unwrap_or(0);
        let getter_ports = surface.ports(getter).map(|p| p.len()).unwrap_or(0);
        for index in 0..source_ports {
            if index >= getter_ports {
                continue;
            }
            let source_port = PortRef::new(self.node, index);
            // Last to first: connecting to a single-connection remote severs
            // its old link, which removes the entry at the current index
            // from this very list.
            let mut k = surface
                .port(source_port)
                .map(|port| port.connections.len())
                .unwrap_or(0);
            while k > 0 {
                k -= 1;
                let Some(remote) = surface
                    .port(source_port)
                    .and_then(|port| port.connections.get(k).copied())
                else {
                    continue;
                };
                if let Err(err) = surface.create_connection(PortRef::new(getter, index), remote) {
                    warn!("could not transplant connection to {remote:?}: {err}");
                }
            }
        }
    }
}
