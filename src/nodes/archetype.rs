//! Spawnable node descriptors
//!
//! Archetypes are static descriptions of the node kinds the surface can
//! spawn: their port layout and, for constants whose displayed value differs
//! from the stored representation, the function that composes the exposed
//! value from the stored ones.

use super::port::PortDirection;
use crate::value::Value;
use uuid::Uuid;

/// Composes the value a constant node exposes from its stored values
pub type ValueDerive = fn(&[Value]) -> Value;

/// Which [`NodeKind`](super::node::NodeKind) an archetype spawns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchetypeKind {
    Constant,
    ParameterGet,
    Operation,
}

/// Port layout entry for an archetype
#[derive(Debug, Clone, Copy)]
pub struct PortSpec {
    pub name: &'static str,
    pub direction: PortDirection,
    pub single_connection: bool,
}

impl PortSpec {
    const fn output(name: &'static str) -> Self {
        Self {
            name,
            direction: PortDirection::Output,
            single_connection: false,
        }
    }

    const fn input(name: &'static str) -> Self {
        Self {
            name,
            direction: PortDirection::Input,
            single_connection: true,
        }
    }

    const fn multi_input(name: &'static str) -> Self {
        Self {
            name,
            direction: PortDirection::Input,
            single_connection: false,
        }
    }
}

/// Static description of a spawnable node kind
#[derive(Debug, Clone, Copy)]
pub struct NodeArchetype {
    pub name: &'static str,
    pub kind: ArchetypeKind,
    pub ports: &'static [PortSpec],
    /// Maps the stored values to the value exposed when the node is
    /// converted to a parameter
    pub derive_value: Option<ValueDerive>,
}

/// Typed constructor arguments for [`GraphSurface::spawn_node`](super::graph::GraphSurface::spawn_node)
///
/// Each variant matches exactly one [`ArchetypeKind`]; a mismatch at spawn
/// time is a programming error.
#[derive(Debug, Clone)]
pub enum NodeInit {
    Constant(Vec<Value>),
    ParameterGet(Uuid),
    Operation,
}

/// Single float constant; stored value is the exposed value
pub const FLOAT_CONSTANT: NodeArchetype = NodeArchetype {
    name: "Float Constant",
    kind: ArchetypeKind::Constant,
    ports: &[PortSpec::output("Value")],
    derive_value: None,
};

/// Vector constant stored as three float components but exposed composite
pub const VECTOR3_CONSTANT: NodeArchetype = NodeArchetype {
    name: "Vector3 Constant",
    kind: ArchetypeKind::Constant,
    ports: &[
        PortSpec::output("Value"),
        PortSpec::output("X"),
        PortSpec::output("Y"),
        PortSpec::output("Z"),
    ],
    derive_value: Some(compose_vector3),
};

/// Color constant stored as four float channels; exposes one extra port
/// (alpha) beyond the parameter getter's layout
pub const COLOR_CONSTANT: NodeArchetype = NodeArchetype {
    name: "Color Constant",
    kind: ArchetypeKind::Constant,
    ports: &[
        PortSpec::output("Value"),
        PortSpec::output("R"),
        PortSpec::output("G"),
        PortSpec::output("B"),
        PortSpec::output("A"),
    ],
    derive_value: Some(compose_color),
};

/// Reads a parameter; port layout is index-compatible with the constants
pub const PARAMETER_GET: NodeArchetype = NodeArchetype {
    name: "Get Parameter",
    kind: ArchetypeKind::ParameterGet,
    ports: &[
        PortSpec::output("Value"),
        PortSpec::output("X"),
        PortSpec::output("Y"),
        PortSpec::output("Z"),
    ],
    derive_value: None,
};

/// Two-input adder; inputs accept a single connection each
pub const ADD: NodeArchetype = NodeArchetype {
    name: "Add",
    kind: ArchetypeKind::Operation,
    ports: &[
        PortSpec::input("A"),
        PortSpec::input("B"),
        PortSpec::output("Result"),
    ],
    derive_value: None,
};

/// Terminal sink; its input accepts any number of connections
pub const OUTPUT: NodeArchetype = NodeArchetype {
    name: "Output",
    kind: ArchetypeKind::Operation,
    ports: &[PortSpec::multi_input("In")],
    derive_value: None,
};

fn component(values: &[Value], index: usize) -> f32 {
    match values.get(index) {
        Some(Value::Float(f)) => *f,
        _ => 0.0,
    }
}

fn compose_vector3(values: &[Value]) -> Value {
    Value::Vector3([
        component(values, 0),
        component(values, 1),
        component(values, 2),
    ])
}

fn compose_color(values: &[Value]) -> Value {
    Value::Color([
        component(values, 0),
        component(values, 1),
        component(values, 2),
        component(values, 3),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector3_composes_from_components() {
        let values = vec![Value::Float(1.0), Value::Float(2.0), Value::Float(3.0)];
        assert_eq!(compose_vector3(&values), Value::Vector3([1.0, 2.0, 3.0]));
    }

    #[test]
    fn missing_components_fall_back_to_zero() {
        assert_eq!(
            compose_color(&[Value::Float(0.5)]),
            Value::Color([0.5, 0.0, 0.0, 0.0])
        );
    }

    #[test]
    fn constant_and_getter_port_layouts_align() {
        for (i, spec) in VECTOR3_CONSTANT.ports.iter().enumerate() {
            let getter = &PARAMETER_GET.ports[i];
            assert_eq!(spec.direction, getter.direction);
            assert_eq!(spec.single_connection, getter.single_connection);
        }
    }
}
