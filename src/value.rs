//! Generic values carried by nodes and parameters

use serde::{Deserialize, Serialize};

/// Type tag for [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    Float,
    Integer,
    Vector3,
    Color,
    String,
    Boolean,
}

impl ValueType {
    /// Display name used in logs and UI labels
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Float => "Float",
            ValueType::Integer => "Integer",
            ValueType::Vector3 => "Vector3",
            ValueType::Color => "Color",
            ValueType::String => "String",
            ValueType::Boolean => "Boolean",
        }
    }
}

/// A value stored on a node or seeding a parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Float(f32),
    Integer(i32),
    Vector3([f32; 3]),
    Color([f32; 4]),
    String(String),
    Boolean(bool),
}

impl Value {
    /// The type tag of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Float(_) => ValueType::Float,
            Value::Integer(_) => ValueType::Integer,
            Value::Vector3(_) => ValueType::Vector3,
            Value::Color(_) => ValueType::Color,
            Value::String(_) => ValueType::String,
            Value::Boolean(_) => ValueType::Boolean,
        }
    }
}
