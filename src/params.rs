//! Named parameter storage with uniqueness guarantees

use crate::value::{Value, ValueType};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors produced by parameter registration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamError {
    #[error("a parameter named `{0}` already exists")]
    DuplicateName(String),
}

/// A named value with a lifetime independent of any node that references it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: Uuid,
    pub name: String,
    pub value_type: ValueType,
    pub init_value: Value,
}

/// Ordered parameter storage owned by a surface
///
/// Names are checked for uniqueness at insertion time only; callers wanting
/// a fresh name go through [`unique_name`] first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterRegistry {
    params: Vec<Parameter>,
}

impl ParameterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a parameter under a freshly generated id
    pub fn add(
        &mut self,
        name: impl Into<String>,
        value_type: ValueType,
        init_value: Value,
    ) -> Result<Uuid, ParamError> {
        self.add_with_id(Uuid::new_v4(), name, value_type, init_value)
    }

    /// Registers a parameter under a caller-chosen id
    ///
    /// Used by undo actions so that redo recreates the parameter with the
    /// same id nodes reference.
    pub fn add_with_id(
        &mut self,
        id: Uuid,
        name: impl Into<String>,
        value_type: ValueType,
        init_value: Value,
    ) -> Result<Uuid, ParamError> {
        let name = name.into();
        if !self.is_name_free(&name) {
            return Err(ParamError::DuplicateName(name));
        }
        debug!("registered parameter `{}` ({})", name, value_type.name());
        self.params.push(Parameter {
            id,
            name,
            value_type,
            init_value,
        });
        Ok(id)
    }

    /// Unregisters and returns the parameter with `id`
    pub fn remove(&mut self, id: Uuid) -> Option<Parameter> {
        let index = self.params.iter().position(|p| p.id == id)?;
        let param = self.params.remove(index);
        debug!("removed parameter `{}`", param.name);
        Some(param)
    }

    pub fn get(&self, id: Uuid) -> Option<&Parameter> {
        self.params.iter().find(|p| p.id == id)
    }

    /// Whether `name` is non-blank and unused by any current parameter
    pub fn is_name_free(&self, name: &str) -> bool {
        !name.trim().is_empty() && self.params.iter().all(|p| p.name != name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Returns `base` if the caller's predicate accepts it, otherwise the first
/// `"{base} {n}"` (n starting at 1) it accepts
pub fn unique_name(base: &str, is_free: impl Fn(&str) -> bool) -> String {
    if is_free(base) {
        return base.to_string();
    }
    let mut n = 1usize;
    loop {
        let candidate = format!("{base} {n}");
        if is_free(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
