//! Per-module port declarations with merge rules.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::warn;

use crate::network::descriptor::{Direction, PortDescriptor};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    #[error("port `{port}` redeclared as {requested} but already declared as {existing}")]
    DirectionConflict {
        port: String,
        existing: Direction,
        requested: Direction,
    },

    #[error("port `{port}` has an invalid Shape: expected a single positive integer")]
    InvalidWidth { port: String },

    #[error("invalid port type `{given}` for port `{port}`: expected Input or Output")]
    InvalidDirection { port: String, given: String },

    #[error("module `{module}` lists port `{port}` but no such port was declared")]
    Missing { module: String, port: String },

    #[error("module `{module}` declares no ports")]
    NoPorts { module: String },

    #[error("port `{port}` references undeclared module `{module}`")]
    UndefinedModule { port: String, module: String },

    #[error("port `{port}` has no width after all declarations merged")]
    UnknownWidth { port: String },
}

/// Registry of every declared port, keyed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct PortRegistry {
    ports: BTreeMap<String, PortDescriptor>,
}

impl PortRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares (or re-declares) a port on `module`.
    ///
    /// The first declaration fixes the direction; re-declaring with the
    /// opposite direction is fatal. Width is last-write-wins, with a
    /// warning when a later declaration changes an already known value.
    pub fn declare(
        &mut self,
        module: &str,
        local_name: &str,
        direction: Direction,
        width: Option<u32>,
    ) -> Result<(), PortError> {
        let qualified = format!("{module}.{local_name}");
        match self.ports.get_mut(&qualified) {
            Some(existing) => {
                if existing.direction != direction {
                    return Err(PortError::DirectionConflict {
                        port: qualified,
                        existing: existing.direction,
                        requested: direction,
                    });
                }
                if let Some(new_width) = width {
                    if let Some(old_width) = existing.width {
                        if old_width != new_width {
                            warn!(port = %qualified, old_width, new_width, "port width replaced");
                        }
                    }
                    existing.width = Some(new_width);
                }
            }
            None => {
                self.ports.insert(
                    qualified.clone(),
                    PortDescriptor {
                        name: qualified,
                        module: module.to_string(),
                        direction,
                        width,
                    },
                );
            }
        }
        Ok(())
    }

    pub fn get(&self, qualified: &str) -> Option<&PortDescriptor> {
        self.ports.get(qualified)
    }

    pub fn contains(&self, qualified: &str) -> bool {
        self.ports.contains_key(qualified)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PortDescriptor> {
        self.ports.values()
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}
