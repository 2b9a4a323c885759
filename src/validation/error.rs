//! Crate-level error taxonomy.
//!
//! Each phase defines its own error enum next to the code that raises it;
//! `BuildError` is the sum the public API reports. Everything here is
//! fatal to the current load/validate pass. Non-fatal conditions (merges,
//! overrides, redundant re-imports) are `tracing` warnings instead.

use thiserror::Error;

use crate::document::StructuralError;
use crate::network::hierarchy::HierarchyError;
use crate::network::ports::PortError;
use crate::resolve::ConnectionError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroundingError {
    #[error("module `{module}` is a hierarchy leaf but has no ImplClass (not grounded)")]
    NotGrounded { module: String },

    #[error("no component registered for ImplClass `{impl_class}` of module `{module}`")]
    ComponentNotFound { module: String, impl_class: String },
}

/// Any fatal condition raised during load, validation or assembly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
    #[error(transparent)]
    Port(#[from] PortError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Grounding(#[from] GroundingError),
}
