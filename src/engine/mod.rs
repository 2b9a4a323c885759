//! Capability surface of the external execution engine.
//!
//! The core only issues construction calls through this trait, once, and
//! never reads runtime state back. Execution, buffers and scheduling are
//! entirely the engine's business.

pub mod recording;
pub mod registry;

pub use recording::RecordingEngine;
pub use registry::ComponentRegistry;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("no component factory registered for `{impl_ref}`")]
    ComponentNotFound { impl_ref: String },
}

/// What the core asks of an execution engine.
///
/// `Handle` is an opaque, cheap instance identifier. Implementations map
/// `ImplClass` strings to instantiable component types through an explicit
/// registry populated at startup (see `ComponentRegistry`); there is no
/// runtime reflection anywhere.
pub trait ExecutionEngine {
    type Handle: Copy + Eq + core::fmt::Debug;

    /// Creates an empty composite module instance.
    fn create_module(&mut self, name: &str) -> Self::Handle;

    /// Instantiates the component type registered under `impl_ref`.
    fn create_component(&mut self, name: &str, impl_ref: &str)
        -> Result<Self::Handle, EngineError>;

    /// True if `impl_ref` names a registered component type.
    fn has_component(&self, impl_ref: &str) -> bool;

    fn make_input_port(&mut self, instance: Self::Handle, port: &str, width: u32);

    fn make_output_port(&mut self, instance: Self::Handle, port: &str, width: u32);

    /// Creates the implicit top-level aggregate all parentless modules
    /// attach to.
    fn create_agent(&mut self) -> Self::Handle;

    fn add_submodule(&mut self, parent: Self::Handle, name: &str, child: Self::Handle);

    /// Exposes `parent_port` (an input of `parent`) as a pass-through for
    /// `child_port` (an input of `child`).
    fn alias_input_port(
        &mut self,
        parent: Self::Handle,
        parent_port: &str,
        child: Self::Handle,
        child_port: &str,
    );

    /// Exposes `child_port` (an output of `child`) as `parent_port` (an
    /// output of `parent`).
    fn alias_output_port(
        &mut self,
        child: Self::Handle,
        child_port: &str,
        parent: Self::Handle,
        parent_port: &str,
    );

    /// Wires an output port of one instance to an input port of another.
    fn connect(&mut self, from: Self::Handle, from_port: &str, to: Self::Handle, to_port: &str);
}
