//! netweave_core
//!
//! Interpreter for declarative network-description documents: JSON files
//! describing a hierarchy of named modules, typed ports and directed
//! connections. The crate loads documents (following import chains),
//! merges redundant declarations, validates the result in two phases
//! (structural consistency, then grounding) and finally drives an external
//! execution engine through a small capability surface to build the live
//! object graph. It never executes anything itself.
//!
//! Typical pipeline:
//! 1. `DocumentLoader` feeds one or more documents into a `NetworkBuilder`.
//! 2. `validate` consumes the builder and returns a frozen `Network`.
//! 3. `Assembler` walks the network bottom-up and issues construction
//!    calls against an `ExecutionEngine` implementation.

pub mod assembly;
pub mod document;
pub mod engine;
pub mod network;
pub mod resolve;
pub mod validation;

// Re-export the types that make up the public pipeline.
pub use assembly::Assembler;
pub use document::loader::DocumentLoader;
pub use engine::{ComponentRegistry, EngineError, ExecutionEngine};
pub use network::builder::NetworkBuilder;
pub use network::descriptor::{ConnectionDescriptor, Direction, ModuleDescriptor, PortDescriptor};
pub use network::Network;
pub use resolve::{Relation, ResolvedLink};
pub use validation::error::BuildError;
pub use validation::{validate, Validator};
