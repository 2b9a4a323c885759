//! Document model and loader for the JSON network-description format.
pub mod loader;
pub mod schema;

use thiserror::Error;

/// Errors raised while reading and shaping documents, before any network
/// semantics come into play.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("could not read `{path}`: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("`{path}` is not a valid network description: {reason}")]
    Malformed { path: String, reason: String },

    #[error("`{path}` has no Header section")]
    MissingHeader { path: String },

    #[error("header field `{field}` missing in `{path}`")]
    MissingHeaderField { path: String, field: &'static str },

    #[error("import `{import}` referenced by `{path}` does not exist")]
    ImportNotFound { path: String, import: String },

    #[error("{section} entry is missing required field `{field}`")]
    MissingField {
        section: &'static str,
        field: &'static str,
    },

    #[error("module `{module}` must declare ImplClass in a type C document")]
    ImplClassRequired { module: String },
}

pub use loader::DocumentLoader;
pub use schema::{ConnectionDecl, Document, Header, ModuleDecl, ModulePortDecl, PortDecl};
