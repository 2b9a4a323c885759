//! Loads network-description documents, following import chains.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::document::schema::Document;
use crate::document::StructuralError;
use crate::network::builder::NetworkBuilder;
use crate::validation::error::BuildError;

/// Reads documents from disk into a `NetworkBuilder`.
///
/// Imports are resolved depth-first and strictly before the importing
/// document's own declarations. The set of canonicalized paths already
/// loaded makes re-imports idempotent: a document reachable from several
/// places is processed exactly once.
#[derive(Debug, Default)]
pub struct DocumentLoader {
    loaded: HashSet<PathBuf>,
}

impl DocumentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the document at `path` and everything it imports.
    ///
    /// On any error the load aborts; the builder may hold partial state
    /// and must be discarded by the caller.
    pub fn load_path(
        &mut self,
        path: impl AsRef<Path>,
        builder: &mut NetworkBuilder,
    ) -> Result<(), BuildError> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        let absolute = path.canonicalize().map_err(|e| StructuralError::Unreadable {
            path: shown.clone(),
            reason: e.to_string(),
        })?;
        if !self.loaded.insert(absolute.clone()) {
            debug!(path = %shown, "document already loaded, skipping");
            return Ok(());
        }

        let text = fs::read_to_string(&absolute).map_err(|e| StructuralError::Unreadable {
            path: shown.clone(),
            reason: e.to_string(),
        })?;
        let document: Document =
            serde_json::from_str(&text).map_err(|e| StructuralError::Malformed {
                path: shown.clone(),
                reason: e.to_string(),
            })?;

        let header = document
            .header
            .as_ref()
            .ok_or_else(|| StructuralError::MissingHeader { path: shown.clone() })?;

        // Imports first, resolved against this document's directory.
        let dir = absolute.parent().map(Path::to_path_buf).unwrap_or_default();
        for import in &header.imports {
            let import_path = {
                let p = Path::new(import);
                if p.is_relative() {
                    dir.join(p)
                } else {
                    p.to_path_buf()
                }
            };
            if !import_path.is_file() {
                return Err(StructuralError::ImportNotFound {
                    path: shown,
                    import: import.clone(),
                }
                .into());
            }
            self.load_path(&import_path, builder)?;
        }

        let header_field = |value: Option<&str>, field: &'static str| {
            match value.map(str::trim) {
                Some(v) if !v.is_empty() => Ok(v.to_string()),
                _ => Err(StructuralError::MissingHeaderField {
                    path: shown.clone(),
                    field,
                }),
            }
        };
        let name = header_field(header.name.as_deref(), "Name")?;
        let base = header_field(header.base.as_deref(), "Base")?;
        let kind = header_field(header.kind.as_deref(), "Type")?;

        builder.begin_document(&name, &base, &kind, header.comment.as_deref());

        match &document.modules {
            Some(modules) => {
                for module in modules {
                    builder.declare_module(module)?;
                }
            }
            None => warn!(path = %shown, "no Modules section"),
        }

        match &document.ports {
            Some(ports) => {
                for port in ports {
                    builder.declare_port(port)?;
                }
            }
            None => warn!(path = %shown, "no Ports section"),
        }

        match &document.connections {
            Some(connections) => {
                for connection in connections {
                    builder.declare_connection(connection)?;
                }
            }
            None => {
                // Component libraries carry no wiring of their own.
                if kind != "C" {
                    warn!(path = %shown, "no Connections section");
                }
            }
        }

        Ok(())
    }
}
