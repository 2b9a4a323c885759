//! Accumulates declarations from loaded documents into one set of
//! registries, applying the namespace and merge rules.
//!
//! One builder instance owns all state for one load pass. On any fatal
//! error the caller must discard the builder; partially recorded state is
//! never exported because only `validation::validate` can turn a builder
//! into a `Network`.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::document::schema::{ConnectionDecl, ModuleDecl, ModulePortDecl, PortDecl};
use crate::document::StructuralError;
use crate::network::descriptor::{ConnectionDescriptor, Direction, ModuleDescriptor};
use crate::network::hierarchy::HierarchyRegistry;
use crate::network::namespace::qualify;
use crate::network::ports::{PortError, PortRegistry};
use crate::resolve::ConnectionError;
use crate::validation::error::BuildError;

#[derive(Debug, Default)]
pub struct NetworkBuilder {
    /// Base namespace of the document currently being ingested.
    base: String,
    /// `Type` of the document currently being ingested.
    doc_kind: String,
    modules: BTreeMap<String, ModuleDescriptor>,
    hierarchy: HierarchyRegistry,
    ports: PortRegistry,
    connections: BTreeMap<String, ConnectionDescriptor>,
    comments: BTreeMap<String, String>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts ingesting a document: records its header comment and makes
    /// its base namespace and kind current for subsequent declarations.
    pub fn begin_document(&mut self, name: &str, base: &str, kind: &str, comment: Option<&str>) {
        self.base = base.trim().to_string();
        self.doc_kind = kind.trim().to_string();
        if let Some(comment) = comment {
            self.comments
                .insert(format!("Header.{name}"), comment.to_string());
        }
    }

    /// Declares a module, merging with any earlier declaration of the
    /// same qualified name.
    pub fn declare_module(&mut self, decl: &ModuleDecl) -> Result<(), BuildError> {
        let name = required(decl.name.as_deref(), "Modules", "Name")?;
        let qualified = qualify(&self.base, name);

        // Inline port entries contribute local names to the module's port
        // list; the full (v2) form also registers the port itself, with
        // the module reference implied.
        let mut port_names = Vec::new();
        for entry in &decl.ports {
            if let Some(local) = entry.local_name() {
                if !local.is_empty() {
                    port_names.push(local.to_string());
                }
            }
            if let ModulePortDecl::Full(port) = entry {
                self.declare_port_for(port, Some(&qualified))?;
            }
        }

        let impl_class = decl.impl_class.as_deref().unwrap_or("").trim().to_string();
        if impl_class.is_empty() && self.doc_kind == "C" {
            return Err(StructuralError::ImplClassRequired {
                module: qualified,
            }
            .into());
        }

        match self.modules.get_mut(&qualified) {
            Some(existing) => {
                if !impl_class.is_empty() {
                    if !existing.impl_class.is_empty() && existing.impl_class != impl_class {
                        warn!(
                            module = %qualified,
                            old = %existing.impl_class,
                            new = %impl_class,
                            "ImplClass replaced"
                        );
                    }
                    existing.impl_class = impl_class;
                }
                for port in port_names {
                    if !existing.ports.iter().any(|p| *p == port) {
                        existing.ports.push(port);
                    }
                }
            }
            None => {
                let mut ports = Vec::new();
                for port in port_names {
                    if !ports.iter().any(|p| *p == port) {
                        ports.push(port);
                    }
                }
                self.modules.insert(
                    qualified.clone(),
                    ModuleDescriptor {
                        name: qualified.clone(),
                        ports,
                        impl_class,
                    },
                );
            }
        }

        if let Some(super_module) = decl.super_module.as_deref() {
            let super_module = super_module.trim();
            if !super_module.is_empty() {
                let super_module = qualify(&self.base, super_module);
                self.hierarchy.record_edge(&super_module, &qualified);
            }
        }
        for sub in &decl.sub_modules {
            let sub = sub.trim();
            if !sub.is_empty() {
                let sub = qualify(&self.base, sub);
                self.hierarchy.record_edge(&qualified, &sub);
            }
        }

        if let Some(comment) = decl.comment.as_deref() {
            self.comments
                .insert(format!("Modules.{qualified}"), comment.to_string());
        }
        Ok(())
    }

    /// Declares a port from the top-level `Ports` section.
    pub fn declare_port(&mut self, decl: &PortDecl) -> Result<(), BuildError> {
        self.declare_port_for(decl, None)
    }

    fn declare_port_for(
        &mut self,
        decl: &PortDecl,
        implied_module: Option<&str>,
    ) -> Result<(), BuildError> {
        let name = required(decl.name.as_deref(), "Ports", "Name")?;
        let module = match implied_module {
            // Inline declarations always belong to the enclosing module.
            Some(module) => module.to_string(),
            None => qualify(&self.base, required(decl.module.as_deref(), "Ports", "Module")?),
        };
        let qualified = format!("{module}.{name}");

        let direction_str = required(decl.direction.as_deref(), "Ports", "Type")?;
        let direction = Direction::parse(direction_str).ok_or_else(|| PortError::InvalidDirection {
            port: qualified.clone(),
            given: direction_str.to_string(),
        })?;

        let width = match &decl.shape {
            None => None,
            Some(shape) => match shape.as_slice() {
                [w] if *w >= 1 && *w <= u32::MAX as i64 => Some(*w as u32),
                _ => {
                    return Err(PortError::InvalidWidth {
                        port: qualified,
                    }
                    .into())
                }
            },
        };

        self.ports.declare(&module, name, direction, width)?;

        if let Some(comment) = decl.comment.as_deref() {
            self.comments
                .insert(format!("Ports.{qualified}"), comment.to_string());
        }
        Ok(())
    }

    /// Declares a connection. Redeclarations under the same name are
    /// fragments of one logical pairing: identical endpoints merge
    /// silently, differing endpoints conflict fatally.
    pub fn declare_connection(&mut self, decl: &ConnectionDecl) -> Result<(), BuildError> {
        let name = required(decl.name.as_deref(), "Connections", "Name")?;
        let from_module = qualify(
            &self.base,
            required(decl.from_module.as_deref(), "Connections", "FromModule")?,
        );
        let from_port = required(decl.from_port.as_deref(), "Connections", "FromPort")?;
        let to_module = qualify(
            &self.base,
            required(decl.to_module.as_deref(), "Connections", "ToModule")?,
        );
        let to_port = required(decl.to_port.as_deref(), "Connections", "ToPort")?;

        let descriptor = ConnectionDescriptor {
            name: name.to_string(),
            from_port: format!("{from_module}.{from_port}"),
            to_port: format!("{to_module}.{to_port}"),
        };

        match self.connections.get(name) {
            Some(existing) if *existing != descriptor => {
                return Err(ConnectionError::FragmentConflict {
                    connection: name.to_string(),
                    existing_from: existing.from_port.clone(),
                    existing_to: existing.to_port.clone(),
                    new_from: descriptor.from_port,
                    new_to: descriptor.to_port,
                }
                .into());
            }
            Some(_) => {
                debug!(connection = name, "duplicate connection fragment merged");
            }
            None => {
                self.connections.insert(name.to_string(), descriptor);
            }
        }

        if let Some(comment) = decl.comment.as_deref() {
            self.comments
                .insert(format!("Connections.{name}"), comment.to_string());
        }
        Ok(())
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.values()
    }

    pub fn module(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules.get(name)
    }

    pub fn contains_module(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn hierarchy(&self) -> &HierarchyRegistry {
        &self.hierarchy
    }

    pub fn ports(&self) -> &PortRegistry {
        &self.ports
    }

    pub fn connections(&self) -> impl Iterator<Item = &ConnectionDescriptor> {
        self.connections.values()
    }

    pub fn comments(&self) -> &BTreeMap<String, String> {
        &self.comments
    }

    /// Current document kind (header `Type`), empty before any document.
    pub fn doc_kind(&self) -> &str {
        &self.doc_kind
    }

    #[allow(clippy::type_complexity)]
    pub(crate) fn into_parts(
        self,
    ) -> (
        BTreeMap<String, ModuleDescriptor>,
        HierarchyRegistry,
        PortRegistry,
        BTreeMap<String, ConnectionDescriptor>,
        BTreeMap<String, String>,
    ) {
        (
            self.modules,
            self.hierarchy,
            self.ports,
            self.connections,
            self.comments,
        )
    }
}

fn required<'a>(
    value: Option<&'a str>,
    section: &'static str,
    field: &'static str,
) -> Result<&'a str, StructuralError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(StructuralError::MissingField { section, field }),
    }
}
