//! Descriptor registries and the frozen network produced by validation.
pub mod builder;
pub mod descriptor;
pub mod hierarchy;
pub mod namespace;
pub mod ports;

use std::collections::BTreeMap;

use crate::network::builder::NetworkBuilder;
use crate::network::descriptor::{ConnectionDescriptor, ModuleDescriptor};
use crate::network::hierarchy::HierarchyRegistry;
use crate::network::ports::PortRegistry;
use crate::resolve::LinkTable;

/// A fully validated network: descriptors plus the resolved link table.
///
/// Only `validation::validate` constructs one, so holding a `Network`
/// means both validation phases passed. The assembler consumes it once.
#[derive(Debug)]
pub struct Network {
    pub(crate) modules: BTreeMap<String, ModuleDescriptor>,
    pub(crate) hierarchy: HierarchyRegistry,
    pub(crate) ports: PortRegistry,
    pub(crate) connections: BTreeMap<String, ConnectionDescriptor>,
    pub(crate) links: LinkTable,
    pub(crate) comments: BTreeMap<String, String>,
}

impl Network {
    pub(crate) fn new(builder: NetworkBuilder, links: LinkTable) -> Self {
        let (modules, hierarchy, ports, connections, comments) = builder.into_parts();
        Self {
            modules,
            hierarchy,
            ports,
            connections,
            links,
            comments,
        }
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.values()
    }

    pub fn module(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules.get(name)
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

    pub fn links(&self) -> &LinkTable {
        &self.links
    }

    /// Comments gathered from every declaration, keyed
    /// `"Header.<name>"` / `"Modules.<name>"` / `"Ports.<name>"` /
    /// `"Connections.<name>"`.
    pub fn comments(&self) -> &BTreeMap<String, String> {
        &self.comments
    }
}
