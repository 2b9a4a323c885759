//! An in-memory engine that records every construction call.
//!
//! Useful for dry runs and for tests: it tracks which ports exist on each
//! instance and flags any alias/connect call that touches a port never
//! created, instead of panicking.

use std::collections::BTreeMap;

use crate::engine::registry::ComponentRegistry;
use crate::engine::{EngineError, ExecutionEngine};

/// One recorded instance.
#[derive(Debug, Clone, Default)]
pub struct Instance {
    pub name: String,
    /// `None` for composite modules and the aggregate.
    pub impl_ref: Option<String>,
    pub in_ports: BTreeMap<String, u32>,
    pub out_ports: BTreeMap<String, u32>,
    pub children: Vec<u32>,
}

/// One recorded wiring call, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WiringCall {
    AliasIn {
        parent: u32,
        parent_port: String,
        child: u32,
        child_port: String,
    },
    AliasOut {
        child: u32,
        child_port: String,
        parent: u32,
        parent_port: String,
    },
    Connect {
        from: u32,
        from_port: String,
        to: u32,
        to_port: String,
    },
}

#[derive(Debug, Default)]
pub struct RecordingEngine {
    registry: ComponentRegistry<()>,
    instances: Vec<Instance>,
    wiring: Vec<WiringCall>,
    violations: Vec<String>,
    agent: Option<u32>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `impl_ref` resolvable.
    pub fn register_component(&mut self, impl_ref: &str) {
        self.registry.register(impl_ref, || ());
    }

    pub fn instance(&self, handle: u32) -> &Instance {
        &self.instances[handle as usize]
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Finds an instance by name (qualified module name or agent name).
    pub fn find(&self, name: &str) -> Option<(u32, &Instance)> {
        self.instances
            .iter()
            .enumerate()
            .find(|(_, i)| i.name == name)
            .map(|(idx, i)| (idx as u32, i))
    }

    pub fn wiring(&self) -> &[WiringCall] {
        &self.wiring
    }

    /// Wiring calls that referenced a port never created. Empty on any
    /// correct assembly.
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    fn push(&mut self, instance: Instance) -> u32 {
        self.instances.push(instance);
        (self.instances.len() - 1) as u32
    }

    fn require_port(&mut self, handle: u32, port: &str, output: bool, call: &str) {
        let instance = &self.instances[handle as usize];
        let ports = if output {
            &instance.out_ports
        } else {
            &instance.in_ports
        };
        if !ports.contains_key(port) {
            self.violations.push(format!(
                "{call} touched missing port `{port}` on `{}`",
                instance.name
            ));
        }
    }
}

impl ExecutionEngine for RecordingEngine {
    type Handle = u32;

    fn create_module(&mut self, name: &str) -> u32 {
        self.push(Instance {
            name: name.to_string(),
            ..Instance::default()
        })
    }

    fn create_component(&mut self, name: &str, impl_ref: &str) -> Result<u32, EngineError> {
        self.registry.instantiate(impl_ref)?;
        Ok(self.push(Instance {
            name: name.to_string(),
            impl_ref: Some(impl_ref.to_string()),
            ..Instance::default()
        }))
    }

    fn has_component(&self, impl_ref: &str) -> bool {
        self.registry.contains(impl_ref)
    }

    fn make_input_port(&mut self, instance: u32, port: &str, width: u32) {
        self.instances[instance as usize]
            .in_ports
            .insert(port.to_string(), width);
    }

    fn make_output_port(&mut self, instance: u32, port: &str, width: u32) {
        self.instances[instance as usize]
            .out_ports
            .insert(port.to_string(), width);
    }

    fn create_agent(&mut self) -> u32 {
        if let Some(agent) = self.agent {
            return agent;
        }
        let agent = self.push(Instance {
            name: "<agent>".to_string(),
            ..Instance::default()
        });
        self.agent = Some(agent);
        agent
    }

    fn add_submodule(&mut self, parent: u32, _name: &str, child: u32) {
        self.instances[parent as usize].children.push(child);
    }

    fn alias_input_port(&mut self, parent: u32, parent_port: &str, child: u32, child_port: &str) {
        self.require_port(parent, parent_port, false, "alias_input_port");
        self.require_port(child, child_port, false, "alias_input_port");
        self.wiring.push(WiringCall::AliasIn {
            parent,
            parent_port: parent_port.to_string(),
            child,
            child_port: child_port.to_string(),
        });
    }

    fn alias_output_port(&mut self, child: u32, child_port: &str, parent: u32, parent_port: &str) {
        self.require_port(child, child_port, true, "alias_output_port");
        self.require_port(parent, parent_port, true, "alias_output_port");
        self.wiring.push(WiringCall::AliasOut {
            child,
            child_port: child_port.to_string(),
            parent,
            parent_port: parent_port.to_string(),
        });
    }

    fn connect(&mut self, from: u32, from_port: &str, to: u32, to_port: &str) {
        self.require_port(from, from_port, true, "connect");
        self.require_port(to, to_port, false, "connect");
        self.wiring.push(WiringCall::Connect {
            from,
            from_port: from_port.to_string(),
            to,
            to_port: to_port.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_instances_ports_and_wiring() {
        let mut engine = RecordingEngine::new();
        engine.register_component("impl.B");

        let a = engine.create_module("ns.A");
        let b = engine.create_component("ns.B", "impl.B").unwrap();
        engine.make_input_port(a, "in", 3);
        engine.make_input_port(b, "in", 3);
        engine.alias_input_port(a, "in", b, "in");

        assert_eq!(engine.instance(a).name, "ns.A");
        assert_eq!(engine.instance(b).impl_ref.as_deref(), Some("impl.B"));
        assert_eq!(engine.wiring().len(), 1);
        assert!(engine.violations().is_empty());
    }

    #[test]
    fn flags_wiring_against_missing_ports() {
        let mut engine = RecordingEngine::new();
        let a = engine.create_module("ns.A");
        let b = engine.create_module("ns.B");
        engine.connect(a, "ghost", b, "ghost");
        assert_eq!(engine.violations().len(), 2);
    }

    #[test]
    fn unknown_components_fail_creation() {
        let mut engine = RecordingEngine::new();
        assert!(!engine.has_component("impl.Ghost"));
        assert!(engine.create_component("ns.X", "impl.Ghost").is_err());
    }

    #[test]
    fn the_agent_is_created_once() {
        let mut engine = RecordingEngine::new();
        assert_eq!(engine.create_agent(), engine.create_agent());
    }
}
