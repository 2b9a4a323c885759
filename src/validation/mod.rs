//! Two-phase network validation: structural consistency, then grounding.

pub mod error;

use tracing::warn;

use crate::engine::ExecutionEngine;
use crate::network::builder::NetworkBuilder;
use crate::network::hierarchy::HierarchyError;
use crate::network::ports::PortError;
use crate::network::Network;
use crate::resolve::{resolve_connection, LinkTable};
use crate::validation::error::{BuildError, GroundingError};

/// Runs both validation phases and freezes the builder into a `Network`.
///
/// Consistency must pass in full before grounding is attempted; the first
/// fatal error aborts. On success the builder's descriptor set is frozen
/// and nothing can be declared into it anymore.
pub fn validate<E: ExecutionEngine>(
    builder: NetworkBuilder,
    engine: &E,
) -> Result<Network, BuildError> {
    let links = {
        let validator = Validator::new(&builder);
        let links = validator.check_consistency()?;
        validator.check_grounding(engine)?;
        links
    };
    Ok(Network::new(builder, links))
}

/// Borrows a builder and checks it; produces the resolved link table as a
/// side product of the connection checks.
pub struct Validator<'a> {
    builder: &'a NetworkBuilder,
}

impl<'a> Validator<'a> {
    pub fn new(builder: &'a NetworkBuilder) -> Self {
        Self { builder }
    }

    /// Phase one. Checks, in order: super references, sub references,
    /// containment cycles (from both edge directions), module port lists,
    /// port targets and widths, and finally every connection.
    pub fn check_consistency(&self) -> Result<LinkTable, BuildError> {
        let hierarchy = self.builder.hierarchy();
        let ports = self.builder.ports();

        for (sub, super_module) in hierarchy.super_entries() {
            if !self.builder.contains_module(super_module) {
                return Err(HierarchyError::UndefinedSuper {
                    module: sub.to_string(),
                    super_module: super_module.to_string(),
                }
                .into());
            }
            if hierarchy.loop_check(super_module, sub) {
                return Err(HierarchyError::Loop {
                    super_module: super_module.to_string(),
                    sub: sub.to_string(),
                }
                .into());
            }
        }

        for (super_module, subs) in hierarchy.sub_entries() {
            for sub in subs {
                if !self.builder.contains_module(sub) {
                    return Err(HierarchyError::UndefinedSub {
                        module: super_module.to_string(),
                        sub_module: sub.to_string(),
                    }
                    .into());
                }
                if hierarchy.loop_check(super_module, sub) {
                    return Err(HierarchyError::Loop {
                        super_module: super_module.to_string(),
                        sub: sub.to_string(),
                    }
                    .into());
                }
            }
        }

        for module in self.builder.modules() {
            if module.ports.is_empty() {
                return Err(PortError::NoPorts {
                    module: module.name.clone(),
                }
                .into());
            }
            for port in &module.ports {
                if !ports.contains(&format!("{}.{}", module.name, port)) {
                    return Err(PortError::Missing {
                        module: module.name.clone(),
                        port: port.clone(),
                    }
                    .into());
                }
            }
        }

        for port in ports.iter() {
            if !self.builder.contains_module(&port.module) {
                return Err(PortError::UndefinedModule {
                    port: port.name.clone(),
                    module: port.module.clone(),
                }
                .into());
            }
            // Positivity is enforced at declaration time; what remains to
            // check is that some declaration supplied a width at all.
            if port.width.is_none() {
                return Err(PortError::UnknownWidth {
                    port: port.name.clone(),
                }
                .into());
            }
        }

        let mut links = LinkTable::new();
        for connection in self.builder.connections() {
            links.record(resolve_connection(connection, hierarchy, ports)?);
        }
        Ok(links)
    }

    /// Phase two. Every hierarchy leaf must name an implementation the
    /// engine can resolve; composites carry no implementation.
    pub fn check_grounding<E: ExecutionEngine>(&self, engine: &E) -> Result<(), BuildError> {
        let hierarchy = self.builder.hierarchy();
        for module in self.builder.modules() {
            if hierarchy.is_leaf(&module.name) {
                if module.impl_class.is_empty() {
                    return Err(GroundingError::NotGrounded {
                        module: module.name.clone(),
                    }
                    .into());
                }
                if !engine.has_component(&module.impl_class) {
                    return Err(GroundingError::ComponentNotFound {
                        module: module.name.clone(),
                        impl_class: module.impl_class.clone(),
                    }
                    .into());
                }
            } else if !module.impl_class.is_empty() {
                warn!(
                    module = %module.name,
                    impl_class = %module.impl_class,
                    "composite module declares an ImplClass, ignoring it"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::recording::RecordingEngine;
    use crate::resolve::ConnectionError;
    use serde_json::json;

    fn decl<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    fn engine_with(impls: &[&str]) -> RecordingEngine {
        let mut engine = RecordingEngine::new();
        for impl_ref in impls {
            engine.register_component(impl_ref);
        }
        engine
    }

    /// ns.A composite with leaves ns.B (out, width 3) and ns.C (in, width 3),
    /// wired by connection c1.
    fn sibling_builder() -> NetworkBuilder {
        let mut b = NetworkBuilder::new();
        b.begin_document("doc", "ns", "A", None);
        b.declare_module(&decl(json!({
            "Name": "A", "Ports": ["in"], "SubModules": ["B", "C"]
        })))
        .unwrap();
        b.declare_module(&decl(json!({
            "Name": "B", "Ports": ["out"], "ImplClass": "impl.B"
        })))
        .unwrap();
        b.declare_module(&decl(json!({
            "Name": "C", "Ports": ["in"], "ImplClass": "impl.C"
        })))
        .unwrap();
        b.declare_port(&decl(json!({
            "Name": "in", "Module": "A", "Type": "Input", "Shape": [3]
        })))
        .unwrap();
        b.declare_port(&decl(json!({
            "Name": "out", "Module": "B", "Type": "Output", "Shape": [3]
        })))
        .unwrap();
        b.declare_port(&decl(json!({
            "Name": "in", "Module": "C", "Type": "Input", "Shape": [3]
        })))
        .unwrap();
        b.declare_connection(&decl(json!({
            "Name": "c1", "FromModule": "B", "FromPort": "out",
            "ToModule": "C", "ToPort": "in"
        })))
        .unwrap();
        b
    }

    #[test]
    fn a_consistent_grounded_network_validates() {
        let network = validate(sibling_builder(), &engine_with(&["impl.B", "impl.C"])).unwrap();
        assert_eq!(network.links().peer_count(), 1);
        assert_eq!(
            network.links().peers_between("ns.B", "ns.C")[0].from,
            "out"
        );
    }

    #[test]
    fn undefined_super_module_fails() {
        let mut b = NetworkBuilder::new();
        b.begin_document("doc", "ns", "A", None);
        b.declare_module(&decl(json!({
            "Name": "B", "Ports": ["out"], "SuperModule": "Ghost", "ImplClass": "impl.B"
        })))
        .unwrap();
        b.declare_port(&decl(json!({
            "Name": "out", "Module": "B", "Type": "Output", "Shape": [1]
        })))
        .unwrap();

        let err = Validator::new(&b).check_consistency().unwrap_err();
        assert_eq!(
            err,
            BuildError::Hierarchy(HierarchyError::UndefinedSuper {
                module: "ns.B".into(),
                super_module: "ns.Ghost".into(),
            })
        );
    }

    #[test]
    fn undefined_sub_module_fails() {
        let mut b = NetworkBuilder::new();
        b.begin_document("doc", "ns", "A", None);
        b.declare_module(&decl(json!({
            "Name": "A", "Ports": ["in"], "SubModules": ["Ghost"]
        })))
        .unwrap();
        b.declare_port(&decl(json!({
            "Name": "in", "Module": "A", "Type": "Input", "Shape": [1]
        })))
        .unwrap();

        let err = Validator::new(&b).check_consistency().unwrap_err();
        assert_eq!(
            err,
            BuildError::Hierarchy(HierarchyError::UndefinedSub {
                module: "ns.A".into(),
                sub_module: "ns.Ghost".into(),
            })
        );
    }

    #[test]
    fn containment_cycles_fail_from_either_declaration_direction() {
        // Cycle declared via SuperModule fields.
        let mut b = NetworkBuilder::new();
        b.begin_document("doc", "ns", "A", None);
        b.declare_module(&decl(json!({
            "Name": "A", "Ports": ["p"], "SuperModule": "B"
        })))
        .unwrap();
        b.declare_module(&decl(json!({
            "Name": "B", "Ports": ["p"], "SuperModule": "A"
        })))
        .unwrap();
        b.declare_port(&decl(json!({"Name": "p", "Module": "A", "Type": "Input", "Shape": [1]})))
            .unwrap();
        b.declare_port(&decl(json!({"Name": "p", "Module": "B", "Type": "Input", "Shape": [1]})))
            .unwrap();
        let err = Validator::new(&b).check_consistency().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Hierarchy(HierarchyError::Loop { .. })
        ));

        // Same cycle declared via SubModules lists.
        let mut b = NetworkBuilder::new();
        b.begin_document("doc", "ns", "A", None);
        b.declare_module(&decl(json!({
            "Name": "A", "Ports": ["p"], "SubModules": ["B"]
        })))
        .unwrap();
        b.declare_module(&decl(json!({
            "Name": "B", "Ports": ["p"], "SubModules": ["A"]
        })))
        .unwrap();
        b.declare_port(&decl(json!({"Name": "p", "Module": "A", "Type": "Input", "Shape": [1]})))
            .unwrap();
        b.declare_port(&decl(json!({"Name": "p", "Module": "B", "Type": "Input", "Shape": [1]})))
            .unwrap();
        let err = Validator::new(&b).check_consistency().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Hierarchy(HierarchyError::Loop { .. })
        ));
    }

    #[test]
    fn modules_without_ports_fail() {
        let mut b = NetworkBuilder::new();
        b.begin_document("doc", "ns", "A", None);
        b.declare_module(&decl(json!({"Name": "A", "ImplClass": "impl.A"})))
            .unwrap();
        let err = Validator::new(&b).check_consistency().unwrap_err();
        assert_eq!(
            err,
            BuildError::Port(PortError::NoPorts {
                module: "ns.A".into()
            })
        );
    }

    #[test]
    fn listed_but_undeclared_ports_fail() {
        let mut b = NetworkBuilder::new();
        b.begin_document("doc", "ns", "A", None);
        b.declare_module(&decl(json!({
            "Name": "A", "Ports": ["phantom"], "ImplClass": "impl.A"
        })))
        .unwrap();
        let err = Validator::new(&b).check_consistency().unwrap_err();
        assert_eq!(
            err,
            BuildError::Port(PortError::Missing {
                module: "ns.A".into(),
                port: "phantom".into()
            })
        );
    }

    #[test]
    fn ports_without_a_width_fail() {
        let mut b = NetworkBuilder::new();
        b.begin_document("doc", "ns", "A", None);
        b.declare_module(&decl(json!({
            "Name": "A", "Ports": ["in"], "ImplClass": "impl.A"
        })))
        .unwrap();
        b.declare_port(&decl(json!({"Name": "in", "Module": "A", "Type": "Input"})))
            .unwrap();
        let err = Validator::new(&b).check_consistency().unwrap_err();
        assert_eq!(
            err,
            BuildError::Port(PortError::UnknownWidth {
                port: "ns.A.in".into()
            })
        );
    }

    #[test]
    fn inward_alias_width_mismatch_fails_before_assembly() {
        // Super module A exposes A.p width 4 into sub module B; a width-5
        // B.p must be rejected during consistency.
        let mut b = NetworkBuilder::new();
        b.begin_document("doc", "ns", "A", None);
        b.declare_module(&decl(json!({
            "Name": "A", "Ports": ["p"], "SubModules": ["B"]
        })))
        .unwrap();
        b.declare_module(&decl(json!({
            "Name": "B", "Ports": ["p"], "ImplClass": "impl.B"
        })))
        .unwrap();
        b.declare_port(&decl(json!({"Name": "p", "Module": "A", "Type": "Input", "Shape": [4]})))
            .unwrap();
        b.declare_port(&decl(json!({"Name": "p", "Module": "B", "Type": "Input", "Shape": [5]})))
            .unwrap();
        b.declare_connection(&decl(json!({
            "Name": "alias", "FromModule": "A", "FromPort": "p",
            "ToModule": "B", "ToPort": "p"
        })))
        .unwrap();

        let err = Validator::new(&b).check_consistency().unwrap_err();
        assert!(matches!(
            err,
            BuildError::Connection(ConnectionError::WidthMismatch { .. })
        ));

        // With matching widths the same wiring resolves as an inward alias.
        let mut b = NetworkBuilder::new();
        b.begin_document("doc", "ns", "A", None);
        b.declare_module(&decl(json!({
            "Name": "A", "Ports": ["p"], "SubModules": ["B"]
        })))
        .unwrap();
        b.declare_module(&decl(json!({
            "Name": "B", "Ports": ["p"], "ImplClass": "impl.B"
        })))
        .unwrap();
        b.declare_port(&decl(json!({"Name": "p", "Module": "A", "Type": "Input", "Shape": [4]})))
            .unwrap();
        b.declare_port(&decl(json!({"Name": "p", "Module": "B", "Type": "Input", "Shape": [4]})))
            .unwrap();
        b.declare_connection(&decl(json!({
            "Name": "alias", "FromModule": "A", "FromPort": "p",
            "ToModule": "B", "ToPort": "p"
        })))
        .unwrap();
        let links = Validator::new(&b).check_consistency().unwrap();
        assert_eq!(links.aliases_into("ns.A", "ns.B").len(), 1);
    }

    #[test]
    fn remote_hierarchy_spans_fail() {
        // ns.A.B and ns.C.D sit two levels apart with no direct containment.
        let mut b = NetworkBuilder::new();
        b.begin_document("doc", "ns", "A", None);
        b.declare_module(&decl(json!({
            "Name": "A", "Ports": ["p"], "SubModules": ["B", "C"]
        })))
        .unwrap();
        b.declare_module(&decl(json!({
            "Name": "B", "Ports": ["out"], "ImplClass": "impl.B"
        })))
        .unwrap();
        b.declare_module(&decl(json!({
            "Name": "C", "Ports": ["p"], "SubModules": ["D"]
        })))
        .unwrap();
        b.declare_module(&decl(json!({
            "Name": "D", "Ports": ["in"], "ImplClass": "impl.D"
        })))
        .unwrap();
        for port in [
            json!({"Name": "p", "Module": "A", "Type": "Input", "Shape": [1]}),
            json!({"Name": "out", "Module": "B", "Type": "Output", "Shape": [1]}),
            json!({"Name": "p", "Module": "C", "Type": "Input", "Shape": [1]}),
            json!({"Name": "in", "Module": "D", "Type": "Input", "Shape": [1]}),
        ] {
            b.declare_port(&decl(port)).unwrap();
        }
        b.declare_connection(&decl(json!({
            "Name": "far", "FromModule": "B", "FromPort": "out",
            "ToModule": "D", "ToPort": "in"
        })))
        .unwrap();

        let err = Validator::new(&b).check_consistency().unwrap_err();
        assert_eq!(
            err,
            BuildError::Connection(ConnectionError::RemoteLevel {
                connection: "far".into(),
                from_module: "ns.B".into(),
                to_module: "ns.D".into(),
            })
        );
    }

    #[test]
    fn leaves_without_impl_class_are_not_grounded() {
        let mut b = NetworkBuilder::new();
        b.begin_document("doc", "ns", "A", None);
        b.declare_module(&decl(json!({"Name": "B", "Ports": ["out"]})))
            .unwrap();
        b.declare_port(&decl(json!({
            "Name": "out", "Module": "B", "Type": "Output", "Shape": [1]
        })))
        .unwrap();

        let err = validate(b, &RecordingEngine::new()).unwrap_err();
        assert_eq!(
            err,
            BuildError::Grounding(GroundingError::NotGrounded {
                module: "ns.B".into()
            })
        );
    }

    #[test]
    fn unresolvable_impl_class_is_a_distinct_error() {
        let err = validate(sibling_builder(), &engine_with(&["impl.B"])).unwrap_err();
        assert_eq!(
            err,
            BuildError::Grounding(GroundingError::ComponentNotFound {
                module: "ns.C".into(),
                impl_class: "impl.C".into(),
            })
        );
    }
}
