//! Bottom-up construction of the live object graph.

use std::collections::BTreeMap;

use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use tracing::debug;

use crate::engine::ExecutionEngine;
use crate::network::descriptor::Direction;
use crate::network::Network;
use crate::validation::error::{BuildError, GroundingError};

/// Walks a validated network and issues construction calls against an
/// engine: instances and their ports first (descendants before parents),
/// then containment, then wiring. Returns the top-level aggregate handle.
pub struct Assembler<'a> {
    network: &'a Network,
}

impl<'a> Assembler<'a> {
    pub fn new(network: &'a Network) -> Self {
        Self { network }
    }

    pub fn assemble<E: ExecutionEngine>(&self, engine: &mut E) -> Result<E::Handle, BuildError> {
        let order = self.bottom_up_order();
        let hierarchy = self.network.hierarchy();
        let links = self.network.links();

        // Instances and ports. Every registered port of a module is
        // created here, so later wiring can never touch a port that does
        // not exist on its instance.
        let mut handles: BTreeMap<&str, E::Handle> = BTreeMap::new();
        for &name in &order {
            let module = self
                .network
                .module(name)
                .expect("BUG: ordered module missing from the registry");
            let handle = if hierarchy.is_leaf(name) {
                engine
                    .create_component(name, &module.impl_class)
                    .map_err(|_| GroundingError::ComponentNotFound {
                        module: name.to_string(),
                        impl_class: module.impl_class.clone(),
                    })?
            } else {
                engine.create_module(name)
            };
            debug!(module = name, leaf = hierarchy.is_leaf(name), "created instance");

            for port in self.network.ports().iter().filter(|p| p.module == name) {
                let width = port
                    .width
                    .expect("BUG: validated port has no width");
                match port.direction {
                    Direction::Input => engine.make_input_port(handle, port.local(), width),
                    Direction::Output => engine.make_output_port(handle, port.local(), width),
                }
            }
            handles.insert(name, handle);
        }

        // Containment: every module attaches to its parent's instance, or
        // to the implicit aggregate when parentless.
        let agent = engine.create_agent();
        for &name in &order {
            let parent = match hierarchy.super_of(name) {
                Some(super_module) => handles[super_module],
                None => agent,
            };
            engine.add_submodule(parent, name, handles[name]);
        }

        // Wiring, descendants before parents: aliases between a composite
        // and its direct subs, then peer links among those subs.
        for &name in &order {
            let subs = hierarchy.subs_of(name);
            for sub in subs {
                for pair in links.aliases_into(name, sub) {
                    debug!(parent = name, sub = %sub, port = %pair.from, "inward alias");
                    engine.alias_input_port(handles[name], &pair.from, handles[sub.as_str()], &pair.to);
                }
                for pair in links.aliases_out_of(sub, name) {
                    debug!(parent = name, sub = %sub, port = %pair.to, "outward alias");
                    engine.alias_output_port(handles[sub.as_str()], &pair.from, handles[name], &pair.to);
                }
            }
            self.wire_siblings(engine, &handles, subs.iter().map(String::as_str));
        }

        // Peer links among top-level modules.
        self.wire_siblings(
            engine,
            &handles,
            order
                .iter()
                .copied()
                .filter(|name| hierarchy.super_of(name).is_none()),
        );

        Ok(agent)
    }

    fn wire_siblings<'s, E: ExecutionEngine>(
        &self,
        engine: &mut E,
        handles: &BTreeMap<&str, E::Handle>,
        siblings: impl Iterator<Item = &'s str> + Clone,
    ) {
        let links = self.network.links();
        for from in siblings.clone() {
            for to in siblings.clone() {
                if from == to {
                    continue;
                }
                for pair in links.peers_between(from, to) {
                    debug!(from, to, port = %pair.from, "peer connection");
                    engine.connect(handles[from], &pair.from, handles[to], &pair.to);
                }
            }
        }
    }

    /// Instantiation order: every module after all of its descendants.
    /// The containment relation was proven acyclic during validation, so
    /// the sort cannot fail on a `Network`.
    fn bottom_up_order(&self) -> Vec<&'a str> {
        let mut graph = DiGraph::<&str, ()>::new();
        let mut index = BTreeMap::new();
        for module in self.network.modules() {
            let ix = graph.add_node(module.name.as_str());
            index.insert(module.name.as_str(), ix);
        }
        for (sub, super_module) in self.network.hierarchy().super_entries() {
            graph.add_edge(index[super_module], index[sub], ());
        }

        let sorted = toposort(&graph, None)
            .expect("BUG: validated hierarchy contains a containment cycle");
        sorted.into_iter().rev().map(|ix| graph[ix]).collect()
    }
}
