//! Resolved wiring actions and the table the assembler consumes.

use std::collections::BTreeMap;

use smallvec::SmallVec;

/// One resolved connection. Port names are local (unqualified); the
/// module names are qualified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedLink {
    /// Same-level wiring: an output port feeding a sibling's input port.
    Peer {
        from_module: String,
        from_port: String,
        to_module: String,
        to_port: String,
    },
    /// A super-module input port passed through to a direct sub-module's
    /// input port.
    InwardAlias {
        super_module: String,
        super_port: String,
        sub_module: String,
        sub_port: String,
    },
    /// A direct sub-module's output port exposed as its super-module's
    /// output port.
    OutwardAlias {
        sub_module: String,
        sub_port: String,
        super_module: String,
        super_port: String,
    },
}

/// A single port pairing between two fixed modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortPair {
    pub from: String,
    pub to: String,
}

/// Most module pairs carry one or two pairings.
type Pairs = SmallVec<[PortPair; 2]>;

/// Resolved links keyed by the ordered module pair they connect. A pair
/// of modules may carry several distinct port pairings; all are kept.
#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    /// (from_module, to_module) -> peer pairings.
    peers: BTreeMap<(String, String), Pairs>,
    /// (super_module, sub_module) -> inward alias pairings
    /// (`from` = the super's port, `to` = the sub's port).
    alias_in: BTreeMap<(String, String), Pairs>,
    /// (sub_module, super_module) -> outward alias pairings
    /// (`from` = the sub's port, `to` = the super's port).
    alias_out: BTreeMap<(String, String), Pairs>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, link: ResolvedLink) {
        match link {
            ResolvedLink::Peer {
                from_module,
                from_port,
                to_module,
                to_port,
            } => {
                self.peers
                    .entry((from_module, to_module))
                    .or_default()
                    .push(PortPair {
                        from: from_port,
                        to: to_port,
                    });
            }
            ResolvedLink::InwardAlias {
                super_module,
                super_port,
                sub_module,
                sub_port,
            } => {
                self.alias_in
                    .entry((super_module, sub_module))
                    .or_default()
                    .push(PortPair {
                        from: super_port,
                        to: sub_port,
                    });
            }
            ResolvedLink::OutwardAlias {
                sub_module,
                sub_port,
                super_module,
                super_port,
            } => {
                self.alias_out
                    .entry((sub_module, super_module))
                    .or_default()
                    .push(PortPair {
                        from: sub_port,
                        to: super_port,
                    });
            }
        }
    }

    pub fn peers_between(&self, from_module: &str, to_module: &str) -> &[PortPair] {
        self.peers
            .get(&(from_module.to_string(), to_module.to_string()))
            .map_or(&[], |pairs| pairs.as_slice())
    }

    pub fn aliases_into(&self, super_module: &str, sub_module: &str) -> &[PortPair] {
        self.alias_in
            .get(&(super_module.to_string(), sub_module.to_string()))
            .map_or(&[], |pairs| pairs.as_slice())
    }

    pub fn aliases_out_of(&self, sub_module: &str, super_module: &str) -> &[PortPair] {
        self.alias_out
            .get(&(sub_module.to_string(), super_module.to_string()))
            .map_or(&[], |pairs| pairs.as_slice())
    }

    pub fn peer_count(&self) -> usize {
        self.peers.values().map(|pairs| pairs.len()).sum()
    }

    pub fn alias_count(&self) -> usize {
        self.alias_in.values().map(|pairs| pairs.len()).sum::<usize>()
            + self.alias_out.values().map(|pairs| pairs.len()).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiple_pairings_per_module_pair_are_all_kept() {
        let mut table = LinkTable::new();
        table.record(ResolvedLink::Peer {
            from_module: "ns.B".into(),
            from_port: "out1".into(),
            to_module: "ns.C".into(),
            to_port: "in1".into(),
        });
        table.record(ResolvedLink::Peer {
            from_module: "ns.B".into(),
            from_port: "out2".into(),
            to_module: "ns.C".into(),
            to_port: "in2".into(),
        });

        let pairs = table.peers_between("ns.B", "ns.C");
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].from, "out1");
        assert_eq!(pairs[1].to, "in2");
        // The reverse direction is a different ordered pair.
        assert!(table.peers_between("ns.C", "ns.B").is_empty());
    }

    #[test]
    fn aliases_are_keyed_by_their_own_module_order() {
        let mut table = LinkTable::new();
        table.record(ResolvedLink::InwardAlias {
            super_module: "ns.A".into(),
            super_port: "in".into(),
            sub_module: "ns.B".into(),
            sub_port: "in".into(),
        });
        table.record(ResolvedLink::OutwardAlias {
            sub_module: "ns.B".into(),
            sub_port: "out".into(),
            super_module: "ns.A".into(),
            super_port: "out".into(),
        });

        assert_eq!(table.aliases_into("ns.A", "ns.B").len(), 1);
        assert_eq!(table.aliases_out_of("ns.B", "ns.A").len(), 1);
        assert_eq!(table.alias_count(), 2);
        assert_eq!(table.peer_count(), 0);
    }
}
