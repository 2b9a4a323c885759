//! Super/sub containment registry with loop detection.
//!
//! Edges arrive from two directions in the document format: a child's
//! `SuperModule` field or a parent's `SubModules` list. Both feed the
//! same pair of maps, which therefore stay mutually consistent by
//! construction. Keys are qualified module names.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("super module `{super_module}` of `{module}` is not a declared module")]
    UndefinedSuper { module: String, super_module: String },

    #[error("sub module `{sub_module}` of `{module}` is not a declared module")]
    UndefinedSub { module: String, sub_module: String },

    #[error("containment loop detected while attaching `{sub}` under `{super_module}`")]
    Loop { super_module: String, sub: String },
}

#[derive(Debug, Clone, Default)]
pub struct HierarchyRegistry {
    /// Sub -> its single super-module.
    super_of: BTreeMap<String, String>,
    /// Super -> its sub-modules, in first-declaration order, deduplicated.
    subs_of: BTreeMap<String, Vec<String>>,
}

impl HierarchyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `super_module` as the parent of `module`.
    ///
    /// A module has at most one parent: a later declaration naming a
    /// different parent overrides the earlier one with a warning, and the
    /// module leaves the old parent's sub list.
    pub fn record_edge(&mut self, super_module: &str, module: &str) {
        if let Some(previous) = self.super_of.get(module) {
            if previous != super_module {
                warn!(
                    module,
                    old = %previous,
                    new = %super_module,
                    "super module replaced"
                );
                let old = previous.clone();
                if let Some(subs) = self.subs_of.get_mut(&old) {
                    subs.retain(|s| s != module);
                }
            }
        }
        self.super_of
            .insert(module.to_string(), super_module.to_string());
        let subs = self.subs_of.entry(super_module.to_string()).or_default();
        if !subs.iter().any(|s| s == module) {
            subs.push(module.to_string());
        }
    }

    pub fn super_of(&self, module: &str) -> Option<&str> {
        self.super_of.get(module).map(String::as_str)
    }

    pub fn subs_of(&self, module: &str) -> &[String] {
        self.subs_of.get(module).map_or(&[], Vec::as_slice)
    }

    /// A hierarchy leaf: no sub-modules recorded.
    pub fn is_leaf(&self, module: &str) -> bool {
        self.subs_of(module).is_empty()
    }

    /// All (sub, super) pairs, in deterministic order.
    pub fn super_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.super_of
            .iter()
            .map(|(sub, sup)| (sub.as_str(), sup.as_str()))
    }

    /// All (super, subs) pairs, in deterministic order.
    pub fn sub_entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.subs_of
            .iter()
            .map(|(sup, subs)| (sup.as_str(), subs.as_slice()))
    }

    /// True if attaching `sub` under `super_module` would close a loop:
    /// the two are the same module, or walking super links upward from
    /// `super_module` reaches `sub`. A revisited module on that walk means
    /// a loop already exists upstream, which also rejects the edge.
    pub fn loop_check(&self, super_module: &str, sub: &str) -> bool {
        if super_module == sub {
            return true;
        }
        let mut seen = BTreeSet::new();
        let mut current = super_module;
        while let Some(upper) = self.super_of(current) {
            if upper == sub {
                return true;
            }
            if !seen.insert(upper) {
                return true;
            }
            current = upper;
        }
        false
    }
}
