//! String-keyed component factories.
//!
//! Replaces the late-bound symbol lookup of older interpreters for this
//! format: an engine populates the registry at startup and the core only
//! ever sees "resolved" or "not found".

use std::collections::BTreeMap;
use std::fmt;

use crate::engine::EngineError;

type Factory<T> = Box<dyn Fn() -> T>;

/// Maps `ImplClass` identifiers to factories producing component values
/// of the engine's own type `T`.
#[derive(Default)]
pub struct ComponentRegistry<T> {
    factories: BTreeMap<String, Factory<T>>,
}

impl<T> ComponentRegistry<T> {
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registers a factory under `impl_ref`, replacing any earlier one.
    pub fn register(&mut self, impl_ref: &str, factory: impl Fn() -> T + 'static) {
        self.factories.insert(impl_ref.to_string(), Box::new(factory));
    }

    pub fn contains(&self, impl_ref: &str) -> bool {
        self.factories.contains_key(impl_ref)
    }

    /// Runs the factory registered under `impl_ref`.
    pub fn instantiate(&self, impl_ref: &str) -> Result<T, EngineError> {
        match self.factories.get(impl_ref) {
            Some(factory) => Ok(factory()),
            None => Err(EngineError::ComponentNotFound {
                impl_ref: impl_ref.to_string(),
            }),
        }
    }
}

impl<T> fmt::Debug for ComponentRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("impl_refs", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_factories_resolve_and_instantiate() {
        let mut registry: ComponentRegistry<u32> = ComponentRegistry::new();
        registry.register("impl.Answer", || 42);

        assert!(registry.contains("impl.Answer"));
        assert_eq!(registry.instantiate("impl.Answer").unwrap(), 42);
    }

    #[test]
    fn unknown_impl_refs_report_not_found() {
        let registry: ComponentRegistry<u32> = ComponentRegistry::new();
        assert!(!registry.contains("impl.Ghost"));
        assert_eq!(
            registry.instantiate("impl.Ghost").unwrap_err(),
            EngineError::ComponentNotFound {
                impl_ref: "impl.Ghost".into()
            }
        );
    }

    #[test]
    fn re_registration_replaces_the_factory() {
        let mut registry: ComponentRegistry<u32> = ComponentRegistry::new();
        registry.register("impl.X", || 1);
        registry.register("impl.X", || 2);
        assert_eq!(registry.instantiate("impl.X").unwrap(), 2);
    }
}
