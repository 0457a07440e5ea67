//! The pluggable syntax registry.
//!
//! A concurrent mapping from syntax identifier to a stateless factory that
//! produces fresh deserializer instances. The registry is an explicitly
//! constructed, cloneable handle (clones share one table) so tests and
//! embedders can hold isolated instances; process-wide lifetime is the
//! hosting application's business. Registration, unregistration and lookup
//! may run from any thread at any time; `create` sees a consistent — if
//! possibly stale — snapshot of the table.

use std::sync::{Arc, PoisonError, RwLock};

use ahash::AHashMap;
use tracing::debug;

use crate::deserializer::Deserializer;
use crate::ltm::LtmFactory;
use crate::syntax::Syntax;

/// Produces fresh, independent deserializer instances for one syntax.
///
/// Factories own no per-parse state; every [`DeserializerFactory::create`]
/// call returns a new instance.
pub trait DeserializerFactory: Send + Sync {
    /// The syntax this factory serves.
    fn syntax(&self) -> Syntax;

    /// A fresh deserializer for one parse session.
    fn create(&self) -> Box<dyn Deserializer>;
}

/// Shared factory table. Cloning the registry clones the handle, not the
/// table.
#[derive(Clone)]
pub struct SyntaxRegistry {
    factories: Arc<RwLock<AHashMap<String, Arc<dyn DeserializerFactory>>>>,
}

/// Identifiers are matched case-insensitively.
fn key_for(syntax: &Syntax) -> String {
    syntax.name().to_ascii_lowercase()
}

impl SyntaxRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            factories: Arc::new(RwLock::new(AHashMap::new())),
        }
    }

    /// A registry pre-populated with the factories this crate ships.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(LtmFactory));
        registry
    }

    /// Register `factory` under its syntax identifier.
    ///
    /// The last registration for an identifier wins; any prior factory for
    /// the same identifier is discarded.
    pub fn register(&self, factory: Arc<dyn DeserializerFactory>) {
        let key = key_for(&factory.syntax());
        debug!(syntax = %factory.syntax(), "registering deserializer factory");
        self.factories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, factory);
    }

    /// Remove `factory` if it is still the one registered for its syntax.
    ///
    /// A no-op when some other factory has taken the identifier over in the
    /// meantime, or when nothing is registered.
    pub fn unregister(&self, factory: &Arc<dyn DeserializerFactory>) {
        let key = key_for(&factory.syntax());
        let mut factories = self
            .factories
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if factories
            .get(&key)
            .is_some_and(|current| Arc::ptr_eq(current, factory))
        {
            debug!(syntax = %factory.syntax(), "unregistering deserializer factory");
            factories.remove(&key);
        }
    }

    /// A fresh deserializer for `syntax`, or `None` when no factory is
    /// registered — a normal, checkable outcome, not an error.
    pub fn create(&self, syntax: &Syntax) -> Option<Box<dyn Deserializer>> {
        let factory = self
            .factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key_for(syntax))
            .cloned();
        factory.map(|f| f.create())
    }

    /// The number of registered factories.
    pub fn len(&self) -> usize {
        self.factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SyntaxRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SyntaxRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|factory| factory.syntax().name().to_string())
            .collect();
        f.debug_struct("SyntaxRegistry")
            .field("syntaxes", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ltm::LtmDeserializer;
    use crate::syntax;

    /// Test factory that tags the instances it makes via a property.
    struct Tagged(&'static str);

    impl DeserializerFactory for Tagged {
        fn syntax(&self) -> Syntax {
            syntax::LTM
        }

        fn create(&self) -> Box<dyn Deserializer> {
            let mut deserializer = LtmDeserializer::new();
            deserializer.set_property("tag", self.0.into());
            Box::new(deserializer)
        }
    }

    fn tag_of(deserializer: &dyn Deserializer) -> Option<String> {
        deserializer
            .property("tag")
            .and_then(|p| p.as_str())
            .map(str::to_string)
    }

    #[test]
    fn create_returns_none_for_unknown_syntax() {
        let registry = SyntaxRegistry::new();
        assert!(registry.create(&syntax::LTM).is_none());
    }

    #[test]
    fn last_registration_wins() {
        let registry = SyntaxRegistry::new();
        let first: Arc<dyn DeserializerFactory> = Arc::new(Tagged("first"));
        let second: Arc<dyn DeserializerFactory> = Arc::new(Tagged("second"));
        registry.register(first);
        registry.register(second);
        let made = registry.create(&syntax::LTM).unwrap();
        assert_eq!(tag_of(made.as_ref()).as_deref(), Some("second"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_removes_only_the_current_factory() {
        let registry = SyntaxRegistry::new();
        let stale: Arc<dyn DeserializerFactory> = Arc::new(Tagged("stale"));
        let current: Arc<dyn DeserializerFactory> = Arc::new(Tagged("current"));
        registry.register(stale.clone());
        registry.register(current.clone());
        // The replaced factory no longer matches; nothing happens.
        registry.unregister(&stale);
        assert!(registry.create(&syntax::LTM).is_some());
        registry.unregister(&current);
        assert!(registry.create(&syntax::LTM).is_none());
    }

    #[test]
    fn builtins_include_ltm() {
        let registry = SyntaxRegistry::with_builtins();
        assert!(registry.create(&syntax::LTM).is_some());
        assert!(registry.create(&syntax::XTM).is_none());
    }

    #[test]
    fn clones_share_the_table() {
        let registry = SyntaxRegistry::new();
        let clone = registry.clone();
        clone.register(Arc::new(Tagged("shared")));
        assert!(registry.create(&syntax::LTM).is_some());
    }

    #[test]
    fn registry_is_usable_across_threads() {
        let registry = SyntaxRegistry::new();
        let worker = {
            let registry = registry.clone();
            std::thread::spawn(move || {
                registry.register(Arc::new(Tagged("threaded")));
            })
        };
        worker.join().expect("registration thread panicked");
        assert!(registry.create(&syntax::LTM).is_some());
    }
}
