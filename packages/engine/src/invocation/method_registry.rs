// packages/engine/src/invocation/method_registry.rs
//! Process-wide lookup from method identity to static signature
//!
//! Surrogates register their signatures when a transportable mock is
//! created so that serializable descriptors arriving from elsewhere can be
//! bound back to a real implementation.

use crate::invocation::method::{MethodKey, MethodSignature};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::trace;

static GLOBAL: Lazy<MethodRegistry> = Lazy::new(MethodRegistry::new);

/// Concurrent registry of method signatures
#[derive(Debug, Default)]
pub struct MethodRegistry {
    signatures: DashMap<MethodKey, &'static MethodSignature>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self {
            signatures: DashMap::new(),
        }
    }

    pub fn global() -> &'static MethodRegistry {
        &GLOBAL
    }

    /// Register a signature; re-registering the same method is a no-op
    pub fn register(&self, signature: &'static MethodSignature) {
        let key = signature.key();
        trace!("Registering method {}", key);
        self.signatures.entry(key).or_insert(signature);
    }

    pub fn register_all(&self, signatures: &[&'static MethodSignature]) {
        for signature in signatures {
            self.register(signature);
        }
    }

    pub fn lookup(&self, key: &MethodKey) -> Option<&'static MethodSignature> {
        self.signatures.get(key).map(|entry| *entry.value())
    }

    pub fn contains(&self, key: &MethodKey) -> bool {
        self.signatures.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::value::ValueKind;

    static FIRST: MethodSignature = MethodSignature::new("Shelf", "first", &[], ValueKind::Str);
    static PUT: MethodSignature =
        MethodSignature::new("Shelf", "put", &["usize", "String"], ValueKind::Unit);

    #[test]
    fn test_register_and_lookup() {
        let registry = MethodRegistry::new();
        assert!(registry.is_empty());

        registry.register_all(&[&FIRST, &PUT]);
        assert_eq!(registry.len(), 2);

        let found = registry.lookup(&PUT.key()).unwrap();
        assert!(std::ptr::eq(found, &PUT));
    }

    #[test]
    fn test_overloads_are_distinct() {
        static PUT_ONE: MethodSignature =
            MethodSignature::new("Shelf", "put", &["String"], ValueKind::Unit);

        let registry = MethodRegistry::new();
        registry.register(&PUT);
        assert!(!registry.contains(&PUT_ONE.key()));

        registry.register(&PUT_ONE);
        registry.register(&PUT_ONE);
        assert_eq!(registry.len(), 2);
    }
}
