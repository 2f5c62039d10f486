//! Mutable registries shared by every factory flavour.
//!
//! The registries map abstract types to concrete ones, types to
//! construction callbacks, and concrete types to cached singletons.
//! Each one sits behind its own [`RwLock`]; locks are never held while
//! user code runs, so construction may re-enter the factory freely.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::arguments::Arguments;
use crate::descriptor::Signature;
use crate::error::Result;
use crate::factory::Factory;
use crate::key::TypeKey;
use crate::value::Instance;

/// Builds an instance in place of the normal constructor path.
///
/// Receives the factory (to build sub-dependencies), the requested type
/// and the caller's arguments.
pub type Callback =
    Arc<dyn Fn(&dyn Resolver, &TypeKey, &Arguments) -> Result<Instance> + Send + Sync>;

/// The seam between the construction engine and a factory flavour.
///
/// Callbacks receive a `&dyn Resolver`, which offers `create` / `get`.
pub trait Resolver: Send + Sync {
    /// Core state: catalog and registries.
    fn factory(&self) -> &Factory;

    /// Adjusts arguments before they are bound against `signature`.
    fn overlay_arguments(&self, _signature: &Signature, arguments: Arguments) -> Arguments {
        arguments
    }

    fn as_resolver(&self) -> &dyn Resolver;
}

#[derive(Default)]
pub(crate) struct Registries {
    concrete_types: RwLock<HashMap<TypeKey, TypeKey>>,
    callbacks: RwLock<HashMap<TypeKey, Callback>>,
    singletons: RwLock<HashMap<TypeKey, Instance>>,
}

impl Registries {
    pub fn set_concrete_type(&self, abstract_key: TypeKey, concrete_key: TypeKey) {
        debug!(from = %abstract_key, to = %concrete_key, "Registered concrete type");
        self.concrete_types.write().insert(abstract_key, concrete_key);
    }

    pub fn set_concrete_types(&self, mapping: HashMap<TypeKey, TypeKey>) {
        debug!(count = mapping.len(), "Replaced concrete types");
        *self.concrete_types.write() = mapping;
    }

    pub fn concrete_type(&self, key: &TypeKey) -> Option<TypeKey> {
        self.concrete_types.read().get(key).cloned()
    }

    pub fn concrete_types(&self) -> HashMap<TypeKey, TypeKey> {
        self.concrete_types.read().clone()
    }

    pub fn set_callback(&self, key: TypeKey, callback: Callback) {
        debug!(key = %key, "Registered callback");
        self.callbacks.write().insert(key, callback);
    }

    pub fn set_callbacks(&self, callbacks: HashMap<TypeKey, Callback>) {
        debug!(count = callbacks.len(), "Replaced callbacks");
        *self.callbacks.write() = callbacks;
    }

    pub fn callback(&self, key: &TypeKey) -> Option<Callback> {
        self.callbacks.read().get(key).cloned()
    }

    pub fn has_callback(&self, key: &TypeKey) -> bool {
        self.callbacks.read().contains_key(key)
    }

    pub fn callbacks(&self) -> HashMap<TypeKey, Callback> {
        self.callbacks.read().clone()
    }

    pub fn set_singleton(&self, key: TypeKey, instance: Instance) {
        debug!(key = %key, "Seeded singleton");
        self.singletons.write().insert(key, instance);
    }

    pub fn singleton(&self, key: &TypeKey) -> Option<Instance> {
        self.singletons.read().get(key).cloned()
    }

    /// Caches `instance` unless another one got there first; returns the
    /// cached instance either way.
    pub fn store_singleton(&self, key: TypeKey, instance: Instance) -> Instance {
        trace!(key = %key, "Caching singleton");
        self.singletons.write().entry(key).or_insert(instance).clone()
    }

    pub fn singleton_count(&self) -> usize {
        self.singletons.read().len()
    }

    pub fn clear_singletons(&self) {
        self.singletons.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_callback() -> Callback {
        Arc::new(|_: &dyn Resolver, key: &TypeKey, _: &Arguments| {
            Ok(Instance::new(key.clone(), 42i32))
        })
    }

    #[test]
    fn concrete_types_round_trip() {
        let registries = Registries::default();
        let mapping = HashMap::from([
            (TypeKey::new("InterfaceC"), TypeKey::new("InterfacedB")),
            (TypeKey::new("AbstractC"), TypeKey::new("ConcreteB")),
        ]);
        registries.set_concrete_types(mapping.clone());
        assert_eq!(registries.concrete_types(), mapping);

        registries.set_concrete_type(TypeKey::new("ReplacedB"), TypeKey::new("ConcreteB"));
        assert_eq!(registries.concrete_types().len(), 3);
        assert_eq!(
            registries.concrete_type(&TypeKey::new("ReplacedB")),
            Some(TypeKey::new("ConcreteB"))
        );
    }

    #[test]
    fn callbacks_replace_wholesale() {
        let registries = Registries::default();
        registries.set_callback(TypeKey::new("A"), dummy_callback());
        assert!(registries.has_callback(&TypeKey::new("A")));

        registries.set_callbacks(HashMap::from([(TypeKey::new("B"), dummy_callback())]));
        assert!(!registries.has_callback(&TypeKey::new("A")));
        assert!(registries.callback(&TypeKey::new("B")).is_some());
    }

    #[test]
    fn first_stored_singleton_wins() {
        let registries = Registries::default();
        let first = Instance::new("A", 1u8);
        let second = Instance::new("A", 2u8);

        let kept = registries.store_singleton(TypeKey::new("A"), first.clone());
        assert!(kept.ptr_eq(&first));
        let kept = registries.store_singleton(TypeKey::new("A"), second);
        assert!(kept.ptr_eq(&first));
        assert_eq!(registries.singleton_count(), 1);
    }

    #[test]
    fn seeding_overwrites() {
        let registries = Registries::default();
        registries.set_singleton(TypeKey::new("A"), Instance::new("A", 1u8));
        let seeded = Instance::new("A", 2u8);
        registries.set_singleton(TypeKey::new("A"), seeded.clone());
        assert!(registries.singleton(&TypeKey::new("A")).unwrap().ptr_eq(&seeded));

        registries.clear_singletons();
        assert_eq!(registries.singleton_count(), 0);
    }
}
