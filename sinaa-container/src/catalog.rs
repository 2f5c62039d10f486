//! Type catalog: the factory's view of every describable type.
//!
//! The catalog answers the questions a reflection API would: is a type
//! instantiable, what does it extend or implement, which types extend or
//! implement it, and where is a member declared.
//!
//! Descriptors are iterated in lexicographic key order, which is also the
//! order in which implementers are offered to the resolver.
//!
//! # Link-time registration
//! ```rust,ignore
//! inventory::submit! {
//!     TypeRegistration::new(|| TypeDescriptor::concrete("SimpleB").instantiate(|| SimpleB))
//! }
//!
//! let catalog = TypeCatalog::global();
//! ```

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use sinaa_support::rendering::suggest_similar;

use crate::descriptor::{Member, Signature, TypeDescriptor, TypeKind};
use crate::error::{Result, SinaaError, UnknownTypeError};
use crate::key::TypeKey;
use crate::provider::{Provider, ProviderRegistry};

/// A descriptor submitted with `inventory::submit!`.
pub struct TypeRegistration {
    describe: fn() -> TypeDescriptor,
}

impl TypeRegistration {
    pub const fn new(describe: fn() -> TypeDescriptor) -> Self {
        Self { describe }
    }
}

inventory::collect!(TypeRegistration);

static GLOBAL: OnceCell<Arc<TypeCatalog>> = OnceCell::new();

/// Collects descriptors before freezing them into a [`TypeCatalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    descriptors: BTreeMap<TypeKey, TypeDescriptor>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor; a later descriptor with the same key replaces it.
    pub fn describe(mut self, descriptor: TypeDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    /// Adds every descriptor a [`Provider`] registers.
    pub fn add_provider(mut self, provider: &dyn Provider) -> Self {
        debug!(provider = provider.name(), "Adding provider");
        provider.register(&mut self);
        self
    }

    pub fn build(self) -> TypeCatalog {
        let mut catalog = TypeCatalog {
            descriptors: self.descriptors,
        };

        let inherited: Vec<(TypeKey, Arc<Signature>)> = catalog
            .iter()
            .filter(|d| d.inherits_constructor())
            .filter_map(|d| {
                catalog
                    .inherited_signature(d.key())
                    .map(|signature| (d.key().clone(), signature))
            })
            .collect();
        for (key, signature) in inherited {
            debug!(key = %key, from = %signature.declaring(), "Inherited constructor");
            if let Some(descriptor) = catalog.descriptors.get_mut(&key) {
                descriptor.adopt_signature(signature);
            }
        }

        info!(described = catalog.len(), "Catalog built");
        catalog
    }

    fn insert(&mut self, descriptor: TypeDescriptor) {
        let key = descriptor.key().clone();
        if self.descriptors.insert(key.clone(), descriptor).is_some() {
            warn!(key = %key, "Descriptor replaced");
        } else {
            debug!(key = %key, "Described type");
        }
    }
}

impl ProviderRegistry for CatalogBuilder {
    fn register_type(&mut self, descriptor: TypeDescriptor) {
        self.insert(descriptor);
    }
}

/// Immutable set of type descriptors.
#[derive(Debug, Default)]
pub struct TypeCatalog {
    descriptors: BTreeMap<TypeKey, TypeDescriptor>,
}

impl TypeCatalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Builds a catalog from every `inventory` submission linked in.
    pub fn discover() -> Self {
        let mut builder = CatalogBuilder::new();
        for registration in inventory::iter::<TypeRegistration> {
            builder.insert((registration.describe)());
        }
        builder.build()
    }

    /// The discovered catalog, built once per process.
    pub fn global() -> Arc<TypeCatalog> {
        GLOBAL.get_or_init(|| Arc::new(Self::discover())).clone()
    }

    pub fn get(&self, key: &TypeKey) -> Option<&TypeDescriptor> {
        self.descriptors.get(key)
    }

    /// Like [`get`](Self::get), failing with suggestions for unknown keys.
    pub fn require(&self, key: &TypeKey) -> Result<&TypeDescriptor> {
        self.descriptors.get(key).ok_or_else(|| {
            let available: Vec<&str> = self.descriptors.keys().map(TypeKey::as_str).collect();
            SinaaError::UnknownType(UnknownTypeError {
                requested: key.clone(),
                suggestions: suggest_similar(key.as_str(), &available, 3),
            })
        })
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.descriptors.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Descriptors in key order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.descriptors.values()
    }

    /// All transitive parents, nearest first. Undescribed parents are
    /// listed but not walked.
    pub fn ancestors(&self, key: &TypeKey) -> Vec<TypeKey> {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        let mut queue: VecDeque<TypeKey> = self
            .get(key)
            .map(|d| d.parents().iter().cloned().collect())
            .unwrap_or_default();

        while let Some(parent) = queue.pop_front() {
            if parent == *key || !seen.insert(parent.clone()) {
                continue;
            }
            if let Some(desc) = self.get(&parent) {
                queue.extend(desc.parents().iter().cloned());
            }
            ordered.push(parent);
        }
        ordered
    }

    /// All interfaces implemented by `key`, through its ancestors and
    /// through interfaces extending other interfaces.
    pub fn interfaces_of(&self, key: &TypeKey) -> HashSet<TypeKey> {
        let mut owners = vec![key.clone()];
        owners.extend(self.ancestors(key));

        let mut queue: VecDeque<TypeKey> = owners
            .iter()
            .filter_map(|owner| self.get(owner))
            .flat_map(|d| d.interfaces().iter().cloned())
            .collect();

        let mut found = HashSet::new();
        while let Some(interface) = queue.pop_front() {
            if !found.insert(interface.clone()) {
                continue;
            }
            if let Some(desc) = self.get(&interface) {
                queue.extend(desc.interfaces().iter().cloned());
                queue.extend(desc.parents().iter().cloned());
            }
        }
        found
    }

    /// Types that could stand in for `key`, in key order.
    ///
    /// For an interface: non-interface types implementing it. Otherwise:
    /// types having it as an ancestor.
    pub fn implementers(&self, key: &TypeKey) -> Vec<TypeKey> {
        let Some(target) = self.get(key) else {
            return Vec::new();
        };
        let interface = target.kind() == TypeKind::Interface;

        self.iter()
            .filter(|d| d.key() != key && d.kind() != TypeKind::Interface)
            .filter(|d| {
                if interface {
                    self.interfaces_of(d.key()).contains(key)
                } else {
                    self.ancestors(d.key()).contains(key)
                }
            })
            .map(|d| d.key().clone())
            .collect()
    }

    /// Constructor signature of the nearest ancestor that declares one.
    fn inherited_signature(&self, key: &TypeKey) -> Option<Arc<Signature>> {
        self.ancestors(key)
            .iter()
            .find_map(|ancestor| self.get(ancestor).and_then(|d| d.declared_signature()).cloned())
    }

    /// Finds a member on `key` or, failing that, on its nearest ancestor.
    pub fn find_member(&self, key: &TypeKey, name: &str) -> Option<&Member> {
        std::iter::once(key.clone())
            .chain(self.ancestors(key))
            .find_map(|owner| self.get(&owner).and_then(|d| d.member(name)))
    }
}
