//! # The Factory: heart of Sinaa
//!
//! Resolves abstract types to concrete ones, binds constructor parameters
//! and builds instances described in a [`TypeCatalog`].
//!
//! # Architecture
//! ```text
//! TypeCatalog ──> FactoryBuilder ──build()──────────────> Factory
//!                       │
//!                       └───────build_configured()──────> ConfiguredFactory
//! ```
//!
//! # Examples
//! ```rust
//! use std::sync::Arc;
//! use sinaa_container::prelude::*;
//!
//! struct Greeter { greeting: String }
//!
//! let catalog = TypeCatalog::builder()
//!     .describe(TypeDescriptor::concrete("Greeter").constructor(
//!         Signature::new().param("greeting", ParamType::Str).with_default("hello"),
//!         |args| Ok(Greeter { greeting: args.get(0)? }),
//!     ))
//!     .build();
//!
//! let factory = Factory::new(Arc::new(catalog));
//! let greeter = factory.make::<Greeter>("Greeter", Arguments::new()).unwrap();
//! assert_eq!(greeter.greeting, "hello");
//!
//! let greeter = factory
//!     .make::<Greeter>("Greeter", Arguments::new().with("greeting", "hi"))
//!     .unwrap();
//! assert_eq!(greeter.greeting, "hi");
//! ```

use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::arguments::Arguments;
use crate::builder;
use crate::catalog::TypeCatalog;
use crate::configured::ConfiguredFactory;
use crate::error::{Result, SinaaError};
use crate::key::TypeKey;
use crate::registry::{Callback, Registries, Resolver};
use crate::request::IntoRequest;
use crate::resolution::TypeResolver;
use crate::settings::{AmbiguityPolicy, Configuration, FactorySettings};
use crate::value::Instance;

// ============================================================
// FactoryBuilder
// ============================================================

/// Configures a [`Factory`] or [`ConfiguredFactory`] before first use.
///
/// # Examples
/// ```rust,ignore
/// let factory = Factory::builder(catalog)
///     .concrete_type("InterfaceC", "InterfacedB")
///     .callback("Clock", |_, key, _| Ok(Instance::new(key, SystemClock)))
///     .ambiguity(AmbiguityPolicy::Reject)
///     .build();
/// ```
pub struct FactoryBuilder {
    catalog: Arc<TypeCatalog>,
    concrete_types: HashMap<TypeKey, TypeKey>,
    callbacks: HashMap<TypeKey, Callback>,
    configurations: HashMap<TypeKey, Configuration>,
    ambiguity: AmbiguityPolicy,
}

impl FactoryBuilder {
    fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self {
            catalog,
            concrete_types: HashMap::new(),
            callbacks: HashMap::new(),
            configurations: HashMap::new(),
            ambiguity: AmbiguityPolicy::default(),
        }
    }

    /// Maps an abstract type or interface to the type built in its place.
    pub fn concrete_type(mut self, abstract_key: impl Into<TypeKey>, concrete_key: impl Into<TypeKey>) -> Self {
        self.concrete_types.insert(abstract_key.into(), concrete_key.into());
        self
    }

    /// Builds `key` through `callback` instead of its constructor.
    pub fn callback<F>(mut self, key: impl Into<TypeKey>, callback: F) -> Self
    where
        F: Fn(&dyn Resolver, &TypeKey, &Arguments) -> Result<Instance> + Send + Sync + 'static,
    {
        self.callbacks.insert(key.into(), Arc::new(callback));
        self
    }

    /// Default arguments for a declaring type. Only read by
    /// [`build_configured`](Self::build_configured).
    pub fn configuration(mut self, key: impl Into<TypeKey>, configuration: Configuration) -> Self {
        self.configurations.insert(key.into(), configuration);
        self
    }

    pub fn ambiguity(mut self, policy: AmbiguityPolicy) -> Self {
        self.ambiguity = policy;
        self
    }

    /// Merges file-based settings over what was configured so far.
    pub fn settings(mut self, settings: FactorySettings) -> Self {
        self.concrete_types.extend(settings.concrete_types);
        self.configurations.extend(settings.configurations);
        if let Some(policy) = settings.ambiguity {
            self.ambiguity = policy;
        }
        self
    }

    #[instrument(skip(self), name = "factory_build")]
    pub fn build(self) -> Factory {
        info!(
            described = self.catalog.len(),
            concrete_types = self.concrete_types.len(),
            callbacks = self.callbacks.len(),
            "Building factory"
        );
        let factory = Factory {
            catalog: self.catalog,
            registries: Registries::default(),
            ambiguity: self.ambiguity,
        };
        factory.registries.set_concrete_types(self.concrete_types);
        factory.registries.set_callbacks(self.callbacks);
        factory
    }

    pub fn build_configured(mut self) -> ConfiguredFactory {
        let configurations = std::mem::take(&mut self.configurations);
        ConfiguredFactory::from_parts(self.build(), configurations)
    }
}

// ═══════════════════════════════════════════
// Factory
// ═══════════════════════════════════════════

/// Thread-safe factory over a shared [`TypeCatalog`].
///
/// Registries may be changed at any time through `&self`; changes are
/// visible to later `create` / `get` calls.
pub struct Factory {
    catalog: Arc<TypeCatalog>,
    registries: Registries,
    ambiguity: AmbiguityPolicy,
}

impl Factory {
    /// A factory with empty registries.
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self::builder(catalog).build()
    }

    pub fn builder(catalog: Arc<TypeCatalog>) -> FactoryBuilder {
        FactoryBuilder::new(catalog)
    }

    /// A factory over every descriptor submitted with `inventory`.
    pub fn discover() -> Self {
        Self::new(TypeCatalog::global())
    }

    /// A factory initialised from settings. Configurations are ignored;
    /// use [`ConfiguredFactory::with_settings`] for those.
    pub fn with_settings(catalog: Arc<TypeCatalog>, settings: FactorySettings) -> Self {
        Self::builder(catalog).settings(settings).build()
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    pub fn ambiguity(&self) -> AmbiguityPolicy {
        self.ambiguity
    }

    pub(crate) fn registries(&self) -> &Registries {
        &self.registries
    }

    // ── Registries ──

    /// Maps an abstract type or interface to the type built in its place.
    pub fn set_concrete_type(&self, abstract_key: impl Into<TypeKey>, concrete_key: impl Into<TypeKey>) {
        self.registries
            .set_concrete_type(abstract_key.into(), concrete_key.into());
    }

    /// Replaces every concrete-type mapping.
    pub fn set_concrete_types(&self, mapping: HashMap<TypeKey, TypeKey>) {
        self.registries.set_concrete_types(mapping);
    }

    pub fn concrete_types(&self) -> HashMap<TypeKey, TypeKey> {
        self.registries.concrete_types()
    }

    /// Builds `key` through `callback` instead of its constructor.
    ///
    /// The callback receives this factory, so it may build other types.
    pub fn set_callback<F>(&self, key: impl Into<TypeKey>, callback: F)
    where
        F: Fn(&dyn Resolver, &TypeKey, &Arguments) -> Result<Instance> + Send + Sync + 'static,
    {
        self.registries.set_callback(key.into(), Arc::new(callback));
    }

    /// Replaces every callback.
    pub fn set_callbacks(&self, callbacks: HashMap<TypeKey, Callback>) {
        self.registries.set_callbacks(callbacks);
    }

    pub fn callbacks(&self) -> HashMap<TypeKey, Callback> {
        self.registries.callbacks()
    }

    /// Seeds the singleton cache; later `get` calls for `key` return it.
    pub fn set_singleton(&self, key: impl Into<TypeKey>, instance: Instance) {
        self.registries.set_singleton(key.into(), instance);
    }

    /// The cached singleton for a concrete type, if any.
    pub fn singleton(&self, key: &TypeKey) -> Option<Instance> {
        self.registries.singleton(key)
    }

    /// Replaces mappings and callbacks and drops every cached singleton.
    pub fn init(&self, concrete_types: HashMap<TypeKey, TypeKey>, callbacks: HashMap<TypeKey, Callback>) {
        debug!(
            concrete_types = concrete_types.len(),
            callbacks = callbacks.len(),
            "Reinitialising factory"
        );
        self.registries.set_concrete_types(concrete_types);
        self.registries.set_callbacks(callbacks);
        self.registries.clear_singletons();
    }

    // ── Construction ──

    /// Resolves an abstract type or interface to the type that would be
    /// built for it.
    pub fn resolve_type(&self, key: &TypeKey) -> Result<TypeKey> {
        TypeResolver {
            catalog: &self.catalog,
            registries: &self.registries,
            policy: self.ambiguity,
        }
        .resolve(key)
    }

    /// Builds a new instance.
    ///
    /// ```rust,ignore
    /// let a = factory.create("ComplexA", Arguments::new().with("string", "hello"))?;
    /// let s = factory.create("SingletonA::get", Arguments::new())?;
    /// let i = factory.create(("InitializeA", "init"), Arguments::new())?;
    /// ```
    pub fn create(&self, target: impl IntoRequest, arguments: Arguments) -> Result<Instance> {
        builder::create(self, &target.into_request()?, arguments)
    }

    /// Returns the shared instance, building it on first use.
    ///
    /// Arguments only matter for the call that builds it.
    pub fn get(&self, target: impl IntoRequest, arguments: Arguments) -> Result<Instance> {
        builder::get(self, &target.into_request()?, arguments)
    }

    /// [`create`](Self::create), downcast to `T`.
    pub fn make<T>(&self, target: impl IntoRequest, arguments: Arguments) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        downcast(self.create(target, arguments)?)
    }

    /// [`get`](Self::get), downcast to `T`.
    pub fn shared<T>(&self, target: impl IntoRequest, arguments: Arguments) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        downcast(self.get(target, arguments)?)
    }
}

impl Resolver for Factory {
    fn factory(&self) -> &Factory {
        self
    }

    fn as_resolver(&self) -> &dyn Resolver {
        self
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("described", &self.catalog.len())
            .field("concrete_types", &self.registries.concrete_types().len())
            .field("singletons", &self.registries.singleton_count())
            .field("ambiguity", &self.ambiguity)
            .finish()
    }
}

// ═══════════════════════════════════════════
// Resolver (inside callbacks)
// ═══════════════════════════════════════════

/// Construction through whichever factory invoked a callback.
///
/// ```rust,ignore
/// factory.set_callback("ReplacedB", |resolver, _, _| {
///     resolver.create("SimpleA", Arguments::new())
/// });
/// ```
impl dyn Resolver + '_ {
    pub fn create(&self, target: impl IntoRequest, arguments: Arguments) -> Result<Instance> {
        builder::create(self, &target.into_request()?, arguments)
    }

    pub fn get(&self, target: impl IntoRequest, arguments: Arguments) -> Result<Instance> {
        builder::get(self, &target.into_request()?, arguments)
    }

    pub fn make<T>(&self, target: impl IntoRequest, arguments: Arguments) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        downcast(self.create(target, arguments)?)
    }

    pub fn shared<T>(&self, target: impl IntoRequest, arguments: Arguments) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        downcast(self.get(target, arguments)?)
    }
}

pub(crate) fn downcast<T>(instance: Instance) -> Result<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    instance
        .downcast::<T>()
        .ok_or_else(|| SinaaError::ConstructionFailed {
            key: instance.type_key().clone(),
            source: format!("Type mismatch: expected {}", type_name::<T>()).into(),
        })
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Factory, FactoryBuilder};
    pub use crate::arguments::{ArgKey, Arguments};
    pub use crate::catalog::{TypeCatalog, TypeRegistration};
    pub use crate::configured::ConfiguredFactory;
    pub use crate::descriptor::{Args, ParamType, Signature, TypeDescriptor, TypeKind};
    pub use crate::error::{Result, SinaaError};
    pub use crate::key::TypeKey;
    pub use crate::provider::{Provider, ProviderRegistry};
    pub use crate::registry::{Callback, Resolver};
    pub use crate::request::{IntoRequest, Request};
    pub use crate::settings::{AmbiguityPolicy, Configuration, FactorySettings};
    pub use crate::value::{FromValue, Instance, Value};
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
