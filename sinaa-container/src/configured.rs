//! A [`Factory`] with per-type default arguments.
//!
//! Before a constructor or member of type `T` is bound, the configuration
//! registered for `T` is merged into the caller's arguments. Caller values
//! always win; configured values fill the gaps before injection and
//! declared defaults are considered.
//!
//! ```rust,ignore
//! let factory = ConfiguredFactory::with_settings(catalog, FactorySettings::from_json(
//!     r#"{ "configurations": { "ComplexA": { "string": "hello world", "boolean": true } } }"#,
//! )?);
//! let a = factory.create("ComplexA", Arguments::new().with("string", "hello"))?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::arguments::Arguments;
use crate::builder;
use crate::catalog::TypeCatalog;
use crate::descriptor::Signature;
use crate::error::Result;
use crate::factory::{downcast, Factory, FactoryBuilder};
use crate::key::TypeKey;
use crate::registry::{Callback, Resolver};
use crate::request::IntoRequest;
use crate::settings::{AmbiguityPolicy, Configuration, FactorySettings};
use crate::value::Instance;

pub struct ConfiguredFactory {
    factory: Factory,
    configurations: RwLock<HashMap<TypeKey, Configuration>>,
}

impl ConfiguredFactory {
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self::from_parts(Factory::new(catalog), HashMap::new())
    }

    /// Same as [`Factory::builder`]; finish with
    /// [`build_configured`](FactoryBuilder::build_configured).
    pub fn builder(catalog: Arc<TypeCatalog>) -> FactoryBuilder {
        Factory::builder(catalog)
    }

    pub fn with_settings(catalog: Arc<TypeCatalog>, settings: FactorySettings) -> Self {
        Factory::builder(catalog).settings(settings).build_configured()
    }

    pub(crate) fn from_parts(factory: Factory, configurations: HashMap<TypeKey, Configuration>) -> Self {
        Self {
            factory,
            configurations: RwLock::new(configurations),
        }
    }

    /// The wrapped factory, sharing this one's registries.
    ///
    /// Building through it skips the configuration overlay.
    pub fn inner(&self) -> &Factory {
        &self.factory
    }

    pub fn catalog(&self) -> &TypeCatalog {
        self.factory.catalog()
    }

    pub fn ambiguity(&self) -> AmbiguityPolicy {
        self.factory.ambiguity()
    }

    // ── Configurations ──

    /// Default arguments for every constructor and member declared by `key`.
    pub fn set_configuration(&self, key: impl Into<TypeKey>, configuration: Configuration) {
        let key = key.into();
        debug!(key = %key, entries = configuration.len(), "Registered configuration");
        self.configurations.write().insert(key, configuration);
    }

    /// Replaces every configuration.
    pub fn set_configurations(&self, configurations: HashMap<TypeKey, Configuration>) {
        debug!(count = configurations.len(), "Replaced configurations");
        *self.configurations.write() = configurations;
    }

    pub fn configurations(&self) -> HashMap<TypeKey, Configuration> {
        self.configurations.read().clone()
    }

    /// Replaces mappings, callbacks and configurations and drops every
    /// cached singleton.
    pub fn init(
        &self,
        concrete_types: HashMap<TypeKey, TypeKey>,
        callbacks: HashMap<TypeKey, Callback>,
        configurations: HashMap<TypeKey, Configuration>,
    ) {
        self.factory.init(concrete_types, callbacks);
        self.set_configurations(configurations);
    }

    // ── Delegated registries ──

    pub fn set_concrete_type(&self, abstract_key: impl Into<TypeKey>, concrete_key: impl Into<TypeKey>) {
        self.factory.set_concrete_type(abstract_key, concrete_key);
    }

    pub fn set_concrete_types(&self, mapping: HashMap<TypeKey, TypeKey>) {
        self.factory.set_concrete_types(mapping);
    }

    pub fn concrete_types(&self) -> HashMap<TypeKey, TypeKey> {
        self.factory.concrete_types()
    }

    pub fn set_callback<F>(&self, key: impl Into<TypeKey>, callback: F)
    where
        F: Fn(&dyn Resolver, &TypeKey, &Arguments) -> Result<Instance> + Send + Sync + 'static,
    {
        self.factory.set_callback(key, callback);
    }

    pub fn set_callbacks(&self, callbacks: HashMap<TypeKey, Callback>) {
        self.factory.set_callbacks(callbacks);
    }

    pub fn callbacks(&self) -> HashMap<TypeKey, Callback> {
        self.factory.callbacks()
    }

    pub fn set_singleton(&self, key: impl Into<TypeKey>, instance: Instance) {
        self.factory.set_singleton(key, instance);
    }

    pub fn singleton(&self, key: &TypeKey) -> Option<Instance> {
        self.factory.singleton(key)
    }

    // ── Construction ──

    pub fn resolve_type(&self, key: &TypeKey) -> Result<TypeKey> {
        self.factory.resolve_type(key)
    }

    /// Builds a new instance with configured defaults applied at every level.
    pub fn create(&self, target: impl IntoRequest, arguments: Arguments) -> Result<Instance> {
        builder::create(self, &target.into_request()?, arguments)
    }

    /// Returns the shared instance, building it on first use.
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

impl Resolver for ConfiguredFactory {
    fn factory(&self) -> &Factory {
        &self.factory
    }

    fn overlay_arguments(&self, signature: &Signature, arguments: Arguments) -> Arguments {
        let Some(declaring) = signature.declaring_key() else {
            return arguments;
        };
        match self.configurations.read().get(declaring) {
            Some(configuration) => {
                trace!(key = %declaring, member = signature.member(), "Applying configuration");
                arguments.or_defaults(configuration)
            }
            None => arguments,
        }
    }

    fn as_resolver(&self) -> &dyn Resolver {
        self
    }
}

impl fmt::Debug for ConfiguredFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfiguredFactory")
            .field("factory", &self.factory)
            .field("configurations", &self.configurations.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ParamType, TypeDescriptor};
    use crate::value::Value;

    struct Greeter {
        greeting: String,
    }

    struct Pair {
        a: Arc<Greeter>,
        b: String,
    }

    fn catalog() -> Arc<TypeCatalog> {
        Arc::new(
            TypeCatalog::builder()
                .describe(TypeDescriptor::concrete("Greeter").constructor(
                    Signature::new().param("greeting", ParamType::Str).with_default("hello"),
                    |args| Ok(Greeter { greeting: args.get(0)? }),
                ))
                .describe(TypeDescriptor::concrete("Pair").constructor(
                    Signature::new()
                        .typed("a", "Greeter")
                        .param("b", ParamType::Str)
                        .with_default("defaultB"),
                    |args| Ok(Pair { a: args.get(0)?, b: args.get(1)? }),
                ))
                .build(),
        )
    }

    fn configuration(entries: &[(&str, &str)]) -> Configuration {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect()
    }

    #[test]
    fn configuration_fills_missing_arguments() {
        let factory = ConfiguredFactory::new(catalog());
        factory.set_configuration("Pair", configuration(&[("b", "customB")]));

        let pair = factory.make::<Pair>("Pair", Arguments::new()).unwrap();
        assert_eq!(pair.b, "customB");

        let pair = factory.make::<Pair>("Pair", Arguments::new().with("b", "x")).unwrap();
        assert_eq!(pair.b, "x");
    }

    #[test]
    fn configuration_applies_to_dependencies() {
        let factory = ConfiguredFactory::new(catalog());
        factory.set_configuration("Greeter", configuration(&[("greeting", "configured")]));

        let pair = factory.make::<Pair>("Pair", Arguments::new()).unwrap();
        assert_eq!(pair.a.greeting, "configured");
    }

    #[test]
    fn inner_factory_skips_configuration() {
        let factory = ConfiguredFactory::new(catalog());
        factory.set_configuration("Greeter", configuration(&[("greeting", "configured")]));

        let greeter = factory.inner().make::<Greeter>("Greeter", Arguments::new()).unwrap();
        assert_eq!(greeter.greeting, "hello");
    }

    #[test]
    fn init_replaces_configurations() {
        let factory = ConfiguredFactory::new(catalog());
        factory.set_configuration("Pair", configuration(&[("b", "customB")]));
        factory.init(
            HashMap::new(),
            HashMap::new(),
            HashMap::from([(TypeKey::new("Greeter"), configuration(&[("greeting", "hey")]))]),
        );

        let configurations = factory.configurations();
        assert_eq!(configurations.len(), 1);
        assert!(configurations.contains_key(&TypeKey::new("Greeter")));
    }

    #[test]
    fn settings_load_configurations() {
        let settings = FactorySettings::from_json(
            r#"{ "configurations": { "Greeter": { "greeting": "from json" } } }"#,
        )
        .unwrap();
        let factory = ConfiguredFactory::with_settings(catalog(), settings);

        let greeter = factory.make::<Greeter>("Greeter", Arguments::new()).unwrap();
        assert_eq!(greeter.greeting, "from json");
    }
}
