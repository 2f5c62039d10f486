//! Provider trait: a module of related type descriptors.
//!
//! Providers group the descriptors of one area of an application, similar
//! to Laravel's ServiceProvider.
//!
//! # Examples
//! ```rust,ignore
//! struct StorageProvider;
//!
//! impl Provider for StorageProvider {
//!     fn register(&self, registry: &mut dyn ProviderRegistry) {
//!         registry.register_type(TypeDescriptor::interface("Repository"));
//!         registry.register_type(
//!             TypeDescriptor::concrete("PostgresRepository")
//!                 .implements("Repository")
//!                 .instantiate(PostgresRepository::default),
//!         );
//!     }
//! }
//!
//! let catalog = TypeCatalog::builder().add_provider(&StorageProvider).build();
//! ```

use crate::descriptor::TypeDescriptor;

/// A module that describes related types into a catalog.
pub trait Provider: Send + Sync {
    /// Describe types into the registry.
    ///
    /// Called once while the catalog is built.
    fn register(&self, registry: &mut dyn ProviderRegistry);

    /// Optional: human-readable name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Interface that providers use to describe types.
///
/// Implemented by [`CatalogBuilder`](crate::catalog::CatalogBuilder); the
/// indirection lets providers be tested on their own.
pub trait ProviderRegistry {
    fn register_type(&mut self, descriptor: TypeDescriptor);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TypeCatalog;
    use crate::key::TypeKey;

    // Mock registry for testing providers
    struct MockRegistry {
        described: Vec<TypeKey>,
    }

    impl ProviderRegistry for MockRegistry {
        fn register_type(&mut self, descriptor: TypeDescriptor) {
            self.described.push(descriptor.key().clone());
        }
    }

    struct TestProvider;

    impl Provider for TestProvider {
        fn register(&self, registry: &mut dyn ProviderRegistry) {
            registry.register_type(TypeDescriptor::interface("InterfaceC"));
            registry.register_type(
                TypeDescriptor::concrete("InterfacedB")
                    .implements("InterfaceC")
                    .instantiate(|| 0u8),
            );
        }
    }

    #[test]
    fn provider_describes_types() {
        let mut registry = MockRegistry { described: vec![] };
        TestProvider.register(&mut registry);
        assert_eq!(registry.described.len(), 2);
    }

    #[test]
    fn provider_has_name() {
        assert!(TestProvider.name().contains("TestProvider"));
    }

    #[test]
    fn catalog_builder_accepts_providers() {
        let catalog = TypeCatalog::builder().add_provider(&TestProvider).build();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains(&TypeKey::new("InterfacedB")));
    }
}
