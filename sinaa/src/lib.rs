//! # Sinaa: a descriptor-driven dependency injection factory for Rust
//!
//! Describe types once in a [`TypeCatalog`](sinaa_container::TypeCatalog),
//! then let a [`Factory`](sinaa_container::Factory) resolve interfaces to
//! implementations, fill constructor parameters and cache singletons.
//!
//! ```rust
//! use std::sync::Arc;
//! use sinaa::prelude::*;
//!
//! struct SimpleB;
//! struct SimpleA { b: Arc<SimpleB> }
//!
//! let catalog = TypeCatalog::builder()
//!     .describe(TypeDescriptor::concrete("SimpleB").instantiate(|| SimpleB))
//!     .describe(TypeDescriptor::concrete("SimpleA").constructor(
//!         Signature::new().typed("b", "SimpleB"),
//!         |args| Ok(SimpleA { b: args.get(0)? }),
//!     ))
//!     .build();
//!
//! let factory = Factory::new(Arc::new(catalog));
//! let a = factory.make::<SimpleA>("SimpleA", Arguments::new()).unwrap();
//! let b = factory.shared::<SimpleB>("SimpleB", Arguments::new()).unwrap();
//! assert!(Arc::ptr_eq(&a.b, &b));
//! ```

pub use sinaa_container::*;
pub use sinaa_support::*;
