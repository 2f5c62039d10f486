//! Core factory implementation for Sinaa DI.

pub mod arguments;
mod binder;
mod builder;
pub mod catalog;
pub mod configured;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod key;
pub mod provider;
pub mod registry;
pub mod request;
mod resolution;
pub mod settings;
pub mod value;

pub use arguments::Arguments;
pub use catalog::TypeCatalog;
pub use configured::ConfiguredFactory;
pub use descriptor::{ParamType, Signature, TypeDescriptor};
pub use error::{Result, SinaaError};
pub use factory::{prelude, Factory};
pub use key::TypeKey;
pub use request::Request;
pub use value::{Instance, Value};
