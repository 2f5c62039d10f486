//! Factory settings loaded from configuration files.
//!
//! ```json
//! {
//!     "concrete_types": { "InterfaceC": "InterfacedB", "AbstractC": "ConcreteB" },
//!     "configurations": { "ComplexA": { "string": "hello world", "boolean": true } },
//!     "ambiguity": "reject"
//! }
//! ```

use std::collections::HashMap;
use std::io::Read;

use serde::Deserialize;

use crate::error::Result;
use crate::key::TypeKey;
use crate::value::Value;

/// Default arguments for one declaring type, keyed by parameter name.
pub type Configuration = HashMap<String, Value>;

/// What the resolver does when several types could stand in for one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Take the first candidate in key order.
    #[default]
    FirstByName,
    /// Fail unless exactly one instantiable candidate exists.
    Reject,
}

/// Registries and options a factory can be initialised from.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FactorySettings {
    pub concrete_types: HashMap<TypeKey, TypeKey>,
    /// Only read by [`ConfiguredFactory`](crate::configured::ConfiguredFactory).
    pub configurations: HashMap<TypeKey, Configuration>,
    /// Absent from the file means: keep the policy the builder already has.
    pub ambiguity: Option<AmbiguityPolicy>,
}

impl FactorySettings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}
