//! Dynamic values passed through argument bags.
//!
//! Constructors receive their arguments as [`Value`]s. Literal values come
//! from callers or configuration files; [`Instance`]s come from the factory
//! itself when a parameter is typed with a catalog type.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};

use crate::key::TypeKey;

/// A constructed object, type-erased and reference counted.
///
/// The object is stored as an `Arc<T>` inside an `Arc<dyn Any>`, so both
/// sized types and trait-object views (`Arc<dyn Trait>`) downcast the same
/// way through [`Instance::downcast`].
///
/// # Examples
/// ```
/// use sinaa_container::value::Instance;
///
/// struct Greeter { name: String }
///
/// let instance = Instance::new("Greeter", Greeter { name: "hello".into() });
/// let greeter = instance.downcast::<Greeter>().unwrap();
/// assert_eq!(greeter.name, "hello");
/// ```
#[derive(Clone)]
pub struct Instance {
    key: TypeKey,
    object: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    /// Wraps a freshly built value.
    pub fn new<T: Send + Sync + 'static>(key: impl Into<TypeKey>, value: T) -> Self {
        Self::from_arc(key, Arc::new(value))
    }

    /// Wraps an already shared value, possibly a trait object.
    pub fn from_arc<T>(key: impl Into<TypeKey>, value: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            object: Arc::new(value),
        }
    }

    /// The catalog type this instance was built as.
    #[inline]
    pub fn type_key(&self) -> &TypeKey {
        &self.key
    }

    /// Returns the shared object if it was stored as `Arc<T>`.
    pub fn downcast<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.object.downcast_ref::<Arc<T>>().cloned()
    }

    /// Returns `true` if the object is stored as `Arc<T>`.
    pub fn is<T>(&self) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.object.is::<Arc<T>>()
    }

    /// Mutable access to the object, only while nothing else shares it.
    pub fn get_mut<T: Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        Arc::get_mut(&mut self.object)?
            .downcast_mut::<Arc<T>>()
            .and_then(Arc::get_mut)
    }

    /// Returns `true` if nothing else holds this object.
    pub fn is_unique(&mut self) -> bool {
        Arc::get_mut(&mut self.object).is_some()
    }

    /// Two instances are the same object.
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.object, &other.object)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.ptr_eq(other)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type", &self.key.as_str())
            .field("ptr", &Arc::as_ptr(&self.object).cast::<()>())
            .finish()
    }
}

/// A single argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Instance(Instance),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Instance(_) => "instance",
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn into_instance(self) -> Option<Instance> {
        match self {
            Value::Instance(instance) => Some(instance),
            _ => None,
        }
    }
}

// Configuration files can only carry literals, never instances.
#[derive(Deserialize)]
#[serde(untagged)]
enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Literal>),
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(b),
            Literal::Int(i) => Value::Int(i),
            Literal::Float(x) => Value::Float(x),
            Literal::Str(s) => Value::Str(s),
            Literal::List(items) => Value::List(items.into_iter().map(Value::from).collect()),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Literal::deserialize(deserializer).map(Value::from)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::Instance(instance)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Conversion from a bound [`Value`] into a constructor argument.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).and_then(|i| i32::try_from(i).ok())
    }
}

impl FromValue for u32 {
    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).and_then(|i| u32::try_from(i).ok())
    }
}

impl FromValue for usize {
    fn from_value(value: &Value) -> Option<Self> {
        i64::from_value(value).and_then(|i| usize::try_from(i).ok())
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(*x),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for Instance {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_instance().cloned()
    }
}

impl<T> FromValue for Arc<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    fn from_value(value: &Value) -> Option<Self> {
        value.as_instance()?.downcast::<T>()
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Speaker: Send + Sync {
        fn speak(&self) -> &'static str;
    }

    struct Dog;

    impl Speaker for Dog {
        fn speak(&self) -> &'static str {
            "woof"
        }
    }

    #[test]
    fn downcast_sized_instance() {
        let instance = Instance::new("Dog", Dog);
        assert!(instance.downcast::<Dog>().is_some());
        assert!(instance.downcast::<String>().is_none());
        assert!(instance.is::<Dog>());
    }

    #[test]
    fn downcast_trait_object_view() {
        let view: Arc<dyn Speaker> = Arc::new(Dog);
        let instance = Instance::from_arc("Speaker", view);
        let speaker = instance.downcast::<dyn Speaker>().unwrap();
        assert_eq!(speaker.speak(), "woof");
        assert!(instance.downcast::<Dog>().is_none());
    }

    #[test]
    fn get_mut_only_when_unique() {
        let mut instance = Instance::new("Counter", 1u32);
        *instance.get_mut::<u32>().unwrap() += 1;
        assert_eq!(*instance.downcast::<u32>().unwrap(), 2);

        let shared = instance.clone();
        assert!(instance.get_mut::<u32>().is_none());
        assert!(!instance.is_unique());
        drop(shared);
        assert!(instance.is_unique());
    }

    #[test]
    fn instance_equality_is_identity() {
        let a = Instance::new("Dog", Dog);
        let b = Instance::new("Dog", Dog);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn from_value_conversions() {
        assert_eq!(bool::from_value(&Value::Bool(true)), Some(true));
        assert_eq!(i32::from_value(&Value::Int(7)), Some(7));
        assert_eq!(f64::from_value(&Value::Int(2)), Some(2.0));
        assert_eq!(String::from_value(&Value::from("x")), Some("x".to_string()));
        assert_eq!(String::from_value(&Value::Int(1)), None);
        assert_eq!(Option::<i64>::from_value(&Value::Null), Some(None));
        assert_eq!(
            Vec::<i64>::from_value(&Value::List(vec![Value::Int(1), Value::Int(2)])),
            Some(vec![1, 2])
        );
    }

    #[test]
    fn literals_deserialize_from_json() {
        let value: Value = serde_json::from_str(r#"[null, true, 3, 1.5, "s"]"#).unwrap();
        assert_eq!(
            value,
            Value::List(vec![
                Value::Null,
                Value::Bool(true),
                Value::Int(3),
                Value::Float(1.5),
                Value::Str("s".into()),
            ])
        );
    }
}
