//! Type descriptors: what the factory knows about a type.
//!
//! Rust has no runtime reflection, so every type the factory may build is
//! described up front: its kind, its supertypes, its constructor signature
//! and the members that can be used as factories or initializers.
//!
//! # Examples
//! ```
//! use sinaa_container::descriptor::{ParamType, Signature, TypeDescriptor};
//!
//! struct Greeter { name: String }
//!
//! let descriptor = TypeDescriptor::concrete("Greeter").constructor(
//!     Signature::new().param("name", ParamType::Str).with_default("hello"),
//!     |args| Ok(Greeter { name: args.get(0)? }),
//! );
//! assert!(descriptor.is_instantiable());
//! ```

use std::any::type_name;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{MissingArgumentError, Result, SinaaError};
use crate::key::TypeKey;
use crate::value::{FromValue, Instance, Value};

/// Label used for constructor signatures in error messages.
pub const CONSTRUCTOR: &str = "new";

/// Whether a type can be built directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Can be instantiated when it has a constructor.
    Concrete,
    /// Must be substituted by a type that extends it.
    Abstract,
    /// Must be substituted by a type that implements it.
    Interface,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Concrete => write!(f, "concrete"),
            TypeKind::Abstract => write!(f, "abstract"),
            TypeKind::Interface => write!(f, "interface"),
        }
    }
}

/// Declared type of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Any,
    Bool,
    Int,
    Float,
    Str,
    List,
    /// A catalog type; the factory can build it when no value is given.
    Type(TypeKey),
}

impl ParamType {
    /// The catalog type to build, if the parameter names one.
    pub fn type_key(&self) -> Option<&TypeKey> {
        match self {
            ParamType::Type(key) => Some(key),
            _ => None,
        }
    }
}

/// A single declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub position: usize,
    pub ty: ParamType,
    pub default: Option<Value>,
}

/// Parameter list of a constructor or member.
///
/// The declaring type and member name are filled in when the signature is
/// attached to a [`TypeDescriptor`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    declaring: Option<TypeKey>,
    member: String,
    params: Vec<Parameter>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    pub fn param(mut self, name: impl Into<String>, ty: ParamType) -> Self {
        let position = self.params.len();
        self.params.push(Parameter {
            name: name.into(),
            position,
            ty,
            default: None,
        });
        self
    }

    /// Appends a parameter typed with a catalog type.
    pub fn typed(self, name: impl Into<String>, key: impl Into<TypeKey>) -> Self {
        self.param(name, ParamType::Type(key.into()))
    }

    /// Gives the last parameter a default value.
    ///
    /// Has no effect on an empty signature.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        if let Some(last) = self.params.last_mut() {
            last.default = Some(value.into());
        }
        self
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Type that declared this constructor or member.
    ///
    /// Empty for a signature not yet attached to a descriptor.
    pub fn declaring(&self) -> &str {
        self.declaring.as_ref().map_or("", TypeKey::as_str)
    }

    pub fn declaring_key(&self) -> Option<&TypeKey> {
        self.declaring.as_ref()
    }

    pub fn member(&self) -> &str {
        &self.member
    }

    fn attach(mut self, declaring: &TypeKey, member: &str) -> Self {
        self.declaring = Some(declaring.clone());
        self.member = member.to_owned();
        self
    }
}

/// Bound arguments handed to a constructor or member body.
pub struct Args {
    signature: Arc<Signature>,
    values: Vec<Value>,
}

impl Args {
    pub fn new(signature: Arc<Signature>, values: Vec<Value>) -> Self {
        Self { signature, values }
    }

    /// Converts the argument at `index`.
    pub fn get<T: FromValue>(&self, index: usize) -> Result<T> {
        let param = self.signature.params.get(index);
        let name = param.map_or_else(|| index.to_string(), |p| p.name.clone());
        let value = self.values.get(index).ok_or_else(|| {
            SinaaError::MissingArgument(MissingArgumentError {
                declaring: self.signature.declaring().to_owned(),
                member: self.signature.member.clone(),
                parameter: name.clone(),
            })
        })?;

        T::from_value(value).ok_or_else(|| SinaaError::ArgumentMismatch {
            declaring: self.signature.declaring().to_owned(),
            member: self.signature.member.clone(),
            parameter: name,
            expected: type_name::<T>(),
            found: value.kind(),
        })
    }

    /// Converts the argument bound to the parameter called `name`.
    pub fn by_name<T: FromValue>(&self, name: &str) -> Result<T> {
        let index = self
            .signature
            .params
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| {
                SinaaError::MissingArgument(MissingArgumentError {
                    declaring: self.signature.declaring().to_owned(),
                    member: self.signature.member.clone(),
                    parameter: name.to_owned(),
                })
            })?;
        self.get(index)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Builds an instance from bound arguments.
pub type BuildFn = Arc<dyn Fn(&Args) -> Result<Instance> + Send + Sync>;

/// Runs an initializer on a freshly built instance.
pub type InitFn = Arc<dyn Fn(&mut Instance, &Args) -> Result<()> + Send + Sync>;

/// Turns an instance into a view of one of its supertypes.
pub type ViewFn = Arc<dyn Fn(&Instance) -> Option<Instance> + Send + Sync>;

/// How a concrete type is built.
#[derive(Clone)]
pub struct Constructor {
    /// `None` when the type declares no constructor at all.
    pub signature: Option<Arc<Signature>>,
    pub build: BuildFn,
}

/// Static factory or instance initializer.
#[derive(Clone)]
pub enum MemberKind {
    Static(BuildFn),
    Instance(InitFn),
}

/// A named member usable as a construction target.
#[derive(Clone)]
pub struct Member {
    pub signature: Arc<Signature>,
    pub kind: MemberKind,
}

impl Member {
    pub fn is_static(&self) -> bool {
        matches!(self.kind, MemberKind::Static(_))
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("signature", &self.signature)
            .field("static", &self.is_static())
            .finish()
    }
}

/// Everything the factory knows about one type.
#[derive(Clone)]
pub struct TypeDescriptor {
    key: TypeKey,
    kind: TypeKind,
    parents: Vec<TypeKey>,
    interfaces: Vec<TypeKey>,
    constructor: Option<Constructor>,
    inherits_constructor: bool,
    members: HashMap<String, Member>,
    views: HashMap<TypeKey, ViewFn>,
}

impl TypeDescriptor {
    fn with_kind(key: impl Into<TypeKey>, kind: TypeKind) -> Self {
        Self {
            key: key.into(),
            kind,
            parents: Vec::new(),
            interfaces: Vec::new(),
            constructor: None,
            inherits_constructor: false,
            members: HashMap::new(),
            views: HashMap::new(),
        }
    }

    /// A concrete type. It becomes instantiable once it has a constructor.
    pub fn concrete(key: impl Into<TypeKey>) -> Self {
        Self::with_kind(key, TypeKind::Concrete)
    }

    /// An abstract type.
    pub fn abstract_type(key: impl Into<TypeKey>) -> Self {
        Self::with_kind(key, TypeKind::Abstract)
    }

    /// An interface.
    pub fn interface(key: impl Into<TypeKey>) -> Self {
        Self::with_kind(key, TypeKind::Interface)
    }

    /// Declares a direct parent type.
    pub fn extends(mut self, parent: impl Into<TypeKey>) -> Self {
        self.parents.push(parent.into());
        self
    }

    /// Declares a directly implemented interface.
    ///
    /// On an interface descriptor this declares an extended interface.
    pub fn implements(mut self, interface: impl Into<TypeKey>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Registers how to view an instance of this type as `supertype`.
    ///
    /// Used when the instance is injected into a parameter typed with the
    /// supertype, typically to produce an `Arc<dyn Trait>`.
    pub fn view<C, V, F>(mut self, supertype: impl Into<TypeKey>, cast: F) -> Self
    where
        C: Send + Sync + 'static,
        V: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<C>) -> Arc<V> + Send + Sync + 'static,
    {
        let supertype = supertype.into();
        let key = supertype.clone();
        self.views.insert(
            supertype,
            Arc::new(move |instance: &Instance| {
                instance
                    .downcast::<C>()
                    .map(|object| Instance::from_arc(key.clone(), cast(object)))
            }),
        );
        self
    }

    /// Declares the constructor and its parameters.
    pub fn constructor<T, F>(mut self, signature: Signature, build: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Args) -> Result<T> + Send + Sync + 'static,
    {
        let key = self.key.clone();
        self.inherits_constructor = false;
        self.constructor = Some(Constructor {
            signature: Some(Arc::new(signature.attach(&self.key, CONSTRUCTOR))),
            build: Arc::new(move |args: &Args| Ok(Instance::new(key.clone(), build(args)?))),
        });
        self
    }

    /// Builds the type with the constructor parameters of its nearest ancestor
    /// that declares a constructor.
    ///
    /// The signature is adopted when the catalog is built and keeps the
    /// ancestor as its declaring type, so configuration keyed by the ancestor
    /// applies. Without such an ancestor the type takes no parameters.
    pub fn inherited_constructor<T, F>(mut self, build: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Args) -> Result<T> + Send + Sync + 'static,
    {
        let key = self.key.clone();
        self.constructor = Some(Constructor {
            signature: None,
            build: Arc::new(move |args: &Args| Ok(Instance::new(key.clone(), build(args)?))),
        });
        self.inherits_constructor = true;
        self
    }

    /// Makes the type instantiable without a declared constructor.
    pub fn instantiate<T, F>(mut self, build: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let key = self.key.clone();
        self.constructor = Some(Constructor {
            signature: None,
            build: Arc::new(move |_: &Args| Ok(Instance::new(key.clone(), build()))),
        });
        self
    }

    /// Declares a static member returning an instance (factory/accessor).
    pub fn static_member<F>(mut self, name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(&Args) -> Result<Instance> + Send + Sync + 'static,
    {
        let name = name.into();
        let member = Member {
            signature: Arc::new(signature.attach(&self.key, &name)),
            kind: MemberKind::Static(Arc::new(body)),
        };
        self.members.insert(name, member);
        self
    }

    /// Declares an instance member run after construction (initializer).
    ///
    /// The body receives the object mutably; its result is discarded by
    /// the factory, which returns the instance itself.
    pub fn instance_member<T, F>(mut self, name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&mut T, &Args) -> Result<()> + Send + Sync + 'static,
    {
        let name = name.into();
        let label = name.clone();
        let init: InitFn = Arc::new(move |instance: &mut Instance, args: &Args| {
            let key = instance.type_key().clone();
            if !instance.is::<T>() {
                return Err(SinaaError::ConstructionFailed {
                    key,
                    source: format!("Type mismatch: expected {}", type_name::<T>()).into(),
                });
            }
            let object = instance.get_mut::<T>().ok_or_else(|| SinaaError::SharedInstance {
                key,
                member: label.clone(),
            })?;
            body(object, args)
        });
        let member = Member {
            signature: Arc::new(signature.attach(&self.key, &name)),
            kind: MemberKind::Instance(init),
        };
        self.members.insert(name, member);
        self
    }

    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn parents(&self) -> &[TypeKey] {
        &self.parents
    }

    pub fn interfaces(&self) -> &[TypeKey] {
        &self.interfaces
    }

    pub fn constructor_ref(&self) -> Option<&Constructor> {
        self.constructor.as_ref()
    }

    /// Signature this type declares for its own constructor, if any.
    pub(crate) fn declared_signature(&self) -> Option<&Arc<Signature>> {
        match &self.constructor {
            Some(constructor) if !self.inherits_constructor => constructor.signature.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn inherits_constructor(&self) -> bool {
        self.inherits_constructor
    }

    pub(crate) fn adopt_signature(&mut self, signature: Arc<Signature>) {
        if let Some(constructor) = &mut self.constructor {
            constructor.signature = Some(signature);
        }
    }

    /// Member declared directly on this type.
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    pub fn view_as(&self, supertype: &TypeKey) -> Option<&ViewFn> {
        self.views.get(supertype)
    }

    /// Concrete and constructible.
    pub fn is_instantiable(&self) -> bool {
        self.kind == TypeKind::Concrete && self.constructor.is_some()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut members: Vec<&String> = self.members.keys().collect();
        members.sort();
        f.debug_struct("TypeDescriptor")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("parents", &self.parents)
            .field("interfaces", &self.interfaces)
            .field("constructor", &self.constructor.as_ref().map(|c| &c.signature))
            .field("members", &members)
            .finish()
    }
}
