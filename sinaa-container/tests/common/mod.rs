//! Shared fixture types and their catalog.
#![allow(dead_code)]

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use sinaa_container::prelude::*;

pub const CONCRETE_JSON: &str = include_str!("../fixtures/concrete.json");
pub const CONFIG_JSON: &str = include_str!("../fixtures/config.json");
pub const SETTINGS_JSON: &str = include_str!("../fixtures/settings.json");

pub trait Exist: Send + Sync {
    fn exist(&self) -> String;
}

pub struct SimpleB;

impl Exist for SimpleB {
    fn exist(&self) -> String {
        "SimpleB-OK".into()
    }
}

pub struct SimpleA {
    pub b: Arc<SimpleB>,
}

impl fmt::Display for SimpleA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimpleA:{}", self.b.exist())
    }
}

pub struct ComplexA {
    pub b: Arc<SimpleB>,
    pub boolean: bool,
    pub string: String,
    pub default_boolean: bool,
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

impl fmt::Display for ComplexA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ComplexA:{}:string={}:boolean={}:defaultBoolean={}",
            self.b.exist(),
            self.string,
            yes_no(self.boolean),
            yes_no(self.default_boolean)
        )
    }
}

pub struct InterfacedB;

impl Exist for InterfacedB {
    fn exist(&self) -> String {
        "InterfacedB-OK".into()
    }
}

pub struct InterfacedA {
    pub c: Arc<dyn Exist>,
}

impl fmt::Display for InterfacedA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InterfacedA:{}", self.c.exist())
    }
}

pub struct ConcreteB;

impl Exist for ConcreteB {
    fn exist(&self) -> String {
        "AbstractC-OK:ConcreteB-OK".into()
    }
}

pub struct ConcretedA {
    pub c: Arc<dyn Exist>,
}

impl fmt::Display for ConcretedA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConcretedA:{}", self.c.exist())
    }
}

pub struct SingletonA {
    pub b: Arc<SimpleB>,
}

impl fmt::Display for SingletonA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SingletonA:{}", self.b.exist())
    }
}

#[derive(Default)]
pub struct InitializeA {
    pub b: Option<Arc<SimpleB>>,
    pub string: String,
}

impl fmt::Display for InitializeA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.b.as_ref().map(|b| b.exist()).unwrap_or_default();
        write!(f, "InitializeA:{}:string={}", b, self.string)
    }
}

/// Every fixture type, the way the factory sees them.
pub fn descriptors() -> Vec<TypeDescriptor> {
    // SingletonA has no public constructor; `get` hands out one shared object
    let singleton: Arc<OnceCell<Instance>> = Arc::new(OnceCell::new());

    vec![
        TypeDescriptor::concrete("SimpleB").instantiate(|| SimpleB),
        TypeDescriptor::concrete("SimpleA").constructor(
            Signature::new().typed("b", "SimpleB"),
            |args| Ok(SimpleA { b: args.get(0)? }),
        ),
        TypeDescriptor::concrete("ComplexA").constructor(
            Signature::new()
                .typed("b", "SimpleB")
                .param("boolean", ParamType::Bool)
                .param("string", ParamType::Str)
                .param("default_boolean", ParamType::Bool)
                .with_default(false),
            |args| {
                Ok(ComplexA {
                    b: args.get(0)?,
                    boolean: args.get(1)?,
                    string: args.get(2)?,
                    default_boolean: args.get(3)?,
                })
            },
        ),
        TypeDescriptor::interface("InterfaceC"),
        TypeDescriptor::concrete("InterfacedB")
            .implements("InterfaceC")
            .instantiate(|| InterfacedB)
            .view("InterfaceC", |b: Arc<InterfacedB>| b as Arc<dyn Exist>),
        TypeDescriptor::concrete("InterfacedA").constructor(
            Signature::new().typed("c", "InterfaceC"),
            |args| Ok(InterfacedA { c: args.get(0)? }),
        ),
        TypeDescriptor::abstract_type("AbstractC"),
        TypeDescriptor::concrete("ConcreteB")
            .extends("AbstractC")
            .constructor(Signature::new(), |_| Ok(ConcreteB))
            .view("AbstractC", |b: Arc<ConcreteB>| b as Arc<dyn Exist>),
        TypeDescriptor::concrete("ConcretedA").constructor(
            Signature::new().typed("c", "AbstractC"),
            |args| Ok(ConcretedA { c: args.get(0)? }),
        ),
        TypeDescriptor::abstract_type("ReplacedB").extends("SimpleB"),
        TypeDescriptor::concrete("SingletonA").static_member(
            "get",
            Signature::new().typed("b", "SimpleB"),
            move |args| {
                singleton
                    .get_or_try_init(|| {
                        let b = args.get(0)?;
                        Ok::<_, SinaaError>(Instance::new("SingletonA", SingletonA { b }))
                    })
                    .cloned()
            },
        ),
        TypeDescriptor::concrete("InitializeA")
            .instantiate(InitializeA::default)
            .instance_member(
                "init",
                Signature::new()
                    .typed("b", "SimpleB")
                    .param("string", ParamType::Str)
                    .with_default("hello"),
                |a: &mut InitializeA, args| {
                    a.b = Some(args.get(0)?);
                    a.string = args.get(1)?;
                    Ok(())
                },
            ),
    ]
}

pub fn catalog() -> Arc<TypeCatalog> {
    let builder = descriptors()
        .into_iter()
        .fold(TypeCatalog::builder(), |builder, descriptor| builder.describe(descriptor));
    Arc::new(builder.build())
}

pub fn concrete_types() -> std::collections::HashMap<TypeKey, TypeKey> {
    serde_json::from_str(CONCRETE_JSON).expect("concrete.json is valid")
}

pub fn configurations() -> std::collections::HashMap<TypeKey, Configuration> {
    serde_json::from_str(CONFIG_JSON).expect("config.json is valid")
}
