//! Parameter binding.
//!
//! Produces the ordered argument list for a constructor or member from an
//! [`Arguments`] bag. For each parameter, the first source that applies wins:
//!
//! 1. the bag, by name (named bags) or by position (positional bags)
//! 2. the factory, when the parameter is typed with a constructible catalog type
//! 3. the parameter's declared default
//!
//! Anything else is a [`SinaaError::MissingArgument`].

use tracing::trace;

use crate::arguments::{ArgKey, Arguments};
use crate::builder;
use crate::descriptor::{ParamType, Parameter, Signature};
use crate::error::{MissingArgumentError, Result, SinaaError};
use crate::key::TypeKey;
use crate::registry::Resolver;
use crate::request::Request;
use crate::resolution::ResolutionPath;
use crate::value::{Instance, Value};

/// Binds every parameter of `signature`.
pub(crate) fn bind<R: Resolver + ?Sized>(
    resolver: &R,
    signature: &Signature,
    arguments: Arguments,
    path: &mut ResolutionPath,
) -> Result<Vec<Value>> {
    let arguments = resolver.overlay_arguments(signature, arguments);
    let positional = arguments.is_positional();

    signature
        .params()
        .iter()
        .map(|param| bind_one(resolver, signature, param, &arguments, positional, path))
        .collect()
}

fn bind_one<R: Resolver + ?Sized>(
    resolver: &R,
    signature: &Signature,
    param: &Parameter,
    arguments: &Arguments,
    positional: bool,
    path: &mut ResolutionPath,
) -> Result<Value> {
    let given = if positional {
        arguments.get(&ArgKey::Index(param.position))
    } else {
        arguments.by_name(&param.name)
    };

    if let Some(value) = given {
        trace!(member = %signature.member(), param = %param.name, "Bound from arguments");
        return Ok(value.clone());
    }

    match (&param.ty, &param.default) {
        (ParamType::Type(key), Some(default)) if !constructible(resolver, key) => {
            trace!(member = %signature.member(), param = %param.name, dependency = %key, "Not constructible, using default");
            Ok(default.clone())
        }
        (ParamType::Type(key), _) => {
            trace!(member = %signature.member(), param = %param.name, dependency = %key, "Injecting");
            inject(resolver, key, path).map(Value::Instance)
        }
        (_, Some(default)) => Ok(default.clone()),
        _ => Err(SinaaError::MissingArgument(MissingArgumentError {
            declaring: signature.declaring().to_owned(),
            member: signature.member().to_owned(),
            parameter: param.name.clone(),
        })),
    }
}

/// Whether the factory can build `key`: through a callback, or by resolving
/// it to an instantiable type. Other resolution failures still count as
/// constructible so that injection reports them.
fn constructible<R: Resolver + ?Sized>(resolver: &R, key: &TypeKey) -> bool {
    let factory = resolver.factory();
    if factory.registries().has_callback(key) {
        return true;
    }
    !matches!(
        factory.resolve_type(key),
        Err(SinaaError::UnknownType(_) | SinaaError::UnresolvedType(_))
    )
}

/// Gets the shared instance for `key`, viewed as `key` when its concrete
/// type registered a view for it.
fn inject<R: Resolver + ?Sized>(
    resolver: &R,
    key: &TypeKey,
    path: &mut ResolutionPath,
) -> Result<Instance> {
    let instance = builder::get_in(resolver, &Request::Type(key.clone()), Arguments::new(), path)?;
    if instance.type_key() == key {
        return Ok(instance);
    }

    let view = resolver
        .factory()
        .catalog()
        .get(instance.type_key())
        .and_then(|descriptor| descriptor.view_as(key))
        .and_then(|view| view(&instance));

    Ok(view.unwrap_or(instance))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::TypeCatalog;
    use crate::descriptor::TypeDescriptor;
    use crate::factory::Factory;

    fn factory() -> Factory {
        Factory::new(Arc::new(
            TypeCatalog::builder()
                .describe(TypeDescriptor::concrete("Engine").instantiate(|| 8u8))
                .build(),
        ))
    }

    fn signature() -> Signature {
        Signature::new()
            .typed("engine", "Engine")
            .param("wheels", ParamType::Int)
            .with_default(4i64)
            .param("name", ParamType::Str)
    }

    #[test]
    fn sources_in_order_of_precedence() {
        let factory = factory();
        let values = bind(
            &factory,
            &signature(),
            Arguments::new().with("name", "car"),
            &mut ResolutionPath::new(),
        )
        .unwrap();

        assert_eq!(values[0].as_instance().map(|i| i.type_key().as_str()), Some("Engine"));
        assert_eq!(values[1], Value::Int(4));
        assert_eq!(values[2], Value::from("car"));
    }

    #[test]
    fn positional_bag_ignores_names() {
        let factory = factory();
        let engine = Instance::new("Engine", 12u8);
        let values = bind(
            &factory,
            &signature(),
            Arguments::positional([Value::from(engine.clone()), Value::Int(3), Value::from("bike")]),
            &mut ResolutionPath::new(),
        )
        .unwrap();

        assert!(values[0].as_instance().is_some_and(|i| i.ptr_eq(&engine)));
        assert_eq!(values[1], Value::Int(3));
    }

    #[test]
    fn unconstructible_type_falls_back_to_default() {
        let factory = Factory::new(Arc::new(
            TypeCatalog::builder()
                .describe(TypeDescriptor::abstract_type("Gearbox"))
                .build(),
        ));
        let signature = Signature::new()
            .typed("gearbox", "Gearbox")
            .with_default("manual")
            .typed("trailer", "Trailer")
            .with_default(Value::Null);

        let values = bind(&factory, &signature, Arguments::new(), &mut ResolutionPath::new()).unwrap();
        assert_eq!(values[0], Value::from("manual"));
        assert_eq!(values[1], Value::Null);
    }

    #[test]
    fn unconstructible_type_without_default_is_reported() {
        let factory = Factory::new(Arc::new(
            TypeCatalog::builder()
                .describe(TypeDescriptor::abstract_type("Gearbox"))
                .build(),
        ));
        let signature = Signature::new().typed("gearbox", "Gearbox");
        match bind(&factory, &signature, Arguments::new(), &mut ResolutionPath::new()) {
            Err(SinaaError::UnresolvedType(err)) => assert_eq!(err.requested.as_str(), "Gearbox"),
            other => panic!("Expected UnresolvedType, got: {other:?}"),
        }
    }

    #[test]
    fn missing_value_names_parameter() {
        let factory = factory();
        let result = bind(&factory, &signature(), Arguments::new(), &mut ResolutionPath::new());
        match result {
            Err(SinaaError::MissingArgument(err)) => assert_eq!(err.parameter, "name"),
            other => panic!("Expected MissingArgument, got: {other:?}"),
        }
    }
}
