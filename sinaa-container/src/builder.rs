//! The construction engine.
//!
//! Generic over [`Resolver`] so that every recursive step goes back through
//! the same factory flavour that started the request.
//!
//! ```text
//! create(Type)        ─> callback? ─> resolve ─> callback? ─> constructor
//! create(Member)      ─> static member:   bind ─> call
//!                     ─> instance member: bind ─> create(Type) ─> call on it
//! get(request)        ─> singleton cache ─> create
//! ```

use std::sync::Arc;

use tracing::{debug, instrument, trace};

use crate::arguments::Arguments;
use crate::binder::bind;
use crate::descriptor::{Args, MemberKind, Signature};
use crate::error::{Result, SinaaError};
use crate::key::TypeKey;
use crate::registry::{Callback, Resolver};
use crate::request::Request;
use crate::resolution::ResolutionPath;
use crate::value::Instance;

/// Always builds a new instance.
#[instrument(skip_all, fields(target = %request), name = "create")]
pub(crate) fn create<R: Resolver + ?Sized>(
    resolver: &R,
    request: &Request,
    arguments: Arguments,
) -> Result<Instance> {
    ResolutionPath::continue_with(|path| create_in(resolver, request, arguments, path))
}

/// Returns the cached instance for the request's concrete type, building
/// and caching it on first use.
#[instrument(skip_all, fields(target = %request), name = "get")]
pub(crate) fn get<R: Resolver + ?Sized>(
    resolver: &R,
    request: &Request,
    arguments: Arguments,
) -> Result<Instance> {
    ResolutionPath::continue_with(|path| get_in(resolver, request, arguments, path))
}

pub(crate) fn get_in<R: Resolver + ?Sized>(
    resolver: &R,
    request: &Request,
    arguments: Arguments,
    path: &mut ResolutionPath,
) -> Result<Instance> {
    let key = singleton_key(resolver, request)?;
    let registries = resolver.factory().registries();

    if let Some(cached) = registries.singleton(&key) {
        trace!(key = %key, "Singleton cache hit");
        return Ok(cached);
    }

    let instance = create_in(resolver, request, arguments, path)?;
    Ok(registries.store_singleton(key, instance))
}

/// The key a request's singleton is cached under.
///
/// Types with a callback of their own, and member requests on types that
/// cannot be resolved (e.g. a type only built through a static accessor),
/// are cached under the requested key.
fn singleton_key<R: Resolver + ?Sized>(resolver: &R, request: &Request) -> Result<TypeKey> {
    let factory = resolver.factory();
    let key = request.type_key();

    if factory.registries().has_callback(key) {
        return Ok(key.clone());
    }

    match (request, factory.resolve_type(key)) {
        (_, Ok(concrete)) => Ok(concrete),
        (Request::Member(..), Err(SinaaError::UnresolvedType(_))) => Ok(key.clone()),
        (_, Err(e)) => Err(e),
    }
}

fn create_in<R: Resolver + ?Sized>(
    resolver: &R,
    request: &Request,
    arguments: Arguments,
    path: &mut ResolutionPath,
) -> Result<Instance> {
    match request {
        Request::Type(key) => create_instance(resolver, key, arguments, path),
        Request::Member(key, member) => create_from_member(resolver, key, member, arguments, path),
    }
}

fn create_instance<R: Resolver + ?Sized>(
    resolver: &R,
    key: &TypeKey,
    arguments: Arguments,
    path: &mut ResolutionPath,
) -> Result<Instance> {
    let factory = resolver.factory();

    if let Some(callback) = factory.registries().callback(key) {
        return invoke_callback(resolver, key, &callback, &arguments, path);
    }

    let concrete = factory.resolve_type(key)?;
    if concrete != *key {
        if let Some(callback) = factory.registries().callback(&concrete) {
            return invoke_callback(resolver, &concrete, &callback, &arguments, path);
        }
    }

    path.enter(&concrete)?;
    let built = build_from_constructor(resolver, &concrete, arguments, path);
    path.leave();
    built
}

fn invoke_callback<R: Resolver + ?Sized>(
    resolver: &R,
    key: &TypeKey,
    callback: &Callback,
    arguments: &Arguments,
    path: &mut ResolutionPath,
) -> Result<Instance> {
    debug!(key = %key, "Building through callback");
    path.enter(key)?;
    let built = path.park_during(|| callback(resolver.as_resolver(), key, arguments));
    path.leave();
    built
}

fn build_from_constructor<R: Resolver + ?Sized>(
    resolver: &R,
    key: &TypeKey,
    arguments: Arguments,
    path: &mut ResolutionPath,
) -> Result<Instance> {
    let descriptor = resolver.factory().catalog().require(key)?;
    let constructor = descriptor
        .constructor_ref()
        .ok_or_else(|| SinaaError::NotInstantiable { key: key.clone() })?;

    let args = match &constructor.signature {
        // No declared constructor, or one without parameters: nothing to bind
        None => Args::new(Arc::new(Signature::new()), Vec::new()),
        Some(signature) if signature.is_empty() => Args::new(signature.clone(), Vec::new()),
        Some(signature) => {
            let values = bind(resolver, signature, arguments, path)?;
            Args::new(signature.clone(), values)
        }
    };

    trace!(key = %key, args = args.len(), "Calling constructor");
    (constructor.build)(&args)
}

fn create_from_member<R: Resolver + ?Sized>(
    resolver: &R,
    key: &TypeKey,
    name: &str,
    arguments: Arguments,
    path: &mut ResolutionPath,
) -> Result<Instance> {
    let factory = resolver.factory();
    let catalog = factory.catalog();
    catalog.require(key)?;

    let member = match catalog.find_member(key, name) {
        Some(member) => member,
        None => {
            let concrete = factory.resolve_type(key)?;
            catalog
                .find_member(&concrete, name)
                .ok_or_else(|| SinaaError::MemberNotFound {
                    key: key.clone(),
                    member: name.to_owned(),
                })?
        }
    };
    let signature = member.signature.clone();

    match &member.kind {
        MemberKind::Static(body) => {
            debug!(key = %key, member = name, "Building through static member");
            let values = bind(resolver, &signature, arguments, path)?;
            body(&Args::new(signature, values))
        }
        MemberKind::Instance(init) => {
            debug!(key = %key, member = name, "Building then initializing");
            let values = bind(resolver, &signature, arguments.clone(), path)?;
            let mut instance = create_instance(resolver, key, arguments, path)?;
            init(&mut instance, &Args::new(signature, values))?;
            Ok(instance)
        }
    }
}
