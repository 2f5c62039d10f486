//! Type resolution and cycle tracking.
//!
//! [`TypeResolver`] turns any catalog type into an instantiable one:
//! - instantiable types resolve to themselves
//! - explicit concrete-type mappings are followed
//! - otherwise the catalog is searched for implementers / descendants
//!
//! [`ResolutionPath`] records the types under construction so that a type
//! needed again while it is still being built fails with
//! [`SinaaError::CircularDependency`] instead of overflowing the stack.
//! While a callback runs, its path is parked in a thread-local slot so that
//! construction started from inside the callback continues the same path.

use std::cell::RefCell;

use tracing::{debug, instrument, trace, warn};

use crate::catalog::TypeCatalog;
use crate::error::{CircularDependencyError, Result, SinaaError, UnresolvedTypeError};
use crate::key::TypeKey;
use crate::registry::Registries;
use crate::settings::AmbiguityPolicy;

/// Maps abstract types and interfaces to concrete, instantiable types.
pub(crate) struct TypeResolver<'a> {
    pub catalog: &'a TypeCatalog,
    pub registries: &'a Registries,
    pub policy: AmbiguityPolicy,
}

impl TypeResolver<'_> {
    /// Resolves `key` to an instantiable type.
    ///
    /// # Errors
    /// - [`SinaaError::UnknownType`]: a key on the way is not described
    /// - [`SinaaError::UnresolvedType`]: nothing stands in for an abstract type
    /// - [`SinaaError::AmbiguousImplementation`]: several candidates under [`AmbiguityPolicy::Reject`]
    /// - [`SinaaError::CircularDependency`]: mappings or candidates loop
    #[instrument(skip(self), name = "resolve_type", level = "trace")]
    pub fn resolve(&self, key: &TypeKey) -> Result<TypeKey> {
        let mut visited: Vec<TypeKey> = Vec::new();
        let mut current = key.clone();

        loop {
            if visited.contains(&current) {
                visited.push(current);
                warn!(chain = ?visited, "Type resolution loops");
                return Err(SinaaError::CircularDependency(CircularDependencyError {
                    chain: visited,
                }));
            }

            let descriptor = self.catalog.require(&current)?;
            if descriptor.is_instantiable() {
                trace!(requested = %key, resolved = %current, "Resolved type");
                return Ok(current);
            }
            visited.push(current.clone());

            // Explicit mappings win over searching the catalog
            if let Some(mapped) = self.registries.concrete_type(&current) {
                trace!(from = %current, to = %mapped, "Following concrete type mapping");
                current = mapped;
                continue;
            }

            current = self.pick_candidate(&current)?;
        }
    }

    fn pick_candidate(&self, key: &TypeKey) -> Result<TypeKey> {
        let candidates = self.catalog.implementers(key);

        match (candidates.as_slice(), self.policy) {
            ([], _) => Err(SinaaError::UnresolvedType(UnresolvedTypeError {
                requested: key.clone(),
            })),
            ([only], _) => {
                debug!(requested = %key, found = %only, "Found implementer");
                Ok(only.clone())
            }
            ([first, ..], AmbiguityPolicy::FirstByName) => {
                debug!(
                    requested = %key,
                    found = %first,
                    candidates = candidates.len(),
                    "Several implementers, taking the first by name"
                );
                Ok(first.clone())
            }
            (_, AmbiguityPolicy::Reject) => {
                let instantiable: Vec<&TypeKey> = candidates
                    .iter()
                    .filter(|c| self.catalog.get(c).is_some_and(|d| d.is_instantiable()))
                    .collect();
                match instantiable.as_slice() {
                    [only] => Ok((*only).clone()),
                    [] => Ok(candidates[0].clone()),
                    _ => Err(SinaaError::AmbiguousImplementation {
                        requested: key.clone(),
                        candidates,
                    }),
                }
            }
        }
    }
}

/// Types currently under construction, outermost first.
#[derive(Debug, Default)]
pub(crate) struct ResolutionPath {
    stack: Vec<TypeKey>,
}

thread_local! {
    static PARKED: RefCell<Option<ResolutionPath>> = const { RefCell::new(None) };
}

impl ResolutionPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` on the path parked by an enclosing callback on this thread,
    /// or on a fresh path when there is none.
    pub fn continue_with<T>(f: impl FnOnce(&mut ResolutionPath) -> T) -> T {
        match PARKED.with(|slot| slot.borrow_mut().take()) {
            Some(mut parked) => {
                let out = f(&mut parked);
                PARKED.with(|slot| *slot.borrow_mut() = Some(parked));
                out
            }
            None => f(&mut ResolutionPath::new()),
        }
    }

    /// Parks this path for the duration of `f`.
    pub fn park_during<T>(&mut self, f: impl FnOnce() -> T) -> T {
        let outer = PARKED.with(|slot| slot.borrow_mut().replace(std::mem::take(self)));
        let out = f();
        *self = PARKED
            .with(|slot| std::mem::replace(&mut *slot.borrow_mut(), outer))
            .unwrap_or_default();
        out
    }

    /// Marks `key` as under construction.
    pub fn enter(&mut self, key: &TypeKey) -> Result<()> {
        if let Some(start) = self.stack.iter().position(|k| k == key) {
            let mut chain = self.stack[start..].to_vec();
            chain.push(key.clone());

            warn!(cycle = ?chain, "Circular dependency detected!");
            return Err(SinaaError::CircularDependency(CircularDependencyError { chain }));
        }
        self.stack.push(key.clone());
        trace!(key = %key, depth = self.depth(), "Under construction");
        Ok(())
    }

    pub fn leave(&mut self) {
        self.stack.pop();
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
