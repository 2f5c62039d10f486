//! Error types for Sinaa factory operations.
//!
//! Every error names the type, member and parameter involved, and the
//! larger ones carry a hint about what to register or pass.

use std::fmt;

use sinaa_support::rendering::{render_chain, render_list};

use crate::key::TypeKey;

/// Main error type for all Sinaa operations.
#[derive(Debug, thiserror::Error)]
pub enum SinaaError {
    /// A required parameter got no value from the caller, the factory or a default.
    #[error("{}", .0)]
    MissingArgument(MissingArgumentError),

    /// No concrete type could be found for an abstract type or interface.
    #[error("{}", .0)]
    UnresolvedType(UnresolvedTypeError),

    /// The type is not described in the catalog.
    #[error("{}", .0)]
    UnknownType(UnknownTypeError),

    /// A target string could not be split into type and member.
    #[error("Ambiguous target {target:?}: {reason}")]
    AmbiguousTarget { target: String, reason: &'static str },

    /// Several implementers exist and the factory is set to reject ambiguity.
    #[error(
        "Ambiguous implementation for {requested}: candidates {}\n  Hint: map it explicitly with set_concrete_type()",
        render_list(.candidates)
    )]
    AmbiguousImplementation {
        requested: TypeKey,
        candidates: Vec<TypeKey>,
    },

    /// The named member does not exist on the type or its ancestors.
    #[error("Member not found: {key}::{member}")]
    MemberNotFound { key: TypeKey, member: String },

    /// The resolved type has no constructor.
    #[error("Type {key} is not instantiable\n  Hint: give its descriptor a constructor or map it to a concrete type")]
    NotInstantiable { key: TypeKey },

    /// A bound value does not convert to what the constructor asked for.
    #[error("Argument mismatch for [{declaring}::{member}:{parameter}]: expected {expected}, found {found}")]
    ArgumentMismatch {
        declaring: String,
        member: String,
        parameter: String,
        expected: &'static str,
        found: &'static str,
    },

    /// An initializer needs mutable access to an instance already shared.
    #[error("Cannot run {key}::{member} on a shared instance")]
    SharedInstance { key: TypeKey, member: String },

    /// A type is needed again while it is still being built.
    #[error("{}", .0)]
    CircularDependency(CircularDependencyError),

    /// A constructor, member or callback returned an error of its own.
    #[error("Failed to construct {key}: {source}")]
    ConstructionFailed {
        key: TypeKey,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Factory settings could not be read.
    #[error("Invalid factory settings: {0}")]
    Settings(#[from] serde_json::Error),
}

/// A required parameter could not be bound.
#[derive(Debug)]
pub struct MissingArgumentError {
    /// Type declaring the constructor or member
    pub declaring: String,
    /// Constructor or member being bound
    pub member: String,
    /// The parameter left without a value
    pub parameter: String,
}

impl fmt::Display for MissingArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "At least one required parameter is missing [{}::{}:{}]",
            self.declaring, self.member, self.parameter
        )?;
        write!(
            f,
            "\n  Hint: pass {:?} by name or position, or configure a default for {}",
            self.parameter, self.declaring
        )
    }
}

/// No concrete type was found.
#[derive(Debug)]
pub struct UnresolvedTypeError {
    pub requested: TypeKey,
}

impl fmt::Display for UnresolvedTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No concrete type found for {}", self.requested)?;
        write!(
            f,
            "\n  Hint: map it with set_concrete_type() or describe a type that extends/implements it"
        )
    }
}

/// The type is absent from the catalog.
#[derive(Debug)]
pub struct UnknownTypeError {
    pub requested: TypeKey,
    /// Similar names that ARE described (for "did you mean?" suggestions)
    pub suggestions: Vec<String>,
}

impl fmt::Display for UnknownTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type not described in catalog: {}", self.requested)?;

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        Ok(())
    }
}

/// Shows the full chain so you can see WHERE the cycle is.
#[derive(Debug)]
pub struct CircularDependencyError {
    /// Example: ["A", "B", "C", "A"]
    pub chain: Vec<TypeKey>,
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circular dependency detected:\n  ")?;
        write!(f, "{}", render_chain(&self.chain))?;
        write!(
            f,
            "\n  Hint: pass one of these values explicitly or break the cycle with a callback"
        )
    }
}

/// Convenient Result type for Sinaa operations.
pub type Result<T> = std::result::Result<T, SinaaError>;
