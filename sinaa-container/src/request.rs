//! Construction requests and target parsing.
//!
//! The core only sees [`Request`] values. Strings such as `"Type::member"`
//! or `"Type->member"` are accepted through [`IntoRequest`] as a
//! convenience for callers.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SinaaError};
use crate::key::TypeKey;

/// The target of a `create` / `get` call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Request {
    /// Build the type through its constructor or callback.
    Type(TypeKey),
    /// Build through a static factory member, or construct and then run an
    /// instance initializer member.
    Member(TypeKey, String),
}

impl Request {
    pub fn of(key: impl Into<TypeKey>) -> Self {
        Request::Type(key.into())
    }

    pub fn member(key: impl Into<TypeKey>, member: impl Into<String>) -> Self {
        Request::Member(key.into(), member.into())
    }

    pub fn type_key(&self) -> &TypeKey {
        match self {
            Request::Type(key) | Request::Member(key, _) => key,
        }
    }

    /// Parses `Type`, `Type::member` or `Type->member`.
    ///
    /// A separator at the very start leaves the string a plain type name.
    /// Repeated or mixed separators and empty member names are rejected.
    ///
    /// # Examples
    /// ```
    /// use sinaa_container::request::Request;
    ///
    /// assert_eq!(Request::parse("SingletonA::get").unwrap(), Request::member("SingletonA", "get"));
    /// assert_eq!(Request::parse("SingletonA->get").unwrap(), Request::member("SingletonA", "get"));
    /// assert_eq!(Request::parse("SimpleB").unwrap(), Request::of("SimpleB"));
    /// assert!(Request::parse("A::b::c").is_err());
    /// ```
    pub fn parse(target: &str) -> Result<Self> {
        let colons = separator_at(target, "::");
        let arrow = separator_at(target, "->");

        match (colons, arrow) {
            (Some(_), Some(_)) => Err(ambiguous(target, "both '::' and '->' separators")),
            (Some(_), None) => split(target, "::"),
            (None, Some(_)) => split(target, "->"),
            (None, None) => Ok(Request::Type(TypeKey::new(target))),
        }
    }
}

fn separator_at(target: &str, separator: &str) -> Option<usize> {
    target.find(separator).filter(|&at| at > 0)
}

fn split(target: &str, separator: &str) -> Result<Request> {
    let mut parts = target.split(separator);
    let (Some(key), Some(member), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ambiguous(target, "more than one separator"));
    };
    if member.is_empty() {
        return Err(ambiguous(target, "empty member name"));
    }
    Ok(Request::Member(TypeKey::new(key), member.to_owned()))
}

fn ambiguous(target: &str, reason: &'static str) -> SinaaError {
    SinaaError::AmbiguousTarget {
        target: target.to_owned(),
        reason,
    }
}

impl FromStr for Request {
    type Err = SinaaError;

    fn from_str(target: &str) -> Result<Self> {
        Request::parse(target)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Type(key) => write!(f, "{key}"),
            Request::Member(key, member) => write!(f, "{key}::{member}"),
        }
    }
}

/// Anything that names a construction target.
pub trait IntoRequest {
    fn into_request(self) -> Result<Request>;
}

impl IntoRequest for Request {
    fn into_request(self) -> Result<Request> {
        Ok(self)
    }
}

impl IntoRequest for &Request {
    fn into_request(self) -> Result<Request> {
        Ok(self.clone())
    }
}

impl IntoRequest for TypeKey {
    fn into_request(self) -> Result<Request> {
        Ok(Request::Type(self))
    }
}

impl IntoRequest for &TypeKey {
    fn into_request(self) -> Result<Request> {
        Ok(Request::Type(self.clone()))
    }
}

impl IntoRequest for &str {
    fn into_request(self) -> Result<Request> {
        Request::parse(self)
    }
}

impl IntoRequest for String {
    fn into_request(self) -> Result<Request> {
        Request::parse(&self)
    }
}

impl<K, M> IntoRequest for (K, M)
where
    K: Into<TypeKey>,
    M: Into<String>,
{
    fn into_request(self) -> Result<Request> {
        Ok(Request::Member(self.0.into(), self.1.into()))
    }
}
