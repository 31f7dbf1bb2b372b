//! Error taxonomy of the engine.
//!
//! - [`TypeResolutionError`]: a generic variable could not be bound.
//! - [`BindError`]: everything else, wrapping [`TypeResolutionError`].
//!
//! Construction-time errors (introspection, conflicts, unsupported types) are
//! cached with the converter or descriptor that failed, so they are reported
//! consistently for that type without affecting others.

use alloc::string::String;
use alloc::vec::Vec;

use thiserror::Error;

// -----------------------------------------------------------------------------
// TypeResolutionError

/// An error produced by the type algebra.
///
/// Callers that may fall back to the raw type use
/// [`resolve_or_raw`](crate::types::resolve_or_raw) instead of propagating it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TypeResolutionError {
    /// A type variable has no argument at the usage site.
    #[error("type variable `{variable}` cannot be bound in `{context}`")]
    Unbound { variable: String, context: String },
    /// The usage site is not an instantiation of the declaration.
    #[error("`{usage}` is not a usage of `{declaration}`")]
    NotAUsage { declaration: String, usage: String },
    /// The usage site supplies a different number of arguments.
    #[error("`{usage}` binds {found} type arguments, `{declaration}` declares {expected}")]
    Arity {
        declaration: String,
        usage: String,
        expected: usize,
        found: usize,
    },
}

// -----------------------------------------------------------------------------
// BindError

/// An error produced while building converters or binding values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BindError {
    /// See [`TypeResolutionError`].
    #[error(transparent)]
    TypeResolution(#[from] TypeResolutionError),
    /// No viable creation strategy, or a member table that cannot be used.
    #[error("cannot introspect `{ty}`: {reason}")]
    BeanIntrospection {
        ty: String,
        reason: String,
        unresolved: Vec<String>,
    },
    /// No factory in the chain produced a converter.
    #[error("no converter available for `{ty}`")]
    UnsupportedType { ty: String },
    /// Two members resolve to the same property and cannot be merged.
    #[error("conflicting property `{name}` in `{ty}`: `{first}` and `{second}`")]
    ConflictingProperty {
        ty: String,
        name: String,
        first: String,
        second: String,
    },
    /// A document fragment does not have the expected shape.
    #[error("at `{path}`: expected {expected}, found {found}")]
    Malformed {
        path: String,
        expected: String,
        found: String,
    },
    /// A required property is absent from the document.
    #[error("at `{path}`: missing property `{name}`")]
    MissingProperty { path: String, name: String },
    /// The document carries a property the target does not know.
    #[error("at `{path}`: unknown property `{name}`")]
    UnknownProperty { path: String, name: String },
    /// An erased value is not of the expected type.
    #[error("at `{path}`: value is not a `{expected}`")]
    ValueMismatch { path: String, expected: &'static str },
    /// The writer or reader was driven out of order.
    #[error("document: {0}")]
    Document(String),
    /// Raised by user code such as adapters.
    #[error("at `{path}`: {message}")]
    Custom { path: String, message: String },
}

impl BindError {
    /// Shorthand for [`BindError::UnsupportedType`].
    #[inline]
    pub fn unsupported(ty: impl core::fmt::Display) -> Self {
        use alloc::string::ToString;
        Self::UnsupportedType { ty: ty.to_string() }
    }

    /// Shorthand for [`BindError::ValueMismatch`] of `T`.
    #[inline]
    pub fn mismatch<T: ?Sized>(path: impl Into<String>) -> Self {
        Self::ValueMismatch {
            path: path.into(),
            expected: core::any::type_name::<T>(),
        }
    }

    /// Shorthand for [`BindError::Document`].
    #[inline]
    pub fn document(message: impl Into<String>) -> Self {
        Self::Document(message.into())
    }

    /// Creates a [`BindError::Custom`] without a location.
    ///
    /// The engine fills in the location when the error leaves user code.
    #[inline]
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            path: String::new(),
            message: message.into(),
        }
    }

    /// Sets the location of a [`BindError::Custom`] raised without one.
    pub(crate) fn at(self, location: &str) -> Self {
        match self {
            Self::Custom { path, message } if path.is_empty() => Self::Custom {
                path: location.into(),
                message,
            },
            other => other,
        }
    }

    /// Returns `true` for errors raised while building a converter or descriptor.
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::TypeResolution(_)
                | Self::BeanIntrospection { .. }
                | Self::UnsupportedType { .. }
                | Self::ConflictingProperty { .. }
        )
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;

    use super::{BindError, TypeResolutionError};

    #[test]
    fn display_messages() {
        let err = BindError::Malformed {
            path: "$.a[1]".into(),
            expected: "integer".into(),
            found: "string".into(),
        };
        assert_eq!(err.to_string(), "at `$.a[1]`: expected integer, found string");

        let err: BindError = TypeResolutionError::Unbound {
            variable: "T".into(),
            context: "Page".into(),
        }
        .into();
        assert_eq!(err.to_string(), "type variable `T` cannot be bound in `Page`");
        assert!(err.is_resolution_error());
    }

    #[test]
    fn introspection_lists_members() {
        let err = BindError::BeanIntrospection {
            ty: "Point".into(),
            reason: "no viable creation strategy".into(),
            unresolved: vec!["new#1".into()],
        };
        assert!(err.is_resolution_error());
        assert!(!BindError::document("x").is_resolution_error());
    }

    #[test]
    fn custom_errors_get_a_location() {
        let err = BindError::custom("bad cents").at("$.total");
        assert_eq!(err.to_string(), "at `$.total`: bad cents");

        let located = BindError::Custom {
            path: "$.a".into(),
            message: "m".into(),
        };
        assert_eq!(located.clone().at("$.b"), located);
    }
}
