use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use crate::collections::TypeIdMap;

// -----------------------------------------------------------------------------
// Attributes

/// A collection of declarative attributes for a type, member or variant.
///
/// Attributes are stored by their [`TypeId`], so there can only be one
/// attribute per type. Cloning is cheap, values are shared.
///
/// # Examples
///
/// ```
/// use vc_bind::members::{Attributes, Ignore, PropertyOptions};
///
/// let attrs = Attributes::new()
///     .with_attribute(PropertyOptions::new().rename("id"))
///     .with_attribute(10u8);
///
/// assert!(!attrs.contains::<Ignore>());
/// assert_eq!(attrs.get::<PropertyOptions>().unwrap().name(), Some("id"));
/// assert_eq!(*attrs.get::<u8>().unwrap(), 10);
/// ```
#[derive(Clone, Default)]
pub struct Attributes {
    attributes: TypeIdMap<Arc<dyn Any + Send + Sync>>,
}

impl Attributes {
    /// Creates an empty collection.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute, replacing the previous one of the same type.
    #[inline]
    pub fn with_attribute<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.insert(value);
        self
    }

    /// Inserts an attribute, replacing the previous one of the same type.
    #[inline]
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.attributes.insert(TypeId::of::<T>(), Arc::new(value));
    }

    /// Returns `true` if an attribute of type `T` is present.
    #[inline]
    pub fn contains<T: Any>(&self) -> bool {
        self.attributes.contains_key(&TypeId::of::<T>())
    }

    /// Returns the attribute of type `T`, if present.
    #[inline]
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.attributes
            .get(&TypeId::of::<T>())
            .and_then(|value| <dyn Any>::downcast_ref(&**value))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attributes")
            .field("len", &self.attributes.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Declarative attributes

/// Explicit per-property metadata.
///
/// Its presence includes the member regardless of visibility, unless one of
/// the directions is disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyOptions {
    name: Option<&'static str>,
    aliases: Vec<&'static str>,
    serialize: bool,
    deserialize: bool,
}

impl Default for PropertyOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyOptions {
    /// Options that include the member in both directions under its own name.
    #[inline]
    pub const fn new() -> Self {
        Self {
            name: None,
            aliases: Vec::new(),
            serialize: true,
            deserialize: true,
        }
    }

    /// Sets the property name.
    #[inline]
    pub fn rename(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Adds a name accepted when deserializing.
    #[inline]
    pub fn alias(mut self, alias: &'static str) -> Self {
        self.aliases.push(alias);
        self
    }

    /// Enables or disables serialization.
    #[inline]
    pub fn serialize(mut self, enabled: bool) -> Self {
        self.serialize = enabled;
        self
    }

    /// Enables or disables deserialization.
    #[inline]
    pub fn deserialize(mut self, enabled: bool) -> Self {
        self.deserialize = enabled;
        self
    }

    #[inline]
    pub fn name(&self) -> Option<&'static str> {
        self.name
    }

    #[inline]
    pub fn aliases(&self) -> &[&'static str] {
        &self.aliases
    }

    #[inline]
    pub fn serializes(&self) -> bool {
        self.serialize
    }

    #[inline]
    pub fn deserializes(&self) -> bool {
        self.deserialize
    }
}

/// Excludes a member in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ignore;

/// The name under which a bean is wrapped when root values are wrapped.
///
/// Without it, the simple type name is used with its first letter lower-cased.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootName(pub &'static str);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Attributes, Ignore, PropertyOptions, RootName};

    #[test]
    fn later_insertions_replace() {
        let attrs = Attributes::new()
            .with_attribute(RootName("a"))
            .with_attribute(RootName("b"));
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get::<RootName>(), Some(&RootName("b")));
        assert!(attrs.get::<Ignore>().is_none());
    }

    #[test]
    fn options_builder() {
        let opts = PropertyOptions::new()
            .rename("x")
            .alias("posX")
            .deserialize(false);
        assert_eq!(opts.name(), Some("x"));
        assert_eq!(opts.aliases(), &["posX"]);
        assert!(opts.serializes());
        assert!(!opts.deserializes());
        assert_eq!(PropertyOptions::default(), PropertyOptions::new());
    }
}
