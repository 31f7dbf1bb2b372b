use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use crate::members::{Attributes, BeanDecl};
use crate::registry::Bindable;

// -----------------------------------------------------------------------------
// Scalar

/// The document representation of a scalar type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    Bool,
    Int,
    UInt,
    Float,
    Str,
}

/// A decoded scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

/// A type written as a single document scalar.
pub trait ScalarType: Bindable + Sized {
    const KIND: Scalar;

    fn to_value(&self) -> ScalarValue;

    /// Converts back, `None` if the value is out of range or of another kind.
    fn from_value(value: ScalarValue) -> Option<Self>;
}

/// Erased [`ScalarType`] operations.
#[derive(Clone, Copy)]
pub struct ScalarOps {
    kind: Scalar,
    read: fn(&dyn Any) -> Option<ScalarValue>,
    write: fn(ScalarValue) -> Option<Box<dyn Any>>,
}

fn read_scalar<T: ScalarType>(value: &dyn Any) -> Option<ScalarValue> {
    value.downcast_ref::<T>().map(T::to_value)
}

fn write_scalar<T: ScalarType>(value: ScalarValue) -> Option<Box<dyn Any>> {
    T::from_value(value).map(|v| Box::new(v) as Box<dyn Any>)
}

impl ScalarOps {
    #[inline]
    pub fn of<T: ScalarType>() -> Self {
        Self {
            kind: T::KIND,
            read: read_scalar::<T>,
            write: write_scalar::<T>,
        }
    }

    #[inline]
    pub fn kind(&self) -> Scalar {
        self.kind
    }

    /// Reads the scalar value, `None` if `value` is not of the type.
    #[inline]
    pub fn read(&self, value: &dyn Any) -> Option<ScalarValue> {
        (self.read)(value)
    }

    /// Builds a value, `None` if out of range.
    #[inline]
    pub fn write(&self, value: ScalarValue) -> Option<Box<dyn Any>> {
        (self.write)(value)
    }
}

// -----------------------------------------------------------------------------
// Optional and boxed

/// Erased operations of an `Option<T>`-like type.
#[derive(Clone, Copy)]
pub struct OptionalOps {
    inner: TypeId,
    get: fn(&dyn Any) -> Option<Option<&dyn Any>>,
    some: fn(Box<dyn Any>) -> Option<Box<dyn Any>>,
    none: fn() -> Box<dyn Any>,
}

impl OptionalOps {
    /// Creates the operations.
    ///
    /// - `get`: `None` if the value is not of the type, otherwise the content.
    /// - `some`: wraps a content value, `None` on a type mismatch.
    /// - `none`: the empty value.
    #[inline]
    pub fn new(
        inner: TypeId,
        get: fn(&dyn Any) -> Option<Option<&dyn Any>>,
        some: fn(Box<dyn Any>) -> Option<Box<dyn Any>>,
        none: fn() -> Box<dyn Any>,
    ) -> Self {
        Self {
            inner,
            get,
            some,
            none,
        }
    }

    /// Returns the [`TypeId`] of the content.
    #[inline]
    pub fn inner(&self) -> TypeId {
        self.inner
    }

    #[inline]
    pub fn get<'a>(&self, value: &'a dyn Any) -> Option<Option<&'a dyn Any>> {
        (self.get)(value)
    }

    #[inline]
    pub fn some(&self, value: Box<dyn Any>) -> Option<Box<dyn Any>> {
        (self.some)(value)
    }

    #[inline]
    pub fn none(&self) -> Box<dyn Any> {
        (self.none)()
    }
}

/// Erased operations of a transparent box such as `Box<T>` or `Arc<T>`.
#[derive(Clone, Copy)]
pub struct BoxedOps {
    inner: TypeId,
    get: fn(&dyn Any) -> Option<&dyn Any>,
    wrap: fn(Box<dyn Any>) -> Option<Box<dyn Any>>,
}

impl BoxedOps {
    #[inline]
    pub fn new(
        inner: TypeId,
        get: fn(&dyn Any) -> Option<&dyn Any>,
        wrap: fn(Box<dyn Any>) -> Option<Box<dyn Any>>,
    ) -> Self {
        Self { inner, get, wrap }
    }

    #[inline]
    pub fn inner(&self) -> TypeId {
        self.inner
    }

    #[inline]
    pub fn get<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any> {
        (self.get)(value)
    }

    #[inline]
    pub fn wrap(&self, value: Box<dyn Any>) -> Option<Box<dyn Any>> {
        (self.wrap)(value)
    }
}

// -----------------------------------------------------------------------------
// Containers

/// Erased operations of a sequence or a fixed-length array.
#[derive(Clone, Copy)]
pub struct SequenceOps {
    element: TypeId,
    fixed_len: Option<usize>,
    items: fn(&dyn Any) -> Option<Vec<&dyn Any>>,
    collect: fn(Vec<Box<dyn Any>>) -> Option<Box<dyn Any>>,
}

impl SequenceOps {
    /// Creates the operations.
    ///
    /// `collect` returns `None` on an element type mismatch or a length
    /// different from `fixed_len`.
    #[inline]
    pub fn new(
        element: TypeId,
        fixed_len: Option<usize>,
        items: fn(&dyn Any) -> Option<Vec<&dyn Any>>,
        collect: fn(Vec<Box<dyn Any>>) -> Option<Box<dyn Any>>,
    ) -> Self {
        Self {
            element,
            fixed_len,
            items,
            collect,
        }
    }

    #[inline]
    pub fn element(&self) -> TypeId {
        self.element
    }

    #[inline]
    pub fn fixed_len(&self) -> Option<usize> {
        self.fixed_len
    }

    #[inline]
    pub fn items<'a>(&self, value: &'a dyn Any) -> Option<Vec<&'a dyn Any>> {
        (self.items)(value)
    }

    #[inline]
    pub fn collect(&self, items: Vec<Box<dyn Any>>) -> Option<Box<dyn Any>> {
        (self.collect)(items)
    }
}

/// Erased operations of a map with string keys.
#[derive(Clone, Copy)]
pub struct MapOps {
    value: TypeId,
    entries: fn(&dyn Any) -> Option<Vec<(&str, &dyn Any)>>,
    collect: fn(Vec<(String, Box<dyn Any>)>) -> Option<Box<dyn Any>>,
}

impl MapOps {
    /// Creates the operations. `entries` must yield a stable order.
    #[inline]
    pub fn new(
        value: TypeId,
        entries: fn(&dyn Any) -> Option<Vec<(&str, &dyn Any)>>,
        collect: fn(Vec<(String, Box<dyn Any>)>) -> Option<Box<dyn Any>>,
    ) -> Self {
        Self {
            value,
            entries,
            collect,
        }
    }

    #[inline]
    pub fn value(&self) -> TypeId {
        self.value
    }

    #[inline]
    pub fn entries<'a>(&self, value: &'a dyn Any) -> Option<Vec<(&'a str, &'a dyn Any)>> {
        (self.entries)(value)
    }

    #[inline]
    pub fn collect(&self, entries: Vec<(String, Box<dyn Any>)>) -> Option<Box<dyn Any>> {
        (self.collect)(entries)
    }
}

// -----------------------------------------------------------------------------
// Enum

/// One unit variant of an enum.
#[derive(Debug, Clone)]
pub struct EnumVariant {
    name: &'static str,
    value: Option<&'static str>,
    attributes: Attributes,
}

impl EnumVariant {
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            value: None,
            attributes: Attributes::new(),
        }
    }

    /// Overrides the written value.
    #[inline]
    pub fn with_value(mut self, value: &'static str) -> Self {
        self.value = Some(value);
        self
    }

    #[inline]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the written value: the override, or the variant name.
    #[inline]
    pub fn value(&self) -> &'static str {
        self.value.unwrap_or(self.name)
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

/// Erased operations of a unit-variant enum.
#[derive(Debug, Clone)]
pub struct EnumOps {
    variants: Vec<EnumVariant>,
    index_of: fn(&dyn Any) -> Option<usize>,
    from_index: fn(usize) -> Option<Box<dyn Any>>,
}

impl EnumOps {
    #[inline]
    pub fn new(
        variants: Vec<EnumVariant>,
        index_of: fn(&dyn Any) -> Option<usize>,
        from_index: fn(usize) -> Option<Box<dyn Any>>,
    ) -> Self {
        Self {
            variants,
            index_of,
            from_index,
        }
    }

    #[inline]
    pub fn variants(&self) -> &[EnumVariant] {
        &self.variants
    }

    /// Returns the variant of `value`.
    pub fn variant_of(&self, value: &dyn Any) -> Option<&EnumVariant> {
        (self.index_of)(value).and_then(|i| self.variants.get(i))
    }

    /// Builds the variant whose written value is `value`.
    pub fn from_value(&self, value: &str) -> Option<Box<dyn Any>> {
        let index = self.variants.iter().position(|v| v.value() == value)?;
        (self.from_index)(index)
    }
}

// -----------------------------------------------------------------------------
// TypeShape

/// The structural kind of a registered type, with its erased operations.
#[derive(Clone)]
pub enum TypeShape {
    Scalar(ScalarOps),
    Optional(OptionalOps),
    Boxed(BoxedOps),
    Sequence(SequenceOps),
    Map(MapOps),
    Enum(EnumOps),
    Bean(BeanDecl),
    /// Only convertible through a converter registered for the exact type.
    Opaque,
}

impl TypeShape {
    /// Returns the name of the shape.
    pub const fn kind(&self) -> &'static str {
        match self {
            TypeShape::Scalar(_) => "scalar",
            TypeShape::Optional(_) => "optional",
            TypeShape::Boxed(_) => "boxed",
            TypeShape::Sequence(_) => "sequence",
            TypeShape::Map(_) => "map",
            TypeShape::Enum(_) => "enum",
            TypeShape::Bean(_) => "bean",
            TypeShape::Opaque => "opaque",
        }
    }

    #[inline]
    pub fn as_bean(&self) -> Option<&BeanDecl> {
        match self {
            TypeShape::Bean(decl) => Some(decl),
            _ => None,
        }
    }
}

impl fmt::Debug for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}
