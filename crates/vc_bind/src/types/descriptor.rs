use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::{Any, TypeId};
use core::fmt;
use core::hash::{Hash, Hasher};

use super::{RawType, Shape};

// -----------------------------------------------------------------------------
// TypeVar

/// A free type variable, optionally bounded.
///
/// An unbounded variable behaves like [`TypeDescriptor::any`] when it has to be
/// replaced by a concrete type.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeVar {
    name: &'static str,
    bound: Option<TypeDescriptor>,
}

impl TypeVar {
    /// Creates an unbounded variable.
    #[inline]
    pub const fn new(name: &'static str) -> Self {
        Self { name, bound: None }
    }

    /// Creates a variable with an upper bound.
    #[inline]
    pub fn bounded(name: &'static str, bound: TypeDescriptor) -> Self {
        Self {
            name,
            bound: Some(bound),
        }
    }

    /// Returns the variable's name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the upper bound, if declared.
    #[inline]
    pub fn bound(&self) -> Option<&TypeDescriptor> {
        self.bound.as_ref()
    }

    /// Returns the bound, or `any` for an unbounded variable.
    pub fn erasure(&self) -> TypeDescriptor {
        self.bound.clone().unwrap_or_else(TypeDescriptor::any)
    }
}

impl fmt::Debug for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.bound {
            Some(bound) => write!(f, "?{}: {bound}", self.name),
            None => write!(f, "?{}", self.name),
        }
    }
}

// -----------------------------------------------------------------------------
// TypeArg

/// One argument of a parameterized [`TypeDescriptor`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum TypeArg {
    /// A bound argument.
    Type(TypeDescriptor),
    /// A free variable.
    Var(TypeVar),
}

impl TypeArg {
    /// Shorthand for an unbounded [`TypeArg::Var`].
    #[inline]
    pub const fn var(name: &'static str) -> Self {
        Self::Var(TypeVar::new(name))
    }

    /// Shorthand for a bounded [`TypeArg::Var`].
    #[inline]
    pub fn bounded(name: &'static str, bound: TypeDescriptor) -> Self {
        Self::Var(TypeVar::bounded(name, bound))
    }

    /// Returns the bound descriptor, or `None` for a variable.
    #[inline]
    pub fn as_type(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::Type(ty) => Some(ty),
            Self::Var(_) => None,
        }
    }

    /// Returns `true` if this argument is, or contains, a free variable.
    pub fn has_free_variables(&self) -> bool {
        match self {
            Self::Type(ty) => ty.has_free_variables(),
            Self::Var(_) => true,
        }
    }
}

impl From<TypeDescriptor> for TypeArg {
    #[inline]
    fn from(value: TypeDescriptor) -> Self {
        Self::Type(value)
    }
}

impl From<TypeVar> for TypeArg {
    #[inline]
    fn from(value: TypeVar) -> Self {
        Self::Var(value)
    }
}

impl fmt::Debug for TypeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for TypeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(ty) => fmt::Display::fmt(ty, f),
            Self::Var(var) => fmt::Display::fmt(var, f),
        }
    }
}

// -----------------------------------------------------------------------------
// TypeDescriptor

struct Inner {
    raw: RawType,
    args: Box<[TypeArg]>,
    shape: Shape,
    type_id: Option<TypeId>,
}

/// An immutable, normalized representation of a possibly generic type.
///
/// A descriptor is made of:
/// - a [`RawType`] identity,
/// - an ordered list of [`TypeArg`]s, each bound or free,
/// - a [`Shape`] flag,
/// - the concrete [`TypeId`], when it denotes a registered Rust type.
///
/// Equality and hashing are structural and ignore the [`TypeId`],
/// so a descriptor rebuilt from a template compares equal to the
/// descriptor produced by [`Bindable::type_descriptor`].
///
/// Cloning is cheap, the content is shared.
///
/// # Examples
///
/// ```
/// use vc_bind::registry::Bindable;
/// use vc_bind::types::{Shape, TypeArg, TypeDescriptor};
///
/// let ty = <Vec<i32> as Bindable>::type_descriptor();
/// assert_eq!(ty.shape(), Shape::Sequence);
/// assert_eq!(ty.element(), Some(&<i32 as Bindable>::type_descriptor()));
/// assert!(ty.type_id().is_some());
///
/// // A template with a free variable: no `TypeId`.
/// let template = ty.with_args([TypeArg::var("T")]);
/// assert!(template.has_free_variables());
/// assert!(template.type_id().is_none());
/// assert_eq!(template.to_string(), "alloc::vec::Vec<?T>");
/// ```
///
/// [`Bindable::type_descriptor`]: crate::registry::Bindable::type_descriptor
#[derive(Clone)]
pub struct TypeDescriptor {
    inner: Arc<Inner>,
}

impl TypeDescriptor {
    /// Creates a descriptor without arguments and without a concrete type.
    pub fn new(raw: RawType) -> Self {
        Self::build(raw, Box::new([]), Shape::Plain, None)
    }

    /// The universal `any` type.
    #[inline]
    pub fn any() -> Self {
        Self::new(RawType::ANY)
    }

    /// Creates the descriptor of the concrete type `T`.
    pub fn concrete<T: Any>(
        raw: RawType,
        args: impl IntoIterator<Item = TypeArg>,
        shape: Shape,
    ) -> Self {
        Self::build(
            raw,
            args.into_iter().collect(),
            shape,
            Some(TypeId::of::<T>()),
        )
    }

    fn build(raw: RawType, args: Box<[TypeArg]>, shape: Shape, type_id: Option<TypeId>) -> Self {
        Self {
            inner: Arc::new(Inner {
                raw,
                args,
                shape,
                type_id,
            }),
        }
    }

    /// Returns a copy with the arguments replaced.
    ///
    /// The result no longer refers to a concrete type.
    pub fn with_args(&self, args: impl IntoIterator<Item = TypeArg>) -> Self {
        Self::build(self.inner.raw, args.into_iter().collect(), self.inner.shape, None)
    }

    /// Returns the raw identity.
    #[inline]
    pub fn raw(&self) -> RawType {
        self.inner.raw
    }

    /// Returns the arguments, empty for raw usages and non-generic types.
    #[inline]
    pub fn args(&self) -> &[TypeArg] {
        &self.inner.args
    }

    /// Returns the argument at `index`.
    #[inline]
    pub fn arg(&self, index: usize) -> Option<&TypeArg> {
        self.inner.args.get(index)
    }

    /// Returns the shape flag.
    #[inline]
    pub fn shape(&self) -> Shape {
        self.inner.shape
    }

    /// Returns the concrete [`TypeId`], if any.
    #[inline]
    pub fn type_id(&self) -> Option<TypeId> {
        self.inner.type_id
    }

    /// Returns `true` for the universal `any` type.
    #[inline]
    pub fn is_any(&self) -> bool {
        self.inner.raw.is_any()
    }

    /// Returns the bound element type of a sequence, array or box.
    pub fn element(&self) -> Option<&TypeDescriptor> {
        match self.inner.shape {
            Shape::Plain => None,
            _ => self.arg(0).and_then(TypeArg::as_type),
        }
    }

    /// Strips every [`Shape::Boxed`] layer.
    pub fn unboxed(&self) -> &TypeDescriptor {
        let mut current = self;
        while current.shape() == Shape::Boxed {
            match current.arg(0).and_then(TypeArg::as_type) {
                Some(inner) => current = inner,
                None => break,
            }
        }
        current
    }

    /// Returns `true` if any argument, at any depth, is a free variable.
    pub fn has_free_variables(&self) -> bool {
        self.inner.args.iter().any(TypeArg::has_free_variables)
    }

    /// Returns `true` if the arguments are identical, without comparing raw identities.
    #[inline]
    fn same_content(&self, other: &Self) -> bool {
        self.inner.shape == other.inner.shape && self.inner.args == other.inner.args
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.inner.raw == other.inner.raw && self.same_content(other))
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.raw.hash(state);
        self.inner.shape.hash(state);
        self.inner.args.hash(state);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({self})")
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Shape::Array(len) = self.inner.shape {
            return match self.arg(0) {
                Some(elem) => write!(f, "[{elem}; {len}]"),
                None => write!(f, "[_; {len}]"),
            };
        }
        f.write_str(self.inner.raw.path())?;
        if let Some((first, rest)) = self.inner.args.split_first() {
            write!(f, "<{first}")?;
            for arg in rest {
                write!(f, ", {arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use std::collections::HashSet;

    use super::{TypeArg, TypeDescriptor};
    use crate::types::{RawType, Shape};

    const PAGE: RawType = RawType::new("tests::Page", "Page");
    const USER: RawType = RawType::new("tests::User", "User");

    #[test]
    fn structural_equality_ignores_type_id() {
        let user = TypeDescriptor::new(USER);
        let a = TypeDescriptor::concrete::<u8>(PAGE, [TypeArg::Type(user.clone())], Shape::Plain);
        let b = TypeDescriptor::new(PAGE).with_args([TypeArg::Type(user)]);
        assert!(a.type_id().is_some());
        assert!(b.type_id().is_none());
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn display_and_unboxing() {
        let user = TypeDescriptor::new(USER);
        let boxed = TypeDescriptor::new(RawType::new("alloc::boxed::Box", "Box"))
            .with_args([TypeArg::Type(user.clone())]);
        // `with_args` keeps the shape of the source descriptor.
        assert_eq!(boxed.unboxed(), &boxed);

        let boxed = TypeDescriptor::concrete::<u8>(
            RawType::new("alloc::boxed::Box", "Box"),
            [TypeArg::Type(user.clone())],
            Shape::Boxed,
        );
        assert_eq!(boxed.unboxed(), &user);
        assert_eq!(boxed.to_string(), "alloc::boxed::Box<tests::User>");

        let array = TypeDescriptor::concrete::<u8>(
            RawType::new("array", "array"),
            [TypeArg::Type(user)],
            Shape::Array(3),
        );
        assert_eq!(array.to_string(), "[tests::User; 3]");
        assert!(array.shape().is_sequence());
    }
}
