use core::fmt;
use core::hash::{Hash, Hasher};

// -----------------------------------------------------------------------------
// RawType

/// The identity of a type declaration, with its generic arguments erased.
///
/// Two raw types are equal when their paths are equal, the name is only
/// used for display and for default root names.
///
/// # Examples
///
/// ```
/// use vc_bind::types::RawType;
///
/// let vec = RawType::new("alloc::vec::Vec", "Vec");
/// assert_eq!(vec, RawType::new("alloc::vec::Vec", "vec"));
/// assert_eq!(vec.name(), "Vec");
/// assert!(!vec.is_any());
/// assert!(RawType::ANY.is_any());
/// ```
#[derive(Clone, Copy)]
pub struct RawType {
    path: &'static str,
    name: &'static str,
}

impl RawType {
    /// The universal type, every type is assignable to it.
    pub const ANY: RawType = RawType::new("any", "any");

    /// Creates a raw identity from a full path and a short name.
    #[inline]
    pub const fn new(path: &'static str, name: &'static str) -> Self {
        Self { path, name }
    }

    /// Returns the full path, e.g. `alloc::vec::Vec`.
    #[inline]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// Returns the short name, e.g. `Vec`.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` for [`RawType::ANY`].
    #[inline]
    pub fn is_any(&self) -> bool {
        self.path == Self::ANY.path
    }
}

impl PartialEq for RawType {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for RawType {}

impl Hash for RawType {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl fmt::Debug for RawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path)
    }
}

impl fmt::Display for RawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.path)
    }
}

// -----------------------------------------------------------------------------
// Shape

/// The structural shape flag of a [`TypeDescriptor`](super::TypeDescriptor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Shape {
    /// Any type without special structure.
    #[default]
    Plain,
    /// A growable collection of its first argument, e.g. `Vec<T>`.
    Sequence,
    /// A fixed-length array of its first argument.
    Array(usize),
    /// A transparent box around its first argument, e.g. `Box<T>`.
    ///
    /// Boxed and unboxed descriptors are treated as the same type when matching.
    Boxed,
}

impl Shape {
    /// Returns `true` for [`Shape::Sequence`] and [`Shape::Array`].
    #[inline]
    pub const fn is_sequence(self) -> bool {
        matches!(self, Shape::Sequence | Shape::Array(_))
    }
}
