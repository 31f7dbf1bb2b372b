//! Provide the generic type algebra.
//!
//! ## Menu
//!
//! - [`RawType`]: The identity of a declaration, generic arguments erased.
//! - [`Shape`]: Structural flag of a descriptor: plain, sequence, array or box.
//! - [`TypeDescriptor`]: A raw identity plus ordered [`TypeArg`]s, structurally compared.
//!     - [`TypeArg`]: Either a bound descriptor or a free [`TypeVar`].
//!     - [`TypeVar`]: A named variable with an optional upper bound.
//! - [`GenericDecl`]: Declared [`TypeParam`]s and [`Supertype`] templates of a raw type.
//!     - [`Upcast`]: Borrows the embedded supertype out of a value.
//! - [`DeclarationLookup`]: A source of declarations, usually the
//!   [`TypeRegistry`](crate::registry::TypeRegistry).
//!
//! ## Operations
//!
//! - [`raw_class_of`]: Raw identity, looking through boxes.
//! - [`bind_type_parameters`]: Declared parameters mapped to usage arguments.
//! - [`resolve`]: Substitute a member's declared type within a context type.
//! - [`resolve_or_raw`]: Same, erasing unbound variables instead of failing.
//! - [`lookup_generic_type`]: How a type instantiates one of its supertypes.
//! - [`matches`]: Compatibility test, see [`MatchMode`].

// -----------------------------------------------------------------------------
// Modules

mod algebra;
mod declaration;
mod descriptor;
mod raw;

// -----------------------------------------------------------------------------
// Exports

pub(crate) use algebra::expand;

pub use algebra::{
    MatchMode, TypeBindings, bind_type_parameters, lookup_generic_type, matches, raw_class_of,
    resolve, resolve_or_raw,
};
pub use declaration::{DeclarationLookup, GenericDecl, Supertype, TypeParam, Upcast};
pub use descriptor::{TypeArg, TypeDescriptor, TypeVar};
pub use raw::{RawType, Shape};
