//! Provide the type registry.
//!
//! ## Menu
//!
//! - [`Bindable`]: A type with a [`TypeDescriptor`] and a [`TypeMeta`].
//! - [`TypeMeta`]: Descriptor, generic declaration, [`TypeShape`] and attributes of a type.
//! - [`TypeShape`]: The structural kind of a type, with erased operations:
//!     - [`ScalarOps`] over [`ScalarType`]s,
//!     - [`OptionalOps`], [`BoxedOps`], [`SequenceOps`], [`MapOps`],
//!     - [`EnumOps`] over [`EnumVariant`]s,
//!     - a [`BeanDecl`](crate::members::BeanDecl) member table.
//! - [`TypeRegistry`]: Storage of [`TypeMeta`]s, immutable once an engine is built.
//!
//! ## auto_register
//!
//! See [`TypeRegistry::auto_register`] .
//!
//! We use [`inventory`] crate to implement static registration,
//! not all platforms support it (although major platforms do).
//! If it is not supported, the function returns `false` without errors.
//!
//! ## Implementations
//!
//! - `bool` `char` `f32` `f64` `String`
//! - `i8 - i64` `isize` `u8 - u64` `usize`
//! - `Option<T>` `Box<T>` `Arc<T>`
//! - `Vec<T>` `VecDeque<T>` `[T; N]`
//! - `BTreeMap<String, V>` `HashMap<String, V, S>`
//!
//! [`inventory`]: https://docs.rs/inventory

// -----------------------------------------------------------------------------
// Modules

mod shape;
mod type_meta;
mod type_registry;

// -----------------------------------------------------------------------------
// Exports

pub use shape::{
    BoxedOps, EnumOps, EnumVariant, MapOps, OptionalOps, Scalar, ScalarOps, ScalarType,
    ScalarValue, SequenceOps, TypeShape,
};
pub use type_meta::TypeMeta;
pub use type_registry::TypeRegistry;

use alloc::vec::Vec;
use core::any::Any;

use crate::convert::PropertyAdapter;
use crate::members::BeanDecl;
use crate::types::TypeDescriptor;

// -----------------------------------------------------------------------------
// Bindable

/// A type the engine can bind.
///
/// Usually implemented by [`#[derive(Bean)]`](crate::derive::Bean).
///
/// `type_descriptor` returns the descriptor of the concrete type, with its
/// [`TypeId`](core::any::TypeId). `type_meta` returns what is registered.
pub trait Bindable: Any + Send + Sync {
    fn type_descriptor() -> TypeDescriptor;

    fn type_meta() -> TypeMeta;
}

/// Collects the registrations needed by creators and adapters of `decl`.
pub(crate) fn bean_dependencies(decl: &BeanDecl, deps: &mut Vec<fn(&mut TypeRegistry)>) {
    for creator in decl.creators() {
        deps.extend_from_slice(creator.dependencies());
    }
    for member in decl.members() {
        if let Some(adapter) = member.attributes().get::<PropertyAdapter>() {
            deps.push(adapter.dependency());
        }
    }
}
