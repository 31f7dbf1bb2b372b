//! Containers for static storage of type descriptors.
//!
//! - [`NonGenericDescriptorCell`]: an [`OnceLock`], for non-generic types.
//! - [`GenericDescriptorCell`]: a [`TypeIdMap`] behind a [`RwLock`], for
//!   generic types, because a `static` inside a generic function is shared
//!   by every instantiation.

use core::any::{Any, TypeId};
use std::sync::{OnceLock, PoisonError, RwLock};

use crate::collections::{NoOpHashState, TypeIdMap};
use crate::types::TypeDescriptor;

// -----------------------------------------------------------------------------
// NonGenericDescriptorCell

/// Lazily stores the descriptor of a non-generic type.
///
/// # Examples
///
/// ```
/// use vc_bind::impls::NonGenericDescriptorCell;
/// use vc_bind::types::{RawType, Shape, TypeDescriptor};
///
/// struct Id;
///
/// fn descriptor() -> TypeDescriptor {
///     static CELL: NonGenericDescriptorCell = NonGenericDescriptorCell::new();
///     CELL.get_or_init(|| {
///         TypeDescriptor::concrete::<Id>(RawType::new("app::Id", "Id"), [], Shape::Plain)
///     })
/// }
///
/// assert_eq!(descriptor().raw().name(), "Id");
/// ```
pub struct NonGenericDescriptorCell(OnceLock<TypeDescriptor>);

impl NonGenericDescriptorCell {
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the stored descriptor, initializing it with `f` first.
    #[inline]
    pub fn get_or_init(&self, f: impl FnOnce() -> TypeDescriptor) -> TypeDescriptor {
        self.0.get_or_init(f).clone()
    }
}

// -----------------------------------------------------------------------------
// GenericDescriptorCell

/// Lazily stores the descriptors of every instantiation of a generic type.
pub struct GenericDescriptorCell(RwLock<TypeIdMap<TypeDescriptor>>);

impl GenericDescriptorCell {
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(TypeIdMap::with_hasher(NoOpHashState)))
    }

    /// Returns the descriptor stored for `G`, initializing it with `f` first.
    #[inline(always)]
    pub fn get_or_insert<G: Any + ?Sized>(
        &self,
        f: impl FnOnce() -> TypeDescriptor,
    ) -> TypeDescriptor {
        self.get_or_insert_by_type_id(TypeId::of::<G>(), f)
    }

    #[inline(never)]
    fn get_or_insert_by_type_id(
        &self,
        type_id: TypeId,
        f: impl FnOnce() -> TypeDescriptor,
    ) -> TypeDescriptor {
        let cached = self
            .0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .cloned();
        if let Some(descriptor) = cached {
            return descriptor;
        }

        // Built outside the lock: `f` may need descriptors of other instantiations.
        let descriptor = f();
        self.0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(type_id)
            .or_insert(descriptor)
            .clone()
    }
}

// -----------------------------------------------------------------------------
// Tests
