use alloc::string::String;
use alloc::vec::Vec;
use core::any::TypeId;

use crate::convert::PropertyAdapter;
use crate::members::{Accessor, Mutator};
use crate::types::TypeDescriptor;

// -----------------------------------------------------------------------------
// Property

/// One property of a [`BeanDescriptor`](super::BeanDescriptor).
///
/// A property merges the accessor and the mutator resolved under the same
/// name. Either may be missing: a property without an accessor is never
/// written, one without a mutator is only readable through a creator.
#[derive(Debug, Clone)]
pub struct Property {
    pub(super) name: String,
    pub(super) aliases: Vec<String>,
    pub(super) ty: TypeDescriptor,
    pub(super) value_id: TypeId,
    pub(super) accessor: Option<Accessor>,
    pub(super) mutator: Option<Mutator>,
    pub(super) adapter: Option<PropertyAdapter>,
    pub(super) deserialize_disabled: bool,
    pub(super) members: Vec<&'static str>,
}

impl Property {
    /// Returns the name written to documents.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the other names accepted when reading.
    #[inline]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Returns the resolved type of the property.
    #[inline]
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    #[inline]
    pub fn value_id(&self) -> TypeId {
        self.value_id
    }

    /// Returns the [`TypeId`] of the written representation, which differs
    /// from [`value_id`](Self::value_id) for adapted properties.
    #[inline]
    pub fn written_id(&self) -> TypeId {
        match &self.adapter {
            Some(adapter) => adapter.adapted_id(),
            None => self.value_id,
        }
    }

    #[inline]
    pub fn accessor(&self) -> Option<&Accessor> {
        self.accessor.as_ref()
    }

    #[inline]
    pub fn mutator(&self) -> Option<&Mutator> {
        self.mutator.as_ref()
    }

    #[inline]
    pub fn adapter(&self) -> Option<&PropertyAdapter> {
        self.adapter.as_ref()
    }

    /// Returns `true` if metadata forbids reading the property from documents.
    #[inline]
    pub fn is_deserialize_disabled(&self) -> bool {
        self.deserialize_disabled
    }

    /// Returns the declared names of the members behind the property.
    #[inline]
    pub fn members(&self) -> &[&'static str] {
        &self.members
    }
}
