//! [`Bindable`](crate::registry::Bindable) implementations for standard types.
//!
//! Descriptors are cached in static cells, see [`NonGenericDescriptorCell`]
//! and [`GenericDescriptorCell`].

// -----------------------------------------------------------------------------
// Modules

mod boxed;
mod cell;
mod maps;
mod native;
mod option;
mod sequences;

// -----------------------------------------------------------------------------
// Exports

pub use cell::{GenericDescriptorCell, NonGenericDescriptorCell};
