//! Provide bean descriptors.
//!
//! ## Menu
//!
//! - [`BeanDescriptor`]: The ordered [`Property`]s of a bean and how to create it.
//! - [`Property`]: A merged accessor and mutator under one resolved name.
//!
//! Descriptors are built by the engine from the [`BeanDecl`] of a type,
//! its supertypes and the configured resolvers, see
//! [`Engine::descriptor`](crate::engine::Engine::descriptor).
//!
//! ## Property discovery
//!
//! Members are visited supertypes first, then in declaration order, which is
//! also the output order. For each member and role (accessor, mutator):
//!
//! 1. the resolvers may rename it,
//! 2. the [`PropertyFilter`] decides on that name, then the resolvers,
//!    then the visibility fallback,
//! 3. the filter may rename it again.
//!
//! Members resolving to the same name merge. For one role, the member of
//! the most derived type wins, then the one with the narrower type, then a
//! method over a field. Anything else is a
//! [`BindError::ConflictingProperty`](crate::error::BindError::ConflictingProperty).
//!
//! ## Creation
//!
//! Explicit creators are tried in declaration order, then default
//! construction, then the memberwise creator. A creator is viable when
//! every parameter binds to a distinct readable property of the same type,
//! by name or by position.
//!
//! [`BeanDecl`]: crate::members::BeanDecl
//! [`PropertyFilter`]: crate::resolver::PropertyFilter

// -----------------------------------------------------------------------------
// Modules

mod builder;
mod descriptor;
mod property;

// -----------------------------------------------------------------------------
// Exports

pub(crate) use builder::DescriptorBuilder;

pub use descriptor::BeanDescriptor;
pub use property::Property;
