//! Converters and the factory chain that builds them.
//!
//! - [`Converter`]: serializes values of one type, see [`Capabilities`].
//! - [`ConverterFactory`]: one stage of the resolution [`Chain`].
//! - [`Adapter`]: a per-property representation change, see [`PropertyAdapter`].
//!
//! The engine resolves a converter for a type by running its factories in
//! order:
//!
//! 1. early factories, see [`EngineBuilder::with_early_factory`],
//! 2. [`NullSafeFactory`],
//! 3. [`RootWrapFactory`],
//! 4. [`ClassMetadataFactory`],
//! 5. [`ViewFactory`],
//! 6. user factories, see [`EngineBuilder::with_factory`],
//! 7. [`ExactFactory`], the converters registered per type,
//! 8. one terminal factory per [`TypeShape`](crate::registry::TypeShape).
//!
//! [`EngineBuilder::with_early_factory`]: crate::engine::EngineBuilder::with_early_factory
//! [`EngineBuilder::with_factory`]: crate::engine::EngineBuilder::with_factory

// -----------------------------------------------------------------------------
// Modules

mod adapter;
mod builtin;
mod converter;
mod factory;
mod wrappers;

// -----------------------------------------------------------------------------
// Exports

pub use adapter::{Adapter, PropertyAdapter};
pub use builtin::{
    BeanFactory, BoxedFactory, EnumFactory, ExactFactory, MapFactory, OptionalFactory,
    ScalarFactory, SequenceFactory,
};
pub use converter::{Capabilities, Converter, has_capability, innermost};
pub use factory::{Chain, ConverterFactory};
pub use wrappers::{
    CLASS_KEY, ClassMetadataFactory, NullSafeFactory, RootWrapFactory, ViewFactory, root_name,
};
