//! Provide the binding engine.
//!
//! ## Menu
//!
//! - [`EngineBuilder`]: Registration, factories, resolvers, filters, views and [`Options`].
//!     - [`Bundle`]: A reusable piece of configuration.
//! - [`Engine`]: Immutable, shareable, caches converters and descriptors per type.
//! - [`Call`]: One call with views and caller data.
//!
//! ```
//! use vc_bind::document::Node;
//! use vc_bind::engine::Engine;
//!
//! let engine = Engine::builder().register::<Vec<Option<u8>>>().build();
//!
//! let node = engine.serialize(&vec![Some(1u8), None]).unwrap();
//! assert_eq!(node, Node::Seq(vec![Node::Int(1), Node::Null]));
//!
//! let back: Vec<Option<u8>> = engine.deserialize(&node).unwrap();
//! assert_eq!(back, [Some(1), None]);
//! ```

// -----------------------------------------------------------------------------
// Modules

mod builder;
mod call;
mod options;

// -----------------------------------------------------------------------------
// Exports

pub use builder::{Bundle, EngineBuilder};
pub use call::Call;
pub use options::Options;

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId, type_name};
use core::fmt;
use std::sync::{OnceLock, PoisonError, RwLock};

use crate::bean::{BeanDescriptor, DescriptorBuilder};
use crate::collections::{HashMap, TypeIdMap};
use crate::convert::{Chain, Converter, ConverterFactory};
use crate::document::Node;
use crate::error::BindError;
use crate::registry::{Bindable, TypeRegistry, TypeShape};
use crate::resolver::{PropertyFilter, ResolverChain};
use crate::types::TypeDescriptor;
use crate::view::{BeanView, View, select_view};

type ConverterSlot = OnceLock<Result<Arc<dyn Converter>, BindError>>;
type DescriptorSlot = OnceLock<Result<Arc<BeanDescriptor>, BindError>>;

// -----------------------------------------------------------------------------
// Engine

/// The binding engine.
///
/// Built once by [`EngineBuilder::build`], then immutable. Converters and
/// bean descriptors are constructed on first use, at most once per type
/// even under concurrent first use, and shared afterwards.
///
/// Construction errors are cached as well: a type that failed keeps
/// failing with the same error, without affecting other types.
pub struct Engine {
    registry: TypeRegistry,
    options: Options,
    factories: Vec<Arc<dyn ConverterFactory>>,
    resolvers: ResolverChain,
    filter: PropertyFilter,
    views: TypeIdMap<View>,
    converters: TypeIdMap<ConverterSlot>,
    descriptors: HashMap<(TypeId, Option<TypeId>), DescriptorSlot>,
    late_descriptors: RwLock<HashMap<(TypeId, Option<TypeId>), Arc<DescriptorSlot>>>,
}

impl Engine {
    /// Creates an [`EngineBuilder`].
    #[inline]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    #[inline]
    pub fn resolvers(&self) -> &ResolverChain {
        &self.resolvers
    }

    // -------------------------------------------------------------------------
    // Converters

    /// Returns the converter of the registered type `type_id`.
    ///
    /// # Errors
    ///
    /// [`BindError::UnsupportedType`] if the type is not registered or no
    /// factory produces a converter, or the error of a factory.
    pub fn converter_by_id(&self, type_id: TypeId) -> Result<Arc<dyn Converter>, BindError> {
        let Some(slot) = self.converters.get(&type_id) else {
            return Err(BindError::unsupported(format_args!("{type_id:?}")));
        };
        slot.get_or_init(|| self.create_converter(type_id)).clone()
    }

    /// Returns the converter of a registered descriptor.
    pub fn converter_for(&self, ty: &TypeDescriptor) -> Result<Arc<dyn Converter>, BindError> {
        match self.registry.id_of(ty) {
            Some(type_id) => self.converter_by_id(type_id),
            None => Err(BindError::unsupported(ty)),
        }
    }

    /// Returns the converter of `T`.
    pub fn converter_of<T: Bindable>(&self) -> Result<Arc<dyn Converter>, BindError> {
        if !self.registry.contains(TypeId::of::<T>()) {
            return Err(BindError::unsupported(type_name::<T>()));
        }
        self.converter_by_id(TypeId::of::<T>())
    }

    fn create_converter(&self, type_id: TypeId) -> Result<Arc<dyn Converter>, BindError> {
        let meta = self
            .registry
            .get(type_id)
            .ok_or_else(|| BindError::unsupported(format_args!("{type_id:?}")))?;
        match Chain::new(self, meta, &self.factories).next()? {
            Some(converter) => {
                log::debug!("converter of `{}` constructed", meta.descriptor());
                Ok(converter)
            }
            None => Err(BindError::unsupported(meta.descriptor())),
        }
    }

    // -------------------------------------------------------------------------
    // Descriptors

    /// Returns the descriptor of the bean `type_id`, under `view` if given.
    ///
    /// Every (type, view) pair is built at most once. Pairs of views unknown
    /// to the builder, see [`EngineBuilder::with_view`], get their slot on
    /// first use.
    pub fn descriptor(
        &self,
        type_id: TypeId,
        view: Option<&View>,
    ) -> Result<Arc<BeanDescriptor>, BindError> {
        let key = (type_id, view.map(View::id));
        if let Some(slot) = self.descriptors.get(&key) {
            return slot.get_or_init(|| self.build_descriptor(type_id, view)).clone();
        }
        self.late_slot(key)
            .get_or_init(|| self.build_descriptor(type_id, view))
            .clone()
    }

    fn late_slot(&self, key: (TypeId, Option<TypeId>)) -> Arc<DescriptorSlot> {
        let cached = self
            .late_descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(slot) = cached {
            return slot;
        }
        log::trace!("late descriptor slot for {key:?}");
        self.late_descriptors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_default()
            .clone()
    }

    /// Returns the default descriptor of `T`.
    #[inline]
    pub fn descriptor_of<T: Bindable>(&self) -> Result<Arc<BeanDescriptor>, BindError> {
        self.descriptor(TypeId::of::<T>(), None)
    }

    fn build_descriptor(
        &self,
        type_id: TypeId,
        view: Option<&View>,
    ) -> Result<Arc<BeanDescriptor>, BindError> {
        let meta = self
            .registry
            .get(type_id)
            .ok_or_else(|| BindError::unsupported(format_args!("{type_id:?}")))?;
        let builder = DescriptorBuilder::new(
            &self.registry,
            &self.resolvers,
            &self.filter,
            self.options.include_private,
        );
        let descriptor = builder.build(meta, view.map(View::meta))?;
        log::debug!(
            "descriptor of `{}` constructed, {} properties",
            meta.descriptor(),
            descriptor.properties().len()
        );
        Ok(Arc::new(descriptor))
    }

    // -------------------------------------------------------------------------
    // Views

    /// Returns the handle of `V`, the registered one if known.
    pub fn view<V: BeanView>(&self) -> View {
        match self.views.get(&TypeId::of::<V>()) {
            Some(view) => view.clone(),
            None => View::of::<V>(),
        }
    }

    /// Returns the first of `views` applying to `target`.
    pub fn select_view(&self, views: &[View], target: &TypeDescriptor) -> Option<View> {
        let meta = select_view(&self.registry, views.iter().map(View::meta), target)?;
        let view = views.iter().find(|view| core::ptr::eq(view.meta(), meta))?;
        log::trace!("view `{}` selected for `{target}`", meta.name());
        Some(view.clone())
    }

    /// Returns `true` if `value`, of the registered type `type_id`, is null.
    pub(crate) fn is_null(&self, type_id: TypeId, value: &dyn Any) -> bool {
        match self.registry.get(type_id).map(|meta| meta.shape()) {
            Some(TypeShape::Optional(ops)) => matches!(ops.get(value), Some(None)),
            _ => false,
        }
    }

    // -------------------------------------------------------------------------
    // Calls

    /// Starts a call, to set views or caller data.
    #[inline]
    pub fn call(&self) -> Call<'_> {
        Call::new(self)
    }

    /// Writes `value` into a [`Node`].
    #[inline]
    pub fn serialize<T: Bindable>(&self, value: &T) -> Result<Node, BindError> {
        self.call().serialize(value)
    }

    /// Reads a `T` from a [`Node`].
    #[inline]
    pub fn deserialize<T: Bindable>(&self, node: &Node) -> Result<T, BindError> {
        self.call().deserialize(node)
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("types", &self.registry.len())
            .field("options", &self.options)
            .field("factories", &self.factories.len())
            .field("resolvers", &self.resolvers)
            .field("views", &self.views.len())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::any::TypeId;

    use super::Engine;
    use crate::document::Node;
    use crate::error::BindError;

    #[test]
    fn converters_are_cached() {
        let engine = Engine::builder().register::<Vec<String>>().build();
        let first = engine.converter_of::<Vec<String>>().unwrap();
        let second = engine.converter_by_id(TypeId::of::<Vec<String>>()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn unregistered_types_are_unsupported() {
        let engine = Engine::builder().build();
        let err = engine.serialize(&vec![1u8]).unwrap_err();
        assert!(matches!(err, BindError::UnsupportedType { .. }));
        assert!(engine.serialize(&1u8).is_ok());
    }

    #[test]
    fn null_detection() {
        let engine = Engine::builder().register::<Option<u8>>().build();
        let id = TypeId::of::<Option<u8>>();
        assert!(engine.is_null(id, &None::<u8>));
        assert!(!engine.is_null(id, &Some(1u8)));
        assert!(!engine.is_null(TypeId::of::<u8>(), &1u8));
        assert_eq!(engine.serialize(&None::<u8>).unwrap(), Node::Null);
    }
}
