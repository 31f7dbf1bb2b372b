use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use super::Property;
use crate::collections::HashMap;
use crate::context::Context;
use crate::document::{DocumentReader, DocumentWriter};
use crate::error::BindError;
use crate::members::{Arguments, Creator};
use crate::registry::OptionalOps;
use crate::types::TypeDescriptor;

// -----------------------------------------------------------------------------
// CreationStrategy

/// Where a creator argument comes from.
#[derive(Clone, Copy)]
pub(crate) struct ParamBinding {
    pub property: usize,
    /// Set for optional parameters, which are `None` when the property is absent.
    pub absent: Option<OptionalOps>,
}

/// How a bean is instantiated when read.
#[derive(Clone)]
pub(crate) enum CreationStrategy {
    /// Default construction, then every property through its mutator.
    Default(fn() -> Box<dyn Any>),
    /// A creator taking bound properties, then the remaining mutators.
    Creator {
        creator: Creator,
        params: Vec<ParamBinding>,
    },
    /// No viable strategy, reported when reading.
    Unavailable(BindError),
}

// -----------------------------------------------------------------------------
// BeanDescriptor

/// The property schema and construction strategy of a bean, optionally
/// under a view.
///
/// Built once per (type, view) by the engine, see
/// [`Engine::descriptor`](crate::engine::Engine::descriptor).
pub struct BeanDescriptor {
    pub(super) ty: TypeDescriptor,
    pub(super) type_id: TypeId,
    pub(super) view: Option<&'static str>,
    pub(super) properties: Vec<Property>,
    pub(super) index: HashMap<String, usize>,
    pub(super) creation: CreationStrategy,
}

impl BeanDescriptor {
    #[inline]
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the name of the view the descriptor was built for.
    #[inline]
    pub fn view(&self) -> Option<&'static str> {
        self.view
    }

    /// Returns the properties in output order.
    #[inline]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Returns the property called `name`, or aliased `name`.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.index.get(name).map(|&i| &self.properties[i])
    }

    /// Returns the creator used when reading, `None` for default construction.
    pub fn creator(&self) -> Option<&Creator> {
        match &self.creation {
            CreationStrategy::Creator { creator, .. } => Some(creator),
            _ => None,
        }
    }

    /// Returns `true` if the bean can be read.
    #[inline]
    pub fn is_creatable(&self) -> bool {
        !matches!(self.creation, CreationStrategy::Unavailable(_))
    }

    /// Writes `value` as an object.
    pub fn serialize(
        &self,
        value: &dyn Any,
        writer: &mut dyn DocumentWriter,
        cx: &mut Context<'_>,
    ) -> Result<(), BindError> {
        let skip_null = cx.options().skip_null;
        writer.begin_object()?;
        for property in &self.properties {
            let Some(accessor) = &property.accessor else {
                continue;
            };
            let slot = accessor.get(value).ok_or_else(|| BindError::ValueMismatch {
                path: cx.path(),
                expected: self.ty.raw().name(),
            })?;

            let adapted;
            let (written_id, written): (TypeId, &dyn Any) = match &property.adapter {
                Some(adapter) => {
                    let path = cx.with_key(&property.name, |cx| cx.path());
                    adapted = adapter.marshal(slot.as_any(), &path)?;
                    (adapter.adapted_id(), &*adapted)
                }
                None => (property.value_id, slot.as_any()),
            };
            if skip_null && cx.engine().is_null(written_id, written) {
                continue;
            }

            writer.write_key(&property.name)?;
            cx.with_key(&property.name, |cx| {
                cx.serialize_value(written_id, written, writer)
            })?;
        }
        writer.end_object()
    }

    /// Reads an object into a new bean.
    pub fn deserialize(
        &self,
        reader: &mut dyn DocumentReader,
        cx: &mut Context<'_>,
    ) -> Result<Box<dyn Any>, BindError> {
        let location = reader.path();
        match &self.creation {
            CreationStrategy::Default(create) => {
                let mut bean = create();
                reader.begin_object()?;
                while let Some(key) = reader.next_key()? {
                    let Some(index) = self.lookup(&key, reader, cx)? else {
                        continue;
                    };
                    let property = &self.properties[index];
                    if property.mutator.is_none() {
                        reader.skip_value()?;
                        continue;
                    }
                    let value = self.read_property(property, reader, cx)?;
                    self.assign(property, &mut *bean, value, reader)?;
                }
                reader.end_object()?;
                Ok(bean)
            }
            CreationStrategy::Creator { creator, params } => {
                let mut args: Vec<Option<Box<dyn Any>>> = params.iter().map(|_| None).collect();
                let mut deferred = Vec::new();

                reader.begin_object()?;
                while let Some(key) = reader.next_key()? {
                    let Some(index) = self.lookup(&key, reader, cx)? else {
                        continue;
                    };
                    let property = &self.properties[index];
                    let param = params.iter().position(|p| p.property == index);
                    if param.is_none() && property.mutator.is_none() {
                        reader.skip_value()?;
                        continue;
                    }
                    let value = self.read_property(property, reader, cx)?;
                    match param {
                        Some(param) => args[param] = Some(value),
                        None => deferred.push((index, value, reader.path())),
                    }
                }
                reader.end_object()?;

                let mut values = Vec::with_capacity(args.len());
                for (arg, binding) in args.into_iter().zip(params) {
                    let value = match (arg, binding.absent) {
                        (Some(value), _) => value,
                        (None, Some(ops)) => ops.none(),
                        (None, None) => {
                            return Err(BindError::MissingProperty {
                                path: location,
                                name: self.properties[binding.property].name.clone(),
                            });
                        }
                    };
                    values.push(value);
                }
                let mut bean = creator
                    .call(Arguments::new(values))
                    .map_err(|err| err.at(&location))?;
                for (index, value, path) in deferred {
                    let property = &self.properties[index];
                    if let Some(mutator) = &property.mutator
                        && mutator.set(&mut *bean, value).is_err()
                    {
                        return Err(BindError::ValueMismatch {
                            path,
                            expected: mutator.value_name(),
                        });
                    }
                }
                Ok(bean)
            }
            CreationStrategy::Unavailable(err) => Err(err.clone()),
        }
    }

    /// Finds the property of `key`, skipping or rejecting unknown keys.
    fn lookup(
        &self,
        key: &str,
        reader: &mut dyn DocumentReader,
        cx: &Context<'_>,
    ) -> Result<Option<usize>, BindError> {
        if let Some(&index) = self.index.get(key) {
            return Ok(Some(index));
        }
        if cx.options().fail_on_unknown {
            return Err(BindError::UnknownProperty {
                path: reader.path(),
                name: key.into(),
            });
        }
        reader.skip_value()?;
        Ok(None)
    }

    fn read_property(
        &self,
        property: &Property,
        reader: &mut dyn DocumentReader,
        cx: &mut Context<'_>,
    ) -> Result<Box<dyn Any>, BindError> {
        cx.with_key(&property.name, |cx| match &property.adapter {
            Some(adapter) => {
                let adapted = cx.deserialize_value(adapter.adapted_id(), reader)?;
                adapter.unmarshal(adapted, &reader.path())
            }
            None => cx.deserialize_value(property.value_id, reader),
        })
    }

    fn assign(
        &self,
        property: &Property,
        bean: &mut dyn Any,
        value: Box<dyn Any>,
        reader: &dyn DocumentReader,
    ) -> Result<(), BindError> {
        let Some(mutator) = &property.mutator else {
            return Ok(());
        };
        mutator
            .set(bean, value)
            .map_err(|_| BindError::ValueMismatch {
                path: reader.path(),
                expected: mutator.value_name(),
            })
    }
}

impl fmt::Debug for BeanDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.properties.iter().map(Property::name).collect();
        f.debug_struct("BeanDescriptor")
            .field("ty", &self.ty)
            .field("view", &self.view)
            .field("properties", &names)
            .field("creator", &self.creator().map(Creator::name))
            .finish()
    }
}
