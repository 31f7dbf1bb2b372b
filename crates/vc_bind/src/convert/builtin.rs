//! Terminal factories, one per [`TypeShape`], and the exact-type factory.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};

use crate::collections::TypeIdMap;
use crate::context::Context;
use crate::convert::{Chain, Converter, ConverterFactory};
use crate::document::{DocumentReader, DocumentWriter, Token};
use crate::error::BindError;
use crate::registry::{
    BoxedOps, EnumOps, MapOps, OptionalOps, Scalar, ScalarOps, ScalarValue, SequenceOps,
    TypeMeta, TypeShape,
};

type Produced = Result<Option<Arc<dyn Converter>>, BindError>;

fn mismatch(expected: &'static str, cx: &Context<'_>) -> BindError {
    BindError::ValueMismatch {
        path: cx.path(),
        expected,
    }
}

// -----------------------------------------------------------------------------
// Exact

/// Returns the converter registered for the exact type, if any.
#[derive(Default)]
pub struct ExactFactory {
    converters: TypeIdMap<Arc<dyn Converter>>,
}

impl ExactFactory {
    #[inline]
    pub fn new(converters: TypeIdMap<Arc<dyn Converter>>) -> Self {
        Self { converters }
    }
}

impl ConverterFactory for ExactFactory {
    fn create(&self, meta: &TypeMeta, _: &Chain<'_>) -> Produced {
        Ok(self.converters.get(&meta.type_id()).cloned())
    }
}

// -----------------------------------------------------------------------------
// Scalar

/// Produces converters for [`TypeShape::Scalar`] types.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarFactory;

struct ScalarConverter {
    name: &'static str,
    ops: ScalarOps,
}

impl ConverterFactory for ScalarFactory {
    fn create(&self, meta: &TypeMeta, _: &Chain<'_>) -> Produced {
        let TypeShape::Scalar(ops) = meta.shape() else {
            return Ok(None);
        };
        Ok(Some(Arc::new(ScalarConverter {
            name: meta.name(),
            ops: *ops,
        })))
    }
}

fn describe(value: &ScalarValue) -> String {
    match value {
        ScalarValue::Bool(v) => format!("boolean {v}"),
        ScalarValue::Int(v) => format!("integer {v}"),
        ScalarValue::UInt(v) => format!("integer {v}"),
        ScalarValue::Float(v) => format!("float {v:?}"),
        ScalarValue::Str(v) => format!("string {v:?}"),
    }
}

impl ScalarConverter {
    /// Lenient reading: numeric strings and integral floats.
    fn read_lenient(
        &self,
        token: Token,
        reader: &mut dyn DocumentReader,
    ) -> Result<Option<ScalarValue>, BindError> {
        let kind = self.ops.kind();
        let value = match (kind, token) {
            (Scalar::Int | Scalar::UInt | Scalar::Float, Token::Str) => {
                let text = reader.read_str()?;
                let parsed = match kind {
                    Scalar::Int => text.trim().parse().ok().map(ScalarValue::Int),
                    Scalar::UInt => text.trim().parse().ok().map(ScalarValue::UInt),
                    _ => text.trim().parse().ok().map(ScalarValue::Float),
                };
                match parsed {
                    Some(value) => value,
                    None => return Err(reader.malformed(self.name, &format!("string {text:?}"))),
                }
            }
            (Scalar::Int | Scalar::UInt, Token::Float) => {
                let float = reader.read_f64()?;
                let integral = float as i64;
                if integral as f64 != float {
                    return Err(reader.malformed(self.name, &format!("float {float:?}")));
                }
                match kind {
                    Scalar::UInt if integral >= 0 => ScalarValue::UInt(integral as u64),
                    _ => ScalarValue::Int(integral),
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(value))
    }
}

impl Converter for ScalarConverter {
    fn serialize(
        &self,
        value: &dyn Any,
        writer: &mut dyn DocumentWriter,
        cx: &mut Context<'_>,
    ) -> Result<(), BindError> {
        match self.ops.read(value).ok_or_else(|| mismatch(self.name, cx))? {
            ScalarValue::Bool(v) => writer.write_bool(v),
            ScalarValue::Int(v) => writer.write_i64(v),
            ScalarValue::UInt(v) => writer.write_u64(v),
            ScalarValue::Float(v) => writer.write_f64(v),
            ScalarValue::Str(v) => writer.write_str(&v),
        }
    }

    fn deserialize(
        &self,
        reader: &mut dyn DocumentReader,
        cx: &mut Context<'_>,
    ) -> Result<Box<dyn Any>, BindError> {
        let token = reader.peek()?;
        let lenient = if cx.options().lenient {
            self.read_lenient(token, reader)?
        } else {
            None
        };
        let value = match lenient {
            Some(value) => value,
            None => match self.ops.kind() {
                Scalar::Bool => ScalarValue::Bool(reader.read_bool()?),
                Scalar::Int => ScalarValue::Int(reader.read_i64()?),
                Scalar::UInt => ScalarValue::UInt(reader.read_u64()?),
                Scalar::Float => ScalarValue::Float(reader.read_f64()?),
                Scalar::Str => ScalarValue::Str(reader.read_str()?),
            },
        };
        let found = describe(&value);
        self.ops
            .write(value)
            .ok_or_else(|| reader.malformed(&format!("{} in range", self.name), &found))
    }
}

// -----------------------------------------------------------------------------
// Optional and boxed

/// Produces converters for [`TypeShape::Optional`] types.
///
/// Null is normally handled by the wrapping
/// [`NullSafeFactory`](crate::convert::NullSafeFactory).
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionalFactory;

struct OptionalConverter {
    name: &'static str,
    ops: OptionalOps,
}

impl ConverterFactory for OptionalFactory {
    fn create(&self, meta: &TypeMeta, _: &Chain<'_>) -> Produced {
        let TypeShape::Optional(ops) = meta.shape() else {
            return Ok(None);
        };
        Ok(Some(Arc::new(OptionalConverter {
            name: meta.name(),
            ops: *ops,
        })))
    }
}

impl Converter for OptionalConverter {
    fn serialize(
        &self,
        value: &dyn Any,
        writer: &mut dyn DocumentWriter,
        cx: &mut Context<'_>,
    ) -> Result<(), BindError> {
        match self.ops.get(value) {
            Some(Some(inner)) => cx.serialize_value(self.ops.inner(), inner, writer),
            Some(None) => writer.write_null(),
            None => Err(mismatch(self.name, cx)),
        }
    }

    fn deserialize(
        &self,
        reader: &mut dyn DocumentReader,
        cx: &mut Context<'_>,
    ) -> Result<Box<dyn Any>, BindError> {
        if reader.peek()? == Token::Null {
            reader.read_null()?;
            return Ok(self.ops.none());
        }
        let inner = cx.deserialize_value(self.ops.inner(), reader)?;
        self.ops.some(inner).ok_or_else(|| BindError::ValueMismatch {
            path: reader.path(),
            expected: self.name,
        })
    }
}

/// Produces converters for [`TypeShape::Boxed`] types, written as their content.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxedFactory;

struct BoxedConverter {
    name: &'static str,
    ops: BoxedOps,
}

impl ConverterFactory for BoxedFactory {
    fn create(&self, meta: &TypeMeta, _: &Chain<'_>) -> Produced {
        let TypeShape::Boxed(ops) = meta.shape() else {
            return Ok(None);
        };
        Ok(Some(Arc::new(BoxedConverter {
            name: meta.name(),
            ops: *ops,
        })))
    }
}

impl Converter for BoxedConverter {
    fn serialize(
        &self,
        value: &dyn Any,
        writer: &mut dyn DocumentWriter,
        cx: &mut Context<'_>,
    ) -> Result<(), BindError> {
        let inner = self.ops.get(value).ok_or_else(|| mismatch(self.name, cx))?;
        cx.serialize_value(self.ops.inner(), inner, writer)
    }

    fn deserialize(
        &self,
        reader: &mut dyn DocumentReader,
        cx: &mut Context<'_>,
    ) -> Result<Box<dyn Any>, BindError> {
        let inner = cx.deserialize_value(self.ops.inner(), reader)?;
        self.ops.wrap(inner).ok_or_else(|| BindError::ValueMismatch {
            path: reader.path(),
            expected: self.name,
        })
    }
}

// -----------------------------------------------------------------------------
// Containers

/// Produces converters for [`TypeShape::Sequence`] types, written as arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceFactory;

struct SequenceConverter {
    name: &'static str,
    ops: SequenceOps,
}

impl ConverterFactory for SequenceFactory {
    fn create(&self, meta: &TypeMeta, _: &Chain<'_>) -> Produced {
        let TypeShape::Sequence(ops) = meta.shape() else {
            return Ok(None);
        };
        Ok(Some(Arc::new(SequenceConverter {
            name: meta.name(),
            ops: *ops,
        })))
    }
}

impl Converter for SequenceConverter {
    fn serialize(
        &self,
        value: &dyn Any,
        writer: &mut dyn DocumentWriter,
        cx: &mut Context<'_>,
    ) -> Result<(), BindError> {
        let items = self.ops.items(value).ok_or_else(|| mismatch(self.name, cx))?;
        let element = self.ops.element();
        writer.begin_array()?;
        for (index, item) in items.into_iter().enumerate() {
            cx.with_index(index, |cx| cx.serialize_value(element, item, writer))?;
        }
        writer.end_array()
    }

    fn deserialize(
        &self,
        reader: &mut dyn DocumentReader,
        cx: &mut Context<'_>,
    ) -> Result<Box<dyn Any>, BindError> {
        let element = self.ops.element();
        reader.begin_array()?;
        let mut items = Vec::new();
        while reader.has_next()? {
            items.push(cx.deserialize_value(element, reader)?);
        }
        reader.end_array()?;

        let len = items.len();
        if let Some(expected) = self.ops.fixed_len()
            && expected != len
        {
            return Err(reader.malformed(
                &format!("array of {expected} elements"),
                &format!("{len} elements"),
            ));
        }
        self.ops.collect(items).ok_or_else(|| BindError::ValueMismatch {
            path: reader.path(),
            expected: self.name,
        })
    }
}

/// Produces converters for [`TypeShape::Map`] types, written as objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapFactory;

struct MapConverter {
    name: &'static str,
    ops: MapOps,
}

impl ConverterFactory for MapFactory {
    fn create(&self, meta: &TypeMeta, _: &Chain<'_>) -> Produced {
        let TypeShape::Map(ops) = meta.shape() else {
            return Ok(None);
        };
        Ok(Some(Arc::new(MapConverter {
            name: meta.name(),
            ops: *ops,
        })))
    }
}

impl Converter for MapConverter {
    fn serialize(
        &self,
        value: &dyn Any,
        writer: &mut dyn DocumentWriter,
        cx: &mut Context<'_>,
    ) -> Result<(), BindError> {
        let entries = self.ops.entries(value).ok_or_else(|| mismatch(self.name, cx))?;
        let value_id = self.ops.value();
        writer.begin_object()?;
        for (key, item) in entries {
            writer.write_key(key)?;
            cx.with_key(key, |cx| cx.serialize_value(value_id, item, writer))?;
        }
        writer.end_object()
    }

    fn deserialize(
        &self,
        reader: &mut dyn DocumentReader,
        cx: &mut Context<'_>,
    ) -> Result<Box<dyn Any>, BindError> {
        let value_id = self.ops.value();
        reader.begin_object()?;
        let mut entries = Vec::new();
        while let Some(key) = reader.next_key()? {
            let item = cx.deserialize_value(value_id, reader)?;
            entries.push((key, item));
        }
        reader.end_object()?;
        self.ops.collect(entries).ok_or_else(|| BindError::ValueMismatch {
            path: reader.path(),
            expected: self.name,
        })
    }
}

// -----------------------------------------------------------------------------
// Enum

/// Produces converters for [`TypeShape::Enum`] types, written as strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumFactory;

struct EnumConverter {
    name: &'static str,
    ops: EnumOps,
}

impl ConverterFactory for EnumFactory {
    fn create(&self, meta: &TypeMeta, _: &Chain<'_>) -> Produced {
        let TypeShape::Enum(ops) = meta.shape() else {
            return Ok(None);
        };
        Ok(Some(Arc::new(EnumConverter {
            name: meta.name(),
            ops: ops.clone(),
        })))
    }
}

impl Converter for EnumConverter {
    fn serialize(
        &self,
        value: &dyn Any,
        writer: &mut dyn DocumentWriter,
        cx: &mut Context<'_>,
    ) -> Result<(), BindError> {
        let variant = self.ops.variant_of(value).ok_or_else(|| mismatch(self.name, cx))?;
        writer.write_str(variant.value())
    }

    fn deserialize(
        &self,
        reader: &mut dyn DocumentReader,
        _: &mut Context<'_>,
    ) -> Result<Box<dyn Any>, BindError> {
        let text = reader.read_str()?;
        if let Some(value) = self.ops.from_value(&text) {
            return Ok(value);
        }
        let values: Vec<String> = self
            .ops
            .variants()
            .iter()
            .map(|v| format!("`{}`", v.value()))
            .collect();
        Err(reader.malformed(
            &format!("one of {}", values.join(", ")),
            &format!("`{text}`"),
        ))
    }
}

// -----------------------------------------------------------------------------
// Bean

/// Produces converters for [`TypeShape::Bean`] types, driven by their
/// [`BeanDescriptor`](crate::bean::BeanDescriptor).
///
/// The descriptor is fetched at call time, for the view selected by the
/// wrapping [`ViewFactory`](crate::convert::ViewFactory).
#[derive(Debug, Clone, Copy, Default)]
pub struct BeanFactory;

struct BeanConverter {
    type_id: TypeId,
}

impl ConverterFactory for BeanFactory {
    fn create(&self, meta: &TypeMeta, _: &Chain<'_>) -> Produced {
        if meta.shape().as_bean().is_none() {
            return Ok(None);
        }
        Ok(Some(Arc::new(BeanConverter {
            type_id: meta.type_id(),
        })))
    }
}

impl Converter for BeanConverter {
    fn serialize(
        &self,
        value: &dyn Any,
        writer: &mut dyn DocumentWriter,
        cx: &mut Context<'_>,
    ) -> Result<(), BindError> {
        let view = cx.take_view();
        let descriptor = cx.engine().descriptor(self.type_id, view.as_ref())?;
        descriptor.serialize(value, writer, cx)
    }

    fn deserialize(
        &self,
        reader: &mut dyn DocumentReader,
        cx: &mut Context<'_>,
    ) -> Result<Box<dyn Any>, BindError> {
        let view = cx.take_view();
        let descriptor = cx.engine().descriptor(self.type_id, view.as_ref())?;
        descriptor.deserialize(reader, cx)
    }
}
