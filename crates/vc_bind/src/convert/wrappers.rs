//! Wrapping factories for cross-cutting behaviour.
//!
//! Each factory runs the rest of the chain and decorates the result,
//! unless the produced converter declares the matching [`Capabilities`].

use alloc::boxed::Box;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use core::any::Any;

use crate::context::Context;
use crate::convert::{Capabilities, Chain, Converter, ConverterFactory, has_capability};
use crate::document::{DocumentReader, DocumentWriter, Token};
use crate::error::BindError;
use crate::members::RootName;
use crate::registry::{OptionalOps, TypeMeta, TypeShape};
use crate::types::TypeDescriptor;

// -----------------------------------------------------------------------------
// NullSafe

/// Writes `None` as null and reads null as `None`, without reaching the
/// wrapped converter.
///
/// In lenient mode, null also reads as the default value of types that
/// have one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSafeFactory;

struct NullSafeConverter {
    inner: Arc<dyn Converter>,
    optional: Option<OptionalOps>,
    default: Option<fn() -> Box<dyn Any>>,
}

impl ConverterFactory for NullSafeFactory {
    fn create(
        &self,
        meta: &TypeMeta,
        chain: &Chain<'_>,
    ) -> Result<Option<Arc<dyn Converter>>, BindError> {
        let Some(inner) = chain.next()? else {
            return Ok(None);
        };
        let optional = match meta.shape() {
            TypeShape::Optional(ops) => Some(*ops),
            _ => None,
        };
        let default = meta
            .default_fn()
            .filter(|_| chain.engine().options().lenient);

        if (optional.is_none() && default.is_none())
            || has_capability(&*inner, Capabilities::HANDLES_NULL)
        {
            return Ok(Some(inner));
        }
        Ok(Some(Arc::new(NullSafeConverter {
            inner,
            optional,
            default,
        })))
    }
}

impl Converter for NullSafeConverter {
    fn serialize(
        &self,
        value: &dyn Any,
        writer: &mut dyn DocumentWriter,
        cx: &mut Context<'_>,
    ) -> Result<(), BindError> {
        if let Some(ops) = &self.optional
            && let Some(None) = ops.get(value)
        {
            return writer.write_null();
        }
        self.inner.serialize(value, writer, cx)
    }

    fn deserialize(
        &self,
        reader: &mut dyn DocumentReader,
        cx: &mut Context<'_>,
    ) -> Result<Box<dyn Any>, BindError> {
        if reader.peek()? == Token::Null {
            if let Some(ops) = &self.optional {
                reader.read_null()?;
                return Ok(ops.none());
            }
            if let Some(default) = self.default {
                reader.read_null()?;
                return Ok(default());
            }
        }
        self.inner.deserialize(reader, cx)
    }

    #[inline]
    fn capabilities(&self) -> Capabilities {
        Capabilities::HANDLES_NULL
    }

    #[inline]
    fn wrapped(&self) -> Option<&Arc<dyn Converter>> {
        Some(&self.inner)
    }
}

// -----------------------------------------------------------------------------
// RootWrap

/// Wraps the root bean of a call in a single-entry object.
///
/// The key is the type's [`RootName`], or its simple name with a lower-case
/// first letter. Active with [`Options::wrap_root_values`].
///
/// [`Options::wrap_root_values`]: crate::engine::Options::wrap_root_values
#[derive(Debug, Clone, Copy, Default)]
pub struct RootWrapFactory;

struct RootWrapConverter {
    inner: Arc<dyn Converter>,
    name: String,
}

/// Returns the key a root value of `meta` is wrapped in.
pub fn root_name(meta: &TypeMeta) -> String {
    if let Some(RootName(name)) = meta.attributes().get::<RootName>() {
        return name.to_string();
    }
    let mut chars = meta.name().chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl ConverterFactory for RootWrapFactory {
    fn create(
        &self,
        meta: &TypeMeta,
        chain: &Chain<'_>,
    ) -> Result<Option<Arc<dyn Converter>>, BindError> {
        let Some(inner) = chain.next()? else {
            return Ok(None);
        };
        if !chain.engine().options().wrap_root_values || meta.shape().as_bean().is_none() {
            return Ok(Some(inner));
        }
        Ok(Some(Arc::new(RootWrapConverter {
            inner,
            name: root_name(meta),
        })))
    }
}

impl Converter for RootWrapConverter {
    fn serialize(
        &self,
        value: &dyn Any,
        writer: &mut dyn DocumentWriter,
        cx: &mut Context<'_>,
    ) -> Result<(), BindError> {
        if cx.depth() > 0 {
            return self.inner.serialize(value, writer, cx);
        }
        writer.begin_object()?;
        writer.write_key(&self.name)?;
        self.inner.serialize(value, writer, cx)?;
        writer.end_object()
    }

    fn deserialize(
        &self,
        reader: &mut dyn DocumentReader,
        cx: &mut Context<'_>,
    ) -> Result<Box<dyn Any>, BindError> {
        if cx.depth() > 0 {
            return self.inner.deserialize(reader, cx);
        }
        let expected = format!("root `{}`", self.name);
        reader.begin_object()?;
        match reader.next_key()? {
            Some(key) if key == self.name => {}
            Some(key) => return Err(reader.malformed(&expected, &format!("`{key}`"))),
            None => return Err(reader.malformed(&expected, "empty object")),
        }
        let value = self.inner.deserialize(reader, cx)?;
        if let Some(key) = reader.next_key()? {
            return Err(reader.malformed("a single root entry", &format!("`{key}`")));
        }
        reader.end_object()?;
        Ok(value)
    }

    #[inline]
    fn wrapped(&self) -> Option<&Arc<dyn Converter>> {
        Some(&self.inner)
    }
}

// -----------------------------------------------------------------------------
// ClassMetadata

/// Tags bean objects with an `@class` entry, and checks it when present.
///
/// The tag is the type's alias, or its path. Active with
/// [`Options::class_metadata`].
///
/// [`Options::class_metadata`]: crate::engine::Options::class_metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassMetadataFactory;

/// The metadata key of the class tag.
pub const CLASS_KEY: &str = "class";

struct ClassMetadataConverter {
    inner: Arc<dyn Converter>,
    class: String,
}

impl ConverterFactory for ClassMetadataFactory {
    fn create(
        &self,
        meta: &TypeMeta,
        chain: &Chain<'_>,
    ) -> Result<Option<Arc<dyn Converter>>, BindError> {
        let Some(inner) = chain.next()? else {
            return Ok(None);
        };
        let engine = chain.engine();
        if !engine.options().class_metadata
            || meta.shape().as_bean().is_none()
            || has_capability(&*inner, Capabilities::HANDLES_METADATA)
        {
            return Ok(Some(inner));
        }
        let class = match engine.registry().alias_of(meta.type_id()) {
            Some(alias) => alias.to_string(),
            None => meta.descriptor().to_string(),
        };
        Ok(Some(Arc::new(ClassMetadataConverter { inner, class })))
    }
}

/// Emits the class tag right after the first `begin_object`.
struct TaggingWriter<'w, 'c> {
    inner: &'w mut dyn DocumentWriter,
    class: Option<&'c str>,
}

impl DocumentWriter for TaggingWriter<'_, '_> {
    fn write_null(&mut self) -> Result<(), BindError> {
        self.inner.write_null()
    }

    fn write_bool(&mut self, value: bool) -> Result<(), BindError> {
        self.inner.write_bool(value)
    }

    fn write_i64(&mut self, value: i64) -> Result<(), BindError> {
        self.inner.write_i64(value)
    }

    fn write_u64(&mut self, value: u64) -> Result<(), BindError> {
        self.inner.write_u64(value)
    }

    fn write_f64(&mut self, value: f64) -> Result<(), BindError> {
        self.inner.write_f64(value)
    }

    fn write_str(&mut self, value: &str) -> Result<(), BindError> {
        self.inner.write_str(value)
    }

    fn begin_object(&mut self) -> Result<(), BindError> {
        self.inner.begin_object()?;
        match self.class.take() {
            Some(class) => self.inner.write_metadata(CLASS_KEY, class),
            None => Ok(()),
        }
    }

    fn write_key(&mut self, key: &str) -> Result<(), BindError> {
        self.inner.write_key(key)
    }

    fn end_object(&mut self) -> Result<(), BindError> {
        self.inner.end_object()
    }

    fn begin_array(&mut self) -> Result<(), BindError> {
        self.inner.begin_array()
    }

    fn end_array(&mut self) -> Result<(), BindError> {
        self.inner.end_array()
    }

    fn write_metadata(&mut self, key: &str, value: &str) -> Result<(), BindError> {
        self.inner.write_metadata(key, value)
    }
}

impl Converter for ClassMetadataConverter {
    fn serialize(
        &self,
        value: &dyn Any,
        writer: &mut dyn DocumentWriter,
        cx: &mut Context<'_>,
    ) -> Result<(), BindError> {
        let mut tagging = TaggingWriter {
            inner: writer,
            class: Some(&self.class),
        };
        self.inner.serialize(value, &mut tagging, cx)
    }

    fn deserialize(
        &self,
        reader: &mut dyn DocumentReader,
        cx: &mut Context<'_>,
    ) -> Result<Box<dyn Any>, BindError> {
        if let Some(class) = reader.metadata(CLASS_KEY)
            && class != self.class
        {
            return Err(reader.malformed(&format!("@class `{}`", self.class), &format!("`{class}`")));
        }
        self.inner.deserialize(reader, cx)
    }

    #[inline]
    fn capabilities(&self) -> Capabilities {
        Capabilities::HANDLES_METADATA
    }

    #[inline]
    fn wrapped(&self) -> Option<&Arc<dyn Converter>> {
        Some(&self.inner)
    }
}

// -----------------------------------------------------------------------------
// View

/// Selects the view of each bean from the views of the call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewFactory;

struct ViewConverter {
    inner: Arc<dyn Converter>,
    ty: TypeDescriptor,
}

impl ConverterFactory for ViewFactory {
    fn create(
        &self,
        meta: &TypeMeta,
        chain: &Chain<'_>,
    ) -> Result<Option<Arc<dyn Converter>>, BindError> {
        let Some(inner) = chain.next()? else {
            return Ok(None);
        };
        if meta.shape().as_bean().is_none() || has_capability(&*inner, Capabilities::HANDLES_VIEWS) {
            return Ok(Some(inner));
        }
        Ok(Some(Arc::new(ViewConverter {
            inner,
            ty: meta.descriptor().clone(),
        })))
    }
}

impl ViewConverter {
    fn select(&self, cx: &mut Context<'_>) {
        let view = match cx.views() {
            [] => None,
            views => cx.engine().select_view(views, &self.ty),
        };
        cx.select_view(view);
    }
}

impl Converter for ViewConverter {
    fn serialize(
        &self,
        value: &dyn Any,
        writer: &mut dyn DocumentWriter,
        cx: &mut Context<'_>,
    ) -> Result<(), BindError> {
        self.select(cx);
        let result = self.inner.serialize(value, writer, cx);
        cx.select_view(None);
        result
    }

    fn deserialize(
        &self,
        reader: &mut dyn DocumentReader,
        cx: &mut Context<'_>,
    ) -> Result<Box<dyn Any>, BindError> {
        self.select(cx);
        let result = self.inner.deserialize(reader, cx);
        cx.select_view(None);
        result
    }

    #[inline]
    fn capabilities(&self) -> Capabilities {
        Capabilities::HANDLES_VIEWS
    }

    #[inline]
    fn wrapped(&self) -> Option<&Arc<dyn Converter>> {
        Some(&self.inner)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::root_name;
    use crate::members::RootName;
    use crate::registry::{TypeMeta, TypeShape};

    #[test]
    fn root_names() {
        let meta = TypeMeta::of::<String>(TypeShape::Opaque);
        assert_eq!(root_name(&meta), "string");
        let meta = meta.with_attribute(RootName("text"));
        assert_eq!(root_name(&meta), "text");
    }
}
