use alloc::vec::Vec;
use core::any::Any;

use super::Engine;
use crate::context::Context;
use crate::document::{DocumentReader, DocumentWriter, Node, TreeReader, TreeWriter};
use crate::error::BindError;
use crate::registry::Bindable;
use crate::view::{BeanView, View};

// -----------------------------------------------------------------------------
// Call

/// One serialize or deserialize call, with its views and caller data.
///
/// Views are tried in the order they were added, per bean, see
/// [`view`](crate::view).
///
/// # Examples
///
/// ```
/// use vc_bind::engine::Engine;
///
/// let engine = Engine::builder().build();
/// let node = engine.call().with_data(&"tenant-a").serialize(&7u32).unwrap();
/// assert_eq!(engine.call().deserialize::<u32>(&node).unwrap(), 7);
/// ```
pub struct Call<'e> {
    engine: &'e Engine,
    views: Vec<View>,
    data: Option<&'e (dyn Any + Send + Sync)>,
}

impl<'e> Call<'e> {
    #[inline]
    pub(super) fn new(engine: &'e Engine) -> Self {
        Self {
            engine,
            views: Vec::new(),
            data: None,
        }
    }

    /// Adds the view `V`, after the views already added.
    pub fn with_view<V: BeanView>(mut self) -> Self {
        self.views.push(self.engine.view::<V>());
        self
    }

    /// Sets the data converters read through [`Context::data`].
    #[inline]
    pub fn with_data<T: Any + Send + Sync>(mut self, data: &'e T) -> Self {
        self.data = Some(data);
        self
    }

    #[inline]
    pub fn views(&self) -> &[View] {
        &self.views
    }

    fn context(&self) -> Context<'_> {
        Context::new(self.engine, &self.views, self.data)
    }

    /// Writes `value` into a [`Node`].
    pub fn serialize<T: Bindable>(&self, value: &T) -> Result<Node, BindError> {
        let mut writer = TreeWriter::new();
        self.serialize_into(value, &mut writer)?;
        writer.finish()
    }

    /// Writes `value` into `writer`.
    pub fn serialize_into<T: Bindable>(
        &self,
        value: &T,
        writer: &mut dyn DocumentWriter,
    ) -> Result<(), BindError> {
        let converter = self.engine.converter_of::<T>()?;
        converter.serialize(value, writer, &mut self.context())
    }

    /// Reads a `T` from a [`Node`].
    pub fn deserialize<T: Bindable>(&self, node: &Node) -> Result<T, BindError> {
        self.deserialize_from(&mut TreeReader::new(node))
    }

    /// Reads a `T` from `reader`.
    pub fn deserialize_from<T: Bindable>(
        &self,
        reader: &mut dyn DocumentReader,
    ) -> Result<T, BindError> {
        let converter = self.engine.converter_of::<T>()?;
        let value = converter.deserialize(reader, &mut self.context())?;
        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => Err(BindError::mismatch::<T>(reader.path())),
        }
    }
}
