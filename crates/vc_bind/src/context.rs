//! Per-call state shared by every converter of one call.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt::Write;

use crate::document::{DocumentReader, DocumentWriter};
use crate::engine::{Engine, Options};
use crate::error::BindError;
use crate::view::View;

// -----------------------------------------------------------------------------
// Context

enum Segment {
    Key(String),
    Index(usize),
}

/// The state of one top-level serialize or deserialize call.
///
/// It carries the engine, the active views, optional caller data, the
/// nesting depth and the property path of the value being written.
/// Converters descend into nested values through
/// [`serialize_value`](Self::serialize_value) and
/// [`deserialize_value`](Self::deserialize_value), which resolve the
/// nested converter lazily.
pub struct Context<'a> {
    engine: &'a Engine,
    views: &'a [View],
    data: Option<&'a (dyn Any + Send + Sync)>,
    depth: usize,
    path: Vec<Segment>,
    selected: Option<View>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        engine: &'a Engine,
        views: &'a [View],
        data: Option<&'a (dyn Any + Send + Sync)>,
    ) -> Self {
        Self {
            engine,
            views,
            data,
            depth: 0,
            path: Vec::new(),
            selected: None,
        }
    }

    #[inline]
    pub fn engine(&self) -> &'a Engine {
        self.engine
    }

    #[inline]
    pub fn options(&self) -> &'a Options {
        self.engine.options()
    }

    /// Returns the views requested for this call, in priority order.
    #[inline]
    pub fn views(&self) -> &'a [View] {
        self.views
    }

    /// Returns the caller data, if it is a `T`.
    #[inline]
    pub fn data<T: Any>(&self) -> Option<&'a T> {
        self.data.and_then(|data| data.downcast_ref::<T>())
    }

    /// Returns the nesting depth, `0` for the root value.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the path of the value being written, e.g. `$.lines[1].qty`.
    pub fn path(&self) -> String {
        let mut path = String::from("$");
        for segment in &self.path {
            let _ = match segment {
                Segment::Key(key) => write!(path, ".{key}"),
                Segment::Index(index) => write!(path, "[{index}]"),
            };
        }
        path
    }

    /// Runs `f` with `key` appended to the path.
    pub fn with_key<R>(&mut self, key: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push(Segment::Key(key.into()));
        let result = f(self);
        self.path.pop();
        result
    }

    /// Runs `f` with `index` appended to the path.
    pub fn with_index<R>(&mut self, index: usize, f: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push(Segment::Index(index));
        let result = f(self);
        self.path.pop();
        result
    }

    /// Writes a nested value of the registered type `type_id`.
    pub fn serialize_value(
        &mut self,
        type_id: TypeId,
        value: &dyn Any,
        writer: &mut dyn DocumentWriter,
    ) -> Result<(), BindError> {
        let converter = self.engine.converter_by_id(type_id)?;
        self.depth += 1;
        let result = converter.serialize(value, writer, self);
        self.depth -= 1;
        result
    }

    /// Reads a nested value of the registered type `type_id`.
    pub fn deserialize_value(
        &mut self,
        type_id: TypeId,
        reader: &mut dyn DocumentReader,
    ) -> Result<Box<dyn Any>, BindError> {
        let converter = self.engine.converter_by_id(type_id)?;
        self.depth += 1;
        let result = converter.deserialize(reader, self);
        self.depth -= 1;
        result
    }

    /// Hands the view selected for the next bean over to its converter.
    #[inline]
    pub(crate) fn select_view(&mut self, view: Option<View>) {
        self.selected = view;
    }

    /// Takes the view selected for the current bean.
    #[inline]
    pub(crate) fn take_view(&mut self) -> Option<View> {
        self.selected.take()
    }
}

// -----------------------------------------------------------------------------
// Tests
