use alloc::borrow::Cow;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use super::Node;
use crate::collections::HashSet;
use crate::error::BindError;

/// Stores regular keys starting with `@` as `@@..`, apart from metadata.
fn escape_key(key: &str) -> Cow<'_, str> {
    if key.starts_with('@') {
        Cow::Owned(format!("@{key}"))
    } else {
        Cow::Borrowed(key)
    }
}

// -----------------------------------------------------------------------------
// DocumentWriter

/// A forward-only document emitter.
///
/// Inside an object every value must be preceded by [`write_key`], and a key
/// may be written only once per object. Metadata entries are written with
/// [`write_metadata`] before any regular key.
///
/// [`write_key`]: DocumentWriter::write_key
/// [`write_metadata`]: DocumentWriter::write_metadata
pub trait DocumentWriter {
    fn write_null(&mut self) -> Result<(), BindError>;
    fn write_bool(&mut self, value: bool) -> Result<(), BindError>;
    fn write_i64(&mut self, value: i64) -> Result<(), BindError>;
    fn write_u64(&mut self, value: u64) -> Result<(), BindError>;
    fn write_f64(&mut self, value: f64) -> Result<(), BindError>;
    fn write_str(&mut self, value: &str) -> Result<(), BindError>;

    fn begin_object(&mut self) -> Result<(), BindError>;
    fn write_key(&mut self, key: &str) -> Result<(), BindError>;
    fn end_object(&mut self) -> Result<(), BindError>;

    fn begin_array(&mut self) -> Result<(), BindError>;
    fn end_array(&mut self) -> Result<(), BindError>;

    /// Writes the `@key` metadata entry of the object just begun.
    fn write_metadata(&mut self, key: &str, value: &str) -> Result<(), BindError>;
}

// -----------------------------------------------------------------------------
// TreeWriter

enum Frame {
    Seq(Vec<Node>),
    Map {
        entries: Vec<(String, Node)>,
        keys: HashSet<String>,
        pending: Option<String>,
        has_properties: bool,
    },
}

/// A [`DocumentWriter`] building a [`Node`].
///
/// # Examples
///
/// ```
/// use vc_bind::document::{DocumentWriter, Node, TreeWriter};
///
/// let mut w = TreeWriter::new();
/// w.begin_object().unwrap();
/// w.write_key("ids").unwrap();
/// w.begin_array().unwrap();
/// w.write_i64(1).unwrap();
/// w.write_u64(2).unwrap();
/// w.end_array().unwrap();
/// w.end_object().unwrap();
///
/// let node = w.finish().unwrap();
/// assert_eq!(node.to_string(), r#"{"ids":[1,2]}"#);
/// ```
#[derive(Default)]
pub struct TreeWriter {
    stack: Vec<Frame>,
    root: Option<Node>,
}

impl TreeWriter {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the written document.
    ///
    /// Fails if nothing was written or a container is still open.
    pub fn finish(self) -> Result<Node, BindError> {
        if !self.stack.is_empty() {
            return Err(BindError::document("unterminated container"));
        }
        self.root
            .ok_or_else(|| BindError::document("no value written"))
    }

    fn put(&mut self, node: Node) -> Result<(), BindError> {
        match self.stack.last_mut() {
            None if self.root.is_some() => Err(BindError::document("multiple root values")),
            None => {
                self.root = Some(node);
                Ok(())
            }
            Some(Frame::Seq(items)) => {
                items.push(node);
                Ok(())
            }
            Some(Frame::Map { entries, pending, .. }) => match pending.take() {
                Some(key) => {
                    entries.push((key, node));
                    Ok(())
                }
                None => Err(BindError::document("object value without a key")),
            },
        }
    }

    /// Sets the stored form of the next key of the open object.
    fn pend_key(&mut self, stored: Cow<'_, str>, property: bool) -> Result<(), BindError> {
        let Some(Frame::Map {
            keys,
            pending,
            has_properties,
            ..
        }) = self.stack.last_mut()
        else {
            return Err(BindError::document("no open object"));
        };
        if let Some(prev) = pending {
            return Err(BindError::document(format!("key `{prev}` has no value")));
        }
        if !property && *has_properties {
            return Err(BindError::document(format!(
                "metadata `{stored}` written after properties"
            )));
        }
        if keys.contains(stored.as_ref()) {
            return Err(BindError::document(format!("duplicate key `{stored}`")));
        }
        let stored = stored.into_owned();
        keys.insert(stored.clone());
        *pending = Some(stored);
        *has_properties |= property;
        Ok(())
    }
}

impl DocumentWriter for TreeWriter {
    #[inline]
    fn write_null(&mut self) -> Result<(), BindError> {
        self.put(Node::Null)
    }

    #[inline]
    fn write_bool(&mut self, value: bool) -> Result<(), BindError> {
        self.put(Node::Bool(value))
    }

    #[inline]
    fn write_i64(&mut self, value: i64) -> Result<(), BindError> {
        self.put(Node::Int(value))
    }

    #[inline]
    fn write_u64(&mut self, value: u64) -> Result<(), BindError> {
        self.put(Node::from_u64(value))
    }

    #[inline]
    fn write_f64(&mut self, value: f64) -> Result<(), BindError> {
        self.put(Node::Float(value))
    }

    #[inline]
    fn write_str(&mut self, value: &str) -> Result<(), BindError> {
        self.put(Node::Str(value.to_string()))
    }

    fn begin_object(&mut self) -> Result<(), BindError> {
        self.stack.push(Frame::Map {
            entries: Vec::new(),
            keys: HashSet::default(),
            pending: None,
            has_properties: false,
        });
        Ok(())
    }

    #[inline]
    fn write_key(&mut self, key: &str) -> Result<(), BindError> {
        self.pend_key(escape_key(key), true)
    }

    fn end_object(&mut self) -> Result<(), BindError> {
        match self.stack.pop() {
            Some(Frame::Map {
                entries,
                pending: None,
                ..
            }) => self.put(Node::Map(entries)),
            Some(Frame::Map {
                pending: Some(key), ..
            }) => Err(BindError::document(format!("key `{key}` has no value"))),
            _ => Err(BindError::document("no open object")),
        }
    }

    fn begin_array(&mut self) -> Result<(), BindError> {
        self.stack.push(Frame::Seq(Vec::new()));
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), BindError> {
        match self.stack.pop() {
            Some(Frame::Seq(items)) => self.put(Node::Seq(items)),
            _ => Err(BindError::document("no open array")),
        }
    }

    fn write_metadata(&mut self, key: &str, value: &str) -> Result<(), BindError> {
        self.pend_key(Cow::Owned(format!("@{key}")), false)?;
        self.write_str(value)
    }
}

// -----------------------------------------------------------------------------
// Tests
