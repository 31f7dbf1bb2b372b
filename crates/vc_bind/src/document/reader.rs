use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::Write;

use super::Node;
use crate::error::BindError;

/// Returns the regular key stored as `key`, `None` for metadata.
fn unescape_key(key: &str) -> Option<&str> {
    if key.starts_with("@@") {
        Some(&key[1..])
    } else if key.starts_with('@') {
        None
    } else {
        Some(key)
    }
}

// -----------------------------------------------------------------------------
// Token

/// The kind of the value under a [`DocumentReader`]'s cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Array,
    Object,
}

impl Token {
    fn of(node: &Node) -> Self {
        match node {
            Node::Null => Token::Null,
            Node::Bool(_) => Token::Bool,
            Node::Int(_) | Node::UInt(_) => Token::Int,
            Node::Float(_) => Token::Float,
            Node::Str(_) => Token::Str,
            Node::Seq(_) => Token::Array,
            Node::Map(_) => Token::Object,
        }
    }
}

// -----------------------------------------------------------------------------
// DocumentReader

/// A pull cursor over a document.
///
/// Each `read_*`, [`begin_object`] and [`begin_array`] call consumes the value
/// under the cursor. Inside an object, a value becomes current after
/// [`next_key`]. Inside an array, values are consumed in order.
///
/// Metadata entries (keys starting with `@`) are never returned by
/// [`next_key`], they are inspected with [`metadata`].
///
/// [`begin_object`]: DocumentReader::begin_object
/// [`begin_array`]: DocumentReader::begin_array
/// [`next_key`]: DocumentReader::next_key
/// [`metadata`]: DocumentReader::metadata
pub trait DocumentReader {
    /// Returns the kind of the value under the cursor.
    fn peek(&self) -> Result<Token, BindError>;

    fn read_null(&mut self) -> Result<(), BindError>;
    fn read_bool(&mut self) -> Result<bool, BindError>;
    fn read_i64(&mut self) -> Result<i64, BindError>;
    fn read_u64(&mut self) -> Result<u64, BindError>;
    fn read_f64(&mut self) -> Result<f64, BindError>;
    fn read_str(&mut self) -> Result<String, BindError>;

    fn begin_object(&mut self) -> Result<(), BindError>;
    /// Advances to the next regular key, `None` at the end of the object.
    fn next_key(&mut self) -> Result<Option<String>, BindError>;
    fn end_object(&mut self) -> Result<(), BindError>;

    fn begin_array(&mut self) -> Result<(), BindError>;
    fn has_next(&self) -> Result<bool, BindError>;
    fn end_array(&mut self) -> Result<(), BindError>;

    /// Consumes the value under the cursor without decoding it.
    fn skip_value(&mut self) -> Result<(), BindError>;

    /// Returns the `@key` metadata of the object under the cursor, without consuming it.
    fn metadata(&self, key: &str) -> Option<String>;

    /// Returns the location of the cursor, e.g. `$.items[2].name`.
    fn path(&self) -> String;

    /// Creates a [`BindError::Malformed`] at the current location.
    fn malformed(&self, expected: &str, found: &str) -> BindError {
        BindError::Malformed {
            path: self.path(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

// -----------------------------------------------------------------------------
// TreeReader

enum Frame<'a> {
    Seq {
        items: &'a [Node],
        next: usize,
        current: Option<usize>,
    },
    Map {
        entries: &'a [(String, Node)],
        next: usize,
        current: Option<usize>,
        pending: bool,
    },
}

/// A [`DocumentReader`] over a borrowed [`Node`].
///
/// # Examples
///
/// ```
/// use vc_bind::document::{DocumentReader, Node, TreeReader};
///
/// let node = Node::map([("ids", Node::Seq(vec![Node::Int(1), Node::from("x")]))]);
/// let mut r = TreeReader::new(&node);
///
/// r.begin_object().unwrap();
/// assert_eq!(r.next_key().unwrap().as_deref(), Some("ids"));
/// r.begin_array().unwrap();
/// assert_eq!(r.read_i64().unwrap(), 1);
///
/// let err = r.read_i64().unwrap_err();
/// assert_eq!(err.to_string(), "at `$.ids[1]`: expected integer, found string");
/// ```
pub struct TreeReader<'a> {
    root: Option<&'a Node>,
    stack: Vec<Frame<'a>>,
}

impl<'a> TreeReader<'a> {
    #[inline]
    pub fn new(root: &'a Node) -> Self {
        Self {
            root: Some(root),
            stack: Vec::new(),
        }
    }

    fn current(&self) -> Option<&'a Node> {
        match self.stack.last() {
            None => self.root,
            Some(Frame::Seq { items, next, .. }) => items.get(*next),
            Some(Frame::Map {
                entries,
                current,
                pending,
                ..
            }) => match (current, pending) {
                (Some(i), true) => entries.get(*i).map(|(_, v)| v),
                _ => None,
            },
        }
    }

    /// Consumes the value under the cursor.
    fn take(&mut self) -> Result<&'a Node, BindError> {
        let node = self
            .current()
            .ok_or_else(|| BindError::document("no value under the cursor"))?;
        match self.stack.last_mut() {
            None => self.root = None,
            Some(Frame::Seq { next, current, .. }) => {
                *current = Some(*next);
                *next += 1;
            }
            Some(Frame::Map { pending, .. }) => *pending = false,
        }
        Ok(node)
    }

    fn take_as<T>(
        &mut self,
        expected: &str,
        f: impl FnOnce(&'a Node) -> Option<T>,
    ) -> Result<T, BindError> {
        let node = self.take()?;
        f(node).ok_or_else(|| self.malformed(expected, node.kind()))
    }
}

impl DocumentReader for TreeReader<'_> {
    fn peek(&self) -> Result<Token, BindError> {
        self.current()
            .map(Token::of)
            .ok_or_else(|| BindError::document("no value under the cursor"))
    }

    fn read_null(&mut self) -> Result<(), BindError> {
        self.take_as("null", |n| n.is_null().then_some(()))
    }

    fn read_bool(&mut self) -> Result<bool, BindError> {
        self.take_as("boolean", |n| match n {
            Node::Bool(v) => Some(*v),
            _ => None,
        })
    }

    fn read_i64(&mut self) -> Result<i64, BindError> {
        self.take_as("integer", |n| match n {
            Node::Int(v) => Some(*v),
            Node::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        })
    }

    fn read_u64(&mut self) -> Result<u64, BindError> {
        self.take_as("unsigned integer", |n| match n {
            Node::Int(v) => u64::try_from(*v).ok(),
            Node::UInt(v) => Some(*v),
            _ => None,
        })
    }

    fn read_f64(&mut self) -> Result<f64, BindError> {
        self.take_as("number", |n| match n {
            Node::Float(v) => Some(*v),
            Node::Int(v) => Some(*v as f64),
            Node::UInt(v) => Some(*v as f64),
            _ => None,
        })
    }

    fn read_str(&mut self) -> Result<String, BindError> {
        self.take_as("string", |n| n.as_str().map(ToString::to_string))
    }

    fn begin_object(&mut self) -> Result<(), BindError> {
        let entries = self.take_as("object", |n| match n {
            Node::Map(entries) => Some(entries.as_slice()),
            _ => None,
        })?;
        self.stack.push(Frame::Map {
            entries,
            next: 0,
            current: None,
            pending: false,
        });
        Ok(())
    }

    fn next_key(&mut self) -> Result<Option<String>, BindError> {
        let Some(Frame::Map {
            entries,
            next,
            current,
            pending,
        }) = self.stack.last_mut()
        else {
            return Err(BindError::document("no open object"));
        };
        while let Some((key, _)) = entries.get(*next) {
            let index = *next;
            *next += 1;
            if let Some(key) = unescape_key(key) {
                *current = Some(index);
                *pending = true;
                return Ok(Some(key.to_string()));
            }
        }
        *pending = false;
        Ok(None)
    }

    fn end_object(&mut self) -> Result<(), BindError> {
        match self.stack.pop() {
            Some(Frame::Map { .. }) => Ok(()),
            _ => Err(BindError::document("no open object")),
        }
    }

    fn begin_array(&mut self) -> Result<(), BindError> {
        let items = self.take_as("array", |n| match n {
            Node::Seq(items) => Some(items.as_slice()),
            _ => None,
        })?;
        self.stack.push(Frame::Seq {
            items,
            next: 0,
            current: None,
        });
        Ok(())
    }

    fn has_next(&self) -> Result<bool, BindError> {
        match self.stack.last() {
            Some(Frame::Seq { items, next, .. }) => Ok(*next < items.len()),
            _ => Err(BindError::document("no open array")),
        }
    }

    fn end_array(&mut self) -> Result<(), BindError> {
        match self.stack.pop() {
            Some(Frame::Seq { .. }) => Ok(()),
            _ => Err(BindError::document("no open array")),
        }
    }

    #[inline]
    fn skip_value(&mut self) -> Result<(), BindError> {
        self.take().map(|_| ())
    }

    fn metadata(&self, key: &str) -> Option<String> {
        let Some(Node::Map(entries)) = self.current() else {
            return None;
        };
        entries.iter().find_map(|(k, v)| {
            let name = k.strip_prefix('@').filter(|name| !name.starts_with('@'))?;
            (name == key).then(|| v.as_str().map(ToString::to_string))?
        })
    }

    fn path(&self) -> String {
        let mut path = String::from("$");
        for frame in &self.stack {
            match frame {
                Frame::Seq {
                    current: Some(i), ..
                } => {
                    let _ = write!(path, "[{i}]");
                }
                Frame::Map {
                    entries,
                    current: Some(i),
                    ..
                } => {
                    if let Some((key, _)) = entries.get(*i) {
                        path.push('.');
                        path.push_str(unescape_key(key).unwrap_or(key));
                    }
                }
                _ => {}
            }
        }
        path
    }
}

// -----------------------------------------------------------------------------
// Tests
