use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// An in-memory document value.
///
/// Objects keep their entries in insertion order, and keys are unique.
/// Entries whose key starts with `@` carry metadata, for example the class tag.
///
/// Integers are normalized: a value that fits in `i64` is always stored as
/// [`Node::Int`], [`Node::UInt`] only holds values above `i64::MAX`.
///
/// # Examples
///
/// ```
/// use vc_bind::document::Node;
///
/// let node = Node::map([("x", Node::Int(1)), ("name", Node::from("a"))]);
/// assert_eq!(node.get("x"), Some(&Node::Int(1)));
/// assert_eq!(node.to_string(), r#"{"x":1,"name":"a"}"#);
/// assert_eq!(Node::from_u64(7), Node::Int(7));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Node {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Seq(Vec<Node>),
    Map(Vec<(String, Node)>),
}

impl Node {
    /// Creates an unsigned integer node, normalized to [`Node::Int`] when it fits.
    #[inline]
    pub fn from_u64(value: u64) -> Self {
        i64::try_from(value).map_or(Node::UInt(value), Node::Int)
    }

    /// Creates an object node from its entries.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Node)>) -> Self {
        Node::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Returns the name of the node kind, as used in error messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Int(_) | Node::UInt(_) => "integer",
            Node::Float(_) => "float",
            Node::Str(_) => "string",
            Node::Seq(_) => "array",
            Node::Map(_) => "object",
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value of `key` if `self` is an object.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Map(entries) => entries.iter().find_map(|(k, v)| (k == key).then_some(v)),
            _ => None,
        }
    }

    /// Returns the item at `index` if `self` is an array.
    pub fn at(&self, index: usize) -> Option<&Node> {
        match self {
            Node::Seq(items) => items.get(index),
            _ => None,
        }
    }
}

impl From<bool> for Node {
    #[inline]
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

impl From<i64> for Node {
    #[inline]
    fn from(value: i64) -> Self {
        Node::Int(value)
    }
}

impl From<f64> for Node {
    #[inline]
    fn from(value: f64) -> Self {
        Node::Float(value)
    }
}

impl From<&str> for Node {
    #[inline]
    fn from(value: &str) -> Self {
        Node::Str(value.into())
    }
}

impl From<String> for Node {
    #[inline]
    fn from(value: String) -> Self {
        Node::Str(value)
    }
}

impl From<Vec<Node>> for Node {
    #[inline]
    fn from(value: Vec<Node>) -> Self {
        Node::Seq(value)
    }
}

/// Writes compact JSON.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Null => f.write_str("null"),
            Node::Bool(v) => write!(f, "{v}"),
            Node::Int(v) => write!(f, "{v}"),
            Node::UInt(v) => write!(f, "{v}"),
            Node::Float(v) => write!(f, "{v:?}"),
            Node::Str(s) => write!(f, "{s:?}"),
            Node::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Node::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{key:?}:{value}")?;
                }
                f.write_str("}")
            }
        }
    }
}
