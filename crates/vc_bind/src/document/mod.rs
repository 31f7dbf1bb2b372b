//! Provide the tokenizer/emitter boundary.
//!
//! Converters never see a concrete format. They drive a [`DocumentWriter`]
//! when serializing and pull from a [`DocumentReader`] when deserializing.
//!
//! ## Menu
//!
//! - [`Node`]: An in-memory document tree, with `serde` support for any format.
//! - [`DocumentWriter`]: A forward-only emitter.
//!     - [`TreeWriter`]: Builds a [`Node`].
//! - [`DocumentReader`]: A pull cursor, reporting its position as a path.
//!     - [`TreeReader`]: Reads a borrowed [`Node`].
//!     - [`Token`]: Kind of the value under the cursor.
//!
//! ## Keys
//!
//! Object keys starting with `@` hold metadata, such as `@class`. A regular
//! key starting with `@` is stored with one more `@` in front, `@home`
//! becomes `@@home`, and readers strip it again.
//!
//! ## Formats
//!
//! `Node` implements `serde::Serialize` and `serde::Deserialize`, so
//! JSON, RON and every other serde format are one call away:
//!
//! ```
//! use vc_bind::document::Node;
//!
//! let node: Node = serde_json::from_str(r#"{"x": 1, "y": [true]}"#).unwrap();
//! assert_eq!(node.get("x"), Some(&Node::Int(1)));
//! assert_eq!(serde_json::to_string(&node).unwrap(), r#"{"x":1,"y":[true]}"#);
//! ```

// -----------------------------------------------------------------------------
// Modules

mod node;
mod reader;
mod serde;
mod writer;

// -----------------------------------------------------------------------------
// Exports

pub use node::Node;
pub use reader::{DocumentReader, Token, TreeReader};
pub use writer::{DocumentWriter, TreeWriter};
