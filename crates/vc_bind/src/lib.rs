//! Bind typed values to a format-neutral document model.
//!
//! Types describe themselves once, usually through
//! [`#[derive(Bean)]`](derive::Bean): their generic declaration, supertypes,
//! members and creators. An [`Engine`](engine::Engine) turns those
//! descriptions into converters on demand, resolving properties through a
//! chain of pluggable resolvers, and caches them for the life of the engine.
//!
//! ## Menu
//!
//! - [`types`]: Type descriptors, generic declarations and the type algebra.
//! - [`members`]: Registration-time member tables and attributes.
//! - [`registry`]: The [`Bindable`](registry::Bindable) trait and the type registry.
//! - [`resolver`]: Property resolvers and name filters.
//! - [`bean`]: Bean descriptors built from member tables.
//! - [`view`]: Per-call alternate descriptors.
//! - [`document`]: The reader/writer boundary and the [`Node`](document::Node) tree.
//! - [`convert`]: Converters and the factory chain.
//! - [`engine`]: The engine, its builder and calls.
//! - [`ext`]: Optional configuration bundles.
//!
//! ## Example
//!
//! ```
//! use vc_bind::derive::Bean;
//! use vc_bind::document::Node;
//! use vc_bind::engine::Engine;
//!
//! #[derive(Bean, Debug, PartialEq, Default)]
//! #[bind(default)]
//! pub struct Point {
//!     pub x: i32,
//!     pub y: i32,
//! }
//!
//! let engine = Engine::builder().register::<Point>().build();
//!
//! let node = engine.serialize(&Point { x: 1, y: 2 }).unwrap();
//! assert_eq!(node, Node::map([("x", Node::Int(1)), ("y", Node::Int(2))]));
//!
//! let point: Point = engine.deserialize(&node).unwrap();
//! assert_eq!(point, Point { x: 1, y: 2 });
//! ```
#![no_std]

// -----------------------------------------------------------------------------
// Extern Self

// Derive expansions name `vc_bind`, which must also resolve inside this crate.
extern crate self as vc_bind;

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;
extern crate std;

// -----------------------------------------------------------------------------
// Modules

pub mod bean;
pub mod collections;
pub mod context;
pub mod convert;
pub mod document;
pub mod engine;
pub mod error;
pub mod ext;
pub mod impls;
pub mod members;
pub mod registry;
pub mod resolver;
pub mod types;
pub mod view;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use vc_bind_derive as derive;
