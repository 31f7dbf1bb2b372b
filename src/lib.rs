//! Data binding between typed values and format-neutral documents.
//!
//! This crate re-exports the workspace crates:
//!
//! - [`bind`]: Type registry, property resolution and the binding engine.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use vc_bind as bind;
