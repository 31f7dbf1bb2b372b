//! Optional configuration bundles.
//!
//! - [`xml`]: XML-binding style attributes and access policies.

pub mod xml;
