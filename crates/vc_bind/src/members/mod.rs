//! Provide registration-time member tables.
//!
//! ## Menu
//!
//! - [`BeanDecl`]: The declared [`Member`]s and [`Creator`]s of a bean.
//! - [`Member`]: A field, getter or setter, with its declared type.
//!     - [`Accessor`] / [`Mutator`]: Erased read and write access, see [`Slot`].
//! - [`Creator`]: A constructor or factory function, see [`CreatorFn`] and [`Arguments`].
//! - [`Attributes`]: Typed attribute map attached to types and members.
//!     - [`PropertyOptions`]: Explicit name, aliases and directions.
//!     - [`Ignore`]: Excludes a member.
//!     - [`RootName`]: Name used when root values are wrapped.
//!
//! Tables are produced by [`#[derive(Bean)]`](crate::derive::Bean), or written
//! by hand:
//!
//! ```
//! use vc_bind::members::{BeanDecl, Creator, Ignore, Member};
//!
//! struct Point { x: i32, y: i32, cache: i32 }
//!
//! let decl = BeanDecl::new()
//!     .with_member(Member::field::<Point, i32>("x", |p| &p.x, |p| &mut p.x))
//!     .with_member(Member::field::<Point, i32>("y", |p| &p.y, |p| &mut p.y))
//!     .with_member(
//!         Member::field::<Point, i32>("cache", |p| &p.cache, |p| &mut p.cache)
//!             .with_attribute(Ignore),
//!     )
//!     .with_creator(
//!         Creator::constructor("new", |x: i32, y: i32| Point { x, y, cache: 0 })
//!             .with_param_names([Some("x"), Some("y")]),
//!     );
//!
//! assert_eq!(decl.members().len(), 3);
//! assert_eq!(decl.creators().len(), 1);
//! ```

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod creator;
mod member;

// -----------------------------------------------------------------------------
// Exports

pub use attributes::{Attributes, Ignore, PropertyOptions, RootName};
pub use creator::{Arguments, Creator, CreatorFn, CreatorKind, CreatorParam, ParamInfo};
pub use member::{Accessor, Member, MemberKind, Mutator, Slot, Visibility};

use alloc::vec::Vec;

// -----------------------------------------------------------------------------
// BeanDecl

/// The member table of a bean or a view.
///
/// Members are kept in declaration order, which is the property order.
#[derive(Debug, Clone, Default)]
pub struct BeanDecl {
    members: Vec<Member>,
    creators: Vec<Creator>,
}

impl BeanDecl {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a member.
    #[inline]
    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Appends a creator, creators are tried in declaration order.
    #[inline]
    pub fn with_creator(mut self, creator: Creator) -> Self {
        self.creators.push(creator);
        self
    }

    #[inline]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    #[inline]
    pub fn creators(&self) -> &[Creator] {
        &self.creators
    }
}
