//! Provide pluggable property resolvers.
//!
//! ## Menu
//!
//! - [`PropertyResolver`]: Decides whether a member is an accessor or a
//!   mutator of a property, and how the property is named.
//! - [`ResolverChain`]: Resolvers in priority order, the first decisive
//!   [`Verdict`] wins.
//! - [`PropertyFilter`]: Name-based include, exclude and rename rules,
//!   consulted before every resolver.
//! - Provided resolvers:
//!     - [`MetadataResolver`]: [`PropertyOptions`] and [`Ignore`] attributes.
//!     - [`ConventionResolver`]: `get_x`, `set_x` and `is_x` names.
//!
//! When every resolver is undecided, public members are included, see
//! [`Options::include_private`](crate::engine::Options::include_private).
//!
//! [`PropertyOptions`]: crate::members::PropertyOptions
//! [`Ignore`]: crate::members::Ignore

// -----------------------------------------------------------------------------
// Modules

mod chain;
mod convention;
mod metadata;

// -----------------------------------------------------------------------------
// Exports

pub use chain::{PropertyFilter, ResolverChain};
pub use convention::ConventionResolver;
pub use metadata::MetadataResolver;

pub(crate) use metadata::deserialization_disabled;

use alloc::borrow::Cow;

use crate::members::{Attributes, Member};
use crate::registry::{TypeMeta, TypeRegistry};
use crate::types::TypeDescriptor;

// -----------------------------------------------------------------------------
// Verdict

/// The answer of a [`PropertyResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Include,
    Exclude,
    /// Leaves the decision to the next resolver.
    Undecided,
}

impl Verdict {
    #[inline]
    pub const fn is_decisive(self) -> bool {
        !matches!(self, Verdict::Undecided)
    }
}

/// The role a member is considered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberRole {
    /// Reads the property, used when serializing.
    Accessor,
    /// Writes the property, used when deserializing.
    Mutator,
}

/// The type declaring the member under consideration.
///
/// For inherited members this is the supertype, `depth` counts the
/// supertype steps from the bean being described.
#[derive(Debug, Clone, Copy)]
pub struct DeclaringType<'a> {
    meta: &'a TypeMeta,
    depth: usize,
    registry: Option<&'a TypeRegistry>,
}

impl<'a> DeclaringType<'a> {
    #[inline]
    pub fn new(meta: &'a TypeMeta, depth: usize) -> Self {
        Self {
            meta,
            depth,
            registry: None,
        }
    }

    /// Makes the registered types of members visible, see [`member_type`].
    ///
    /// [`member_type`]: DeclaringType::member_type
    #[inline]
    pub fn with_registry(mut self, registry: &'a TypeRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    #[inline]
    pub fn meta(&self) -> &'a TypeMeta {
        self.meta
    }

    #[inline]
    pub fn descriptor(&self) -> &'a TypeDescriptor {
        self.meta.descriptor()
    }

    /// Returns the type-level attributes.
    #[inline]
    pub fn attributes(&self) -> &'a Attributes {
        self.meta.attributes()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the other members declared by the same type.
    pub fn siblings(&self) -> &'a [Member] {
        self.meta.shape().as_bean().map_or(&[], |decl| decl.members())
    }

    /// Returns the registered type of the value `member` reads or writes.
    pub fn member_type(&self, member: &Member) -> Option<&'a TypeMeta> {
        let value_id = match (member.accessor(), member.mutator()) {
            (Some(accessor), _) => accessor.value_id(),
            (None, Some(mutator)) => mutator.value_id(),
            (None, None) => return None,
        };
        self.registry?.get(value_id)
    }
}

// -----------------------------------------------------------------------------
// PropertyResolver

/// Decides which members become properties.
///
/// # Examples
///
/// ```
/// use vc_bind::members::Member;
/// use vc_bind::resolver::{DeclaringType, MemberRole, PropertyResolver, Verdict};
///
/// /// Never reads members whose name starts with an underscore.
/// struct NoUnderscore;
///
/// impl PropertyResolver for NoUnderscore {
///     fn decide(&self, member: &Member, _: MemberRole, _: &DeclaringType<'_>) -> Verdict {
///         if member.name().starts_with('_') {
///             Verdict::Exclude
///         } else {
///             Verdict::Undecided
///         }
///     }
/// }
/// ```
pub trait PropertyResolver: Send + Sync + 'static {
    fn decide(&self, member: &Member, role: MemberRole, declaring: &DeclaringType<'_>) -> Verdict;

    /// Returns the property name of `member`, `None` to defer.
    #[inline]
    fn resolve_name(
        &self,
        member: &Member,
        declaring: &DeclaringType<'_>,
    ) -> Option<Cow<'static, str>> {
        let _ = (member, declaring);
        None
    }
}
