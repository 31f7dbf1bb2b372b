//! Per-call alternate bean descriptors.
//!
//! A view is a member table over a subject type. Requesting it for a call,
//! see [`Call::with_view`](crate::engine::Call::with_view), makes every bean
//! compatible with the subject use the view's properties instead of its own
//! for that call only.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId, type_name};
use core::fmt;

use crate::members::BeanDecl;
use crate::registry::{Bindable, TypeRegistry, bean_dependencies};
use crate::types::{DeclarationLookup, MatchMode, TypeDescriptor, matches};

// -----------------------------------------------------------------------------
// BeanView

/// A type describing a view.
///
/// # Examples
///
/// ```
/// use vc_bind::members::{BeanDecl, Member};
/// use vc_bind::view::{BeanView, ViewMeta};
///
/// struct User { name: String, password: String }
/// # impl vc_bind::registry::Bindable for User {
/// #     fn type_descriptor() -> vc_bind::types::TypeDescriptor {
/// #         vc_bind::types::TypeDescriptor::concrete::<User>(
/// #             vc_bind::types::RawType::new("app::User", "User"), [], Default::default())
/// #     }
/// #     fn type_meta() -> vc_bind::registry::TypeMeta {
/// #         vc_bind::registry::TypeMeta::of::<User>(vc_bind::registry::TypeShape::Opaque)
/// #     }
/// # }
///
/// /// Hides the password.
/// struct PublicUser;
///
/// impl BeanView for PublicUser {
///     fn view_meta() -> ViewMeta {
///         ViewMeta::of::<User>(
///             BeanDecl::new()
///                 .with_member(Member::field::<User, String>("name", |u| &u.name, |u| &mut u.name)),
///         )
///     }
/// }
///
/// let meta = PublicUser::view_meta();
/// assert_eq!(meta.subject().raw().name(), "User");
/// assert_eq!(meta.decl().members().len(), 1);
/// ```
pub trait BeanView: Any + Send + Sync {
    fn view_meta() -> ViewMeta;
}

// -----------------------------------------------------------------------------
// ViewMeta

/// The subject type and member table of a view.
#[derive(Clone)]
pub struct ViewMeta {
    name: &'static str,
    subject: TypeDescriptor,
    subject_id: TypeId,
    decl: BeanDecl,
    register_subject: fn(&mut TypeRegistry),
}

impl ViewMeta {
    /// Creates a view over `S`. Members read and write `S` values.
    pub fn of<S: Bindable>(decl: BeanDecl) -> Self {
        Self {
            name: type_name::<S>(),
            subject: S::type_descriptor(),
            subject_id: TypeId::of::<S>(),
            decl,
            register_subject: TypeRegistry::register::<S>,
        }
    }

    /// Sets the name used in logs.
    #[inline]
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn subject(&self) -> &TypeDescriptor {
        &self.subject
    }

    #[inline]
    pub fn subject_id(&self) -> TypeId {
        self.subject_id
    }

    #[inline]
    pub fn decl(&self) -> &BeanDecl {
        &self.decl
    }

    /// Registers the subject and the types the view's creators and adapters need.
    pub(crate) fn register(&self, registry: &mut TypeRegistry) {
        let mut dependencies = Vec::new();
        dependencies.push(self.register_subject);
        bean_dependencies(&self.decl, &mut dependencies);
        for register in dependencies {
            register(registry);
        }
    }
}

impl fmt::Debug for ViewMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewMeta")
            .field("name", &self.name)
            .field("subject", &self.subject)
            .field("members", &self.decl.members().len())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// View

/// A handle to a view, cheap to clone.
#[derive(Debug, Clone)]
pub struct View {
    id: TypeId,
    meta: Arc<ViewMeta>,
}

impl View {
    /// Creates the handle of `V`.
    #[inline]
    pub fn of<V: BeanView>() -> Self {
        Self::new(TypeId::of::<V>(), V::view_meta())
    }

    #[inline]
    pub(crate) fn new(id: TypeId, meta: ViewMeta) -> Self {
        Self {
            id,
            meta: Arc::new(meta),
        }
    }

    /// Returns the [`TypeId`] of the [`BeanView`] type.
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn meta(&self) -> &ViewMeta {
        &self.meta
    }
}

// -----------------------------------------------------------------------------
// select_view

/// Returns the first view whose subject accepts `target`.
///
/// A view applies when `target` is assignable to its subject, see
/// [`matches`] in [`MatchMode::Covariant`]. Later candidates are not
/// considered once one applies.
pub fn select_view<'a, L>(
    lookup: &L,
    candidates: impl IntoIterator<Item = &'a ViewMeta>,
    target: &TypeDescriptor,
) -> Option<&'a ViewMeta>
where
    L: DeclarationLookup + ?Sized,
{
    candidates
        .into_iter()
        .find(|view| matches(lookup, target, view.subject(), MatchMode::Covariant))
}

// -----------------------------------------------------------------------------
// Tests
