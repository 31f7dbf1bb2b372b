use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use super::{RawType, TypeDescriptor};

// -----------------------------------------------------------------------------
// Upcast

type RefFn = dyn Fn(&dyn Any) -> Option<&dyn Any> + Send + Sync;
type MutFn = dyn Fn(&mut dyn Any) -> Option<&mut dyn Any> + Send + Sync;

#[inline]
fn erase_ref<F>(f: F) -> Arc<RefFn>
where
    F: Fn(&dyn Any) -> Option<&dyn Any> + Send + Sync + 'static,
{
    Arc::new(f)
}

#[inline]
fn erase_mut<F>(f: F) -> Arc<MutFn>
where
    F: Fn(&mut dyn Any) -> Option<&mut dyn Any> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Borrows an embedded supertype out of a value.
///
/// Rust has no inheritance, a "supertype" is a base value embedded in the
/// derived one. The upcast is the accessor pair reaching it.
///
/// # Examples
///
/// ```
/// use core::any::Any;
/// use vc_bind::types::Upcast;
///
/// struct Base { id: u32 }
/// struct Derived { base: Base, name: &'static str }
///
/// let upcast = Upcast::new::<Derived, Base>(|d| &d.base, |d| &mut d.base);
///
/// let mut value = Derived { base: Base { id: 7 }, name: "x" };
/// let base = upcast.apply(&value).unwrap();
/// assert_eq!(base.downcast_ref::<Base>().unwrap().id, 7);
///
/// let base = upcast.apply_mut(&mut value).unwrap();
/// base.downcast_mut::<Base>().unwrap().id = 9;
/// assert_eq!(value.base.id, 9);
///
/// // Wrong source type.
/// assert!(upcast.apply(&1u8 as &dyn Any).is_none());
/// ```
#[derive(Clone)]
pub struct Upcast {
    target: TypeId,
    get: Arc<RefFn>,
    get_mut: Arc<MutFn>,
}

impl Upcast {
    /// Creates an upcast from `S` to its embedded `B`.
    pub fn new<S: Any, B: Any>(get: fn(&S) -> &B, get_mut: fn(&mut S) -> &mut B) -> Self {
        Self {
            target: TypeId::of::<B>(),
            get: erase_ref(move |value| value.downcast_ref::<S>().map(|s| get(s) as &dyn Any)),
            get_mut: erase_mut(move |value| {
                value
                    .downcast_mut::<S>()
                    .map(|s| get_mut(s) as &mut dyn Any)
            }),
        }
    }

    /// Returns the [`TypeId`] of the supertype.
    #[inline]
    pub fn target(&self) -> TypeId {
        self.target
    }

    /// Borrows the supertype, `None` if `value` is not of the source type.
    #[inline]
    pub fn apply<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any> {
        (self.get)(value)
    }

    /// Mutably borrows the supertype, `None` if `value` is not of the source type.
    #[inline]
    pub fn apply_mut<'a>(&self, value: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        (self.get_mut)(value)
    }

    /// Composes `self` followed by `next`.
    pub fn then(&self, next: &Upcast) -> Upcast {
        let (first, second) = (self.get.clone(), next.get.clone());
        let (first_mut, second_mut) = (self.get_mut.clone(), next.get_mut.clone());
        Upcast {
            target: next.target,
            get: erase_ref(move |value| first(value).and_then(|base| second(base))),
            get_mut: erase_mut(move |value| first_mut(value).and_then(|base| second_mut(base))),
        }
    }
}

impl fmt::Debug for Upcast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upcast")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// GenericDecl

/// A declared type parameter.
#[derive(Debug, Clone)]
pub struct TypeParam {
    name: &'static str,
    bound: Option<TypeDescriptor>,
}

impl TypeParam {
    /// Creates an unbounded parameter.
    #[inline]
    pub const fn new(name: &'static str) -> Self {
        Self { name, bound: None }
    }

    /// Sets the upper bound.
    #[inline]
    pub fn with_bound(mut self, bound: TypeDescriptor) -> Self {
        self.bound = Some(bound);
        self
    }

    /// Returns the parameter name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the upper bound.
    #[inline]
    pub fn bound(&self) -> Option<&TypeDescriptor> {
        self.bound.as_ref()
    }
}

/// A declared supertype: a template over the declaring type's parameters,
/// plus the upcast reaching it.
#[derive(Debug, Clone)]
pub struct Supertype {
    template: TypeDescriptor,
    upcast: Upcast,
}

impl Supertype {
    /// Creates a supertype entry.
    #[inline]
    pub fn new(template: TypeDescriptor, upcast: Upcast) -> Self {
        Self { template, upcast }
    }

    /// Returns the template, which may refer to the declaration's parameters.
    #[inline]
    pub fn template(&self) -> &TypeDescriptor {
        &self.template
    }

    /// Returns the upcast.
    #[inline]
    pub fn upcast(&self) -> &Upcast {
        &self.upcast
    }
}

/// The generic declaration of a raw type.
///
/// Holds the declared parameters, in order, and the declared supertypes
/// expressed as templates over those parameters.
///
/// # Examples
///
/// ```
/// use vc_bind::types::{GenericDecl, RawType, TypeParam};
///
/// let decl = GenericDecl::new(RawType::new("app::Page", "Page"))
///     .with_param(TypeParam::new("T"));
///
/// assert_eq!(decl.params().len(), 1);
/// assert_eq!(decl.position("T"), Some(0));
/// assert!(decl.supertypes().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct GenericDecl {
    raw: RawType,
    params: Vec<TypeParam>,
    supertypes: Vec<Supertype>,
}

impl GenericDecl {
    /// Creates a declaration without parameters or supertypes.
    #[inline]
    pub const fn new(raw: RawType) -> Self {
        Self {
            raw,
            params: Vec::new(),
            supertypes: Vec::new(),
        }
    }

    /// Appends a type parameter.
    #[inline]
    pub fn with_param(mut self, param: TypeParam) -> Self {
        self.params.push(param);
        self
    }

    /// Appends a supertype.
    #[inline]
    pub fn with_supertype(mut self, supertype: Supertype) -> Self {
        self.supertypes.push(supertype);
        self
    }

    /// Returns the raw identity.
    #[inline]
    pub fn raw(&self) -> RawType {
        self.raw
    }

    /// Returns the parameters in declaration order.
    #[inline]
    pub fn params(&self) -> &[TypeParam] {
        &self.params
    }

    /// Returns the supertypes in declaration order.
    #[inline]
    pub fn supertypes(&self) -> &[Supertype] {
        &self.supertypes
    }

    /// Returns the index of the parameter called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }
}

// -----------------------------------------------------------------------------
// DeclarationLookup

/// A source of [`GenericDecl`]s, keyed by raw identity.
///
/// Implemented by [`TypeRegistry`](crate::registry::TypeRegistry),
/// and by plain slices for standalone use of the algebra.
pub trait DeclarationLookup {
    /// Returns the declaration of `raw`, if known.
    fn declaration(&self, raw: &RawType) -> Option<&GenericDecl>;
}

impl DeclarationLookup for [GenericDecl] {
    fn declaration(&self, raw: &RawType) -> Option<&GenericDecl> {
        self.iter().find(|decl| decl.raw == *raw)
    }
}

impl DeclarationLookup for Vec<GenericDecl> {
    #[inline]
    fn declaration(&self, raw: &RawType) -> Option<&GenericDecl> {
        self.as_slice().declaration(raw)
    }
}
