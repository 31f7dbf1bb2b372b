use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::{Any, TypeId, type_name};
use core::fmt;

use super::Attributes;
use crate::types::{TypeArg, Upcast};

// -----------------------------------------------------------------------------
// Slot

/// A value read through an [`Accessor`]: borrowed from a field, or owned
/// when returned by a getter.
pub enum Slot<'a> {
    Borrowed(&'a dyn Any),
    Owned(Box<dyn Any>),
}

impl Slot<'_> {
    /// Returns the value.
    #[inline]
    pub fn as_any(&self) -> &dyn Any {
        match self {
            Slot::Borrowed(value) => *value,
            Slot::Owned(value) => &**value,
        }
    }
}

// -----------------------------------------------------------------------------
// Accessor

type GetFn = dyn for<'a> Fn(&'a dyn Any) -> Option<Slot<'a>> + Send + Sync;

#[inline]
fn erase_get<F>(f: F) -> Arc<GetFn>
where
    F: for<'a> Fn(&'a dyn Any) -> Option<Slot<'a>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Reads a member value out of an erased instance.
#[derive(Clone)]
pub struct Accessor {
    value_id: TypeId,
    value_name: &'static str,
    get: Arc<GetFn>,
}

impl Accessor {
    /// Reads a field by reference.
    pub fn field<S: Any, V: Any>(get: fn(&S) -> &V) -> Self {
        Self {
            value_id: TypeId::of::<V>(),
            value_name: type_name::<V>(),
            get: erase_get(move |target| {
                target
                    .downcast_ref::<S>()
                    .map(|s| Slot::Borrowed(get(s)))
            }),
        }
    }

    /// Reads a value through a getter method.
    pub fn getter<S: Any, V: Any>(get: fn(&S) -> V) -> Self {
        Self {
            value_id: TypeId::of::<V>(),
            value_name: type_name::<V>(),
            get: erase_get(move |target| {
                target
                    .downcast_ref::<S>()
                    .map(|s| Slot::Owned(Box::new(get(s))))
            }),
        }
    }

    /// Returns an accessor reading the same member from a derived type
    /// embedding the declaring type.
    pub fn through(&self, upcast: &Upcast) -> Self {
        let (upcast, inner) = (upcast.clone(), self.get.clone());
        Self {
            value_id: self.value_id,
            value_name: self.value_name,
            get: erase_get(move |target| upcast.apply(target).and_then(|base| inner(base))),
        }
    }

    /// Returns the [`TypeId`] of the read value.
    #[inline]
    pub fn value_id(&self) -> TypeId {
        self.value_id
    }

    #[inline]
    pub fn value_name(&self) -> &'static str {
        self.value_name
    }

    /// Reads the value, `None` if `target` is not of the declaring type.
    #[inline]
    pub fn get<'a>(&self, target: &'a dyn Any) -> Option<Slot<'a>> {
        (self.get)(target)
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Accessor").field(&self.value_name).finish()
    }
}

// -----------------------------------------------------------------------------
// Mutator

type SetFn = dyn Fn(&mut dyn Any, Box<dyn Any>) -> Result<(), Box<dyn Any>> + Send + Sync;

#[inline]
fn erase_set<F>(f: F) -> Arc<SetFn>
where
    F: Fn(&mut dyn Any, Box<dyn Any>) -> Result<(), Box<dyn Any>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Writes a member value into an erased instance.
#[derive(Clone)]
pub struct Mutator {
    value_id: TypeId,
    value_name: &'static str,
    set: Arc<SetFn>,
}

impl Mutator {
    /// Writes a field by mutable reference.
    pub fn field<S: Any, V: Any>(get_mut: fn(&mut S) -> &mut V) -> Self {
        Self {
            value_id: TypeId::of::<V>(),
            value_name: type_name::<V>(),
            set: erase_set(move |target, value| {
                let Some(s) = target.downcast_mut::<S>() else {
                    return Err(value);
                };
                *get_mut(s) = *value.downcast::<V>()?;
                Ok(())
            }),
        }
    }

    /// Writes a value through a setter method.
    pub fn setter<S: Any, V: Any>(set: fn(&mut S, V)) -> Self {
        Self {
            value_id: TypeId::of::<V>(),
            value_name: type_name::<V>(),
            set: erase_set(move |target, value| {
                let Some(s) = target.downcast_mut::<S>() else {
                    return Err(value);
                };
                set(s, *value.downcast::<V>()?);
                Ok(())
            }),
        }
    }

    /// Returns a mutator writing the same member into a derived type
    /// embedding the declaring type.
    pub fn through(&self, upcast: &Upcast) -> Self {
        let (upcast, inner) = (upcast.clone(), self.set.clone());
        Self {
            value_id: self.value_id,
            value_name: self.value_name,
            set: erase_set(move |target, value| match upcast.apply_mut(target) {
                Some(base) => inner(base, value),
                None => Err(value),
            }),
        }
    }

    /// Returns the [`TypeId`] of the written value.
    #[inline]
    pub fn value_id(&self) -> TypeId {
        self.value_id
    }

    #[inline]
    pub fn value_name(&self) -> &'static str {
        self.value_name
    }

    /// Writes `value`. Gives it back if either type does not match.
    #[inline]
    pub fn set(&self, target: &mut dyn Any, value: Box<dyn Any>) -> Result<(), Box<dyn Any>> {
        (self.set)(target, value)
    }
}

impl fmt::Debug for Mutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Mutator").field(&self.value_name).finish()
    }
}

// -----------------------------------------------------------------------------
// Member

/// The kind of a [`Member`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Getter,
    Setter,
}

/// Declared visibility of a [`Member`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// One entry of a bean's member table: a field, a getter or a setter.
///
/// A field usually carries both an [`Accessor`] and a [`Mutator`],
/// a getter only the former and a setter only the latter.
///
/// # Examples
///
/// ```
/// use vc_bind::members::{Member, MemberKind, Visibility};
/// use vc_bind::registry::Bindable;
/// use vc_bind::types::TypeArg;
///
/// struct Point { x: i32, label: String }
///
/// impl Point {
///     fn label(&self) -> String { self.label.clone() }
/// }
///
/// let x = Member::field::<Point, i32>("x", |p| &p.x, |p| &mut p.x)
///     .with_visibility(Visibility::Private);
/// let label = Member::getter::<Point, String>("label", Point::label);
///
/// assert_eq!(x.kind(), MemberKind::Field);
/// assert_eq!(x.declared(), &TypeArg::Type(i32::type_descriptor()));
/// assert!(label.accessor().is_some() && label.mutator().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Member {
    name: &'static str,
    kind: MemberKind,
    declared: TypeArg,
    visibility: Visibility,
    attributes: Attributes,
    accessor: Option<Accessor>,
    mutator: Option<Mutator>,
}

impl Member {
    /// Creates a member from its parts.
    ///
    /// `declared` is the declared type, written in terms of the declaring
    /// type's parameters for generic types.
    pub fn new(
        name: &'static str,
        kind: MemberKind,
        declared: impl Into<TypeArg>,
        accessor: Option<Accessor>,
        mutator: Option<Mutator>,
    ) -> Self {
        Self {
            name,
            kind,
            declared: declared.into(),
            visibility: Visibility::Public,
            attributes: Attributes::new(),
            accessor,
            mutator,
        }
    }

    /// A readable and writable field of a non-generic type.
    pub fn field<S: Any, V: crate::registry::Bindable>(
        name: &'static str,
        get: fn(&S) -> &V,
        get_mut: fn(&mut S) -> &mut V,
    ) -> Self {
        Self::new(
            name,
            MemberKind::Field,
            V::type_descriptor(),
            Some(Accessor::field(get)),
            Some(Mutator::field(get_mut)),
        )
    }

    /// A getter of a non-generic type.
    pub fn getter<S: Any, V: crate::registry::Bindable>(
        name: &'static str,
        get: fn(&S) -> V,
    ) -> Self {
        Self::new(
            name,
            MemberKind::Getter,
            V::type_descriptor(),
            Some(Accessor::getter(get)),
            None,
        )
    }

    /// A setter of a non-generic type.
    pub fn setter<S: Any, V: crate::registry::Bindable>(
        name: &'static str,
        set: fn(&mut S, V),
    ) -> Self {
        Self::new(
            name,
            MemberKind::Setter,
            V::type_descriptor(),
            None,
            Some(Mutator::setter(set)),
        )
    }

    #[inline]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Adds an attribute, see [`Attributes::with_attribute`].
    #[inline]
    pub fn with_attribute<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.attributes.insert(value);
        self
    }

    /// Replaces the attributes.
    #[inline]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Returns the declared name: the field name or the method name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    #[inline]
    pub fn declared(&self) -> &TypeArg {
        &self.declared
    }

    #[inline]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[inline]
    pub fn accessor(&self) -> Option<&Accessor> {
        self.accessor.as_ref()
    }

    #[inline]
    pub fn mutator(&self) -> Option<&Mutator> {
        self.mutator.as_ref()
    }

    /// Returns the member as declared by a type embedding its declaring type.
    pub(crate) fn through(&self, upcast: &Upcast) -> Self {
        Self {
            accessor: self.accessor.as_ref().map(|a| a.through(upcast)),
            mutator: self.mutator.as_ref().map(|m| m.through(upcast)),
            ..self.clone()
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
