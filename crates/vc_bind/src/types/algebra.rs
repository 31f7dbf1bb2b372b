use alloc::string::ToString;
use alloc::vec::Vec;

use super::{DeclarationLookup, GenericDecl, RawType, Shape, TypeArg, TypeDescriptor};
use crate::error::TypeResolutionError;

/// Supertype chains deeper than this are treated as cyclic.
const MAX_SUPERTYPE_DEPTH: usize = 64;

// -----------------------------------------------------------------------------
// MatchMode

/// How [`matches`] compares a candidate with a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatchMode {
    /// The candidate matches if it is assignable to the target:
    /// supertypes are walked and bound arguments are compared covariantly.
    ///
    /// Used for converter lookup and view selection.
    #[default]
    Covariant,
    /// Raw identities must be equal and bound arguments pairwise equal.
    ///
    /// Used for adapter and codec type contracts.
    Strict,
}

// -----------------------------------------------------------------------------
// TypeBindings

/// The result of [`bind_type_parameters`]: declared variable names mapped to
/// the arguments found at a usage site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeBindings {
    entries: Vec<(&'static str, TypeArg)>,
}

impl TypeBindings {
    /// Returns the argument bound to `name`.
    pub fn get(&self, name: &str) -> Option<&TypeArg> {
        self.entries
            .iter()
            .find_map(|(key, arg)| (*key == name).then_some(arg))
    }

    /// Returns the number of bindings.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is bound.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates bindings in parameter order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &TypeArg)> {
        self.entries.iter().map(|(name, arg)| (*name, arg))
    }
}

// -----------------------------------------------------------------------------
// Operations

/// Returns the raw identity of `ty`, looking through boxes.
///
/// # Examples
///
/// ```
/// use vc_bind::registry::Bindable;
/// use vc_bind::types::raw_class_of;
///
/// let ty = <Box<Vec<u8>> as Bindable>::type_descriptor();
/// assert_eq!(raw_class_of(&ty).path(), "alloc::vec::Vec");
/// ```
#[inline]
pub fn raw_class_of(ty: &TypeDescriptor) -> RawType {
    ty.unboxed().raw()
}

/// Maps the parameters of `decl` to the arguments of `usage`.
///
/// Fails when `usage` is not an instantiation of `decl`, when it is a raw
/// usage of a generic declaration, or when the argument count differs.
pub fn bind_type_parameters(
    decl: &GenericDecl,
    usage: &TypeDescriptor,
) -> Result<TypeBindings, TypeResolutionError> {
    let usage = usage.unboxed();
    if usage.raw() != decl.raw() {
        return Err(TypeResolutionError::NotAUsage {
            declaration: decl.raw().path().to_string(),
            usage: usage.to_string(),
        });
    }

    let params = decl.params();
    let args = usage.args();
    if args.is_empty() {
        if let Some(first) = params.first() {
            return Err(TypeResolutionError::Unbound {
                variable: first.name().to_string(),
                context: usage.to_string(),
            });
        }
    } else if args.len() != params.len() {
        return Err(TypeResolutionError::Arity {
            declaration: decl.raw().path().to_string(),
            usage: usage.to_string(),
            expected: params.len(),
            found: args.len(),
        });
    }

    Ok(TypeBindings {
        entries: params
            .iter()
            .zip(args)
            .map(|(param, arg)| (param.name(), arg.clone()))
            .collect(),
    })
}

/// Resolves `declared`, written in terms of the parameters of
/// `context`'s declaration, against the arguments of `context`.
///
/// # Errors
///
/// Returns [`TypeResolutionError::Unbound`] if a variable stays free, e.g.
/// because `context` is a raw usage. See [`resolve_or_raw`] for the fallback.
///
/// # Examples
///
/// ```
/// use vc_bind::registry::Bindable;
/// use vc_bind::types::{resolve, GenericDecl, RawType, TypeArg, TypeDescriptor, TypeParam};
///
/// let page = RawType::new("app::Page", "Page");
/// let decls = vec![GenericDecl::new(page).with_param(TypeParam::new("T"))];
///
/// // `items: Vec<T>` inside `Page<String>`.
/// let declared = TypeArg::Type(<Vec<u8> as Bindable>::type_descriptor().with_args([TypeArg::var("T")]));
/// let context = TypeDescriptor::new(page).with_args([TypeArg::Type(String::type_descriptor())]);
///
/// let resolved = resolve(&decls, &declared, &context).unwrap();
/// assert_eq!(resolved, <Vec<String> as Bindable>::type_descriptor());
///
/// // A raw usage cannot bind `T`.
/// assert!(resolve(&decls, &declared, &TypeDescriptor::new(page)).is_err());
/// ```
pub fn resolve<L: DeclarationLookup + ?Sized>(
    lookup: &L,
    declared: &TypeArg,
    context: &TypeDescriptor,
) -> Result<TypeDescriptor, TypeResolutionError> {
    if let TypeArg::Type(ty) = declared
        && !ty.has_free_variables()
    {
        return Ok(ty.clone());
    }

    let bindings = match lookup.declaration(&context.unboxed().raw()) {
        Some(decl) => bind_type_parameters(decl, context)?,
        None => TypeBindings::default(),
    };

    let unbound = |name: &str| TypeResolutionError::Unbound {
        variable: name.to_string(),
        context: context.to_string(),
    };

    match substitute(declared, &mut |var| match bindings.get(var.name()) {
        Some(arg @ TypeArg::Type(_)) => Ok(arg.clone()),
        _ => Err(unbound(var.name())),
    })? {
        TypeArg::Type(ty) => Ok(ty),
        TypeArg::Var(var) => Err(unbound(var.name())),
    }
}

/// Like [`resolve`], but falls back to the raw identity instead of failing:
/// unbound variables become their declared bound, or `any`.
pub fn resolve_or_raw<L: DeclarationLookup + ?Sized>(
    lookup: &L,
    declared: &TypeArg,
    context: &TypeDescriptor,
) -> TypeDescriptor {
    match resolve(lookup, declared, context) {
        Ok(ty) => ty,
        Err(err) => {
            log::debug!("{err}, falling back to the raw type");
            let decl = lookup.declaration(&context.unboxed().raw());
            let bindings = decl.and_then(|decl| bind_type_parameters(decl, context).ok());
            erase(declared, bindings.as_ref(), decl)
        }
    }
}

/// Finds how `candidate` instantiates the raw type `target`, walking the
/// declared supertype chain and substituting arguments at each step.
///
/// Returns `None` when `target` is not reachable.
///
/// # Examples
///
/// ```
/// use vc_bind::registry::Bindable;
/// use vc_bind::types::{
///     lookup_generic_type, GenericDecl, RawType, Supertype, TypeArg, TypeDescriptor, TypeParam, Upcast,
/// };
///
/// struct Paged;
/// struct Page { base: Paged }
///
/// let paged = RawType::new("app::Paged", "Paged");
/// let page = RawType::new("app::Page", "Page");
///
/// // `Page<T>` embeds `Paged<T>`.
/// let decls = vec![
///     GenericDecl::new(paged).with_param(TypeParam::new("T")),
///     GenericDecl::new(page).with_param(TypeParam::new("T")).with_supertype(Supertype::new(
///         TypeDescriptor::new(paged).with_args([TypeArg::var("T")]),
///         Upcast::new::<Page, Paged>(|p| &p.base, |p| &mut p.base),
///     )),
/// ];
///
/// let usage = TypeDescriptor::new(page).with_args([TypeArg::Type(u8::type_descriptor())]);
/// let found = lookup_generic_type(&decls, &usage, paged).unwrap();
/// assert_eq!(found, TypeDescriptor::new(paged).with_args([TypeArg::Type(u8::type_descriptor())]));
/// ```
pub fn lookup_generic_type<L: DeclarationLookup + ?Sized>(
    lookup: &L,
    candidate: &TypeDescriptor,
    target: RawType,
) -> Option<TypeDescriptor> {
    lookup_in(lookup, candidate.unboxed(), target, 0)
}

fn lookup_in<L: DeclarationLookup + ?Sized>(
    lookup: &L,
    candidate: &TypeDescriptor,
    target: RawType,
    depth: usize,
) -> Option<TypeDescriptor> {
    if candidate.raw() == target {
        return Some(candidate.clone());
    }
    if depth >= MAX_SUPERTYPE_DEPTH {
        log::warn!("supertype chain of `{candidate}` is too deep, assuming a cycle");
        return None;
    }

    let decl = lookup.declaration(&candidate.raw())?;
    let bindings = bind_type_parameters(decl, candidate).ok();
    decl.supertypes().iter().find_map(|sup| {
        let expanded = expand(sup.template(), bindings.as_ref(), decl);
        lookup_in(lookup, expanded.unboxed(), target, depth + 1)
    })
}

/// Substitutes the parameters of `decl` in a supertype template.
///
/// Unbound parameters are erased to their bound.
pub(crate) fn expand(
    template: &TypeDescriptor,
    bindings: Option<&TypeBindings>,
    decl: &GenericDecl,
) -> TypeDescriptor {
    match erase_arg(&TypeArg::Type(template.clone()), bindings, Some(decl)) {
        TypeArg::Type(ty) => ty,
        TypeArg::Var(var) => var.erasure(),
    }
}

fn erase(
    declared: &TypeArg,
    bindings: Option<&TypeBindings>,
    decl: Option<&GenericDecl>,
) -> TypeDescriptor {
    match erase_arg(declared, bindings, decl) {
        TypeArg::Type(ty) => ty,
        TypeArg::Var(var) => var.erasure(),
    }
}

fn erase_arg(
    declared: &TypeArg,
    bindings: Option<&TypeBindings>,
    decl: Option<&GenericDecl>,
) -> TypeArg {
    let result = substitute::<core::convert::Infallible>(declared, &mut |var| {
        if let Some(arg @ TypeArg::Type(_)) = bindings.and_then(|b| b.get(var.name())) {
            return Ok(arg.clone());
        }
        let bound = decl
            .and_then(|decl| decl.position(var.name()).map(|i| &decl.params()[i]))
            .and_then(|param| param.bound().cloned());
        Ok(TypeArg::Type(bound.unwrap_or_else(|| var.erasure())))
    });
    match result {
        Ok(arg) => arg,
        Err(never) => match never {},
    }
}

/// Rebuilds `arg`, replacing every variable through `on_var`.
fn substitute<E>(
    arg: &TypeArg,
    on_var: &mut dyn FnMut(&super::TypeVar) -> Result<TypeArg, E>,
) -> Result<TypeArg, E> {
    match arg {
        TypeArg::Var(var) => on_var(var),
        TypeArg::Type(ty) if !ty.has_free_variables() => Ok(arg.clone()),
        TypeArg::Type(ty) => {
            let args = ty
                .args()
                .iter()
                .map(|inner| substitute(inner, on_var))
                .collect::<Result<Vec<_>, E>>()?;
            Ok(TypeArg::Type(ty.with_args(args)))
        }
    }
}

/// Tests whether `candidate` is compatible with `target`.
///
/// - Boxed descriptors are compared by their content.
/// - Sequence-shaped descriptors compare their element types structurally.
/// - With [`MatchMode::Covariant`], the candidate's supertype chain is walked
///   to find its instantiation of the target's raw type, and `any` accepts everything.
/// - With [`MatchMode::Strict`], raw identities must be equal.
/// - A free variable in the target accepts any argument within its bound.
///
/// # Examples
///
/// ```
/// use vc_bind::registry::Bindable;
/// use vc_bind::types::{matches, GenericDecl, MatchMode, TypeDescriptor};
///
/// let decls: Vec<GenericDecl> = Vec::new();
/// let int = i32::type_descriptor();
/// let boxed = <Box<i32> as Bindable>::type_descriptor();
///
/// assert!(matches(&decls, &boxed, &int, MatchMode::Strict));
/// assert!(matches(&decls, &int, &TypeDescriptor::any(), MatchMode::Covariant));
/// assert!(!matches(&decls, &int, &TypeDescriptor::any(), MatchMode::Strict));
/// ```
pub fn matches<L: DeclarationLookup + ?Sized>(
    lookup: &L,
    candidate: &TypeDescriptor,
    target: &TypeDescriptor,
    mode: MatchMode,
) -> bool {
    let candidate = candidate.unboxed();
    let target = target.unboxed();

    if target.is_any() {
        return mode == MatchMode::Covariant || candidate.is_any();
    }
    if candidate.is_any() {
        return false;
    }

    if candidate.shape().is_sequence() && target.shape().is_sequence() {
        let same_family = candidate.raw() == target.raw() && candidate.shape() == target.shape();
        if mode == MatchMode::Strict && !same_family {
            return false;
        }
        return match (candidate.arg(0), target.arg(0)) {
            (Some(c), Some(t)) => arg_matches(lookup, c, t, mode),
            (_, None) => true,
            (None, Some(_)) => mode == MatchMode::Covariant,
        };
    }

    let resolved = match mode {
        MatchMode::Strict => (candidate.raw() == target.raw()).then(|| candidate.clone()),
        MatchMode::Covariant => lookup_generic_type(lookup, candidate, target.raw()),
    };
    let Some(resolved) = resolved else {
        return false;
    };

    let (c_args, t_args) = (resolved.args(), target.args());
    if t_args.is_empty() {
        return true;
    }
    if c_args.is_empty() {
        // Raw candidate against a parameterized target, unchecked.
        return mode == MatchMode::Covariant;
    }
    c_args.len() == t_args.len()
        && c_args
            .iter()
            .zip(t_args)
            .all(|(c, t)| arg_matches(lookup, c, t, mode))
}

fn arg_matches<L: DeclarationLookup + ?Sized>(
    lookup: &L,
    candidate: &TypeArg,
    target: &TypeArg,
    mode: MatchMode,
) -> bool {
    match (candidate, target) {
        (_, TypeArg::Var(t)) => match t.bound() {
            None => true,
            Some(bound) => match candidate {
                TypeArg::Type(c) => matches(lookup, c, bound, MatchMode::Covariant),
                TypeArg::Var(c) => matches(lookup, &c.erasure(), bound, MatchMode::Covariant),
            },
        },
        (TypeArg::Var(c), TypeArg::Type(t)) => {
            mode == MatchMode::Covariant && matches(lookup, &c.erasure(), t, MatchMode::Covariant)
        }
        (TypeArg::Type(c), TypeArg::Type(t)) => matches(lookup, c, t, mode),
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::types::{Supertype, TypeParam, TypeVar, Upcast};

    struct Animal;
    struct Dog {
        base: Animal,
    }
    struct Boxer {
        base: Dog,
    }

    const ANIMAL: RawType = RawType::new("zoo::Animal", "Animal");
    const DOG: RawType = RawType::new("zoo::Dog", "Dog");
    const BOXER: RawType = RawType::new("zoo::Boxer", "Boxer");
    const CAGE: RawType = RawType::new("zoo::Cage", "Cage");
    const PEN: RawType = RawType::new("zoo::Pen", "Pen");
    const VEC: RawType = RawType::new("alloc::vec::Vec", "Vec");

    struct Cage;
    struct Pen {
        base: Cage,
    }

    fn ty(raw: RawType) -> TypeDescriptor {
        TypeDescriptor::new(raw)
    }

    fn generic(raw: RawType, args: impl IntoIterator<Item = TypeArg>) -> TypeDescriptor {
        TypeDescriptor::new(raw).with_args(args)
    }

    fn seq(elem: TypeDescriptor) -> TypeDescriptor {
        TypeDescriptor::concrete::<()>(VEC, [TypeArg::Type(elem)], Shape::Sequence)
    }

    /// Animal <- Dog <- Boxer; Cage<T> <- Pen<U> (as Cage<U>).
    fn zoo() -> Vec<GenericDecl> {
        vec![
            GenericDecl::new(ANIMAL),
            GenericDecl::new(DOG).with_supertype(Supertype::new(
                ty(ANIMAL),
                Upcast::new::<Dog, Animal>(|d| &d.base, |d| &mut d.base),
            )),
            GenericDecl::new(BOXER).with_supertype(Supertype::new(
                ty(DOG),
                Upcast::new::<Boxer, Dog>(|b| &b.base, |b| &mut b.base),
            )),
            GenericDecl::new(CAGE).with_param(TypeParam::new("T")),
            GenericDecl::new(PEN)
                .with_param(TypeParam::new("U").with_bound(ty(ANIMAL)))
                .with_supertype(Supertype::new(
                    generic(CAGE, [TypeArg::var("U")]),
                    Upcast::new::<Pen, Cage>(|p| &p.base, |p| &mut p.base),
                )),
        ]
    }

    #[test]
    fn covariant_walks_supertypes() {
        let decls = zoo();
        assert!(matches(&decls, &ty(BOXER), &ty(ANIMAL), MatchMode::Covariant));
        assert!(matches(&decls, &ty(DOG), &ty(DOG), MatchMode::Covariant));
        assert!(!matches(&decls, &ty(ANIMAL), &ty(DOG), MatchMode::Covariant));
    }

    #[test]
    fn strict_requires_identity() {
        let decls = zoo();
        assert!(!matches(&decls, &ty(BOXER), &ty(ANIMAL), MatchMode::Strict));
        assert!(matches(&decls, &ty(DOG), &ty(DOG), MatchMode::Strict));

        let cage_dog = generic(CAGE, [TypeArg::Type(ty(DOG))]);
        let cage_animal = generic(CAGE, [TypeArg::Type(ty(ANIMAL))]);
        assert!(matches(&decls, &cage_dog, &cage_animal, MatchMode::Covariant));
        assert!(!matches(&decls, &cage_dog, &cage_animal, MatchMode::Strict));
    }

    #[test]
    fn generic_supertype_arguments_are_substituted() {
        let decls = zoo();
        let pen_dog = generic(PEN, [TypeArg::Type(ty(DOG))]);

        let found = lookup_generic_type(&decls, &pen_dog, CAGE).unwrap();
        assert_eq!(found, generic(CAGE, [TypeArg::Type(ty(DOG))]));

        assert!(matches(
            &decls,
            &pen_dog,
            &generic(CAGE, [TypeArg::Type(ty(ANIMAL))]),
            MatchMode::Covariant
        ));
        assert!(!matches(
            &decls,
            &pen_dog,
            &generic(CAGE, [TypeArg::Type(ty(BOXER))]),
            MatchMode::Covariant
        ));
    }

    #[test]
    fn raw_usage_erases_to_bound() {
        let decls = zoo();
        // `Pen` without arguments: `U` erases to its bound `Animal`.
        let found = lookup_generic_type(&decls, &ty(PEN), CAGE).unwrap();
        assert_eq!(found, generic(CAGE, [TypeArg::Type(ty(ANIMAL))]));
    }

    #[test]
    fn free_target_variables_accept_within_bound() {
        let decls = zoo();
        let cage_dog = generic(CAGE, [TypeArg::Type(ty(DOG))]);
        let any_cage = generic(CAGE, [TypeArg::var("T")]);
        let animal_cage = generic(CAGE, [TypeArg::Var(TypeVar::bounded("T", ty(ANIMAL)))]);
        let dog_cage = generic(CAGE, [TypeArg::Var(TypeVar::bounded("T", ty(BOXER)))]);

        for mode in [MatchMode::Covariant, MatchMode::Strict] {
            assert!(matches(&decls, &cage_dog, &any_cage, mode));
            assert!(matches(&decls, &cage_dog, &animal_cage, mode));
            assert!(!matches(&decls, &cage_dog, &dog_cage, mode));
        }

        // A free candidate argument only passes covariantly.
        let cage_dog_target = generic(CAGE, [TypeArg::Type(ty(DOG))]);
        assert!(!matches(&decls, &any_cage, &cage_dog_target, MatchMode::Strict));
    }

    #[test]
    fn sequences_recurse_on_elements() {
        let decls = zoo();
        let dogs = seq(ty(DOG));
        let animals = seq(ty(ANIMAL));
        assert!(matches(&decls, &dogs, &animals, MatchMode::Covariant));
        assert!(!matches(&decls, &dogs, &animals, MatchMode::Strict));
        assert!(!matches(&decls, &animals, &dogs, MatchMode::Covariant));

        let array = TypeDescriptor::concrete::<()>(
            RawType::new("array", "array"),
            [TypeArg::Type(ty(DOG))],
            Shape::Array(2),
        );
        assert!(matches(&decls, &array, &animals, MatchMode::Covariant));
        assert!(!matches(&decls, &array, &dogs, MatchMode::Strict));
    }

    #[test]
    fn bind_and_resolve() {
        let decls = zoo();
        let cage = decls.declaration(&CAGE).unwrap();

        let bindings = bind_type_parameters(cage, &generic(CAGE, [TypeArg::Type(ty(DOG))])).unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings.get("T"), Some(&TypeArg::Type(ty(DOG))));

        assert!(matches!(
            bind_type_parameters(cage, &ty(CAGE)),
            Err(TypeResolutionError::Unbound { .. })
        ));
        assert!(matches!(
            bind_type_parameters(cage, &ty(DOG)),
            Err(TypeResolutionError::NotAUsage { .. })
        ));
        assert!(matches!(
            bind_type_parameters(cage, &generic(CAGE, [TypeArg::Type(ty(DOG)), TypeArg::Type(ty(DOG))])),
            Err(TypeResolutionError::Arity { expected: 1, found: 2, .. })
        ));

        let declared = TypeArg::Type(seq(ty(DOG)).with_args([TypeArg::var("T")]));
        let resolved = resolve(&decls, &declared, &generic(CAGE, [TypeArg::Type(ty(BOXER))])).unwrap();
        assert_eq!(resolved, seq(ty(BOXER)));

        // Raw context: strict resolution fails, the fallback erases to `any`.
        assert!(resolve(&decls, &declared, &ty(CAGE)).is_err());
        assert_eq!(
            resolve_or_raw(&decls, &declared, &ty(CAGE)),
            seq(TypeDescriptor::any())
        );
        assert_eq!(raw_class_of(&resolved), VEC);
    }
}
