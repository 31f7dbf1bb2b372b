use alloc::string::{String, ToString};
use core::any::TypeId;

use crate::collections::{HashMap, TypeIdMap};
use crate::registry::{Bindable, TypeMeta};
use crate::types::{DeclarationLookup, GenericDecl, RawType, TypeDescriptor};

// -----------------------------------------------------------------------------
// TypeRegistry

/// A registry of [bindable] types.
///
/// [Registering] a type stores its [`TypeMeta`] and, transitively, the metas
/// of every type it depends on: member types, creator parameters, adapted
/// representations.
///
/// Types are found by [`TypeId`], by structural [`TypeDescriptor`], by raw
/// identity (for generic declarations) and by name: the descriptor's display
/// string or an alias.
///
/// # Example
///
/// ```
/// use core::any::TypeId;
/// use vc_bind::registry::{Bindable, TypeRegistry};
///
/// let mut registry = TypeRegistry::empty();
/// registry.register::<Vec<Option<u8>>>();
///
/// // Its type dependencies.
/// assert!(registry.contains(TypeId::of::<Option<u8>>()));
/// assert!(registry.contains(TypeId::of::<u8>()));
///
/// let ty = <Vec<Option<u8>> as Bindable>::type_descriptor().with_args([
///     <Option<u8> as Bindable>::type_descriptor().into(),
/// ]);
/// assert_eq!(registry.id_of(&ty), Some(TypeId::of::<Vec<Option<u8>>>()));
/// assert!(registry.get_with_name("u8").is_some());
/// ```
///
/// [bindable]: Bindable
/// [Registering]: TypeRegistry::register
#[derive(Debug)]
pub struct TypeRegistry {
    metas: TypeIdMap<TypeMeta>,
    by_descriptor: HashMap<TypeDescriptor, TypeId>,
    by_raw: HashMap<RawType, TypeId>,
    by_name: HashMap<String, TypeId>,
    aliases: TypeIdMap<&'static str>,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates an empty [`TypeRegistry`].
    #[inline]
    pub fn empty() -> Self {
        Self {
            metas: TypeIdMap::default(),
            by_descriptor: HashMap::default(),
            by_raw: HashMap::default(),
            by_name: HashMap::default(),
            aliases: TypeIdMap::default(),
        }
    }

    /// Creates a registry with the scalar types registered.
    ///
    /// - `bool` `char` `String`
    /// - `i8 - i64` `isize`
    /// - `u8 - u64` `usize`
    /// - `f32` `f64`
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register::<bool>();
        registry.register::<char>();
        registry.register::<u8>();
        registry.register::<u16>();
        registry.register::<u32>();
        registry.register::<u64>();
        registry.register::<usize>();
        registry.register::<i8>();
        registry.register::<i16>();
        registry.register::<i32>();
        registry.register::<i64>();
        registry.register::<isize>();
        registry.register::<f32>();
        registry.register::<f64>();
        registry.register::<String>();
        registry
    }

    /// Registers `T` and its dependencies, if not yet registered.
    ///
    /// The meta is stored before the dependencies are visited, so recursive
    /// types terminate.
    pub fn register<T: Bindable>(&mut self) {
        if !self.metas.contains_key(&TypeId::of::<T>()) {
            self.insert(T::type_meta());
        }
    }

    /// Inserts a meta and registers its dependencies.
    ///
    /// Returns `false` and does nothing if the type is already registered.
    pub fn insert(&mut self, meta: TypeMeta) -> bool {
        let type_id = meta.type_id();
        if self.metas.contains_key(&type_id) {
            return false;
        }

        let descriptor = meta.descriptor().clone();
        self.by_name.entry(descriptor.to_string()).or_insert(type_id);
        self.by_raw.entry(descriptor.raw()).or_insert(type_id);
        self.by_descriptor.entry(descriptor).or_insert(type_id);

        let dependencies = meta.all_dependencies();
        self.metas.insert(type_id, meta);

        for register in dependencies {
            register(self);
        }
        true
    }

    /// Registers every type annotated with `#[bind(auto_register)]`.
    ///
    /// Returns `true` if automatic registration is supported on the current
    /// platform. Requires the `auto_register` feature, returns `false` otherwise.
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            use crate::__macro_exports::auto_register;
            if self.contains(TypeId::of::<auto_register::__AvailFlag>()) {
                return true;
            }
            auto_register::__register_types(self);
            self.contains(TypeId::of::<auto_register::__AvailFlag>())
        }
        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }

    /// Sets the name written for `type_id` in class metadata.
    ///
    /// The alias is also accepted by [`get_with_name`](Self::get_with_name).
    pub fn alias(&mut self, type_id: TypeId, alias: &'static str) {
        self.aliases.insert(type_id, alias);
        self.by_name.insert(alias.to_string(), type_id);
    }

    /// Returns the alias of `type_id`, if set.
    #[inline]
    pub fn alias_of(&self, type_id: TypeId) -> Option<&'static str> {
        self.aliases.get(&type_id).copied()
    }

    /// Whether the type with given [`TypeId`] has been registered.
    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.metas.contains_key(&type_id)
    }

    /// Returns the [`TypeMeta`] of the given [`TypeId`].
    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&TypeMeta> {
        self.metas.get(&type_id)
    }

    /// Returns the [`TypeId`] of a registered descriptor.
    ///
    /// Uses the descriptor's own [`TypeId`] when it has one, and structural
    /// equality otherwise.
    pub fn id_of(&self, ty: &TypeDescriptor) -> Option<TypeId> {
        match ty.type_id() {
            Some(id) if self.contains(id) => Some(id),
            _ => self.by_descriptor.get(ty).copied(),
        }
    }

    /// Returns the [`TypeMeta`] of a registered descriptor.
    #[inline]
    pub fn get_by_descriptor(&self, ty: &TypeDescriptor) -> Option<&TypeMeta> {
        self.id_of(ty).and_then(|id| self.get(id))
    }

    /// Returns the [`TypeMeta`] of a type by display name or alias.
    pub fn get_with_name(&self, name: &str) -> Option<&TypeMeta> {
        self.by_name.get(name).and_then(|id| self.get(*id))
    }

    /// Returns the number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.metas.len()
    }

    /// Iterates the registered metas, in unspecified order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &TypeMeta> {
        self.metas.values()
    }
}

impl DeclarationLookup for TypeRegistry {
    fn declaration(&self, raw: &RawType) -> Option<&GenericDecl> {
        self.by_raw
            .get(raw)
            .and_then(|id| self.get(*id))
            .map(TypeMeta::declaration)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::any::TypeId;

    use super::TypeRegistry;
    use crate::registry::{Bindable, TypeMeta, TypeShape};
    use crate::types::{DeclarationLookup, RawType, TypeDescriptor};

    struct Tree {
        _children: Vec<Tree>,
    }

    impl Bindable for Tree {
        fn type_descriptor() -> TypeDescriptor {
            TypeDescriptor::concrete::<Tree>(
                RawType::new("tests::Tree", "Tree"),
                [],
                Default::default(),
            )
        }

        fn type_meta() -> TypeMeta {
            TypeMeta::of::<Tree>(TypeShape::Opaque).with_dependency::<Vec<Tree>>()
        }
    }

    #[test]
    fn recursive_dependencies_terminate() {
        let mut registry = TypeRegistry::empty();
        registry.register::<Tree>();
        assert!(registry.contains(TypeId::of::<Tree>()));
        assert!(registry.contains(TypeId::of::<Vec<Tree>>()));
        assert_eq!(registry.len(), 2);
        assert!(!registry.insert(Tree::type_meta()));
    }

    #[test]
    fn lookups() {
        let mut registry = TypeRegistry::new();
        registry.register::<Option<String>>();
        registry.alias(TypeId::of::<String>(), "text");

        let raw = RawType::new("core::option::Option", "Option");
        assert_eq!(registry.declaration(&raw).unwrap().params().len(), 1);
        assert_eq!(
            registry.get_with_name("text").unwrap().type_id(),
            TypeId::of::<String>()
        );
        assert_eq!(registry.alias_of(TypeId::of::<String>()), Some("text"));
        assert_eq!(
            registry.get_with_name("core::option::Option<alloc::string::String>").unwrap().type_id(),
            TypeId::of::<Option<String>>()
        );
        assert!(registry.iter().any(|m| m.type_id() == TypeId::of::<f32>()));
    }
}
