use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use crate::members::Attributes;
use crate::registry::{Bindable, TypeRegistry, TypeShape};
use crate::types::{GenericDecl, TypeDescriptor};

// -----------------------------------------------------------------------------
// TypeMeta

fn default_box<T: Default + Any>() -> Box<dyn Any> {
    Box::new(T::default())
}

/// Runtime storage for the binding metadata of one concrete type,
/// registered into the [`TypeRegistry`].
///
/// It holds the type's descriptor, its generic declaration, its
/// [`TypeShape`] and type-level attributes.
///
/// # Examples
///
/// ```
/// use vc_bind::registry::{Bindable, TypeMeta, TypeShape};
///
/// let meta = TypeMeta::of::<String>(TypeShape::Opaque).with_default::<String>();
/// assert_eq!(meta.descriptor(), &String::type_descriptor());
/// assert_eq!(meta.name(), "String");
///
/// let value = meta.create_default().unwrap();
/// assert_eq!(value.downcast_ref::<String>().unwrap(), "");
/// ```
#[derive(Clone)]
pub struct TypeMeta {
    type_id: TypeId,
    descriptor: TypeDescriptor,
    declaration: GenericDecl,
    shape: TypeShape,
    attributes: Attributes,
    default: Option<fn() -> Box<dyn Any>>,
    dependencies: Vec<fn(&mut TypeRegistry)>,
}

impl TypeMeta {
    /// Creates the meta of `T`, with a non-generic declaration.
    pub fn of<T: Bindable>(shape: TypeShape) -> Self {
        let descriptor = T::type_descriptor();
        Self {
            type_id: TypeId::of::<T>(),
            declaration: GenericDecl::new(descriptor.raw()),
            descriptor,
            shape,
            attributes: Attributes::new(),
            default: None,
            dependencies: Vec::new(),
        }
    }

    /// Replaces the generic declaration.
    #[inline]
    pub fn with_declaration(mut self, declaration: GenericDecl) -> Self {
        self.declaration = declaration;
        self
    }

    /// Adds a type-level attribute.
    #[inline]
    pub fn with_attribute<A: Any + Send + Sync>(mut self, value: A) -> Self {
        self.attributes.insert(value);
        self
    }

    /// Replaces the type-level attributes.
    #[inline]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Enables default construction through [`Default`].
    #[inline]
    pub fn with_default<T: Default + Any>(mut self) -> Self {
        self.default = Some(default_box::<T>);
        self
    }

    /// Registers `D` whenever this type is registered.
    #[inline]
    pub fn with_dependency<D: Bindable>(mut self) -> Self {
        self.dependencies.push(TypeRegistry::register::<D>);
        self
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// Returns the simple name of the type, without path or arguments.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.descriptor.raw().name()
    }

    #[inline]
    pub fn declaration(&self) -> &GenericDecl {
        &self.declaration
    }

    #[inline]
    pub fn shape(&self) -> &TypeShape {
        &self.shape
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Returns `true` if the type can be default-constructed.
    #[inline]
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Creates the default value, if available.
    #[inline]
    pub fn create_default(&self) -> Option<Box<dyn Any>> {
        self.default.map(|f| f())
    }

    #[inline]
    pub(crate) fn default_fn(&self) -> Option<fn() -> Box<dyn Any>> {
        self.default
    }

    /// Returns every registration this type depends on: the declared ones,
    /// then those of creator parameters and property adapters.
    pub(crate) fn all_dependencies(&self) -> Vec<fn(&mut TypeRegistry)> {
        let mut deps = self.dependencies.clone();
        if let Some(decl) = self.shape.as_bean() {
            crate::registry::bean_dependencies(decl, &mut deps);
        }
        deps
    }
}

impl fmt::Debug for TypeMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMeta")
            .field("descriptor", &self.descriptor)
            .field("shape", &self.shape)
            .field("default", &self.default.is_some())
            .finish_non_exhaustive()
    }
}
