//! Items used by `vc_bind_derive` expansions. Not public API.

pub use alloc::boxed::Box;
pub use alloc::vec::Vec;

// -----------------------------------------------------------------------------
// auto_register

#[cfg(feature = "auto_register")]
pub mod auto_register {
    use crate::registry::{Bindable, TypeMeta, TypeRegistry, TypeShape};
    use crate::types::{RawType, Shape, TypeDescriptor};

    pub use inventory;

    /// A registration function submitted by `#[bind(auto_register)]`.
    pub struct __AutoRegisterFunc(pub fn(&mut TypeRegistry));

    inventory::collect!(__AutoRegisterFunc);

    pub trait __RegisterType {
        fn __register(registry: &mut TypeRegistry);
    }

    impl<T: Bindable> __RegisterType for T {
        #[inline]
        fn __register(registry: &mut TypeRegistry) {
            registry.register::<T>();
        }
    }

    /// Registered through the same mechanism as user types, its presence
    /// tells whether the platform collected the submissions.
    pub struct __AvailFlag;

    impl Bindable for __AvailFlag {
        fn type_descriptor() -> TypeDescriptor {
            TypeDescriptor::concrete::<__AvailFlag>(
                RawType::new("vc_bind::__macro_exports::auto_register::__AvailFlag", "__AvailFlag"),
                [],
                Shape::Plain,
            )
        }

        fn type_meta() -> TypeMeta {
            TypeMeta::of::<__AvailFlag>(TypeShape::Opaque)
        }
    }

    inventory::submit! {
        __AutoRegisterFunc(<__AvailFlag as __RegisterType>::__register)
    }

    pub fn __register_types(registry: &mut TypeRegistry) {
        for func in inventory::iter::<__AutoRegisterFunc> {
            (func.0)(registry);
        }
    }
}
