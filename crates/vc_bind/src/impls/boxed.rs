use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::{Any, TypeId};

use crate::impls::GenericDescriptorCell;
use crate::registry::{Bindable, BoxedOps, TypeMeta, TypeShape};
use crate::types::{GenericDecl, RawType, Shape, TypeArg, TypeDescriptor, TypeParam};

macro_rules! impl_bindable_boxed {
    ($wrapper:ident, $raw:ident, $path:literal, $name:literal) => {
        const $raw: RawType = RawType::new($path, $name);

        impl<T: Bindable> Bindable for $wrapper<T> {
            fn type_descriptor() -> TypeDescriptor {
                static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
                CELL.get_or_insert::<Self>(|| {
                    TypeDescriptor::concrete::<Self>(
                        $raw,
                        [TypeArg::Type(T::type_descriptor())],
                        Shape::Boxed,
                    )
                })
            }

            fn type_meta() -> TypeMeta {
                fn get<T: Any>(value: &dyn Any) -> Option<&dyn Any> {
                    value
                        .downcast_ref::<$wrapper<T>>()
                        .map(|boxed| &**boxed as &dyn Any)
                }

                fn wrap<T: Any>(value: Box<dyn Any>) -> Option<Box<dyn Any>> {
                    let inner = value.downcast::<T>().ok()?;
                    Some(Box::new($wrapper::<T>::from(inner)))
                }

                let ops = BoxedOps::new(TypeId::of::<T>(), get::<T>, wrap::<T>);
                TypeMeta::of::<Self>(TypeShape::Boxed(ops))
                    .with_declaration(GenericDecl::new($raw).with_param(TypeParam::new("T")))
                    .with_dependency::<T>()
            }
        }
    };
}

impl_bindable_boxed!(Box, BOX, "alloc::boxed::Box", "Box");
impl_bindable_boxed!(Arc, ARC, "alloc::sync::Arc", "Arc");

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::sync::Arc;

    use crate::registry::{Bindable, TypeShape};
    use crate::types::Shape;

    #[test]
    fn boxes_are_transparent() {
        let ty = <Arc<Box<u32>> as Bindable>::type_descriptor();
        assert_eq!(ty.shape(), Shape::Boxed);
        assert_eq!(ty.unboxed(), &u32::type_descriptor());

        let meta = <Arc<u32> as Bindable>::type_meta();
        let TypeShape::Boxed(ops) = meta.shape() else {
            panic!("not boxed");
        };
        let value = Arc::new(7u32);
        assert_eq!(ops.get(&value).unwrap().downcast_ref::<u32>(), Some(&7));

        let wrapped = ops.wrap(Box::new(8u32)).unwrap();
        assert_eq!(*wrapped.downcast::<Arc<u32>>().unwrap(), Arc::new(8));
        assert!(ops.wrap(Box::new(8u8)).is_none());
    }
}
