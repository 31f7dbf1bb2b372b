use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::any::{Any, TypeId};

use crate::impls::GenericDescriptorCell;
use crate::registry::{Bindable, SequenceOps, TypeMeta, TypeShape};
use crate::types::{GenericDecl, RawType, Shape, TypeArg, TypeDescriptor, TypeParam};

macro_rules! impl_bindable_sequence {
    ($seq:ident, $raw:ident, $path:literal, $name:literal) => {
        const $raw: RawType = RawType::new($path, $name);

        impl<T: Bindable> Bindable for $seq<T> {
            fn type_descriptor() -> TypeDescriptor {
                static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
                CELL.get_or_insert::<Self>(|| {
                    TypeDescriptor::concrete::<Self>(
                        $raw,
                        [TypeArg::Type(T::type_descriptor())],
                        Shape::Sequence,
                    )
                })
            }

            fn type_meta() -> TypeMeta {
                fn items<T: Any>(value: &dyn Any) -> Option<Vec<&dyn Any>> {
                    value
                        .downcast_ref::<$seq<T>>()
                        .map(|seq| seq.iter().map(|item| item as &dyn Any).collect())
                }

                fn collect<T: Any>(items: Vec<Box<dyn Any>>) -> Option<Box<dyn Any>> {
                    let seq = items
                        .into_iter()
                        .map(|item| item.downcast::<T>().ok().map(|item| *item))
                        .collect::<Option<$seq<T>>>()?;
                    Some(Box::new(seq))
                }

                let ops = SequenceOps::new(TypeId::of::<T>(), None, items::<T>, collect::<T>);
                TypeMeta::of::<Self>(TypeShape::Sequence(ops))
                    .with_declaration(GenericDecl::new($raw).with_param(TypeParam::new("T")))
                    .with_default::<Self>()
                    .with_dependency::<T>()
            }
        }
    };
}

impl_bindable_sequence!(Vec, VEC, "alloc::vec::Vec", "Vec");
impl_bindable_sequence!(VecDeque, VEC_DEQUE, "alloc::collections::VecDeque", "VecDeque");

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::collections::VecDeque;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::any::Any;

    use crate::registry::{Bindable, TypeShape};

    #[test]
    fn sequence_ops() {
        let meta = <VecDeque<i16> as Bindable>::type_meta();
        let TypeShape::Sequence(ops) = meta.shape() else {
            panic!("not a sequence");
        };
        assert_eq!(ops.fixed_len(), None);

        let value: VecDeque<i16> = [1, 2, 3].into();
        let items = ops.items(&value).unwrap();
        assert_eq!(items[2].downcast_ref::<i16>(), Some(&3));
        assert!(ops.items(&vec![1i16]).is_none());

        let built = ops
            .collect(vec![Box::new(4i16) as Box<dyn Any>, Box::new(5i16)])
            .unwrap();
        assert_eq!(*built.downcast::<VecDeque<i16>>().unwrap(), [4, 5]);
        assert!(ops.collect(vec![Box::new(4u8) as Box<dyn Any>]).is_none());

        assert_eq!(
            <Vec<Vec<u8>>>::type_descriptor().to_string(),
            "alloc::vec::Vec<alloc::vec::Vec<u8>>"
        );
        let empty = <Vec<u8>>::type_meta().create_default().unwrap();
        assert!(empty.downcast_ref::<Vec<u8>>().unwrap().is_empty());
    }
}
