use alloc::boxed::Box;
use core::any::{Any, TypeId};

use crate::impls::GenericDescriptorCell;
use crate::registry::{Bindable, OptionalOps, TypeMeta, TypeShape};
use crate::types::{GenericDecl, RawType, Shape, TypeArg, TypeDescriptor, TypeParam};

const OPTION: RawType = RawType::new("core::option::Option", "Option");

fn option_get<T: Any>(value: &dyn Any) -> Option<Option<&dyn Any>> {
    value
        .downcast_ref::<Option<T>>()
        .map(|option| option.as_ref().map(|inner| inner as &dyn Any))
}

fn option_some<T: Any>(value: Box<dyn Any>) -> Option<Box<dyn Any>> {
    let inner = value.downcast::<T>().ok()?;
    Some(Box::new(Some(*inner)))
}

fn option_none<T: Any>() -> Box<dyn Any> {
    Box::new(None::<T>)
}

impl<T: Bindable> Bindable for Option<T> {
    fn type_descriptor() -> TypeDescriptor {
        static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
        CELL.get_or_insert::<Self>(|| {
            TypeDescriptor::concrete::<Self>(
                OPTION,
                [TypeArg::Type(T::type_descriptor())],
                Shape::Plain,
            )
        })
    }

    fn type_meta() -> TypeMeta {
        let ops = OptionalOps::new(
            TypeId::of::<T>(),
            option_get::<T>,
            option_some::<T>,
            option_none::<T>,
        );
        TypeMeta::of::<Self>(TypeShape::Optional(ops))
            .with_declaration(GenericDecl::new(OPTION).with_param(TypeParam::new("T")))
            .with_default::<Self>()
            .with_dependency::<T>()
    }
}

// -----------------------------------------------------------------------------
// Tests
