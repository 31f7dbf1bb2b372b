use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::{Any, TypeId};

use crate::impls::{GenericDescriptorCell, NonGenericDescriptorCell};
use crate::registry::{
    Bindable, Scalar, ScalarOps, ScalarType, ScalarValue, SequenceOps, TypeMeta, TypeShape,
};
use crate::types::{GenericDecl, RawType, Shape, TypeArg, TypeDescriptor, TypeParam};

// -----------------------------------------------------------------------------
// Scalars

macro_rules! impl_bindable_scalar {
    (@one $ty:ty, $path:expr, $name:expr) => {
        impl Bindable for $ty {
            fn type_descriptor() -> TypeDescriptor {
                static CELL: NonGenericDescriptorCell = NonGenericDescriptorCell::new();
                CELL.get_or_init(|| {
                    TypeDescriptor::concrete::<$ty>(RawType::new($path, $name), [], Shape::Plain)
                })
            }

            fn type_meta() -> TypeMeta {
                TypeMeta::of::<$ty>(TypeShape::Scalar(ScalarOps::of::<$ty>())).with_default::<$ty>()
            }
        }
    };
    ($($ty:ident),*) => {
        $(impl_bindable_scalar!(@one $ty, stringify!($ty), stringify!($ty));)*
    };
}

macro_rules! impl_signed {
    ($($ty:ident),*) => {$(
        impl ScalarType for $ty {
            const KIND: Scalar = Scalar::Int;

            #[inline]
            fn to_value(&self) -> ScalarValue {
                ScalarValue::Int(*self as i64)
            }

            fn from_value(value: ScalarValue) -> Option<Self> {
                match value {
                    ScalarValue::Int(v) => Self::try_from(v).ok(),
                    ScalarValue::UInt(v) => Self::try_from(v).ok(),
                    _ => None,
                }
            }
        }
    )*};
}

macro_rules! impl_unsigned {
    ($($ty:ident),*) => {$(
        impl ScalarType for $ty {
            const KIND: Scalar = Scalar::UInt;

            #[inline]
            fn to_value(&self) -> ScalarValue {
                ScalarValue::UInt(*self as u64)
            }

            fn from_value(value: ScalarValue) -> Option<Self> {
                match value {
                    ScalarValue::Int(v) => Self::try_from(v).ok(),
                    ScalarValue::UInt(v) => Self::try_from(v).ok(),
                    _ => None,
                }
            }
        }
    )*};
}

macro_rules! impl_float {
    ($($ty:ident),*) => {$(
        impl ScalarType for $ty {
            const KIND: Scalar = Scalar::Float;

            #[inline]
            fn to_value(&self) -> ScalarValue {
                ScalarValue::Float(*self as f64)
            }

            fn from_value(value: ScalarValue) -> Option<Self> {
                match value {
                    ScalarValue::Float(v) => Some(v as $ty),
                    ScalarValue::Int(v) => Some(v as $ty),
                    ScalarValue::UInt(v) => Some(v as $ty),
                    _ => None,
                }
            }
        }
    )*};
}

impl_bindable_scalar!(bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);
impl_bindable_scalar!(@one String, "alloc::string::String", "String");

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);
impl_float!(f32, f64);

impl ScalarType for bool {
    const KIND: Scalar = Scalar::Bool;

    #[inline]
    fn to_value(&self) -> ScalarValue {
        ScalarValue::Bool(*self)
    }

    fn from_value(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl ScalarType for char {
    const KIND: Scalar = Scalar::Str;

    #[inline]
    fn to_value(&self) -> ScalarValue {
        ScalarValue::Str(self.to_string())
    }

    fn from_value(value: ScalarValue) -> Option<Self> {
        let ScalarValue::Str(s) = value else {
            return None;
        };
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

impl ScalarType for String {
    const KIND: Scalar = Scalar::Str;

    #[inline]
    fn to_value(&self) -> ScalarValue {
        ScalarValue::Str(self.clone())
    }

    fn from_value(value: ScalarValue) -> Option<Self> {
        match value {
            ScalarValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

// -----------------------------------------------------------------------------
// [T; N]

const ARRAY: RawType = RawType::new("array", "array");

fn array_items<T: Any, const N: usize>(value: &dyn Any) -> Option<Vec<&dyn Any>> {
    value
        .downcast_ref::<[T; N]>()
        .map(|array| array.iter().map(|item| item as &dyn Any).collect())
}

fn array_collect<T: Any, const N: usize>(items: Vec<Box<dyn Any>>) -> Option<Box<dyn Any>> {
    let items = items
        .into_iter()
        .map(|item| item.downcast::<T>().ok().map(|item| *item))
        .collect::<Option<Vec<T>>>()?;
    let array: [T; N] = items.try_into().ok()?;
    Some(Box::new(array))
}

impl<T: Bindable, const N: usize> Bindable for [T; N] {
    fn type_descriptor() -> TypeDescriptor {
        static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
        CELL.get_or_insert::<Self>(|| {
            TypeDescriptor::concrete::<Self>(
                ARRAY,
                [TypeArg::Type(T::type_descriptor())],
                Shape::Array(N),
            )
        })
    }

    fn type_meta() -> TypeMeta {
        let ops = SequenceOps::new(
            TypeId::of::<T>(),
            Some(N),
            array_items::<T, N>,
            array_collect::<T, N>,
        );
        TypeMeta::of::<Self>(TypeShape::Sequence(ops))
            .with_declaration(GenericDecl::new(ARRAY).with_param(TypeParam::new("T")))
            .with_dependency::<T>()
    }
}

// -----------------------------------------------------------------------------
// Tests
