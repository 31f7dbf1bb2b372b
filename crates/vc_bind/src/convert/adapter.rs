use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::{Any, TypeId, type_name};
use core::fmt;

use crate::error::BindError;
use crate::registry::{Bindable, TypeRegistry};
use crate::types::TypeDescriptor;

// -----------------------------------------------------------------------------
// Adapter

/// Converts a property value to and from another representation.
///
/// The property is written as `Adapted`, with the converter of `Adapted`.
///
/// # Examples
///
/// ```
/// use vc_bind::convert::{Adapter, PropertyAdapter};
/// use vc_bind::error::BindError;
///
/// /// Writes cents as a decimal string.
/// struct Decimal;
///
/// impl Adapter for Decimal {
///     type Value = i64;
///     type Adapted = String;
///
///     fn marshal(&self, cents: &i64) -> Result<String, BindError> {
///         Ok(format!("{}.{:02}", cents / 100, cents % 100))
///     }
///
///     fn unmarshal(&self, text: String) -> Result<i64, BindError> {
///         let (units, cents) = text.split_once('.').ok_or_else(|| BindError::custom("no decimal point"))?;
///         let parse = |s: &str| s.parse::<i64>().map_err(|_| BindError::custom("not a number"));
///         Ok(parse(units)? * 100 + parse(cents)?)
///     }
/// }
///
/// let adapter = PropertyAdapter::new(Decimal);
/// let text = adapter.marshal(&1250i64, "$.total").unwrap();
/// assert_eq!(text.downcast_ref::<String>().unwrap(), "12.50");
///
/// let err = adapter.unmarshal(Box::new(String::from("12")), "$.total").unwrap_err();
/// assert_eq!(err.to_string(), "at `$.total`: no decimal point");
/// ```
pub trait Adapter: Send + Sync + 'static {
    type Value: Bindable;
    type Adapted: Bindable;

    fn marshal(&self, value: &Self::Value) -> Result<Self::Adapted, BindError>;

    fn unmarshal(&self, adapted: Self::Adapted) -> Result<Self::Value, BindError>;
}

// -----------------------------------------------------------------------------
// PropertyAdapter

trait ErasedAdapter: Send + Sync {
    fn marshal(&self, value: &dyn Any) -> Option<Result<Box<dyn Any>, BindError>>;
    fn unmarshal(&self, adapted: Box<dyn Any>) -> Option<Result<Box<dyn Any>, BindError>>;
}

impl<A: Adapter> ErasedAdapter for A {
    fn marshal(&self, value: &dyn Any) -> Option<Result<Box<dyn Any>, BindError>> {
        let value = value.downcast_ref::<A::Value>()?;
        Some(Adapter::marshal(self, value).map(|v| Box::new(v) as Box<dyn Any>))
    }

    fn unmarshal(&self, adapted: Box<dyn Any>) -> Option<Result<Box<dyn Any>, BindError>> {
        let adapted = adapted.downcast::<A::Adapted>().ok()?;
        Some(Adapter::unmarshal(self, *adapted).map(|v| Box::new(v) as Box<dyn Any>))
    }
}

/// An erased [`Adapter`], attached to a member as an attribute.
///
/// The property type must be exactly the adapter's `Value` type,
/// this is checked when the bean descriptor is built.
#[derive(Clone)]
pub struct PropertyAdapter {
    name: &'static str,
    value: TypeDescriptor,
    adapted: TypeDescriptor,
    adapted_id: TypeId,
    value_name: &'static str,
    dependency: fn(&mut TypeRegistry),
    inner: Arc<dyn ErasedAdapter>,
}

impl PropertyAdapter {
    pub fn new<A: Adapter>(adapter: A) -> Self {
        Self {
            name: type_name::<A>(),
            value: A::Value::type_descriptor(),
            adapted: A::Adapted::type_descriptor(),
            adapted_id: TypeId::of::<A::Adapted>(),
            value_name: type_name::<A::Value>(),
            dependency: TypeRegistry::register::<A::Adapted>,
            inner: Arc::new(adapter),
        }
    }

    /// Returns the type name of the adapter.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the descriptor of the adapter's `Value`.
    #[inline]
    pub fn value_type(&self) -> &TypeDescriptor {
        &self.value
    }

    /// Returns the descriptor of the adapter's `Adapted`.
    #[inline]
    pub fn adapted_type(&self) -> &TypeDescriptor {
        &self.adapted
    }

    #[inline]
    pub fn adapted_id(&self) -> TypeId {
        self.adapted_id
    }

    /// Returns the registration of `Adapted`.
    #[inline]
    pub fn dependency(&self) -> fn(&mut TypeRegistry) {
        self.dependency
    }

    /// Converts a property value at `path` to its adapted representation.
    pub fn marshal(&self, value: &dyn Any, path: &str) -> Result<Box<dyn Any>, BindError> {
        match self.inner.marshal(value) {
            Some(result) => result.map_err(|err| err.at(path)),
            None => Err(BindError::ValueMismatch {
                path: path.into(),
                expected: self.value_name,
            }),
        }
    }

    /// Converts an adapted value read at `path` back.
    pub fn unmarshal(&self, adapted: Box<dyn Any>, path: &str) -> Result<Box<dyn Any>, BindError> {
        match self.inner.unmarshal(adapted) {
            Some(result) => result.map_err(|err| err.at(path)),
            None => Err(BindError::ValueMismatch {
                path: path.into(),
                expected: self.adapted.raw().name(),
            }),
        }
    }
}

impl fmt::Debug for PropertyAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyAdapter")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("adapted", &self.adapted)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::ToString;
    use core::any::TypeId;

    use super::{Adapter, PropertyAdapter};
    use crate::error::BindError;
    use crate::registry::{Bindable, TypeRegistry};

    struct Flag;

    impl Adapter for Flag {
        type Value = bool;
        type Adapted = u8;

        fn marshal(&self, value: &bool) -> Result<u8, BindError> {
            Ok(u8::from(*value))
        }

        fn unmarshal(&self, adapted: u8) -> Result<bool, BindError> {
            match adapted {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(BindError::custom("expected 0 or 1")),
            }
        }
    }

    #[test]
    fn erased_round_trip() {
        let adapter = PropertyAdapter::new(Flag);
        assert_eq!(adapter.value_type(), &bool::type_descriptor());
        assert_eq!(adapter.adapted_id(), TypeId::of::<u8>());

        let out = adapter.marshal(&true, "$.on").unwrap();
        assert_eq!(out.downcast_ref::<u8>(), Some(&1));
        let back = adapter.unmarshal(Box::new(0u8), "$.on").unwrap();
        assert_eq!(back.downcast_ref::<bool>(), Some(&false));

        let err = adapter.unmarshal(Box::new(7u8), "$.on").unwrap_err();
        assert_eq!(err.to_string(), "at `$.on`: expected 0 or 1");
        assert!(matches!(
            adapter.marshal(&3i32, "$.on"),
            Err(BindError::ValueMismatch { .. })
        ));

        let mut registry = TypeRegistry::empty();
        (adapter.dependency())(&mut registry);
        assert!(registry.contains(TypeId::of::<u8>()));
    }
}
