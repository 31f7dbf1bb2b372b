use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

use crate::error::BindError;
use crate::registry::{Bindable, TypeRegistry};
use crate::types::TypeDescriptor;

// -----------------------------------------------------------------------------
// Arguments

/// Decoded creator arguments, in parameter order.
pub struct Arguments {
    values: Vec<Option<Box<dyn Any>>>,
}

impl Arguments {
    /// Creates the argument list.
    #[inline]
    pub fn new(values: Vec<Box<dyn Any>>) -> Self {
        Self {
            values: values.into_iter().map(Some).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Moves the argument at `index` out.
    pub fn take<T: Any>(&mut self, index: usize) -> Result<T, BindError> {
        let value = self
            .values
            .get_mut(index)
            .and_then(Option::take)
            .ok_or_else(|| BindError::document(alloc::format!("creator argument {index} is missing")))?;
        value
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| BindError::mismatch::<T>(alloc::format!("#{index}")))
    }
}

// -----------------------------------------------------------------------------
// CreatorFn

/// Parameter types of a creator: descriptor, [`TypeId`] and registration.
pub type ParamInfo = (TypeDescriptor, TypeId, fn(&mut TypeRegistry));

/// A function usable as a creator of `S`.
///
/// Implemented for functions and closures of up to eight [`Bindable`]
/// arguments returning `S`. `Marker` only disambiguates the impls.
pub trait CreatorFn<S, Marker>: Send + Sync + 'static {
    /// Returns the parameters in order.
    fn params() -> Vec<ParamInfo>;

    /// Calls the function with decoded arguments.
    fn call(&self, args: &mut Arguments) -> Result<S, BindError>;
}

macro_rules! impl_creator_fn {
    ($($arg:ident : $idx:tt),*) => {
        impl<S, Func, $($arg: Bindable),*> CreatorFn<S, fn($($arg),*) -> S> for Func
        where
            Func: Fn($($arg),*) -> S + Send + Sync + 'static,
        {
            fn params() -> Vec<ParamInfo> {
                alloc::vec![$((
                    <$arg as Bindable>::type_descriptor(),
                    TypeId::of::<$arg>(),
                    TypeRegistry::register::<$arg> as fn(&mut TypeRegistry),
                )),*]
            }

            #[allow(unused_variables, reason = "zero arguments")]
            fn call(&self, args: &mut Arguments) -> Result<S, BindError> {
                Ok((self)($(args.take::<$arg>($idx)?),*))
            }
        }
    };
}

impl_creator_fn!();
impl_creator_fn!(A0: 0);
impl_creator_fn!(A0: 0, A1: 1);
impl_creator_fn!(A0: 0, A1: 1, A2: 2);
impl_creator_fn!(A0: 0, A1: 1, A2: 2, A3: 3);
impl_creator_fn!(A0: 0, A1: 1, A2: 2, A3: 3, A4: 4);
impl_creator_fn!(A0: 0, A1: 1, A2: 2, A3: 3, A4: 4, A5: 5);
impl_creator_fn!(A0: 0, A1: 1, A2: 2, A3: 3, A4: 4, A5: 5, A6: 6);
impl_creator_fn!(A0: 0, A1: 1, A2: 2, A3: 3, A4: 4, A5: 5, A6: 6, A7: 7);

// -----------------------------------------------------------------------------
// Creator

/// How a [`Creator`] was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreatorKind {
    Constructor,
    Factory,
    /// Implicit, builds the value from every field.
    ///
    /// Tried after default construction.
    Memberwise,
}

/// One parameter of a [`Creator`].
#[derive(Debug, Clone)]
pub struct CreatorParam {
    name: Option<&'static str>,
    ty: TypeDescriptor,
    value_id: TypeId,
}

impl CreatorParam {
    /// Returns the explicit property name, `None` for positional mapping.
    #[inline]
    pub fn name(&self) -> Option<&'static str> {
        self.name
    }

    #[inline]
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    #[inline]
    pub fn value_id(&self) -> TypeId {
        self.value_id
    }
}

type CallFn = dyn Fn(&mut Arguments) -> Result<Box<dyn Any>, BindError> + Send + Sync;

/// A declared way of creating a bean from property values.
///
/// # Examples
///
/// ```
/// use vc_bind::members::{Arguments, Creator};
///
/// struct Point { x: i32, y: i32 }
///
/// impl Point {
///     fn new(x: i32, y: i32) -> Self { Point { x, y } }
/// }
///
/// let creator = Creator::constructor("new", Point::new).with_param_names([Some("x"), None]);
/// assert_eq!(creator.params().len(), 2);
/// assert_eq!(creator.params()[0].name(), Some("x"));
/// assert_eq!(creator.params()[1].name(), None);
///
/// let value = creator.call(Arguments::new(vec![Box::new(1i32), Box::new(2i32)])).unwrap();
/// let point = value.downcast::<Point>().unwrap();
/// assert_eq!((point.x, point.y), (1, 2));
/// ```
#[derive(Clone)]
pub struct Creator {
    name: &'static str,
    kind: CreatorKind,
    params: Vec<CreatorParam>,
    dependencies: Vec<fn(&mut TypeRegistry)>,
    call: Arc<CallFn>,
}

impl Creator {
    /// Creates a constructor.
    #[inline]
    pub fn constructor<S: Any, M>(name: &'static str, f: impl CreatorFn<S, M>) -> Self {
        Self::new(name, CreatorKind::Constructor, f)
    }

    /// Creates a factory function.
    #[inline]
    pub fn factory<S: Any, M>(name: &'static str, f: impl CreatorFn<S, M>) -> Self {
        Self::new(name, CreatorKind::Factory, f)
    }

    /// Creates the implicit memberwise creator.
    #[inline]
    pub fn memberwise<S: Any, M>(f: impl CreatorFn<S, M>) -> Self {
        Self::new("memberwise", CreatorKind::Memberwise, f)
    }

    fn new<S: Any, M, F: CreatorFn<S, M>>(name: &'static str, kind: CreatorKind, f: F) -> Self {
        let (params, dependencies) = F::params()
            .into_iter()
            .map(|(ty, value_id, register)| {
                let param = CreatorParam {
                    name: None,
                    ty,
                    value_id,
                };
                (param, register)
            })
            .unzip();
        Self {
            name,
            kind,
            params,
            dependencies,
            call: Arc::new(move |args: &mut Arguments| {
                f.call(args).map(|value| Box::new(value) as Box<dyn Any>)
            }),
        }
    }

    /// Names the parameters in order, `None` leaves a parameter positional.
    pub fn with_param_names(
        mut self,
        names: impl IntoIterator<Item = Option<&'static str>>,
    ) -> Self {
        for (param, name) in self.params.iter_mut().zip(names) {
            param.name = name;
        }
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn kind(&self) -> CreatorKind {
        self.kind
    }

    #[inline]
    pub fn params(&self) -> &[CreatorParam] {
        &self.params
    }

    /// Returns the registration functions of the parameter types.
    #[inline]
    pub fn dependencies(&self) -> &[fn(&mut TypeRegistry)] {
        &self.dependencies
    }

    /// Calls the creator.
    #[inline]
    pub fn call(&self, mut args: Arguments) -> Result<Box<dyn Any>, BindError> {
        (self.call)(&mut args)
    }

    /// Returns `name#index` labels of the parameters, for error messages.
    pub(crate) fn param_label(&self, index: usize) -> String {
        match self.params.get(index).and_then(CreatorParam::name) {
            Some(name) => alloc::format!("{}#{name}", self.name),
            None => alloc::format!("{}#{index}", self.name),
        }
    }
}

impl fmt::Debug for Creator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Creator")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec;

    use super::{Arguments, Creator, CreatorKind};
    use crate::error::BindError;
    use crate::registry::Bindable;

    #[derive(Debug, PartialEq)]
    struct Label {
        text: String,
        size: u8,
    }

    #[test]
    fn closures_and_factories() {
        let creator = Creator::factory("label", |text: String, size: u8| Label { text, size })
            .with_param_names([Some("text"), Some("size")]);
        assert_eq!(creator.kind(), CreatorKind::Factory);
        assert_eq!(creator.params()[1].ty(), &u8::type_descriptor());
        assert_eq!(creator.dependencies().len(), 2);

        let value = creator
            .call(Arguments::new(vec![Box::new(String::from("a")), Box::new(3u8)]))
            .unwrap();
        assert_eq!(
            *value.downcast::<Label>().unwrap(),
            Label {
                text: "a".into(),
                size: 3
            }
        );
    }

    #[test]
    fn wrong_argument_types_are_reported() {
        let creator = Creator::constructor("new", |size: u8| Label {
            text: String::new(),
            size,
        });
        let err = creator.call(Arguments::new(vec![Box::new(1i64)])).unwrap_err();
        assert!(matches!(err, BindError::ValueMismatch { .. }));
        assert!(creator.call(Arguments::new(vec![])).is_err());
        assert_eq!(creator.param_label(0), "new#0");
    }

    #[test]
    fn nullary_creator() {
        let creator = Creator::constructor("empty", || 5u8);
        assert!(creator.params().is_empty());
        let value = creator.call(Arguments::new(vec![])).unwrap();
        assert_eq!(*value.downcast::<u8>().unwrap(), 5);
    }
}
