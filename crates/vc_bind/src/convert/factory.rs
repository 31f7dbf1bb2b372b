use alloc::sync::Arc;

use crate::convert::Converter;
use crate::engine::Engine;
use crate::error::BindError;
use crate::registry::TypeMeta;

// -----------------------------------------------------------------------------
// ConverterFactory

/// One stage of the converter resolution chain.
///
/// Given a registered type, a factory may:
/// - return a converter without consulting the rest of the chain,
/// - wrap what [`Chain::next`] produces,
/// - decline with `Ok(None)`, the chain then continues unchanged.
///
/// Errors abort the resolution and are cached for the type.
pub trait ConverterFactory: Send + Sync + 'static {
    fn create(
        &self,
        meta: &TypeMeta,
        chain: &Chain<'_>,
    ) -> Result<Option<Arc<dyn Converter>>, BindError>;
}

impl<F> ConverterFactory for F
where
    F: Fn(&TypeMeta, &Chain<'_>) -> Result<Option<Arc<dyn Converter>>, BindError>
        + Send
        + Sync
        + 'static,
{
    #[inline]
    fn create(
        &self,
        meta: &TypeMeta,
        chain: &Chain<'_>,
    ) -> Result<Option<Arc<dyn Converter>>, BindError> {
        self(meta, chain)
    }
}

// -----------------------------------------------------------------------------
// Chain

/// The factories following the current one.
pub struct Chain<'a> {
    engine: &'a Engine,
    meta: &'a TypeMeta,
    factories: &'a [Arc<dyn ConverterFactory>],
}

impl<'a> Chain<'a> {
    #[inline]
    pub(crate) fn new(
        engine: &'a Engine,
        meta: &'a TypeMeta,
        factories: &'a [Arc<dyn ConverterFactory>],
    ) -> Self {
        Self {
            engine,
            meta,
            factories,
        }
    }

    /// Returns the engine.
    ///
    /// Converters of other types are resolved at call time through the
    /// [`Context`](crate::context::Context), never while resolving: a
    /// recursive type would re-enter its own slot.
    #[inline]
    pub fn engine(&self) -> &'a Engine {
        self.engine
    }

    /// Returns the type being resolved.
    #[inline]
    pub fn meta(&self) -> &'a TypeMeta {
        self.meta
    }

    /// Runs the rest of the chain.
    ///
    /// Returns the converter of the first factory that does not decline.
    pub fn next(&self) -> Result<Option<Arc<dyn Converter>>, BindError> {
        let mut rest = self.factories;
        while let Some((factory, tail)) = rest.split_first() {
            let next = Chain::new(self.engine, self.meta, tail);
            if let Some(converter) = factory.create(self.meta, &next)? {
                return Ok(Some(converter));
            }
            rest = tail;
        }
        Ok(None)
    }
}
