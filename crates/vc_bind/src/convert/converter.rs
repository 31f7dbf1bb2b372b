use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::Any;

use bitflags::bitflags;

use crate::context::Context;
use crate::document::{DocumentReader, DocumentWriter};
use crate::error::BindError;

// -----------------------------------------------------------------------------
// Capabilities

bitflags! {
    /// Behaviours a converter implements itself, so the matching wrapper is skipped.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Reads and writes null itself.
        const HANDLES_NULL     = 1 << 0;
        /// Selects views itself.
        const HANDLES_VIEWS    = 1 << 1;
        /// Writes and checks class metadata itself.
        const HANDLES_METADATA = 1 << 2;
    }
}

// -----------------------------------------------------------------------------
// Converter

/// Serializes values of one type into a document, and back.
///
/// Values cross the erased boundary as `&dyn Any` and `Box<dyn Any>`.
/// A converter receiving a value of another type returns
/// [`BindError::ValueMismatch`].
///
/// Wrapping converters hold the converter they decorate and expose it
/// through [`wrapped`](Converter::wrapped).
///
/// # Examples
///
/// ```
/// use core::any::Any;
/// use vc_bind::context::Context;
/// use vc_bind::convert::{Capabilities, Converter, has_capability};
/// use vc_bind::document::{DocumentReader, DocumentWriter};
/// use vc_bind::error::BindError;
///
/// /// Writes a `u32` in hexadecimal.
/// struct Hex;
///
/// impl Converter for Hex {
///     fn serialize(
///         &self,
///         value: &dyn Any,
///         writer: &mut dyn DocumentWriter,
///         cx: &mut Context<'_>,
///     ) -> Result<(), BindError> {
///         let value = value.downcast_ref::<u32>().ok_or_else(|| BindError::mismatch::<u32>(cx.path()))?;
///         writer.write_str(&format!("{value:x}"))
///     }
///
///     fn deserialize(
///         &self,
///         reader: &mut dyn DocumentReader,
///         _cx: &mut Context<'_>,
///     ) -> Result<Box<dyn Any>, BindError> {
///         let text = reader.read_str()?;
///         u32::from_str_radix(&text, 16)
///             .map(|v| Box::new(v) as Box<dyn Any>)
///             .map_err(|_| reader.malformed("hexadecimal", &text))
///     }
/// }
///
/// assert!(!has_capability(&Hex, Capabilities::HANDLES_NULL));
/// ```
pub trait Converter: Send + Sync + 'static {
    /// Writes `value`.
    fn serialize(
        &self,
        value: &dyn Any,
        writer: &mut dyn DocumentWriter,
        cx: &mut Context<'_>,
    ) -> Result<(), BindError>;

    /// Reads the value under the cursor.
    fn deserialize(
        &self,
        reader: &mut dyn DocumentReader,
        cx: &mut Context<'_>,
    ) -> Result<Box<dyn Any>, BindError>;

    /// Returns the capabilities of this layer.
    #[inline]
    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    /// Returns the decorated converter, for wrapping converters.
    #[inline]
    fn wrapped(&self) -> Option<&Arc<dyn Converter>> {
        None
    }
}

/// Returns `true` if a layer of `converter` declares `capability`.
///
/// Walks the wrapped layers until a layer declares it or the innermost
/// converter is reached.
pub fn has_capability(converter: &dyn Converter, capability: Capabilities) -> bool {
    let mut current = converter;
    loop {
        if current.capabilities().contains(capability) {
            return true;
        }
        match current.wrapped() {
            Some(inner) => current = &**inner,
            None => return false,
        }
    }
}

/// Returns the innermost converter of a wrapping chain.
pub fn innermost(converter: &dyn Converter) -> &dyn Converter {
    let mut current = converter;
    while let Some(inner) = current.wrapped() {
        current = &**inner;
    }
    current
}

// -----------------------------------------------------------------------------
// Tests
