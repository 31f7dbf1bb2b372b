/// Global switches of an [`Engine`](super::Engine).
///
/// Every option is off by default.
///
/// # Examples
///
/// ```
/// use vc_bind::engine::{Engine, Options};
///
/// let engine = Engine::builder()
///     .options(Options { skip_null: true, ..Options::default() })
///     .lenient(true)
///     .build();
///
/// assert!(engine.options().skip_null);
/// assert!(engine.options().lenient);
/// assert!(!engine.options().fail_on_unknown);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    /// Omits bean properties whose value is null.
    pub skip_null: bool,
    /// Writes the root bean as `{ "<root name>": {...} }`, and expects it on read.
    pub wrap_root_values: bool,
    /// Tags bean objects with an `@class` entry.
    pub class_metadata: bool,
    /// Reads null as the default value of types that have one, and accepts
    /// numeric strings and integral floats for numbers.
    pub lenient: bool,
    /// Rejects object keys that match no property.
    pub fail_on_unknown: bool,
    /// Includes non-public members when no resolver decides.
    pub include_private: bool,
}
