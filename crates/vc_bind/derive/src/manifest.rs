use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use toml_edit::{Document, Item};

const ENGINE_CRATE: &str = "vc_bind";
const FACADE_CRATE: &str = "vc_databind";
const FACADE_MODULE: &str = "bind";

/// Returns the path under which the calling crate sees `vc_bind`.
///
/// 1. `::vc_bind` if it is a direct dependency.
/// 2. `::vc_databind::bind` if the facade is.
/// 3. Steps 1-2 over `dev-dependencies`.
/// 4. `::vc_bind` otherwise, which also resolves inside `vc_bind` itself.
///
/// Results are cached per manifest and invalidated when it is modified.
pub(crate) fn vc_bind() -> syn::Path {
    static RESOLVED: RwLock<BTreeMap<PathBuf, (SystemTime, String)>> =
        RwLock::new(BTreeMap::new());

    let Some(manifest_path) = env::var_os("CARGO_MANIFEST_DIR")
        .map(|dir| PathBuf::from(dir).join("Cargo.toml"))
    else {
        return parse(&format!("::{ENGINE_CRATE}"));
    };
    let modified = std::fs::metadata(&manifest_path)
        .and_then(|metadata| metadata.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let cached = RESOLVED
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&manifest_path)
        .filter(|(time, _)| *time == modified)
        .map(|(_, path)| path.clone());
    if let Some(path) = cached {
        return parse(&path);
    }

    let path = std::fs::read_to_string(&manifest_path)
        .ok()
        .and_then(|text| Document::parse(text).ok())
        .and_then(|manifest| find(&manifest))
        .unwrap_or_else(|| format!("::{ENGINE_CRATE}"));

    RESOLVED
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(manifest_path, (modified, path.clone()));
    parse(&path)
}

fn find(manifest: &Document<String>) -> Option<String> {
    ["dependencies", "dev-dependencies"].into_iter().find_map(|section| {
        let Some(Item::Table(deps)) = manifest.get(section) else {
            return None;
        };
        if deps.contains_key(ENGINE_CRATE) {
            Some(format!("::{ENGINE_CRATE}"))
        } else if deps.contains_key(FACADE_CRATE) {
            Some(format!("::{FACADE_CRATE}::{FACADE_MODULE}"))
        } else {
            None
        }
    })
}

fn parse(path: &str) -> syn::Path {
    syn::parse_str(path).unwrap_or_else(|_| syn::parse_quote!(::vc_bind))
}
