use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::hash::BuildHasher;
use std::collections::HashMap;

use crate::impls::GenericDescriptorCell;
use crate::registry::{Bindable, MapOps, TypeMeta, TypeShape};
use crate::types::{GenericDecl, RawType, Shape, TypeArg, TypeDescriptor, TypeParam};

// Only string keys are bindable: object keys of a document are strings.

fn map_declaration(raw: RawType) -> GenericDecl {
    GenericDecl::new(raw)
        .with_param(TypeParam::new("K"))
        .with_param(TypeParam::new("V"))
}

fn collect_values<V: Any>(entries: Vec<(String, Box<dyn Any>)>) -> Option<Vec<(String, V)>> {
    entries
        .into_iter()
        .map(|(key, value)| value.downcast::<V>().ok().map(|value| (key, *value)))
        .collect()
}

// -----------------------------------------------------------------------------
// BTreeMap

const BTREE_MAP: RawType = RawType::new("alloc::collections::BTreeMap", "BTreeMap");

fn btree_entries<V: Any>(value: &dyn Any) -> Option<Vec<(&str, &dyn Any)>> {
    let map = value.downcast_ref::<BTreeMap<String, V>>()?;
    Some(map.iter().map(|(k, v)| (k.as_str(), v as &dyn Any)).collect())
}

fn btree_collect<V: Any>(entries: Vec<(String, Box<dyn Any>)>) -> Option<Box<dyn Any>> {
    let map: BTreeMap<String, V> = collect_values(entries)?.into_iter().collect();
    Some(Box::new(map))
}

impl<V: Bindable> Bindable for BTreeMap<String, V> {
    fn type_descriptor() -> TypeDescriptor {
        static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
        CELL.get_or_insert::<Self>(|| {
            TypeDescriptor::concrete::<Self>(
                BTREE_MAP,
                [
                    TypeArg::Type(String::type_descriptor()),
                    TypeArg::Type(V::type_descriptor()),
                ],
                Shape::Plain,
            )
        })
    }

    fn type_meta() -> TypeMeta {
        let ops = MapOps::new(TypeId::of::<V>(), btree_entries::<V>, btree_collect::<V>);
        TypeMeta::of::<Self>(TypeShape::Map(ops))
            .with_declaration(map_declaration(BTREE_MAP))
            .with_default::<Self>()
            .with_dependency::<V>()
    }
}

// -----------------------------------------------------------------------------
// HashMap

const HASH_MAP: RawType = RawType::new("std::collections::HashMap", "HashMap");

/// Entries are sorted by key, so output does not depend on the hasher.
fn hash_entries<V: Any, S: Any>(value: &dyn Any) -> Option<Vec<(&str, &dyn Any)>> {
    let map = value.downcast_ref::<HashMap<String, V, S>>()?;
    let mut entries: Vec<(&str, &dyn Any)> =
        map.iter().map(|(k, v)| (k.as_str(), v as &dyn Any)).collect();
    entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
    Some(entries)
}

fn hash_collect<V: Any, S: BuildHasher + Default + Any>(
    entries: Vec<(String, Box<dyn Any>)>,
) -> Option<Box<dyn Any>> {
    let map: HashMap<String, V, S> = collect_values(entries)?.into_iter().collect();
    Some(Box::new(map))
}

impl<V, S> Bindable for HashMap<String, V, S>
where
    V: Bindable,
    S: BuildHasher + Default + Send + Sync + 'static,
{
    fn type_descriptor() -> TypeDescriptor {
        static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
        CELL.get_or_insert::<Self>(|| {
            TypeDescriptor::concrete::<Self>(
                HASH_MAP,
                [
                    TypeArg::Type(String::type_descriptor()),
                    TypeArg::Type(V::type_descriptor()),
                ],
                Shape::Plain,
            )
        })
    }

    fn type_meta() -> TypeMeta {
        let ops = MapOps::new(
            TypeId::of::<V>(),
            hash_entries::<V, S>,
            hash_collect::<V, S>,
        );
        TypeMeta::of::<Self>(TypeShape::Map(ops))
            .with_declaration(map_declaration(HASH_MAP))
            .with_default::<Self>()
            .with_dependency::<V>()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::collections::BTreeMap;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;
    use core::any::Any;
    use std::collections::HashMap;

    use crate::registry::{Bindable, TypeRegistry, TypeShape};

    #[test]
    fn hash_map_entries_are_sorted() {
        let meta = <HashMap<String, u8> as Bindable>::type_meta();
        let TypeShape::Map(ops) = meta.shape() else {
            panic!("not a map");
        };
        let map: HashMap<String, u8> = [("b".into(), 2), ("a".into(), 1), ("c".into(), 3)]
            .into_iter()
            .collect();
        let keys: Vec<&str> = ops.entries(&map).unwrap().iter().map(|e| e.0).collect();
        assert_eq!(keys, ["a", "b", "c"]);

        let built = ops
            .collect(vec![("x".to_string(), Box::new(9u8) as Box<dyn Any>)])
            .unwrap();
        assert_eq!(built.downcast_ref::<HashMap<String, u8>>().unwrap()["x"], 9);
    }

    #[test]
    fn btree_map_registration() {
        let mut registry = TypeRegistry::empty();
        registry.register::<BTreeMap<String, Vec<u8>>>();
        assert!(registry.get_with_name("alloc::vec::Vec<u8>").is_some());

        let ty = <BTreeMap<String, bool>>::type_descriptor();
        assert_eq!(
            ty.to_string(),
            "alloc::collections::BTreeMap<alloc::string::String, bool>"
        );
    }
}
