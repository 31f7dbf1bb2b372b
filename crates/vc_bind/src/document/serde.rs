use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde_core::de::{MapAccess, SeqAccess, Visitor};
use serde_core::ser::{SerializeMap, SerializeSeq};
use serde_core::{Deserialize, Deserializer, Serialize, Serializer};

use super::Node;

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(v) => serializer.serialize_bool(*v),
            Node::Int(v) => serializer.serialize_i64(*v),
            Node::UInt(v) => serializer.serialize_u64(*v),
            Node::Float(v) => serializer.serialize_f64(*v),
            Node::Str(v) => serializer.serialize_str(v),
            Node::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any document value")
    }

    #[inline]
    fn visit_bool<E>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Bool(v))
    }

    #[inline]
    fn visit_i64<E>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Int(v))
    }

    #[inline]
    fn visit_u64<E>(self, v: u64) -> Result<Node, E> {
        Ok(Node::from_u64(v))
    }

    #[inline]
    fn visit_f64<E>(self, v: f64) -> Result<Node, E> {
        Ok(Node::Float(v))
    }

    #[inline]
    fn visit_char<E>(self, v: char) -> Result<Node, E> {
        Ok(Node::Str(v.into()))
    }

    #[inline]
    fn visit_str<E>(self, v: &str) -> Result<Node, E> {
        Ok(Node::Str(v.into()))
    }

    #[inline]
    fn visit_string<E>(self, v: String) -> Result<Node, E> {
        Ok(Node::Str(v))
    }

    #[inline]
    fn visit_unit<E>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    #[inline]
    fn visit_none<E>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        Node::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(256));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Node::Seq(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Node, A::Error> {
        let mut entries: Vec<(String, Node)> = Vec::with_capacity(map.size_hint().unwrap_or(0).min(256));
        while let Some((key, value)) = map.next_entry::<String, Node>()? {
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => entries.push((key, value)),
            }
        }
        Ok(Node::Map(entries))
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::ToString;
    use alloc::vec;

    use crate::document::Node;

    fn sample() -> Node {
        Node::map([
            ("name", Node::from("ann")),
            ("age", Node::Int(-3)),
            ("big", Node::from_u64(u64::MAX)),
            ("ratio", Node::Float(0.5)),
            ("tags", Node::Seq(vec![Node::Bool(true), Node::Null])),
        ])
    }

    #[test]
    fn json_keeps_entry_order() {
        let node = sample();
        let text = serde_json::to_string(&node).unwrap();
        assert_eq!(
            text,
            r#"{"name":"ann","age":-3,"big":18446744073709551615,"ratio":0.5,"tags":[true,null]}"#
        );
        assert_eq!(text, node.to_string());

        let back: Node = serde_json::from_str(&text).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn ron_round_trip() {
        let node = sample();
        let text = ron::to_string(&node).unwrap();
        let back: Node = ron::from_str(&text).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn positive_integers_are_normalized() {
        let node: Node = serde_json::from_str("[1, -1]").unwrap();
        assert_eq!(node, Node::Seq(vec![Node::Int(1), Node::Int(-1)]));
        assert_eq!("x".to_string(), Node::from("x").as_str().unwrap());
    }
}
