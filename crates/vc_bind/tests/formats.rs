//! Text formats through `Node`, and the XML-binding metadata through the derive.

use vc_bind::derive::Bean;
use vc_bind::document::Node;
use vc_bind::engine::Engine;
use vc_bind::ext::xml::{XmlAccessType, XmlAccessorType, XmlBundle, XmlElement, XmlTransient};

#[derive(Bean, Debug, Default, Clone, PartialEq)]
#[bind(default)]
pub struct Line {
    pub sku: String,
    pub qty: u16,
    pub price: f64,
}

#[derive(Bean, Debug, Default, Clone, PartialEq)]
#[bind(default)]
pub struct Invoice {
    pub number: u64,
    pub paid: bool,
    pub lines: Vec<Line>,
    pub memo: Option<String>,
}

#[derive(Bean, Debug, Default, PartialEq)]
#[bind(default, root = "shipment", @XmlAccessorType(XmlAccessType::Field))]
pub struct Shipment {
    #[bind(@XmlElement::named("trackingId"))]
    tracking: String,
    #[bind(@XmlTransient)]
    pub cache: u32,
    weight: u32,
}

fn invoice() -> Invoice {
    Invoice {
        number: 42,
        paid: false,
        lines: vec![
            Line {
                sku: "A-1".into(),
                qty: 2,
                price: 9.5,
            },
            Line {
                sku: "B-7".into(),
                qty: 1,
                price: 120.0,
            },
        ],
        memo: None,
    }
}

#[test]
fn json_round_trip() {
    let engine = Engine::builder().register::<Invoice>().build();
    let node = engine.serialize(&invoice()).unwrap();

    let text = serde_json::to_string(&node).unwrap();
    assert_eq!(
        text,
        r#"{"number":42,"paid":false,"lines":[{"sku":"A-1","qty":2,"price":9.5},{"sku":"B-7","qty":1,"price":120.0}],"memo":null}"#
    );

    let parsed: Node = serde_json::from_str(&text).unwrap();
    assert_eq!(engine.deserialize::<Invoice>(&parsed).unwrap(), invoice());
}

#[test]
fn json_input_with_unknown_keys() {
    let engine = Engine::builder().register::<Invoice>().build();
    let text = r#"{"number": 7, "extra": {"nested": [1, 2]}, "paid": true}"#;
    let node: Node = serde_json::from_str(text).unwrap();
    let value: Invoice = engine.deserialize(&node).unwrap();
    assert_eq!(value.number, 7);
    assert!(value.paid);
    assert!(value.lines.is_empty());
}

#[test]
fn ron_round_trip() {
    let engine = Engine::builder().register::<Invoice>().build();
    let node = engine.serialize(&invoice()).unwrap();

    let text = ron::to_string(&node).unwrap();
    let parsed: Node = ron::from_str(&text).unwrap();
    assert_eq!(parsed, node);
    assert_eq!(engine.deserialize::<Invoice>(&parsed).unwrap(), invoice());
}

#[test]
fn xml_metadata_from_derive() {
    let engine = Engine::builder()
        .with_bundle(XmlBundle::new().wrap_root_values(true))
        .register::<Shipment>()
        .build();
    let shipment = Shipment {
        tracking: "TRK-9".into(),
        cache: 5,
        weight: 800,
    };

    let node = engine.serialize(&shipment).unwrap();
    assert_eq!(
        node,
        Node::map([(
            "shipment",
            Node::map([
                ("trackingId", Node::from("TRK-9")),
                ("weight", Node::Int(800)),
            ])
        )])
    );

    let back: Shipment = engine.deserialize(&node).unwrap();
    assert_eq!(
        back,
        Shipment {
            cache: 0,
            ..shipment
        }
    );
}
