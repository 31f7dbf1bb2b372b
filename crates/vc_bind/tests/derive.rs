//! `#[derive(Bean)]` driven from outside the crate.

use core::any::TypeId;

use vc_bind::convert::Adapter;
use vc_bind::derive::Bean;
use vc_bind::document::Node;
use vc_bind::engine::Engine;
use vc_bind::error::BindError;

// -----------------------------------------------------------------------------
// Fixtures

#[derive(Bean, Debug, Default, Clone, PartialEq)]
#[bind(default)]
pub struct Address {
    pub street: String,
    pub zip: Option<u32>,
}

#[derive(Bean, Debug, Default, Clone, PartialEq)]
#[bind(default)]
pub struct Customer {
    pub name: String,
    pub tags: Vec<String>,
    pub home: Address,
    pub previous: Option<Box<Address>>,
}

#[derive(Bean, Debug, PartialEq)]
#[bind(default)]
pub struct Pair {
    pub a: u8,
    #[bind(skip)]
    pub b: u8,
}

impl Default for Pair {
    fn default() -> Self {
        Self { a: 0, b: 42 }
    }
}

#[derive(Bean, Debug, PartialEq)]
#[bind(creator(Self::new, "x", "y"))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Bean, Debug, PartialEq)]
pub struct Memberwise {
    pub id: u64,
    pub label: Option<String>,
}

#[derive(Bean, Debug, Default, PartialEq)]
#[bind(default)]
pub struct Login {
    #[bind(rename = "user", alias = "login")]
    pub name: String,
    #[bind(skip_serializing)]
    pub password: String,
    #[bind(skip_deserializing)]
    pub attempts: u32,
}

#[derive(Bean, Debug, Default, Clone, Copy, PartialEq)]
#[bind(default)]
pub enum Status {
    #[default]
    Active,
    #[bind(rename = "on-hold")]
    OnHold,
    Closed,
}

#[derive(Bean, Debug, Default, PartialEq)]
#[bind(default)]
pub struct Ticket {
    pub status: Status,
    pub history: Vec<Status>,
}

/// Writes cents as a decimal string.
pub struct Decimal;

impl Adapter for Decimal {
    type Value = i64;
    type Adapted = String;

    fn marshal(&self, cents: &i64) -> Result<String, BindError> {
        Ok(format!("{}.{:02}", cents / 100, cents % 100))
    }

    fn unmarshal(&self, text: String) -> Result<i64, BindError> {
        let (units, cents) = text
            .split_once('.')
            .ok_or_else(|| BindError::custom("no decimal point"))?;
        let parse = |s: &str| s.parse::<i64>().map_err(|_| BindError::custom("not a number"));
        Ok(parse(units)? * 100 + parse(cents)?)
    }
}

#[derive(Bean, Debug, Default, PartialEq)]
#[bind(default, getter(lines = Cart::lines), setter(discount = Cart::set_discount))]
pub struct Cart {
    #[bind(adapter = Decimal)]
    pub total: i64,
    pub items: Vec<String>,
    #[bind(skip)]
    pub discount: u8,
}

impl Cart {
    pub fn lines(&self) -> usize {
        self.items.len()
    }

    pub fn set_discount(&mut self, discount: u8) {
        self.discount = discount;
    }
}

#[derive(Bean, Debug, PartialEq)]
pub struct Entity<T> {
    pub id: T,
}

#[derive(Bean, Debug, Default, PartialEq)]
#[bind(default)]
pub struct Named<T> {
    #[bind(extends)]
    pub entity: Entity<T>,
    pub name: String,
}

impl<T: Default> Default for Entity<T> {
    fn default() -> Self {
        Self { id: T::default() }
    }
}

#[derive(Bean, Debug, Default, PartialEq)]
#[bind(default, root = "profile")]
pub struct Profile {
    pub nick: String,
    #[bind(include)]
    score: u32,
    hidden: u32,
}

// -----------------------------------------------------------------------------
// Tests

#[test]
fn nested_round_trip() {
    let engine = Engine::builder().register::<Customer>().build();
    let customer = Customer {
        name: "Ada".into(),
        tags: vec!["vip".into(), "early".into()],
        home: Address {
            street: "Main".into(),
            zip: Some(1000),
        },
        previous: Some(Box::new(Address {
            street: "Old".into(),
            zip: None,
        })),
    };

    let node = engine.serialize(&customer).unwrap();
    let expected = Node::map([
        ("name", Node::from("Ada")),
        ("tags", Node::Seq(vec![Node::from("vip"), Node::from("early")])),
        (
            "home",
            Node::map([("street", Node::from("Main")), ("zip", Node::Int(1000))]),
        ),
        (
            "previous",
            Node::map([("street", Node::from("Old")), ("zip", Node::Null)]),
        ),
    ]);
    assert_eq!(node, expected);
    assert_eq!(engine.deserialize::<Customer>(&node).unwrap(), customer);
}

#[test]
fn skipped_fields_are_neither_written_nor_read() {
    let engine = Engine::builder().register::<Pair>().build();
    let node = engine.serialize(&Pair { a: 1, b: 2 }).unwrap();
    assert_eq!(node, Node::map([("a", Node::Int(1))]));

    let input = Node::map([("a", Node::Int(5)), ("b", Node::Int(9))]);
    assert_eq!(
        engine.deserialize::<Pair>(&input).unwrap(),
        Pair { a: 5, b: 42 }
    );
}

#[test]
fn explicit_creator_binds_by_name() {
    let engine = Engine::builder().register::<Point>().build();
    let input = Node::map([("y", Node::Int(2)), ("x", Node::Int(1))]);
    assert_eq!(
        engine.deserialize::<Point>(&input).unwrap(),
        Point { x: 1, y: 2 }
    );

    let descriptor = engine.descriptor_of::<Point>().unwrap();
    assert_eq!(descriptor.creator().map(|c| c.name()), Some("new"));

    let err = engine
        .deserialize::<Point>(&Node::map([("x", Node::Int(1))]))
        .unwrap_err();
    assert!(matches!(err, BindError::MissingProperty { ref name, .. } if name == "y"));
}

#[test]
fn memberwise_creator_fills_absent_options() {
    let engine = Engine::builder().register::<Memberwise>().build();
    let value: Memberwise = engine
        .deserialize(&Node::map([("id", Node::Int(3))]))
        .unwrap();
    assert_eq!(value, Memberwise { id: 3, label: None });
}

#[test]
fn renames_aliases_and_directions() {
    let engine = Engine::builder().register::<Login>().build();
    let login = Login {
        name: "root".into(),
        password: "secret".into(),
        attempts: 3,
    };
    let node = engine.serialize(&login).unwrap();
    assert_eq!(
        node,
        Node::map([("user", Node::from("root")), ("attempts", Node::Int(3))])
    );

    let input = Node::map([
        ("login", Node::from("admin")),
        ("password", Node::from("pw")),
        ("attempts", Node::Int(7)),
    ]);
    let back: Login = engine.deserialize(&input).unwrap();
    assert_eq!(
        back,
        Login {
            name: "admin".into(),
            password: "pw".into(),
            attempts: 0,
        }
    );
}

#[test]
fn enums_are_strings() {
    let engine = Engine::builder().register::<Ticket>().build();
    let ticket = Ticket {
        status: Status::OnHold,
        history: vec![Status::Active, Status::Closed],
    };
    let node = engine.serialize(&ticket).unwrap();
    assert_eq!(
        node,
        Node::map([
            ("status", Node::from("on-hold")),
            (
                "history",
                Node::Seq(vec![Node::from("Active"), Node::from("Closed")])
            ),
        ])
    );
    assert_eq!(engine.deserialize::<Ticket>(&node).unwrap(), ticket);

    let err = engine
        .deserialize::<Status>(&Node::from("Pending"))
        .unwrap_err();
    assert!(matches!(err, BindError::Malformed { .. }));
}

#[test]
fn adapters_and_methods() {
    let engine = Engine::builder().register::<Cart>().build();
    let cart = Cart {
        total: 1250,
        items: vec!["pen".into(), "ink".into()],
        discount: 0,
    };
    let node = engine.serialize(&cart).unwrap();
    assert_eq!(node.get("total"), Some(&Node::from("12.50")));
    assert_eq!(node.get("lines"), Some(&Node::Int(2)));
    assert_eq!(node.get("discount"), None);

    let input = Node::map([
        ("total", Node::from("3.05")),
        ("lines", Node::Int(99)),
        ("discount", Node::Int(10)),
    ]);
    let back: Cart = engine.deserialize(&input).unwrap();
    assert_eq!(back.total, 305);
    assert_eq!(back.discount, 10);
    assert!(back.items.is_empty());

    let err = engine
        .deserialize::<Cart>(&Node::map([("total", Node::from("3"))]))
        .unwrap_err();
    assert_eq!(err.to_string(), "at `$.total`: no decimal point");
}

#[test]
fn generic_supertypes_are_inherited() {
    let engine = Engine::builder().register::<Named<u32>>().build();
    let named = Named {
        entity: Entity { id: 7u32 },
        name: "seven".into(),
    };
    let node = engine.serialize(&named).unwrap();
    assert_eq!(
        node,
        Node::map([("id", Node::Int(7)), ("name", Node::from("seven"))])
    );
    assert_eq!(engine.deserialize::<Named<u32>>(&node).unwrap(), named);

    let descriptor = engine.descriptor_of::<Named<u32>>().unwrap();
    let id = descriptor.property("id").unwrap();
    assert_eq!(id.value_id(), TypeId::of::<u32>());
}

#[test]
fn private_fields_need_inclusion() {
    let engine = Engine::builder().register::<Profile>().build();
    let profile = Profile {
        nick: "neo".into(),
        score: 10,
        hidden: 1,
    };
    let node = engine.serialize(&profile).unwrap();
    assert_eq!(
        node,
        Node::map([("nick", Node::from("neo")), ("score", Node::Int(10))])
    );

    let engine = Engine::builder()
        .register::<Profile>()
        .include_private(true)
        .wrap_root_values(true)
        .build();
    let node = engine.serialize(&profile).unwrap();
    let inner = node.get("profile").unwrap();
    assert_eq!(inner.get("hidden"), Some(&Node::Int(1)));
    assert_eq!(engine.deserialize::<Profile>(&node).unwrap(), profile);
}

#[cfg(feature = "auto_register")]
mod auto_register {
    use core::any::TypeId;

    use vc_bind::derive::Bean;
    use vc_bind::document::Node;
    use vc_bind::engine::Engine;

    #[derive(Bean, Debug, Default, PartialEq)]
    #[bind(default, auto_register)]
    pub struct Registered {
        pub value: u8,
        pub extra: Vec<u16>,
    }

    #[test]
    fn annotated_types_are_registered() {
        let engine = Engine::builder().auto_register().build();
        assert!(engine.registry().contains(TypeId::of::<Registered>()));
        assert!(engine.registry().contains(TypeId::of::<Vec<u16>>()));

        let node = Node::map([("value", Node::Int(4))]);
        let value: Registered = engine.deserialize(&node).unwrap();
        assert_eq!(value.value, 4);
    }
}
