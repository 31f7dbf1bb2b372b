//! Engine behaviour seen from a user crate: caching, wrappers, views and options.

use core::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use vc_bind::context::Context;
use vc_bind::convert::{Chain, Converter, ConverterFactory};
use vc_bind::derive::Bean;
use vc_bind::document::{DocumentReader, DocumentWriter, Node};
use vc_bind::engine::Engine;
use vc_bind::error::BindError;
use vc_bind::members::{BeanDecl, Member};
use vc_bind::registry::{Bindable, TypeMeta};
use vc_bind::types::{MatchMode, matches};
use vc_bind::view::{BeanView, ViewMeta};

// -----------------------------------------------------------------------------
// Fixtures

#[derive(Bean, Debug, Default, Clone, PartialEq)]
#[bind(default)]
pub struct Account {
    pub id: u32,
    pub name: String,
    pub secret: String,
}

#[derive(Bean, Debug, Default, Clone, PartialEq)]
#[bind(default)]
pub struct Ledger {
    pub owner: Account,
    pub balance: Option<i64>,
    pub note: Option<String>,
}

#[derive(Bean, Debug, Default, Clone, PartialEq)]
#[bind(default, root = "order")]
pub struct Order {
    pub id: u32,
    pub count: u32,
    pub price: f64,
}

#[derive(Bean, Debug, Default, Clone, PartialEq)]
#[bind(default)]
pub struct Staff {
    #[bind(extends)]
    pub account: Account,
    pub role: String,
}

#[derive(Bean, Debug, Default, Clone, PartialEq)]
#[bind(default)]
pub struct Tagged {
    #[bind(rename = "@id")]
    pub id: u32,
    #[bind(rename = "@class")]
    pub class: String,
    pub label: String,
}

/// Only the id.
pub struct Summary;

impl BeanView for Summary {
    fn view_meta() -> ViewMeta {
        ViewMeta::of::<Account>(
            BeanDecl::new().with_member(Member::field::<Account, u32>(
                "id",
                |a| &a.id,
                |a| &mut a.id,
            )),
        )
    }
}

/// Everything but the secret.
pub struct Detail;

impl BeanView for Detail {
    fn view_meta() -> ViewMeta {
        ViewMeta::of::<Account>(
            BeanDecl::new()
                .with_member(Member::field::<Account, u32>("id", |a| &a.id, |a| &mut a.id))
                .with_member(Member::field::<Account, String>(
                    "name",
                    |a| &a.name,
                    |a| &mut a.name,
                )),
        )
    }
}

/// Counts how often the chain is run for one type.
struct CountingFactory {
    target: TypeId,
    hits: Arc<AtomicUsize>,
}

impl ConverterFactory for CountingFactory {
    fn create(
        &self,
        meta: &TypeMeta,
        _: &Chain<'_>,
    ) -> Result<Option<Arc<dyn Converter>>, BindError> {
        if meta.type_id() == self.target {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
        Ok(None)
    }
}

/// Writes `Option<u8>` values, counting every call.
struct CountingConverter {
    calls: Arc<AtomicUsize>,
}

impl Converter for CountingConverter {
    fn serialize(
        &self,
        value: &dyn Any,
        writer: &mut dyn DocumentWriter,
        cx: &mut Context<'_>,
    ) -> Result<(), BindError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match value.downcast_ref::<Option<u8>>() {
            Some(Some(value)) => writer.write_i64(i64::from(*value) * 10),
            Some(None) => writer.write_str("none"),
            None => Err(BindError::mismatch::<Option<u8>>(cx.path())),
        }
    }

    fn deserialize(
        &self,
        reader: &mut dyn DocumentReader,
        _: &mut Context<'_>,
    ) -> Result<Box<dyn Any>, BindError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let value = reader.read_i64()?;
        Ok(Box::new(u8::try_from(value / 10).ok()))
    }
}

// -----------------------------------------------------------------------------
// Caching

#[test]
fn concurrent_first_use_builds_once() {
    let hits = Arc::new(AtomicUsize::new(0));
    let engine = Engine::builder()
        .register::<Account>()
        .with_early_factory(CountingFactory {
            target: TypeId::of::<Account>(),
            hits: hits.clone(),
        })
        .build();

    let converters: Vec<Arc<dyn Converter>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| engine.converter_of::<Account>().unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(converters.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[test]
fn property_order_is_stable_across_engines() {
    let names = || {
        let engine = Engine::builder().register::<Ledger>().build();
        let descriptor = engine.descriptor_of::<Ledger>().unwrap();
        descriptor
            .properties()
            .iter()
            .map(|p| p.name().to_owned())
            .collect::<Vec<_>>()
    };
    let first = names();
    assert_eq!(first, ["owner", "balance", "note"]);
    assert_eq!(first, names());
}

#[test]
fn descriptors_of_unknown_views_are_cached() {
    let engine = Engine::builder().register::<Ledger>().build();
    let summary = engine.view::<Summary>();
    let account = TypeId::of::<Account>();

    let first = engine.descriptor(account, Some(&summary)).unwrap();
    let second = engine.descriptor(account, Some(&summary)).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.properties().len(), 1);

    let detail = engine.descriptor(account, Some(&engine.view::<Detail>())).unwrap();
    assert!(!Arc::ptr_eq(&first, &detail));
    assert_eq!(detail.properties().len(), 2);

    let registered = Engine::builder()
        .register::<Ledger>()
        .with_view::<Summary>()
        .build();
    let summary = registered.view::<Summary>();
    let first = registered.descriptor(account, Some(&summary)).unwrap();
    let second = registered.descriptor(account, Some(&summary)).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

// -----------------------------------------------------------------------------
// Keys

#[test]
fn at_keys_survive_a_round_trip() {
    let engine = Engine::builder()
        .register::<BTreeMap<String, u32>>()
        .build();
    let map = BTreeMap::from([
        ("@home".to_owned(), 1),
        ("@@twice".to_owned(), 2),
        ("plain".to_owned(), 3),
    ]);
    let node = engine.serialize(&map).unwrap();
    assert_eq!(node.get("@@home"), Some(&Node::Int(1)));
    assert_eq!(engine.deserialize::<BTreeMap<String, u32>>(&node).unwrap(), map);

    let text = serde_json::to_string(&node).unwrap();
    let parsed: Node = serde_json::from_str(&text).unwrap();
    assert_eq!(engine.deserialize::<BTreeMap<String, u32>>(&parsed).unwrap(), map);
}

#[test]
fn at_properties_stay_apart_from_metadata() {
    let engine = Engine::builder()
        .register::<Tagged>()
        .class_metadata(true)
        .build();
    let tagged = Tagged {
        id: 4,
        class: "gold".into(),
        label: "x".into(),
    };
    let node = engine.serialize(&tagged).unwrap();
    assert!(node.get("@class").and_then(Node::as_str).unwrap().ends_with("Tagged"));
    assert_eq!(node.get("@@class"), Some(&Node::from("gold")));
    assert_eq!(node.get("@@id"), Some(&Node::Int(4)));
    assert_eq!(engine.deserialize::<Tagged>(&node).unwrap(), tagged);
}

// -----------------------------------------------------------------------------
// Wrappers

#[test]
fn null_never_reaches_the_wrapped_converter() {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = Engine::builder()
        .with_converter::<Option<u8>>(CountingConverter {
            calls: calls.clone(),
        })
        .build();

    assert_eq!(engine.serialize(&None::<u8>).unwrap(), Node::Null);
    assert_eq!(engine.deserialize::<Option<u8>>(&Node::Null).unwrap(), None);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert_eq!(engine.serialize(&Some(4u8)).unwrap(), Node::Int(40));
    assert_eq!(
        engine.deserialize::<Option<u8>>(&Node::Int(70)).unwrap(),
        Some(7)
    );
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn root_values_are_wrapped() {
    let engine = Engine::builder()
        .register::<Order>()
        .register::<Account>()
        .wrap_root_values(true)
        .build();
    let order = Order {
        id: 1,
        count: 2,
        price: 2.5,
    };
    let node = engine.serialize(&order).unwrap();
    assert_eq!(
        node,
        Node::map([(
            "order",
            Node::map([
                ("id", Node::Int(1)),
                ("count", Node::Int(2)),
                ("price", Node::Float(2.5)),
            ])
        )])
    );
    assert_eq!(engine.deserialize::<Order>(&node).unwrap(), order);

    let node = engine.serialize(&Account::default()).unwrap();
    assert!(node.get("account").is_some());

    let err = engine
        .deserialize::<Order>(&Node::map([("invoice", Node::map::<&str>([]))]))
        .unwrap_err();
    assert!(matches!(err, BindError::Malformed { .. }));
}

#[test]
fn class_metadata_uses_aliases() {
    let engine = Engine::builder()
        .alias::<Account>("account")
        .register::<Ledger>()
        .class_metadata(true)
        .build();
    let ledger = Ledger {
        owner: Account {
            id: 3,
            ..Account::default()
        },
        ..Ledger::default()
    };

    let node = engine.serialize(&ledger).unwrap();
    let owner = node.get("owner").unwrap();
    assert_eq!(owner.get("@class"), Some(&Node::from("account")));
    let class = node.get("@class").and_then(Node::as_str).unwrap();
    assert!(class.ends_with("Ledger"));
    assert_eq!(engine.deserialize::<Ledger>(&node).unwrap(), ledger);

    let wrong = Node::map([("@class", Node::from("other")), ("id", Node::Int(1))]);
    let err = engine.deserialize::<Account>(&wrong).unwrap_err();
    assert!(matches!(err, BindError::Malformed { .. }));
}

// -----------------------------------------------------------------------------
// Views

#[test]
fn first_applicable_view_wins() {
    let engine = Engine::builder()
        .register::<Ledger>()
        .with_view::<Summary>()
        .build();
    let account = Account {
        id: 9,
        name: "ops".into(),
        secret: "hunter2".into(),
    };

    let node = engine
        .call()
        .with_view::<Summary>()
        .with_view::<Detail>()
        .serialize(&account)
        .unwrap();
    assert_eq!(node, Node::map([("id", Node::Int(9))]));

    let node = engine
        .call()
        .with_view::<Detail>()
        .with_view::<Summary>()
        .serialize(&account)
        .unwrap();
    assert_eq!(
        node,
        Node::map([("id", Node::Int(9)), ("name", Node::from("ops"))])
    );

    // Nested beans use the view too, the ledger itself has none.
    let ledger = Ledger {
        owner: account.clone(),
        ..Ledger::default()
    };
    let node = engine.call().with_view::<Summary>().serialize(&ledger).unwrap();
    assert_eq!(node.get("owner"), Some(&Node::map([("id", Node::Int(9))])));
    assert_eq!(node.get("balance"), Some(&Node::Null));

    let full = engine.serialize(&account).unwrap();
    assert_eq!(full.get("secret"), Some(&Node::from("hunter2")));
}

#[test]
fn views_redirect_reading() {
    let engine = Engine::builder().register::<Ledger>().build();
    let input = Node::map([
        ("id", Node::Int(9)),
        ("name", Node::from("ops")),
        ("secret", Node::from("hunter2")),
    ]);

    let account: Account = engine.call().with_view::<Summary>().deserialize(&input).unwrap();
    assert_eq!(
        account,
        Account {
            id: 9,
            ..Account::default()
        }
    );

    let account: Account = engine.call().with_view::<Detail>().deserialize(&input).unwrap();
    assert_eq!(account.name, "ops");
    assert!(account.secret.is_empty());
}

#[test]
fn views_apply_to_subtypes() {
    let engine = Engine::builder().register::<Staff>().build();
    let staff = Staff {
        account: Account {
            id: 5,
            name: "ann".into(),
            secret: "s".into(),
        },
        role: "lead".into(),
    };

    let full = engine.serialize(&staff).unwrap();
    assert_eq!(full.get("role"), Some(&Node::from("lead")));
    assert_eq!(full.get("name"), Some(&Node::from("ann")));

    let node = engine.call().with_view::<Summary>().serialize(&staff).unwrap();
    assert_eq!(node, Node::map([("id", Node::Int(5))]));

    let input = Node::map([
        ("id", Node::Int(6)),
        ("name", Node::from("bob")),
        ("role", Node::from("intern")),
    ]);
    let back: Staff = engine.call().with_view::<Detail>().deserialize(&input).unwrap();
    assert_eq!(
        back,
        Staff {
            account: Account {
                id: 6,
                name: "bob".into(),
                secret: String::new(),
            },
            role: String::new(),
        }
    );
}

#[test]
fn views_reach_nested_beans_when_reading() {
    let engine = Engine::builder().register::<Ledger>().build();
    let input = Node::map([
        (
            "owner",
            Node::map([
                ("id", Node::Int(2)),
                ("name", Node::from("ops")),
                ("secret", Node::from("hunter2")),
            ]),
        ),
        ("balance", Node::Int(-30)),
        ("note", Node::from("q3")),
    ]);

    let ledger: Ledger = engine.call().with_view::<Summary>().deserialize(&input).unwrap();
    assert_eq!(
        ledger,
        Ledger {
            owner: Account {
                id: 2,
                ..Account::default()
            },
            balance: Some(-30),
            note: Some("q3".into()),
        }
    );
}

// -----------------------------------------------------------------------------
// Options

#[test]
fn lenient_reading() {
    let strict = Engine::builder().register::<Order>().build();
    let lenient = Engine::builder().register::<Order>().lenient(true).build();
    let input = Node::map([
        ("id", Node::from("12")),
        ("count", Node::Null),
        ("price", Node::from("1.5")),
    ]);

    let err = strict.deserialize::<Order>(&input).unwrap_err();
    assert!(matches!(err, BindError::Malformed { .. }));

    let order: Order = lenient.deserialize(&input).unwrap();
    assert_eq!(
        order,
        Order {
            id: 12,
            count: 0,
            price: 1.5
        }
    );

    let input = Node::map([("id", Node::Float(3.0))]);
    assert_eq!(lenient.deserialize::<Order>(&input).unwrap().id, 3);
    let input = Node::map([("id", Node::Float(3.5))]);
    assert!(lenient.deserialize::<Order>(&input).is_err());
}

#[test]
fn unknown_properties() {
    let input = Node::map([("id", Node::Int(1)), ("colour", Node::from("red"))]);

    let engine = Engine::builder().register::<Order>().build();
    assert_eq!(engine.deserialize::<Order>(&input).unwrap().id, 1);

    let engine = Engine::builder()
        .register::<Order>()
        .fail_on_unknown(true)
        .build();
    let err = engine.deserialize::<Order>(&input).unwrap_err();
    assert!(matches!(err, BindError::UnknownProperty { ref name, .. } if name == "colour"));
}

#[test]
fn null_properties_can_be_skipped() {
    let engine = Engine::builder()
        .register::<Ledger>()
        .skip_null(true)
        .build();
    let ledger = Ledger {
        note: Some("ok".into()),
        ..Ledger::default()
    };
    let node = engine.serialize(&ledger).unwrap();
    assert!(node.get("balance").is_none());
    assert_eq!(node.get("note"), Some(&Node::from("ok")));
    assert_eq!(engine.deserialize::<Ledger>(&node).unwrap(), ledger);
}

#[test]
fn filters_rename_and_exclude() {
    let engine = Engine::builder()
        .register::<Account>()
        .exclude("secret")
        .rename("name", "display")
        .build();
    let account = Account {
        id: 1,
        name: "x".into(),
        secret: "s".into(),
    };
    let node = engine.serialize(&account).unwrap();
    assert_eq!(
        node,
        Node::map([("id", Node::Int(1)), ("display", Node::from("x"))])
    );
}

// -----------------------------------------------------------------------------
// Type matching

#[test]
fn match_modes() {
    let engine = Engine::builder().register::<Vec<Account>>().build();
    let registry = engine.registry();
    let accounts = <Vec<Account>>::type_descriptor();
    let boxed = <Box<Account>>::type_descriptor();
    let account = Account::type_descriptor();

    assert!(matches(registry, &boxed, &account, MatchMode::Covariant));
    assert!(matches(registry, &boxed, &account, MatchMode::Strict));
    assert!(matches(registry, &accounts, &accounts, MatchMode::Strict));
    assert!(!matches(registry, &accounts, &account, MatchMode::Covariant));
    assert!(!matches(
        registry,
        &accounts,
        &<Vec<Ledger>>::type_descriptor(),
        MatchMode::Strict
    ));
}

#[test]
fn unregistered_types_are_reported() {
    let engine = Engine::builder().build();
    let err = engine.serialize(&Account::default()).unwrap_err();
    assert!(matches!(err, BindError::UnsupportedType { .. }));
    assert!(err.is_resolution_error());
}
