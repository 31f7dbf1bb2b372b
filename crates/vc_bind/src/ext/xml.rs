//! XML-binding style metadata.
//!
//! [`XmlBundle`] appends [`XmlResolver`] after the native resolvers, so
//! [`PropertyOptions`](crate::members::PropertyOptions) and
//! [`Ignore`](crate::members::Ignore) still take precedence.
//!
//! ```
//! use vc_bind::document::Node;
//! use vc_bind::engine::Engine;
//! use vc_bind::ext::xml::{XmlAccessType, XmlAccessorType, XmlBundle, XmlElement};
//! use vc_bind::members::{BeanDecl, Member, Visibility};
//! use vc_bind::registry::{Bindable, TypeMeta, TypeShape};
//! use vc_bind::types::{RawType, Shape, TypeDescriptor};
//!
//! #[derive(Default)]
//! struct Order { id: u32, note: String }
//!
//! impl Bindable for Order {
//!     fn type_descriptor() -> TypeDescriptor {
//!         TypeDescriptor::concrete::<Order>(RawType::new("shop::Order", "Order"), [], Shape::Plain)
//!     }
//!     fn type_meta() -> TypeMeta {
//!         let decl = BeanDecl::new()
//!             .with_member(
//!                 Member::field::<Order, u32>("id", |o| &o.id, |o| &mut o.id)
//!                     .with_visibility(Visibility::Private)
//!                     .with_attribute(XmlElement::named("orderId")),
//!             )
//!             .with_member(
//!                 Member::field::<Order, String>("note", |o| &o.note, |o| &mut o.note)
//!                     .with_visibility(Visibility::Private),
//!             );
//!         TypeMeta::of::<Order>(TypeShape::Bean(decl))
//!             .with_default::<Order>()
//!             .with_attribute(XmlAccessorType(XmlAccessType::None))
//!     }
//! }
//!
//! let engine = Engine::builder()
//!     .with_bundle(XmlBundle::new().wrap_root_values(true))
//!     .register::<Order>()
//!     .build();
//!
//! let node = engine.serialize(&Order { id: 7, note: "fragile".into() }).unwrap();
//! assert_eq!(node, Node::map([("order", Node::map([("orderId", Node::Int(7))]))]));
//! ```

use alloc::borrow::Cow;

use crate::engine::{Bundle, EngineBuilder};
use crate::members::{Member, MemberKind, Visibility};
use crate::resolver::{DeclaringType, MemberRole, PropertyResolver, Verdict};

// -----------------------------------------------------------------------------
// Attributes

/// Excludes a member.
///
/// On a getter or setter it excludes the other half of the pair as well. On
/// a type it excludes every member holding that type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XmlTransient;

/// Binds a member as an element, optionally renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: Option<&'static str>,
}

impl XmlElement {
    #[inline]
    pub const fn new() -> Self {
        Self { name: None }
    }

    #[inline]
    pub const fn named(name: &'static str) -> Self {
        Self { name: Some(name) }
    }
}

/// Binds a member as an attribute, optionally renamed.
///
/// Documents have no attributes, the member is bound like an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XmlAttribute {
    pub name: Option<&'static str>,
}

impl XmlAttribute {
    #[inline]
    pub const fn new() -> Self {
        Self { name: None }
    }

    #[inline]
    pub const fn named(name: &'static str) -> Self {
        Self { name: Some(name) }
    }
}

/// Which unannotated members a type binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum XmlAccessType {
    /// Every field, whatever its visibility. Methods only when annotated.
    Field,
    /// Every getter and setter. Fields only when annotated.
    Property,
    /// Public fields and methods.
    #[default]
    PublicMember,
    /// Annotated members only.
    None,
}

/// The type-level [`XmlAccessType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct XmlAccessorType(pub XmlAccessType);

// -----------------------------------------------------------------------------
// XmlResolver

/// Resolves members from the XML-binding attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlResolver;

impl XmlResolver {
    fn explicit_name(member: &Member) -> Option<Option<&'static str>> {
        let attributes = member.attributes();
        if let Some(element) = attributes.get::<XmlElement>() {
            return Some(element.name);
        }
        attributes.get::<XmlAttribute>().map(|attribute| attribute.name)
    }

    fn is_transient(member: &Member, declaring: &DeclaringType<'_>) -> bool {
        if member.attributes().contains::<XmlTransient>() {
            return true;
        }
        if let Some(stem) = method_stem(member) {
            let paired = declaring.siblings().iter().any(|other| {
                other.name() != member.name()
                    && method_stem(other) == Some(stem)
                    && other.attributes().contains::<XmlTransient>()
            });
            if paired {
                return true;
            }
        }
        declaring
            .member_type(member)
            .is_some_and(|meta| meta.attributes().contains::<XmlTransient>())
    }
}

/// `b` for the methods `get_b`, `is_b` and `set_b`.
fn method_stem(member: &Member) -> Option<&'static str> {
    let name = member.name();
    let stem = match member.kind() {
        MemberKind::Field => None,
        MemberKind::Getter => name.strip_prefix("get_").or_else(|| name.strip_prefix("is_")),
        MemberKind::Setter => name.strip_prefix("set_"),
    };
    stem.filter(|stem| !stem.is_empty())
}

impl PropertyResolver for XmlResolver {
    fn decide(&self, member: &Member, _: MemberRole, declaring: &DeclaringType<'_>) -> Verdict {
        if Self::is_transient(member, declaring) {
            return Verdict::Exclude;
        }
        if Self::explicit_name(member).is_some() {
            return Verdict::Include;
        }
        let access = declaring
            .attributes()
            .get::<XmlAccessorType>()
            .map(|access| access.0)
            .unwrap_or_default();
        let is_field = member.kind() == MemberKind::Field;
        match access {
            XmlAccessType::Field if is_field => Verdict::Include,
            XmlAccessType::Property if !is_field => Verdict::Include,
            XmlAccessType::Field | XmlAccessType::Property | XmlAccessType::None => Verdict::Exclude,
            XmlAccessType::PublicMember if member.visibility() == Visibility::Public => {
                Verdict::Include
            }
            XmlAccessType::PublicMember => Verdict::Undecided,
        }
    }

    fn resolve_name(&self, member: &Member, _: &DeclaringType<'_>) -> Option<Cow<'static, str>> {
        Self::explicit_name(member).flatten().map(Cow::Borrowed)
    }
}

// -----------------------------------------------------------------------------
// XmlBundle

/// Registers [`XmlResolver`], and optionally root wrapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlBundle {
    wrap_root_values: bool,
}

impl XmlBundle {
    #[inline]
    pub const fn new() -> Self {
        Self {
            wrap_root_values: false,
        }
    }

    /// Wraps root values in an element named after the type.
    #[inline]
    pub const fn wrap_root_values(mut self, enabled: bool) -> Self {
        self.wrap_root_values = enabled;
        self
    }
}

impl Bundle for XmlBundle {
    fn configure(&self, builder: EngineBuilder) -> EngineBuilder {
        let builder = builder.with_resolver(XmlResolver);
        if self.wrap_root_values {
            builder.wrap_root_values(true)
        } else {
            builder
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::{
        XmlAccessType, XmlAccessorType, XmlAttribute, XmlBundle, XmlElement, XmlResolver,
        XmlTransient,
    };
    use crate::document::Node;
    use crate::engine::Engine;
    use crate::members::{BeanDecl, Member, Visibility};
    use crate::registry::{Bindable, TypeMeta, TypeShape};
    use crate::resolver::{DeclaringType, MemberRole, PropertyResolver, Verdict};
    use crate::types::{RawType, Shape, TypeDescriptor};

    struct Invoice {
        number: String,
    }

    impl Invoice {
        fn total(&self) -> u64 {
            self.number.len() as u64
        }
    }

    fn number() -> Member {
        Member::field::<Invoice, String>("number", |i| &i.number, |i| &mut i.number)
            .with_visibility(Visibility::Private)
    }

    fn total() -> Member {
        Member::getter::<Invoice, u64>("total", Invoice::total)
    }

    fn decide(member: &Member, access: XmlAccessType) -> Verdict {
        let meta = TypeMeta::of::<String>(TypeShape::Opaque).with_attribute(XmlAccessorType(access));
        XmlResolver.decide(member, MemberRole::Accessor, &DeclaringType::new(&meta, 0))
    }

    #[test]
    fn access_types() {
        assert_eq!(decide(&number(), XmlAccessType::Field), Verdict::Include);
        assert_eq!(decide(&total(), XmlAccessType::Field), Verdict::Exclude);
        assert_eq!(decide(&number(), XmlAccessType::Property), Verdict::Exclude);
        assert_eq!(decide(&total(), XmlAccessType::Property), Verdict::Include);
        assert_eq!(decide(&number(), XmlAccessType::PublicMember), Verdict::Undecided);
        assert_eq!(decide(&total(), XmlAccessType::PublicMember), Verdict::Include);
        assert_eq!(decide(&total(), XmlAccessType::None), Verdict::Exclude);
    }

    #[test]
    fn annotations_override_access() {
        let meta = TypeMeta::of::<String>(TypeShape::Opaque);
        let declaring = DeclaringType::new(&meta, 0);

        let renamed = number().with_attribute(XmlAttribute::named("no"));
        assert_eq!(decide(&renamed, XmlAccessType::None), Verdict::Include);
        assert_eq!(XmlResolver.resolve_name(&renamed, &declaring).as_deref(), Some("no"));

        let element = total().with_attribute(XmlElement::new());
        assert_eq!(decide(&element, XmlAccessType::Field), Verdict::Include);
        assert_eq!(XmlResolver.resolve_name(&element, &declaring), None);

        let hidden = total().with_attribute(XmlTransient);
        assert_eq!(decide(&hidden, XmlAccessType::Property), Verdict::Exclude);
    }

    #[derive(Default)]
    struct Session {
        key: u32,
    }

    impl Bindable for Session {
        fn type_descriptor() -> TypeDescriptor {
            TypeDescriptor::concrete::<Session>(RawType::new("tests::Session", "Session"), [], Shape::Plain)
        }

        fn type_meta() -> TypeMeta {
            let decl = BeanDecl::new()
                .with_member(Member::field::<Session, u32>("key", |s| &s.key, |s| &mut s.key));
            TypeMeta::of::<Session>(TypeShape::Bean(decl))
                .with_default::<Session>()
                .with_attribute(XmlTransient)
        }
    }

    #[derive(Default)]
    struct Account {
        balance: u32,
        session: Session,
        owner: String,
    }

    impl Account {
        fn get_balance(&self) -> u32 {
            self.balance
        }

        fn set_balance(&mut self, balance: u32) {
            self.balance = balance;
        }
    }

    impl Bindable for Account {
        fn type_descriptor() -> TypeDescriptor {
            TypeDescriptor::concrete::<Account>(RawType::new("tests::Account", "Account"), [], Shape::Plain)
        }

        fn type_meta() -> TypeMeta {
            let decl = BeanDecl::new()
                .with_member(Member::getter::<Account, u32>("get_balance", Account::get_balance))
                .with_member(
                    Member::setter::<Account, u32>("set_balance", Account::set_balance)
                        .with_attribute(XmlTransient),
                )
                .with_member(Member::field::<Account, Session>(
                    "session",
                    |a| &a.session,
                    |a| &mut a.session,
                ))
                .with_member(Member::field::<Account, String>("owner", |a| &a.owner, |a| &mut a.owner));
            TypeMeta::of::<Account>(TypeShape::Bean(decl)).with_default::<Account>()
        }
    }

    #[test]
    fn transient_setter_hides_its_getter() {
        let meta = Account::type_meta();
        let declaring = DeclaringType::new(&meta, 0);
        let members = declaring.siblings();
        assert_eq!(
            XmlResolver.decide(&members[0], MemberRole::Accessor, &declaring),
            Verdict::Exclude
        );
        assert_eq!(
            XmlResolver.decide(&members[3], MemberRole::Accessor, &declaring),
            Verdict::Include
        );
    }

    #[test]
    fn transient_types_and_pairs_are_not_bound() {
        let engine = Engine::builder()
            .with_bundle(XmlBundle::new())
            .register::<Account>()
            .build();
        let account = Account {
            balance: 5,
            session: Session { key: 9 },
            owner: "ann".into(),
        };
        let node = engine.serialize(&account).unwrap();
        assert_eq!(node, Node::map([("owner", Node::from("ann"))]));

        let input = Node::map([
            ("balance", Node::Int(7)),
            ("session", Node::map([("key", Node::Int(1))])),
            ("owner", Node::from("bob")),
        ]);
        let back: Account = engine.deserialize(&input).unwrap();
        assert_eq!(back.balance, 0);
        assert_eq!(back.session.key, 0);
        assert_eq!(back.owner, "bob");

        let plain = Engine::builder().register::<Account>().build();
        let node = plain.serialize(&account).unwrap();
        assert_eq!(node.get("balance"), Some(&Node::Int(5)));
        assert!(node.get("session").is_some());
    }
}
