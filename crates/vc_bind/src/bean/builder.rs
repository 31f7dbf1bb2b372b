use alloc::borrow::Cow;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::TypeId;

use super::descriptor::{CreationStrategy, ParamBinding};
use super::{BeanDescriptor, Property};
use crate::collections::{HashMap, HashSet};
use crate::convert::PropertyAdapter;
use crate::error::BindError;
use crate::members::{
    Accessor, Creator, CreatorKind, Member, MemberKind, Mutator, PropertyOptions, Visibility,
};
use crate::registry::{OptionalOps, TypeMeta, TypeRegistry, TypeShape};
use crate::resolver::{
    DeclaringType, MemberRole, PropertyFilter, ResolverChain, Verdict, deserialization_disabled,
};
use crate::types::{MatchMode, TypeDescriptor, Upcast, matches, resolve_or_raw};
use crate::view::ViewMeta;

/// Supertype chains longer than this are treated as cycles.
const MAX_SUPERTYPE_DEPTH: usize = 32;

// -----------------------------------------------------------------------------
// Candidates

/// A member seen from the bean being described.
struct Candidate<'m> {
    member: Member,
    declaring: &'m TypeMeta,
    depth: usize,
}

/// One side of a property, with what is needed to merge competing members.
struct Side<H> {
    handle: H,
    ty: TypeDescriptor,
    depth: usize,
    kind: MemberKind,
    label: String,
}

struct Draft {
    name: String,
    aliases: Vec<String>,
    accessor: Option<Side<Accessor>>,
    mutator: Option<Side<Mutator>>,
    adapter: Option<PropertyAdapter>,
    members: Vec<&'static str>,
}

// -----------------------------------------------------------------------------
// DescriptorBuilder

/// Builds [`BeanDescriptor`]s from member tables, resolvers and filters.
pub(crate) struct DescriptorBuilder<'a> {
    registry: &'a TypeRegistry,
    resolvers: &'a ResolverChain,
    filter: &'a PropertyFilter,
    include_private: bool,
}

impl<'a> DescriptorBuilder<'a> {
    pub fn new(
        registry: &'a TypeRegistry,
        resolvers: &'a ResolverChain,
        filter: &'a PropertyFilter,
        include_private: bool,
    ) -> Self {
        Self {
            registry,
            resolvers,
            filter,
            include_private,
        }
    }

    /// Builds the descriptor of the bean `meta`, under `view` if given.
    pub fn build<'m>(
        &self,
        meta: &'m TypeMeta,
        view: Option<&'m ViewMeta>,
    ) -> Result<BeanDescriptor, BindError>
    where
        'a: 'm,
    {
        let ty = meta.descriptor();
        if meta.shape().as_bean().is_none() {
            return Err(introspection(ty, format!("a {} is not a bean", meta.shape().kind())));
        }

        let mut candidates = Vec::new();
        match view {
            None => self.collect(meta, None, 0, &mut candidates),
            Some(view) => self.collect_view(meta, view, &mut candidates)?,
        }

        let (properties, index) = self.properties(ty, candidates)?;
        let creation = match self.creation(meta, view, &properties, &index) {
            Ok(creation) => creation,
            Err(err) => CreationStrategy::Unavailable(err),
        };

        let descriptor = BeanDescriptor {
            ty: ty.clone(),
            type_id: meta.type_id(),
            view: view.map(ViewMeta::name),
            properties,
            index,
            creation,
        };

        #[cfg(all(debug_assertions, feature = "debug"))]
        log::debug!(
            "descriptor of `{}`{}: {:?}",
            descriptor.ty,
            view.map(|v| format!(" under `{}`", v.name())).unwrap_or_default(),
            descriptor
                .properties
                .iter()
                .map(|p| (p.name(), p.ty().to_string(), p.accessor.is_some(), p.mutator.is_some()))
                .collect::<Vec<_>>(),
        );

        Ok(descriptor)
    }

    // -------------------------------------------------------------------------
    // Member collection

    /// Collects the members of `meta`, supertypes first.
    fn collect<'m>(
        &self,
        meta: &'m TypeMeta,
        upcast: Option<&Upcast>,
        depth: usize,
        out: &mut Vec<Candidate<'m>>,
    ) where
        'a: 'm,
    {
        if depth > MAX_SUPERTYPE_DEPTH {
            log::warn!(
                "supertype chain of `{}` is deeper than {MAX_SUPERTYPE_DEPTH}, stopping",
                meta.descriptor()
            );
            return;
        }
        for supertype in meta.declaration().supertypes() {
            let Some(base) = self.registry.get(supertype.upcast().target()) else {
                log::warn!(
                    "supertype `{}` of `{}` is not registered, its members are skipped",
                    supertype.template(),
                    meta.descriptor()
                );
                continue;
            };
            let path = match upcast {
                Some(upcast) => upcast.then(supertype.upcast()),
                None => supertype.upcast().clone(),
            };
            self.collect(base, Some(&path), depth + 1, out);
        }
        let Some(decl) = meta.shape().as_bean() else {
            return;
        };
        for member in decl.members() {
            let member = match upcast {
                Some(upcast) => member.through(upcast),
                None => member.clone(),
            };
            out.push(Candidate {
                member,
                declaring: meta,
                depth,
            });
        }
    }

    /// Collects the members of `view`, reaching its subject from `meta`.
    fn collect_view<'m>(
        &self,
        meta: &'m TypeMeta,
        view: &'m ViewMeta,
        out: &mut Vec<Candidate<'m>>,
    ) -> Result<(), BindError>
    where
        'a: 'm,
    {
        let upcast = if view.subject_id() == meta.type_id() {
            None
        } else {
            match self.upcast_to(meta, view.subject_id(), 0) {
                Some(upcast) => Some(upcast),
                None => {
                    return Err(introspection(
                        meta.descriptor(),
                        format!(
                            "view `{}` does not apply, `{}` is not embedded",
                            view.name(),
                            view.subject()
                        ),
                    ));
                }
            }
        };
        let declaring = self.registry.get(view.subject_id()).unwrap_or(meta);
        for member in view.decl().members() {
            let member = match &upcast {
                Some(upcast) => member.through(upcast),
                None => member.clone(),
            };
            out.push(Candidate {
                member,
                declaring,
                depth: 0,
            });
        }
        Ok(())
    }

    /// Finds the upcast from `meta` to the embedded supertype `target`.
    fn upcast_to(&self, meta: &TypeMeta, target: TypeId, depth: usize) -> Option<Upcast> {
        if depth > MAX_SUPERTYPE_DEPTH {
            return None;
        }
        meta.declaration().supertypes().iter().find_map(|supertype| {
            let upcast = supertype.upcast();
            if upcast.target() == target {
                return Some(upcast.clone());
            }
            let base = self.registry.get(upcast.target())?;
            self.upcast_to(base, target, depth + 1)
                .map(|rest| upcast.then(&rest))
        })
    }

    // -------------------------------------------------------------------------
    // Properties

    /// Filter rules first, then the resolvers, then the visibility fallback.
    fn verdict(
        &self,
        name: &str,
        member: &Member,
        role: MemberRole,
        declaring: &DeclaringType<'_>,
    ) -> Verdict {
        let verdict = self.filter.decide(name);
        if verdict.is_decisive() {
            return verdict;
        }
        let verdict = self.resolvers.decide(member, role, declaring);
        if verdict.is_decisive() {
            return verdict;
        }
        if member.visibility() == Visibility::Public || self.include_private {
            Verdict::Include
        } else {
            Verdict::Exclude
        }
    }

    fn properties(
        &self,
        ty: &TypeDescriptor,
        candidates: Vec<Candidate<'_>>,
    ) -> Result<(Vec<Property>, HashMap<String, usize>), BindError> {
        let mut drafts: Vec<Draft> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::default();
        let mut disabled: HashSet<String> = HashSet::default();

        for Candidate {
            member,
            declaring,
            depth,
        } in candidates
        {
            let declaring = DeclaringType::new(declaring, depth).with_registry(self.registry);
            let resolved = self
                .resolvers
                .resolve_name(&member, &declaring)
                .unwrap_or(Cow::Borrowed(member.name()));

            let reads = member.accessor().is_some()
                && self.verdict(&resolved, &member, MemberRole::Accessor, &declaring) == Verdict::Include;
            let writes = member.mutator().is_some()
                && self.verdict(&resolved, &member, MemberRole::Mutator, &declaring) == Verdict::Include;

            let name = self.filter.renamed(resolved).into_owned();
            if deserialization_disabled(&member) {
                disabled.insert(name.clone());
            }
            if !reads && !writes {
                continue;
            }

            let member_ty = resolve_or_raw(self.registry, member.declared(), declaring.descriptor());
            let label = format!("{}::{}", declaring.descriptor(), member.name());

            let position = *positions.entry(name.clone()).or_insert_with(|| {
                drafts.push(Draft {
                    name: name.clone(),
                    aliases: Vec::new(),
                    accessor: None,
                    mutator: None,
                    adapter: None,
                    members: Vec::new(),
                });
                drafts.len() - 1
            });
            let draft = &mut drafts[position];

            if reads && let Some(accessor) = member.accessor() {
                let side = Side {
                    handle: accessor.clone(),
                    ty: member_ty.clone(),
                    depth,
                    kind: member.kind(),
                    label: label.clone(),
                };
                self.merge(ty, &name, &mut draft.accessor, side)?;
            }
            if writes && let Some(mutator) = member.mutator() {
                let side = Side {
                    handle: mutator.clone(),
                    ty: member_ty,
                    depth,
                    kind: member.kind(),
                    label,
                };
                self.merge(ty, &name, &mut draft.mutator, side)?;
            }

            if let Some(options) = member.attributes().get::<PropertyOptions>() {
                for alias in options.aliases() {
                    if !draft.aliases.iter().any(|a| a == alias) {
                        draft.aliases.push(alias.to_string());
                    }
                }
            }
            if let Some(adapter) = member.attributes().get::<PropertyAdapter>() {
                draft.adapter = Some(adapter.clone());
            }
            if !draft.members.contains(&member.name()) {
                draft.members.push(member.name());
            }
        }

        let mut properties = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let property = self.finish(ty, draft, &disabled)?;
            properties.push(property);
        }

        let mut index = HashMap::default();
        for (i, property) in properties.iter().enumerate() {
            index.insert(property.name.clone(), i);
        }
        for (i, property) in properties.iter().enumerate() {
            for alias in &property.aliases {
                index.entry(alias.clone()).or_insert(i);
            }
        }
        Ok((properties, index))
    }

    /// Keeps the preferred of two members competing for one side of a property.
    fn merge<H>(
        &self,
        ty: &TypeDescriptor,
        name: &str,
        current: &mut Option<Side<H>>,
        incoming: Side<H>,
    ) -> Result<(), BindError> {
        let Some(existing) = current else {
            *current = Some(incoming);
            return Ok(());
        };
        match self.prefer(existing, &incoming) {
            Some(true) => *current = Some(incoming),
            Some(false) => {}
            None => {
                return Err(BindError::ConflictingProperty {
                    ty: ty.to_string(),
                    name: name.into(),
                    first: existing.label.clone(),
                    second: incoming.label,
                });
            }
        }
        Ok(())
    }

    /// `Some(true)` if `incoming` replaces `existing`, `None` if neither wins.
    fn prefer<H>(&self, existing: &Side<H>, incoming: &Side<H>) -> Option<bool> {
        if existing.depth != incoming.depth {
            return Some(incoming.depth < existing.depth);
        }
        let narrower = |a: &TypeDescriptor, b: &TypeDescriptor| {
            matches(self.registry, a, b, MatchMode::Covariant)
                && !matches(self.registry, b, a, MatchMode::Covariant)
        };
        if narrower(&incoming.ty, &existing.ty) {
            return Some(true);
        }
        if narrower(&existing.ty, &incoming.ty) {
            return Some(false);
        }
        let is_method = |kind: MemberKind| kind != MemberKind::Field;
        if existing.ty == incoming.ty && is_method(existing.kind) != is_method(incoming.kind) {
            return Some(is_method(incoming.kind));
        }
        None
    }

    fn finish(
        &self,
        ty: &TypeDescriptor,
        draft: Draft,
        disabled: &HashSet<String>,
    ) -> Result<Property, BindError> {
        let Draft {
            name,
            aliases,
            accessor,
            mutator,
            adapter,
            members,
        } = draft;

        let (value_id, property_ty) = match (&accessor, &mutator) {
            (Some(read), Some(write)) => {
                if read.handle.value_id() != write.handle.value_id() {
                    return Err(BindError::ConflictingProperty {
                        ty: ty.to_string(),
                        name,
                        first: read.label.clone(),
                        second: write.label.clone(),
                    });
                }
                (read.handle.value_id(), read.ty.clone())
            }
            (Some(read), None) => (read.handle.value_id(), read.ty.clone()),
            (None, Some(write)) => (write.handle.value_id(), write.ty.clone()),
            (None, None) => {
                return Err(introspection(ty, format!("property `{name}` has no member")));
            }
        };

        if let Some(adapter) = &adapter
            && !matches(self.registry, adapter.value_type(), &property_ty, MatchMode::Strict)
        {
            return Err(introspection(
                ty,
                format!(
                    "adapter `{}` converts `{}`, property `{name}` is `{property_ty}`",
                    adapter.name(),
                    adapter.value_type(),
                ),
            ));
        }

        Ok(Property {
            deserialize_disabled: disabled.contains(&name),
            name,
            aliases,
            ty: property_ty,
            value_id,
            accessor: accessor.map(|side| side.handle),
            mutator: mutator.map(|side| side.handle),
            adapter,
            members,
        })
    }

    // -------------------------------------------------------------------------
    // Creation

    /// Picks the first viable strategy.
    ///
    /// Beans try their explicit creators, default construction, then the
    /// memberwise creator. Views try their own creators first when they
    /// describe the type itself.
    fn creation(
        &self,
        meta: &TypeMeta,
        view: Option<&ViewMeta>,
        properties: &[Property],
        index: &HashMap<String, usize>,
    ) -> Result<CreationStrategy, BindError> {
        let own: &[Creator] = match meta.shape().as_bean() {
            Some(decl) => decl.creators(),
            None => &[],
        };
        let explicit = own.iter().filter(|c| c.kind() != CreatorKind::Memberwise);
        let memberwise = own.iter().filter(|c| c.kind() == CreatorKind::Memberwise);

        let mut unresolved = Vec::new();
        let found = match view {
            Some(view) => {
                let view_creators: &[Creator] = if view.subject_id() == meta.type_id() {
                    view.decl().creators()
                } else {
                    &[]
                };
                self.first_viable(view_creators, properties, index, &mut unresolved)
                    .or_else(|| meta.default_fn().map(CreationStrategy::Default))
                    .or_else(|| {
                        self.first_viable(explicit.chain(memberwise), properties, index, &mut unresolved)
                    })
            }
            None => self
                .first_viable(explicit, properties, index, &mut unresolved)
                .or_else(|| meta.default_fn().map(CreationStrategy::Default))
                .or_else(|| self.first_viable(memberwise, properties, index, &mut unresolved)),
        };

        found.ok_or_else(|| BindError::BeanIntrospection {
            ty: meta.descriptor().to_string(),
            reason: "no viable creation strategy".into(),
            unresolved,
        })
    }

    fn first_viable<'c>(
        &self,
        creators: impl IntoIterator<Item = &'c Creator>,
        properties: &[Property],
        index: &HashMap<String, usize>,
        unresolved: &mut Vec<String>,
    ) -> Option<CreationStrategy> {
        for creator in creators {
            match self.bind_params(creator, properties, index) {
                Ok(params) => {
                    return Some(CreationStrategy::Creator {
                        creator: creator.clone(),
                        params,
                    });
                }
                Err(labels) => unresolved.extend(labels),
            }
        }
        None
    }

    /// Binds every parameter of `creator` to a property, or returns the
    /// labels of the parameters that cannot be bound.
    fn bind_params(
        &self,
        creator: &Creator,
        properties: &[Property],
        index: &HashMap<String, usize>,
    ) -> Result<Vec<ParamBinding>, Vec<String>> {
        let by_member = |name: &str| properties.iter().position(|p| p.members.contains(&name));
        let by_name = |name: &str| index.get(name).copied();

        let named: HashSet<usize> = creator
            .params()
            .iter()
            .filter_map(|param| param.name())
            .filter_map(|name| by_name(name).or_else(|| by_member(name)))
            .collect();

        let mut used = HashSet::default();
        let mut params = Vec::with_capacity(creator.params().len());
        let mut unresolved = Vec::new();

        for (i, param) in creator.params().iter().enumerate() {
            let property = match param.name() {
                Some(name) if creator.kind() == CreatorKind::Memberwise => {
                    by_member(name).or_else(|| by_name(name))
                }
                Some(name) => by_name(name).or_else(|| by_member(name)),
                None => (i < properties.len() && !named.contains(&i)).then_some(i),
            };
            let bound = property.filter(|&p| {
                let property = &properties[p];
                !property.deserialize_disabled
                    && property.value_id == param.value_id()
                    && used.insert(p)
            });
            match bound {
                Some(property) => params.push(ParamBinding {
                    property,
                    absent: self.optional_ops(param.value_id()),
                }),
                None => unresolved.push(creator.param_label(i)),
            }
        }

        if unresolved.is_empty() {
            Ok(params)
        } else {
            Err(unresolved)
        }
    }

    fn optional_ops(&self, type_id: TypeId) -> Option<OptionalOps> {
        match self.registry.get(type_id)?.shape() {
            TypeShape::Optional(ops) => Some(*ops),
            _ => None,
        }
    }
}

fn introspection(ty: &TypeDescriptor, reason: String) -> BindError {
    BindError::BeanIntrospection {
        ty: ty.to_string(),
        reason,
        unresolved: Vec::new(),
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;

    use crate::convert::{Adapter, PropertyAdapter};
    use crate::document::Node;
    use crate::engine::Engine;
    use crate::error::BindError;
    use crate::members::{BeanDecl, Creator, Member, PropertyOptions, Visibility};
    use crate::registry::{Bindable, TypeMeta, TypeShape};
    use crate::types::{GenericDecl, RawType, Shape, Supertype, TypeDescriptor, Upcast};

    macro_rules! descriptor {
        ($ty:ident) => {
            TypeDescriptor::concrete::<$ty>(
                RawType::new(concat!("tests::", stringify!($ty)), stringify!($ty)),
                [],
                Shape::Plain,
            )
        };
    }

    fn names(engine: &Engine, ty: core::any::TypeId) -> Vec<String> {
        let descriptor = engine.descriptor(ty, None).unwrap();
        descriptor.properties().iter().map(|p| p.name().to_string()).collect()
    }

    // Supertypes

    #[derive(Default)]
    struct Base {
        id: u32,
        label: String,
    }

    impl Bindable for Base {
        fn type_descriptor() -> TypeDescriptor {
            descriptor!(Base)
        }

        fn type_meta() -> TypeMeta {
            let decl = BeanDecl::new()
                .with_member(Member::field::<Base, u32>("id", |b| &b.id, |b| &mut b.id))
                .with_member(Member::field::<Base, String>("label", |b| &b.label, |b| &mut b.label));
            TypeMeta::of::<Base>(TypeShape::Bean(decl)).with_default::<Base>()
        }
    }

    #[derive(Default)]
    struct Derived {
        base: Base,
        label: String,
        extra: bool,
    }

    impl Bindable for Derived {
        fn type_descriptor() -> TypeDescriptor {
            descriptor!(Derived)
        }

        fn type_meta() -> TypeMeta {
            let decl = BeanDecl::new()
                .with_member(Member::field::<Derived, String>("label", |d| &d.label, |d| &mut d.label))
                .with_member(Member::field::<Derived, bool>("extra", |d| &d.extra, |d| &mut d.extra));
            let upcast = Upcast::new::<Derived, Base>(|d| &d.base, |d| &mut d.base);
            TypeMeta::of::<Derived>(TypeShape::Bean(decl))
                .with_declaration(
                    GenericDecl::new(Self::type_descriptor().raw())
                        .with_supertype(Supertype::new(Base::type_descriptor(), upcast)),
                )
                .with_default::<Derived>()
                .with_dependency::<Base>()
        }
    }

    #[test]
    fn supertype_members_first_derived_wins() {
        let engine = Engine::builder().register::<Derived>().build();
        assert_eq!(names(&engine, core::any::TypeId::of::<Derived>()), ["id", "label", "extra"]);

        let value = Derived {
            base: Base {
                id: 3,
                label: "base".into(),
            },
            label: "derived".into(),
            extra: true,
        };
        let node = engine.serialize(&value).unwrap();
        assert_eq!(
            node,
            Node::map([
                ("id", Node::Int(3)),
                ("label", Node::Str("derived".into())),
                ("extra", Node::Bool(true)),
            ])
        );

        let back: Derived = engine.deserialize(&node).unwrap();
        assert_eq!(back.base.id, 3);
        assert_eq!(back.label, "derived");
        assert_eq!(back.base.label, "");
        assert!(back.extra);
    }

    // Merging

    struct Clash {
        a: u8,
        b: u8,
    }

    impl Bindable for Clash {
        fn type_descriptor() -> TypeDescriptor {
            descriptor!(Clash)
        }

        fn type_meta() -> TypeMeta {
            let decl = BeanDecl::new()
                .with_member(
                    Member::field::<Clash, u8>("a", |c| &c.a, |c| &mut c.a)
                        .with_attribute(PropertyOptions::new().rename("value")),
                )
                .with_member(
                    Member::field::<Clash, u8>("b", |c| &c.b, |c| &mut c.b)
                        .with_attribute(PropertyOptions::new().rename("value")),
                );
            TypeMeta::of::<Clash>(TypeShape::Bean(decl))
        }
    }

    #[test]
    fn same_rank_members_conflict() {
        let engine = Engine::builder().register::<Clash>().build();
        let err = engine.descriptor_of::<Clash>().unwrap_err();
        assert!(matches!(&err, BindError::ConflictingProperty { name, .. } if name == "value"));

        // Cached: the same error every time.
        assert_eq!(engine.descriptor_of::<Clash>().unwrap_err(), err);
        assert!(engine.serialize(&Clash { a: 1, b: 2 }).is_err());
    }

    #[derive(Default)]
    struct Invoice {
        total: u64,
    }

    impl Invoice {
        fn total(&self) -> u64 {
            self.total * 100
        }
    }

    impl Bindable for Invoice {
        fn type_descriptor() -> TypeDescriptor {
            descriptor!(Invoice)
        }

        fn type_meta() -> TypeMeta {
            let decl = BeanDecl::new()
                .with_member(Member::field::<Invoice, u64>("total", |i| &i.total, |i| &mut i.total))
                .with_member(Member::getter::<Invoice, u64>("total", Invoice::total));
            TypeMeta::of::<Invoice>(TypeShape::Bean(decl)).with_default::<Invoice>()
        }
    }

    #[test]
    fn method_beats_field() {
        let engine = Engine::builder().register::<Invoice>().build();
        let node = engine.serialize(&Invoice { total: 2 }).unwrap();
        assert_eq!(node, Node::map([("total", Node::Int(200))]));

        let descriptor = engine.descriptor_of::<Invoice>().unwrap();
        let property = descriptor.property("total").unwrap();
        assert!(property.mutator().is_some());
        assert_eq!(property.members(), ["total"]);

        let back: Invoice = engine.deserialize(&node).unwrap();
        assert_eq!(back.total, 200);
    }

    // Visibility

    #[derive(Default)]
    struct Secret {
        name: String,
        token: String,
    }

    impl Bindable for Secret {
        fn type_descriptor() -> TypeDescriptor {
            descriptor!(Secret)
        }

        fn type_meta() -> TypeMeta {
            let decl = BeanDecl::new()
                .with_member(Member::field::<Secret, String>("name", |s| &s.name, |s| &mut s.name))
                .with_member(
                    Member::field::<Secret, String>("token", |s| &s.token, |s| &mut s.token)
                        .with_visibility(Visibility::Private),
                );
            TypeMeta::of::<Secret>(TypeShape::Bean(decl)).with_default::<Secret>()
        }
    }

    #[test]
    fn private_members_need_inclusion() {
        let id = core::any::TypeId::of::<Secret>();
        let engine = Engine::builder().register::<Secret>().build();
        assert_eq!(names(&engine, id), ["name"]);

        let engine = Engine::builder().register::<Secret>().include_private(true).build();
        assert_eq!(names(&engine, id), ["name", "token"]);

        let engine = Engine::builder().register::<Secret>().include("token").build();
        assert_eq!(names(&engine, id), ["name", "token"]);

        let engine = Engine::builder()
            .register::<Secret>()
            .include_private(true)
            .exclude("token")
            .rename("name", "login")
            .build();
        assert_eq!(names(&engine, id), ["login"]);
    }

    // Creators

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
        note: Option<String>,
    }

    impl Point {
        fn new(x: i32, y: i32, note: Option<String>) -> Self {
            Point { x, y, note }
        }
    }

    impl Bindable for Point {
        fn type_descriptor() -> TypeDescriptor {
            descriptor!(Point)
        }

        fn type_meta() -> TypeMeta {
            let decl = BeanDecl::new()
                .with_member(Member::getter::<Point, i32>("x", |p| p.x))
                .with_member(Member::getter::<Point, i32>("y", |p| p.y))
                .with_member(Member::field::<Point, Option<String>>("note", |p| &p.note, |p| &mut p.note))
                .with_creator(
                    Creator::constructor("new", Point::new).with_param_names([Some("x"), None, None]),
                );
            TypeMeta::of::<Point>(TypeShape::Bean(decl))
        }
    }

    #[test]
    fn creator_binds_by_name_and_position() {
        let engine = Engine::builder().register::<Point>().build();
        let descriptor = engine.descriptor_of::<Point>().unwrap();
        assert!(descriptor.is_creatable());
        assert_eq!(descriptor.creator().map(Creator::name), Some("new"));

        let node = Node::map([("y", Node::Int(2)), ("x", Node::Int(1))]);
        let point: Point = engine.deserialize(&node).unwrap();
        assert_eq!(point, Point::new(1, 2, None));

        let err = engine
            .deserialize::<Point>(&Node::map([("x", Node::Int(1))]))
            .unwrap_err();
        assert!(matches!(err, BindError::MissingProperty { name, .. } if name == "y"));
    }

    #[derive(Debug)]
    struct Broken {
        count: i32,
    }

    impl Bindable for Broken {
        fn type_descriptor() -> TypeDescriptor {
            descriptor!(Broken)
        }

        fn type_meta() -> TypeMeta {
            let decl = BeanDecl::new()
                .with_member(Member::field::<Broken, i32>("count", |b| &b.count, |b| &mut b.count))
                .with_creator(Creator::constructor("parse", |text: String| Broken {
                    count: text.len() as i32,
                }));
            TypeMeta::of::<Broken>(TypeShape::Bean(decl))
        }
    }

    #[test]
    fn creation_failure_is_deferred() {
        let engine = Engine::builder().register::<Broken>().build();
        let descriptor = engine.descriptor_of::<Broken>().unwrap();
        assert!(!descriptor.is_creatable());

        let node = engine.serialize(&Broken { count: 4 }).unwrap();
        assert_eq!(node, Node::map([("count", Node::Int(4))]));

        let err = engine.deserialize::<Broken>(&node).unwrap_err();
        assert!(matches!(
            &err,
            BindError::BeanIntrospection { unresolved, .. } if unresolved == &["parse#0"]
        ));
    }

    // Adapters

    struct Wide;

    impl Adapter for Wide {
        type Value = i64;
        type Adapted = String;

        fn marshal(&self, value: &i64) -> Result<String, BindError> {
            Ok(value.to_string())
        }

        fn unmarshal(&self, text: String) -> Result<i64, BindError> {
            text.parse().map_err(|_| BindError::custom("not a number"))
        }
    }

    #[derive(Default)]
    struct Narrow {
        size: u32,
    }

    impl Bindable for Narrow {
        fn type_descriptor() -> TypeDescriptor {
            descriptor!(Narrow)
        }

        fn type_meta() -> TypeMeta {
            let decl = BeanDecl::new().with_member(
                Member::field::<Narrow, u32>("size", |n| &n.size, |n| &mut n.size)
                    .with_attribute(PropertyAdapter::new(Wide)),
            );
            TypeMeta::of::<Narrow>(TypeShape::Bean(decl)).with_default::<Narrow>()
        }
    }

    #[test]
    fn adapter_type_must_match_exactly() {
        let engine = Engine::builder().register::<Narrow>().build();
        let err = engine.descriptor_of::<Narrow>().unwrap_err();
        assert!(matches!(err, BindError::BeanIntrospection { .. }));
        assert!(err.to_string().contains("`size`"));
    }
}
