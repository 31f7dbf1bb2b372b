use alloc::borrow::Cow;

use crate::members::{Ignore, Member, PropertyOptions};
use crate::resolver::{DeclaringType, MemberRole, PropertyResolver, Verdict};

/// Resolves members from their [`PropertyOptions`] and [`Ignore`] attributes.
///
/// - [`Ignore`] excludes the member in both roles.
/// - [`PropertyOptions`] includes it, except in a disabled direction,
///   and may rename it.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataResolver;

impl PropertyResolver for MetadataResolver {
    fn decide(&self, member: &Member, role: MemberRole, _: &DeclaringType<'_>) -> Verdict {
        let attributes = member.attributes();
        if attributes.contains::<Ignore>() {
            return Verdict::Exclude;
        }
        let Some(options) = attributes.get::<PropertyOptions>() else {
            return Verdict::Undecided;
        };
        let enabled = match role {
            MemberRole::Accessor => options.serializes(),
            MemberRole::Mutator => options.deserializes(),
        };
        if enabled {
            Verdict::Include
        } else {
            Verdict::Exclude
        }
    }

    fn resolve_name(&self, member: &Member, _: &DeclaringType<'_>) -> Option<Cow<'static, str>> {
        member
            .attributes()
            .get::<PropertyOptions>()
            .and_then(PropertyOptions::name)
            .map(Cow::Borrowed)
    }
}

/// Returns `true` if the attributes forbid deserializing the member.
pub(crate) fn deserialization_disabled(member: &Member) -> bool {
    let attributes = member.attributes();
    attributes.contains::<Ignore>()
        || attributes
            .get::<PropertyOptions>()
            .is_some_and(|options| !options.deserializes())
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{MetadataResolver, deserialization_disabled};
    use crate::members::{Ignore, Member, PropertyOptions};
    use crate::registry::{Bindable, TypeMeta, TypeShape};
    use crate::resolver::{DeclaringType, MemberRole, PropertyResolver, Verdict};

    struct Account {
        id: u64,
    }

    fn id() -> Member {
        Member::field::<Account, u64>("id", |a| &a.id, |a| &mut a.id)
    }

    #[test]
    fn attributes_decide() {
        let meta = TypeMeta::of::<u64>(TypeShape::Opaque);
        let declaring = DeclaringType::new(&meta, 0);
        let resolver = MetadataResolver;

        assert_eq!(
            resolver.decide(&id(), MemberRole::Accessor, &declaring),
            Verdict::Undecided
        );
        assert_eq!(
            resolver.decide(&id().with_attribute(Ignore), MemberRole::Mutator, &declaring),
            Verdict::Exclude
        );

        let read_only = id().with_attribute(PropertyOptions::new().rename("key").deserialize(false));
        assert_eq!(
            resolver.decide(&read_only, MemberRole::Accessor, &declaring),
            Verdict::Include
        );
        assert_eq!(
            resolver.decide(&read_only, MemberRole::Mutator, &declaring),
            Verdict::Exclude
        );
        assert_eq!(resolver.resolve_name(&read_only, &declaring).as_deref(), Some("key"));
        assert!(deserialization_disabled(&read_only));
        assert!(!deserialization_disabled(&id()));
        assert_eq!(u64::type_descriptor(), *declaring.descriptor());
    }
}
