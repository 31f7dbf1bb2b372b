use alloc::borrow::Cow;

use crate::members::{Member, MemberKind};
use crate::registry::Bindable;
use crate::resolver::{DeclaringType, MemberRole, PropertyResolver, Verdict};

/// Resolves accessor names by convention.
///
/// - `get_total` names the property `total`,
/// - `is_open` names the property `open`, for `bool` getters only,
/// - `set_total` names the property `total`.
///
/// `is_x` getters of another type and a bare `get_` are excluded.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConventionResolver;

fn returns_bool(member: &Member) -> bool {
    member
        .declared()
        .as_type()
        .is_some_and(|ty| *ty == bool::type_descriptor())
}

impl PropertyResolver for ConventionResolver {
    fn decide(&self, member: &Member, _: MemberRole, _: &DeclaringType<'_>) -> Verdict {
        if member.kind() != MemberKind::Getter {
            return Verdict::Undecided;
        }
        let name = member.name();
        if name == "get_" || (name.starts_with("is_") && !returns_bool(member)) {
            Verdict::Exclude
        } else {
            Verdict::Undecided
        }
    }

    fn resolve_name(&self, member: &Member, _: &DeclaringType<'_>) -> Option<Cow<'static, str>> {
        let name = member.name();
        let stripped = match member.kind() {
            MemberKind::Field => None,
            MemberKind::Getter => name
                .strip_prefix("get_")
                .or_else(|| name.strip_prefix("is_").filter(|_| returns_bool(member))),
            MemberKind::Setter => name.strip_prefix("set_"),
        };
        stripped.filter(|rest| !rest.is_empty()).map(Cow::Borrowed)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::ConventionResolver;
    use crate::members::Member;
    use crate::registry::{TypeMeta, TypeShape};
    use crate::resolver::{DeclaringType, MemberRole, PropertyResolver, Verdict};

    struct Door {
        open: bool,
        label: String,
    }

    impl Door {
        fn is_open(&self) -> bool {
            self.open
        }
        fn is_label(&self) -> String {
            self.label.clone()
        }
        fn get_label(&self) -> String {
            self.label.clone()
        }
        fn set_label(&mut self, label: String) {
            self.label = label;
        }
    }

    #[test]
    fn prefixes_are_stripped() {
        let meta = TypeMeta::of::<bool>(TypeShape::Opaque);
        let declaring = DeclaringType::new(&meta, 0);
        let resolver = ConventionResolver;

        let name = |m: &Member| resolver.resolve_name(m, &declaring);
        assert_eq!(name(&Member::getter::<Door, bool>("is_open", Door::is_open)).as_deref(), Some("open"));
        assert_eq!(name(&Member::getter::<Door, String>("get_label", Door::get_label)).as_deref(), Some("label"));
        assert_eq!(name(&Member::setter::<Door, String>("set_label", Door::set_label)).as_deref(), Some("label"));
        assert_eq!(name(&Member::getter::<Door, String>("is_label", Door::is_label)), None);

        let is_label = Member::getter::<Door, String>("is_label", Door::is_label);
        assert_eq!(
            resolver.decide(&is_label, MemberRole::Accessor, &declaring),
            Verdict::Exclude
        );
        let bare = Member::getter::<Door, String>("get_", Door::get_label);
        assert_eq!(resolver.decide(&bare, MemberRole::Accessor, &declaring), Verdict::Exclude);
        assert_eq!(name(&bare), None);
    }
}
