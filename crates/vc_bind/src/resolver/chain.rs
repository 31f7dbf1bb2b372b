use alloc::borrow::Cow;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::collections::HashMap;
use crate::members::Member;
use crate::resolver::{DeclaringType, MemberRole, PropertyResolver, Verdict};

// -----------------------------------------------------------------------------
// ResolverChain

/// [`PropertyResolver`]s in priority order.
///
/// # Examples
///
/// ```
/// use vc_bind::members::{Ignore, Member};
/// use vc_bind::registry::{TypeMeta, TypeShape};
/// use vc_bind::resolver::{
///     ConventionResolver, DeclaringType, MemberRole, MetadataResolver, ResolverChain, Verdict,
/// };
///
/// struct Item { sku: String }
///
/// let chain = ResolverChain::new()
///     .with(MetadataResolver)
///     .with(ConventionResolver);
///
/// let meta = TypeMeta::of::<String>(TypeShape::Opaque);
/// let declaring = DeclaringType::new(&meta, 0);
/// let sku = Member::field::<Item, String>("sku", |i| &i.sku, |i| &mut i.sku);
///
/// assert_eq!(chain.decide(&sku, MemberRole::Accessor, &declaring), Verdict::Undecided);
/// let sku = sku.with_attribute(Ignore);
/// assert_eq!(chain.decide(&sku, MemberRole::Accessor, &declaring), Verdict::Exclude);
/// ```
#[derive(Clone, Default)]
pub struct ResolverChain {
    resolvers: Vec<Arc<dyn PropertyResolver>>,
}

impl ResolverChain {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a resolver with the lowest priority.
    #[inline]
    pub fn with(mut self, resolver: impl PropertyResolver) -> Self {
        self.resolvers.push(Arc::new(resolver));
        self
    }

    #[inline]
    pub(crate) fn push(&mut self, resolver: Arc<dyn PropertyResolver>) {
        self.resolvers.push(resolver);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Returns the first decisive verdict, or [`Verdict::Undecided`].
    pub fn decide(&self, member: &Member, role: MemberRole, declaring: &DeclaringType<'_>) -> Verdict {
        self.resolvers
            .iter()
            .map(|resolver| resolver.decide(member, role, declaring))
            .find(|verdict| verdict.is_decisive())
            .unwrap_or(Verdict::Undecided)
    }

    /// Returns the first name override.
    pub fn resolve_name(
        &self,
        member: &Member,
        declaring: &DeclaringType<'_>,
    ) -> Option<Cow<'static, str>> {
        self.resolvers
            .iter()
            .find_map(|resolver| resolver.resolve_name(member, declaring))
    }
}

impl fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverChain")
            .field("len", &self.resolvers.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// PropertyFilter

/// Include, exclude and rename rules over resolved property names.
///
/// Rules match the name produced by the resolvers, before renaming.
/// Exclusion wins over inclusion.
#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    rules: HashMap<String, Verdict>,
    renames: HashMap<String, String>,
}

impl PropertyFilter {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude(&mut self, name: impl Into<String>) {
        self.rules.insert(name.into(), Verdict::Exclude);
    }

    pub fn include(&mut self, name: impl Into<String>) {
        self.rules
            .entry(name.into())
            .or_insert(Verdict::Include);
    }

    pub fn rename(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.renames.insert(from.into(), to.into());
    }

    /// Returns the verdict for a resolved name.
    #[inline]
    pub fn decide(&self, name: &str) -> Verdict {
        self.rules.get(name).copied().unwrap_or(Verdict::Undecided)
    }

    /// Returns the final name of a resolved name.
    pub fn renamed(&self, name: Cow<'static, str>) -> Cow<'static, str> {
        match self.renames.get(&*name) {
            Some(to) => Cow::Owned(to.clone()),
            None => name,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.renames.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::borrow::Cow;

    use super::PropertyFilter;
    use crate::resolver::Verdict;

    #[test]
    fn exclusion_wins() {
        let mut filter = PropertyFilter::new();
        assert!(filter.is_empty());
        filter.exclude("secret");
        filter.include("secret");
        filter.include("internal");
        filter.rename("qty", "quantity");

        assert_eq!(filter.decide("secret"), Verdict::Exclude);
        assert_eq!(filter.decide("internal"), Verdict::Include);
        assert_eq!(filter.decide("other"), Verdict::Undecided);
        assert_eq!(filter.renamed(Cow::Borrowed("qty")), "quantity");
        assert_eq!(filter.renamed(Cow::Borrowed("sku")), "sku");
    }
}
