use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use std::sync::{OnceLock, RwLock};

use super::{Engine, Options};
use crate::collections::{HashMap, TypeIdMap};
use crate::convert::{
    BeanFactory, BoxedFactory, ClassMetadataFactory, Converter, ConverterFactory, EnumFactory,
    ExactFactory, MapFactory, NullSafeFactory, OptionalFactory, RootWrapFactory, ScalarFactory,
    SequenceFactory, ViewFactory,
};
use crate::registry::{Bindable, TypeRegistry};
use crate::resolver::{
    ConventionResolver, MetadataResolver, PropertyFilter, PropertyResolver, ResolverChain,
};
use crate::types::{MatchMode, matches};
use crate::view::{BeanView, View};

// -----------------------------------------------------------------------------
// Bundle

/// A reusable piece of engine configuration.
///
/// A bundle goes through the same calls as users do.
///
/// # Examples
///
/// ```
/// use vc_bind::engine::{Bundle, Engine, EngineBuilder};
///
/// /// Strict reading.
/// struct Strict;
///
/// impl Bundle for Strict {
///     fn configure(&self, builder: EngineBuilder) -> EngineBuilder {
///         builder.fail_on_unknown(true).exclude("internal")
///     }
/// }
///
/// let engine = Engine::builder().with_bundle(Strict).build();
/// assert!(engine.options().fail_on_unknown);
/// ```
pub trait Bundle {
    fn configure(&self, builder: EngineBuilder) -> EngineBuilder;
}

// -----------------------------------------------------------------------------
// EngineBuilder

/// Configures and builds an [`Engine`].
///
/// The registry starts with the scalar types, see [`TypeRegistry::new`].
///
/// Converter factories run in this order:
/// early factories, the built-in wrappers, user factories, per-type
/// converters, then the built-in terminal factories. Property resolvers run
/// in this order: [`with_resolver_first`](Self::with_resolver_first) ones,
/// [`MetadataResolver`], [`ConventionResolver`], then
/// [`with_resolver`](Self::with_resolver) ones.
pub struct EngineBuilder {
    registry: TypeRegistry,
    options: Options,
    early_factories: Vec<Arc<dyn ConverterFactory>>,
    factories: Vec<Arc<dyn ConverterFactory>>,
    converters: TypeIdMap<Arc<dyn Converter>>,
    first_resolvers: Vec<Arc<dyn PropertyResolver>>,
    resolvers: Vec<Arc<dyn PropertyResolver>>,
    filter: PropertyFilter,
    views: Vec<View>,
}

impl Default for EngineBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            registry: TypeRegistry::new(),
            options: Options::default(),
            early_factories: Vec::new(),
            factories: Vec::new(),
            converters: TypeIdMap::default(),
            first_resolvers: Vec::new(),
            resolvers: Vec::new(),
            filter: PropertyFilter::new(),
            views: Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Types

    /// Registers `T` and the types it depends on.
    #[inline]
    pub fn register<T: Bindable>(mut self) -> Self {
        self.registry.register::<T>();
        self
    }

    /// Registers every type annotated with `#[bind(auto_register)]`,
    /// see [`TypeRegistry::auto_register`].
    pub fn auto_register(mut self) -> Self {
        if !self.registry.auto_register() {
            log::warn!("automatic registration is not available on this platform");
        }
        self
    }

    /// Registers `T` and names it `alias` in class metadata.
    pub fn alias<T: Bindable>(mut self, alias: &'static str) -> Self {
        self.registry.register::<T>();
        self.registry.alias(TypeId::of::<T>(), alias);
        self
    }

    /// Makes the view `V` known, with its subject.
    ///
    /// Descriptors of known views are cached. Unknown views can still be
    /// used in calls.
    pub fn with_view<V: BeanView>(mut self) -> Self {
        if self.views.iter().all(|view| view.id() != TypeId::of::<V>()) {
            let view = View::of::<V>();
            view.meta().register(&mut self.registry);
            self.views.push(view);
        }
        self
    }

    // -------------------------------------------------------------------------
    // Converters

    /// Uses `converter` for `T` exactly, ahead of the built-in terminal factories.
    pub fn with_converter<T: Bindable>(mut self, converter: impl Converter) -> Self {
        self.registry.register::<T>();
        self.converters.insert(TypeId::of::<T>(), Arc::new(converter));
        self
    }

    /// Appends a factory after the built-in wrappers.
    pub fn with_factory(mut self, factory: impl ConverterFactory) -> Self {
        self.factories.push(Arc::new(factory));
        self
    }

    /// Appends a factory ahead of every built-in factory.
    pub fn with_early_factory(mut self, factory: impl ConverterFactory) -> Self {
        self.early_factories.push(Arc::new(factory));
        self
    }

    // -------------------------------------------------------------------------
    // Resolvers and filters

    /// Appends a resolver after the provided ones.
    pub fn with_resolver(mut self, resolver: impl PropertyResolver) -> Self {
        self.resolvers.push(Arc::new(resolver));
        self
    }

    /// Appends a resolver ahead of the provided ones.
    pub fn with_resolver_first(mut self, resolver: impl PropertyResolver) -> Self {
        self.first_resolvers.push(Arc::new(resolver));
        self
    }

    /// Excludes the properties resolved as `name`, see [`PropertyFilter`].
    pub fn exclude(mut self, name: &str) -> Self {
        self.filter.exclude(name);
        self
    }

    /// Includes the properties resolved as `name` regardless of resolvers.
    pub fn include(mut self, name: &str) -> Self {
        self.filter.include(name);
        self
    }

    /// Writes the properties resolved as `from` under `to`.
    pub fn rename(mut self, from: &str, to: &str) -> Self {
        self.filter.rename(from, to);
        self
    }

    /// Applies a [`Bundle`].
    #[inline]
    pub fn with_bundle(self, bundle: impl Bundle) -> Self {
        bundle.configure(self)
    }

    // -------------------------------------------------------------------------
    // Options

    /// Replaces every option.
    #[inline]
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// See [`Options::skip_null`].
    #[inline]
    pub fn skip_null(mut self, enabled: bool) -> Self {
        self.options.skip_null = enabled;
        self
    }

    /// See [`Options::wrap_root_values`].
    #[inline]
    pub fn wrap_root_values(mut self, enabled: bool) -> Self {
        self.options.wrap_root_values = enabled;
        self
    }

    /// See [`Options::class_metadata`].
    #[inline]
    pub fn class_metadata(mut self, enabled: bool) -> Self {
        self.options.class_metadata = enabled;
        self
    }

    /// See [`Options::lenient`].
    #[inline]
    pub fn lenient(mut self, enabled: bool) -> Self {
        self.options.lenient = enabled;
        self
    }

    /// See [`Options::fail_on_unknown`].
    #[inline]
    pub fn fail_on_unknown(mut self, enabled: bool) -> Self {
        self.options.fail_on_unknown = enabled;
        self
    }

    /// See [`Options::include_private`].
    #[inline]
    pub fn include_private(mut self, enabled: bool) -> Self {
        self.options.include_private = enabled;
        self
    }

    // -------------------------------------------------------------------------
    // Build

    /// Builds the immutable engine.
    ///
    /// Every registered type gets an empty converter slot, every bean an
    /// empty descriptor slot per applicable known view. Slots are filled on
    /// first use. Slots for other views are added on first use.
    pub fn build(self) -> Engine {
        let Self {
            registry,
            options,
            early_factories,
            factories: user_factories,
            converters,
            first_resolvers,
            resolvers: last_resolvers,
            filter,
            views,
        } = self;

        let mut factories = early_factories;
        factories.push(Arc::new(NullSafeFactory));
        factories.push(Arc::new(RootWrapFactory));
        factories.push(Arc::new(ClassMetadataFactory));
        factories.push(Arc::new(ViewFactory));
        factories.extend(user_factories);
        factories.push(Arc::new(ExactFactory::new(converters)));
        factories.push(Arc::new(EnumFactory));
        factories.push(Arc::new(ScalarFactory));
        factories.push(Arc::new(OptionalFactory));
        factories.push(Arc::new(BoxedFactory));
        factories.push(Arc::new(SequenceFactory));
        factories.push(Arc::new(MapFactory));
        factories.push(Arc::new(BeanFactory));

        let mut resolvers = ResolverChain::new();
        for resolver in first_resolvers {
            resolvers.push(resolver);
        }
        resolvers.push(Arc::new(MetadataResolver));
        resolvers.push(Arc::new(ConventionResolver));
        for resolver in last_resolvers {
            resolvers.push(resolver);
        }

        let mut converter_slots = TypeIdMap::default();
        let mut descriptor_slots = HashMap::default();
        for meta in registry.iter() {
            converter_slots.insert(meta.type_id(), OnceLock::new());
            if meta.shape().as_bean().is_none() {
                continue;
            }
            descriptor_slots.insert((meta.type_id(), None), OnceLock::new());
            for view in &views {
                let subject = view.meta().subject();
                if matches(&registry, meta.descriptor(), subject, MatchMode::Covariant) {
                    descriptor_slots.insert((meta.type_id(), Some(view.id())), OnceLock::new());
                }
            }
        }

        log::debug!(
            "engine built: {} types, {} views, {} factories, {} resolvers",
            registry.len(),
            views.len(),
            factories.len(),
            resolvers.len(),
        );

        Engine {
            registry,
            options,
            factories,
            resolvers,
            filter,
            views: views.into_iter().map(|view| (view.id(), view)).collect(),
            converters: converter_slots,
            descriptors: descriptor_slots,
            late_descriptors: RwLock::new(HashMap::default()),
        }
    }
}
