use alloc::sync::Arc;
use tracing::{debug, error, info_span};

use crate::{
    accessor::PropertyAccessor,
    any::{downcast, TypeInfo},
    config::{Config, DEFAULT_ID},
    constructor::{erased_constructors, Constructible},
    errors::{PropertyErrorKind, ResolveErrorKind},
    factory::{boxed_factory, Arguments, Factory},
    injectable::{Implements, Injectable},
    property::{PropertyInjection, PropertyInjections},
    registration::{Activator, Implementations, Registration},
    store::{AddOrUpdateStatus, KeyedStore},
};

/// Service registry and resolver.
///
/// Cloning is cheap and every clone shares the same registrations, so factories receive the resolving container itself.
/// Cached instances are released when [`Container::release`] is called or the last clone is dropped.
///
/// Two cases where a cached instance misses its release:
/// - [`Container::release`] running while a single-per-container instance is still being created on another thread.
///   The instance is cached into a registration that was already discarded.
/// - A single-per-container instance holding a clone of its container.
///   The reference cycle keeps the container alive, so dropping the other clones never releases it.
#[derive(Clone, Default)]
pub struct Container {
    pub(crate) inner: Arc<ContainerInner>,
}

#[derive(Default)]
pub(crate) struct ContainerInner {
    pub(crate) registrations: KeyedStore<TypeInfo, Implementations>,
    pub(crate) properties: KeyedStore<TypeInfo, PropertyInjections>,
}

impl Container {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` as the implementation of itself
    #[inline]
    pub fn register_self<T>(&self, config: Config) -> AddOrUpdateStatus
    where
        T: Injectable + Constructible,
    {
        self.register::<T, T>(config)
    }

    /// Registers `T` as an implementation of service `S`, built from one of its declared constructors.
    ///
    /// Among the constructors whose parameter types are all registered, the one with the most parameters is used.
    /// If there is none, the first declared constructor is.
    /// Registering the same service and implementation id again replaces the earlier registration.
    /// Its cached instance, if any, is no longer returned but is still released with the container.
    pub fn register<S, T>(&self, config: Config) -> AddOrUpdateStatus
    where
        S: ?Sized + Injectable,
        T: Constructible + Implements<S>,
    {
        self.add_registration::<S>(
            config,
            Activator::Type {
                implementation: TypeInfo::of::<T>(),
                constructors: erased_constructors::<S, T>,
            },
        )
    }

    /// Registers `factory` as the way to produce service `S`.
    ///
    /// The factory receives the container and the extra arguments passed to [`Container::get_with`],
    /// their count and types are fixed by the factory signature.
    ///
    /// # Examples
    /// ```rust
    /// use core::convert::Infallible;
    ///
    /// use keyed_ioc::{Config, Container, Injectable};
    ///
    /// struct Greeting(String);
    ///
    /// impl Injectable for Greeting {}
    ///
    /// let container = Container::new();
    /// container.register_factory::<Greeting, _, _>(
    ///     |_: &Container, name: &'static str| Ok::<_, Infallible>(Greeting(format!("Hello, {name}"))),
    ///     Config::transient(),
    /// );
    ///
    /// let greeting = container.get_with::<Greeting, _>(("world",)).unwrap();
    /// assert_eq!(greeting.0, "Hello, world");
    /// ```
    pub fn register_factory<S, Args, F>(&self, factory: F, config: Config) -> AddOrUpdateStatus
    where
        S: ?Sized + Injectable,
        F: Factory<Args>,
        F::Provides: Implements<S>,
    {
        self.add_registration::<S>(
            config,
            Activator::Factory {
                arity: F::argument_types().len(),
                factory: boxed_factory::<S, Args, F>(factory),
            },
        )
    }

    fn add_registration<S>(&self, config: Config, activator: Activator) -> AddOrUpdateStatus
    where
        S: ?Sized + Injectable,
    {
        let Config {
            lifecycle,
            implementation_id,
        } = config;
        let service = TypeInfo::of::<S>();

        let status = self.inner.registrations.add_or_update_with(
            service,
            Registration::new::<S>(lifecycle, activator),
            |registration| Implementations::with(&implementation_id, registration),
            |implementations, registration| {
                implementations.insert(&implementation_id, registration);
                true
            },
        );
        debug!(service = service.short_name(), id = %implementation_id, ?lifecycle, ?status, "Registered");
        status
    }

    /// Injects `value` into the property of `S` named by `accessor` on every resolution of `S`.
    /// Replaces a factory registered earlier for the same property.
    ///
    /// # Errors
    /// Returns [`PropertyErrorKind`] if `accessor` isn't a member access on its own parameter
    pub fn register_property_value<S, P>(&self, accessor: PropertyAccessor<'_>, value: P) -> Result<AddOrUpdateStatus, PropertyErrorKind>
    where
        S: ?Sized + Injectable,
        P: Clone + Send + Sync + 'static,
    {
        self.add_property::<S>(accessor, PropertyInjection::value(value))
    }

    /// Injects the value produced by `factory` into the property of `S` named by `accessor` on every resolution of `S`.
    /// The property is left untouched when the factory returns `Ok(None)`.
    /// Replaces a value registered earlier for the same property.
    ///
    /// # Errors
    /// Returns [`PropertyErrorKind`] if `accessor` isn't a member access on its own parameter
    pub fn register_property_factory<S, P, E, F>(&self, accessor: PropertyAccessor<'_>, factory: F) -> Result<AddOrUpdateStatus, PropertyErrorKind>
    where
        S: ?Sized + Injectable,
        P: Send + 'static,
        E: Into<anyhow::Error>,
        F: Fn(&Container) -> Result<Option<P>, E> + Send + Sync + 'static,
    {
        self.add_property::<S>(accessor, PropertyInjection::factory(factory))
    }

    fn add_property<S>(&self, accessor: PropertyAccessor<'_>, injection: PropertyInjection) -> Result<AddOrUpdateStatus, PropertyErrorKind>
    where
        S: ?Sized + Injectable,
    {
        let name = accessor.property_name().map_err(|err| {
            error!("{}", err);
            err
        })?;
        let service = TypeInfo::of::<S>();

        let status = self.inner.properties.add_or_update_with(
            service,
            injection,
            |injection| PropertyInjections::with(name, injection),
            |injections, injection| {
                injections.insert(name, injection);
                true
            },
        );
        debug!(service = service.short_name(), property = name, ?status, "Property registered");
        Ok(status)
    }

    /// Gets the default implementation of `S`
    ///
    /// # Errors
    /// See [`Container::get_named_with`]
    #[inline]
    pub fn get<S>(&self) -> Result<Arc<S>, ResolveErrorKind>
    where
        S: ?Sized + Injectable,
    {
        self.get_named_with::<S, ()>(DEFAULT_ID, ())
    }

    /// Gets the implementation of `S` registered under `id`
    ///
    /// # Errors
    /// See [`Container::get_named_with`]
    #[inline]
    pub fn get_named<S>(&self, id: &str) -> Result<Arc<S>, ResolveErrorKind>
    where
        S: ?Sized + Injectable,
    {
        self.get_named_with::<S, ()>(id, ())
    }

    /// Gets the default implementation of `S`, passing `arguments` to its factory
    ///
    /// # Errors
    /// See [`Container::get_named_with`]
    #[inline]
    pub fn get_with<S, Args>(&self, arguments: Args) -> Result<Arc<S>, ResolveErrorKind>
    where
        S: ?Sized + Injectable,
        Args: Arguments,
    {
        self.get_named_with::<S, Args>(DEFAULT_ID, arguments)
    }

    /// Gets the implementation of `S` registered under `id`, passing `arguments` to its factory.
    ///
    /// A cached single-per-container instance is returned as is, without using `arguments`.
    /// Type-based registrations ignore `arguments`.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::NotRegistered`] if `S` isn't registered at all
    /// - [`ResolveErrorKind::NoDefaultImplementation`] or [`ResolveErrorKind::NoImplementation`] if nothing is registered under `id`
    /// - [`ResolveErrorKind::ArityMismatch`] or [`ResolveErrorKind::ArgumentType`] if `arguments` don't fit the factory
    /// - [`ResolveErrorKind::Dependency`] if a constructor parameter can't be resolved
    /// - [`ResolveErrorKind::Factory`] with the error returned by a factory or property factory
    pub fn get_named_with<S, Args>(&self, id: &str, arguments: Args) -> Result<Arc<S>, ResolveErrorKind>
    where
        S: ?Sized + Injectable,
        Args: Arguments,
    {
        let service = TypeInfo::of::<S>();
        let span = info_span!("get", service = service.short_name(), id);
        let _guard = span.enter();

        let instance = self.resolve(service, id, arguments.into_list())?;
        downcast::<S>(&instance).ok_or_else(|| {
            let err = ResolveErrorKind::Instantiation { service };
            error!("{}", err);
            err
        })
    }

    #[inline]
    #[must_use]
    pub fn is_registered<S>(&self) -> bool
    where
        S: ?Sized + Injectable,
    {
        self.inner.registrations.contains_key(&TypeInfo::of::<S>())
    }

    #[must_use]
    pub fn is_registered_named<S>(&self, id: &str) -> bool
    where
        S: ?Sized + Injectable,
    {
        self.inner
            .registrations
            .read_with(&TypeInfo::of::<S>(), |implementations| implementations.contains(id))
            .unwrap_or(false)
    }

    /// Releases every cached single-per-container instance and discards all registrations.
    /// Calling it again does nothing.
    pub fn release(&self) {
        debug!("Release container");
        self.inner.registrations.release();
    }
}

impl Drop for ContainerInner {
    fn drop(&mut self) {
        self.registrations.release();
    }
}
