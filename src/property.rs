use alloc::{boxed::Box, collections::BTreeMap, string::String, sync::Arc, vec::Vec};
use core::any::{type_name, Any};

use crate::{
    errors::{PropertyErrorKind, ResolveErrorKind},
    Container,
};

pub(crate) type PropertyValue = Box<dyn Any + Send>;

type BoxedSetter<S> = Box<dyn Fn(&mut S, PropertyValue) -> Result<(), PropertyErrorKind>>;

/// Writable properties declared on a service type, in declaration order.
///
/// # Examples
/// ```rust
/// use keyed_ioc::PropertySetters;
///
/// struct Calc {
///     value: i32,
/// }
///
/// let setters = PropertySetters::<Calc>::new().writable("value", |calc, value: i32| calc.value = value);
/// assert_eq!(setters.names().collect::<Vec<_>>(), ["value"]);
/// ```
pub struct PropertySetters<S: ?Sized> {
    setters: Vec<(&'static str, BoxedSetter<S>)>,
}

impl<S: ?Sized + 'static> Default for PropertySetters<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized + 'static> PropertySetters<S> {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { setters: Vec::new() }
    }

    /// Declares a writable property `name` of type `P`
    #[must_use]
    pub fn writable<P, F>(mut self, name: &'static str, setter: F) -> Self
    where
        P: 'static,
        F: Fn(&mut S, P) + 'static,
    {
        self.setters.push((
            name,
            Box::new(move |service: &mut S, value: PropertyValue| {
                let value = value.downcast::<P>().map_err(|_| PropertyErrorKind::TypeMismatch {
                    property: name,
                    expected: type_name::<P>(),
                })?;
                setter(service, *value);
                Ok(())
            }),
        ));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.setters.iter().map(|(name, _)| *name)
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.setters.is_empty()
    }

    pub(crate) fn set(&self, service: &mut S, name: &str, value: PropertyValue) -> Result<(), PropertyErrorKind> {
        match self.setters.iter().find(|(setter_name, _)| *setter_name == name) {
            Some((_, setter)) => setter(service, value),
            None => Ok(()),
        }
    }
}

type BoxedValue = Arc<dyn Fn() -> PropertyValue + Send + Sync>;
type BoxedPropertyFactory = Arc<dyn Fn(&Container) -> Result<Option<PropertyValue>, ResolveErrorKind> + Send + Sync>;

/// What gets injected into one property: a constant or a value produced on every injection
#[derive(Clone)]
pub(crate) enum PropertyInjection {
    Value(BoxedValue),
    Factory(BoxedPropertyFactory),
}

impl PropertyInjection {
    #[must_use]
    pub(crate) fn value<P>(value: P) -> Self
    where
        P: Clone + Send + Sync + 'static,
    {
        Self::Value(Arc::new(move || Box::new(value.clone()) as PropertyValue))
    }

    #[must_use]
    pub(crate) fn factory<P, E, F>(factory: F) -> Self
    where
        P: Send + 'static,
        E: Into<anyhow::Error>,
        F: Fn(&Container) -> Result<Option<P>, E> + Send + Sync + 'static,
    {
        Self::Factory(Arc::new(move |container: &Container| match factory(container) {
            Ok(value) => Ok(value.map(|value| Box::new(value) as PropertyValue)),
            Err(err) => Err(ResolveErrorKind::Factory(err.into())),
        }))
    }

    fn produce(&self, container: &Container) -> Result<Option<PropertyValue>, ResolveErrorKind> {
        match self {
            Self::Value(value) => Ok(Some(value())),
            Self::Factory(factory) => factory(container),
        }
    }
}

/// Property injections registered for one service type.
/// A property holds either a constant or a factory, registering one kind drops the other.
#[derive(Clone, Default)]
pub(crate) struct PropertyInjections {
    injections: BTreeMap<String, PropertyInjection>,
}

impl PropertyInjections {
    #[must_use]
    pub(crate) fn with(name: &str, injection: PropertyInjection) -> Self {
        let mut injections = Self::default();
        injections.insert(name, injection);
        injections
    }

    /// Returns `true` if an earlier injection for `name` was replaced
    pub(crate) fn insert(&mut self, name: &str, injection: PropertyInjection) -> bool {
        self.injections.insert(String::from(name), injection).is_some()
    }

    /// Produces the value to inject into `name`, `None` if nothing is registered or the factory declined
    pub(crate) fn produce(&self, name: &str, container: &Container) -> Result<Option<PropertyValue>, ResolveErrorKind> {
        match self.injections.get(name) {
            Some(injection) => injection.produce(container),
            None => Ok(None),
        }
    }
}
