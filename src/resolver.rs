use alloc::{boxed::Box, string::ToString as _, sync::Arc, vec::Vec};
use tracing::{debug, error, warn};

use crate::{
    any::{Instance, Pending, TypeInfo},
    config::DEFAULT_ID,
    constructor::Constructor,
    errors::ResolveErrorKind,
    factory::Argument,
    injectable::Injectable,
    registration::{Activator, Registration},
    Container,
};

#[inline]
fn fail(err: ResolveErrorKind) -> ResolveErrorKind {
    error!("{}", err);
    err
}

impl Container {
    /// Produces an instance of `service` registered under `id`, passing `arguments` to its factory
    pub(crate) fn resolve(&self, service: TypeInfo, id: &str, arguments: Vec<Argument>) -> Result<Instance, ResolveErrorKind> {
        let registration = self.registration(service, id)?;
        registration.get_or_try_cache(|| self.activate(&registration, arguments))
    }

    fn registration(&self, service: TypeInfo, id: &str) -> Result<Arc<Registration>, ResolveErrorKind> {
        match self.inner.registrations.read_with(&service, |implementations| implementations.get(id)) {
            Ok(Some(registration)) => Ok(registration),
            Ok(None) if id == DEFAULT_ID => Err(fail(ResolveErrorKind::NoDefaultImplementation { service })),
            Ok(None) => Err(fail(ResolveErrorKind::NoImplementation {
                service,
                id: id.to_string(),
            })),
            Err(_) => Err(fail(ResolveErrorKind::NotRegistered { service })),
        }
    }

    fn activate(&self, registration: &Registration, arguments: Vec<Argument>) -> Result<Instance, ResolveErrorKind> {
        let service = registration.service;
        let pending = match &registration.activator {
            Activator::Factory { arity, factory } => {
                if arguments.len() != *arity {
                    return Err(fail(ResolveErrorKind::ArityMismatch {
                        expected: *arity,
                        actual: arguments.len(),
                    }));
                }

                debug!(arity, "Call factory");
                factory(self, arguments).map_err(|err| match err {
                    ResolveErrorKind::Factory(_) => err,
                    err => fail(err),
                })?
            }
            Activator::Type {
                implementation,
                constructors,
            } => {
                if !arguments.is_empty() {
                    warn!(count = arguments.len(), "Arguments are ignored by type-based construction");
                }
                self.construct(service, *implementation, &constructors())?
            }
        };

        let pending = (registration.hooks.inject)(self, pending)?;
        (registration.hooks.seal)(pending).ok_or_else(|| fail(ResolveErrorKind::Instantiation { service }))
    }

    fn construct(&self, service: TypeInfo, implementation: TypeInfo, constructors: &[Constructor<Pending>]) -> Result<Pending, ResolveErrorKind> {
        let Some(constructor) = self.select_constructor(constructors) else {
            return Err(fail(ResolveErrorKind::NoConstructors { service }));
        };
        debug!(
            implementation = implementation.short_name(),
            parameters = constructor.parameters().len(),
            "Constructor selected"
        );

        let mut arguments = Vec::with_capacity(constructor.parameters().len());
        for dependency in constructor.parameters() {
            match self.resolve(*dependency, DEFAULT_ID, Vec::new()) {
                Ok(argument) => arguments.push(argument),
                Err(source) => {
                    let err = ResolveErrorKind::Dependency {
                        dependency: *dependency,
                        service,
                        source: Box::new(source),
                    };
                    error!(probable_cause = ?err.probable_cause(), "{}", err);
                    return Err(err);
                }
            }
        }

        constructor
            .call(&arguments)
            .ok_or_else(|| fail(ResolveErrorKind::Instantiation { service }))
    }

    /// Picks the constructor with the most parameters whose types are all registered.
    /// Falls back to the first declared one, ties keep the earlier constructor.
    fn select_constructor<'a>(&self, constructors: &'a [Constructor<Pending>]) -> Option<&'a Constructor<Pending>> {
        let mut selected = constructors.first()?;
        let mut best = 0;
        for constructor in constructors {
            let parameters = constructor.parameters();
            let resolvable = parameters
                .iter()
                .filter(|parameter| self.inner.registrations.contains_key(parameter))
                .count();
            if resolvable == parameters.len() && resolvable > best {
                selected = constructor;
                best = resolvable;
            }
        }
        Some(selected)
    }

    /// Assigns the registered values to the writable properties of `S`
    pub(crate) fn inject_properties<S>(&self, pending: Pending) -> Result<Pending, ResolveErrorKind>
    where
        S: ?Sized + Injectable,
    {
        let setters = S::properties();
        if setters.is_empty() {
            return Ok(pending);
        }

        let service = TypeInfo::of::<S>();
        let Ok(injections) = self.inner.properties.read(&service) else {
            return Ok(pending);
        };
        let mut instance = pending
            .downcast::<Box<S>>()
            .map_err(|_| fail(ResolveErrorKind::Instantiation { service }))?;

        for name in setters.names() {
            if let Some(value) = injections.produce(name, self)? {
                setters.set(&mut **instance, name, value).map_err(|err| fail(err.into()))?;
                debug!(property = name, "Property injected");
            }
        }
        Ok(instance as Pending)
    }
}
