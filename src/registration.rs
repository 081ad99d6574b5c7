use alloc::{boxed::Box, collections::BTreeMap, string::String, sync::Arc, vec::Vec};
use core::{cell::RefCell, fmt};
use parking_lot::ReentrantMutex;
use tracing::{debug, error};

use crate::{
    any::{downcast, share, Instance, Pending, TypeInfo},
    config::Lifecycle,
    constructor::Constructor,
    errors::ResolveErrorKind,
    factory::BoxedFactory,
    injectable::Injectable,
    store::Release,
    Container,
};

/// How instances of a registration are produced
pub(crate) enum Activator {
    Factory {
        arity: usize,
        factory: BoxedFactory,
    },
    Type {
        implementation: TypeInfo,
        constructors: fn() -> Vec<Constructor<Pending>>,
    },
}

impl fmt::Debug for Activator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Factory { arity, .. } => f.debug_struct("Factory").field("arity", arity).finish_non_exhaustive(),
            Self::Type { implementation, .. } => f.debug_struct("Type").field("implementation", implementation).finish_non_exhaustive(),
        }
    }
}

/// Operations typed by the service `S` of a registration, captured when it's registered
#[derive(Clone, Copy)]
pub(crate) struct ServiceHooks {
    pub(crate) inject: fn(&Container, Pending) -> Result<Pending, ResolveErrorKind>,
    pub(crate) seal: fn(Pending) -> Option<Instance>,
    pub(crate) release: fn(&Instance),
}

impl ServiceHooks {
    #[must_use]
    pub(crate) fn of<S>() -> Self
    where
        S: ?Sized + Injectable,
    {
        Self {
            inject: Container::inject_properties::<S>,
            seal: seal::<S>,
            release: release::<S>,
        }
    }
}

fn seal<S>(pending: Pending) -> Option<Instance>
where
    S: ?Sized + Injectable,
{
    pending.downcast::<Box<S>>().ok().map(|service| share(*service))
}

fn release<S>(instance: &Instance)
where
    S: ?Sized + Injectable,
{
    if let Some(service) = downcast::<S>(instance) {
        service.release();
    }
}

enum Slot {
    Empty,
    Creating,
    Cached(Instance),
}

/// Puts a slot left in [`Slot::Creating`] back to empty when creation fails or unwinds
struct ResetOnDrop<'a>(&'a RefCell<Slot>);

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        let mut slot = self.0.borrow_mut();
        if matches!(*slot, Slot::Creating) {
            *slot = Slot::Empty;
        }
    }
}

/// Everything the container knows about one (service type, implementation id) pair
pub(crate) struct Registration {
    pub(crate) service: TypeInfo,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) activator: Activator,
    pub(crate) hooks: ServiceHooks,
    cache: ReentrantMutex<RefCell<Slot>>,
}

impl Registration {
    #[must_use]
    pub(crate) fn new<S>(lifecycle: Lifecycle, activator: Activator) -> Self
    where
        S: ?Sized + Injectable,
    {
        Self {
            service: TypeInfo::of::<S>(),
            lifecycle,
            activator,
            hooks: ServiceHooks::of::<S>(),
            cache: ReentrantMutex::new(RefCell::new(Slot::Empty)),
        }
    }

    /// Returns the cached instance of a single-per-container registration, creating and caching it on the first call.
    /// Transient registrations call `create` every time.
    ///
    /// The whole check-create-cache sequence holds the record lock, so at most one instance is ever cached.
    /// Other threads wait for the creation to finish, while the creating thread asking for the same record again
    /// gets [`ResolveErrorKind::Recursive`].
    pub(crate) fn get_or_try_cache<F>(&self, create: F) -> Result<Instance, ResolveErrorKind>
    where
        F: FnOnce() -> Result<Instance, ResolveErrorKind>,
    {
        if self.lifecycle == Lifecycle::Transient {
            return create();
        }

        let guard = self.cache.lock();
        let slot: &RefCell<Slot> = &guard;
        match &*slot.borrow() {
            Slot::Cached(instance) => {
                debug!(service = %self.service, "Found in cache");
                return Ok(instance.clone());
            }
            Slot::Creating => {
                let err = ResolveErrorKind::Recursive { service: self.service };
                error!("{}", err);
                return Err(err);
            }
            Slot::Empty => {}
        }

        debug!(service = %self.service, "Not found in cache");
        *slot.borrow_mut() = Slot::Creating;
        let _reset = ResetOnDrop(slot);

        let instance = create()?;
        *slot.borrow_mut() = Slot::Cached(instance.clone());
        debug!(service = %self.service, "Cached");
        Ok(instance)
    }

    #[cfg(test)]
    pub(crate) fn cached(&self) -> Option<Instance> {
        match &*self.cache.lock().borrow() {
            Slot::Cached(instance) => Some(instance.clone()),
            _ => None,
        }
    }

    /// Releases the cached instance, if any, and empties the slot
    pub(crate) fn release(&self) {
        let guard = self.cache.lock();
        let slot = core::mem::replace(&mut *guard.borrow_mut(), Slot::Empty);
        drop(guard);
        if let Slot::Cached(instance) = slot {
            debug!(service = %self.service, "Release cached instance");
            (self.hooks.release)(&instance);
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("service", &self.service)
            .field("lifecycle", &self.lifecycle)
            .field("activator", &self.activator)
            .finish_non_exhaustive()
    }
}

/// Registrations of one service type, by implementation id.
/// Single-per-container records replaced by a later registration are kept until release, so their instances get released too.
#[derive(Clone, Default)]
pub(crate) struct Implementations {
    registrations: BTreeMap<String, Arc<Registration>>,
    retired: Vec<Arc<Registration>>,
}

impl Implementations {
    #[must_use]
    pub(crate) fn with(id: &str, registration: Registration) -> Self {
        let mut implementations = Self::default();
        implementations.insert(id, registration);
        implementations
    }

    #[must_use]
    pub(crate) fn get(&self, id: &str) -> Option<Arc<Registration>> {
        self.registrations.get(id).cloned()
    }

    #[must_use]
    pub(crate) fn contains(&self, id: &str) -> bool {
        self.registrations.contains_key(id)
    }

    /// Returns `true` if an earlier registration with the same id was replaced
    pub(crate) fn insert(&mut self, id: &str, registration: Registration) -> bool {
        match self.registrations.insert(String::from(id), Arc::new(registration)) {
            Some(replaced) => {
                if replaced.lifecycle == Lifecycle::SinglePerContainer {
                    self.retired.push(replaced);
                }
                true
            }
            None => false,
        }
    }
}

impl Release for Implementations {
    fn release(&mut self) {
        for registration in self.registrations.values().chain(&self.retired) {
            registration.release();
        }
        self.registrations.clear();
        self.retired.clear();
    }
}
