use alloc::{boxed::Box, sync::Arc};
use core::{
    any::{type_name, Any, TypeId},
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};

/// Identity of a service type: its [`TypeId`] plus the type name used in messages.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    #[inline]
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit_once("::").map_or(self.name, |(_, name)| name)
    }
}

/// A finished, shareable instance. Always holds an `Arc<S>` for the service type `S` it was resolved as.
pub(crate) type Instance = Arc<dyn Any + Send + Sync>;

/// A constructed instance that hasn't gone through property injection yet. Holds a `Box<S>`.
pub(crate) type Pending = Box<dyn Any + Send>;

#[inline]
#[must_use]
pub(crate) fn share<S>(service: Box<S>) -> Instance
where
    S: ?Sized + Send + Sync + 'static,
{
    Arc::new(Arc::<S>::from(service))
}

#[inline]
#[must_use]
pub(crate) fn downcast<S>(instance: &Instance) -> Option<Arc<S>>
where
    S: ?Sized + Send + Sync + 'static,
{
    instance.downcast_ref::<Arc<S>>().cloned()
}

#[cfg(test)]
mod tests {
    use super::{downcast, share, TypeInfo};

    use alloc::{boxed::Box, format, sync::Arc};

    trait Named: Send + Sync {
        fn name(&self) -> &'static str;
    }

    struct Alpha;

    impl Named for Alpha {
        fn name(&self) -> &'static str {
            "alpha"
        }
    }

    #[test]
    fn test_type_info_identity() {
        assert_eq!(TypeInfo::of::<Alpha>(), TypeInfo::of::<Alpha>());
        assert_ne!(TypeInfo::of::<Alpha>(), TypeInfo::of::<dyn Named>());
        assert_eq!(TypeInfo::of::<Alpha>().short_name(), "Alpha");
        assert!(format!("{}", TypeInfo::of::<Alpha>()).ends_with("Alpha"));
    }

    #[test]
    fn test_share_and_downcast_trait_object() {
        let instance = share::<dyn Named>(Box::new(Alpha));

        let named = downcast::<dyn Named>(&instance).unwrap();
        assert_eq!(named.name(), "alpha");
        assert!(downcast::<Alpha>(&instance).is_none());

        let again = downcast::<dyn Named>(&instance).unwrap();
        assert_eq!(Arc::as_ptr(&named) as *const (), Arc::as_ptr(&again) as *const ());
    }
}
