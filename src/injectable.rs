use alloc::boxed::Box;

use crate::property::PropertySetters;

/// A type that can be registered and resolved as a service.
///
/// Implemented for concrete types as well as for trait objects (`dyn ICalc`).
/// Property injection and release apply to the resolved service type.
pub trait Injectable: Send + Sync + 'static {
    /// Writable properties the container may inject after construction
    #[must_use]
    fn properties() -> PropertySetters<Self> {
        PropertySetters::new()
    }

    /// Called once for a cached singleton when its container is released
    fn release(&self) {}
}

/// A concrete type usable as an implementation of service `S`.
///
/// Every type implements itself, trait objects are covered with [`implements!`](crate::implements).
pub trait Implements<S: ?Sized>: Sized + Send + 'static {
    #[must_use]
    fn into_service(self: Box<Self>) -> Box<S>;
}

impl<T> Implements<T> for T
where
    T: Send + 'static,
{
    #[inline]
    fn into_service(self: Box<Self>) -> Box<T> {
        self
    }
}

/// Declares that concrete types implement a trait-object service.
///
/// # Examples
/// ```rust
/// use keyed_ioc::{implements, Injectable};
///
/// trait ICalc: Send + Sync {
///     fn value(&self) -> i32;
/// }
///
/// impl Injectable for dyn ICalc {}
///
/// struct CalcSimple;
///
/// impl ICalc for CalcSimple {
///     fn value(&self) -> i32 {
///         1
///     }
/// }
///
/// implements!(CalcSimple => dyn ICalc);
/// ```
#[macro_export]
macro_rules! implements {
    ($($implementation:ty),+ $(,)? => $service:ty) => {
        $(
            impl $crate::Implements<$service> for $implementation {
                #[inline]
                fn into_service(self: $crate::__private::Box<Self>) -> $crate::__private::Box<$service> {
                    self
                }
            }
        )+
    };
}
