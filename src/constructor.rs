use alloc::{boxed::Box, sync::Arc, vec, vec::Vec};

use crate::{
    any::{downcast, Instance, Pending, TypeInfo},
    injectable::{Implements, Injectable},
};

/// A function usable as a declared constructor: `Fn(Arc<P1>, ..., Arc<Pn>) -> T`.
///
/// Every parameter is resolved from the container as service `Pi` with the default implementation id.
pub trait Instantiator<Params>: Send + Sync + 'static {
    type Provides;

    #[must_use]
    fn parameters() -> Vec<TypeInfo>;

    /// Returns `None` if `arguments` don't match [`Self::parameters`]
    #[doc(hidden)]
    fn instantiate(&self, arguments: &[Instance]) -> Option<Self::Provides>;
}

macro_rules! impl_instantiator {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<F, T, $($ty,)*> Instantiator<($(Arc<$ty>,)*)> for F
        where
            F: Fn($(Arc<$ty>,)*) -> T + Send + Sync + 'static,
            $( $ty: ?Sized + Injectable, )*
        {
            type Provides = T;

            #[inline]
            fn parameters() -> Vec<TypeInfo> {
                vec![$( TypeInfo::of::<$ty>(), )*]
            }

            fn instantiate(&self, arguments: &[Instance]) -> Option<T> {
                let mut arguments = arguments.iter();
                $(
                    let $ty = downcast::<$ty>(arguments.next()?)?;
                )*
                if arguments.next().is_some() {
                    return None;
                }
                Some(self($($ty,)*))
            }
        }
    };
}

all_the_tuples!(impl_instantiator);

type BoxedInstantiate<T> = Box<dyn Fn(&[Instance]) -> Option<T> + Send + Sync>;

/// One declared constructor of an implementation type: its parameter types and how to call it.
///
/// # Examples
/// ```rust
/// use std::sync::Arc;
///
/// use keyed_ioc::{Constructor, Injectable, TypeInfo};
///
/// struct Bar;
///
/// impl Injectable for Bar {}
///
/// struct Foo {
///     bar: Arc<Bar>,
/// }
///
/// let constructor = Constructor::new(|bar: Arc<Bar>| Foo { bar });
/// assert_eq!(constructor.parameters(), [TypeInfo::of::<Bar>()]);
/// ```
pub struct Constructor<T> {
    parameters: Vec<TypeInfo>,
    instantiate: BoxedInstantiate<T>,
}

impl<T: 'static> Constructor<T> {
    #[must_use]
    pub fn new<Params, I>(instantiator: I) -> Self
    where
        I: Instantiator<Params, Provides = T>,
    {
        Self {
            parameters: I::parameters(),
            instantiate: Box::new(move |arguments: &[Instance]| instantiator.instantiate(arguments)),
        }
    }

    #[inline]
    #[must_use]
    pub fn parameters(&self) -> &[TypeInfo] {
        &self.parameters
    }

    #[inline]
    pub(crate) fn call(&self, arguments: &[Instance]) -> Option<T> {
        (self.instantiate)(arguments)
    }

    #[must_use]
    pub(crate) fn map<U, F>(self, f: F) -> Constructor<U>
    where
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let instantiate = self.instantiate;
        Constructor {
            parameters: self.parameters,
            instantiate: Box::new(move |arguments: &[Instance]| instantiate(arguments).map(&f)),
        }
    }
}

/// An implementation type the container can build itself, from one of its declared constructors.
///
/// Constructors are tried in the returned order, see [`Container::register`](crate::Container::register).
pub trait Constructible: Sized + Send + 'static {
    #[must_use]
    fn constructors() -> Vec<Constructor<Self>>;
}

/// Constructors of `T` producing a [`Pending`] `Box<S>`
pub(crate) fn erased_constructors<S, T>() -> Vec<Constructor<Pending>>
where
    S: ?Sized + Injectable,
    T: Constructible + Implements<S>,
{
    T::constructors()
        .into_iter()
        .map(|constructor| {
            constructor.map(|implementation: T| Box::new(<T as Implements<S>>::into_service(Box::new(implementation))) as Pending)
        })
        .collect()
}
