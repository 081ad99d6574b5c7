use alloc::{boxed::Box, sync::Arc, vec, vec::Vec};
use core::any::{type_name, Any};

use crate::{
    any::Pending,
    errors::ResolveErrorKind,
    injectable::{Implements, Injectable},
    Container,
};

/// One positional argument passed at resolution time
pub(crate) type Argument = Box<dyn Any + Send>;

/// Positional arguments passed to a factory at resolution time, as a tuple `(A1, ..., Ak)`
pub trait Arguments: Send + 'static {
    #[must_use]
    fn into_list(self) -> Vec<Box<dyn Any + Send>>;
}

macro_rules! impl_arguments {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<$($ty,)*> Arguments for ($($ty,)*)
        where
            $( $ty: Send + 'static, )*
        {
            #[inline]
            fn into_list(self) -> Vec<Argument> {
                let ($($ty,)*) = self;
                vec![$( Box::new($ty) as Argument, )*]
            }
        }
    };
}

all_the_tuples!(impl_arguments);

/// A factory `Fn(&Container, A1, ..., Ak) -> Result<T, E>` with `k` extra positional arguments
pub trait Factory<Args>: Send + Sync + 'static {
    type Provides;

    /// Type names of the extra arguments, its length is the factory arity
    #[must_use]
    fn argument_types() -> Vec<&'static str>;

    /// Checks the arguments against the declared ones, then calls the factory.
    /// An error returned by the factory itself is passed through as [`ResolveErrorKind::Factory`].
    #[doc(hidden)]
    fn produce(&self, container: &Container, arguments: Vec<Box<dyn Any + Send>>) -> Result<Self::Provides, ResolveErrorKind>;
}

macro_rules! impl_factory {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<F, T, E, $($ty,)*> Factory<($($ty,)*)> for F
        where
            F: Fn(&Container, $($ty,)*) -> Result<T, E> + Send + Sync + 'static,
            E: Into<anyhow::Error>,
            $( $ty: Send + 'static, )*
        {
            type Provides = T;

            #[inline]
            fn argument_types() -> Vec<&'static str> {
                vec![$( type_name::<$ty>(), )*]
            }

            fn produce(&self, container: &Container, arguments: Vec<Argument>) -> Result<T, ResolveErrorKind> {
                let expected = <Self as Factory<($($ty,)*)>>::argument_types().len();
                if arguments.len() != expected {
                    return Err(ResolveErrorKind::ArityMismatch {
                        expected,
                        actual: arguments.len(),
                    });
                }

                let mut arguments = arguments.into_iter().enumerate();
                $(
                    let $ty = match arguments.next() {
                        Some((position, argument)) => *argument.downcast::<$ty>().map_err(|_| ResolveErrorKind::ArgumentType {
                            position,
                            expected: type_name::<$ty>(),
                        })?,
                        None => return Err(ResolveErrorKind::ArityMismatch { expected, actual: 0 }),
                    };
                )*

                self(container, $($ty,)*).map_err(|err| ResolveErrorKind::Factory(err.into()))
            }
        }
    };
}

all_the_tuples!(impl_factory);

pub(crate) type BoxedFactory = Arc<dyn Fn(&Container, Vec<Argument>) -> Result<Pending, ResolveErrorKind> + Send + Sync>;

/// Erases `factory` into a [`BoxedFactory`] producing a [`Pending`] `Box<S>`
#[must_use]
pub(crate) fn boxed_factory<S, Args, F>(factory: F) -> BoxedFactory
where
    S: ?Sized + Injectable,
    F: Factory<Args>,
    F::Provides: Implements<S>,
{
    Arc::new(move |container: &Container, arguments: Vec<Argument>| {
        let provided = factory.produce(container, arguments)?;
        Ok(Box::new(<F::Provides as Implements<S>>::into_service(Box::new(provided))) as Pending)
    })
}
