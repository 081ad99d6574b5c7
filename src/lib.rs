#![no_std]

extern crate alloc;

#[macro_use]
pub(crate) mod macros;

pub(crate) mod accessor;
pub(crate) mod any;
pub(crate) mod config;
pub(crate) mod constructor;
pub(crate) mod container;
pub(crate) mod errors;
pub(crate) mod factory;
pub(crate) mod injectable;
pub(crate) mod property;
pub(crate) mod registration;
pub(crate) mod resolver;
pub(crate) mod store;

pub use accessor::PropertyAccessor;
pub use any::TypeInfo;
pub use config::{Config, Lifecycle, DEFAULT_ID};
pub use constructor::{Constructible, Constructor, Instantiator};
pub use container::Container;
pub use errors::{PropertyErrorKind, ResolveErrorKind, StoreErrorKind};
pub use factory::{Arguments, Factory};
pub use injectable::{Implements, Injectable};
pub use property::PropertySetters;
pub use store::{AddOrUpdateStatus, KeyedStore, Release};

#[doc(hidden)]
pub mod __private {
    pub use alloc::boxed::Box;
}
