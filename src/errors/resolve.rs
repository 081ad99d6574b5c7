use alloc::{boxed::Box, format, string::String};

use super::PropertyErrorKind;
use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Type {service} not registered.")]
    NotRegistered { service: TypeInfo },
    #[error("Default implementation of service {service} hasn't been registered.")]
    NoDefaultImplementation { service: TypeInfo },
    #[error("Implementation ID: {id} not registered.")]
    NoImplementation { service: TypeInfo, id: String },
    #[error("Type {service} doesn't have declared constructors.")]
    NoConstructors { service: TypeInfo },
    /// A constructor parameter of `service` couldn't be resolved.
    /// Displays as the underlying failure, see [`Self::probable_cause`] for the added context.
    #[error("{source}")]
    Dependency {
        dependency: TypeInfo,
        service: TypeInfo,
        source: Box<ResolveErrorKind>,
    },
    /// The instance of a single-per-container `service` was requested again while it was being created
    #[error("Type {service} depends on itself while its instance is being created.")]
    Recursive { service: TypeInfo },
    #[error("Can't create instance of type {service}.")]
    Instantiation { service: TypeInfo },
    #[error("Factory expects {expected} argument(s), but {actual} were passed")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("Factory argument at position {position} must be of type {expected}")]
    ArgumentType { position: usize, expected: &'static str },
    #[error(transparent)]
    Property(#[from] PropertyErrorKind),
    /// Error raised by a caller-supplied factory, property factory or constructor, passed through as is
    #[error(transparent)]
    Factory(anyhow::Error),
}

impl ResolveErrorKind {
    /// Hint attached where a constructor parameter failed to resolve
    #[must_use]
    pub fn probable_cause(&self) -> Option<String> {
        match self {
            Self::Dependency { service, .. } => Some(format!("Apparently type {service} not registered.")),
            _ => None,
        }
    }

    /// Error raised by caller-supplied code, if that is what failed, looking through dependency failures
    #[must_use]
    pub fn user_error(&self) -> Option<&anyhow::Error> {
        match self {
            Self::Factory(err) => Some(err),
            Self::Dependency { source, .. } => source.user_error(),
            _ => None,
        }
    }
}
