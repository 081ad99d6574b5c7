mod property;
mod resolve;
mod store;

pub use property::PropertyErrorKind;
pub use resolve::ResolveErrorKind;
pub use store::StoreErrorKind;
