#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    #[error("Key not found in store")]
    KeyNotFound,
    #[error("Key already exists in store")]
    KeyExists,
    #[error("Timed out waiting for exclusive access to store")]
    Timeout,
}
