use alloc::borrow::Cow;

/// Implementation identifier used when the caller doesn't supply one.
pub const DEFAULT_ID: &str = "DEFAULT";

/// How long a resolved instance lives.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// One instance is created on first resolve and reused for the lifetime of the container.
    SinglePerContainer,
    /// A new instance is created on every resolve.
    #[default]
    Transient,
}

/// Config for a registration
/// ## Fields
/// - `lifecycle`:
///   Lifecycle of instances produced by the registration. [`Lifecycle::Transient`] by default.
/// - `implementation_id`:
///   Distinguishes several implementations of the same service type. [`DEFAULT_ID`] by default.
///
///   Registering the same service type and identifier again replaces the earlier registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub lifecycle: Lifecycle,
    pub implementation_id: Cow<'static, str>,
}

impl Default for Config {
    fn default() -> Self {
        Self::transient()
    }
}

impl Config {
    #[inline]
    #[must_use]
    pub const fn transient() -> Self {
        Self {
            lifecycle: Lifecycle::Transient,
            implementation_id: Cow::Borrowed(DEFAULT_ID),
        }
    }

    #[inline]
    #[must_use]
    pub const fn single() -> Self {
        Self {
            lifecycle: Lifecycle::SinglePerContainer,
            implementation_id: Cow::Borrowed(DEFAULT_ID),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_id(implementation_id: impl Into<Cow<'static, str>>) -> Self {
        Self::transient().id(implementation_id)
    }

    #[inline]
    #[must_use]
    pub fn id(mut self, implementation_id: impl Into<Cow<'static, str>>) -> Self {
        self.implementation_id = implementation_id.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }
}
