//! Who is on the other end of a connection.

/// Caller identity as resolved by [`crate::auth::TokenAuthenticator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Principal {
    /// No credentials: a physical display device.
    #[default]
    Anonymous,
    /// Logged-in staff without superuser rights.
    Staff,
    /// Logged-in superuser; may open remote shells.
    Superuser,
}

impl Principal {
    /// Returns `true` for any logged-in principal.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        !matches!(self, Self::Anonymous)
    }

    /// Returns `true` only for superusers.
    #[must_use]
    pub const fn is_superuser(self) -> bool {
        matches!(self, Self::Superuser)
    }
}
