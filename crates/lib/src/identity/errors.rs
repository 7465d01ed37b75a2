//! Error types for identity binding operations.

use thiserror::Error;

/// Errors raised by binding logic on top of the store.
///
/// Lookups never produce these: a missing identity or group is `None`.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum IdentityError {
    /// A bind needs at least two distinct identities.
    #[error("Binding requires at least two distinct identities, got {count}")]
    NotEnoughIdentities {
        /// Number of distinct identities presented
        count: usize,
    },

    /// Token shorthand could not be parsed.
    #[error("Invalid token: {reason}")]
    InvalidToken {
        /// Why the token was rejected
        reason: String,
    },
}

impl IdentityError {
    /// Check if this error was caused by invalid caller input.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            IdentityError::NotEnoughIdentities { .. } | IdentityError::InvalidToken { .. }
        )
    }

    /// Check if this error is a malformed token.
    pub fn is_invalid_token(&self) -> bool {
        matches!(self, IdentityError::InvalidToken { .. })
    }
}

impl From<IdentityError> for crate::Error {
    fn from(err: IdentityError) -> Self {
        crate::Error::Identity(err)
    }
}
