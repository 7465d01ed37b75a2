//! Binder: reconcile federated login identities into one logical user.
//!
//! A user who signs in through several OpenID Connect providers ends up with
//! several (subject, issuer) pairs. This library binds those pairs together
//! and checks whether a set of presented tokens is consistent with the
//! current bindings.
//!
//! ## Core Concepts
//!
//! * **Single identities (`identity::SingleIdentity`)**: One federated login, keyed by (subject, issuer).
//! * **Multiple identities (`identity::MultipleIdentity`)**: A group of single identities bound as one user. Each single identity belongs to at most one group.
//! * **Stores (`backend::IdentityStore`)**: A pluggable storage layer for identities and groups:
//!     * **InMemory (`backend::database::InMemory`)**: In-process maps with optional JSON persistence.
//!     * **SqlxStore (`backend::database::SqlxStore`)**: SQLite or PostgreSQL via sqlx (requires the "sqlite" or "postgres" feature).
//! * **IdentityService (`service::IdentityService`)**: Lookups, token conversion, binding and unbinding.
//! * **ConsistencyService (`service::ConsistencyService`)**: Accepts or rejects a set of presented tokens.
//!
//! Tokens are expected to be validated before they reach this library; only
//! their `sub` and `iss` claims are read.

pub mod backend;
pub mod identity;
pub mod service;

pub use identity::{AuthenticationToken, GroupId, MultipleIdentity, SingleIdentity, TokenIdentity};
pub use service::{ConsistencyService, IdentityService};

/// Result type used throughout the Binder library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Binder library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured binding errors from the identity module
    #[error(transparent)]
    Identity(identity::IdentityError),

    /// Structured storage errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Identity(_) => "identity",
            Error::Backend(_) => "backend",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a conflicting group membership.
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_conflict(),
            _ => false,
        }
    }

    /// Check if this error is storage-related.
    pub fn is_database_error(&self) -> bool {
        matches!(self, Error::Backend(_))
    }

    /// Check if this error indicates a data integrity issue.
    pub fn is_integrity_error(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_integrity_error(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Backend(backend_err) => backend_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if this error was caused by invalid caller input.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Identity(identity_err) => identity_err.is_validation_error(),
            _ => false,
        }
    }
}
