//! Error types for identity store backends.
//!
//! Structured error variants give callers the failing group or identity
//! instead of a formatted string.

use thiserror::Error;

use crate::identity::{GroupId, SingleIdentity};

/// Errors that can occur during store operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// Group not found by ID.
    #[error("Group not found: {id}")]
    GroupNotFound {
        /// The ID of the group that was not found
        id: GroupId,
    },

    /// An identity is already bound to another group.
    #[error("Identity {identity} is already bound to group {existing}")]
    MembershipConflict {
        /// The identity that would end up in two groups
        identity: SingleIdentity,
        /// The group that currently owns it
        existing: GroupId,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Stored data does not describe a valid identity state.
    #[error("Invalid stored data: {reason}")]
    InvalidData {
        /// Description of what was wrong
        reason: String,
    },

    /// SQL database error from sqlx.
    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("SQL error: {reason}")]
    SqlxError {
        /// Description including the failed operation
        reason: String,
        /// The underlying sqlx error, if any
        #[source]
        source: Option<sqlx::Error>,
    },
}

impl BackendError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::GroupNotFound { .. })
    }

    /// Check if this error is a violation of exclusive group membership.
    pub fn is_conflict(&self) -> bool {
        matches!(self, BackendError::MembershipConflict { .. })
    }

    /// Check if this error indicates a data integrity issue.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, BackendError::InvalidData { .. })
    }

    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            BackendError::FileIo { .. }
                | BackendError::SerializationFailed { .. }
                | BackendError::DeserializationFailed { .. }
        )
    }

    /// Check if this error came from the SQL layer.
    pub fn is_sql_error(&self) -> bool {
        match self {
            #[cfg(any(feature = "sqlite", feature = "postgres"))]
            BackendError::SqlxError { .. } => true,
            _ => false,
        }
    }

    /// Get the group ID if this error is about a specific group.
    pub fn group_id(&self) -> Option<GroupId> {
        match self {
            BackendError::GroupNotFound { id } => Some(*id),
            BackendError::MembershipConflict { existing, .. } => Some(*existing),
            _ => None,
        }
    }
}

// Conversion from BackendError to the main Error type
impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
