//! Storage backends for identity records.
//!
//! This module provides the `IdentityStore` trait and its implementations.
//! The services in [`crate::service`] depend only on the trait, so the storage
//! mechanism can be swapped without touching the binding logic.

use std::any::Any;

use async_trait::async_trait;

use crate::Result;
use crate::identity::{GroupId, MultipleIdentity, SingleIdentity};

pub mod database;
pub mod errors;

pub use errors::BackendError;

/// Storage capability consumed by the identity services.
///
/// Implementations persist `SingleIdentity` records and the `MultipleIdentity`
/// groups that bind them. They are the source of truth for group identifiers
/// and are responsible for the exclusive-membership invariant: a single
/// identity belongs to at most one group, and `save` must reject a group that
/// would steal a member from another group.
///
/// Conflicting writes to the same group must be serialized by the store; the
/// services perform no locking of their own.
///
/// All store implementations must be `Send` and `Sync` to allow sharing across
/// threads, and implement `Any` to allow for downcasting if needed.
#[async_trait]
pub trait IdentityStore: Send + Sync + Any {
    /// Looks up the single identity for a (subject, issuer) pair.
    ///
    /// Returns `Ok(None)` when no such record exists.
    async fn find_by_subject_and_issuer(
        &self,
        subject: &str,
        issuer: &str,
    ) -> Result<Option<SingleIdentity>>;

    /// Returns every stored group. May be empty.
    async fn find_all(&self) -> Result<Vec<MultipleIdentity>>;

    /// Creates or updates a group.
    ///
    /// A group without an id is assigned a fresh one. Members that have no
    /// single identity record yet are recorded as well. The returned value is
    /// the persisted group and echoes every field the store does not assign.
    ///
    /// # Errors
    /// * `BackendError::MembershipConflict` if a member already belongs to a
    ///   different group.
    /// * `BackendError::GroupNotFound` if the group carries an id the store
    ///   never assigned.
    async fn save(&self, group: MultipleIdentity) -> Result<MultipleIdentity>;

    /// Records a single identity, doing nothing if it already exists.
    async fn save_single(&self, identity: SingleIdentity) -> Result<SingleIdentity>;

    /// Returns all single identity records, bound or not.
    async fn list_singles(&self) -> Result<Vec<SingleIdentity>>;

    /// Fetches a group by id.
    ///
    /// # Errors
    /// `BackendError::GroupNotFound` if no group has this id.
    async fn get_group(&self, id: GroupId) -> Result<MultipleIdentity>;

    /// Deletes a group. Its members become unbound; their single identity
    /// records are kept.
    ///
    /// # Errors
    /// `BackendError::GroupNotFound` if no group has this id.
    async fn delete_group(&self, id: GroupId) -> Result<()>;

    /// Finds the group that has (subject, issuer) as a member.
    ///
    /// The default implementation scans [`find_all`](Self::find_all).
    /// Backends that index membership should override it.
    async fn find_group_by_member(
        &self,
        subject: &str,
        issuer: &str,
    ) -> Result<Option<MultipleIdentity>> {
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .find(|group| group.contains(subject, issuer)))
    }

    /// Returns a reference to the store as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}
