//! Identity resolution and binding on top of an `IdentityStore`.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::IdentityResolver;
use crate::Result;
use crate::backend::IdentityStore;
use crate::identity::{IdentityError, MultipleIdentity, SingleIdentity, TokenIdentity};

/// Resolves single identities and merged groups, and manages binding.
///
/// The service holds no state of its own; every call goes to the injected
/// store, which is also responsible for serializing conflicting writes.
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn IdentityStore>,
}

impl IdentityService {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn IdentityStore> {
        &self.store
    }

    /// Looks up the single identity for (subject, issuer).
    ///
    /// A missing record is `Ok(None)`, not an error.
    pub async fn get_single_by_subject_issuer(
        &self,
        subject: &str,
        issuer: &str,
    ) -> Result<Option<SingleIdentity>> {
        tracing::debug!(subject, issuer, "Looking up single identity");
        self.store.find_by_subject_and_issuer(subject, issuer).await
    }

    /// Returns the group whose members include (subject, issuer).
    ///
    /// Scans every stored group. Returns `None` when the identity is unknown
    /// or exists but is not bound to any group.
    pub async fn get_multiple_by_subject_issuer(
        &self,
        subject: &str,
        issuer: &str,
    ) -> Result<Option<MultipleIdentity>> {
        let groups = self.store.find_all().await?;
        tracing::debug!(subject, issuer, groups = groups.len(), "Scanning groups");
        Ok(groups
            .into_iter()
            .find(|group| group.contains(subject, issuer)))
    }

    /// Same result as [`get_multiple_by_subject_issuer`](Self::get_multiple_by_subject_issuer)
    /// but through the store's membership index.
    pub async fn find_multiple_by_member(
        &self,
        subject: &str,
        issuer: &str,
    ) -> Result<Option<MultipleIdentity>> {
        self.store.find_group_by_member(subject, issuer).await
    }

    /// Maps a token to its canonical single identity record.
    ///
    /// The first time a (subject, issuer) pair is seen its record is created.
    pub async fn convert_token_identity<T>(&self, token: &T) -> Result<SingleIdentity>
    where
        T: TokenIdentity + Sync + ?Sized,
    {
        if let Some(existing) = self
            .store
            .find_by_subject_and_issuer(token.subject(), token.issuer())
            .await?
        {
            return Ok(existing);
        }

        let identity = SingleIdentity::from_token(token);
        tracing::info!(identity = %identity, "Registering new identity");
        self.store.save_single(identity).await
    }

    /// Persists a group, creating it if it has no id yet.
    pub async fn save_multiple_identity(&self, group: MultipleIdentity) -> Result<MultipleIdentity> {
        self.store.save(group).await
    }

    /// Removes (subject, issuer) from `group`.
    ///
    /// Returns false and leaves the group unchanged if it was not a member.
    /// Only the in-memory group is changed; save it to make this durable.
    pub fn unbind_by_subject_issuer(
        &self,
        group: &mut MultipleIdentity,
        subject: &str,
        issuer: &str,
    ) -> bool {
        let removed = group.remove(subject, issuer);
        if removed {
            tracing::info!(subject, issuer, group = ?group.id(), "Unbound identity");
        }
        removed
    }

    /// Unbinds (subject, issuer) from whatever group owns it and saves the
    /// group. Returns `None` if the identity was not bound.
    pub async fn unbind_and_save(
        &self,
        subject: &str,
        issuer: &str,
    ) -> Result<Option<MultipleIdentity>> {
        let Some(mut group) = self.store.find_group_by_member(subject, issuer).await? else {
            return Ok(None);
        };
        self.unbind_by_subject_issuer(&mut group, subject, issuer);
        Ok(Some(self.store.save(group).await?))
    }

    /// Binds the identities behind `tokens` into one group.
    ///
    /// Unbound identities join the group already owning any of the others.
    /// When the tokens span several groups they are merged into the one with
    /// the lowest id; the other groups are deleted before the merged group is
    /// saved so no identity is ever owned twice.
    ///
    /// # Errors
    /// `IdentityError::NotEnoughIdentities` if fewer than two distinct
    /// identities are presented. Nothing is written in that case.
    pub async fn bind_tokens<T>(&self, tokens: &[T]) -> Result<MultipleIdentity>
    where
        T: TokenIdentity + Sync,
    {
        let mut distinct: Vec<SingleIdentity> = Vec::with_capacity(tokens.len());
        for identity in tokens.iter().map(SingleIdentity::from_token) {
            if !distinct.contains(&identity) {
                distinct.push(identity);
            }
        }
        if distinct.len() < 2 {
            return Err(IdentityError::NotEnoughIdentities {
                count: distinct.len(),
            }
            .into());
        }

        let mut identities = Vec::with_capacity(distinct.len());
        for identity in &distinct {
            identities.push(self.convert_token_identity(identity).await?);
        }

        let mut groups = BTreeMap::new();
        for identity in &identities {
            if let Some(group) = self
                .store
                .find_group_by_member(identity.subject(), identity.issuer())
                .await?
                && let Some(id) = group.id()
            {
                groups.entry(id).or_insert(group);
            }
        }

        let mut target = match groups.pop_first() {
            Some((_, group)) => group,
            None => MultipleIdentity::new(),
        };
        for (id, absorbed) in groups {
            self.store.delete_group(id).await?;
            tracing::info!(from = %id, into = ?target.id(), "Merging groups");
            for member in absorbed.identities() {
                target.insert(member.clone());
            }
        }
        for identity in identities {
            target.insert(identity);
        }

        let saved = self.store.save(target).await?;
        tracing::info!(group = ?saved.id(), members = saved.len(), "Bound identities");
        Ok(saved)
    }
}

#[async_trait]
impl IdentityResolver for IdentityService {
    async fn resolve_group(&self, subject: &str, issuer: &str) -> Result<Option<MultipleIdentity>> {
        self.find_multiple_by_member(subject, issuer).await
    }
}
