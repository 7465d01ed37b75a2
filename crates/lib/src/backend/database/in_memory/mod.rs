//! In-memory identity store implementation
//!
//! This module provides an in-memory implementation of the `IdentityStore`
//! trait, suitable for testing, development, or small deployments that
//! persist the whole state to a JSON file.

mod persistence;

use std::any::Any;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Result;
use crate::backend::IdentityStore;
use crate::backend::errors::BackendError;
use crate::identity::{GroupId, MultipleIdentity, SingleIdentity};

/// Everything the store knows, behind one lock so `save` is a single
/// read-modify-write.
#[derive(Debug, Default)]
pub(crate) struct IdentityState {
    pub(crate) singles: HashSet<SingleIdentity>,
    pub(crate) groups: BTreeMap<GroupId, MultipleIdentity>,
    /// Membership index: identity -> owning group
    pub(crate) memberships: HashMap<SingleIdentity, GroupId>,
    pub(crate) next_id: u64,
}

impl IdentityState {
    fn allocate_id(&mut self) -> Result<GroupId> {
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| BackendError::InvalidData {
                reason: "group id counter exhausted".to_string(),
            })?;
        Ok(GroupId::new(self.next_id))
    }

    /// Rejects members already owned by a group other than `own`.
    fn check_membership(&self, group: &MultipleIdentity, own: Option<GroupId>) -> Result<()> {
        for member in group.identities() {
            if let Some(existing) = self.memberships.get(member) {
                if Some(*existing) != own {
                    return Err(BackendError::MembershipConflict {
                        identity: member.clone(),
                        existing: *existing,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}

/// A simple in-memory identity store.
///
/// Groups are kept in a `BTreeMap` ordered by id, with a membership index so
/// lookups by (subject, issuer) do not scan every group.
///
/// It provides basic persistence capabilities via `save_to_file` and
/// `load_from_file`, serializing the state to JSON.
#[derive(Debug, Default)]
pub struct InMemory {
    pub(crate) state: RwLock<IdentityState>,
}

impl InMemory {
    /// Creates a new, empty `InMemory` store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored groups.
    pub async fn group_count(&self) -> usize {
        self.state.read().await.groups.len()
    }

    /// Saves the entire store state to a specified file as JSON.
    ///
    /// # Arguments
    /// * `path` - The path to the file where the state should be saved.
    ///
    /// # Returns
    /// A `Result` indicating success or an I/O or serialization error.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads the store state from a specified JSON file.
    ///
    /// If the file does not exist, a new, empty `InMemory` store is returned.
    ///
    /// # Arguments
    /// * `path` - The path to the file from which to load the state.
    ///
    /// # Returns
    /// A `Result` containing the loaded `InMemory` store or an I/O,
    /// deserialization or integrity error.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }
}

#[async_trait]
impl IdentityStore for InMemory {
    async fn find_by_subject_and_issuer(
        &self,
        subject: &str,
        issuer: &str,
    ) -> Result<Option<SingleIdentity>> {
        let state = self.state.read().await;
        Ok(state
            .singles
            .get(&SingleIdentity::new(subject, issuer))
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<MultipleIdentity>> {
        let state = self.state.read().await;
        Ok(state.groups.values().cloned().collect())
    }

    async fn save(&self, mut group: MultipleIdentity) -> Result<MultipleIdentity> {
        let mut state = self.state.write().await;

        if let Some(id) = group.id() {
            if !state.groups.contains_key(&id) {
                return Err(BackendError::GroupNotFound { id }.into());
            }
        }
        state.check_membership(&group, group.id())?;

        let id = match group.id() {
            Some(id) => id,
            None => state.allocate_id()?,
        };

        // Members dropped since the last save become unbound
        if let Some(previous) = state.groups.remove(&id) {
            for member in previous.identities() {
                if !group.identities().contains(member) {
                    state.memberships.remove(member);
                }
            }
        }

        for member in group.identities() {
            state.singles.insert(member.clone());
            state.memberships.insert(member.clone(), id);
        }

        group.set_id(id);
        state.groups.insert(id, group.clone());
        tracing::debug!(group = %id, members = group.len(), "Saved group");
        Ok(group)
    }

    async fn save_single(&self, identity: SingleIdentity) -> Result<SingleIdentity> {
        let mut state = self.state.write().await;
        state.singles.insert(identity.clone());
        Ok(identity)
    }

    async fn list_singles(&self) -> Result<Vec<SingleIdentity>> {
        let state = self.state.read().await;
        let mut singles: Vec<_> = state.singles.iter().cloned().collect();
        singles.sort();
        Ok(singles)
    }

    async fn get_group(&self, id: GroupId) -> Result<MultipleIdentity> {
        let state = self.state.read().await;
        state
            .groups
            .get(&id)
            .cloned()
            .ok_or_else(|| BackendError::GroupNotFound { id }.into())
    }

    async fn delete_group(&self, id: GroupId) -> Result<()> {
        let mut state = self.state.write().await;
        let group = state
            .groups
            .remove(&id)
            .ok_or(BackendError::GroupNotFound { id })?;
        for member in group.identities() {
            state.memberships.remove(member);
        }
        Ok(())
    }

    async fn find_group_by_member(
        &self,
        subject: &str,
        issuer: &str,
    ) -> Result<Option<MultipleIdentity>> {
        let state = self.state.read().await;
        let key = SingleIdentity::new(subject, issuer);
        Ok(state
            .memberships
            .get(&key)
            .and_then(|id| state.groups.get(id))
            .cloned())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
