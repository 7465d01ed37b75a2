//! Persistence operations for the InMemory store
//!
//! This module handles serialization and file I/O for saving/loading
//! the in-memory store state to/from JSON files.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use super::{IdentityState, InMemory};
use crate::{
    Error, Result,
    backend::errors::BackendError,
    identity::{GroupId, MultipleIdentity, SingleIdentity},
};

/// The current persistence file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// Serializable form of the store. The membership index is derived and
/// rebuilt on load.
#[derive(Serialize, Deserialize)]
struct SerializableStore {
    /// File format version for compatibility checking
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    #[serde(default)]
    singles: Vec<SingleIdentity>,
    #[serde(default)]
    groups: Vec<MultipleIdentity>,
    #[serde(default)]
    next_id: u64,
}

impl SerializableStore {
    fn from_state(state: &IdentityState) -> Self {
        let mut singles: Vec<_> = state.singles.iter().cloned().collect();
        singles.sort();
        Self {
            version: PERSISTENCE_VERSION,
            singles,
            groups: state.groups.values().cloned().collect(),
            next_id: state.next_id,
        }
    }

    /// Rebuilds the in-memory state, checking the invariants a hand-edited
    /// or truncated file could break.
    fn into_state(self) -> Result<IdentityState> {
        let mut singles: HashSet<SingleIdentity> = self.singles.into_iter().collect();
        let mut groups = BTreeMap::new();
        let mut memberships = HashMap::new();

        for group in self.groups {
            let id = group.id().ok_or_else(|| BackendError::InvalidData {
                reason: "persisted group has no id".to_string(),
            })?;
            if id.get() > self.next_id {
                return Err(BackendError::InvalidData {
                    reason: format!("group id {id} is beyond next_id {}", self.next_id),
                }
                .into());
            }
            for member in group.identities() {
                if let Some(existing) = memberships.insert(member.clone(), id) {
                    return Err(BackendError::InvalidData {
                        reason: format!("{member} is a member of groups {existing} and {id}"),
                    }
                    .into());
                }
                singles.insert(member.clone());
            }
            if groups.insert(id, group).is_some() {
                return Err(BackendError::InvalidData {
                    reason: format!("duplicate group id {id}"),
                }
                .into());
            }
        }

        Ok(IdentityState {
            singles,
            groups,
            memberships,
            next_id: self.next_id,
        })
    }
}

/// Saves the entire store state to a specified file as JSON.
pub(crate) async fn save_to_file<P: AsRef<Path>>(store: &InMemory, path: P) -> Result<()> {
    let serializable = {
        let state = store.state.read().await;
        SerializableStore::from_state(&state)
    };

    let json = serde_json::to_string_pretty(&serializable)
        .map_err(|e| -> Error { BackendError::SerializationFailed { source: e }.into() })?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| -> Error { BackendError::FileIo { source: e }.into() })
}

/// Loads the store state from a specified JSON file.
///
/// If the file does not exist, a new, empty `InMemory` store is returned.
pub(crate) async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InMemory> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => {
            let serializable: SerializableStore = serde_json::from_str(&json).map_err(|e| -> Error {
                BackendError::DeserializationFailed { source: e }.into()
            })?;
            Ok(InMemory {
                state: tokio::sync::RwLock::new(serializable.into_state()?),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(InMemory::new()),
        Err(e) => Err(BackendError::FileIo { source: e }.into()),
    }
}
