//! Consistency check for sets of presented tokens.

use std::collections::HashSet;
use std::sync::Arc;

use super::IdentityResolver;
use crate::Result;
use crate::identity::{GroupId, SingleIdentity, TokenIdentity};

/// Decides whether a set of tokens can be accepted as one coherent user.
///
/// A set is consistent when, after collapsing repeated tokens, it holds at
/// most one identity, or every identity in it is a member of the same group.
/// Groups are compared by id, never by their member lists. An identity that
/// is not bound to any group can only ever be presented on its own.
#[derive(Clone)]
pub struct ConsistencyService {
    resolver: Arc<dyn IdentityResolver>,
}

impl ConsistencyService {
    pub fn new(resolver: Arc<dyn IdentityResolver>) -> Self {
        Self { resolver }
    }

    /// Returns true if `tokens` do not contradict the current bindings.
    ///
    /// Reads the binding state once per distinct token and never mutates it.
    /// Stops at the first token that breaks consistency.
    pub async fn is_consistent<T>(&self, tokens: &[T]) -> Result<bool>
    where
        T: TokenIdentity + Sync,
    {
        let mut seen = HashSet::with_capacity(tokens.len());
        let distinct: Vec<SingleIdentity> = tokens
            .iter()
            .map(SingleIdentity::from_token)
            .filter(|identity| seen.insert(identity.clone()))
            .collect();

        if distinct.len() <= 1 {
            return Ok(true);
        }

        let mut common: Option<GroupId> = None;
        for identity in &distinct {
            let group = self
                .resolver
                .resolve_group(identity.subject(), identity.issuer())
                .await?;

            let Some(id) = group.and_then(|g| g.id()) else {
                tracing::info!(identity = %identity, "Rejecting token set: identity is not bound");
                return Ok(false);
            };

            match common {
                None => common = Some(id),
                Some(expected) if expected == id => {}
                Some(expected) => {
                    tracing::info!(
                        identity = %identity,
                        group = %id,
                        expected = %expected,
                        "Rejecting token set: identities belong to different groups"
                    );
                    return Ok(false);
                }
            }
        }

        tracing::debug!(tokens = distinct.len(), group = ?common, "Token set is consistent");
        Ok(true)
    }
}
