//! Identity data model.
//!
//! A [`SingleIdentity`] is one federated login, keyed by the (subject, issuer)
//! pair of the token that produced it. A [`MultipleIdentity`] groups several
//! single identities that belong to the same real-world user. Each single
//! identity is a member of at most one group at a time; stores enforce that
//! when a group is saved.

mod errors;
mod id;
mod token;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

pub use errors::IdentityError;
pub use id::GroupId;
pub use token::{AuthenticationToken, TokenIdentity};

/// One federated login identity.
///
/// Equality and hashing are by the (subject, issuer) pair, which is unique
/// across the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SingleIdentity {
    subject: String,
    issuer: String,
}

impl SingleIdentity {
    pub fn new(subject: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            issuer: issuer.into(),
        }
    }

    /// Builds the identity a token refers to.
    pub fn from_token<T: TokenIdentity + ?Sized>(token: &T) -> Self {
        Self::new(token.subject(), token.issuer())
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns true if this identity has the given subject and issuer.
    pub fn matches(&self, subject: &str, issuer: &str) -> bool {
        self.subject == subject && self.issuer == issuer
    }
}

impl TokenIdentity for SingleIdentity {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn issuer(&self) -> &str {
        &self.issuer
    }
}

impl std::fmt::Display for SingleIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.subject, self.issuer)
    }
}

/// A group of single identities bound together as one logical user.
///
/// The `id` stays `None` until the group is first saved; the store assigns it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MultipleIdentity {
    id: Option<GroupId>,
    identities: HashSet<SingleIdentity>,
}

impl MultipleIdentity {
    /// Creates an unsaved, empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unsaved group with the given members.
    pub fn with_identities(identities: impl IntoIterator<Item = SingleIdentity>) -> Self {
        Self {
            id: None,
            identities: identities.into_iter().collect(),
        }
    }

    /// The store-assigned identifier, if the group has been saved.
    pub fn id(&self) -> Option<GroupId> {
        self.id
    }

    /// Sets the identifier. Stores call this when persisting a new group.
    pub fn set_id(&mut self, id: GroupId) {
        self.id = Some(id);
    }

    pub fn identities(&self) -> &HashSet<SingleIdentity> {
        &self.identities
    }

    /// Members in a stable order, for display and serialization to users.
    pub fn sorted_identities(&self) -> Vec<&SingleIdentity> {
        let mut members: Vec<_> = self.identities.iter().collect();
        members.sort();
        members
    }

    /// Returns true if the group has a member with this subject and issuer.
    pub fn contains(&self, subject: &str, issuer: &str) -> bool {
        self.identities
            .contains(&SingleIdentity::new(subject, issuer))
    }

    /// Adds a member. Returns false if it was already present.
    pub fn insert(&mut self, identity: SingleIdentity) -> bool {
        self.identities.insert(identity)
    }

    /// Removes the member with this subject and issuer.
    ///
    /// Returns false, leaving the group untouched, if no such member exists.
    pub fn remove(&mut self, subject: &str, issuer: &str) -> bool {
        self.identities
            .remove(&SingleIdentity::new(subject, issuer))
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}
