//! Authentication token inputs.
//!
//! Tokens arrive already validated by the surrounding authentication flow.
//! The binder only ever reads their `sub` and `iss` claims.

use serde::{Deserialize, Serialize};

use super::errors::IdentityError;

/// Read-only view of the identity claims carried by an authentication token.
///
/// Any validated OIDC token type can implement this to be checked by the
/// identity and consistency services.
pub trait TokenIdentity {
    /// The issuer-scoped subject identifier (`sub` claim).
    fn subject(&self) -> &str;

    /// The issuing authority (`iss` claim).
    fn issuer(&self) -> &str;
}

impl<T: TokenIdentity + ?Sized> TokenIdentity for &T {
    fn subject(&self) -> &str {
        (**self).subject()
    }

    fn issuer(&self) -> &str {
        (**self).issuer()
    }
}

/// Minimal validated OpenID Connect token carrying only the identity claims.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthenticationToken {
    /// Subject claim
    pub sub: String,
    /// Issuer claim
    pub iss: String,
}

impl AuthenticationToken {
    /// Creates a token from its subject and issuer claims.
    pub fn new(sub: impl Into<String>, iss: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            iss: iss.into(),
        }
    }

    /// Parses the `subject@issuer` shorthand.
    ///
    /// The split happens on the last `@`, so subjects that are themselves
    /// email addresses survive intact.
    pub fn parse(value: &str) -> Result<Self, IdentityError> {
        match value.rsplit_once('@') {
            Some((sub, iss)) if !sub.is_empty() && !iss.is_empty() => Ok(Self::new(sub, iss)),
            _ => Err(IdentityError::InvalidToken {
                reason: format!("expected subject@issuer, got '{value}'"),
            }),
        }
    }
}

impl TokenIdentity for AuthenticationToken {
    fn subject(&self) -> &str {
        &self.sub
    }

    fn issuer(&self) -> &str {
        &self.iss
    }
}

impl std::str::FromStr for AuthenticationToken {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for AuthenticationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.sub, self.iss)
    }
}
