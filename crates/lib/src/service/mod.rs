//! Identity binding services.
//!
//! [`IdentityService`] resolves identities and groups against an injected
//! [`IdentityStore`](crate::backend::IdentityStore) and manages binding.
//! [`ConsistencyService`] decides whether a set of presented tokens describes
//! one coherent user. It reaches the store only through the
//! [`IdentityResolver`] seam, which `IdentityService` implements.

mod consistency;
mod identity;

use async_trait::async_trait;

use crate::Result;
use crate::identity::MultipleIdentity;

pub use consistency::ConsistencyService;
pub use identity::IdentityService;

/// Resolves the merged group, if any, that a login identity belongs to.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Returns the group containing (subject, issuer), or `None` if the
    /// identity is unbound or unknown.
    async fn resolve_group(&self, subject: &str, issuer: &str) -> Result<Option<MultipleIdentity>>;
}
