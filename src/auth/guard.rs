//! Authorization guard
//!
//! Turns a bearer token into an [`Actor`] and gates operations on role and
//! jurisdiction. The guard only reads from the identity store.

use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::auth::{Role, TokenCodec};
use crate::identity::IdentityStore;
use crate::types::{PrecinctError, Result};

/// Resolved identity attached to an authenticated request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
    pub jurisdiction: String,
}

/// Fail with `Forbidden` unless the actor holds one of `allowed`
pub fn require_role(actor: &Actor, allowed: &[Role]) -> Result<()> {
    if allowed.contains(&actor.role) {
        return Ok(());
    }

    warn!(actor_id = %actor.id, role = %actor.role, "Role not permitted");
    let allowed: Vec<&str> = allowed.iter().map(Role::as_str).collect();
    Err(PrecinctError::Forbidden(format!(
        "Only {} may access this",
        allowed.join(" or ")
    )))
}

/// Fail with `Forbidden` unless the actor works the given jurisdiction
pub fn require_jurisdiction_match(actor: &Actor, case_jurisdiction: &str) -> Result<()> {
    if actor.jurisdiction == case_jurisdiction {
        return Ok(());
    }

    warn!(actor_id = %actor.id, "Jurisdiction mismatch");
    Err(PrecinctError::Forbidden(
        "Case is outside your jurisdiction".into(),
    ))
}

/// Validates session tokens and resolves the acting account
pub struct AuthGuard {
    tokens: Arc<TokenCodec>,
    identity: Arc<IdentityStore>,
}

impl AuthGuard {
    pub fn new(tokens: Arc<TokenCodec>, identity: Arc<IdentityStore>) -> Self {
        Self { tokens, identity }
    }

    /// Resolve the actor behind a request's token.
    ///
    /// Role and jurisdiction come from the stored account, looked up only
    /// after the token signature has been verified.
    pub async fn authenticate_request(&self, token: Option<&str>) -> Result<Actor> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PrecinctError::Unauthenticated("No token provided".into()))?;

        let claims = self.tokens.verify(token)?;

        let account = match self.identity.get_account(&claims.id).await {
            Ok(account) => account,
            Err(PrecinctError::NotFound(_)) => {
                warn!(account_id = %claims.id, "Token for unknown account");
                return Err(PrecinctError::Unauthenticated(
                    "Account no longer exists".into(),
                ));
            }
            Err(e) => return Err(e),
        };

        Ok(Actor {
            id: account.id,
            role: account.role,
            jurisdiction: account.jurisdiction,
        })
    }
}
