//! Identity collaborator.
//!
//! Exchanges bearer tokens for a concrete, tagged identity. The rest of the
//! system never sees raw tokens: the HTTP layer and the session constructors
//! work with [`Identity`] values, which guarantees every stored record's
//! `owner_id` came from a successful token exchange.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::OwnerId;

/// A verified user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: OwnerId,
    pub email: String,
}

/// Errors from token verification.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    /// No bearer token was supplied.
    #[error("no authorization header")]
    MissingToken,
    /// The token is unknown, expired or malformed.
    #[error("unauthorized")]
    InvalidToken,
    /// The identity backend could not be reached.
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),
}

/// Exchanges a bearer token for an owner identity.
///
/// A failed exchange fails the whole request; there is no anonymous access
/// to any record operation.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<Identity, AuthError>;
}

/// In-memory token registry for development and tests.
///
/// Tokens are opaque UUID strings issued by [`issue_token`] and live until
/// revoked. This stands in for an external auth service; production
/// deployments would implement [`IdentityProvider`] against that service.
///
/// [`issue_token`]: LocalIdentityProvider::issue_token
pub struct LocalIdentityProvider {
    tokens: RwLock<HashMap<String, Identity>>,
}

impl LocalIdentityProvider {
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// Register a user and return a fresh bearer token for them.
    pub fn issue_token(&self, email: impl Into<String>) -> String {
        let email = email.into();
        let identity = Identity {
            id: OwnerId::new(Uuid::new_v4().to_string()),
            email,
        };
        let token = Uuid::new_v4().to_string();
        self.tokens.write().insert(token.clone(), identity);
        token
    }

    /// Register a specific token/identity pair (e.g. from environment config).
    pub fn register_token(&self, token: impl Into<String>, identity: Identity) {
        self.tokens.write().insert(token.into(), identity);
    }

    /// Invalidate a token. Subsequent verification fails with `InvalidToken`.
    pub fn revoke_token(&self, token: &str) {
        self.tokens.write().remove(token);
    }
}

impl Default for LocalIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn verify_token(&self, token: &str) -> Result<Identity, AuthError> {
        self.tokens
            .read()
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

/// Per-sign-in context handed to the capture session and history browser.
///
/// Created once from a successful token exchange and torn down on sign-out.
/// Replaces ambient global auth state: everything that needs the current
/// identity receives this context explicitly.
#[derive(Debug, Clone)]
pub struct SessionContext {
    identity: Identity,
}

impl SessionContext {
    /// Initialize a context from a verified identity.
    pub fn init(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.identity.id
    }
}
