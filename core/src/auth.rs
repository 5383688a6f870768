//! Bearer token providers.

use crate::error::AuthError;

/// Supplies the bearer token attached to outgoing requests.
///
/// `token` may be called concurrently from many requests. Serializing calls
/// to `refresh_token` is left to the implementation or its caller.
pub trait TokenService: Send + Sync {
    /// Current token. An empty string means "send no `Authorization` header".
    fn token(&self) -> String;

    /// Obtain fresh credentials, typically after a 401.
    fn refresh_token(&self) -> Result<(), AuthError>;

    fn is_authenticated(&self) -> bool {
        !self.token().is_empty()
    }
}

/// A fixed token that never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenService for StaticToken {
    fn token(&self) -> String {
        self.0.clone()
    }

    /// Nothing to refresh.
    fn refresh_token(&self) -> Result<(), AuthError> {
        Ok(())
    }
}
