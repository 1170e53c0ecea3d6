use crate::shared::error::Result;
use async_trait::async_trait;

/// Capability consumed by the authenticated request helper: read the current
/// access token and exchange the refresh token for a new one.
#[async_trait]
pub trait SessionTokens: Send + Sync {
    async fn access_token(&self) -> Option<String>;

    /// Perform a token refresh and return the new access token.
    async fn refresh_access_token(&self) -> Result<String>;
}
