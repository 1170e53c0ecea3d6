use crate::domain::entities::{LoginRequest, LoginResponse, TokenPair};
use crate::shared::error::Result;
use async_trait::async_trait;

/// Remote authentication endpoints. Login and refresh are unauthenticated;
/// the user-info read carries the freshly issued access token.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse>;
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair>;
    async fn fetch_user_info(&self, access_token: &str) -> Result<serde_json::Value>;
}
