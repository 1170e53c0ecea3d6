use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::application::ports::{AuthGateway, SessionTokens};
use crate::domain::entities::{LoginRequest, TenantAccount, TokenPair, UserData};
use crate::infrastructure::database::LocalStore;
use crate::shared::error::{AppError, Result};

/// Result of a login attempt. A server response that carries tenant
/// accounts instead of a token means the caller must pick one and log in
/// again with the chosen `tenant_id`.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Authenticated(UserData),
    TenantSelectionRequired(Vec<TenantAccount>),
}

/// Identity fields this crate actually understands; the rest of the profile
/// is cached verbatim.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileIdentity {
    userx_id: i64,
    name: String,
    email: String,
    username: String,
}

/// Holds the session tokens for the process lifetime and keeps a local
/// snapshot of the user profile so sign-in survives going offline.
pub struct AuthService {
    gateway: Arc<dyn AuthGateway>,
    store: Arc<LocalStore>,
    tokens: RwLock<Option<TokenPair>>,
}

impl AuthService {
    pub fn new(gateway: Arc<dyn AuthGateway>, store: Arc<LocalStore>) -> Self {
        Self {
            gateway,
            store,
            tokens: RwLock::new(None),
        }
    }

    pub async fn login(&self, credentials: LoginRequest) -> Result<LoginOutcome> {
        let response = self.gateway.login(&credentials).await?;

        let Some(token) = response.token else {
            if !response.tenant_accounts.is_empty() {
                return Ok(LoginOutcome::TenantSelectionRequired(
                    response.tenant_accounts,
                ));
            }
            return Err(AppError::Auth("login response carried no token".into()));
        };

        *self.tokens.write().await = Some(TokenPair {
            token: token.clone(),
            refresh_token: response.refresh_token.unwrap_or_default(),
        });

        let user = self.fetch_and_cache_user(&token).await?;
        info!(userx_id = user.userx_id, "user authenticated");
        Ok(LoginOutcome::Authenticated(user))
    }

    async fn fetch_and_cache_user(&self, access_token: &str) -> Result<UserData> {
        let profile = self.gateway.fetch_user_info(access_token).await?;
        let identity: ProfileIdentity = serde_json::from_value(profile.clone())
            .map_err(|err| AppError::Auth(format!("user profile missing identity fields: {err}")))?;

        let user = UserData {
            userx_id: identity.userx_id,
            name: identity.name,
            email: identity.email,
            username: identity.username,
            data: profile.to_string(),
            last_sync: Utc::now(),
        };
        self.store.save_user_data(&user).await?;
        Ok(user)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.tokens.read().await.is_some()
    }

    /// The offline-login snapshot saved on the last successful login.
    pub async fn cached_user(&self, userx_id: i64) -> Result<Option<UserData>> {
        self.store.get_user_data(userx_id).await
    }

    pub async fn logout(&self, userx_id: i64) -> Result<()> {
        *self.tokens.write().await = None;
        self.store.clear_user_data(userx_id).await
    }
}

#[async_trait]
impl SessionTokens for AuthService {
    async fn access_token(&self) -> Option<String> {
        self.tokens.read().await.as_ref().map(|pair| pair.token.clone())
    }

    async fn refresh_access_token(&self) -> Result<String> {
        let refresh_token = self
            .tokens
            .read()
            .await
            .as_ref()
            .map(|pair| pair.refresh_token.clone())
            .filter(|token| !token.is_empty())
            .ok_or(AppError::NoToken)?;

        let pair = self.gateway.refresh(&refresh_token).await?;
        let token = pair.token.clone();
        *self.tokens.write().await = Some(pair);
        Ok(token)
    }
}
