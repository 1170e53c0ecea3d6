use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;

use super::client::expect_success;
use crate::application::ports::AuthGateway;
use crate::domain::entities::{LoginRequest, LoginResponse, TokenPair};
use crate::shared::config::ApiConfig;
use crate::shared::error::Result;

/// Authentication endpoints. Login and refresh carry no bearer token, so
/// this gateway keeps its own plain client instead of going through
/// [`super::client::ApiClient`].
pub struct HttpAuthGateway {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthGateway {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let response = self
            .http
            .post(self.endpoint("/auth/login"))
            .json(request)
            .send()
            .await?;
        let response = expect_success(response).await?;
        Ok(response.json().await?)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let response = self
            .http
            .post(self.endpoint("/auth/refresh"))
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await?;
        let response = expect_success(response).await?;
        Ok(response.json().await?)
    }

    async fn fetch_user_info(&self, access_token: &str) -> Result<serde_json::Value> {
        let response = self
            .http
            .get(self.endpoint("/app/user/info"))
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .send()
            .await?;
        let response = expect_success(response).await?;
        Ok(response.json().await?)
    }
}
