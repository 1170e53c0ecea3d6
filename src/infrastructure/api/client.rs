use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Response, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use crate::application::ports::SessionTokens;
use crate::shared::config::ApiConfig;
use crate::shared::error::{AppError, Result};

/// The server expects the token twice: standard bearer auth plus a legacy
/// session header carrying the same value.
const SESSION_TOKEN_HEADER: &str = "X-Session-Token";

/// HTTP client for the remote API, with bearer authentication and a single
/// transparent refresh-and-retry on 401.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionTokens>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Arc<dyn SessionTokens>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response> {
        self.send_with_auth(|| self.http.get(self.endpoint(path)).query(query))
            .await
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        self.send_with_auth(|| self.http.post(self.endpoint(path)).json(body))
            .await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send with the current access token attached. On 401 the session is
    /// refreshed once and the request re-sent once; a failed refresh
    /// surfaces as [`AppError::SessionExpired`]. No token at all is fatal
    /// for the call. Nothing else is retried at this layer: transient
    /// failure handling belongs to the sync engine.
    async fn send_with_auth<F>(&self, request: F) -> Result<Response>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let token = self
            .session
            .access_token()
            .await
            .ok_or(AppError::NoToken)?;

        let response = Self::attach_token(request(), &token).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!("access token rejected, refreshing session");
        let token = match self.session.refresh_access_token().await {
            Ok(token) => token,
            Err(err) => {
                warn!("token refresh failed: {err}");
                return Err(AppError::SessionExpired);
            }
        };

        Ok(Self::attach_token(request(), &token).send().await?)
    }

    fn attach_token(builder: reqwest::RequestBuilder, token: &str) -> reqwest::RequestBuilder {
        builder
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(SESSION_TOKEN_HEADER, token)
    }
}

/// Map any non-success status to [`AppError::Api`], keeping the body for
/// diagnostics.
pub async fn expect_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::Api {
        status: status.as_u16(),
        body,
    })
}
