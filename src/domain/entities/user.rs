use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cached snapshot of the authenticated user, kept locally so the app can
/// sign in while offline. One row per `userx_id`, upserted on every refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserData {
    pub userx_id: i64,
    pub name: String,
    pub email: String,
    pub username: String,
    /// Verbatim profile JSON as returned by the server; fields beyond the
    /// identity set above are opaque to this crate.
    pub data: String,
    pub last_sync: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub tenant_accounts: Vec<TenantAccount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TenantAccount {
    pub tenant_id: i64,
    pub account_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}
