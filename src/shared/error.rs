use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Storage initialization failed: {0}")]
    StorageInit(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Authentication token not found")]
    NoToken,

    #[error("Session expired, sign in again")]
    SessionExpired,

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
