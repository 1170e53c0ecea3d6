use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Generic deferred-work record. Created when an operation has to be retried
/// later, deleted on success; `attempts` grows without cap on failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncQueueItem {
    pub id: i64,
    pub kind: String,
    pub payload: serde_json::Value,
    pub attempts: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of one full sync run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncReport {
    pub success: bool,
    pub synced: u32,
    pub failed: u32,
    pub message: String,
}

impl SyncReport {
    pub fn completed(synced: u32, failed: u32) -> Self {
        if failed > 0 {
            Self {
                success: false,
                synced,
                failed,
                message: format!("{synced} synced, {failed} failed"),
            }
        } else {
            Self {
                success: true,
                synced,
                failed: 0,
                message: format!("{synced} movements synced"),
            }
        }
    }

    pub fn skipped(message: impl Into<String>) -> Self {
        Self {
            success: false,
            synced: 0,
            failed: 0,
            message: message.into(),
        }
    }

    pub fn nothing_pending() -> Self {
        Self {
            success: true,
            synced: 0,
            failed: 0,
            message: "no pending movements".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Idle,
    Syncing,
    Success,
    Error,
}

/// Progress event delivered to sync listeners. `progress` is 0-100.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncStatusEvent {
    pub phase: SyncPhase,
    pub progress: u8,
    pub error: Option<String>,
}

impl SyncStatusEvent {
    pub fn syncing(progress: u8) -> Self {
        Self {
            phase: SyncPhase::Syncing,
            progress,
            error: None,
        }
    }

    pub fn success() -> Self {
        Self {
            phase: SyncPhase::Success,
            progress: 100,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            phase: SyncPhase::Error,
            progress: 0,
            error: Some(message.into()),
        }
    }
}
