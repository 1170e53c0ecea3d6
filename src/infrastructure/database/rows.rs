use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MovementRow {
    pub id: i64,
    pub local_id: String,
    pub movement_id: Option<i64>,
    pub date: String,
    pub farm_id: i64,
    pub farm_name: String,
    pub pasture_id: i64,
    pub pasture_description: String,
    pub event_id: i64,
    pub event_description: String,
    pub event_operation: String,
    pub event_detail_id: Option<i64>,
    pub event_detail_description: Option<String>,
    pub comment: Option<String>,
    pub status: String,
    pub synced: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MovementDetailRow {
    pub id: i64,
    pub movement_local_id: String,
    pub animal_type_id: i64,
    pub animal_type_name: String,
    pub breed_id: i64,
    pub breed_name: String,
    pub age_group_id: i64,
    pub age_group_name: String,
    pub gender: String,
    pub quantity: i64,
    pub comment: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MovementMediaRow {
    pub id: i64,
    pub movement_local_id: String,
    pub detail_row_id: Option<i64>,
    pub file_type: String,
    pub url: String,
    pub caption: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserDataRow {
    pub id: i64,
    pub userx_id: i64,
    pub name: String,
    pub email: String,
    pub username: String,
    pub data: String,
    pub last_sync: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SyncQueueRow {
    pub id: i64,
    pub kind: String,
    pub payload: String,
    pub attempts: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReferenceDataRow {
    pub id: i64,
    pub kind: String,
    pub data: String,
    pub last_sync: i64,
    pub created_at: i64,
    pub updated_at: i64,
}
