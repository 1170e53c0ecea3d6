use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recorded livestock transfer between pastures. Created locally with a
/// generated `local_id`; `movement_id` stays empty until the record has been
/// accepted by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movement {
    pub local_id: String,
    pub movement_id: Option<i64>,
    pub date: DateTime<Utc>,
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
    pub details: Vec<MovementDetail>,
    /// Media attached to the movement as a whole. Media scoped to a single
    /// detail lives on that detail instead.
    pub medias: Vec<MovementMedia>,
}

impl Movement {
    /// Generate a fresh local identifier. Never reused; it is the
    /// idempotency key for the whole sync pipeline.
    pub fn new_local_id() -> String {
        Uuid::new_v4().to_string()
    }
}

/// Per animal-type/breed/age-group/gender breakdown of a movement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovementDetail {
    pub animal_type_id: i64,
    pub animal_type_name: String,
    pub breed_id: i64,
    pub breed_name: String,
    pub age_group_id: i64,
    pub age_group_name: String,
    pub gender: Gender,
    pub quantity: i64,
    pub comment: Option<String>,
    pub medias: Vec<MovementMedia>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovementMedia {
    pub file_type: String,
    pub url: String,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "M" => Some(Gender::Male),
            "F" => Some(Gender::Female),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovementStats {
    pub total_movements: i64,
    pub pending_sync: i64,
}
