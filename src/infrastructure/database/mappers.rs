use chrono::{DateTime, Utc};

use super::rows::{
    MovementDetailRow, MovementMediaRow, MovementRow, SyncQueueRow, UserDataRow,
};
use crate::domain::entities::{
    Gender, Movement, MovementDetail, MovementMedia, SyncQueueItem, UserData,
};
use crate::shared::error::{AppError, Result};

pub fn movement_from_row(
    row: MovementRow,
    details: Vec<MovementDetail>,
    medias: Vec<MovementMedia>,
) -> Result<Movement> {
    let date = DateTime::parse_from_rfc3339(&row.date)
        .map_err(|err| {
            AppError::InvalidInput(format!(
                "unreadable date on movement {}: {err}",
                row.local_id
            ))
        })?
        .with_timezone(&Utc);

    Ok(Movement {
        local_id: row.local_id,
        movement_id: row.movement_id,
        date,
        farm_id: row.farm_id,
        farm_name: row.farm_name,
        pasture_id: row.pasture_id,
        pasture_description: row.pasture_description,
        event_id: row.event_id,
        event_description: row.event_description,
        event_operation: row.event_operation,
        event_detail_id: row.event_detail_id,
        event_detail_description: row.event_detail_description,
        comment: row.comment,
        status: row.status,
        synced: row.synced,
        details,
        medias,
    })
}

pub fn detail_from_row(
    row: MovementDetailRow,
    medias: Vec<MovementMedia>,
) -> Result<MovementDetail> {
    let gender = Gender::parse(&row.gender).ok_or_else(|| {
        AppError::InvalidInput(format!("unreadable gender {:?} on detail {}", row.gender, row.id))
    })?;

    Ok(MovementDetail {
        animal_type_id: row.animal_type_id,
        animal_type_name: row.animal_type_name,
        breed_id: row.breed_id,
        breed_name: row.breed_name,
        age_group_id: row.age_group_id,
        age_group_name: row.age_group_name,
        gender,
        quantity: row.quantity,
        comment: row.comment,
        medias,
    })
}

pub fn media_from_row(row: MovementMediaRow) -> MovementMedia {
    MovementMedia {
        file_type: row.file_type,
        url: row.url,
        caption: row.caption,
    }
}

pub fn user_data_from_row(row: UserDataRow) -> Result<UserData> {
    Ok(UserData {
        userx_id: row.userx_id,
        name: row.name,
        email: row.email,
        username: row.username,
        data: row.data,
        last_sync: timestamp(row.last_sync)?,
    })
}

pub fn queue_item_from_row(row: SyncQueueRow) -> Result<SyncQueueItem> {
    Ok(SyncQueueItem {
        id: row.id,
        kind: row.kind,
        payload: serde_json::from_str(&row.payload)?,
        attempts: row.attempts,
        created_at: timestamp(row.created_at)?,
        updated_at: timestamp(row.updated_at)?,
    })
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| AppError::InvalidInput(format!("timestamp {secs} out of range")))
}
