use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::{expect_success, ApiClient};
use crate::application::ports::MovementGateway;
use crate::domain::entities::Movement;
use crate::shared::error::Result;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewMovementRequest<'a> {
    date: String,
    farm_id: i64,
    pasture_id: i64,
    event_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    event_detail_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovementAccepted {
    movement_id: i64,
}

/// Uploads movements to `POST /movements`, one at a time.
pub struct HttpMovementGateway {
    client: Arc<ApiClient>,
}

impl HttpMovementGateway {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MovementGateway for HttpMovementGateway {
    async fn push_movement(&self, movement: &Movement) -> Result<i64> {
        let body = NewMovementRequest {
            date: movement.date.to_rfc3339(),
            farm_id: movement.farm_id,
            pasture_id: movement.pasture_id,
            event_id: movement.event_id,
            event_detail_id: movement.event_detail_id,
            comment: movement.comment.as_deref(),
        };

        let response = self.client.post_json("/movements", &body).await?;
        let response = expect_success(response).await?;
        let accepted: MovementAccepted = response.json().await?;
        Ok(accepted.movement_id)
    }
}
