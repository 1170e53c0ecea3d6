use crate::domain::entities::Movement;
use crate::shared::error::Result;
use async_trait::async_trait;

/// Outbound seam for pushing locally-created movements to the remote system.
#[async_trait]
pub trait MovementGateway: Send + Sync {
    /// Upload one movement; returns the server-assigned movement id.
    async fn push_movement(&self, movement: &Movement) -> Result<i64>;
}
