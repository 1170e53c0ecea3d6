use crate::shared::error::Result;
use async_trait::async_trait;

/// A single reachability check against whatever the platform offers.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn probe(&self) -> Result<bool>;
}
