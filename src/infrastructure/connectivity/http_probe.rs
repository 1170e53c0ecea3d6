use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::application::ports::ConnectivityProbe;
use crate::shared::config::ApiConfig;
use crate::shared::error::Result;

/// Reachability check against the API host: a short-timeout HEAD request.
/// Any HTTP response (including errors like 404) means the network path is
/// up; only a transport failure reads as offline.
pub struct HttpConnectivityProbe {
    http: reqwest::Client,
    url: String,
}

impl HttpConnectivityProbe {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.probe_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl ConnectivityProbe for HttpConnectivityProbe {
    async fn probe(&self) -> Result<bool> {
        match self.http.head(&self.url).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                debug!("probe request failed: {err}");
                Ok(false)
            }
        }
    }
}
