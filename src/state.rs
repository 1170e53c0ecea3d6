use std::sync::Arc;

use crate::application::services::{AuthService, ReferenceService, SyncEngine};
use crate::infrastructure::api::{
    ApiClient, HttpAuthGateway, HttpMovementGateway, HttpReferenceGateway,
};
use crate::infrastructure::connectivity::{ConnectivityMonitor, HttpConnectivityProbe};
use crate::infrastructure::database::LocalStore;
use crate::shared::config::AppConfig;
use crate::shared::error::{AppError, Result};
use crate::shared::listeners::SubscriptionToken;

/// Composition root. One instance is constructed at process start and
/// handed to consumers; nothing in this crate lives in module-level state.
/// Lifecycle belongs to the embedder: construct, [`AppContext::init`], use,
/// [`AppContext::shutdown`].
pub struct AppContext {
    pub config: AppConfig,
    pub store: Arc<LocalStore>,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub auth: Arc<AuthService>,
    pub reference: Arc<ReferenceService>,
    pub sync: Arc<SyncEngine>,
    _auto_sync: Option<SubscriptionToken>,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Result<Self> {
        config.validate().map_err(AppError::Configuration)?;

        let store = Arc::new(LocalStore::new(&config.database));

        let auth_gateway = Arc::new(HttpAuthGateway::new(&config.api)?);
        let auth = Arc::new(AuthService::new(auth_gateway, store.clone()));

        let api = Arc::new(ApiClient::new(&config.api, auth.clone())?);
        let probe = Arc::new(HttpConnectivityProbe::new(&config.api)?);
        let connectivity = Arc::new(ConnectivityMonitor::new(probe));

        let reference = Arc::new(ReferenceService::new(
            store.clone(),
            Arc::new(HttpReferenceGateway::new(api.clone())),
        ));
        let sync = Arc::new(SyncEngine::new(
            store.clone(),
            Arc::new(HttpMovementGateway::new(api)),
            connectivity.clone(),
        ));

        let auto_sync = config
            .sync
            .auto_sync
            .then(|| sync.clone().watch_connectivity());

        Ok(Self {
            config,
            store,
            connectivity,
            auth,
            reference,
            sync,
            _auto_sync: auto_sync,
        })
    }

    /// Open the local store (create, version-check, build schema). Safe to
    /// call more than once.
    pub async fn init(&self) -> Result<()> {
        self.store.initialize().await
    }

    pub async fn shutdown(&self) {
        self.store.close().await;
    }
}
