use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::application::ports::MovementGateway;
use crate::domain::entities::{SyncReport, SyncStatusEvent};
use crate::infrastructure::connectivity::ConnectivityMonitor;
use crate::infrastructure::database::LocalStore;
use crate::shared::error::Result;
use crate::shared::listeners::{Listeners, SubscriptionToken};

/// Drains pending movements to the remote system, oldest first, one at a
/// time. Only one run can be active; a second request is turned away
/// immediately instead of queueing. A failed item is counted, logged and
/// left pending for the next run: it never aborts the batch.
pub struct SyncEngine {
    store: Arc<LocalStore>,
    gateway: Arc<dyn MovementGateway>,
    connectivity: Arc<ConnectivityMonitor>,
    is_syncing: AtomicBool,
    listeners: Listeners<SyncStatusEvent>,
}

impl SyncEngine {
    pub fn new(
        store: Arc<LocalStore>,
        gateway: Arc<dyn MovementGateway>,
        connectivity: Arc<ConnectivityMonitor>,
    ) -> Self {
        Self {
            store,
            gateway,
            connectivity,
            is_syncing: AtomicBool::new(false),
            listeners: Listeners::new(),
        }
    }

    pub fn is_syncing(&self) -> bool {
        self.is_syncing.load(Ordering::SeqCst)
    }

    pub fn subscribe(
        &self,
        callback: impl Fn(SyncStatusEvent) + Send + Sync + 'static,
    ) -> SubscriptionToken {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&self, token: SubscriptionToken) {
        self.listeners.unsubscribe(token);
    }

    /// Start a sync run each time the connection comes back while the
    /// engine is idle. A transition that arrives mid-run is a no-op: the
    /// in-flight run picks up whatever is still pending.
    pub fn watch_connectivity(self: Arc<Self>) -> SubscriptionToken {
        let engine = Arc::clone(&self);
        self.connectivity.subscribe(move |connected| {
            if connected && !engine.is_syncing() {
                info!("connection restored, starting sync");
                let engine = Arc::clone(&engine);
                tokio::spawn(async move {
                    let report = engine.sync_all().await;
                    debug!(
                        synced = report.synced,
                        failed = report.failed,
                        "auto sync finished: {}",
                        report.message
                    );
                });
            }
        })
    }

    /// Run one full sync pass over the pending movements.
    pub async fn sync_all(&self) -> SyncReport {
        if self
            .is_syncing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("sync already in progress");
            return SyncReport::skipped("sync already in progress");
        }
        // Released on every exit path so an error can never leave the
        // engine stuck in the syncing state.
        let _guard = SyncFlagGuard(&self.is_syncing);

        if !self.connectivity.check_connection().await {
            return SyncReport::skipped("no connection");
        }

        self.listeners.emit(SyncStatusEvent::syncing(0));

        match self.sync_movements().await {
            Ok(report) => {
                if report.success {
                    self.listeners.emit(SyncStatusEvent::success());
                } else {
                    self.listeners.emit(SyncStatusEvent::error(report.message.clone()));
                }
                report
            }
            Err(err) => {
                let message = err.to_string();
                error!("sync run failed: {message}");
                self.listeners.emit(SyncStatusEvent::error(message.clone()));
                SyncReport {
                    success: false,
                    synced: 0,
                    failed: 0,
                    message,
                }
            }
        }
    }

    async fn sync_movements(&self) -> Result<SyncReport> {
        let stats = self.store.get_stats().await?;
        if stats.pending_sync == 0 {
            return Ok(SyncReport::nothing_pending());
        }

        let pending = self.store.get_pending_movements().await?;
        let total = pending.len();
        let mut synced = 0u32;
        let mut failed = 0u32;

        for (index, movement) in pending.iter().enumerate() {
            let progress = (((index + 1) * 100) / total) as u8;
            self.listeners.emit(SyncStatusEvent::syncing(progress));

            match self.gateway.push_movement(movement).await {
                Ok(movement_id) => {
                    self.store
                        .mark_movement_synced(&movement.local_id, movement_id)
                        .await?;
                    synced += 1;
                }
                Err(err) => {
                    // Counted and left pending; retried on the next run.
                    warn!(local_id = %movement.local_id, "movement upload failed: {err}");
                    failed += 1;
                }
            }
        }

        Ok(SyncReport::completed(synced, failed))
    }
}

struct SyncFlagGuard<'a>(&'a AtomicBool);

impl Drop for SyncFlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::ConnectivityProbe;
    use crate::domain::entities::{Gender, Movement, MovementDetail, SyncPhase};
    use crate::shared::config::DatabaseConfig;
    use crate::shared::error::AppError;
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicI64;
    use std::sync::Mutex;
    use std::time::Duration;

    struct StaticProbe {
        online: AtomicBool,
    }

    #[async_trait]
    impl ConnectivityProbe for StaticProbe {
        async fn probe(&self) -> Result<bool> {
            Ok(self.online.load(Ordering::SeqCst))
        }
    }

    #[derive(Default)]
    struct MockMovementGateway {
        calls: Mutex<Vec<String>>,
        fail_ids: HashSet<String>,
        delay_ms: u64,
        next_id: AtomicI64,
    }

    impl MockMovementGateway {
        fn new(fail_ids: &[&str], delay_ms: u64) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_ids: fail_ids.iter().map(|s| s.to_string()).collect(),
                delay_ms,
                next_id: AtomicI64::new(500),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MovementGateway for MockMovementGateway {
        async fn push_movement(&self, movement: &Movement) -> Result<i64> {
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            self.calls.lock().unwrap().push(movement.local_id.clone());
            if self.fail_ids.contains(&movement.local_id) {
                return Err(AppError::Api {
                    status: 500,
                    body: "server error".into(),
                });
            }
            Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
        }
    }

    struct Setup {
        engine: Arc<SyncEngine>,
        store: Arc<LocalStore>,
        gateway: Arc<MockMovementGateway>,
        monitor: Arc<ConnectivityMonitor>,
    }

    fn setup(gateway: MockMovementGateway, online: bool) -> Setup {
        let store = Arc::new(LocalStore::new(&DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }));
        let probe = Arc::new(StaticProbe {
            online: AtomicBool::new(online),
        });
        let monitor = Arc::new(ConnectivityMonitor::new(probe));
        let gateway = Arc::new(gateway);
        let engine = Arc::new(SyncEngine::new(
            store.clone(),
            gateway.clone(),
            monitor.clone(),
        ));
        Setup {
            engine,
            store,
            gateway,
            monitor,
        }
    }

    fn movement(local_id: &str, date: &str) -> Movement {
        Movement {
            local_id: local_id.to_string(),
            movement_id: None,
            date: date.parse::<DateTime<chrono::Utc>>().unwrap(),
            farm_id: 1,
            farm_name: "Alta Vista".to_string(),
            pasture_id: 11,
            pasture_description: "North paddock".to_string(),
            event_id: 3,
            event_description: "Transfer".to_string(),
            event_operation: "IN".to_string(),
            event_detail_id: None,
            event_detail_description: None,
            comment: None,
            status: "registered".to_string(),
            synced: false,
            details: vec![MovementDetail {
                animal_type_id: 1,
                animal_type_name: "Cattle".to_string(),
                breed_id: 2,
                breed_name: "Angus".to_string(),
                age_group_id: 4,
                age_group_name: "Yearling".to_string(),
                gender: Gender::Female,
                quantity: 8,
                comment: None,
                medias: vec![],
            }],
            medias: vec![],
        }
    }

    #[tokio::test]
    async fn partial_batch_failure_keeps_failed_item_pending() {
        let s = setup(MockMovementGateway::new(&["b"], 0), true);
        s.store
            .save_movement(&movement("a", "2026-03-01T08:00:00Z"))
            .await
            .unwrap();
        s.store
            .save_movement(&movement("b", "2026-03-01T09:00:00Z"))
            .await
            .unwrap();
        s.store
            .save_movement(&movement("c", "2026-03-01T10:00:00Z"))
            .await
            .unwrap();

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        s.engine.subscribe(move |event| {
            sink.lock().unwrap().push(event);
        });

        let report = s.engine.sync_all().await;

        assert!(!report.success);
        assert_eq!(report.synced, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.message, "2 synced, 1 failed");

        // FIFO order, and the failed item never aborted the batch.
        assert_eq!(s.gateway.calls(), ["a", "b", "c"]);

        let remaining = s.store.get_pending_movements().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].local_id, "b");

        let synced: Vec<(String, Option<i64>)> = s
            .store
            .get_movements()
            .await
            .unwrap()
            .into_iter()
            .filter(|m| m.synced)
            .map(|m| (m.local_id, m.movement_id))
            .collect();
        assert_eq!(synced.len(), 2);
        assert!(synced.iter().all(|(_, id)| id.is_some()));

        let events = events.lock().unwrap();
        let progress: Vec<u8> = events.iter().map(|e| e.progress).collect();
        assert_eq!(progress, [0, 33, 66, 100, 0]);
        assert_eq!(events.last().unwrap().phase, SyncPhase::Error);
        assert!(events.last().unwrap().error.is_some());
    }

    #[tokio::test]
    async fn second_call_while_running_is_rejected() {
        let s = setup(MockMovementGateway::new(&[], 100), true);
        s.store
            .save_movement(&movement("a", "2026-03-01T08:00:00Z"))
            .await
            .unwrap();

        let engine = s.engine.clone();
        let first = tokio::spawn(async move { engine.sync_all().await });
        tokio::time::sleep(Duration::from_millis(30)).await;

        let second = s.engine.sync_all().await;
        assert!(!second.success);
        assert_eq!(second.message, "sync already in progress");

        let first = first.await.unwrap();
        assert!(first.success);
        assert_eq!(first.synced, 1);
        // Only the first run ever reached the network.
        assert_eq!(s.gateway.calls().len(), 1);

        // The flag is released once the run completes.
        assert!(!s.engine.is_syncing());
    }

    #[tokio::test]
    async fn empty_queue_short_circuits_without_network_calls() {
        let s = setup(MockMovementGateway::new(&[], 0), true);

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        s.engine.subscribe(move |event| {
            sink.lock().unwrap().push(event);
        });

        let report = s.engine.sync_all().await;
        assert!(report.success);
        assert_eq!(report.synced, 0);
        assert!(s.gateway.calls().is_empty());

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].phase, SyncPhase::Syncing);
        assert_eq!(events[1].phase, SyncPhase::Success);
    }

    #[tokio::test]
    async fn offline_probe_skips_the_run_entirely() {
        let s = setup(MockMovementGateway::new(&[], 0), false);
        s.store
            .save_movement(&movement("a", "2026-03-01T08:00:00Z"))
            .await
            .unwrap();

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        s.engine.subscribe(move |event| {
            sink.lock().unwrap().push(event);
        });

        let report = s.engine.sync_all().await;
        assert!(!report.success);
        assert_eq!(report.message, "no connection");
        assert!(s.gateway.calls().is_empty());
        assert!(events.lock().unwrap().is_empty());
        assert!(!s.engine.is_syncing());
    }

    #[tokio::test]
    async fn reconnect_triggers_exactly_one_sync() {
        let s = setup(MockMovementGateway::new(&[], 0), true);
        s.store
            .save_movement(&movement("a", "2026-03-01T08:00:00Z"))
            .await
            .unwrap();

        let _watch = s.engine.clone().watch_connectivity();

        s.monitor.report(false);
        s.monitor.report(true);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(s.gateway.calls().len(), 1);
        assert!(s.store.get_pending_movements().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reconnect_during_a_running_sync_is_a_noop() {
        let s = setup(MockMovementGateway::new(&[], 150), true);
        s.store
            .save_movement(&movement("a", "2026-03-01T08:00:00Z"))
            .await
            .unwrap();

        let _watch = s.engine.clone().watch_connectivity();

        s.monitor.report(false);
        s.monitor.report(true); // starts the first run
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(s.engine.is_syncing());

        s.monitor.report(false);
        s.monitor.report(true); // arrives mid-run, must not start another
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(s.gateway.calls().len(), 1);
        assert!(!s.engine.is_syncing());
    }
}
