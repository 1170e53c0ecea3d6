use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::application::ports::ConnectivityProbe;
use crate::shared::listeners::{Listeners, SubscriptionToken};

/// Process-wide reachability signal. Listeners are notified on transitions
/// only; repeated identical reports are deduplicated.
pub struct ConnectivityMonitor {
    probe: Arc<dyn ConnectivityProbe>,
    // Assumed online until the first probe or report says otherwise.
    online: AtomicBool,
    listeners: Listeners<bool>,
}

impl ConnectivityMonitor {
    pub fn new(probe: Arc<dyn ConnectivityProbe>) -> Self {
        Self {
            probe,
            online: AtomicBool::new(true),
            listeners: Listeners::new(),
        }
    }

    /// Last known state, without probing.
    pub fn is_connected(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Force a fresh probe and update the cached state. A failing probe
    /// counts as offline, never as an error.
    pub async fn check_connection(&self) -> bool {
        let connected = match self.probe.probe().await {
            Ok(value) => value,
            Err(err) => {
                warn!("connectivity probe failed: {err}");
                false
            }
        };

        self.report(connected);
        connected
    }

    /// Feed an externally observed reachability value (platform callbacks,
    /// transport errors). Fires listeners only when the value changes.
    pub fn report(&self, connected: bool) {
        let previous = self.online.swap(connected, Ordering::SeqCst);
        if previous != connected {
            info!(connected, "connectivity changed");
            self.listeners.emit(connected);
        }
    }

    pub fn subscribe(
        &self,
        callback: impl Fn(bool) + Send + Sync + 'static,
    ) -> SubscriptionToken {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&self, token: SubscriptionToken) {
        self.listeners.unsubscribe(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::{AppError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    struct ScriptedProbe {
        online: AtomicBool,
        fail: AtomicBool,
    }

    impl ScriptedProbe {
        fn new(online: bool) -> Self {
            Self {
                online: AtomicBool::new(online),
                fail: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl ConnectivityProbe for ScriptedProbe {
        async fn probe(&self) -> Result<bool> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::Configuration("probe unavailable".into()));
            }
            Ok(self.online.load(Ordering::SeqCst))
        }
    }

    #[tokio::test]
    async fn notifies_on_transitions_only() {
        let probe = Arc::new(ScriptedProbe::new(true));
        let monitor = ConnectivityMonitor::new(probe);
        let notifications = Arc::new(std::sync::Mutex::new(Vec::new()));

        let sink = notifications.clone();
        monitor.subscribe(move |connected| {
            sink.lock().unwrap().push(connected);
        });

        monitor.report(true); // same as initial state, no event
        monitor.report(false);
        monitor.report(false); // duplicate, no event
        monitor.report(true);

        assert_eq!(*notifications.lock().unwrap(), vec![false, true]);
    }

    #[tokio::test]
    async fn check_connection_updates_cached_state() {
        let probe = Arc::new(ScriptedProbe::new(false));
        let monitor = ConnectivityMonitor::new(probe.clone());

        assert!(monitor.is_connected());
        assert!(!monitor.check_connection().await);
        assert!(!monitor.is_connected());

        probe.online.store(true, Ordering::SeqCst);
        assert!(monitor.check_connection().await);
        assert!(monitor.is_connected());
    }

    #[tokio::test]
    async fn probe_failure_reads_as_offline() {
        let probe = Arc::new(ScriptedProbe::new(true));
        probe.fail.store(true, Ordering::SeqCst);
        let monitor = ConnectivityMonitor::new(probe);

        let transitions = Arc::new(AtomicUsize::new(0));
        let counted = transitions.clone();
        monitor.subscribe(move |_| {
            counted.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!monitor.check_connection().await);
        assert_eq!(transitions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unsubscribed_listener_stops_receiving() {
        let monitor = ConnectivityMonitor::new(Arc::new(ScriptedProbe::new(true)));
        let count = Arc::new(AtomicUsize::new(0));

        let counted = count.clone();
        let token = monitor.subscribe(move |_| {
            counted.fetch_add(1, Ordering::SeqCst);
        });

        monitor.report(false);
        monitor.unsubscribe(token);
        monitor.report(true);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
