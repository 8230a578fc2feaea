use crate::application::ports::offline_queue::OfflineQueue;
use crate::domain::entities::offline::SyncStatusSnapshot;
use crate::domain::value_objects::ConnectivityState;
use crate::shared::error::AppError;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

/// What a pending-items indicator renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusView {
    pub status: SyncStatusSnapshot,
    pub online: bool,
}

impl SyncStatusView {
    /// The manual "sync now" action is only offered online with work queued.
    pub fn can_sync_now(&self) -> bool {
        self.online && self.status.pending_count > 0
    }
}

pub struct SyncStatusMonitor {
    queue: Arc<dyn OfflineQueue>,
    connectivity: watch::Receiver<ConnectivityState>,
    view: watch::Sender<SyncStatusView>,
    interval: Duration,
    refresh_gate: Mutex<()>,
}

impl SyncStatusMonitor {
    pub fn new(
        queue: Arc<dyn OfflineQueue>,
        connectivity: watch::Receiver<ConnectivityState>,
        interval: Duration,
    ) -> Arc<Self> {
        let online = connectivity.borrow().is_online();
        let (view, _) = watch::channel(SyncStatusView {
            status: SyncStatusSnapshot::default(),
            online,
        });
        Arc::new(Self {
            queue,
            connectivity,
            view,
            interval,
            refresh_gate: Mutex::new(()),
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStatusView> {
        self.view.subscribe()
    }

    pub fn current(&self) -> SyncStatusView {
        self.view.borrow().clone()
    }

    /// Re-reads the queue right away, e.g. after a manual sync.
    pub async fn refresh(&self) -> Result<SyncStatusView, AppError> {
        // Read and publish under one lock so a slow read never overwrites a newer one.
        let _guard = self.refresh_gate.lock().await;
        let status = self.queue.status().await?;
        let next = SyncStatusView {
            status,
            online: self.connectivity.borrow().is_online(),
        };
        self.view.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next.clone();
            true
        });
        Ok(next)
    }

    /// Polls on the configured interval and on every connectivity change.
    /// Abort the returned handle to stop.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(monitor.interval);
            let mut connectivity = monitor.connectivity.clone();
            let mut signal_open = true;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    changed = connectivity.changed(), if signal_open => {
                        signal_open = changed.is_ok();
                    }
                }

                if let Err(err) = monitor.refresh().await {
                    tracing::warn!(
                        target: "offline::status",
                        error = %err,
                        "failed to refresh sync status"
                    );
                }
            }
        })
    }
}
