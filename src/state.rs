use crate::application::ports::evidence_remote::EvidenceRemote;
use crate::application::ports::offline_queue::OfflineQueue;
use crate::application::ports::sync_notifier::SyncNotifier;
use crate::application::ports::sync_trigger::SyncTrigger;
use crate::application::services::{OfflineService, SyncService, SyncStatusMonitor};
use crate::domain::entities::offline::SyncReport;
use crate::domain::value_objects::ConnectivityState;
use crate::infrastructure::network::{ConnectivitySignal, ConnectivityWatcher, WatcherHandle};
use crate::infrastructure::offline::SqliteOfflineQueue;
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Wires the queue, services and background tasks for one host process.
pub struct OfflineRuntime {
    pub config: AppConfig,
    pub queue: Arc<SqliteOfflineQueue>,
    pub offline_service: Arc<OfflineService>,
    pub sync_service: Arc<SyncService>,
    pub status_monitor: Arc<SyncStatusMonitor>,
    pub connectivity: Arc<ConnectivitySignal>,
    notifier: Arc<dyn SyncNotifier>,
    watcher: Option<WatcherHandle>,
    monitor_task: JoinHandle<()>,
}

impl OfflineRuntime {
    /// Starts offline. The host reports connectivity through `connectivity`,
    /// and the first `Online` it publishes triggers a sync.
    pub async fn initialize(
        config: AppConfig,
        remote: Arc<dyn EvidenceRemote>,
        notifier: Arc<dyn SyncNotifier>,
    ) -> anyhow::Result<Self> {
        Self::initialize_with_connectivity(config, remote, notifier, ConnectivityState::Offline)
            .await
    }

    pub async fn initialize_with_connectivity(
        config: AppConfig,
        remote: Arc<dyn EvidenceRemote>,
        notifier: Arc<dyn SyncNotifier>,
        initial: ConnectivityState,
    ) -> anyhow::Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid offline configuration: {e}"))?;
        ensure_database_dir(&config.database.url)?;

        let queue = Arc::new(
            SqliteOfflineQueue::connect(&config.database, config.storage.quota_bytes).await?,
        );
        let offline_service = Arc::new(OfflineService::new(queue.clone(), &config.storage));
        let sync_service = Arc::new(SyncService::new(
            queue.clone(),
            remote,
            config.sync.clone(),
        ));

        let connectivity = Arc::new(ConnectivitySignal::new(initial));
        let status_monitor = SyncStatusMonitor::new(
            queue.clone(),
            connectivity.subscribe(),
            config.sync.status_refresh_interval(),
        );
        let monitor_task = status_monitor.start();

        let watcher = if config.sync.auto_sync {
            Some(
                ConnectivityWatcher::new(
                    connectivity.subscribe(),
                    Arc::new(RefreshingTrigger {
                        sync: sync_service.clone(),
                        monitor: status_monitor.clone(),
                    }),
                    notifier.clone(),
                )
                .start(),
            )
        } else {
            None
        };

        tracing::info!(
            target: "offline::runtime",
            database = %config.database.url,
            auto_sync = config.sync.auto_sync,
            "offline runtime initialized"
        );

        Ok(Self {
            config,
            queue,
            offline_service,
            sync_service,
            status_monitor,
            connectivity,
            notifier,
            watcher,
            monitor_task,
        })
    }

    /// Backs the "sync now" button. Offline it fails without touching the
    /// remote; with nothing queued it returns an empty report. Refuses while
    /// another cycle runs and refreshes the status surface afterwards.
    pub async fn sync_now(&self) -> Result<SyncReport, AppError> {
        if !self.connectivity.current().is_online() {
            tracing::debug!(target: "offline::runtime", "manual sync refused while offline");
            return Err(AppError::Offline);
        }
        if self.queue.status().await?.pending_count == 0 {
            self.refresh_status().await;
            return Ok(SyncReport::default());
        }

        let outcome = self.sync_service.try_sync_now().await;
        match &outcome {
            Ok(report) => self.notifier.sync_completed(report),
            Err(AppError::SyncInProgress) => {}
            Err(err) => self.notifier.sync_failed(&err.to_string()),
        }
        self.refresh_status().await;
        outcome
    }

    async fn refresh_status(&self) {
        if let Err(err) = self.status_monitor.refresh().await {
            tracing::warn!(target: "offline::runtime", error = %err, "status refresh failed");
        }
    }

    pub async fn shutdown(mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.shutdown().await;
        }
        self.monitor_task.abort();
        self.queue.pool().close().await;
        tracing::info!(target: "offline::runtime", "offline runtime stopped");
    }
}

/// Automatic syncs refresh the status surface before their outcome is announced.
struct RefreshingTrigger {
    sync: Arc<SyncService>,
    monitor: Arc<SyncStatusMonitor>,
}

#[async_trait]
impl SyncTrigger for RefreshingTrigger {
    async fn sync_offline_data(&self) -> Result<SyncReport, AppError> {
        let outcome = self.sync.sync_offline_data().await;
        if let Err(err) = self.monitor.refresh().await {
            tracing::warn!(target: "offline::runtime", error = %err, "status refresh failed");
        }
        outcome
    }
}

fn ensure_database_dir(url: &str) -> anyhow::Result<()> {
    let path = url
        .trim_start_matches("sqlite:")
        .trim_start_matches("//");
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(':') {
        return Ok(());
    }
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
