use crate::application::ports::sync_notifier::SyncNotifier;
use crate::application::ports::sync_trigger::SyncTrigger;
use crate::domain::value_objects::ConnectivityState;
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

/// Host-side publisher of the online/offline signal.
pub struct ConnectivitySignal {
    sender: watch::Sender<ConnectivityState>,
}

impl ConnectivitySignal {
    pub fn new(initial: ConnectivityState) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// Publishes `state`. Repeating the current state wakes nobody.
    pub fn set(&self, state: ConnectivityState) {
        self.sender.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });
    }

    pub fn set_online(&self, online: bool) {
        self.set(ConnectivityState::from(online));
    }

    pub fn current(&self) -> ConnectivityState {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.sender.subscribe()
    }
}

impl Default for ConnectivitySignal {
    fn default() -> Self {
        Self::new(ConnectivityState::Offline)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityTransition {
    pub from: ConnectivityState,
    pub to: ConnectivityState,
}

impl ConnectivityTransition {
    pub fn is_reconnect(&self) -> bool {
        !self.from.is_online() && self.to.is_online()
    }
}

type TransitionHandler = Arc<dyn Fn(ConnectivityTransition) + Send + Sync>;

/// Runs one sync when started online and one per offline-to-online edge.
///
/// Sync runs inline on the watcher task, so flaps that happen while a cycle
/// is in flight collapse into the latest state.
pub struct ConnectivityWatcher {
    connectivity: watch::Receiver<ConnectivityState>,
    trigger: Arc<dyn SyncTrigger>,
    notifier: Arc<dyn SyncNotifier>,
    handlers: Vec<TransitionHandler>,
}

impl ConnectivityWatcher {
    pub fn new(
        connectivity: watch::Receiver<ConnectivityState>,
        trigger: Arc<dyn SyncTrigger>,
        notifier: Arc<dyn SyncNotifier>,
    ) -> Self {
        Self {
            connectivity,
            trigger,
            notifier,
            handlers: Vec::new(),
        }
    }

    pub fn on_transition<F>(&mut self, handler: F)
    where
        F: Fn(ConnectivityTransition) + Send + Sync + 'static,
    {
        self.handlers.push(Arc::new(handler));
    }

    pub fn start(self) -> WatcherHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(shutdown_rx));
        WatcherHandle {
            shutdown: Some(shutdown_tx),
            task,
        }
    }

    async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        let mut last = *self.connectivity.borrow_and_update();
        tracing::debug!(target: "offline::connectivity", state = %last, "connectivity watcher started");

        if last.is_online() {
            self.sync_now().await;
        }

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                changed = self.connectivity.changed() => {
                    if changed.is_err() {
                        tracing::debug!(target: "offline::connectivity", "connectivity signal closed");
                        break;
                    }
                    let current = *self.connectivity.borrow_and_update();
                    if current == last {
                        continue;
                    }

                    let transition = ConnectivityTransition { from: last, to: current };
                    last = current;
                    tracing::info!(
                        target: "offline::connectivity",
                        from = %transition.from,
                        to = %transition.to,
                        "connectivity changed"
                    );

                    self.notifier.connectivity_changed(current.is_online());
                    for handler in &self.handlers {
                        handler(transition);
                    }
                    if transition.is_reconnect() {
                        self.sync_now().await;
                    }
                }
            }
        }
    }

    async fn sync_now(&self) {
        match self.trigger.sync_offline_data().await {
            Ok(report) => self.notifier.sync_completed(&report),
            Err(err) => {
                tracing::error!(target: "offline::connectivity", error = %err, "automatic sync failed");
                self.notifier.sync_failed(&err.to_string());
            }
        }
    }
}

pub struct WatcherHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    /// Stops the watcher, letting an in-flight sync finish first.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(err) = (&mut self.task).await {
            tracing::warn!(target: "offline::connectivity", error = %err, "watcher task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
