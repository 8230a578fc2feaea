use crate::domain::entities::offline::SyncReport;

/// User-facing surface for sync outcomes (toasts, indicators).
pub trait SyncNotifier: Send + Sync {
    fn sync_completed(&self, report: &SyncReport);
    fn sync_failed(&self, message: &str);
    fn connectivity_changed(&self, online: bool) {
        let _ = online;
    }
}

pub struct TracingNotifier;

impl SyncNotifier for TracingNotifier {
    fn sync_completed(&self, report: &SyncReport) {
        if report.is_clean() {
            tracing::info!(
                target: "offline::notify",
                success = report.success,
                pending = report.pending_count,
                "offline data synced"
            );
        } else {
            tracing::warn!(
                target: "offline::notify",
                success = report.success,
                failed = report.failed,
                dead_lettered = report.dead_lettered,
                pending = report.pending_count,
                "offline sync finished with failures"
            );
        }
    }

    fn sync_failed(&self, message: &str) {
        tracing::error!(target: "offline::notify", error = message, "offline sync failed");
    }

    fn connectivity_changed(&self, online: bool) {
        tracing::info!(target: "offline::notify", online, "connectivity changed");
    }
}
