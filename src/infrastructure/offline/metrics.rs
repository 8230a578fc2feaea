use crate::domain::entities::offline::SyncReport;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const UNSET_TS: u64 = 0;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OfflineSyncMetricsSnapshot {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub consecutive_failed_cycles: u64,
    pub records_synced: u64,
    pub records_failed: u64,
    pub records_dead_lettered: u64,
    pub last_cycle_ms: Option<u64>,
    pub last_duration_ms: Option<u64>,
}

struct OfflineSyncMetrics {
    cycles: AtomicU64,
    failed_cycles: AtomicU64,
    consecutive_failed_cycles: AtomicU64,
    records_synced: AtomicU64,
    records_failed: AtomicU64,
    records_dead_lettered: AtomicU64,
    last_cycle_ms: AtomicU64,
    last_duration_ms: AtomicU64,
}

impl OfflineSyncMetrics {
    const fn new() -> Self {
        Self {
            cycles: AtomicU64::new(0),
            failed_cycles: AtomicU64::new(0),
            consecutive_failed_cycles: AtomicU64::new(0),
            records_synced: AtomicU64::new(0),
            records_failed: AtomicU64::new(0),
            records_dead_lettered: AtomicU64::new(0),
            last_cycle_ms: AtomicU64::new(UNSET_TS),
            last_duration_ms: AtomicU64::new(UNSET_TS),
        }
    }

    fn record(&self, report: &SyncReport, duration: Duration) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.records_synced
            .fetch_add(u64::from(report.success), Ordering::Relaxed);
        self.records_failed
            .fetch_add(u64::from(report.failed), Ordering::Relaxed);
        self.records_dead_lettered
            .fetch_add(u64::from(report.dead_lettered), Ordering::Relaxed);
        if report.failed > 0 {
            self.failed_cycles.fetch_add(1, Ordering::Relaxed);
            self.consecutive_failed_cycles
                .fetch_add(1, Ordering::Relaxed);
        } else {
            self.consecutive_failed_cycles.store(0, Ordering::Relaxed);
        }
        self.last_cycle_ms
            .store(current_unix_ms(), Ordering::Relaxed);
        self.last_duration_ms
            .store(duration.as_millis() as u64, Ordering::Relaxed);
    }

    fn snapshot(&self) -> OfflineSyncMetricsSnapshot {
        let cycles = self.cycles.load(Ordering::Relaxed);
        OfflineSyncMetricsSnapshot {
            cycles,
            failed_cycles: self.failed_cycles.load(Ordering::Relaxed),
            consecutive_failed_cycles: self.consecutive_failed_cycles.load(Ordering::Relaxed),
            records_synced: self.records_synced.load(Ordering::Relaxed),
            records_failed: self.records_failed.load(Ordering::Relaxed),
            records_dead_lettered: self.records_dead_lettered.load(Ordering::Relaxed),
            last_cycle_ms: timestamp_to_option(self.last_cycle_ms.load(Ordering::Relaxed)),
            last_duration_ms: if cycles > 0 {
                Some(self.last_duration_ms.load(Ordering::Relaxed))
            } else {
                None
            },
        }
    }

    fn reset(&self) {
        for counter in [
            &self.cycles,
            &self.failed_cycles,
            &self.consecutive_failed_cycles,
            &self.records_synced,
            &self.records_failed,
            &self.records_dead_lettered,
            &self.last_cycle_ms,
            &self.last_duration_ms,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

static METRICS: OfflineSyncMetrics = OfflineSyncMetrics::new();

pub fn record_cycle(report: &SyncReport, duration: Duration) {
    METRICS.record(report, duration);
}

pub fn snapshot() -> OfflineSyncMetricsSnapshot {
    METRICS.snapshot()
}

pub fn reset() {
    METRICS.reset();
}

fn current_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(UNSET_TS)
}

fn timestamp_to_option(value: u64) -> Option<u64> {
    if value == UNSET_TS {
        None
    } else {
        Some(value)
    }
}
