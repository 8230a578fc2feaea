use evidence_offline::application::ports::SyncNotifier;
use evidence_offline::domain::entities::offline::SyncReport;
use std::sync::Mutex;

#[derive(Default)]
pub struct RecordingNotifier {
    reports: Mutex<Vec<SyncReport>>,
    failures: Mutex<Vec<String>>,
    connectivity: Mutex<Vec<bool>>,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn reports(&self) -> Vec<SyncReport> {
        self.reports.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().unwrap().clone()
    }

    pub fn connectivity(&self) -> Vec<bool> {
        self.connectivity.lock().unwrap().clone()
    }
}

impl SyncNotifier for RecordingNotifier {
    fn sync_completed(&self, report: &SyncReport) {
        self.reports.lock().unwrap().push(*report);
    }

    fn sync_failed(&self, message: &str) {
        self.failures.lock().unwrap().push(message.to_string());
    }

    fn connectivity_changed(&self, online: bool) {
        self.connectivity.lock().unwrap().push(online);
    }
}
