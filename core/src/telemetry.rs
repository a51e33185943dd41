use std::time::{Duration, SystemTime};

use serde::Serialize;
use sysinfo::System;
use tokio::sync::Mutex;

/// Session counters served on `/api/status`. Predictions are counted, never
/// stored; nothing here outlives the process.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub single_predictions: u64,
    pub batch_runs: u64,
    pub batch_rows: u64,
    pub failures: u64,
    pub uptime: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    pub cpu_percent: f32,
    pub memory_mb: u64,
    pub memory_percent: f32,
}

#[derive(Debug, Default)]
struct StatsCounters {
    single_predictions: u64,
    batch_runs: u64,
    batch_rows: u64,
    failures: u64,
}

pub struct TelemetryStore {
    start_time: SystemTime,
    stats: Mutex<StatsCounters>,
    system: Mutex<System>,
}

impl TelemetryStore {
    pub fn new() -> Self {
        let mut system = System::new_all();
        system.refresh_all();

        TelemetryStore {
            start_time: SystemTime::now(),
            stats: Mutex::new(StatsCounters::default()),
            system: Mutex::new(system),
        }
    }

    pub async fn record_single(&self) {
        let mut stats = self.stats.lock().await;
        stats.single_predictions = stats.single_predictions.saturating_add(1);
    }

    pub async fn record_batch(&self, rows: u64) {
        let mut stats = self.stats.lock().await;
        stats.batch_runs = stats.batch_runs.saturating_add(1);
        stats.batch_rows = stats.batch_rows.saturating_add(rows);
    }

    pub async fn record_failure(&self) {
        let mut stats = self.stats.lock().await;
        stats.failures = stats.failures.saturating_add(1);
    }

    pub async fn snapshot_stats(&self) -> StatsSnapshot {
        let stats = self.stats.lock().await;
        StatsSnapshot {
            single_predictions: stats.single_predictions,
            batch_runs: stats.batch_runs,
            batch_rows: stats.batch_rows,
            failures: stats.failures,
            uptime: format_uptime(
                SystemTime::now()
                    .duration_since(self.start_time)
                    .unwrap_or(Duration::from_secs(0)),
            ),
        }
    }

    pub async fn health_snapshot(&self) -> SystemHealth {
        let mut system = self.system.lock().await;
        system.refresh_cpu();
        system.refresh_memory();

        let cpu_percent = system.global_cpu_info().cpu_usage();
        let total_mem = system.total_memory();
        let used_mem = system.used_memory();
        let memory_percent = if total_mem > 0 {
            (used_mem as f32 / total_mem as f32) * 100.0
        } else {
            0.0
        };

        SystemHealth {
            cpu_percent,
            memory_mb: used_mem / (1024 * 1024),
            memory_percent,
        }
    }
}

fn format_uptime(duration: Duration) -> String {
    let total_minutes = duration.as_secs() / 60;
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;
    format!("{}d {}h {}m", days, hours, minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 0h 0m");
        assert_eq!(format_uptime(Duration::from_secs(61 * 60)), "0d 1h 1m");
        assert_eq!(
            format_uptime(Duration::from_secs(26 * 60 * 60)),
            "1d 2h 0m"
        );
    }

    #[tokio::test]
    async fn counters_accumulate() {
        let store = TelemetryStore::new();
        store.record_single().await;
        store.record_single().await;
        store.record_batch(10).await;
        store.record_failure().await;

        let stats = store.snapshot_stats().await;
        assert_eq!(stats.single_predictions, 2);
        assert_eq!(stats.batch_runs, 1);
        assert_eq!(stats.batch_rows, 10);
        assert_eq!(stats.failures, 1);
    }
}
