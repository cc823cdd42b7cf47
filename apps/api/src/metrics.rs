//! Lightweight analysis counters behind `/api/v1/stats`. Plain atomics; no
//! lock is worth taking on this path.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct ApiMetrics {
    total: AtomicU64,
    failed: AtomicU64,
    latency_ms_sum: AtomicU64,
}

/// Point-in-time view of the counters, serialized as the stats payload.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub total_analyses: u64,
    pub success_rate: f64,
    pub average_processing_time_ms: f64,
}

impl ApiMetrics {
    pub fn record_success(&self, elapsed: Duration) {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.latency_ms_sum
            .fetch_add(elapsed.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let total = self.total.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        let latency_sum = self.latency_ms_sum.load(Ordering::Relaxed);
        let succeeded = total.saturating_sub(failed);

        StatsSnapshot {
            total_analyses: total,
            success_rate: if total > 0 {
                succeeded as f64 / total as f64
            } else {
                0.0
            },
            average_processing_time_ms: if succeeded > 0 {
                latency_sum as f64 / succeeded as f64
            } else {
                0.0
            },
        }
    }
}
