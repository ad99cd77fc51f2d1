//! Artifact cache metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct CacheMetrics;

impl CacheMetrics {
    pub fn record_hit() {
        ::metrics::counter!(phase_metric!(counter, "cache", "hits")).increment(1);
    }

    pub fn record_miss() {
        ::metrics::counter!(phase_metric!(counter, "cache", "misses")).increment(1);
    }

    pub fn record_load(duration_secs: f64, success: bool) {
        if success {
            ::metrics::counter!(phase_metric!(counter, "cache", "loads_success")).increment(1);
        } else {
            ::metrics::counter!(phase_metric!(counter, "cache", "loads_error")).increment(1);
        }
        ::metrics::histogram!(phase_metric!(histogram, "cache", "load_duration_seconds"))
            .record(duration_secs);
    }

    pub fn record_clear(entries: usize) {
        ::metrics::counter!(phase_metric!(counter, "cache", "clears")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "cache", "entries_evicted")).increment(entries as u64);
    }
}

impl PhaseMetrics for CacheMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "cache", "hits"));
        let _ = counter!(phase_metric!(counter, "cache", "misses"));
        let _ = counter!(phase_metric!(counter, "cache", "loads_success"));
        let _ = counter!(phase_metric!(counter, "cache", "loads_error"));
        let _ = counter!(phase_metric!(counter, "cache", "clears"));
        let _ = counter!(phase_metric!(counter, "cache", "entries_evicted"));
        let _ = histogram!(phase_metric!(histogram, "cache", "load_duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "cache"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "cache", "hits"),
                metric_type: MetricType::Counter,
                help: "Reads served from a fresh cache entry",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "cache", "misses"),
                metric_type: MetricType::Counter,
                help: "Reads that found no fresh entry or asked for a refresh",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "cache", "loads_success"),
                metric_type: MetricType::Counter,
                help: "Underlying artifact loads that succeeded",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "cache", "loads_error"),
                metric_type: MetricType::Counter,
                help: "Underlying artifact loads that failed",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "cache", "clears"),
                metric_type: MetricType::Counter,
                help: "Explicit cache resets",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "cache", "entries_evicted"),
                metric_type: MetricType::Counter,
                help: "Entries dropped by explicit resets",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(histogram, "cache", "load_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Time spent loading one artifact",
                labels: vec![],
            },
        ]
    }
}
