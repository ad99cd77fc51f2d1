//! Pipeline phase metrics: ingestion, scoring and export

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};
use crate::types::Dataset;

pub struct PipelineMetrics;

impl PipelineMetrics {
    pub fn record_dataset_loaded(dataset: Dataset, records: usize, skipped_rows: usize) {
        ::metrics::counter!(phase_metric!(counter, "pipeline", "records_loaded"), "dataset" => dataset.as_str())
            .increment(records as u64);
        ::metrics::counter!(phase_metric!(counter, "pipeline", "rows_skipped"), "dataset" => dataset.as_str())
            .increment(skipped_rows as u64);
    }

    /// Records discarded because no facility name resolved
    pub fn record_dropped(dataset: Dataset, dropped: usize) {
        ::metrics::counter!(phase_metric!(counter, "pipeline", "records_dropped"), "dataset" => dataset.as_str())
            .increment(dropped as u64);
    }

    pub fn record_artifact_written(artifact: &'static str) {
        ::metrics::counter!(phase_metric!(counter, "pipeline", "artifacts_written"), "artifact" => artifact)
            .increment(1);
    }

    pub fn record_run_success(duration_secs: f64, facilities: usize, underserved_flagged: usize) {
        ::metrics::counter!(phase_metric!(counter, "pipeline", "runs_success")).increment(1);
        ::metrics::histogram!(phase_metric!(histogram, "pipeline", "run_duration_seconds"))
            .record(duration_secs);
        ::metrics::gauge!(phase_metric!(gauge, "pipeline", "facilities")).set(facilities as f64);
        ::metrics::gauge!(phase_metric!(gauge, "pipeline", "underserved_flagged"))
            .set(underserved_flagged as f64);
    }

    pub fn record_run_failure() {
        ::metrics::counter!(phase_metric!(counter, "pipeline", "runs_failure")).increment(1);
    }
}

impl PhaseMetrics for PipelineMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge, histogram};

        let _ = counter!(phase_metric!(counter, "pipeline", "records_loaded"));
        let _ = counter!(phase_metric!(counter, "pipeline", "rows_skipped"));
        let _ = counter!(phase_metric!(counter, "pipeline", "records_dropped"));
        let _ = counter!(phase_metric!(counter, "pipeline", "artifacts_written"));
        let _ = counter!(phase_metric!(counter, "pipeline", "runs_success"));
        let _ = counter!(phase_metric!(counter, "pipeline", "runs_failure"));
        let _ = histogram!(phase_metric!(histogram, "pipeline", "run_duration_seconds"));
        let _ = gauge!(phase_metric!(gauge, "pipeline", "facilities"));
        let _ = gauge!(phase_metric!(gauge, "pipeline", "underserved_flagged"));
    }

    fn phase_name() -> &'static str {
        "pipeline"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "pipeline", "records_loaded"),
                metric_type: MetricType::Counter,
                help: "Survey records read from the source exports",
                labels: vec!["dataset"],
            },
            MetricDoc {
                name: phase_metric!(counter, "pipeline", "rows_skipped"),
                metric_type: MetricType::Counter,
                help: "Malformed source rows skipped during ingestion",
                labels: vec!["dataset"],
            },
            MetricDoc {
                name: phase_metric!(counter, "pipeline", "records_dropped"),
                metric_type: MetricType::Counter,
                help: "Records dropped for lack of a facility name",
                labels: vec!["dataset"],
            },
            MetricDoc {
                name: phase_metric!(counter, "pipeline", "artifacts_written"),
                metric_type: MetricType::Counter,
                help: "Output artifacts written",
                labels: vec!["artifact"],
            },
            MetricDoc {
                name: phase_metric!(counter, "pipeline", "runs_success"),
                metric_type: MetricType::Counter,
                help: "Completed pipeline runs",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "pipeline", "runs_failure"),
                metric_type: MetricType::Counter,
                help: "Aborted pipeline runs",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(histogram, "pipeline", "run_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Wall time of a full pipeline run",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(gauge, "pipeline", "facilities"),
                metric_type: MetricType::Gauge,
                help: "Distinct facilities in the last merged table",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(gauge, "pipeline", "underserved_flagged"),
                metric_type: MetricType::Gauge,
                help: "Facilities flagged underserved in the last run",
                labels: vec![],
            },
        ]
    }
}
