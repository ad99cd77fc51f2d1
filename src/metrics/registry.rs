//! Registration of every phase's metrics with conflict detection

use crate::metrics::{MetricDoc, PhaseMetrics};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Register all metrics from all phases and return the distinct metric names
/// that were registered.
pub fn register_all_metrics() -> Vec<&'static str> {
    let mut all_metrics = HashMap::new();

    register_phase_metrics::<super::pipeline::PipelineMetrics>(&mut all_metrics);
    register_phase_metrics::<super::cache::CacheMetrics>(&mut all_metrics);

    info!(
        "Registered {} total metrics across all phases",
        all_metrics.len()
    );
    let mut names: Vec<_> = all_metrics.into_keys().collect();
    names.sort_unstable();
    names
}

/// Register metrics for a specific phase and detect conflicts
fn register_phase_metrics<T: PhaseMetrics>(all_metrics: &mut HashMap<&'static str, (&'static str, MetricDoc)>) {
    T::register_metrics();
    let phase_name = T::phase_name();

    for doc in T::metrics_documentation() {
        if let Some((existing_phase, _)) = all_metrics.get(doc.name) {
            warn!(
                "Metric name conflict: '{}' is defined by both '{}' and '{}'",
                doc.name, existing_phase, phase_name
            );
        } else {
            debug!(
                "  - {} ({:?}, labels {:?}): {}",
                doc.name, doc.metric_type, doc.labels, doc.help
            );
            all_metrics.insert(doc.name, (phase_name, doc));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::cache::CacheMetrics;
    use crate::metrics::pipeline::PipelineMetrics;

    #[test]
    fn test_metric_names_are_unique_and_prefixed() {
        let documented = PipelineMetrics::metrics_documentation().len()
            + CacheMetrics::metrics_documentation().len();
        let names = register_all_metrics();
        assert_eq!(names.len(), documented);
        assert!(names.iter().all(|name| name.starts_with("phc_")));
    }
}
