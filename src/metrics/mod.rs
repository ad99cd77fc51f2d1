//! Metrics for the insight pipeline and the artifact cache
//!
//! Each phase defines its metrics in a dedicated submodule so names stay
//! consistent and conflicts surface at registration time.

pub mod cache;
pub mod pipeline;
pub mod registry;

pub use cache::CacheMetrics;
pub use pipeline::PipelineMetrics;

use std::path::{Path, PathBuf};
use std::sync::{Once, OnceLock};
use tracing::{info, warn};

use crate::constants::METRICS_SNAPSHOT_FILE;
use crate::error::Result;

static INIT: Once = Once::new();
static HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder and register every phase's metrics.
///
/// Idempotent. No listener is started; the handle is kept so a batch run can
/// render a snapshot before it exits.
pub fn init_metrics() {
    INIT.call_once(|| {
        match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                if HANDLE.set(handle).is_err() {
                    warn!("Prometheus handle already stored");
                }
                let registered = registry::register_all_metrics();
                info!(metrics = registered.len(), "Prometheus recorder installed");
            }
            Err(e) => {
                warn!("Failed to install Prometheus recorder: {}", e);
            }
        }
    });
}

/// Render the current metric values in the Prometheus text format, if a
/// recorder is installed.
pub fn render_snapshot() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

/// Write the rendered snapshot to `<output_dir>/metrics.prom`.
pub fn write_snapshot(output_dir: &Path) -> Result<Option<PathBuf>> {
    let Some(rendered) = render_snapshot() else {
        return Ok(None);
    };
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(METRICS_SNAPSHOT_FILE);
    std::fs::write(&path, rendered)?;
    info!("Metrics snapshot written to {}", path.display());
    Ok(Some(path))
}

/// Trait for phase-specific metrics collections
pub trait PhaseMetrics {
    /// Register all metrics for this phase
    fn register_metrics();

    /// Phase name used as the metric prefix
    fn phase_name() -> &'static str;

    /// Documentation for every metric in this phase
    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
    pub labels: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
    Gauge,
}

/// Build a metric name following `phc_{phase}_{metric_name}[_total]`
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("phc_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("phc_", $phase, "_", $name)
    };
    (gauge, $phase:literal, $name:literal) => {
        concat!("phc_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;
