use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, info_span, instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::error::Result;
use crate::metrics::PipelineMetrics;
use crate::pipeline::export::{ArtifactExporter, ExportedArtifacts};
use crate::pipeline::ingestion::load_dataset;
use crate::pipeline::processing::aggregate::{aggregate, collect_meta};
use crate::pipeline::processing::categories::AlertLevel;
use crate::pipeline::processing::compose::{ComposedFacility, IndexComposer};
use crate::pipeline::processing::merge::merge;
use crate::pipeline::processing::scoring::scorer_for;
use crate::types::{Dataset, ScoredDataset};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            output_dir: config.output_dir.clone(),
        }
    }
}

/// Per-dataset counts for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub dataset: Dataset,
    pub records: usize,
    pub skipped_rows: usize,
    pub dropped: usize,
    pub facilities: usize,
}

/// The composed facility table before export
#[derive(Debug, Clone)]
pub struct FacilityTable {
    pub facilities: Vec<ComposedFacility>,
    pub datasets: Vec<DatasetSummary>,
    pub diagnostics: Vec<String>,
}

/// Result of a complete pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub datasets: Vec<DatasetSummary>,
    pub facilities: usize,
    pub underserved_flagged: usize,
    pub high_shortage_alerts: usize,
    pub high_resource_alerts: usize,
    pub diagnostics: Vec<String>,
    pub artifacts: ExportedArtifacts,
}

pub struct Pipeline;

impl Pipeline {
    /// Ingest, score, aggregate, merge and compose. Nothing is written.
    #[instrument(skip_all, fields(data_dir = %config.data_dir.display()))]
    pub fn build_table(config: &PipelineConfig) -> Result<FacilityTable> {
        let mut scored: Vec<ScoredDataset> = Vec::with_capacity(Dataset::ALL.len());
        let mut datasets = Vec::with_capacity(Dataset::ALL.len());
        let mut diagnostics = Vec::new();

        for dataset in Dataset::ALL {
            let _span = info_span!("dataset", dataset = %dataset).entered();
            let table = load_dataset(dataset, &config.data_dir)?;
            PipelineMetrics::record_dataset_loaded(dataset, table.records.len(), table.skipped);

            let result = scorer_for(dataset).score(&table.records);
            PipelineMetrics::record_dropped(dataset, result.dropped);
            diagnostics.extend(
                result
                    .diagnostics
                    .iter()
                    .map(|note| format!("{}: {}", dataset, note)),
            );
            if table.skipped > 0 {
                diagnostics.push(format!("{}: {} malformed rows skipped", dataset, table.skipped));
            }

            datasets.push(DatasetSummary {
                dataset,
                records: table.records.len(),
                skipped_rows: table.skipped,
                dropped: result.dropped,
                facilities: 0,
            });
            scored.push(result);
        }

        let aggregated: Vec<_> = scored.iter().map(aggregate).collect();
        for (summary, agg) in datasets.iter_mut().zip(&aggregated) {
            summary.facilities = agg.rows.len();
        }

        let meta = collect_meta(&scored.iter().collect::<Vec<_>>());
        let merged = merge(&aggregated[0], &aggregated[1], &aggregated[2], &meta);
        info!("Merged {} distinct facilities", merged.len());

        Ok(FacilityTable {
            facilities: IndexComposer::compose(merged),
            datasets,
            diagnostics,
        })
    }

    /// Run the complete pipeline and replace the artifacts in the output directory.
    #[instrument(skip_all, fields(output_dir = %config.output_dir.display()))]
    pub fn run(config: &PipelineConfig) -> Result<PipelineResult> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let timer = Instant::now();
        info!(%run_id, "Starting pipeline run");

        let outcome = Self::build_table(config).and_then(|table| {
            let artifacts = ArtifactExporter::new(&config.output_dir).export(&table.facilities)?;
            Ok((table, artifacts))
        });

        let (table, artifacts) = match outcome {
            Ok(done) => done,
            Err(e) => {
                PipelineMetrics::record_run_failure();
                error!(%run_id, "Pipeline run failed: {}", e);
                return Err(e);
            }
        };

        let facilities = &table.facilities;
        let underserved_flagged = facilities.iter().filter(|f| f.indices.underserved_flag == 1).count();
        let high_shortage_alerts = facilities
            .iter()
            .filter(|f| f.indices.alert_level == AlertLevel::High)
            .count();
        let high_resource_alerts = facilities
            .iter()
            .filter(|f| f.indices.resource_alert == AlertLevel::High)
            .count();

        PipelineMetrics::record_run_success(
            timer.elapsed().as_secs_f64(),
            table.facilities.len(),
            underserved_flagged,
        );

        let result = PipelineResult {
            run_id,
            started_at,
            finished_at: Utc::now(),
            datasets: table.datasets,
            facilities: table.facilities.len(),
            underserved_flagged,
            high_shortage_alerts,
            high_resource_alerts,
            diagnostics: table.diagnostics,
            artifacts,
        };
        info!(
            %run_id,
            facilities = result.facilities,
            underserved_flagged = result.underserved_flagged,
            "Pipeline run complete"
        );
        Ok(result)
    }
}
