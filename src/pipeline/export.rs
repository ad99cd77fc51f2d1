//! Serialize the composed facility table into the output artifacts.
//!
//! Every file is written to a sibling `.tmp` path and renamed over the
//! previous output, so readers never see a partially written artifact.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::constants::*;
use crate::domain::{OutbreakAlert, ResourceWarning, UnderservedPhc};
use crate::error::{InsightError, Result};
use crate::metrics::PipelineMetrics;
use crate::pipeline::processing::compose::ComposedFacility;
use crate::types::Dataset;

/// Paths of the artifacts produced by one export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedArtifacts {
    pub outbreak_alerts: PathBuf,
    pub underserved_phcs: PathBuf,
    pub resource_warnings: PathBuf,
    pub metrics_summary: PathBuf,
}

pub fn outbreak_alerts(composed: &[ComposedFacility]) -> Vec<OutbreakAlert> {
    composed
        .iter()
        .map(|c| OutbreakAlert {
            name: c.row.facility_key.clone(),
            display_name: c.row.meta.display_name.clone(),
            lga: c.row.meta.lga.clone(),
            state: c.row.meta.state.clone(),
            shortage_score: c.indices.shortage_score,
            alert_level: c.indices.alert_level,
        })
        .collect()
}

pub fn underserved_phcs(composed: &[ComposedFacility]) -> Vec<UnderservedPhc> {
    composed
        .iter()
        .map(|c| UnderservedPhc {
            name: c.row.facility_key.clone(),
            display_name: c.row.meta.display_name.clone(),
            lga: c.row.meta.lga.clone(),
            state: c.row.meta.state.clone(),
            underserved_index: c.indices.underserved_index,
            underserved_flag: c.indices.underserved_flag,
        })
        .collect()
}

pub fn resource_warnings(composed: &[ComposedFacility]) -> Vec<ResourceWarning> {
    composed
        .iter()
        .map(|c| ResourceWarning {
            name: c.row.facility_key.clone(),
            display_name: c.row.meta.display_name.clone(),
            lga: c.row.meta.lga.clone(),
            state: c.row.meta.state.clone(),
            resource_risk_score: c.indices.resource_risk_score,
            resource_alert: c.indices.resource_alert,
        })
        .collect()
}

const COMPOSITE_COLUMNS: &[&str] = &[
    "service_score_norm",
    "underserved_index",
    "underserved_rank",
    "underserved_flag",
    "referrals_norm",
    "resource_risk_score",
    "resource_alert",
    "alert_level",
];

/// Header of the summary table: identity, each dataset's sub-scores, then
/// the composite columns.
pub fn summary_header() -> Vec<&'static str> {
    let mut header = vec!["name", "display_name", "lga", "state"];
    for dataset in Dataset::ALL {
        header.extend_from_slice(dataset.score_columns());
    }
    header.extend_from_slice(COMPOSITE_COLUMNS);
    header
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn summary_row(facility: &ComposedFacility) -> Vec<String> {
    let row = &facility.row;
    let indices = &facility.indices;

    let mut cells = vec![
        row.facility_key.clone(),
        row.meta.display_name.clone(),
        row.meta.lga.clone(),
        row.meta.state.clone(),
    ];
    for dataset in Dataset::ALL {
        for column in dataset.score_columns() {
            cells.push(cell(row.score(dataset, column)));
        }
    }
    cells.extend([
        cell(indices.service_score_norm),
        indices.underserved_index.to_string(),
        indices.underserved_rank.to_string(),
        indices.underserved_flag.to_string(),
        cell(indices.referrals_norm),
        indices.resource_risk_score.to_string(),
        indices.resource_alert.to_string(),
        indices.alert_level.to_string(),
    ]);
    cells
}

/// Render the full summary table as CSV bytes.
pub fn summary_csv(composed: &[ComposedFacility]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(summary_header())?;
    for facility in composed {
        writer.write_record(summary_row(facility))?;
    }
    writer
        .into_inner()
        .map_err(|e| InsightError::Io(e.into_error()))
}

/// Replace `path` with `bytes` via a temporary sibling and a rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| InsightError::Internal(format!("invalid artifact path {}", path.display())))?;
    let tmp_path = path.with_file_name(format!("{file_name}.tmp"));
    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

pub struct ArtifactExporter {
    output_dir: PathBuf,
}

impl ArtifactExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn write_json<T: Serialize>(&self, artifact: &'static str, file: &str, records: &[T]) -> Result<PathBuf> {
        let path = self.output_dir.join(file);
        let bytes = serde_json::to_vec_pretty(records)?;
        write_atomic(&path, &bytes)?;
        PipelineMetrics::record_artifact_written(artifact);
        info!("Wrote {} {} records to {}", records.len(), artifact, path.display());
        Ok(path)
    }

    /// Write all artifacts, replacing any output of a previous run.
    #[instrument(skip_all, fields(output_dir = %self.output_dir.display(), facilities = composed.len()))]
    pub fn export(&self, composed: &[ComposedFacility]) -> Result<ExportedArtifacts> {
        fs::create_dir_all(&self.output_dir)?;

        let outbreak_alerts = self.write_json(OUTBREAK_ALERTS, OUTBREAK_ALERTS_FILE, &outbreak_alerts(composed))?;
        let underserved_phcs = self.write_json(UNDERSERVED_PHCS, UNDERSERVED_PHCS_FILE, &underserved_phcs(composed))?;
        let resource_warnings =
            self.write_json(RESOURCE_WARNINGS, RESOURCE_WARNINGS_FILE, &resource_warnings(composed))?;

        let metrics_summary = self.output_dir.join(METRICS_SUMMARY_FILE);
        write_atomic(&metrics_summary, &summary_csv(composed)?)?;
        PipelineMetrics::record_artifact_written("metrics_summary");
        info!("Wrote summary table to {}", metrics_summary.display());

        Ok(ExportedArtifacts {
            outbreak_alerts,
            underserved_phcs,
            resource_warnings,
            metrics_summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::aggregate::AggregatedFacilityRow;
    use crate::pipeline::processing::categories::AlertLevel;
    use crate::pipeline::processing::compose::CompositeIndices;
    use crate::pipeline::processing::merge::MergedFacilityRow;
    use crate::types::{FacilityMeta, ScoreColumns};
    use serde_json::Value;
    use tempfile::tempdir;

    fn facility() -> ComposedFacility {
        let service = ScoreColumns::from([
            (SHORTAGE_SCORE, Some(2.0)),
            (MEAN_SERVICE_SCORE, Some(4.5)),
            (REFERRALS, None),
        ]);
        ComposedFacility {
            row: MergedFacilityRow {
                facility_key: "ikeja phc".to_string(),
                meta: FacilityMeta {
                    display_name: "Ikeja Phc".to_string(),
                    lga: "Ikeja".to_string(),
                    state: "Lagos".to_string(),
                },
                service_delivery: Some(AggregatedFacilityRow {
                    facility_key: "ikeja phc".to_string(),
                    scores: service,
                    submissions: 1,
                }),
                infrastructure: None,
                inclusivity: None,
            },
            indices: CompositeIndices {
                service_score_norm: Some(0.0),
                underserved_index: 0.8,
                underserved_rank: 1.0,
                underserved_flag: 1,
                referrals_norm: None,
                resource_risk_score: 0.4,
                resource_alert: AlertLevel::Medium,
                shortage_score: 2,
                alert_level: AlertLevel::Medium,
            },
        }
    }

    #[test]
    fn test_export_writes_all_artifacts() {
        let dir = tempdir().unwrap();
        let exporter = ArtifactExporter::new(dir.path().join("out"));
        let paths = exporter.export(&[facility()]).unwrap();

        let alerts: Value = serde_json::from_slice(&fs::read(&paths.outbreak_alerts).unwrap()).unwrap();
        assert_eq!(alerts[0]["name"], "ikeja phc");
        assert_eq!(alerts[0]["shortage_score"], 2);
        assert_eq!(alerts[0]["alert_level"], "Medium");

        let underserved: Value = serde_json::from_slice(&fs::read(&paths.underserved_phcs).unwrap()).unwrap();
        assert_eq!(underserved[0]["underserved_flag"], 1);

        let warnings: Value = serde_json::from_slice(&fs::read(&paths.resource_warnings).unwrap()).unwrap();
        assert_eq!(warnings[0]["resource_alert"], "Medium");

        // no temporary files left behind
        let leftovers = fs::read_dir(dir.path().join("out"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_summary_table_has_every_column() {
        let bytes = summary_csv(&[facility()]).unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), summary_header().len());
        assert_eq!(headers.iter().filter(|h| *h == SHORTAGE_SCORE).count(), 1);

        let row = reader.records().next().unwrap().unwrap();
        let get = |name: &str| {
            let idx = headers.iter().position(|h| h == name).unwrap();
            row.get(idx).unwrap().to_string()
        };
        assert_eq!(get("name"), "ikeja phc");
        assert_eq!(get(MEAN_SERVICE_SCORE), "4.5");
        assert_eq!(get(REFERRALS), "");
        assert_eq!(get(INFRA_SCORE_NORM), "");
        assert_eq!(get("underserved_flag"), "1");
        assert_eq!(get("alert_level"), "Medium");
    }

    #[test]
    fn test_rerun_replaces_previous_output() {
        let dir = tempdir().unwrap();
        let exporter = ArtifactExporter::new(dir.path());
        exporter.export(&[facility(), facility()]).unwrap();
        let paths = exporter.export(&[facility()]).unwrap();
        let alerts: Vec<Value> = serde_json::from_slice(&fs::read(paths.outbreak_alerts).unwrap()).unwrap();
        assert_eq!(alerts.len(), 1);
    }
}
