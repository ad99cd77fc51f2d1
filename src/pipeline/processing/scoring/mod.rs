//! Per-dataset sub-score computation.
//!
//! Each scorer sees the complete, materialized dataset, because several
//! sub-scores (percentile ranks, min-max norms) are relative to every other
//! record in the same dataset.

pub mod inclusivity;
pub mod infrastructure;
pub mod service_delivery;

pub use inclusivity::InclusivityScorer;
pub use infrastructure::InfrastructureScorer;
pub use service_delivery::ServiceDeliveryScorer;

use tracing::debug;

use crate::constants::{LGA_CANDIDATES, NAME_CANDIDATES, STATE_CANDIDATES};
use crate::pipeline::processing::fields::{first_non_empty, first_non_empty_text, is_affirmative};
use crate::pipeline::processing::normalize::normalize_facility_value;
use crate::types::{Dataset, RawSurveyRecord, RecordIdentity, ScoredDataset};

/// Computes raw sub-scores for one source dataset.
pub trait DatasetScorer: Send + Sync {
    fn dataset(&self) -> Dataset;

    fn score(&self, records: &[RawSurveyRecord]) -> ScoredDataset;
}

/// The scorer responsible for a dataset
pub fn scorer_for(dataset: Dataset) -> Box<dyn DatasetScorer> {
    match dataset {
        Dataset::ServiceDelivery => Box::new(ServiceDeliveryScorer),
        Dataset::Infrastructure => Box::new(InfrastructureScorer),
        Dataset::Inclusivity => Box::new(InclusivityScorer),
    }
}

/// Resolve the facility identity of a record. `None` when no name candidate
/// holds a usable name.
pub fn resolve_identity(record: &RawSurveyRecord) -> Option<RecordIdentity> {
    let name = first_non_empty(record, NAME_CANDIDATES, serde_json::Value::Null);
    let facility_key = normalize_facility_value(&name);
    if facility_key.is_empty() {
        return None;
    }

    Some(RecordIdentity {
        facility_key,
        original_name: name.as_str().unwrap_or_default().to_string(),
        lga: first_non_empty_text(record, LGA_CANDIDATES),
        state: first_non_empty_text(record, STATE_CANDIDATES),
    })
}

/// Pair every record with its identity, dropping records without one.
/// Returns the kept pairs and the number dropped.
pub(crate) fn identify<'a>(
    dataset: Dataset,
    records: &'a [RawSurveyRecord],
) -> (Vec<(&'a RawSurveyRecord, RecordIdentity)>, usize) {
    let mut kept = Vec::with_capacity(records.len());
    let mut dropped = 0;
    for record in records {
        match resolve_identity(record) {
            Some(identity) => kept.push((record, identity)),
            None => {
                debug!(dataset = %dataset, row = record.row, "Dropping record with no facility name");
                dropped += 1;
            }
        }
    }
    (kept, dropped)
}

/// Number of columns answered with one of the accepted values
pub fn count_affirmative(record: &RawSurveyRecord, columns: &[&str], accepted: &[&str]) -> usize {
    columns
        .iter()
        .filter(|column| is_affirmative(record, column, accepted))
        .count()
}
