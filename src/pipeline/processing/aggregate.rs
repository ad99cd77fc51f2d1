//! Collapse duplicate submissions into one row per facility.

use std::collections::{BTreeMap, HashMap};

use crate::pipeline::processing::normalize::display_name;
use crate::types::{Dataset, FacilityMeta, ScoreColumns, ScoredDataset};

/// One facility's sub-scores, averaged across its submissions in one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedFacilityRow {
    pub facility_key: String,
    pub scores: ScoreColumns,
    /// Number of submissions folded into this row
    pub submissions: usize,
}

impl AggregatedFacilityRow {
    pub fn score(&self, column: &str) -> Option<f64> {
        self.scores.get(column).copied().flatten()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedDataset {
    pub dataset: Dataset,
    /// Rows in order of each key's first appearance
    pub rows: Vec<AggregatedFacilityRow>,
}

#[derive(Default)]
struct Accumulator {
    submissions: usize,
    // column -> (sum, present count)
    columns: BTreeMap<&'static str, (f64, usize)>,
}

/// Group records by facility key and take the arithmetic mean of every
/// sub-score column. Missing values are left out of both sum and count; a
/// column with no present value stays missing.
pub fn aggregate(scored: &ScoredDataset) -> AggregatedDataset {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Accumulator> = HashMap::new();

    for record in &scored.records {
        let key = &record.identity.facility_key;
        let group = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            Accumulator::default()
        });
        group.submissions += 1;

        for (column, value) in &record.scores {
            let slot = group.columns.entry(*column).or_insert((0.0, 0));
            if let Some(v) = value.filter(|v| !v.is_nan()) {
                slot.0 += v;
                slot.1 += 1;
            }
        }
    }

    let rows = order
        .into_iter()
        .map(|key| {
            let group = groups.remove(&key).unwrap_or_default();
            let scores = group
                .columns
                .into_iter()
                .map(|(column, (sum, count))| {
                    let mean = if count > 0 { Some(sum / count as f64) } else { None };
                    (column, mean)
                })
                .collect();
            AggregatedFacilityRow {
                facility_key: key,
                scores,
                submissions: group.submissions,
            }
        })
        .collect();

    AggregatedDataset {
        dataset: scored.dataset,
        rows,
    }
}

/// First non-empty display name, LGA and state per facility key, scanning the
/// datasets in the order given and each dataset in record order. Every field
/// is filled independently.
pub fn collect_meta(datasets: &[&ScoredDataset]) -> HashMap<String, FacilityMeta> {
    let mut meta: HashMap<String, FacilityMeta> = HashMap::new();

    for dataset in datasets {
        for record in &dataset.records {
            let identity = &record.identity;
            let entry = meta.entry(identity.facility_key.clone()).or_default();
            if entry.display_name.is_empty() && !identity.original_name.is_empty() {
                entry.display_name = display_name(&identity.original_name);
            }
            if entry.lga.is_empty() && !identity.lga.is_empty() {
                entry.lga = identity.lga.clone();
            }
            if entry.state.is_empty() && !identity.state.is_empty() {
                entry.state = identity.state.clone();
            }
        }
    }

    meta
}
