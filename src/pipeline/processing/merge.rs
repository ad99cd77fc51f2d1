//! Three-way join of the aggregated datasets on the facility key.

use std::collections::{HashMap, HashSet};

use crate::pipeline::processing::aggregate::{AggregatedDataset, AggregatedFacilityRow};
use crate::pipeline::processing::normalize::{display_name, normalize_lga, normalize_state};
use crate::types::{Dataset, FacilityMeta};

/// One facility across all three surveys. A dataset the facility is absent
/// from contributes no row.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedFacilityRow {
    pub facility_key: String,
    pub meta: FacilityMeta,
    pub service_delivery: Option<AggregatedFacilityRow>,
    pub infrastructure: Option<AggregatedFacilityRow>,
    pub inclusivity: Option<AggregatedFacilityRow>,
}

impl MergedFacilityRow {
    pub fn source(&self, dataset: Dataset) -> Option<&AggregatedFacilityRow> {
        match dataset {
            Dataset::ServiceDelivery => self.service_delivery.as_ref(),
            Dataset::Infrastructure => self.infrastructure.as_ref(),
            Dataset::Inclusivity => self.inclusivity.as_ref(),
        }
    }

    pub fn score(&self, dataset: Dataset, column: &str) -> Option<f64> {
        self.source(dataset).and_then(|row| row.score(column))
    }
}

/// Join the aggregates in the fixed order service delivery, infrastructure,
/// inclusivity, then attach facility meta.
///
/// Every key seen in any input yields exactly one row. Rows keep the order of
/// first appearance across the inputs in that same order. Meta values are
/// canonicalized here; a key with no meta gets a display name derived from
/// the key itself.
pub fn merge(
    service_delivery: &AggregatedDataset,
    infrastructure: &AggregatedDataset,
    inclusivity: &AggregatedDataset,
    meta: &HashMap<String, FacilityMeta>,
) -> Vec<MergedFacilityRow> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut keys: Vec<&str> = Vec::new();
    for dataset in [service_delivery, infrastructure, inclusivity] {
        for row in &dataset.rows {
            if seen.insert(row.facility_key.as_str()) {
                keys.push(row.facility_key.as_str());
            }
        }
    }

    let index = |dataset: &AggregatedDataset| -> HashMap<String, AggregatedFacilityRow> {
        dataset
            .rows
            .iter()
            .map(|row| (row.facility_key.clone(), row.clone()))
            .collect()
    };
    let mut service_rows = index(service_delivery);
    let mut infra_rows = index(infrastructure);
    let mut inclusivity_rows = index(inclusivity);

    keys.into_iter()
        .map(|key| {
            let raw_meta = meta.get(key).cloned().unwrap_or_default();
            let meta = FacilityMeta {
                display_name: if raw_meta.display_name.is_empty() {
                    display_name(key)
                } else {
                    raw_meta.display_name
                },
                lga: normalize_lga(&raw_meta.lga),
                state: normalize_state(&raw_meta.state),
            };

            MergedFacilityRow {
                facility_key: key.to_string(),
                meta,
                service_delivery: service_rows.remove(key),
                infrastructure: infra_rows.remove(key),
                inclusivity: inclusivity_rows.remove(key),
            }
        })
        .collect()
}
