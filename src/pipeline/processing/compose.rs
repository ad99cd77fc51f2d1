//! Composite indices over the merged facility table.
//!
//! Order of work: normalize (min-max), weight, rank, band. A sub-score that
//! is missing because the facility is absent from a dataset counts as 0.

use serde::Serialize;
use tracing::{info, instrument};

use crate::constants::*;
use crate::pipeline::processing::categories::AlertLevel;
use crate::pipeline::processing::merge::MergedFacilityRow;
use crate::pipeline::processing::ranking::{min_max_normalize, percentile_rank};
use crate::types::Dataset;

const INFRA_WEIGHT: f64 = 0.5;
const SERVICE_WEIGHT: f64 = 0.3;
const COMMUNITIES_WEIGHT: f64 = 0.2;
const SHORTAGE_WEIGHT: f64 = 0.6;
const REFERRALS_WEIGHT: f64 = 0.4;

/// Indices computed once per run for one facility.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeIndices {
    pub service_score_norm: Option<f64>,
    pub underserved_index: f64,
    pub underserved_rank: f64,
    pub underserved_flag: u8,
    pub referrals_norm: Option<f64>,
    /// Weighted score, not clamped to `[0, 1]`
    pub resource_risk_score: f64,
    pub resource_alert: AlertLevel,
    pub shortage_score: u32,
    pub alert_level: AlertLevel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComposedFacility {
    pub row: MergedFacilityRow,
    pub indices: CompositeIndices,
}

/// `0.5*(1 - infra) + 0.3*(1 - service) + 0.2*communities`, missing inputs as 0.
pub fn underserved_index(
    infra_score_norm: Option<f64>,
    service_score_norm: Option<f64>,
    communities_served_norm: Option<f64>,
) -> f64 {
    INFRA_WEIGHT * (1.0 - infra_score_norm.unwrap_or(0.0))
        + SERVICE_WEIGHT * (1.0 - service_score_norm.unwrap_or(0.0))
        + COMMUNITIES_WEIGHT * communities_served_norm.unwrap_or(0.0)
}

/// `0.6*(shortage/3) + 0.4*referrals_norm`, missing inputs as 0.
pub fn resource_risk_score(shortage_score: Option<f64>, referrals_norm: Option<f64>) -> f64 {
    SHORTAGE_WEIGHT * (shortage_score.unwrap_or(0.0) / SHORTAGE_SCALE)
        + REFERRALS_WEIGHT * referrals_norm.unwrap_or(0.0)
}

/// Integer shortage count from a (possibly averaged) score. Halves round to
/// the nearest even count.
pub fn shortage_count(shortage_score: Option<f64>) -> u32 {
    shortage_score
        .filter(|v| v.is_finite())
        .map(|v| v.round_ties_even().max(0.0) as u32)
        .unwrap_or(0)
}

pub struct IndexComposer;

impl IndexComposer {
    #[instrument(skip_all, fields(facilities = rows.len()))]
    pub fn compose(rows: Vec<MergedFacilityRow>) -> Vec<ComposedFacility> {
        let column = |dataset: Dataset, name: &str| -> Vec<Option<f64>> {
            rows.iter().map(|row| row.score(dataset, name)).collect()
        };

        let service_norm = min_max_normalize(&column(Dataset::ServiceDelivery, MEAN_SERVICE_SCORE));
        let referrals_norm = min_max_normalize(&column(Dataset::ServiceDelivery, REFERRALS));
        let infra_norm = column(Dataset::Infrastructure, INFRA_SCORE_NORM);
        let communities_norm = column(Dataset::Inclusivity, COMMUNITIES_SERVED_NORM);
        let shortage = column(Dataset::ServiceDelivery, SHORTAGE_SCORE);

        let underserved: Vec<f64> = (0..rows.len())
            .map(|i| underserved_index(infra_norm[i], service_norm[i], communities_norm[i]))
            .collect();
        let underserved_ranks =
            percentile_rank(&underserved.iter().copied().map(Some).collect::<Vec<_>>());

        let composed: Vec<ComposedFacility> = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let rank = underserved_ranks[i].unwrap_or(0.0);
                let risk = resource_risk_score(shortage[i], referrals_norm[i]);
                let shortage_score = shortage_count(shortage[i]);

                let indices = CompositeIndices {
                    service_score_norm: service_norm[i],
                    underserved_index: underserved[i],
                    underserved_rank: rank,
                    underserved_flag: u8::from(rank >= UNDERSERVED_RANK_THRESHOLD),
                    referrals_norm: referrals_norm[i],
                    resource_risk_score: risk,
                    resource_alert: AlertLevel::from_risk_score(risk),
                    shortage_score,
                    alert_level: AlertLevel::from_shortage_score(shortage_score),
                };
                ComposedFacility { row, indices }
            })
            .collect();

        let flagged = composed.iter().filter(|c| c.indices.underserved_flag == 1).count();
        info!(
            facilities = composed.len(),
            underserved_flagged = flagged,
            "Composite indices computed"
        );

        composed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::aggregate::AggregatedFacilityRow;
    use crate::types::{FacilityMeta, ScoreColumns};

    fn row(key: &str, service: Option<ScoreColumns>, infra: Option<ScoreColumns>, incl: Option<ScoreColumns>) -> MergedFacilityRow {
        let wrap = |scores: ScoreColumns| AggregatedFacilityRow {
            facility_key: key.to_string(),
            scores,
            submissions: 1,
        };
        MergedFacilityRow {
            facility_key: key.to_string(),
            meta: FacilityMeta::default(),
            service_delivery: service.map(wrap),
            infrastructure: infra.map(wrap),
            inclusivity: incl.map(wrap),
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_underserved_weighted_formula() {
        assert!(approx(underserved_index(Some(0.2), Some(0.4), Some(0.5)), 0.68));
        // missing sub-scores count as 0
        assert!(approx(underserved_index(None, None, None), 0.8));
    }

    #[test]
    fn test_resource_risk_formula() {
        assert!(approx(resource_risk_score(Some(3.0), Some(1.0)), 1.0));
        assert!(approx(resource_risk_score(Some(1.5), None), 0.3));
        assert_eq!(AlertLevel::from_risk_score(resource_risk_score(Some(1.5), None)), AlertLevel::Medium);
        assert!(approx(resource_risk_score(None, None), 0.0));
    }

    #[test]
    fn test_shortage_count_rounds_averages() {
        assert_eq!(shortage_count(Some(1.5)), 2);
        assert_eq!(shortage_count(Some(2.5)), 2);
        assert_eq!(shortage_count(Some(0.5)), 0);
        assert_eq!(shortage_count(Some(2.6)), 3);
        assert_eq!(shortage_count(Some(0.4)), 0);
        assert_eq!(shortage_count(None), 0);
    }

    #[test]
    fn test_top_decile_flag_with_distinct_indices() {
        // infra norms spaced so every facility has a distinct underserved index
        let rows: Vec<_> = (0..10)
            .map(|i| {
                let infra = ScoreColumns::from([(INFRA_SCORE_NORM, Some(i as f64 / 10.0))]);
                row(&format!("phc {}", i), None, Some(infra), None)
            })
            .collect();
        let composed = IndexComposer::compose(rows);

        let flagged: Vec<_> = composed
            .iter()
            .filter(|c| c.indices.underserved_flag == 1)
            .map(|c| c.row.facility_key.as_str())
            .collect();
        // ranks are 0.1 .. 1.0; the two highest indices reach >= 0.9
        assert_eq!(flagged, vec!["phc 0", "phc 1"]);
        assert!(approx(composed[0].indices.underserved_rank, 1.0));
    }

    #[test]
    fn test_flag_count_for_seven_facilities() {
        let rows: Vec<_> = (0..7)
            .map(|i| {
                let infra = ScoreColumns::from([(INFRA_SCORE_NORM, Some(i as f64 / 7.0))]);
                row(&format!("phc {}", i), None, Some(infra), None)
            })
            .collect();
        let composed = IndexComposer::compose(rows);
        let flagged = composed.iter().filter(|c| c.indices.underserved_flag == 1).count();
        assert_eq!(flagged, 1);
    }

    #[test]
    fn test_alert_levels_and_norms() {
        let service = |shortage: f64, mean: f64, referrals: f64| {
            ScoreColumns::from([
                (SHORTAGE_SCORE, Some(shortage)),
                (MEAN_SERVICE_SCORE, Some(mean)),
                (REFERRALS, Some(referrals)),
            ])
        };
        let rows = vec![
            row("a", Some(service(0.0, 2.0, 0.0)), None, None),
            row("b", Some(service(2.0, 4.0, 5.0)), None, None),
            row("c", Some(service(3.0, 6.0, 10.0)), None, None),
            row("d", None, None, None),
        ];
        let composed = IndexComposer::compose(rows);

        let levels: Vec<_> = composed.iter().map(|c| c.indices.alert_level).collect();
        assert_eq!(levels, vec![AlertLevel::Low, AlertLevel::Medium, AlertLevel::High, AlertLevel::Low]);

        assert_eq!(composed[1].indices.service_score_norm, Some(0.5));
        assert_eq!(composed[3].indices.service_score_norm, None);
        assert_eq!(composed[2].indices.referrals_norm, Some(1.0));

        // c: 0.6 * 3/3 + 0.4 * 1.0
        assert!(approx(composed[2].indices.resource_risk_score, 1.0));
        assert_eq!(composed[2].indices.resource_alert, AlertLevel::High);
        // b: 0.6 * 2/3 + 0.4 * 0.5 = 0.6
        assert!(approx(composed[1].indices.resource_risk_score, 0.6));
        assert_eq!(composed[3].indices.resource_alert, AlertLevel::Low);
    }
}
