use tracing::{debug, instrument};

use super::{count_affirmative, identify, DatasetScorer};
use crate::constants::*;
use crate::pipeline::processing::fields::{coerce_number, value_text, FieldLookup};
use crate::pipeline::processing::ranking::percentile_rank;
use crate::types::{Dataset, RawSurveyRecord, ScoreColumns, ScoredDataset, ScoredRecord};

/// Shortage counts, service quality ratings and referral volume.
pub struct ServiceDeliveryScorer;

/// Map a rating answer onto the 6-point scale (`Very Poor` = 1 .. `Excellent` = 6).
pub fn rating_value(answer: &str) -> Option<f64> {
    let answer = answer.trim().to_lowercase();
    RATING_SCALE
        .iter()
        .find(|(label, _)| *label == answer)
        .map(|(_, value)| *value)
}

/// Mean of the mapped rating columns, ignoring unmapped answers.
pub fn mean_service_score(record: &RawSurveyRecord) -> Option<f64> {
    let ratings: Vec<f64> = RATING_COLUMNS
        .iter()
        .filter_map(|column| record.lookup(column).and_then(value_text))
        .filter_map(|answer| rating_value(&answer))
        .collect();

    if ratings.is_empty() {
        None
    } else {
        Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
    }
}

impl DatasetScorer for ServiceDeliveryScorer {
    fn dataset(&self) -> Dataset {
        Dataset::ServiceDelivery
    }

    #[instrument(skip_all, fields(dataset = "service_delivery", records = records.len()))]
    fn score(&self, records: &[RawSurveyRecord]) -> ScoredDataset {
        let (kept, dropped) = identify(self.dataset(), records);
        let mut diagnostics = Vec::new();

        let means: Vec<Option<f64>> = kept
            .iter()
            .map(|(record, _)| mean_service_score(record))
            .collect();
        let ranks = percentile_rank(&means);

        let scored = kept
            .into_iter()
            .zip(means.into_iter().zip(ranks))
            .map(|((record, identity), (mean, rank))| {
                let shortage = count_affirmative(record, SHORTAGE_COLUMNS, SHORTAGE_AFFIRMATIVE);

                let referrals = match record.lookup(REFERRALS_COLUMN).and_then(coerce_number) {
                    Some(value) => value,
                    None => {
                        let note = format!(
                            "row {}: referral count missing or unparseable for '{}', using 0",
                            record.row, identity.facility_key
                        );
                        debug!("{}", note);
                        diagnostics.push(note);
                        0.0
                    }
                };

                let low_quality = match rank {
                    Some(r) if r <= LOW_QUALITY_RANK => 1.0,
                    _ => 0.0,
                };

                let mut scores = ScoreColumns::new();
                scores.insert(SHORTAGE_SCORE, Some(shortage as f64));
                scores.insert(MEAN_SERVICE_SCORE, mean);
                scores.insert(SERVICE_SCORE_RANK, rank);
                scores.insert(LOW_QUALITY_FLAG, Some(low_quality));
                scores.insert(REFERRALS, Some(referrals));

                ScoredRecord { identity, scores }
            })
            .collect();

        ScoredDataset {
            dataset: self.dataset(),
            records: scored,
            dropped,
            diagnostics,
        }
    }
}
