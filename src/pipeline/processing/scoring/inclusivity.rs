use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

use super::{identify, DatasetScorer};
use crate::constants::{COMMUNITIES_COLUMN, COMMUNITIES_SERVED, COMMUNITIES_SERVED_NORM};
use crate::pipeline::processing::fields::{value_text, FieldLookup};
use crate::pipeline::processing::ranking::min_max_normalize;
use crate::types::{Dataset, RawSurveyRecord, ScoreColumns, ScoredDataset, ScoredRecord};

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Reach of each facility, from the free-text "communities served" answer.
pub struct InclusivityScorer;

/// First run of digits in the answer, or `None` when there is none or it is
/// too long to be a finite count.
pub fn communities_served(answer: &str) -> Option<f64> {
    DIGITS
        .find(answer)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

impl DatasetScorer for InclusivityScorer {
    fn dataset(&self) -> Dataset {
        Dataset::Inclusivity
    }

    #[instrument(skip_all, fields(dataset = "inclusivity", records = records.len()))]
    fn score(&self, records: &[RawSurveyRecord]) -> ScoredDataset {
        let (kept, dropped) = identify(self.dataset(), records);
        let mut diagnostics = Vec::new();

        let communities: Vec<Option<f64>> = kept
            .iter()
            .map(|(record, identity)| {
                let answer = record
                    .lookup(COMMUNITIES_COLUMN)
                    .and_then(value_text)
                    .unwrap_or_default();
                let value = communities_served(&answer);
                if value.is_none() {
                    let note = format!(
                        "row {}: no usable community count in '{}' for '{}', using 0",
                        record.row, answer, identity.facility_key
                    );
                    debug!("{}", note);
                    diagnostics.push(note);
                }
                Some(value.unwrap_or(0.0))
            })
            .collect();
        let normalized = min_max_normalize(&communities);

        let scored = kept
            .into_iter()
            .zip(communities.into_iter().zip(normalized))
            .map(|((_, identity), (served, norm))| {
                let mut scores = ScoreColumns::new();
                scores.insert(COMMUNITIES_SERVED, served);
                scores.insert(COMMUNITIES_SERVED_NORM, norm);
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
