use tracing::instrument;

use super::{count_affirmative, identify, DatasetScorer};
use crate::constants::{
    BUILDING_FAILURE_COLUMNS, FAILURE_AFFIRMATIVE, INFRA_FAILURES, INFRA_SCORE, INFRA_SCORE_NORM,
};
use crate::pipeline::processing::ranking::min_max_normalize;
use crate::types::{Dataset, RawSurveyRecord, ScoreColumns, ScoredDataset, ScoredRecord};

/// Building-condition checklist.
pub struct InfrastructureScorer;

impl DatasetScorer for InfrastructureScorer {
    fn dataset(&self) -> Dataset {
        Dataset::Infrastructure
    }

    #[instrument(skip_all, fields(dataset = "infrastructure", records = records.len()))]
    fn score(&self, records: &[RawSurveyRecord]) -> ScoredDataset {
        let (kept, dropped) = identify(self.dataset(), records);
        let total_items = BUILDING_FAILURE_COLUMNS.len() as f64;

        let failures: Vec<f64> = kept
            .iter()
            .map(|(record, _)| {
                count_affirmative(record, BUILDING_FAILURE_COLUMNS, FAILURE_AFFIRMATIVE) as f64
            })
            .collect();
        let infra_scores: Vec<Option<f64>> = failures
            .iter()
            .map(|f| Some(1.0 - f / total_items))
            .collect();
        let normalized = min_max_normalize(&infra_scores);

        let scored = kept
            .into_iter()
            .enumerate()
            .map(|(idx, (_, identity))| {
                let mut scores = ScoreColumns::new();
                scores.insert(INFRA_FAILURES, Some(failures[idx]));
                scores.insert(INFRA_SCORE, infra_scores[idx]);
                scores.insert(INFRA_SCORE_NORM, normalized[idx]);
                ScoredRecord { identity, scores }
            })
            .collect();

        ScoredDataset {
            dataset: self.dataset(),
            records: scored,
            dropped,
            diagnostics: Vec::new(),
        }
    }
}
