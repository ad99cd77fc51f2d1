use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants;

/// The three independently collected facility surveys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    ServiceDelivery,
    Infrastructure,
    Inclusivity,
}

impl Dataset {
    /// Merge order: service delivery first, then infrastructure, then inclusivity
    pub const ALL: [Dataset; 3] = [
        Dataset::ServiceDelivery,
        Dataset::Infrastructure,
        Dataset::Inclusivity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::ServiceDelivery => "service_delivery",
            Dataset::Infrastructure => "infrastructure",
            Dataset::Inclusivity => "inclusivity",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Dataset::ServiceDelivery => "service_delivery.csv",
            Dataset::Infrastructure => "infrastructure.csv",
            Dataset::Inclusivity => "inclusivity.csv",
        }
    }

    /// Sub-score columns this dataset contributes to the merged table
    pub fn score_columns(&self) -> &'static [&'static str] {
        match self {
            Dataset::ServiceDelivery => constants::SERVICE_DELIVERY_SCORES,
            Dataset::Infrastructure => constants::INFRASTRUCTURE_SCORES,
            Dataset::Inclusivity => constants::INCLUSIVITY_SCORES,
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One submission from one survey export. Field names are the export's
/// column headers; the same facility may appear in many records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSurveyRecord {
    /// 1-based data row within the source file
    pub row: usize,
    pub fields: Map<String, Value>,
}

impl RawSurveyRecord {
    pub fn new(row: usize) -> Self {
        Self {
            row,
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }
}

/// Numeric sub-scores keyed by column name; `None` marks a missing value.
pub type ScoreColumns = BTreeMap<&'static str, Option<f64>>;

/// Identity fields lifted from a raw record before it is scored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordIdentity {
    pub facility_key: String,
    /// Name as written in the export, used for display purposes only
    pub original_name: String,
    pub lga: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub identity: RecordIdentity,
    pub scores: ScoreColumns,
}

impl ScoredRecord {
    pub fn score(&self, column: &str) -> Option<f64> {
        self.scores.get(column).copied().flatten()
    }
}

/// Output of one dataset scorer.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDataset {
    pub dataset: Dataset,
    pub records: Vec<ScoredRecord>,
    /// Records discarded because no facility name could be resolved
    pub dropped: usize,
    /// Notes about coerced or unparseable inputs
    pub diagnostics: Vec<String>,
}

/// First non-empty presentation values seen for a facility key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityMeta {
    pub display_name: String,
    pub lga: String,
    pub state: String,
}
