//! Fixed column names of the survey exports and the names of every derived
//! column, kept in one place so scorers, the exporter and the loader agree.

// Facility identity candidates, in priority order
pub const NAME_CANDIDATES: &[&str] = &[
    "Name of Primary Health Center",
    "Name of Primary Health Centre",
    "Primary Health Center",
    "Primary Health Centre",
    "phc_name",
    "name",
];
pub const LGA_CANDIDATES: &[&str] = &["PHC LGA", "LGA", "lga"];
pub const STATE_CANDIDATES: &[&str] = &["State of PHC", "State", "state", "state_of_phc"];

// Service delivery survey
pub const SHORTAGE_COLUMNS: &[&str] = &[
    "Identify Shortages of Medical Supplies(Syringes)?",
    "Identify Shortages of Medical Supplies(Bandages)?",
    "Identify Shortages of Medical Supplies(Personal Protective Equipment)?",
];
pub const SHORTAGE_AFFIRMATIVE: &[&str] = &["yes", "identified", "true"];

pub const RATING_COLUMNS: &[&str] = &[
    "Rate the Quality of Treatment in this PHC",
    "Rate the Immunization Services Provided in the PHC",
    "Give a General Rating for the PHC",
];
pub const RATING_SCALE: &[(&str, f64)] = &[
    ("very poor", 1.0),
    ("poor", 2.0),
    ("fair", 3.0),
    ("good", 4.0),
    ("very good", 5.0),
    ("excellent", 6.0),
];
pub const REFERRALS_COLUMN: &str =
    "How many Referrals to Larger Hospitals have occurred in the last 1 year";

// Infrastructure survey
pub const BUILDING_FAILURE_COLUMNS: &[&str] = &[
    "Check for any of these building failures./Broken Celling",
    "Check for any of these building failures./Damaged Chairs",
    "Check for any of these building failures./Damaged Door",
    "Check for any of these building failures./Damaged/Leaking roofs",
];
pub const FAILURE_AFFIRMATIVE: &[&str] = &["yes", "broken", "damaged", "true"];

// Inclusivity survey
pub const COMMUNITIES_COLUMN: &str = "How Many Communities Rely on this PHC for Health Care";

// Per-record sub-score columns
pub const SHORTAGE_SCORE: &str = "shortage_score";
pub const MEAN_SERVICE_SCORE: &str = "mean_service_score";
pub const SERVICE_SCORE_RANK: &str = "service_score_rank";
pub const LOW_QUALITY_FLAG: &str = "low_quality_flag";
pub const REFERRALS: &str = "referrals";
pub const INFRA_FAILURES: &str = "infra_failures";
pub const INFRA_SCORE: &str = "infra_score";
pub const INFRA_SCORE_NORM: &str = "infra_score_norm";
pub const COMMUNITIES_SERVED: &str = "communities_served";
pub const COMMUNITIES_SERVED_NORM: &str = "communities_served_norm";

pub const SERVICE_DELIVERY_SCORES: &[&str] = &[
    SHORTAGE_SCORE,
    MEAN_SERVICE_SCORE,
    SERVICE_SCORE_RANK,
    LOW_QUALITY_FLAG,
    REFERRALS,
];
pub const INFRASTRUCTURE_SCORES: &[&str] = &[INFRA_FAILURES, INFRA_SCORE, INFRA_SCORE_NORM];
pub const INCLUSIVITY_SCORES: &[&str] = &[COMMUNITIES_SERVED, COMMUNITIES_SERVED_NORM];

// Thresholds
pub const LOW_QUALITY_RANK: f64 = 0.10;
pub const UNDERSERVED_RANK_THRESHOLD: f64 = 0.90;
pub const SHORTAGE_SCALE: f64 = 3.0;

// Artifacts
pub const OUTBREAK_ALERTS: &str = "outbreak_alerts";
pub const UNDERSERVED_PHCS: &str = "underserved_phcs";
pub const RESOURCE_WARNINGS: &str = "resource_warnings";
pub const TELECOMMUNICATION: &str = "telecommunication";
pub const OUTBREAK_ALERTS_FILE: &str = "outbreak_alerts.json";
pub const UNDERSERVED_PHCS_FILE: &str = "underserved_phcs.json";
pub const RESOURCE_WARNINGS_FILE: &str = "resource_warnings.json";
pub const METRICS_SUMMARY_FILE: &str = "metrics_summary.csv";
pub const METRICS_SNAPSHOT_FILE: &str = "metrics.prom";
pub const TELECOMMUNICATION_FILE: &str = "telecommunication.csv";

// Telecom source
pub const TELECOM_NAME_COLUMNS: &[&str] = &["PHC Name", "phc_name", "Name", "name"];
pub const TELECOM_NOTES_HINTS: &[&str] = &["transportation", "network", "connectivity"];

// Artifact record fields accepted by the loader
pub const ARTIFACT_NAME_CANDIDATES: &[&str] = &[
    "phc_name",
    "name",
    "Name of Primary Health Center",
    "Name of Primary Health Centre",
    "Primary Health Center",
    "Primary Health Centre",
];
pub const ARTIFACT_DISPLAY_NAME_CANDIDATES: &[&str] = &["display_name", "Display Name"];
pub const ARTIFACT_LGA_CANDIDATES: &[&str] = &["lga", "LGA", "PHC LGA"];
pub const ARTIFACT_STATE_CANDIDATES: &[&str] = &["state", "State", "State of PHC", "state_of_phc"];
pub const SHORTAGE_SCORE_CANDIDATES: &[&str] =
    &["shortage_score", "shortage score", "Shortage Score", "shortageScore"];
pub const ALERT_LEVEL_CANDIDATES: &[&str] =
    &["alert_level", "Alert Level", "alertLevel", "shortage_level", "Shortage Level"];
