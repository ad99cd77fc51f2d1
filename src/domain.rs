//! Record shapes of the exported artifacts, shared by the exporter and the
//! artifact loader.

use serde::{Deserialize, Serialize};

use crate::pipeline::processing::categories::{AlertLevel, Channel};

/// Supply-shortage alert for one facility (`outbreak_alerts.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutbreakAlert {
    /// Facility key
    pub name: String,
    pub display_name: String,
    pub lga: String,
    pub state: String,
    pub shortage_score: u32,
    pub alert_level: AlertLevel,
}

/// Underserved ranking for one facility (`underserved_phcs.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderservedPhc {
    pub name: String,
    pub display_name: String,
    pub lga: String,
    pub state: String,
    pub underserved_index: f64,
    pub underserved_flag: u8,
}

/// Resource risk for one facility (`resource_warnings.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceWarning {
    pub name: String,
    pub display_name: String,
    pub lga: String,
    pub state: String,
    pub resource_risk_score: f64,
    pub resource_alert: AlertLevel,
}

/// Outreach channel advice derived from the connectivity survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelecomAdvice {
    pub name: String,
    pub display_name: String,
    pub lga: String,
    pub state: String,
    pub telecom_notes: String,
    pub preferred_channel: Channel,
}
