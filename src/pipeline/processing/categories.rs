//! Canonical categories for alert levels and outreach channels.
//!
//! Two different bandings map numbers to [`AlertLevel`]. Levels derived
//! fresh from a shortage count use 0 / <=2 / >2, while levels reconciled
//! from a noisy external string fall back to >=3 / >=2; see
//! [`AlertLevel::from_shortage_score`] and [`resolve_alert_level`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertLevel {
    Low,
    Medium,
    High,
}

impl AlertLevel {
    /// Look up free text in the synonym table.
    pub fn from_synonym(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "low" => Some(AlertLevel::Low),
            "medium" | "med" | "moderate" => Some(AlertLevel::Medium),
            "high" | "very high" | "critical" | "severe" => Some(AlertLevel::High),
            _ => None,
        }
    }

    /// Level for a freshly computed shortage count.
    pub fn from_shortage_score(score: u32) -> Self {
        match score {
            0 => AlertLevel::Low,
            1..=2 => AlertLevel::Medium,
            _ => AlertLevel::High,
        }
    }

    /// Band a resource risk score: `<0.3` Low, `<0.6` Medium, else High.
    pub fn from_risk_score(score: f64) -> Self {
        if score < 0.3 {
            AlertLevel::Low
        } else if score < 0.6 {
            AlertLevel::Medium
        } else {
            AlertLevel::High
        }
    }

    /// Band an underserved index for the alerts feed: `>=0.7` High, `>=0.4` Medium.
    pub fn from_underserved_index(index: f64) -> Self {
        if index >= 0.7 {
            AlertLevel::High
        } else if index >= 0.4 {
            AlertLevel::Medium
        } else {
            AlertLevel::Low
        }
    }

    /// Sort priority, higher is more urgent
    pub fn priority(&self) -> u8 {
        match self {
            AlertLevel::Low => 1,
            AlertLevel::Medium => 2,
            AlertLevel::High => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Low => "Low",
            AlertLevel::Medium => "Medium",
            AlertLevel::High => "High",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reconcile an externally supplied level with a numeric fallback.
///
/// Text is matched against the synonym table first. Missing, unrecognised or
/// non-text levels fall back to `score >= 3` High, `score >= 2` Medium, else Low.
pub fn resolve_alert_level(raw_level: &Value, score: f64) -> AlertLevel {
    if let Value::String(text) = raw_level {
        if let Some(level) = AlertLevel::from_synonym(text) {
            return level;
        }
    }

    if score >= 3.0 {
        AlertLevel::High
    } else if score >= 2.0 {
        AlertLevel::Medium
    } else {
        AlertLevel::Low
    }
}

/// Preferred outreach channel for a facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "SMS")]
    Sms,
    WhatsApp,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Sms => f.write_str("SMS"),
            Channel::WhatsApp => f.write_str("WhatsApp"),
        }
    }
}

const POOR_CONNECTIVITY: &[&str] = &["2g", "no network", "limited", "poor", "weak", "bad"];
const GOOD_CONNECTIVITY: &[&str] = &["3g", "4g", "5g", "good", "strong", "excellent", "stable"];

/// Pick a channel from free-text connectivity notes. Poor indicators win over
/// good ones; no match or no text defaults to SMS.
pub fn resolve_channel(connectivity: Option<&str>) -> Channel {
    let notes = match connectivity {
        Some(text) if !text.trim().is_empty() => text.to_lowercase(),
        _ => return Channel::Sms,
    };

    if POOR_CONNECTIVITY.iter().any(|hint| notes.contains(hint)) {
        return Channel::Sms;
    }
    if GOOD_CONNECTIVITY.iter().any(|hint| notes.contains(hint)) {
        return Channel::WhatsApp;
    }
    Channel::Sms
}
