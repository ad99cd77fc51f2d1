//! Unified alerts feed across the three exported artifacts.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use tracing::{info, instrument, warn};

use crate::app::filters::matches_state;
use crate::app::insight_store::InsightStore;
use crate::error::{InsightError, Result};
use crate::pipeline::processing::categories::AlertLevel;

pub const DEFAULT_FEED_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedType {
    Outbreak,
    Underserved,
    Resource,
}

impl FeedType {
    pub const ALL: [FeedType; 3] = [FeedType::Outbreak, FeedType::Underserved, FeedType::Resource];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedType::Outbreak => "outbreak",
            FeedType::Underserved => "underserved",
            FeedType::Resource => "resource",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FeedType::Outbreak => "Outbreak Alert",
            FeedType::Underserved => "Underserved Facility",
            FeedType::Resource => "Resource Risk",
        }
    }
}

impl fmt::Display for FeedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedType {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "outbreak" => Ok(FeedType::Outbreak),
            "underserved" => Ok(FeedType::Underserved),
            "resource" => Ok(FeedType::Resource),
            other => Err(InsightError::Config(format!("unknown alert type '{}'", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedQuery {
    pub limit: usize,
    /// `None` means every type
    pub types: Option<Vec<FeedType>>,
    pub state: Option<String>,
    pub refresh: bool,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_FEED_LIMIT,
            types: None,
            state: None,
            refresh: false,
        }
    }
}

impl FeedQuery {
    fn wants(&self, feed_type: FeedType) -> bool {
        self.types.as_ref().map_or(true, |types| types.contains(&feed_type))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedItem {
    pub id: String,
    pub phc_name: String,
    pub display_name: String,
    pub lga: String,
    pub state: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub level: AlertLevel,
    pub score: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertsFeed {
    pub total: usize,
    pub feed: Vec<FeedItem>,
}

/// First 16 hex characters of SHA-256 over `name_type_timestamp`.
pub fn alert_id(name: &str, feed_type: FeedType, timestamp: &str) -> String {
    let digest = Sha256::digest(format!("{}_{}_{}", name, feed_type, timestamp).as_bytes());
    let mut id = hex::encode(digest);
    id.truncate(16);
    id
}

/// Missing artifacts drop out of the feed; anything else is an error.
fn tolerate_missing<T>(feed_type: FeedType, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => {
            warn!("Skipping {} alerts: {}", feed_type, e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[instrument(skip(store))]
pub async fn build_alerts_feed(store: &InsightStore, query: &FeedQuery) -> Result<AlertsFeed> {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
    let mut feed = Vec::new();

    let mut push = |feed_type: FeedType, name: &str, display_name: &str, lga: &str, state: &str, level: AlertLevel, score: f64| {
        feed.push(FeedItem {
            id: alert_id(name, feed_type, &timestamp),
            phc_name: name.to_string(),
            display_name: display_name.to_string(),
            lga: lga.to_string(),
            state: state.to_string(),
            kind: feed_type.label(),
            level,
            score,
            timestamp: timestamp.clone(),
        });
    };

    if query.wants(FeedType::Outbreak) {
        if let Some(records) = tolerate_missing(FeedType::Outbreak, store.outbreak_alerts(query.refresh).await)? {
            for r in records.iter() {
                push(FeedType::Outbreak, &r.name, &r.display_name, &r.lga, &r.state, r.alert_level, f64::from(r.shortage_score));
            }
        }
    }
    if query.wants(FeedType::Underserved) {
        if let Some(records) = tolerate_missing(FeedType::Underserved, store.underserved_phcs(query.refresh).await)? {
            for r in records.iter() {
                let level = AlertLevel::from_underserved_index(r.underserved_index);
                push(FeedType::Underserved, &r.name, &r.display_name, &r.lga, &r.state, level, r.underserved_index);
            }
        }
    }
    if query.wants(FeedType::Resource) {
        if let Some(records) = tolerate_missing(FeedType::Resource, store.resource_warnings(query.refresh).await)? {
            for r in records.iter() {
                push(FeedType::Resource, &r.name, &r.display_name, &r.lga, &r.state, r.resource_alert, r.resource_risk_score);
            }
        }
    }

    feed.retain(|item| matches_state(&item.state, query.state.as_deref()));
    feed.sort_by(|a, b| {
        b.level
            .priority()
            .cmp(&a.level.priority())
            .then_with(|| b.score.total_cmp(&a.score))
    });
    feed.truncate(query.limit);

    info!("Returning {} alerts in feed", feed.len());
    Ok(AlertsFeed {
        total: feed.len(),
        feed,
    })
}
