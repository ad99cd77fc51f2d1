//! Read side of the exported artifacts.
//!
//! Every artifact is loaded through its own [`RefreshableCache`], keyed by
//! `<artifact>:<dir>`, and its records are re-normalized on the way in so
//! artifacts written by older exports still line up with fresh ones.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::app::ports::ArtifactReader;
use crate::cache::RefreshableCache;
use crate::constants::*;
use crate::domain::{OutbreakAlert, ResourceWarning, TelecomAdvice, UnderservedPhc};
use crate::error::{InsightError, Result};
use crate::pipeline::ingestion::read_csv;
use crate::pipeline::processing::categories::{resolve_alert_level, resolve_channel, AlertLevel};
use crate::pipeline::processing::compose::shortage_count;
use crate::pipeline::processing::fields::{coerce_number, first_non_empty, first_non_empty_text, value_text, FieldLookup};
use crate::pipeline::processing::normalize::{display_name, normalize_facility_name, normalize_lga, normalize_state};

pub type Records<T> = Arc<Vec<T>>;

/// One cache per artifact kind. Shared between stores that read the same
/// directories.
#[derive(Clone)]
pub struct InsightCaches {
    pub outbreak_alerts: Arc<RefreshableCache<Records<OutbreakAlert>>>,
    pub underserved_phcs: Arc<RefreshableCache<Records<UnderservedPhc>>>,
    pub resource_warnings: Arc<RefreshableCache<Records<ResourceWarning>>>,
    pub telecom_advice: Arc<RefreshableCache<Records<TelecomAdvice>>>,
}

impl InsightCaches {
    pub fn new(ttl: Duration) -> Self {
        Self {
            outbreak_alerts: Arc::new(RefreshableCache::new(ttl)),
            underserved_phcs: Arc::new(RefreshableCache::new(ttl)),
            resource_warnings: Arc::new(RefreshableCache::new(ttl)),
            telecom_advice: Arc::new(RefreshableCache::new(ttl)),
        }
    }
}

pub struct InsightStore {
    reader: Arc<dyn ArtifactReader>,
    caches: InsightCaches,
    output_dir: PathBuf,
    data_dir: PathBuf,
}

impl InsightStore {
    pub fn new(
        reader: Arc<dyn ArtifactReader>,
        caches: InsightCaches,
        output_dir: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            reader,
            caches,
            output_dir: output_dir.into(),
            data_dir: data_dir.into(),
        }
    }

    pub async fn outbreak_alerts(&self, refresh: bool) -> Result<Records<OutbreakAlert>> {
        load(
            &self.caches.outbreak_alerts,
            Arc::clone(&self.reader),
            OUTBREAK_ALERTS,
            &self.output_dir,
            OUTBREAK_ALERTS_FILE,
            refresh,
            parse_outbreak_alerts,
        )
        .await
    }

    pub async fn underserved_phcs(&self, refresh: bool) -> Result<Records<UnderservedPhc>> {
        load(
            &self.caches.underserved_phcs,
            Arc::clone(&self.reader),
            UNDERSERVED_PHCS,
            &self.output_dir,
            UNDERSERVED_PHCS_FILE,
            refresh,
            parse_underserved_phcs,
        )
        .await
    }

    pub async fn resource_warnings(&self, refresh: bool) -> Result<Records<ResourceWarning>> {
        load(
            &self.caches.resource_warnings,
            Arc::clone(&self.reader),
            RESOURCE_WARNINGS,
            &self.output_dir,
            RESOURCE_WARNINGS_FILE,
            refresh,
            parse_resource_warnings,
        )
        .await
    }

    /// Channel advice from the connectivity survey in the data directory.
    pub async fn telecom_advice(&self, refresh: bool) -> Result<Records<TelecomAdvice>> {
        load(
            &self.caches.telecom_advice,
            Arc::clone(&self.reader),
            TELECOMMUNICATION,
            &self.data_dir,
            TELECOMMUNICATION_FILE,
            refresh,
            parse_telecom_advice,
        )
        .await
    }

    pub async fn clear_cache(&self) {
        let evicted = self.caches.outbreak_alerts.clear().await
            + self.caches.underserved_phcs.clear().await
            + self.caches.resource_warnings.clear().await
            + self.caches.telecom_advice.clear().await;
        info!(evicted, "Artifact cache cleared");
    }
}

#[instrument(skip(cache, reader, parse))]
async fn load<T, P>(
    cache: &Arc<RefreshableCache<Records<T>>>,
    reader: Arc<dyn ArtifactReader>,
    artifact: &'static str,
    dir: &Path,
    file: &'static str,
    refresh: bool,
    parse: P,
) -> Result<Records<T>>
where
    T: Send + Sync + 'static,
    P: FnOnce(&[u8]) -> Result<Vec<T>> + Send + 'static,
{
    let key = format!("{}:{}", artifact, dir.display());
    let path = dir.join(file);
    cache
        .get_or_load(&key, refresh, move || async move {
            info!("Loading {} from {}", artifact, path.display());
            let bytes = reader.read(&path).await?;
            let records = parse(&bytes)?;
            info!("Loaded {} {} records", records.len(), artifact);
            Ok::<_, InsightError>(Arc::new(records))
        })
        .await
}

struct ArtifactIdentity {
    name: String,
    display_name: String,
    lga: String,
    state: String,
}

fn artifact_identity<R: FieldLookup + ?Sized>(record: &R, name_candidates: &[&str], lga: &[&str], state: &[&str]) -> Option<ArtifactIdentity> {
    let original = first_non_empty_text(record, name_candidates);
    let name = normalize_facility_name(&original);
    if name.is_empty() {
        return None;
    }
    let shown = first_non_empty_text(record, ARTIFACT_DISPLAY_NAME_CANDIDATES);
    Some(ArtifactIdentity {
        name,
        display_name: display_name(if shown.is_empty() { &original } else { &shown }),
        lga: normalize_lga(&first_non_empty_text(record, lga)),
        state: normalize_state(&first_non_empty_text(record, state)),
    })
}

/// Numeric field where absence means 0 but garbage is an error
fn numeric_field(record: &Map<String, Value>, key: &str) -> std::result::Result<f64, String> {
    match record.get(key) {
        None | Some(Value::Null) => Ok(0.0),
        Some(value) => coerce_number(value).ok_or_else(|| format!("{} is not numeric: {}", key, value)),
    }
}

/// Parse a JSON array of objects, re-normalizing each. `parse_one` returns
/// `Ok(None)` for records without a facility name and `Err` for records that
/// cannot be read; both are skipped.
fn parse_json_records<T, F>(artifact: &str, bytes: &[u8], parse_one: F) -> Result<Vec<T>>
where
    F: Fn(&Map<String, Value>, ArtifactIdentity) -> std::result::Result<T, String>,
{
    let document: Value = serde_json::from_slice(bytes)?;
    let Value::Array(items) = document else {
        return Err(InsightError::InvalidArtifact {
            artifact: artifact.to_string(),
            message: "expected a JSON array of records".to_string(),
        });
    };

    let mut records = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let Some(object) = item.as_object() else {
            warn!(artifact, index = idx, "Skipping non-object record");
            continue;
        };
        let Some(identity) = artifact_identity(
            object,
            ARTIFACT_NAME_CANDIDATES,
            ARTIFACT_LGA_CANDIDATES,
            ARTIFACT_STATE_CANDIDATES,
        ) else {
            debug!(artifact, index = idx, "Skipping record with no recognizable facility name");
            continue;
        };
        match parse_one(object, identity) {
            Ok(record) => records.push(record),
            Err(message) => warn!(artifact, index = idx, "Skipping invalid record: {}", message),
        }
    }
    Ok(records)
}

pub fn parse_outbreak_alerts(bytes: &[u8]) -> Result<Vec<OutbreakAlert>> {
    parse_json_records(OUTBREAK_ALERTS, bytes, |record, id| {
        let raw_score = first_non_empty(record, SHORTAGE_SCORE_CANDIDATES, Value::Null);
        let score = coerce_number(&raw_score).unwrap_or_else(|| {
            if !raw_score.is_null() {
                debug!("Unable to parse shortage score {}, defaulting to 0", raw_score);
            }
            0.0
        });
        let raw_level = first_non_empty(record, ALERT_LEVEL_CANDIDATES, Value::Null);
        Ok(OutbreakAlert {
            name: id.name,
            display_name: id.display_name,
            lga: id.lga,
            state: id.state,
            shortage_score: shortage_count(Some(score)),
            alert_level: resolve_alert_level(&raw_level, score),
        })
    })
}

pub fn parse_underserved_phcs(bytes: &[u8]) -> Result<Vec<UnderservedPhc>> {
    parse_json_records(UNDERSERVED_PHCS, bytes, |record, id| {
        let underserved_index = numeric_field(record, "underserved_index")?;
        let underserved_flag = u8::from(numeric_field(record, "underserved_flag")? > 0.0);
        Ok(UnderservedPhc {
            name: id.name,
            display_name: id.display_name,
            lga: id.lga,
            state: id.state,
            underserved_index,
            underserved_flag,
        })
    })
}

pub fn parse_resource_warnings(bytes: &[u8]) -> Result<Vec<ResourceWarning>> {
    parse_json_records(RESOURCE_WARNINGS, bytes, |record, id| {
        let resource_risk_score = numeric_field(record, "resource_risk_score")?;
        let resource_alert = record
            .get("resource_alert")
            .and_then(Value::as_str)
            .and_then(AlertLevel::from_synonym)
            .unwrap_or_else(|| AlertLevel::from_risk_score(resource_risk_score));
        Ok(ResourceWarning {
            name: id.name,
            display_name: id.display_name,
            lga: id.lga,
            state: id.state,
            resource_risk_score,
            resource_alert,
        })
    })
}

/// Channel advice from the connectivity survey CSV. The notes column is the
/// first header mentioning transportation, network or connectivity.
pub fn parse_telecom_advice(bytes: &[u8]) -> Result<Vec<TelecomAdvice>> {
    let table = read_csv(bytes, TELECOMMUNICATION)?;
    let notes_column = table
        .headers
        .iter()
        .find(|header| {
            let header = header.to_lowercase();
            TELECOM_NOTES_HINTS.iter().any(|hint| header.contains(hint))
        })
        .cloned();
    if notes_column.is_none() {
        warn!("No connectivity column found in {}", TELECOMMUNICATION_FILE);
    }

    let advice = table
        .records
        .iter()
        .filter_map(|record| {
            let id = artifact_identity(record, TELECOM_NAME_COLUMNS, LGA_CANDIDATES, STATE_CANDIDATES)?;
            let telecom_notes = notes_column
                .as_deref()
                .and_then(|column| record.lookup(column))
                .and_then(value_text)
                .unwrap_or_default();
            Some(TelecomAdvice {
                name: id.name,
                display_name: id.display_name,
                lga: id.lga,
                state: id.state,
                preferred_channel: resolve_channel(Some(&telecom_notes)),
                telecom_notes,
            })
        })
        .collect();
    Ok(advice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::categories::Channel;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory reader that counts reads
    struct MemoryReader {
        files: HashMap<PathBuf, Vec<u8>>,
        reads: AtomicUsize,
    }

    #[async_trait]
    impl ArtifactReader for MemoryReader {
        async fn read(&self, path: &Path) -> Result<Vec<u8>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| InsightError::ArtifactNotFound(path.to_path_buf()))
        }
    }

    fn store(files: Vec<(&str, Value)>) -> (InsightStore, Arc<MemoryReader>) {
        let reader = Arc::new(MemoryReader {
            files: files
                .into_iter()
                .map(|(file, doc)| (Path::new("out").join(file), serde_json::to_vec(&doc).unwrap()))
                .collect(),
            reads: AtomicUsize::new(0),
        });
        let store = InsightStore::new(
            reader.clone(),
            InsightCaches::new(Duration::from_secs(30)),
            "out",
            "data",
        );
        (store, reader)
    }

    #[test]
    fn test_outbreak_records_are_renormalized() {
        let doc = json!([
            {"phc_name": "  IKEJA Central PHC. ", "LGA": " ikeja ", "State": "lagos state", "Shortage Score": "2.6", "alert_level": "critical"},
            {"name": "Epe PHC", "shortage_score": 2, "alert_level": "unknown"},
            {"name": "", "shortage_score": 3},
            {"name": "Ojo PHC", "shortage_score": "n/a"}
        ]);
        let records = parse_outbreak_alerts(&serde_json::to_vec(&doc).unwrap()).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].name, "ikeja central phc");
        assert_eq!(records[0].display_name, "Ikeja Central Phc.");
        assert_eq!(records[0].lga, "Ikeja");
        assert_eq!(records[0].state, "Lagos");
        assert_eq!(records[0].shortage_score, 3);
        assert_eq!(records[0].alert_level, AlertLevel::High);

        // unknown level falls back to >=2 Medium
        assert_eq!(records[1].alert_level, AlertLevel::Medium);
        assert_eq!(records[2].shortage_score, 0);
        assert_eq!(records[2].alert_level, AlertLevel::Low);
    }

    #[test]
    fn test_half_shortage_scores_round_to_even() {
        let doc = json!([
            {"name": "A", "shortage_score": "2.5"},
            {"name": "B", "shortage_score": 0.5},
            {"name": "C", "shortage_score": 1.5}
        ]);
        let records = parse_outbreak_alerts(&serde_json::to_vec(&doc).unwrap()).unwrap();
        let counts: Vec<u32> = records.iter().map(|r| r.shortage_score).collect();
        assert_eq!(counts, vec![2, 0, 2]);
        assert_eq!(records[0].alert_level, AlertLevel::Medium);
    }

    #[test]
    fn test_non_array_document_is_invalid() {
        let err = parse_underserved_phcs(br#"{"name": "x"}"#).unwrap_err();
        assert!(matches!(err, InsightError::InvalidArtifact { .. }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_unparseable_index_skips_record() {
        let doc = json!([
            {"name": "A", "underserved_index": "0.75", "underserved_flag": true},
            {"name": "B", "underserved_index": "high"},
            {"name": "C"}
        ]);
        let records = parse_underserved_phcs(&serde_json::to_vec(&doc).unwrap()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].underserved_index, 0.75);
        assert_eq!(records[0].underserved_flag, 1);
        assert_eq!(records[1].underserved_index, 0.0);
    }

    #[test]
    fn test_resource_alert_falls_back_to_risk_banding() {
        let doc = json!([
            {"name": "A", "resource_risk_score": 0.6},
            {"name": "B", "resource_risk_score": "0.1", "resource_alert": "Moderate"}
        ]);
        let records = parse_resource_warnings(&serde_json::to_vec(&doc).unwrap()).unwrap();
        assert_eq!(records[0].resource_alert, AlertLevel::High);
        assert_eq!(records[1].resource_alert, AlertLevel::Medium);
    }

    #[test]
    fn test_telecom_notes_column_is_detected() {
        let csv = "PHC Name,LGA,State,Network Coverage / Transportation\n\
                   Ikeja PHC,Ikeja,Lagos,\"4G, strong\"\n\
                   Epe PHC,Epe,Lagos,\"2G, poor signal\"\n\
                   Ojo PHC,Ojo,Lagos,\n";
        let advice = parse_telecom_advice(csv.as_bytes()).unwrap();
        assert_eq!(advice.len(), 3);
        assert_eq!(advice[0].preferred_channel, Channel::WhatsApp);
        assert_eq!(advice[1].preferred_channel, Channel::Sms);
        assert_eq!(advice[2].telecom_notes, "");
        assert_eq!(advice[2].preferred_channel, Channel::Sms);
    }

    #[tokio::test]
    async fn test_loads_are_cached_until_refresh() {
        let (store, reader) = store(vec![(OUTBREAK_ALERTS_FILE, json!([{"name": "A", "shortage_score": 1}]))]);

        assert_eq!(store.outbreak_alerts(false).await.unwrap().len(), 1);
        assert_eq!(store.outbreak_alerts(false).await.unwrap().len(), 1);
        assert_eq!(reader.reads.load(Ordering::SeqCst), 1);

        store.outbreak_alerts(true).await.unwrap();
        assert_eq!(reader.reads.load(Ordering::SeqCst), 2);

        store.clear_cache().await;
        store.outbreak_alerts(false).await.unwrap();
        assert_eq!(reader.reads.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_missing_artifact_is_not_found() {
        let (store, _) = store(vec![]);
        let err = store.resource_warnings(false).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
