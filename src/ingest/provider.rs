//! Provider payload shapes and the stats-source seam
//!
//! The rank-stats endpoint nests records as rank bucket -> lane bucket ->
//! list, with ids and rates emitted inconsistently as numbers or strings.
//! Everything is converted into strongly-typed structs right here at the
//! boundary; the core never sees loosely-typed maps.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

#[derive(Debug)]
pub enum ProviderError {
    Http(reqwest::Error),
    Io(std::io::Error),
    Malformed(serde_json::Error),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Http(err)
    }
}

impl From<std::io::Error> for ProviderError {
    fn from(err: std::io::Error) -> Self {
        ProviderError::Io(err)
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Malformed(err)
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Http(e) => write!(f, "HTTP error: {}", e),
            ProviderError::Io(e) => write!(f, "IO error: {}", e),
            ProviderError::Malformed(e) => write!(f, "Malformed payload: {}", e),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Provider hero roster (`heroList` document)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRoster {
    #[serde(rename = "heroList")]
    pub hero_list: HashMap<String, ProviderHero>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderHero {
    pub name: String,
}

/// One raw rank/lane statistics record. Rates are fractional in [0, 1]
/// at this boundary; the merge step scales them to percentages.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStatRecord {
    #[serde(deserialize_with = "flexible_string")]
    pub hero_id: String,
    /// Observation date in the provider's `YYYYMMDD` form
    pub dtstatdate: String,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub win_rate: f64,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub appear_rate: f64,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub forbid_rate: f64,
}

/// Full rank-stats payload: rank bucket -> lane bucket -> records.
///
/// `BTreeMap` keeps batch iteration order deterministic across runs.
#[derive(Debug, Clone, Deserialize)]
pub struct RankStatsPayload {
    pub data: BTreeMap<u32, BTreeMap<u32, Vec<RawStatRecord>>>,
}

impl RankStatsPayload {
    /// Total record count across all buckets
    pub fn record_count(&self) -> usize {
        self.data
            .values()
            .flat_map(|lanes| lanes.values())
            .map(|records| records.len())
            .sum()
    }
}

/// Accept a JSON number or numeric string (the provider mixes both)
fn flexible_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(f64),
        Str(String),
    }

    match NumOrStr::deserialize(deserializer)? {
        NumOrStr::Num(v) => Ok(v),
        NumOrStr::Str(s) => s.parse::<f64>().map_err(serde::de::Error::custom),
    }
}

/// Accept a JSON string or integer id
fn flexible_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StrOrInt {
        Str(String),
        Int(u64),
    }

    match StrOrInt::deserialize(deserializer)? {
        StrOrInt::Str(s) => Ok(s),
        StrOrInt::Int(n) => Ok(n.to_string()),
    }
}

/// Source of the provider roster and rank-stats documents
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn fetch_roster(&self) -> Result<ProviderRoster, ProviderError>;

    async fn fetch_rank_stats(&self) -> Result<RankStatsPayload, ProviderError>;

    /// Source type for logging
    fn source_type(&self) -> &'static str;
}

/// Live HTTP source against the provider's JSON endpoints
pub struct HttpStatsSource {
    client: reqwest::Client,
    roster_url: String,
    stats_url: String,
}

impl HttpStatsSource {
    pub fn new(roster_url: String, stats_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            roster_url,
            stats_url,
        }
    }
}

#[async_trait]
impl StatsSource for HttpStatsSource {
    async fn fetch_roster(&self) -> Result<ProviderRoster, ProviderError> {
        log::info!("Fetching provider roster from {}", self.roster_url);
        let roster = self
            .client
            .get(&self.roster_url)
            .send()
            .await?
            .error_for_status()?
            .json::<ProviderRoster>()
            .await?;
        log::info!("Provider roster: {} heroes", roster.hero_list.len());
        Ok(roster)
    }

    async fn fetch_rank_stats(&self) -> Result<RankStatsPayload, ProviderError> {
        log::info!("Fetching rank stats from {}", self.stats_url);
        let payload = self
            .client
            .get(&self.stats_url)
            .send()
            .await?
            .error_for_status()?
            .json::<RankStatsPayload>()
            .await?;
        log::info!("Rank stats: {} records", payload.record_count());
        Ok(payload)
    }

    fn source_type(&self) -> &'static str {
        "HTTP"
    }
}

/// Replay source reading previously saved payload documents from disk
pub struct FileStatsSource {
    roster_path: PathBuf,
    stats_path: PathBuf,
}

impl FileStatsSource {
    pub fn new(roster_path: impl Into<PathBuf>, stats_path: impl Into<PathBuf>) -> Self {
        Self {
            roster_path: roster_path.into(),
            stats_path: stats_path.into(),
        }
    }
}

#[async_trait]
impl StatsSource for FileStatsSource {
    async fn fetch_roster(&self) -> Result<ProviderRoster, ProviderError> {
        log::info!("Replaying provider roster from {}", self.roster_path.display());
        let json = std::fs::read_to_string(&self.roster_path)?;
        Ok(serde_json::from_str(&json)?)
    }

    async fn fetch_rank_stats(&self) -> Result<RankStatsPayload, ProviderError> {
        log::info!("Replaying rank stats from {}", self.stats_path.display());
        let json = std::fs::read_to_string(&self.stats_path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn source_type(&self) -> &'static str {
        "FILE"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rank_stats_payload() {
        let json = r#"{
            "data": {
                "0": {
                    "3": [
                        {"hero_id": "7", "dtstatdate": "20240101",
                         "win_rate": "0.52", "appear_rate": 0.10, "forbid_rate": "0.01"}
                    ]
                },
                "2": {
                    "1": [
                        {"hero_id": 12, "dtstatdate": "20240101",
                         "win_rate": 0.48, "appear_rate": "0.05", "forbid_rate": 0.0}
                    ]
                }
            }
        }"#;

        let payload: RankStatsPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.record_count(), 2);

        let rec = &payload.data[&0][&3][0];
        assert_eq!(rec.hero_id, "7");
        assert_eq!(rec.win_rate, 0.52);
        assert_eq!(rec.appear_rate, 0.10);
        assert_eq!(rec.forbid_rate, 0.01);

        // Numeric hero_id normalizes to a string
        let rec = &payload.data[&2][&1][0];
        assert_eq!(rec.hero_id, "12");
    }

    #[test]
    fn test_missing_rates_default_to_zero() {
        let json = r#"{"hero_id": "7", "dtstatdate": "20240101"}"#;
        let rec: RawStatRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.win_rate, 0.0);
        assert_eq!(rec.appear_rate, 0.0);
        assert_eq!(rec.forbid_rate, 0.0);
    }

    #[test]
    fn test_parse_provider_roster() {
        let json = r#"{"heroList": {"7": {"name": "九尾妖狐", "title": "阿狸"}}}"#;
        let roster: ProviderRoster = serde_json::from_str(json).unwrap();
        assert_eq!(roster.hero_list["7"].name, "九尾妖狐");
    }

    #[tokio::test]
    async fn test_file_source_replay() {
        let tmp = tempfile::TempDir::new().unwrap();
        let roster_path = tmp.path().join("hero_list.json");
        let stats_path = tmp.path().join("rank_stats.json");

        std::fs::write(&roster_path, r#"{"heroList": {"7": {"name": "九尾妖狐"}}}"#).unwrap();
        std::fs::write(
            &stats_path,
            r#"{"data": {"0": {"3": [{"hero_id": "7", "dtstatdate": "20240101", "win_rate": 0.5, "appear_rate": 0.1, "forbid_rate": 0.01}]}}}"#,
        )
        .unwrap();

        let source = FileStatsSource::new(&roster_path, &stats_path);
        assert_eq!(source.source_type(), "FILE");
        assert_eq!(source.fetch_roster().await.unwrap().hero_list.len(), 1);
        assert_eq!(source.fetch_rank_stats().await.unwrap().record_count(), 1);
    }
}
