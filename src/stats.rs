//! # Run Statistics
//!
//! Read-only aggregates produced by the engine at the end of a run and parsed
//! from its result document (camelCase keys, codec durations, RFC 3339
//! timestamps). Values are never modified after parsing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::codec::iso_duration;
use crate::error::{DslError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPlanStats {
    #[serde(with = "iso_duration")]
    pub duration: Duration,
    pub overall: StatsSummary,
    /// Per sample label summaries.
    #[serde(default)]
    pub labels: BTreeMap<String, StatsSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub first_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub samples: CountMetricSummary,
    pub errors: CountMetricSummary,
    pub sample_time: TimeMetricSummary,
    pub received_bytes: CountMetricSummary,
    pub sent_bytes: CountMetricSummary,
}

impl StatsSummary {
    pub fn samples_count(&self) -> u64 {
        self.samples.total
    }

    pub fn errors_count(&self) -> u64 {
        self.errors.total
    }

    pub fn sample_time_percentile99(&self) -> Duration {
        self.sample_time.perc99
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountMetricSummary {
    pub total: u64,
    pub per_second: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeMetricSummary {
    #[serde(with = "iso_duration")]
    pub min: Duration,
    #[serde(with = "iso_duration")]
    pub max: Duration,
    #[serde(with = "iso_duration")]
    pub mean: Duration,
    #[serde(with = "iso_duration")]
    pub median: Duration,
    #[serde(with = "iso_duration")]
    pub perc90: Duration,
    #[serde(with = "iso_duration")]
    pub perc95: Duration,
    #[serde(with = "iso_duration")]
    pub perc99: Duration,
}

impl TestPlanStats {
    /// Parse a result document.
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text)
            .map_err(|e| DslError::Format(format!("Invalid statistics document: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    pub fn label(&self, label: &str) -> Option<&StatsSummary> {
        self.labels.get(label)
    }
}
