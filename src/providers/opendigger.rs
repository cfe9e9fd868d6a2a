//! OpenDigger health-metrics client.
//!
//! OpenDigger publishes one static JSON file per repository and metric, an
//! object mapping periods to values:
//!
//! ```json
//! { "2023": 4.1, "2023Q4": 4.4, "2023-11": 4.2, "2023-12": 4.9 }
//! ```
//!
//! Only the most recent monthly value is used.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::http::{DEFAULT_TIMEOUT, build_client, handle_response_errors};
use super::traits::HealthMetricsSource;
use crate::types::HealthMetric;
use crate::{HuginnError, Result};

/// Default base URL for OpenDigger's GitHub data.
pub const DEFAULT_BASE_URL: &str = "https://oss.open-digger.cn/github";

#[derive(Clone)]
pub struct OpenDiggerClient {
    http: Client,
    base_url: String,
}

impl OpenDiggerClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl HealthMetricsSource for OpenDiggerClient {
    fn name(&self) -> &str {
        "opendigger"
    }

    async fn latest(&self, full_name: &str, metric: HealthMetric) -> Result<Option<f64>> {
        let resource = format!("/{full_name}/{}", metric.file_name());
        let url = format!("{}{}", self.base_url, resource);

        let response = self.http.get(&url).send().await?;
        handle_response_errors(&response, &resource)?;

        let body = response.text().await?;
        let series: BTreeMap<String, serde_json::Value> = serde_json::from_str(&body)
            .map_err(|e| HuginnError::InvalidPayload(format!("{resource}: {e}")))?;
        Ok(latest_value(&series))
    }
}

/// Latest numeric value of a period → value series.
///
/// Monthly keys (`YYYY-MM`) sort chronologically as strings, so the last
/// monthly key wins. Series without monthly keys fall back to the last key.
pub fn latest_value(series: &BTreeMap<String, serde_json::Value>) -> Option<f64> {
    let numeric = || {
        series
            .iter()
            .filter_map(|(period, value)| value.as_f64().map(|v| (period.as_str(), v)))
    };
    numeric()
        .filter(|(period, _)| is_month(period))
        .last()
        .or_else(|| numeric().last())
        .map(|(_, value)| value)
}

fn is_month(period: &str) -> bool {
    let bytes = period.as_bytes();
    bytes.len() == 7
        && bytes[4] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..].iter().all(u8::is_ascii_digit)
}
