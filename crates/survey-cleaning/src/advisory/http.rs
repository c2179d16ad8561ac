//! HTTP advisor.
//!
//! Posts a [`DatasetOverview`] as JSON to a recommendation endpoint and reads
//! a [`SettingsRecommendation`] back. The endpoint may answer with the
//! recommendation object directly or wrapped as `{"recommendation": {...}}`.

use super::{CleaningAdvisor, DatasetOverview, SettingsRecommendation};
use anyhow::{Result, anyhow};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AdvisorResponse {
    Wrapped { recommendation: SettingsRecommendation },
    Bare(SettingsRecommendation),
}

impl AdvisorResponse {
    fn into_recommendation(self) -> SettingsRecommendation {
        match self {
            Self::Wrapped { recommendation } | Self::Bare(recommendation) => recommendation,
        }
    }
}

/// Configuration for [`HttpAdvisor`].
#[derive(Debug, Clone)]
pub struct HttpAdvisorConfig {
    /// Endpoint receiving the POSTed overview.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl HttpAdvisorConfig {
    pub fn builder(base_url: impl Into<String>) -> HttpAdvisorConfigBuilder {
        HttpAdvisorConfigBuilder {
            base_url: base_url.into(),
            timeout_secs: None,
        }
    }
}

/// Builder for [`HttpAdvisorConfig`].
pub struct HttpAdvisorConfigBuilder {
    base_url: String,
    timeout_secs: Option<u64>,
}

impl HttpAdvisorConfigBuilder {
    /// Set the request timeout in seconds.
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn build(self) -> HttpAdvisorConfig {
        HttpAdvisorConfig {
            base_url: self.base_url,
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Advisor backed by a remote recommendation service.
///
/// # Example
///
/// ```rust,ignore
/// use survey_cleaning::advisory::{HttpAdvisor, HttpAdvisorConfig};
///
/// let config = HttpAdvisorConfig::builder("https://advisor.example.com/recommend")
///     .timeout_secs(10)
///     .build();
/// let advisor = HttpAdvisor::with_config(Some(api_key), config)?;
/// let outcome = cleaner.run_with_advisor(&dataset, &settings, &advisor)?;
/// ```
pub struct HttpAdvisor {
    api_key: Option<String>,
    config: HttpAdvisorConfig,
    client: Client,
}

impl HttpAdvisor {
    /// Create an advisor for `base_url` with the default timeout.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        Self::with_config(api_key, HttpAdvisorConfig::builder(base_url).build())
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_config(api_key: Option<String>, config: HttpAdvisorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            api_key,
            config,
            client,
        })
    }

    fn call_api(&self, overview: &DatasetOverview) -> Result<SettingsRecommendation> {
        let mut request = self
            .client
            .post(&self.config.base_url)
            .header("Content-Type", "application/json")
            .json(overview);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send()?;
        if !response.status().is_success() {
            return Err(anyhow!(
                "Advisor API Error {}: {}",
                response.status(),
                response.text()?
            ));
        }

        let body = response.text()?;
        parse_recommendation(&body)
    }
}

fn parse_recommendation(body: &str) -> Result<SettingsRecommendation> {
    let parsed: AdvisorResponse = serde_json::from_str(body)
        .map_err(|e| anyhow!("Invalid advisor response: {}", e))?;
    Ok(parsed.into_recommendation())
}

impl CleaningAdvisor for HttpAdvisor {
    fn name(&self) -> &str {
        "http"
    }

    fn recommend(&self, overview: &DatasetOverview) -> Result<SettingsRecommendation> {
        debug!(
            "Requesting recommendation for {} columns from {}",
            overview.column_count, self.config.base_url
        );
        let recommendation = self.call_api(overview)?;
        if let Some(rationale) = &recommendation.rationale {
            info!("Advisor rationale: {}", rationale);
        }
        Ok(recommendation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MissingDataStrategy, OutlierAction};

    #[test]
    fn test_config_builder_defaults() {
        let config = HttpAdvisorConfig::builder("http://localhost:9000/recommend").build();
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);

        let config = HttpAdvisorConfig::builder("http://localhost:9000/recommend")
            .timeout_secs(5)
            .build();
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_parse_bare_and_wrapped() {
        let bare = parse_recommendation(r#"{"outlierAction": "remove"}"#).unwrap();
        assert_eq!(bare.outlier_action, Some(OutlierAction::Remove));

        let wrapped =
            parse_recommendation(r#"{"recommendation": {"missingStrategy": "impute-median"}}"#)
                .unwrap();
        assert_eq!(wrapped.missing_strategy, Some(MissingDataStrategy::ImputeMedian));
    }

    #[test]
    fn test_parse_invalid_body() {
        assert!(parse_recommendation("not json").is_err());
    }

    #[test]
    fn test_unreachable_endpoint_errors() {
        let config = HttpAdvisorConfig::builder("http://127.0.0.1:1/recommend")
            .timeout_secs(1)
            .build();
        let advisor = HttpAdvisor::with_config(None, config).unwrap();
        let overview = DatasetOverview {
            row_count: 0,
            column_count: 0,
            columns: vec![],
        };
        assert!(advisor.recommend(&overview).is_err());
    }
}
