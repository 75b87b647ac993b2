use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::mastery::UserStats;

const DEFAULT_TIMEOUT_MS: u64 = 5_000;
const PREDICT_PATH: &str = "predict_retention";

#[derive(Debug, Clone)]
pub struct RetentionConfig {
    pub endpoint: Option<String>,
    pub timeout: Duration,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl RetentionConfig {
    pub fn from_env() -> Self {
        let endpoint = std::env::var("ML_SERVICE_URL")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty());
        let timeout_ms = std::env::var("ML_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Self {
            endpoint,
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}

#[derive(Debug, Error)]
pub enum RetentionError {
    #[error("retention service not configured")]
    NotConfigured,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}")]
    HttpStatus { status: reqwest::StatusCode },
}

/// Counts sent to the prediction service. Field names are its wire format.
#[derive(Debug, Serialize)]
struct PredictRequest {
    total_learned: u64,
    ingat_count: u64,
    ragu_count: u64,
    lupa_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionInsight {
    pub retention_rate: f64,
    pub status: String,
    pub decay_risk: String,
    pub next_review_hours: f64,
    pub graph_data: Vec<f64>,
}

impl RetentionInsight {
    pub fn offline() -> Self {
        Self {
            retention_rate: 100.0,
            status: "OFFLINE".to_string(),
            decay_risk: "UNKNOWN".to_string(),
            next_review_hours: 0.0,
            graph_data: vec![0.0; 7],
        }
    }
}

/// Client for the optional retention-prediction service.
#[derive(Clone)]
pub struct RetentionClient {
    config: RetentionConfig,
    client: reqwest::Client,
}

impl RetentionClient {
    pub fn new(config: RetentionConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { config, client }
    }

    pub fn is_configured(&self) -> bool {
        self.config.endpoint.is_some()
    }

    pub async fn predict(&self, stats: &UserStats) -> Result<RetentionInsight, RetentionError> {
        let endpoint = self
            .config
            .endpoint
            .as_deref()
            .ok_or(RetentionError::NotConfigured)?;
        let url = format!("{endpoint}/{PREDICT_PATH}");

        let payload = PredictRequest {
            total_learned: stats.total_learned,
            ingat_count: stats.retained_count,
            ragu_count: stats.uncertain_count,
            lupa_count: stats.forgotten_count,
        };

        let resp = self.client.post(&url).json(&payload).send().await?;
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(RetentionError::HttpStatus { status });
        }
        Ok(resp.json::<RetentionInsight>().await?)
    }

    /// Like [`predict`](Self::predict), but any failure degrades to
    /// [`RetentionInsight::offline`].
    pub async fn predict_or_offline(&self, stats: &UserStats) -> RetentionInsight {
        if !self.is_configured() {
            return RetentionInsight::offline();
        }
        match self.predict(stats).await {
            Ok(insight) => insight,
            Err(err) => {
                warn!(error = %err, "retention prediction unavailable, using offline fallback");
                RetentionInsight::offline()
            }
        }
    }
}
