//! AiClient - AI Collaborator Adapter
//!
//! ## Responsibilities
//!
//! - License-plate identification from a captured frame
//! - Traffic-volume prediction from free-text summaries
//! - Connection management
//!
//! Both flows are opaque collaborators: a single typed request, a single
//! typed response, no partial results. Failures are surfaced to the caller
//! and never crash the session.

use crate::error::{Error, Result};
use crate::gate_store::is_valid_plate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// AI client
pub struct AiClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

/// Plate identification request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyPlateRequest {
    /// Base64 data URI of the captured frame
    /// ("data:image/jpeg;base64,...")
    pub photo_data_uri: String,
}

/// Plate identification result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateIdentification {
    /// Identified plate in the regional "ABC 12345" format
    pub license_plate: String,
}

impl PlateIdentification {
    /// Whether the collaborator honored the regional plate format
    pub fn is_well_formed(&self) -> bool {
        is_valid_plate(&self.license_plate)
    }
}

/// Traffic prediction request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictTrafficRequest {
    /// Historical traffic data (date, time, vehicle counts)
    pub historical_data: String,
    /// Current conditions (weather, day of week, special events)
    pub current_conditions: String,
}

/// Traffic prediction result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficPrediction {
    pub predicted_volume: String,
    pub suggested_adjustments: String,
}

impl AiClient {
    /// Create new AI client with the default 30s processing allowance
    pub fn new(base_url: String) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    /// Create new AI client with custom timeout
    pub fn with_timeout(base_url: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            timeout,
        }
    }

    /// Check AI service health
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/healthz", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Identify the license plate in a captured frame.
    ///
    /// `photo_data_uri` must be a base64 image data URI. Fails fast on any
    /// collaborator error; there is no partial result.
    pub async fn identify_plate(&self, photo_data_uri: &str) -> Result<PlateIdentification> {
        let url = format!("{}/v1/identify-plate", self.base_url);

        let resp = self
            .client
            .post(&url)
            .json(&IdentifyPlateRequest {
                photo_data_uri: photo_data_uri.to_string(),
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "Plate identification failed: {} - {}",
                status, body
            )));
        }

        let result: PlateIdentification = resp.json().await?;

        tracing::debug!(plate = %result.license_plate, "Plate identified");
        Ok(result)
    }

    /// Predict gate traffic volume from historical data and current
    /// conditions
    pub async fn predict_traffic(
        &self,
        historical_data: &str,
        current_conditions: &str,
    ) -> Result<TrafficPrediction> {
        let url = format!("{}/v1/predict-traffic", self.base_url);

        let resp = self
            .client
            .post(&url)
            .json(&PredictTrafficRequest {
                historical_data: historical_data.to_string(),
                current_conditions: current_conditions.to_string(),
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "Traffic prediction failed: {} - {}",
                status, body
            )));
        }

        let result: TrafficPrediction = resp.json().await?;
        Ok(result)
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
