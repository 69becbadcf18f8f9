//! Client for the remote prompt-enhancement service.
//!
//! The service is an opaque collaborator: four JSON `POST` endpoints that all
//! answer with the same `{success, data?, enhanced?, improvement?, model?}`
//! envelope.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::RemoteError;
use crate::models::{Enhancement, IntentResult, QualityAnalysis, VariationSet};

/// Operations the workbench needs from the enhancement service.
#[async_trait]
pub trait PromptService: Send + Sync + 'static {
    async fn detect_intent(&self, prompt: &str) -> Result<IntentResult, RemoteError>;

    async fn enhance(&self, prompt: &str) -> Result<Enhancement, RemoteError>;

    /// Quality heatmap analysis.
    async fn analyze(&self, prompt: &str) -> Result<QualityAnalysis, RemoteError>;

    /// Three-way variation comparison with a recommendation.
    async fn compare(&self, prompt: &str) -> Result<VariationSet, RemoteError>;
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    enhanced: Option<String>,
    improvement: Option<f64>,
    model: Option<String>,
    error: Option<String>,
}

/// Decodes a response body into its envelope, mapping every failure shape
/// onto [`RemoteError`].
fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<Envelope<T>, RemoteError> {
    if !(200..300).contains(&status) {
        return Err(RemoteError::Status {
            status,
            body: body.to_string(),
        });
    }
    let envelope: Envelope<T> = serde_json::from_str(body)
        .map_err(|e| RemoteError::malformed(format!("invalid envelope: {e}")))?;
    if !envelope.success {
        return Err(RemoteError::Rejected {
            message: envelope
                .error
                .clone()
                .unwrap_or_else(|| "success flag not set".to_string()),
        });
    }
    Ok(envelope)
}

fn take_data<T>(envelope: Envelope<T>) -> Result<T, RemoteError> {
    envelope
        .data
        .ok_or_else(|| RemoteError::malformed("missing `data` payload"))
}

fn take_enhancement(envelope: Envelope<serde_json::Value>) -> Result<Enhancement, RemoteError> {
    let enhanced = envelope
        .enhanced
        .ok_or_else(|| RemoteError::malformed("missing `enhanced` text"))?;
    Ok(Enhancement {
        enhanced,
        improvement: envelope.improvement,
        model: envelope.model,
    })
}

/// [`PromptService`] over HTTP using `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpPromptService {
    client: reqwest::Client,
    api_base: String,
}

impl HttpPromptService {
    /// `api_base` is the URL the endpoint names are appended to, e.g.
    /// `http://localhost:5000/api`. With no `timeout` a hung request simply
    /// never completes.
    pub fn new(api_base: impl Into<String>, timeout: Option<Duration>) -> Result<Self, RemoteError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<Envelope<T>, RemoteError> {
        let url = format!("{}/{}", self.api_base, endpoint);
        debug!(%url, "POST");
        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        decode_envelope(status, &text)
    }
}

#[async_trait]
impl PromptService for HttpPromptService {
    async fn detect_intent(&self, prompt: &str) -> Result<IntentResult, RemoteError> {
        take_data(self.post("detect-intent", json!({ "prompt": prompt })).await?)
    }

    async fn enhance(&self, prompt: &str) -> Result<Enhancement, RemoteError> {
        take_enhancement(self.post("enhance", json!({ "prompt": prompt })).await?)
    }

    async fn analyze(&self, prompt: &str) -> Result<QualityAnalysis, RemoteError> {
        take_data(self.post("quality-heatmap", json!({ "prompt": prompt })).await?)
    }

    async fn compare(&self, prompt: &str) -> Result<VariationSet, RemoteError> {
        take_data(
            self.post(
                "ab-test",
                json!({ "prompt": prompt, "include_comparison": true }),
            )
            .await?,
        )
    }
}
