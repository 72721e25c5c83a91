use async_trait::async_trait;
use shared_types::{AnalysisRequest, AnalysisResult};
use std::time::Duration;

use super::{wire, AnalysisError, AnalysisGateway};
use crate::config::Config;

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Posts the essay as JSON to a configured endpoint and validates the reply.
#[derive(Debug, Clone)]
pub struct HttpAnalysisGateway {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpAnalysisGateway {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AnalysisError> {
        let endpoint = endpoint.into();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(AnalysisError::InvalidRequest(format!(
                "analysis endpoint must start with http:// or https://, got '{endpoint}'"
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::Transport(format!("http client: {e}")))?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AnalysisError> {
        Self::new(
            config.analysis_url.clone(),
            config.api_key.clone(),
            config.request_timeout,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[async_trait]
impl AnalysisGateway for HttpAnalysisGateway {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        if request.document_text.trim().is_empty() {
            return Err(AnalysisError::InvalidRequest(
                "document text cannot be empty".to_string(),
            ));
        }

        let started = std::time::Instant::now();
        let mut builder = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::USER_AGENT, "redline-studio/0.1")
            .json(request);
        if let Some(key) = self.api_key.as_deref() {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            tracing::warn!(
                endpoint = %self.endpoint,
                status = status.as_u16(),
                "Analysis service returned non-success status"
            );
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body: truncate_chars(text.trim(), MAX_ERROR_BODY_CHARS),
            });
        }

        let result = wire::parse_response(&body)?;
        tracing::info!(
            endpoint = %self.endpoint,
            task = request.task_variant.as_str(),
            latency_ms = started.elapsed().as_millis() as u64,
            corrections = result.corrections.len(),
            "Analysis response received"
        );
        Ok(result)
    }
}
