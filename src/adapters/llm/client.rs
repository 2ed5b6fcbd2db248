//! HTTP client for a Messages-style language-model API
//!
//! One request per cluster. Transient failures (connection errors, timeouts,
//! 429 and 5xx) are retried with exponential backoff and jitter; other 4xx
//! responses fail immediately.

use super::models::{ApiErrorResponse, Message, MessagesRequest, MessagesResponse};
use super::prompt::{build_prompt, parse_annotation, SYSTEM_PROMPT};
use super::ClusterAnalyzer;
use crate::config::{secret_string_opt, AnalysisConfig, RetryConfig, SecretString};
use crate::domain::{
    AnalysisContext, AnalyzerError, ClusterAnnotation, ClusterRow, PhenoscribeError, Result,
};
use async_trait::async_trait;
use rand::Rng;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use std::time::{Duration, Instant};

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Messages API client
pub struct MessagesClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    api_version: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
    retry: RetryConfig,
}

impl MessagesClient {
    /// Create a client from analysis settings
    ///
    /// The API key comes from `analysis.api_key`, falling back to
    /// `ANTHROPIC_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns `AnalyzerError::MissingApiKey` when neither is set, or a
    /// connection error if the HTTP client cannot be built.
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| secret_string_opt(std::env::var(API_KEY_ENV).ok()))
            .ok_or(AnalyzerError::MissingApiKey)?;

        Self::with_api_key(config, api_key)
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(config: &AnalysisConfig, api_key: SecretString) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                PhenoscribeError::Analyzer(AnalyzerError::ConnectionFailed(format!(
                    "Failed to build HTTP client: {e}"
                )))
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            retry: config.retry.clone(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn build_request(&self, row: &ClusterRow, context: &AnalysisContext) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: SYSTEM_PROMPT.to_string(),
            messages: vec![Message::user(build_prompt(row, context))],
        }
    }

    /// Send one request, no retries
    async fn send_once(
        &self,
        request: &MessagesRequest,
    ) -> std::result::Result<MessagesResponse, AnalyzerError> {
        let api_key: &str = self.api_key.expose_secret().as_ref();
        let resp = self
            .client
            .post(self.messages_url())
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.api_version)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalyzerError::Timeout(e.to_string())
                } else {
                    AnalyzerError::ConnectionFailed(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        resp.json::<MessagesResponse>()
            .await
            .map_err(|e| AnalyzerError::InvalidResponse(e.to_string()))
    }

    /// Send with retry on transient errors
    async fn send_with_retry(
        &self,
        request: &MessagesRequest,
    ) -> std::result::Result<MessagesResponse, AnalyzerError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.send_once(request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = backoff_delay(&self.retry, attempt);
                    crate::log_retry_attempt!(attempt, max_attempts, e);
                    tracing::debug!(delay_ms = delay.as_millis() as u64, "Backing off");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl ClusterAnalyzer for MessagesClient {
    async fn analyze(
        &self,
        row: &ClusterRow,
        context: &AnalysisContext,
    ) -> Result<ClusterAnnotation> {
        let request = self.build_request(row, context);
        let started = Instant::now();

        let response = self.send_with_retry(&request).await?;

        if let Some(usage) = response.usage {
            tracing::debug!(
                cluster_id = %row.cluster_id,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                duration_ms = started.elapsed().as_millis() as u64,
                "Analyzer response received"
            );
        }

        if response.stop_reason.as_deref() == Some("max_tokens") {
            tracing::warn!(
                cluster_id = %row.cluster_id,
                max_tokens = self.max_tokens,
                "Analyzer response was truncated"
            );
        }

        Ok(parse_annotation(&response.text(), &row.cluster_id)?)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Delay before retry number `attempt` (1-based)
///
/// Exponential in the attempt number, capped at `max_delay_ms`, plus up to
/// 25% random jitter.
fn backoff_delay(retry: &RetryConfig, attempt: usize) -> Duration {
    let exponent = attempt.saturating_sub(1) as i32;
    let base = retry.initial_delay_ms as f64 * retry.backoff_multiplier.powi(exponent);
    let base_ms = (base as u64).min(retry.max_delay_ms);
    let jitter_ms = if base_ms >= 4 {
        rand::thread_rng().gen_range(0..=base_ms / 4)
    } else {
        0
    };
    Duration::from_millis(base_ms + jitter_ms)
}

fn status_error(status: StatusCode, body: &str) -> AnalyzerError {
    let message = serde_json::from_str::<ApiErrorResponse>(body)
        .map(|e| match e.error.error_type {
            Some(kind) => format!("{kind}: {}", e.error.message),
            None => e.error.message,
        })
        .unwrap_or_else(|_| body.to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            AnalyzerError::AuthenticationFailed(message)
        }
        StatusCode::TOO_MANY_REQUESTS => AnalyzerError::RateLimitExceeded(message),
        s if s.is_server_error() => AnalyzerError::ServerError {
            status: s.as_u16(),
            message,
        },
        s => AnalyzerError::ClientError {
            status: s.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use crate::domain::ClusterId;
    use mockito::Matcher;

    fn config(base_url: &str) -> AnalysisConfig {
        AnalysisConfig {
            base_url: base_url.to_string(),
            model: "test-model".to_string(),
            retry: RetryConfig {
                max_attempts: 3,
                initial_delay_ms: 1,
                max_delay_ms: 5,
                backoff_multiplier: 2.0,
            },
            ..AnalysisConfig::default()
        }
    }

    fn client(base_url: &str) -> MessagesClient {
        MessagesClient::with_api_key(&config(base_url), secret_string("test-key".to_string()))
            .unwrap()
    }

    fn row() -> ClusterRow {
        ClusterRow::new(
            ClusterId::new("3").unwrap(),
            vec!["MRPL12".to_string(), "MRPS5".to_string()],
        )
    }

    fn body_with_text(text: &str) -> String {
        serde_json::json!({
            "content": [{"type": "text", "text": text}],
            "model": "test-model",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 100, "output_tokens": 50}
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_analyze_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-key")
            .match_header("anthropic-version", "2023-06-01")
            .match_body(Matcher::PartialJson(serde_json::json!({"model": "test-model"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body_with_text(
                "```json\n{\"cluster_id\": \"3\", \"dominant_process\": \"Mitochondrial translation\", \"established_genes\": [\"MRPL12\", \"MRPS5\"]}\n```",
            ))
            .expect(1)
            .create_async()
            .await;

        let annotation = client(&server.url())
            .analyze(&row(), &AnalysisContext::default())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            annotation.dominant_process.as_deref(),
            Some("Mitochondrial translation")
        );
        assert_eq!(annotation.num_established(), 2);
    }

    #[tokio::test]
    async fn test_analyze_retries_server_errors() {
        let mut server = mockito::Server::new_async().await;
        let failing = server
            .mock("POST", "/v1/messages")
            .with_status(503)
            .with_body(r#"{"error": {"type": "overloaded_error", "message": "busy"}}"#)
            .expect(3)
            .create_async()
            .await;

        let result = client(&server.url())
            .analyze(&row(), &AnalysisContext::default())
            .await;

        failing.assert_async().await;
        match result {
            Err(PhenoscribeError::Analyzer(AnalyzerError::ServerError { status, message })) => {
                assert_eq!(status, 503);
                assert!(message.contains("busy"));
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_analyze_does_not_retry_client_errors() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .with_status(400)
            .with_body(r#"{"error": {"type": "invalid_request_error", "message": "bad"}}"#)
            .expect(1)
            .create_async()
            .await;

        let result = client(&server.url())
            .analyze(&row(), &AnalysisContext::default())
            .await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(PhenoscribeError::Analyzer(AnalyzerError::ClientError { status: 400, .. }))
        ));
    }

    #[tokio::test]
    async fn test_analyze_authentication_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let result = client(&server.url())
            .analyze(&row(), &AnalysisContext::default())
            .await;

        assert!(matches!(
            result,
            Err(PhenoscribeError::Analyzer(AnalyzerError::AuthenticationFailed(_)))
        ));
    }

    #[tokio::test]
    async fn test_analyze_unparseable_text() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body_with_text("I cannot help with that."))
            .create_async()
            .await;

        let result = client(&server.url())
            .analyze(&row(), &AnalysisContext::default())
            .await;

        assert!(matches!(
            result,
            Err(PhenoscribeError::Analyzer(AnalyzerError::InvalidResponse(_)))
        ));
    }

    #[test]
    fn test_backoff_delay_grows_and_caps() {
        let retry = RetryConfig {
            max_attempts: 5,
            initial_delay_ms: 100,
            max_delay_ms: 300,
            backoff_multiplier: 2.0,
        };

        let first = backoff_delay(&retry, 1).as_millis();
        let second = backoff_delay(&retry, 2).as_millis();
        let fourth = backoff_delay(&retry, 4).as_millis();

        assert!((100..=125).contains(&first));
        assert!((200..=250).contains(&second));
        assert!((300..=375).contains(&fourth));
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            AnalyzerError::RateLimitExceeded(_)
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, ""),
            AnalyzerError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            status_error(StatusCode::from_u16(529).unwrap(), ""),
            AnalyzerError::ServerError { status: 529, .. }
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, ""),
            AnalyzerError::ClientError { status: 404, .. }
        ));
    }

    #[test]
    fn test_new_requires_api_key() {
        std::env::remove_var(API_KEY_ENV);
        let result = MessagesClient::new(&AnalysisConfig::default());
        assert!(matches!(
            result,
            Err(PhenoscribeError::Analyzer(AnalyzerError::MissingApiKey))
        ));
    }
}
