//! Gemini `generateContent` client implementing [`CompletionService`]

use super::protocol::{GenerateContentRequest, GenerateContentResponse};
use crate::config::FileGeminiConfig;
use async_trait::async_trait;
use reqwest::Client;
use think_tank_application::ports::completion::{
    Completion, CompletionError, CompletionRequest, CompletionService,
};
use tracing::{debug, info};

/// How requests authenticate against the endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
enum Credentials {
    /// Gemini API: `x-goog-api-key` header
    ApiKey(String),
    /// Vertex AI: `Authorization: Bearer` header
    AccessToken(String),
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

/// Completion service backed by the Gemini REST API.
///
/// One HTTP request per completion; no retries. Pointing `base_url` at a
/// Vertex AI publisher path and supplying an access token targets Vertex AI.
pub struct GeminiCompletionService {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl GeminiCompletionService {
    pub fn new(config: &FileGeminiConfig) -> Result<Self, CompletionError> {
        let credentials = non_blank(&config.access_token)
            .map(Credentials::AccessToken)
            .or_else(|| non_blank(&config.api_key).map(Credentials::ApiKey))
            .ok_or_else(|| {
                CompletionError::Other(
                    "No Gemini credentials configured (set GEMINI_API_KEY or [gemini].access_token)"
                        .to_string(),
                )
            })?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CompletionError::Other(e.to_string()))?;

        info!("GeminiCompletionService initialized ({})", config.base_url);
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

fn transport_error(error: reqwest::Error) -> CompletionError {
    if error.is_timeout() {
        CompletionError::Timeout
    } else if error.is_connect() {
        CompletionError::ConnectionError(error.to_string())
    } else {
        CompletionError::RequestFailed(error.to_string())
    }
}

#[async_trait]
impl CompletionService for GeminiCompletionService {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, CompletionError> {
        let body = GenerateContentRequest::from_request(request);
        debug!(
            "Gemini request for {} ({} turns, {} tools)",
            request.agent,
            body.contents.len(),
            request.tools.len()
        );

        let builder = self.client.post(self.endpoint(request.model.as_str()));
        let builder = match &self.credentials {
            Credentials::ApiKey(key) => builder.header("x-goog-api-key", key),
            Credentials::AccessToken(token) => builder.bearer_auth(token),
        };
        let response = builder
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(CompletionError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;
        parsed.into_completion()
    }
}
