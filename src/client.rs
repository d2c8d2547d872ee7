use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use url::Url;

use crate::config::ProxyConfig;
use crate::error::{Error, Result};
use crate::observability::UPSTREAM_REQUEST_DURATION;
use crate::types::{CompletionRequest, CompletionResponse, Message};

/// Anything that can turn a conversation into one assistant reply.
///
/// The proxy endpoint is written against this trait so that the upstream it
/// relays to can be swapped out.
#[async_trait::async_trait]
pub trait CompletionApi: Send + Sync {
    /// Requests a completion for `messages` and returns the first candidate.
    async fn complete(&self, messages: &[Message]) -> Result<Message>;
}

/// Client for an OpenAI-compatible chat-completion API.
#[derive(Debug, Clone)]
pub struct Completions {
    api_key: String,
    client: ReqwestClient,
    endpoint: Url,
    model: String,
    timeout: Duration,
}

impl Completions {
    /// Create a new client from the proxy configuration.
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key: config.api_key.clone(),
            client,
            endpoint: config.completions_url()?,
            model: config.model.clone(),
            timeout: config.timeout,
        })
    }

    /// The model requested on every call.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| Error::authentication("API key contains invalid header characters"))?;
        headers.insert(header::AUTHORIZATION, bearer);
        Ok(headers)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            #[serde(rename = "type")]
            error_type: Option<String>,
            message: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let detail = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .and_then(|e| e.error);
        let error_type = detail.as_ref().and_then(|d| d.error_type.clone());
        let error_message = detail
            .and_then(|d| d.message)
            .unwrap_or_else(|| error_body.clone());

        match status_code {
            401 | 403 => Error::authentication(error_message),
            408 | 504 => Error::timeout(error_message, None),
            _ => Error::api(status_code, error_type, error_message),
        }
    }

    /// Send the conversation to the API and return the raw completion.
    pub async fn create(&self, messages: &[Message]) -> Result<CompletionResponse> {
        let request = CompletionRequest::new(&self.model, messages);
        tracing::debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            messages = messages.len(),
            "requesting chat completion"
        );

        let start = Instant::now();
        let result = self.create_inner(&request).await;
        UPSTREAM_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        result
    }

    async fn create_inner(&self, request: &CompletionRequest<'_>) -> Result<CompletionResponse> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(self.default_headers()?)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::from_send(e, Some(self.timeout.as_secs_f64())))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        response.json::<CompletionResponse>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }
}

#[async_trait::async_trait]
impl CompletionApi for Completions {
    async fn complete(&self, messages: &[Message]) -> Result<Message> {
        self.create(messages).await?.into_reply()
    }
}
