//! HTTP client for the Generative AI chat action.

use ocichat_types::{ChatDetails, ChatError, ChatResult, CohereChatResponse, InferenceProvider};
use ocichat_types::provider::ChatFuture;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

/// API version segment of the chat action path.
const CHAT_ACTION_PATH: &str = "/20231130/actions/chat";

/// Client for the OCI Generative AI inference endpoint.
///
/// Sends each chat request exactly once: no retry and no enforced deadline.
/// A turn blocks until the service answers or the connection errors out.
#[derive(Clone)]
pub struct GenAiClient {
    http: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
}

/// Build the regional inference endpoint URL.
pub fn endpoint_for_region(region: &str) -> String {
    format!("https://inference.generativeai.{region}.oci.oraclecloud.com")
}

impl GenAiClient {
    /// Create a client for the given endpoint. `auth_token`, when present,
    /// is sent as a bearer token (e.g. through a signing gateway); request
    /// signing itself is outside this client.
    pub fn new(
        endpoint: impl Into<String>,
        auth_token: Option<String>,
    ) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ChatError::Network(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            auth_token,
        })
    }

    /// The endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one chat request and parse the dialect response.
    pub async fn send_chat(&self, request: &ChatDetails) -> Result<CohereChatResponse, ChatError> {
        let url = format!("{}{}", self.endpoint, CHAT_ACTION_PATH);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.auth_token {
            headers.insert(
                "authorization",
                HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                    ChatError::Auth {
                        message: "Invalid auth token format".into(),
                    }
                })?,
            );
        }

        let body = serde_json::to_string(request).map_err(|e| ChatError::BadRequest {
            message: format!("Failed to serialize chat request: {e}"),
        })?;

        tracing::debug!("POST {url}");

        let response = self
            .http
            .post(&url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::Timeout
                } else {
                    ChatError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let body_text = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), &body_text, retry_after));
        }

        let body_text = response
            .text()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;
        let result: ChatResult = serde_json::from_str(&body_text)
            .map_err(|e| ChatError::MalformedResponse(format!("{e}: {body_text}")))?;
        Ok(result.chat_response)
    }
}

impl InferenceProvider for GenAiClient {
    fn chat<'a>(&'a self, request: &'a ChatDetails) -> ChatFuture<'a> {
        Box::pin(self.send_chat(request))
    }

    fn name(&self) -> &str {
        "oci-genai"
    }
}

/// Parse the `retry-after` header value as seconds and convert to milliseconds.
fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<f64>().ok())
        .map(|secs| (secs * 1000.0) as u64)
}

/// Classify an HTTP error response into a typed ChatError.
///
/// The error is reported, never retried here; the caller decides whether the
/// session survives it.
fn classify_error(status: u16, body: &str, retry_after: Option<u64>) -> ChatError {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.to_string());

    match status {
        401 | 403 => ChatError::Auth { message },
        400 | 404 => ChatError::BadRequest { message },
        429 => ChatError::RateLimited {
            retry_after_ms: retry_after,
        },
        _ => ChatError::Server { status, message },
    }
}
