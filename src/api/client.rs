//! Typed wrapper around the transcript/completion backend.
//!
//! Every operation is plain request/response — no streaming, no retries.
//! Failures map to [`ApiError`] and recovery is the caller's decision.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::types::{Message, Role, TranscriptEntry};

/// Errors that can occur talking to the backend.
#[derive(Debug)]
pub enum ApiError {
    /// Client misconfigured (bad URL, TLS init failure). Not a backend fault.
    Config(String),
    /// Transport-level failure: timeout, DNS, connection refused.
    Network(String),
    /// Backend answered with a non-success status.
    Api { status: u16, message: String },
    /// Response body could not be decoded.
    Parse(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Config(msg) => write!(f, "config error: {msg}"),
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Api { status, message } => {
                write!(f, "backend error (HTTP {status}): {message}")
            }
            ApiError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// The full backend surface the session controller needs. Kept behind a
/// trait so the reducer and component tests can run against a stub.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// List transcript index entries, newest first (backend ordering).
    async fn list_transcripts(&self) -> Result<Vec<TranscriptEntry>, ApiError>;

    /// Read a full transcript by filename.
    async fn read_transcript(&self, id: &str) -> Result<Vec<Message>, ApiError>;

    /// Create a new transcript from `messages`; returns the assigned filename.
    async fn create_transcript(&self, messages: &[Message]) -> Result<String, ApiError>;

    /// Overwrite the transcript `id` with `messages` (full-replace: the
    /// backend has no partial-update operation).
    async fn replace_transcript(&self, id: &str, messages: &[Message]) -> Result<(), ApiError>;

    /// Delete the transcript `id`.
    async fn delete_transcript(&self, id: &str) -> Result<(), ApiError>;

    /// Turn a non-empty message history into one reply. The reply's role is
    /// always [`Role::System`].
    async fn complete(&self, messages: &[Message], model: &str) -> Result<Message, ApiError>;
}

#[derive(Serialize)]
struct TranscriptPayload<'a> {
    messages: &'a [Message],
}

#[derive(Serialize)]
struct CompletionPayload<'a> {
    messages: &'a [Message],
    model: &'a str,
}

#[derive(Deserialize)]
struct CreatedResponse {
    filename: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    content: String,
}

/// reqwest-backed implementation of [`ChatBackend`].
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Builds a client with a finite request timeout. Expiry surfaces as
    /// [`ApiError::Network`] like any other transport failure.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Checks the status and decodes the body, mapping failures to the
    /// error taxonomy.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let response = Self::check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Backend error: HTTP {} - {}", status, message);
            return Err(ApiError::Api { status, message });
        }
        Ok(response)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn list_transcripts(&self) -> Result<Vec<TranscriptEntry>, ApiError> {
        debug!("GET /chat-files");
        let response = self
            .client
            .get(self.url("/chat-files"))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::decode(response).await
    }

    async fn read_transcript(&self, id: &str) -> Result<Vec<Message>, ApiError> {
        debug!("GET /chat/{id}");
        let response = self
            .client
            .get(self.url(&format!("/chat/{id}")))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::decode(response).await
    }

    async fn create_transcript(&self, messages: &[Message]) -> Result<String, ApiError> {
        debug!("POST /new-chat ({} messages)", messages.len());
        let response = self
            .client
            .post(self.url("/new-chat"))
            .json(&TranscriptPayload { messages })
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let created: CreatedResponse = Self::decode(response).await?;
        Ok(created.filename)
    }

    async fn replace_transcript(&self, id: &str, messages: &[Message]) -> Result<(), ApiError> {
        debug!("PUT /chat/{id} ({} messages)", messages.len());
        let response = self
            .client
            .put(self.url(&format!("/chat/{id}")))
            .json(&TranscriptPayload { messages })
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn delete_transcript(&self, id: &str) -> Result<(), ApiError> {
        debug!("DELETE /chat/{id}");
        let response = self
            .client
            .delete(self.url(&format!("/chat/{id}")))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn complete(&self, messages: &[Message], model: &str) -> Result<Message, ApiError> {
        debug!("POST /chat ({} messages, model={})", messages.len(), model);
        let response = self
            .client
            .post(self.url("/chat"))
            .json(&CompletionPayload { messages, model })
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let reply: CompletionResponse = Self::decode(response).await?;
        Ok(Message {
            role: Role::System,
            content: reply.content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let backend = HttpBackend::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(backend.url("/chat-files"), "http://localhost:8000/chat-files");
    }

    #[test]
    fn test_transcript_payload_shape() {
        let messages = vec![Message::user("hi")];
        let payload = TranscriptPayload {
            messages: &messages,
        };
        let serialized = serde_json::to_string(&payload).unwrap();
        assert_eq!(
            serialized,
            r#"{"messages":[{"role":"user","content":"hi"}]}"#
        );
    }

    #[test]
    fn test_completion_payload_shape() {
        let messages = vec![Message::user("hi")];
        let payload = CompletionPayload {
            messages: &messages,
            model: "llama-3.3-70b-versatile",
        };
        let serialized = serde_json::to_string(&payload).unwrap();
        assert_eq!(
            serialized,
            r#"{"messages":[{"role":"user","content":"hi"}],"model":"llama-3.3-70b-versatile"}"#
        );
    }

    #[test]
    fn test_completion_response_ignores_extra_fields() {
        // The backend echoes a role alongside the content; only content matters.
        let body = r#"{"role":"system","content":"hello"}"#;
        let parsed: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.content, "hello");
    }
}
