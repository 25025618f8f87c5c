//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::{ApiError, ChatBackend, Message, TranscriptEntry};
use crate::core::state::App;

/// A canned backend for tests that exercise the reducer and components.
/// Reducer tests never await these — effects are inspected as data — but
/// `App` requires a backend to exist.
pub struct StubBackend;

#[async_trait]
impl ChatBackend for StubBackend {
    async fn list_transcripts(&self) -> Result<Vec<TranscriptEntry>, ApiError> {
        Ok(Vec::new())
    }

    async fn read_transcript(&self, _id: &str) -> Result<Vec<Message>, ApiError> {
        Ok(Vec::new())
    }

    async fn create_transcript(&self, _messages: &[Message]) -> Result<String, ApiError> {
        Ok("stub.json".to_string())
    }

    async fn replace_transcript(&self, _id: &str, _messages: &[Message]) -> Result<(), ApiError> {
        Ok(())
    }

    async fn delete_transcript(&self, _id: &str) -> Result<(), ApiError> {
        Ok(())
    }

    async fn complete(&self, _messages: &[Message], _model: &str) -> Result<Message, ApiError> {
        Ok(Message::system("stub reply"))
    }
}

/// Creates a test App with a StubBackend.
pub fn test_app() -> App {
    App::new(Arc::new(StubBackend), "test-model".to_string())
}
