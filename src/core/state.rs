//! # Application State
//!
//! Core business state for banter. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── backend: Arc<dyn ChatBackend>       // transcript store + completions
//! ├── messages: Vec<Message>              // the live conversation
//! ├── transcript_id: Option<String>       // None = fresh/unsaved session
//! ├── transcripts: Vec<TranscriptEntry>   // sidebar index cache
//! ├── model_name: String                  // model for the next send
//! ├── models: Vec<ModelEntry>             // picker choices
//! ├── is_sending: bool                    // a send is in flight
//! ├── generation: u64                     // fence for stale async results
//! ├── status_message: String              // status bar text
//! └── error: Option<String>               // last failure notice
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.
//! This keeps things predictable, so no surprise mutations.

use std::sync::Arc;

use crate::api::{ChatBackend, Message, TranscriptEntry};
use crate::core::config::{ModelEntry, ResolvedConfig};

pub struct App {
    pub backend: Arc<dyn ChatBackend>,
    pub messages: Vec<Message>,
    /// Identity of the bound transcript. `None` means nothing has been
    /// persisted yet for this session.
    pub transcript_id: Option<String>,
    pub transcripts: Vec<TranscriptEntry>,
    pub model_name: String,
    pub models: Vec<ModelEntry>,
    /// Re-entrancy guard: while true, further submits are ignored so one
    /// send's append → complete → append → persist ordering can't interleave
    /// with another's.
    pub is_sending: bool,
    /// Bumped whenever the session is replaced wholesale (new chat, load,
    /// delete-of-current). In-flight work carries the generation it was
    /// issued against; mismatched results are dropped.
    pub generation: u64,
    pub status_message: String,
    pub error: Option<String>,
}

impl App {
    pub fn new(backend: Arc<dyn ChatBackend>, model_name: String) -> Self {
        Self {
            backend,
            messages: Vec::new(),
            transcript_id: None,
            transcripts: Vec::new(),
            model_name,
            models: Vec::new(),
            is_sending: false,
            generation: 0,
            status_message: String::from("Welcome to banter!"),
            error: None,
        }
    }

    pub fn from_config(backend: Arc<dyn ChatBackend>, config: &ResolvedConfig) -> Self {
        let mut app = Self::new(backend, config.model_name.clone());
        app.models = config.models.clone();
        app
    }

    /// True once the session is bound to a persisted transcript.
    pub fn is_bound(&self) -> bool {
        self.transcript_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::test_app;

    #[test]
    fn test_app_new_defaults() {
        let app = test_app();
        assert_eq!(app.status_message, "Welcome to banter!");
        assert!(!app.is_sending);
        assert!(!app.is_bound());
        assert!(app.messages.is_empty());
        assert_eq!(app.model_name, "test-model");
    }
}
