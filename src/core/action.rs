//! # Actions
//!
//! Everything that can happen in banter becomes an `Action`.
//! User presses Enter? That's `Action::Submit`.
//! The completion lands? That's `Action::CompletionArrived`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns the `Effect` the caller must perform. No I/O
//! happens here — the TUI event loop interprets effects by spawning the
//! matching backend call and feeding the result back as another action.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! This makes the whole session protocol testable without a live backend:
//! feed actions, assert on state and effects.

use log::debug;

use crate::api::{Message, TranscriptEntry};
use crate::core::state::App;

/// An event the session controller reacts to. Completion and persistence
/// results carry the generation they were issued against so results that
/// outlive their session are discarded rather than applied.
#[derive(Debug, Clone)]
pub enum Action {
    /// The user submitted composer text.
    Submit(String),
    /// The completion call returned a reply.
    CompletionArrived { generation: u64, reply: Message },
    /// The completion call failed.
    CompletionFailed { generation: u64, error: String },
    /// Create/replace finished. `assigned` carries the filename the store
    /// assigned on create; `None` for a replace of an already-bound id.
    PersistDone {
        generation: u64,
        assigned: Option<String>,
    },
    /// Create/replace failed. The local history keeps both turns; the next
    /// successful send heals the store via full-replace.
    PersistFailed { generation: u64, error: String },
    /// Fresh transcript index from the store.
    TranscriptsListed(Vec<TranscriptEntry>),
    TranscriptsListFailed(String),
    /// The user picked a transcript in the sidebar.
    OpenTranscript(String),
    /// A transcript read finished.
    TranscriptLoaded { id: String, messages: Vec<Message> },
    TranscriptLoadFailed { id: String, error: String },
    /// Start over with an empty, unsaved session. Pure local operation.
    NewChat,
    /// The user confirmed deletion of a transcript.
    DeleteTranscript(String),
    TranscriptDeleted(String),
    TranscriptDeleteFailed { id: String, error: String },
    /// Switch the model for subsequent sends. Pure local operation.
    SelectModel(String),
    Quit,
}

/// Side effect the caller must perform after `update()` returns. Effects
/// that hit the network carry the generation to tag the spawned task with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    /// Call the completion service with the current messages and model.
    RequestCompletion { generation: u64 },
    /// Persist the current messages: replace when bound, create when fresh.
    Persist { generation: u64 },
    /// Fetch the transcript index for the sidebar.
    RefreshTranscripts,
    /// Read one transcript's messages.
    FetchTranscript(String),
    /// Delete one transcript.
    DeleteTranscript(String),
}

/// Resets the session to an empty, unsaved state and invalidates any
/// in-flight work against the old one.
fn reset_session(app: &mut App) {
    app.generation += 1;
    app.messages.clear();
    app.transcript_id = None;
    app.is_sending = false;
    app.error = None;
    app.status_message.clear();
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit(text) => {
            let text = text.trim();
            if text.is_empty() {
                // Guard, not an error: empty input is silently ignored.
                return Effect::None;
            }
            if app.is_sending {
                debug!("Submit ignored: a send is already in flight");
                return Effect::None;
            }
            // Optimistic append: the user's turn is visible before any
            // network call happens.
            app.messages.push(Message::user(text));
            app.is_sending = true;
            app.error = None;
            app.status_message = String::from("Waiting for reply...");
            Effect::RequestCompletion {
                generation: app.generation,
            }
        }

        Action::CompletionArrived { generation, reply } => {
            if generation != app.generation {
                debug!("Dropping stale completion (generation {generation})");
                return Effect::None;
            }
            app.messages.push(reply);
            app.status_message = String::from("Saving...");
            Effect::Persist { generation }
        }

        Action::CompletionFailed { generation, error } => {
            if generation != app.generation {
                debug!("Dropping stale completion failure (generation {generation})");
                return Effect::None;
            }
            // The optimistic user turn stays; nothing is persisted.
            app.is_sending = false;
            app.status_message.clear();
            app.error = Some(format!("Completion failed: {error}"));
            Effect::None
        }

        Action::PersistDone {
            generation,
            assigned,
        } => {
            if generation != app.generation {
                return Effect::None;
            }
            app.is_sending = false;
            app.status_message = String::from("Saved");
            if let Some(id) = assigned {
                // First save of a fresh session: bind the assigned identity
                // and make it show up in the sidebar.
                app.transcript_id = Some(id);
                return Effect::RefreshTranscripts;
            }
            Effect::None
        }

        Action::PersistFailed { generation, error } => {
            if generation != app.generation {
                return Effect::None;
            }
            app.is_sending = false;
            app.status_message.clear();
            app.error = Some(format!("Save failed: {error}"));
            Effect::None
        }

        Action::TranscriptsListed(entries) => {
            app.transcripts = entries;
            Effect::None
        }

        Action::TranscriptsListFailed(error) => {
            app.error = Some(format!("Could not list transcripts: {error}"));
            Effect::None
        }

        Action::OpenTranscript(id) => Effect::FetchTranscript(id),

        Action::TranscriptLoaded { id, messages } => {
            // Wholesale replacement, never a merge.
            app.generation += 1;
            app.messages = messages;
            app.transcript_id = Some(id);
            app.is_sending = false;
            app.error = None;
            app.status_message.clear();
            Effect::None
        }

        Action::TranscriptLoadFailed { id, error } => {
            // Session untouched: no partial mutation on a failed read.
            app.error = Some(format!("Could not open {id}: {error}"));
            Effect::None
        }

        Action::NewChat => {
            reset_session(app);
            Effect::None
        }

        Action::DeleteTranscript(id) => Effect::DeleteTranscript(id),

        Action::TranscriptDeleted(id) => {
            if app.transcript_id.as_deref() == Some(id.as_str()) {
                reset_session(app);
            }
            app.status_message = String::from("Transcript deleted");
            Effect::RefreshTranscripts
        }

        Action::TranscriptDeleteFailed { id, error } => {
            app.error = Some(format!("Could not delete {id}: {error}"));
            Effect::None
        }

        Action::SelectModel(name) => {
            app.status_message = format!("Model: {name}");
            app.model_name = name;
            Effect::None
        }

        Action::Quit => Effect::Quit,
    }
}
