//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the two-pane
//! layout, and translates keyboard events into `core::Action` values.
//!
//! This is the only module that knows about ratatui and crossterm. The core
//! never performs I/O: `update()` returns an [`Effect`], and this loop
//! interprets it by spawning the matching backend call on the tokio runtime.
//! Results come back over an mpsc channel as further actions, so every
//! session mutation flows through the reducer on this one thread.
//!
//! ## Focus model
//!
//! - **Composer** (default): typing edits the input box, Enter sends.
//! - **Browse** (Esc from composer): arrow keys select a message, `y` copies
//!   its raw content, `1`–`9` copy its numbered code blocks. Typing switches
//!   straight back to the composer.
//! - **Sidebar** (Tab): navigate transcripts, Enter opens, `n` starts a new
//!   chat, `d` twice deletes.

mod clipboard;
mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

use std::io::stdout;
use std::sync::{Arc, mpsc};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use log::{debug, info, warn};

use crate::api::HttpBackend;
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{
    ComposerEvent, InputBox, MessageListState, ModelPickerEvent, ModelPickerState, SidebarEvent,
    SidebarState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Which pane keyboard input is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Composer,
    Browse,
    Sidebar,
}

/// TUI-specific presentation state (not part of core business logic).
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
    pub sidebar: SidebarState,
    pub focus: Focus,
    /// Model picker overlay (None = hidden).
    pub model_picker: Option<ModelPickerState>,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
            sidebar: SidebarState::new(),
            focus: Focus::Composer, // User expects to type immediately
            model_picker: None,
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,                        // Show cursor for input editing
            SetCursorStyle::SteadyBlock, // Non-blinking: avoids blink timer reset from continuous redraws
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide // Hide cursor on exit
        );
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let backend = HttpBackend::new(config.base_url.clone(), config.request_timeout)
        .map_err(std::io::Error::other)?;
    let mut app = App::from_config(Arc::new(backend), &config);
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions posted back by background tasks
    let (tx, rx) = mpsc::channel();

    // Populate the sidebar on startup
    run_effect(&app, Effect::RefreshTranscripts, &tx);

    let mut needs_redraw = true; // Force first frame
    let mut should_quit = false;

    loop {
        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui))?;
            needs_redraw = false;
        }

        let first_event = poll_event_timeout(std::time::Duration::from_millis(250));
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain all pending events before the next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if matches!(event, TuiEvent::Resize) {
                continue; // redraw already flagged
            }

            // Ctrl+C always quits regardless of focus
            if matches!(event, TuiEvent::ForceQuit) {
                if dispatch(&mut app, Action::Quit, &tx) {
                    should_quit = true;
                }
                continue;
            }

            // Ctrl+N starts a new chat from anywhere
            if matches!(event, TuiEvent::NewChat) {
                if dispatch(&mut app, Action::NewChat, &tx) {
                    should_quit = true;
                }
                tui.message_list = MessageListState::new();
                tui.input_box.clear();
                tui.focus = Focus::Composer;
                continue;
            }

            // Ctrl+M opens the model picker
            if matches!(event, TuiEvent::OpenModelPicker) {
                tui.model_picker = Some(ModelPickerState::new(app.models.clone()));
                continue;
            }

            // When the picker is open, it captures all events
            if let Some(picker) = tui.model_picker.as_mut() {
                match picker.handle_event(&event) {
                    Some(ModelPickerEvent::Select(name)) => {
                        if dispatch(&mut app, Action::SelectModel(name), &tx) {
                            should_quit = true;
                        }
                        tui.model_picker = None;
                    }
                    Some(ModelPickerEvent::Dismiss) => {
                        tui.model_picker = None;
                    }
                    None => {}
                }
                continue;
            }

            // Mouse wheel always scrolls the conversation
            if matches!(event, TuiEvent::ScrollUp | TuiEvent::ScrollDown) {
                tui.message_list.handle_event(&event);
                continue;
            }

            match tui.focus {
                Focus::Sidebar => handle_sidebar_event(&mut app, &mut tui, &event, &tx),
                Focus::Browse => handle_browse_event(&mut app, &mut tui, &event),
                Focus::Composer => handle_composer_event(&mut app, &mut tui, &event, &tx),
            }
        }

        if should_quit {
            break;
        }

        // Apply actions posted by background tasks
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);

            // A wholesale session replacement invalidates presentation
            // state (cached heights, scroll, selection) too.
            if matches!(&action, Action::TranscriptLoaded { .. }) {
                tui.message_list = MessageListState::new();
            }

            if dispatch(&mut app, action, &tx) {
                should_quit = true;
            }
            tui.sidebar.sync_len(app.transcripts.len());
        }

        if should_quit {
            break;
        }
    }

    ratatui::restore();
    Ok(())
}

// ── Event handling per focus ────────────────────────────────────────────────

fn handle_sidebar_event(
    app: &mut App,
    tui: &mut TuiState,
    event: &TuiEvent,
    tx: &mpsc::Sender<Action>,
) {
    if matches!(event, TuiEvent::Escape | TuiEvent::FocusSidebar) {
        tui.focus = Focus::Composer;
        return;
    }

    let Some(sidebar_event) = tui.sidebar.handle_event(event, &app.transcripts) else {
        return;
    };

    match sidebar_event {
        SidebarEvent::Open(id) => {
            dispatch(app, Action::OpenTranscript(id), tx);
        }
        SidebarEvent::NewChat => {
            dispatch(app, Action::NewChat, tx);
            tui.message_list = MessageListState::new();
            tui.input_box.clear();
            tui.focus = Focus::Composer;
        }
        SidebarEvent::Delete(id) => {
            dispatch(app, Action::DeleteTranscript(id), tx);
        }
    }
}

fn handle_browse_event(app: &mut App, tui: &mut TuiState, event: &TuiEvent) {
    match event {
        TuiEvent::Escape => {
            tui.focus = Focus::Composer;
            tui.message_list.selected_index = None;
        }
        TuiEvent::FocusSidebar => tui.focus = Focus::Sidebar,
        TuiEvent::CursorUp => tui.message_list.select_prev(app.messages.len()),
        TuiEvent::CursorDown => tui.message_list.select_next(app.messages.len()),
        TuiEvent::ScrollPageUp | TuiEvent::ScrollPageDown => {
            tui.message_list.handle_event(event);
        }
        // Copy the selected message's raw content
        TuiEvent::InputChar('y') => copy_selected_message(app, tui),
        // Copy the selected message's numbered code block
        TuiEvent::InputChar(c @ '1'..='9') => {
            let ordinal = *c as usize - '0' as usize;
            copy_selected_code_block(app, tui, ordinal);
        }
        // Any other typing drops back into the composer
        TuiEvent::InputChar(_) | TuiEvent::Paste(_) => {
            tui.focus = Focus::Composer;
            tui.message_list.selected_index = None;
            tui.input_box.handle_event(event);
        }
        TuiEvent::Submit => {
            tui.focus = Focus::Composer;
            tui.message_list.selected_index = None;
        }
        _ => {}
    }
}

fn handle_composer_event(
    app: &mut App,
    tui: &mut TuiState,
    event: &TuiEvent,
    tx: &mpsc::Sender<Action>,
) {
    match event {
        TuiEvent::Escape => {
            tui.focus = Focus::Browse;
            tui.message_list.select_last(app.messages.len());
        }
        TuiEvent::FocusSidebar => tui.focus = Focus::Sidebar,
        // Arrow keys scroll the conversation while composing
        TuiEvent::CursorUp => {
            tui.message_list.handle_event(&TuiEvent::ScrollUp);
        }
        TuiEvent::CursorDown => {
            tui.message_list.handle_event(&TuiEvent::ScrollDown);
        }
        TuiEvent::ScrollPageUp | TuiEvent::ScrollPageDown => {
            tui.message_list.handle_event(event);
        }
        // Re-entrancy guard, made visible: Enter during a send keeps the
        // composer text and nudges instead of dropping it.
        TuiEvent::Submit if app.is_sending => {
            app.status_message = String::from("Still waiting for the last reply...");
        }
        _ => {
            if let Some(ComposerEvent::Submit(text)) = tui.input_box.handle_event(event) {
                dispatch(app, Action::Submit(text), tx);
            }
        }
    }
}

// ── Clipboard affordances ───────────────────────────────────────────────────

fn copy_selected_message(app: &mut App, tui: &TuiState) {
    let Some(message) = tui
        .message_list
        .selected_index
        .and_then(|i| app.messages.get(i))
    else {
        return;
    };
    match clipboard::copy(&message.content) {
        Ok(()) => {
            app.error = None;
            app.status_message = String::from("Copied message");
        }
        Err(notice) => app.error = Some(notice),
    }
}

fn copy_selected_code_block(app: &mut App, tui: &TuiState, ordinal: usize) {
    let Some(message) = tui
        .message_list
        .selected_index
        .and_then(|i| app.messages.get(i))
    else {
        return;
    };
    let blocks = markdown::copyable_blocks(&message.content);
    let Some(block) = blocks.get(ordinal - 1) else {
        app.status_message = format!("No code block [{ordinal}] in this message");
        return;
    };
    match clipboard::copy(&block.text) {
        Ok(()) => {
            app.error = None;
            app.status_message = format!("Copied {} block [{ordinal}]", block.language);
        }
        Err(notice) => app.error = Some(notice),
    }
}

// ── Effect interpretation ───────────────────────────────────────────────────

/// Run an action through the reducer, then perform its effect.
/// Returns true when the app should quit.
fn dispatch(app: &mut App, action: Action, tx: &mpsc::Sender<Action>) -> bool {
    let effect = update(app, action);
    run_effect(app, effect, tx)
}

fn run_effect(app: &App, effect: Effect, tx: &mpsc::Sender<Action>) -> bool {
    match effect {
        Effect::None => false,
        Effect::Quit => true,
        Effect::RequestCompletion { generation } => {
            spawn_completion(app, generation, tx.clone());
            false
        }
        Effect::Persist { generation } => {
            spawn_persist(app, generation, tx.clone());
            false
        }
        Effect::RefreshTranscripts => {
            spawn_refresh(app, tx.clone());
            false
        }
        Effect::FetchTranscript(id) => {
            spawn_load(app, id, tx.clone());
            false
        }
        Effect::DeleteTranscript(id) => {
            spawn_delete(app, id, tx.clone());
            false
        }
    }
}

fn post(tx: &mpsc::Sender<Action>, action: Action) {
    if tx.send(action).is_err() {
        warn!("Failed to deliver background action: receiver dropped");
    }
}

fn spawn_completion(app: &App, generation: u64, tx: mpsc::Sender<Action>) {
    info!("Spawning completion request (generation {generation})");
    let backend = app.backend.clone();
    let messages = app.messages.clone();
    let model = app.model_name.clone();
    tokio::spawn(async move {
        let action = match backend.complete(&messages, &model).await {
            Ok(reply) => Action::CompletionArrived { generation, reply },
            Err(e) => Action::CompletionFailed {
                generation,
                error: e.to_string(),
            },
        };
        post(&tx, action);
    });
}

fn spawn_persist(app: &App, generation: u64, tx: mpsc::Sender<Action>) {
    let backend = app.backend.clone();
    let messages = app.messages.clone();
    let transcript_id = app.transcript_id.clone();
    info!(
        "Spawning persist ({} messages, bound: {})",
        messages.len(),
        transcript_id.is_some()
    );
    tokio::spawn(async move {
        // Full-replace when bound; create (and learn the identity) when fresh.
        let result = match &transcript_id {
            Some(id) => backend.replace_transcript(id, &messages).await.map(|_| None),
            None => backend.create_transcript(&messages).await.map(Some),
        };
        let action = match result {
            Ok(assigned) => Action::PersistDone {
                generation,
                assigned,
            },
            Err(e) => Action::PersistFailed {
                generation,
                error: e.to_string(),
            },
        };
        post(&tx, action);
    });
}

fn spawn_refresh(app: &App, tx: mpsc::Sender<Action>) {
    let backend = app.backend.clone();
    tokio::spawn(async move {
        let action = match backend.list_transcripts().await {
            Ok(entries) => Action::TranscriptsListed(entries),
            Err(e) => Action::TranscriptsListFailed(e.to_string()),
        };
        post(&tx, action);
    });
}

fn spawn_load(app: &App, id: String, tx: mpsc::Sender<Action>) {
    info!("Spawning transcript load: {id}");
    let backend = app.backend.clone();
    tokio::spawn(async move {
        let action = match backend.read_transcript(&id).await {
            Ok(messages) => Action::TranscriptLoaded { id, messages },
            Err(e) => Action::TranscriptLoadFailed {
                id,
                error: e.to_string(),
            },
        };
        post(&tx, action);
    });
}

fn spawn_delete(app: &App, id: String, tx: mpsc::Sender<Action>) {
    info!("Spawning transcript delete: {id}");
    let backend = app.backend.clone();
    tokio::spawn(async move {
        let action = match backend.delete_transcript(&id).await {
            Ok(()) => Action::TranscriptDeleted(id),
            Err(e) => Action::TranscriptDeleteFailed {
                id,
                error: e.to_string(),
            },
        };
        post(&tx, action);
    });
}
