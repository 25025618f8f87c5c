use crossterm::event::{self, Event, KeyCode, KeyModifiers, MouseEventKind};

/// TUI-specific input events, decoupled from crossterm so components can be
/// tested by feeding them values directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    /// Ctrl+C — quits from any mode.
    ForceQuit,
    Submit,
    Escape,
    /// Tab — toggles sidebar focus.
    FocusSidebar,
    /// Ctrl+N — start a new chat.
    NewChat,
    /// Ctrl+M — open the model picker.
    OpenModelPicker,
    InputChar(char),
    /// Bracketed paste — preserves newlines.
    Paste(String),
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    CursorHome,
    CursorEnd,
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
    Resize,
}

/// Poll for an event without blocking (returns immediately).
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(std::time::Duration::ZERO)
}

/// Poll for an event, blocking up to `timeout`.
pub fn poll_event_timeout(timeout: std::time::Duration) -> Option<TuiEvent> {
    if !event::poll(timeout).ok()? {
        return None;
    }
    match event::read().ok()? {
        Event::Key(key_event) => {
            log::debug!(
                "Key event: {:?} with modifiers {:?}",
                key_event.code,
                key_event.modifiers
            );
            match (key_event.modifiers, key_event.code) {
                (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(TuiEvent::ForceQuit),
                (KeyModifiers::CONTROL, KeyCode::Char('n')) => Some(TuiEvent::NewChat),
                (KeyModifiers::CONTROL, KeyCode::Char('m')) => Some(TuiEvent::OpenModelPicker),
                // Ctrl+J inserts newline (ASCII LF; Ctrl+Enter sends this in most terminals)
                (KeyModifiers::CONTROL, KeyCode::Char('j')) => Some(TuiEvent::InputChar('\n')),
                (_, KeyCode::Tab) => Some(TuiEvent::FocusSidebar),
                (_, KeyCode::Char(c)) => Some(TuiEvent::InputChar(c)),
                (_, KeyCode::Backspace) => Some(TuiEvent::Backspace),
                (_, KeyCode::Delete) => Some(TuiEvent::Delete),
                (_, KeyCode::Enter) => Some(TuiEvent::Submit),
                (_, KeyCode::Esc) => Some(TuiEvent::Escape),
                (_, KeyCode::Left) => Some(TuiEvent::CursorLeft),
                (_, KeyCode::Right) => Some(TuiEvent::CursorRight),
                (_, KeyCode::Up) => Some(TuiEvent::CursorUp),
                (_, KeyCode::Down) => Some(TuiEvent::CursorDown),
                (_, KeyCode::Home) => Some(TuiEvent::CursorHome),
                (_, KeyCode::End) => Some(TuiEvent::CursorEnd),
                (_, KeyCode::PageUp) => Some(TuiEvent::ScrollPageUp),
                (_, KeyCode::PageDown) => Some(TuiEvent::ScrollPageDown),
                _ => None,
            }
        }
        Event::Mouse(mouse_event) => match mouse_event.kind {
            MouseEventKind::ScrollUp => Some(TuiEvent::ScrollUp),
            MouseEventKind::ScrollDown => Some(TuiEvent::ScrollDown),
            _ => None,
        },
        Event::Paste(data) => Some(TuiEvent::Paste(data)),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    }
}
