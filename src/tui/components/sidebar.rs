//! # Transcript Sidebar
//!
//! The left pane of the two-pane layout: lists saved transcripts, opens one
//! on Enter, starts a new chat on `n`, and deletes on a double-press of `d`
//! (the second press is the explicit confirmation; any other key disarms).
//!
//! The entry list itself is a prop — the authoritative index cache lives in
//! `App.transcripts`. The sidebar only owns its selection and the armed
//! delete flag.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph};

use crate::api::TranscriptEntry;
use crate::tui::event::TuiEvent;

/// Persistent selection state for the sidebar.
pub struct SidebarState {
    pub selected: usize,
    /// Armed by the first `d`; the next `d` fires the delete.
    pub confirm_delete: bool,
    pub list_state: ListState,
}

impl Default for SidebarState {
    fn default() -> Self {
        Self::new()
    }
}

impl SidebarState {
    pub fn new() -> Self {
        Self {
            selected: 0,
            confirm_delete: false,
            list_state: ListState::default(),
        }
    }

    /// Clamp the selection after the entry list changed underneath us
    /// (refresh after create/delete).
    pub fn sync_len(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
            self.list_state.select(None);
        } else {
            self.selected = self.selected.min(len - 1);
            self.list_state.select(Some(self.selected));
        }
    }

    /// Handle a key event against the given entries, returning a
    /// SidebarEvent when the pane should act.
    pub fn handle_event(
        &mut self,
        event: &TuiEvent,
        entries: &[TranscriptEntry],
    ) -> Option<SidebarEvent> {
        // Any key other than `d` disarms a pending delete.
        if !matches!(event, TuiEvent::InputChar('d')) {
            self.confirm_delete = false;
        }

        match event {
            TuiEvent::CursorUp => {
                if !entries.is_empty() {
                    self.selected = self.selected.saturating_sub(1);
                    self.list_state.select(Some(self.selected));
                }
                None
            }
            TuiEvent::CursorDown => {
                if !entries.is_empty() {
                    self.selected = (self.selected + 1).min(entries.len() - 1);
                    self.list_state.select(Some(self.selected));
                }
                None
            }
            TuiEvent::Submit => entries
                .get(self.selected)
                .map(|entry| SidebarEvent::Open(entry.filename.clone())),
            TuiEvent::InputChar('n') => Some(SidebarEvent::NewChat),
            TuiEvent::InputChar('d') => {
                if entries.is_empty() {
                    return None;
                }
                if self.confirm_delete {
                    self.confirm_delete = false;
                    Some(SidebarEvent::Delete(entries[self.selected].filename.clone()))
                } else {
                    self.confirm_delete = true;
                    None
                }
            }
            _ => None,
        }
    }
}

/// Events emitted by the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarEvent {
    Open(String),
    NewChat,
    /// Emitted only after the confirming second `d`.
    Delete(String),
}

/// Transient render wrapper for the sidebar pane.
pub struct Sidebar<'a> {
    state: &'a mut SidebarState,
    entries: &'a [TranscriptEntry],
    /// Identity of the currently bound transcript, if any.
    current_id: Option<&'a str>,
    focused: bool,
}

impl<'a> Sidebar<'a> {
    pub fn new(
        state: &'a mut SidebarState,
        entries: &'a [TranscriptEntry],
        current_id: Option<&'a str>,
        focused: bool,
    ) -> Self {
        Self {
            state,
            entries,
            current_id,
            focused,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let help_text = if self.state.confirm_delete {
            " d again to delete "
        } else if self.focused {
            " ↵ Open  n New  d Del "
        } else {
            " Tab to focus "
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Chats ")
            .title_bottom(Line::from(help_text).centered())
            .padding(Padding::horizontal(1));

        if self.entries.is_empty() {
            let empty = Paragraph::new("No saved chats.")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let inner_width = area.width.saturating_sub(4) as usize; // borders + padding

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let label = entry_label(entry);
                let is_current = self.current_id == Some(entry.filename.as_str());
                let marker = if is_current { "* " } else { "  " };
                let text = truncate_str(&format!("{marker}{label}"), inner_width);

                let style = if i == self.state.selected && self.focused {
                    if self.state.confirm_delete {
                        Style::default()
                            .fg(Color::Red)
                            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                    } else {
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                    }
                } else if is_current {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default().fg(Color::Gray)
                };

                ListItem::new(Line::styled(text, style))
            })
            .collect();

        let list = List::new(items).block(block);
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}

/// Sidebar label: a friendly date when the filename follows the backend's
/// timestamp convention, the suffix-stripped name otherwise.
fn entry_label(entry: &TranscriptEntry) -> String {
    match entry.created_at() {
        Some(ts) => ts.format("%b %d  %H:%M").to_string(),
        None => entry.display_name().to_string(),
    }
}

/// Truncate a string to fit within `max_width` chars, adding "..." if needed.
fn truncate_str(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        ".".repeat(max_width)
    } else {
        let truncated: String = s.chars().take(max_width - 3).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(names: &[&str]) -> Vec<TranscriptEntry> {
        names
            .iter()
            .map(|n| TranscriptEntry {
                filename: n.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_navigation_clamps_to_bounds() {
        let mut state = SidebarState::new();
        let entries = entries(&["a.json", "b.json"]);

        state.handle_event(&TuiEvent::CursorUp, &entries);
        assert_eq!(state.selected, 0, "stays at the top");

        state.handle_event(&TuiEvent::CursorDown, &entries);
        assert_eq!(state.selected, 1);
        state.handle_event(&TuiEvent::CursorDown, &entries);
        assert_eq!(state.selected, 1, "stays at the bottom");
    }

    #[test]
    fn test_enter_opens_selected() {
        let mut state = SidebarState::new();
        let entries = entries(&["a.json", "b.json"]);
        state.handle_event(&TuiEvent::CursorDown, &entries);

        let event = state.handle_event(&TuiEvent::Submit, &entries);
        assert_eq!(event, Some(SidebarEvent::Open("b.json".to_string())));
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut state = SidebarState::new();
        let entries = entries(&["a.json"]);

        let first = state.handle_event(&TuiEvent::InputChar('d'), &entries);
        assert_eq!(first, None, "first press only arms");
        assert!(state.confirm_delete);

        let second = state.handle_event(&TuiEvent::InputChar('d'), &entries);
        assert_eq!(second, Some(SidebarEvent::Delete("a.json".to_string())));
        assert!(!state.confirm_delete);
    }

    #[test]
    fn test_any_other_key_declines_delete() {
        let mut state = SidebarState::new();
        let entries = entries(&["a.json"]);

        state.handle_event(&TuiEvent::InputChar('d'), &entries);
        assert!(state.confirm_delete);

        // Declining is a no-op, not an error: nothing is emitted and the
        // armed state clears.
        let event = state.handle_event(&TuiEvent::CursorDown, &entries);
        assert_eq!(event, None);
        assert!(!state.confirm_delete);
    }

    #[test]
    fn test_delete_on_empty_list_is_ignored() {
        let mut state = SidebarState::new();
        let event = state.handle_event(&TuiEvent::InputChar('d'), &[]);
        assert_eq!(event, None);
        assert!(!state.confirm_delete);
    }

    #[test]
    fn test_new_chat_key() {
        let mut state = SidebarState::new();
        let event = state.handle_event(&TuiEvent::InputChar('n'), &[]);
        assert_eq!(event, Some(SidebarEvent::NewChat));
    }

    #[test]
    fn test_sync_len_clamps_selection() {
        let mut state = SidebarState::new();
        state.selected = 5;
        state.sync_len(2);
        assert_eq!(state.selected, 1);

        state.sync_len(0);
        assert_eq!(state.selected, 0);
        assert_eq!(state.list_state.selected(), None);
    }

    #[test]
    fn test_entry_label_prefers_timestamp() {
        let timestamped = TranscriptEntry {
            filename: "2025-0412-091500.json".to_string(),
        };
        assert_eq!(entry_label(&timestamped), "Apr 12  09:15");

        let plain = TranscriptEntry {
            filename: "notes.json".to_string(),
        };
        assert_eq!(entry_label(&plain), "notes");
    }
}
