//! # Composer Component
//!
//! The message input box: captures text, handles editing, and emits
//! `Submit` on Enter. The buffer is internal state; whether a send is in
//! flight is a prop (it changes the title and nothing else — the submit
//! guard itself lives with the session controller).

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Borders (2) + padding (2) consumed horizontally by the bordered block.
const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders.
const VERTICAL_OVERHEAD: u16 = 2;
/// Content lines shown before internal scrolling kicks in.
const MAX_VISIBLE_LINES: u16 = 5;
/// Offset from area edge to content (border width).
const BORDER_OFFSET: u16 = 1;

/// High-level events emitted by the composer.
#[derive(Debug, Clone, PartialEq)]
pub enum ComposerEvent {
    /// User submitted the text (Enter with non-blank content).
    Submit(String),
    /// Text content changed.
    Changed,
}

pub struct InputBox {
    /// Text buffer (internal state).
    pub buffer: String,
    /// Whether a send is in flight (prop; affects the title only).
    pub waiting: bool,
    /// Cursor position as byte offset into `buffer`.
    cursor: usize,
    /// Line offset for internal scrolling when content exceeds the viewport.
    scroll_offset: u16,
    /// Cached inner width from the last render, for wrap math.
    last_width: u16,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            waiting: false,
            cursor: 0,
            scroll_offset: 0,
            last_width: 80,
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.scroll_offset = 0;
    }

    /// Height for the current buffer, clamped to the visible-line limit.
    pub fn calculate_height(&self, width: u16) -> u16 {
        let inner = inner_width(width);
        wrapped_line_count(&self.buffer, inner).min(MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    /// (line, column) of the cursor in wrapped display coordinates. The
    /// column is a display width, so wide characters position correctly.
    fn cursor_position(&self, inner: u16) -> (u16, u16) {
        if inner == 0 {
            return (0, 0);
        }

        let before = &self.buffer[..self.cursor];
        let lines = textwrap::wrap(before, wrap_options(inner));
        let mut line = lines.len().saturating_sub(1) as u16;

        // A cursor sitting right after a newline is on a fresh line textwrap
        // may not represent.
        if before.ends_with('\n') && !lines.last().is_some_and(|l| l.is_empty()) {
            line += 1;
            return (line, 0);
        }

        let col = lines
            .last()
            .map(|l| UnicodeWidthStr::width(l.as_ref()) as u16)
            .unwrap_or(0);
        (line, col)
    }

    /// Keep the cursor's line inside the visible window.
    fn update_scroll(&mut self, inner: u16) {
        let total = wrapped_line_count(&self.buffer, inner);
        if total <= MAX_VISIBLE_LINES {
            self.scroll_offset = 0;
            return;
        }
        let (line, _) = self.cursor_position(inner);
        if line < self.scroll_offset {
            self.scroll_offset = line;
        } else if line >= self.scroll_offset + MAX_VISIBLE_LINES {
            self.scroll_offset = line.saturating_sub(MAX_VISIBLE_LINES - 1);
        }
    }

    fn visible_text(&self, inner: u16) -> String {
        if self.scroll_offset == 0 || inner == 0 {
            return self.buffer.clone();
        }
        let lines = textwrap::wrap(&self.buffer, wrap_options(inner));
        let start = self.scroll_offset as usize;
        let end = (start + MAX_VISIBLE_LINES as usize).min(lines.len());
        lines[start..end].join("\n")
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner = inner_width(area.width);
        self.last_width = area.width;
        self.update_scroll(inner);

        let title = if self.waiting {
            "Message (waiting for reply...)"
        } else {
            "Message"
        };
        let style = if self.waiting {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Green)
        };

        let block = Block::bordered()
            .border_type(ratatui::widgets::BorderType::Rounded)
            .title(title);

        let paragraph = Paragraph::new(self.visible_text(inner))
            .block(block)
            .style(style);
        frame.render_widget(paragraph, area);

        let (line, col) = self.cursor_position(inner);
        let visible_line = line.saturating_sub(self.scroll_offset);
        frame.set_cursor_position((
            area.x + BORDER_OFFSET + col,
            area.y + BORDER_OFFSET + visible_line,
        ));
    }
}

impl EventHandler for InputBox {
    type Event = ComposerEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<ComposerEvent> {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(ComposerEvent::Changed)
            }
            TuiEvent::Paste(text) => {
                self.buffer.insert_str(self.cursor, text);
                self.cursor += text.len();
                Some(ComposerEvent::Changed)
            }
            TuiEvent::Backspace => {
                if self.cursor > 0 {
                    let prev = prev_char_boundary(&self.buffer, self.cursor);
                    self.buffer.drain(prev..self.cursor);
                    self.cursor = prev;
                    Some(ComposerEvent::Changed)
                } else {
                    None
                }
            }
            TuiEvent::Delete => {
                if self.cursor < self.buffer.len() {
                    let next = next_char_boundary(&self.buffer, self.cursor);
                    self.buffer.drain(self.cursor..next);
                    Some(ComposerEvent::Changed)
                } else {
                    None
                }
            }
            TuiEvent::CursorLeft => {
                if self.cursor > 0 {
                    self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                    Some(ComposerEvent::Changed)
                } else {
                    None
                }
            }
            TuiEvent::CursorRight => {
                if self.cursor < self.buffer.len() {
                    self.cursor = next_char_boundary(&self.buffer, self.cursor);
                    Some(ComposerEvent::Changed)
                } else {
                    None
                }
            }
            TuiEvent::CursorHome => {
                let line_start = self.buffer[..self.cursor]
                    .rfind('\n')
                    .map(|i| i + 1)
                    .unwrap_or(0);
                (self.cursor != line_start).then(|| {
                    self.cursor = line_start;
                    ComposerEvent::Changed
                })
            }
            TuiEvent::CursorEnd => {
                let line_end = self.buffer[self.cursor..]
                    .find('\n')
                    .map(|i| self.cursor + i)
                    .unwrap_or(self.buffer.len());
                (self.cursor != line_end).then(|| {
                    self.cursor = line_end;
                    ComposerEvent::Changed
                })
            }
            TuiEvent::Submit => {
                if self.buffer.trim().is_empty() {
                    return None;
                }
                let text = std::mem::take(&mut self.buffer);
                self.cursor = 0;
                self.scroll_offset = 0;
                Some(ComposerEvent::Submit(text))
            }
            _ => None,
        }
    }
}

// ── Wrap helpers ────────────────────────────────────────────────────────────

fn wrap_options(inner_width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(inner_width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

fn inner_width(width: u16) -> u16 {
    width.saturating_sub(HORIZONTAL_OVERHEAD)
}

fn wrapped_line_count(text: &str, width: u16) -> u16 {
    if width == 0 || text.is_empty() {
        return 1;
    }
    let lines = textwrap::wrap(text, wrap_options(width));
    let mut count = (lines.len() as u16).max(1);
    // textwrap doesn't always produce an empty trailing line for a trailing newline
    if text.ends_with('\n') && !lines.last().is_some_and(|l| l.is_empty()) {
        count += 1;
    }
    count
}

fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_typing_and_backspace() {
        let mut input = InputBox::new();

        assert_eq!(
            input.handle_event(&TuiEvent::InputChar('a')),
            Some(ComposerEvent::Changed)
        );
        assert_eq!(
            input.handle_event(&TuiEvent::InputChar('b')),
            Some(ComposerEvent::Changed)
        );
        assert_eq!(input.buffer, "ab");

        input.handle_event(&TuiEvent::Backspace);
        assert_eq!(input.buffer, "a");
    }

    #[test]
    fn test_submit_takes_buffer() {
        let mut input = InputBox::new();
        input.buffer = "hello".to_string();
        input.cursor = 5;

        match input.handle_event(&TuiEvent::Submit) {
            Some(ComposerEvent::Submit(text)) => assert_eq!(text, "hello"),
            other => panic!("expected Submit, got {:?}", other),
        }
        assert!(input.buffer.is_empty(), "buffer cleared after submit");
    }

    #[test]
    fn test_blank_submit_emits_nothing() {
        let mut input = InputBox::new();
        input.buffer = "   \n ".to_string();
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
        assert_eq!(input.buffer, "   \n ", "buffer untouched by the guard");
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = InputBox::new();
        for c in "héllo".chars() {
            input.handle_event(&TuiEvent::InputChar(c));
        }
        assert_eq!(input.buffer, "héllo");

        input.handle_event(&TuiEvent::Backspace);
        input.handle_event(&TuiEvent::Backspace);
        input.handle_event(&TuiEvent::Backspace);
        assert_eq!(input.buffer, "hé");
    }

    #[test]
    fn test_home_end_on_logical_line() {
        let mut input = InputBox::new();
        input.buffer = "line one\nline two".to_string();
        input.cursor = input.buffer.len();

        input.handle_event(&TuiEvent::CursorHome);
        assert_eq!(input.cursor, 9, "start of second line");
        input.handle_event(&TuiEvent::CursorEnd);
        assert_eq!(input.cursor, input.buffer.len());
    }

    #[test]
    fn test_paste_preserves_newlines() {
        let mut input = InputBox::new();
        input.handle_event(&TuiEvent::Paste("a\nb".to_string()));
        assert_eq!(input.buffer, "a\nb");
        assert_eq!(input.cursor, 3);
    }

    #[test]
    fn test_height_clamped_to_visible_lines() {
        let mut input = InputBox::new();
        assert_eq!(input.calculate_height(80), 1 + VERTICAL_OVERHEAD);

        input.buffer = "x\n".repeat(10);
        assert_eq!(
            input.calculate_height(80),
            MAX_VISIBLE_LINES + VERTICAL_OVERHEAD
        );
    }

    #[test]
    fn test_render_shows_waiting_title() {
        let backend = TestBackend::new(40, 3);
        let mut terminal = Terminal::new(backend).unwrap();

        let mut input = InputBox::new();
        input.waiting = true;

        terminal.draw(|f| input.render(f, f.area())).unwrap();

        let buffer = terminal.backend().buffer();
        let text = buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>();
        assert!(text.contains("waiting for reply"));
    }
}
