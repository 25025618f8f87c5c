use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Padding, Paragraph, Widget, Wrap};

use crate::api::{Message, Role};
use crate::tui::component::Component;
use crate::tui::markdown;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

/// Renders one conversation turn: a bordered card holding the message's
/// markdown render tree. Stateless — created fresh each frame by
/// `MessageList` with the data it needs.
#[derive(Clone, Copy)]
pub struct MessageView<'a> {
    pub message: &'a Message,
    /// Whether this message is selected in browse mode (copy target).
    pub is_selected: bool,
}

impl<'a> MessageView<'a> {
    pub fn new(message: &'a Message, is_selected: bool) -> Self {
        Self {
            message,
            is_selected,
        }
    }

    /// Predict the rendered height for a given width without drawing.
    ///
    /// Markdown is rendered to its line tree and the wrapped line count is
    /// taken from `Paragraph::line_count`, so the prediction matches the
    /// draw exactly. `MessageList` caches the result per message.
    pub fn calculate_height(message: &Message, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            // Terminal too narrow for borders + padding; still occupy a row.
            return 1;
        }

        let text = markdown::render(&message.content, role_color(message.role));
        if text.lines.is_empty() {
            return VERTICAL_OVERHEAD;
        }

        let paragraph = Paragraph::new(text).wrap(Wrap { trim: false });
        (paragraph.line_count(content_width) as u16).max(1) + VERTICAL_OVERHEAD
    }
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::System => "banter",
    }
}

fn role_color(role: Role) -> Color {
    match role {
        Role::User => Color::Green,
        Role::System => Color::Blue,
    }
}

impl Widget for MessageView<'_> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let color = role_color(self.message.role);
        let style = Style::default().fg(color);

        // Selected messages get a bright cyan border (the copy keys act on
        // the selection); everything else stays dim.
        let border_style = if self.is_selected {
            Style::default().fg(Color::Cyan)
        } else {
            style.add_modifier(Modifier::DIM)
        };

        let block = Block::bordered()
            .title(role_label(self.message.role))
            .border_type(ratatui::widgets::BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style)
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner_area = block.inner(area);
        block.render(area, buf);

        let text = markdown::render(&self.message.content, color);
        let paragraph = Paragraph::new(text).wrap(Wrap { trim: false });
        paragraph.render(inner_area, buf);
    }
}

impl Component for MessageView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}
