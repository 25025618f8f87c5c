//! # TitleBar Component
//!
//! Single-line status bar above the conversation: app name, active model,
//! and the current notice. Failures take priority over status text and
//! render in red — this is where the error taxonomy's "surface a visible
//! notice" lands.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::Component;

pub struct TitleBar {
    pub model_name: String,
    pub status_message: String,
    pub error: Option<String>,
}

impl TitleBar {
    pub fn new(model_name: String, status_message: String, error: Option<String>) -> Self {
        Self {
            model_name,
            status_message,
            error,
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled("banter", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("  {}", self.model_name),
                Style::default().fg(Color::DarkGray),
            ),
        ];

        if let Some(error) = &self.error {
            spans.push(Span::styled(
                format!("  {error}"),
                Style::default().fg(Color::Red),
            ));
        } else if !self.status_message.is_empty() {
            spans.push(Span::styled(
                format!("  {}", self.status_message),
                Style::default().fg(Color::Gray),
            ));
        }

        frame.render_widget(Line::from(spans), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_to_string(title_bar: &mut TitleBar) -> String {
        let backend = TestBackend::new(80, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| title_bar.render(f, f.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_shows_model_and_status() {
        let mut bar = TitleBar::new(
            "llama-3.3-70b-versatile".to_string(),
            "Saved".to_string(),
            None,
        );
        let text = render_to_string(&mut bar);
        assert!(text.contains("banter"));
        assert!(text.contains("llama-3.3-70b-versatile"));
        assert!(text.contains("Saved"));
    }

    #[test]
    fn test_error_takes_priority_over_status() {
        let mut bar = TitleBar::new(
            "m".to_string(),
            "Saved".to_string(),
            Some("Completion failed: timeout".to_string()),
        );
        let text = render_to_string(&mut bar);
        assert!(text.contains("Completion failed"));
        assert!(!text.contains("Saved"));
    }
}
