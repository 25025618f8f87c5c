//! Frame layout: transcript sidebar on the left, conversation pane (title
//! bar, message list, composer) on the right, with the model picker as an
//! optional overlay on top.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::{MessageList, ModelPicker, Sidebar, TitleBar};
use crate::tui::{Focus, TuiState};

/// Width of the transcript sidebar, including its borders.
const SIDEBAR_WIDTH: u16 = 24;

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min};

    let [sidebar_area, main_area] =
        Layout::horizontal([Length(SIDEBAR_WIDTH), Min(0)]).areas(frame.area());

    Sidebar::new(
        &mut tui.sidebar,
        &app.transcripts,
        app.transcript_id.as_deref(),
        tui.focus == Focus::Sidebar,
    )
    .render(frame, sidebar_area);

    let input_height = tui.input_box.calculate_height(main_area.width);
    let [title_area, messages_area, input_area] =
        Layout::vertical([Length(1), Min(0), Length(input_height)]).areas(main_area);

    TitleBar::new(
        app.model_name.clone(),
        app.status_message.clone(),
        app.error.clone(),
    )
    .render(frame, title_area);

    MessageList::new(&mut tui.message_list, &app.messages).render(frame, messages_area);

    tui.input_box.waiting = app.is_sending;
    tui.input_box.render(frame, input_area);

    // Overlay on top of everything when open
    if let Some(picker) = tui.model_picker.as_mut() {
        ModelPicker::new(picker, &app.model_name).render(frame, frame.area());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_app;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_draw_ui_smoke() {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut app = test_app();
        app.messages.push(crate::api::Message::user("hello"));
        app.messages
            .push(crate::api::Message::system("hi\n\n```python\nx = 1\n```"));
        let mut tui = TuiState::new();

        terminal.draw(|f| draw_ui(f, &app, &mut tui)).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("banter"));
        assert!(text.contains("hello"));
    }

    #[test]
    fn test_draw_ui_with_picker_overlay() {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut app = test_app();
        app.models = vec![crate::core::config::ModelEntry {
            name: "llama-3.3-70b-versatile".to_string(),
            description: Some("Balanced default".to_string()),
        }];
        let mut tui = TuiState::new();
        tui.model_picker = Some(crate::tui::components::ModelPickerState::new(
            app.models.clone(),
        ));

        terminal.draw(|f| draw_ui(f, &app, &mut tui)).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Models"));
    }
}
