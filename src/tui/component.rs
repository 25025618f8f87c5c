use ratatui::Frame;
use ratatui::layout::Rect;

/// A reusable UI component.
///
/// Components follow the props pattern: they receive data via struct fields
/// (either owned props or borrowed state) and render into a `Frame` within a
/// given `Rect`. The `render` method takes `&mut self` so components can
/// update internal caches and presentation state (scroll offsets, layout
/// measurements) during the render pass, aligning with Ratatui's
/// `StatefulWidget` pattern.
pub trait Component {
    /// Render the component into the given area.
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that handles terminal events.
pub trait EventHandler {
    /// The type of high-level event this component emits.
    type Event;

    /// Handle a low-level `TuiEvent` and optionally return a high-level event.
    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}
