//! # MessageList Component
//!
//! Scrollable view of the conversation.
//!
//! `MessageList` is a transient component (created each frame) wrapping
//! `&mut MessageListState` (persistent scroll/selection state) and the
//! message slice (props). Heights are cached per message: messages are
//! immutable once appended and replies arrive whole, so a cached height only
//! invalidates when the width changes or the conversation is replaced.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::api::Message;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::MessageView;
use crate::tui::event::TuiEvent;

/// Scroll, selection, and layout state. Must be persisted in `TuiState`.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content.
    pub stick_to_bottom: bool,
    /// Selected message index in browse mode (copy target).
    pub selected_index: Option<usize>,
    /// Last known viewport height (for scroll clamping between frames).
    pub viewport_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true,
            selected_index: None,
            viewport_height: 0,
        }
    }

    /// Move the selection up, defaulting to the last message.
    pub fn select_prev(&mut self, message_count: usize) {
        if message_count == 0 {
            return;
        }
        let idx = self
            .selected_index
            .map(|i| i.saturating_sub(1))
            .unwrap_or(message_count - 1);
        self.selected_index = Some(idx);
        self.scroll_to_selected();
    }

    /// Move the selection down; stops at the last message.
    pub fn select_next(&mut self, message_count: usize) {
        if message_count == 0 {
            return;
        }
        if let Some(idx) = self.selected_index
            && idx + 1 < message_count
        {
            self.selected_index = Some(idx + 1);
            self.scroll_to_selected();
        }
    }

    /// Select the last message (entry point for browse mode).
    pub fn select_last(&mut self, message_count: usize) {
        self.selected_index = message_count.checked_sub(1);
        self.scroll_to_selected();
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let total: u16 = self.layout.heights.iter().sum();
        let max_y = total.saturating_sub(self.viewport_height);
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Scroll the viewport so the selected message is fully visible.
    pub fn scroll_to_selected(&mut self) {
        let Some(idx) = self.selected_index else {
            return;
        };
        if idx >= self.layout.prefix_heights.len() {
            return;
        }

        let item_top = if idx == 0 {
            0
        } else {
            self.layout.prefix_heights[idx - 1]
        };
        let item_bottom = self.layout.prefix_heights[idx];
        let offset_y = self.scroll_state.offset().y;

        if item_top < offset_y {
            self.scroll_state.set_offset(Position { x: 0, y: item_top });
            self.stick_to_bottom = false;
        } else if item_bottom > offset_y + self.viewport_height {
            let new_y = item_bottom.saturating_sub(self.viewport_height);
            self.scroll_state.set_offset(Position { x: 0, y: new_y });
            let total: u16 = self.layout.heights.iter().sum();
            self.stick_to_bottom = new_y >= total.saturating_sub(self.viewport_height);
        }
    }

    /// Re-engage auto-scroll when a scroll-down lands at the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let total: u16 = self.layout.heights.iter().sum();
        let max_y = total.saturating_sub(self.viewport_height);
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }
}

impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Scrollable conversation view, created fresh each frame.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub messages: &'a [Message],
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a mut MessageListState, messages: &'a [Message]) -> Self {
        Self { state, messages }
    }
}

impl Component for MessageList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // scrollbar column

        // 1. Refresh the layout cache: drop what's stale, measure the rest.
        let reusable = self
            .state
            .layout
            .reusable_count(self.messages.len(), content_width);
        self.state.layout.heights.truncate(reusable);
        for message in self.messages.iter().skip(reusable) {
            self.state
                .layout
                .heights
                .push(MessageView::calculate_height(message, content_width));
        }
        self.state.layout.rebuild_prefix_heights();
        self.state
            .layout
            .update_metadata(self.messages.len(), content_width);

        let total_height: u16 = self.state.layout.heights.iter().sum();

        // 2. Clamp scroll unless auto-scroll will target the bottom anyway.
        self.state.viewport_height = area.height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible = self
            .state
            .layout
            .visible_range(scroll_offset, area.height);

        // 3. Render the visible messages into a ScrollView.
        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset: u16 = if visible.start > 0 {
            self.state.layout.prefix_heights[visible.start - 1]
        } else {
            0
        };

        for i in visible {
            let height = self.state.layout.heights[i];
            let rect = Rect::new(0, y_offset, content_width, height);
            let is_selected = self.state.selected_index == Some(i);
            scroll_view.render_widget(MessageView::new(&self.messages[i], is_selected), rect);
            y_offset += height;
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// Cached per-message heights at a given width.
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    message_count: usize,
    content_width: u16,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            message_count: 0,
            content_width: 0,
        }
    }

    /// How many cached heights are still valid. Messages are immutable and
    /// append-only, so the cache survives appends; it invalidates entirely
    /// on a width change or when the conversation shrank (wholesale
    /// replacement by new-chat/load).
    pub fn reusable_count(&self, message_count: usize, content_width: u16) -> usize {
        if self.content_width != content_width || message_count < self.message_count {
            return 0;
        }
        self.heights.len().min(message_count)
    }

    pub fn update_metadata(&mut self, message_count: usize, content_width: u16) {
        self.message_count = message_count;
        self.content_width = content_width;
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc += h;
                Some(*acc)
            })
            .collect();
    }

    /// The message indices overlapping the viewport, with half a viewport of
    /// buffer on each side.
    pub fn visible_range(
        &self,
        scroll_offset: u16,
        viewport_height: u16,
    ) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}
