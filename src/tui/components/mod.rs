//! # TUI Components
//!
//! Components follow two patterns:
//!
//! - **Stateless (props-based)**: created fresh each frame with the data
//!   they render — `TitleBar`, `MessageView`.
//! - **Stateful (event-driven)**: persistent state in `TuiState`, wrapped by
//!   a transient renderer each frame — `MessageList`, `InputBox`, `Sidebar`,
//!   `ModelPicker`.
//!
//! Each component file co-locates its state, events, rendering, and tests.
//! Components receive external data as props rather than reading global
//! state, so dependencies stay explicit and testable.

pub mod input_box;
pub mod message;
pub mod message_list;
pub mod model_picker;
pub mod sidebar;
pub mod title_bar;

pub use input_box::{ComposerEvent, InputBox};
pub use message_list::{MessageList, MessageListState};
pub use model_picker::{ModelPicker, ModelPickerEvent, ModelPickerState};
pub use sidebar::{Sidebar, SidebarEvent, SidebarState};
pub use title_bar::TitleBar;
