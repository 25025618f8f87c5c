pub mod client;
pub mod types;

pub use client::{ApiError, ChatBackend, HttpBackend};
pub use types::{Message, Role, TranscriptEntry};
