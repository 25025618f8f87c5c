//! # Core Application Logic
//!
//! The session controller: all business state and the synchronization
//! protocol between the local conversation and the persisted transcript.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!      ┌──────────────────────────────┐
//!      │            CORE              │
//!      │                              │
//!      │  • state  (the App struct)   │
//!      │  • action (events + reducer) │
//!      │  • config (settings)         │
//!      │                              │
//!      │  No I/O. No UI. Pure.        │
//!      └──────────────┬───────────────┘
//!                     │ Effect values
//!                     ▼
//!           TUI adapter (ratatui)
//! ```
//!
//! - [`state`]: the `App` struct — session state in one place
//! - [`action`]: the `Action` enum and the `update()` reducer
//! - [`config`]: TOML config with defaults → file → env → CLI resolution

pub mod action;
pub mod config;
pub mod state;
