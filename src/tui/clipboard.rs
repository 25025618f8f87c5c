//! Clipboard side channel.
//!
//! Copies are fire-and-forget: a failure produces a user-facing notice and
//! nothing else. Session state and the render pipeline never depend on the
//! clipboard being available (headless terminals, SSH sessions).

use log::debug;

/// Place `text` on the system clipboard. Returns a displayable notice on
/// failure instead of an error type — the only consumer is the status line.
pub fn copy(text: &str) -> Result<(), String> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| format!("clipboard unavailable: {e}"))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| format!("clipboard write failed: {e}"))?;
    debug!("Copied {} bytes to clipboard", text.len());
    Ok(())
}
