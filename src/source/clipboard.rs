//! System clipboard as a text source.
//!
//! Each read opens its own [`arboard::Clipboard`]; no handle is kept in
//! [`ClipboardSource`], so the source stays `Send` on every platform.

use arboard::Clipboard;

use super::{SourceError, TextSource};

/// Reads the clipboard when a run is armed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClipboardSource;

impl TextSource for ClipboardSource {
    fn capture(&mut self) -> Result<String, SourceError> {
        // Nothing on the clipboard stages as "", which arming then rejects.
        Ok(read_clipboard_text()?.unwrap_or_default())
    }
}

/// Plain-text clipboard contents, or `None` if it holds no text.
///
/// Also backs the window's "Paste clipboard" button.
pub fn read_clipboard_text() -> Result<Option<String>, SourceError> {
    let mut clipboard =
        Clipboard::new().map_err(|e| SourceError::ClipboardAccess(e.to_string()))?;
    Ok(clipboard.get_text().ok())
}
