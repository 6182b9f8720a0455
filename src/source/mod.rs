//! Text sources — where the text to type comes from.
//!
//! The controller captures once per run, at arm time, through a
//! [`TextSource`].  Two sources exist:
//!
//! * [`DraftSource`] — the editable text box.  The window and the controller
//!   share the box contents through a [`SharedDraft`]; the window writes it
//!   every frame, the controller reads it only when arming.
//! * [`ClipboardSource`] — the system clipboard (plain text only).

pub mod clipboard;

pub use clipboard::{read_clipboard_text, ClipboardSource};

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::config::SourceKind;

// ---------------------------------------------------------------------------
// SourceError
// ---------------------------------------------------------------------------

/// Errors raised while capturing text.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// Could not open or read the system clipboard.
    #[error("cannot access clipboard: {0}")]
    ClipboardAccess(String),

    /// The text box contents could not be read.
    #[error("text box contents unavailable")]
    DraftUnavailable,
}

// ---------------------------------------------------------------------------
// TextSource
// ---------------------------------------------------------------------------

/// Supplies the raw text for a run.  Empty text is not an error here; the
/// controller decides what counts as "nothing to type".
pub trait TextSource: Send {
    fn capture(&mut self) -> Result<String, SourceError>;
}

/// Text box contents shared between the window and the controller.
pub type SharedDraft = Arc<Mutex<String>>;

/// Construct an empty [`SharedDraft`].
pub fn new_shared_draft() -> SharedDraft {
    Arc::new(Mutex::new(String::new()))
}

/// [`TextSource`] reading the text box.
#[derive(Debug, Clone)]
pub struct DraftSource {
    draft: SharedDraft,
}

impl DraftSource {
    pub fn new(draft: SharedDraft) -> Self {
        Self { draft }
    }
}

impl TextSource for DraftSource {
    fn capture(&mut self) -> Result<String, SourceError> {
        self.draft
            .lock()
            .map(|text| text.clone())
            .map_err(|_| SourceError::DraftUnavailable)
    }
}

/// Build the source selected in the configuration.
pub fn from_config(kind: SourceKind, draft: SharedDraft) -> Box<dyn TextSource> {
    match kind {
        SourceKind::TextBox => Box::new(DraftSource::new(draft)),
        SourceKind::Clipboard => Box::new(ClipboardSource),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_source_sees_latest_edit() {
        let draft = new_shared_draft();
        let mut source = DraftSource::new(Arc::clone(&draft));

        assert_eq!(source.capture().unwrap(), "");

        draft.lock().unwrap().push_str("\tfn main() {}");
        assert_eq!(source.capture().unwrap(), "\tfn main() {}");
    }

    #[test]
    fn poisoned_draft_is_reported() {
        let draft = new_shared_draft();
        let poisoner = Arc::clone(&draft);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the draft");
        })
        .join();

        let mut source = DraftSource::new(draft);
        assert!(matches!(
            source.capture(),
            Err(SourceError::DraftUnavailable)
        ));
    }
}
