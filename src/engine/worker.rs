//! Emission worker — types the staged text into the focused window.
//!
//! Indentation is not typed as tab characters.  Editors that auto-indent
//! would add their own indentation on top, so the worker tracks the depth
//! already present in the target and moves it with Tab / Shift+Tab until it
//! matches the line's leading tab count.
//!
//! Cancellation is checked before each line; a line that has started is
//! always finished.

use std::sync::Arc;
use std::time::Duration;

use crate::emit::{EmitError, EmitterFactory, InputEmitter, LayoutGuard, LayoutSwitcher, NamedKey};

use super::state::{CancelFlag, StagedText};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Interrupted,
    Failed(String),
}

/// Runs one emission per call.  Shared by the controller across runs.
pub struct EmissionWorker {
    emitters: Arc<dyn EmitterFactory>,
    layout: Arc<dyn LayoutSwitcher>,
    settle: Duration,
}

impl EmissionWorker {
    /// * `emitters` — opens the keystroke backend on the worker thread.
    /// * `layout`   — layout capability selected for this platform.
    /// * `settle`   — wait after a layout switch before typing.
    pub fn new(
        emitters: Arc<dyn EmitterFactory>,
        layout: Arc<dyn LayoutSwitcher>,
        settle: Duration,
    ) -> Self {
        Self {
            emitters,
            layout,
            settle,
        }
    }

    /// Type `text`, stopping at the first line boundary after `cancel` is
    /// raised.  Blocks the calling thread.
    ///
    /// Emission errors win over cancellation: a failing run reports
    /// `Failed` even if stop was requested.  The layout is restored on every
    /// path.
    pub fn run(&self, text: &StagedText, cancel: &CancelFlag) -> Outcome {
        let lines = text.lines();
        let _layout = LayoutGuard::engage(self.layout.as_ref(), self.settle);

        let result = self
            .emitters
            .open()
            .and_then(|mut emitter| emit_lines(emitter.as_mut(), &lines, cancel));

        match result {
            Ok(true) => Outcome::Completed,
            Ok(false) => Outcome::Interrupted,
            Err(e) => {
                log::error!("worker: {e}");
                Outcome::Failed(e.to_string())
            }
        }
    }
}

/// Emit every line.  Returns `Ok(false)` when stopped by `cancel`.
fn emit_lines(
    emitter: &mut dyn InputEmitter,
    lines: &[String],
    cancel: &CancelFlag,
) -> Result<bool, EmitError> {
    let mut indent = 0usize;

    for (index, line) in lines.iter().enumerate() {
        if cancel.is_requested() {
            log::info!("worker: stopped before line {} of {}", index + 1, lines.len());
            return Ok(false);
        }

        let (depth, content) = split_indent(line);
        if depth > indent {
            for _ in indent..depth {
                emitter.press_key(NamedKey::Tab)?;
            }
        } else {
            for _ in depth..indent {
                emitter.press_combo(&[NamedKey::Shift, NamedKey::Tab])?;
            }
        }
        indent = depth;

        if !content.is_empty() {
            emitter.type_literal(content)?;
        }

        if index + 1 < lines.len() {
            emitter.press_key(NamedKey::Enter)?;
        }
    }

    Ok(true)
}

/// Leading tab count and the rest of the line.
fn split_indent(line: &str) -> (usize, &str) {
    let depth = line.bytes().take_while(|&b| b == b'\t').count();
    (depth, &line[depth..])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
