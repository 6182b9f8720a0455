//! Run state: phase, countdown, staged text and the cancel flag.
//!
//! [`RunPhase`] is owned by the controller and mirrored to the window.
//! [`CancelFlag`] is the only state shared across threads.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use thiserror::Error;

/// Ticks in a countdown.  One tick per [`TICK_INTERVAL`].
pub const COUNTDOWN_TICKS: u32 = 3;

/// Interval between countdown ticks.
pub const TICK_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);

// ---------------------------------------------------------------------------
// RunPhase
// ---------------------------------------------------------------------------

/// Phase of the single process-wide run.
///
/// ```text
/// Idle ──arm──▶ CountingDown ──ticks elapse──▶ Emitting ──done──▶ Idle
///                    │                            │
///                    └──stop──▶ Idle              └──stop──▶ Aborting ──worker exits──▶ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    /// No run in flight; the trigger is enabled.
    #[default]
    Idle,

    /// Armed; waiting for the countdown to reach zero.
    CountingDown,

    /// The worker is emitting keystrokes.
    Emitting,

    /// Stop was requested during emission; waiting for the worker to notice
    /// at the next line boundary.
    Aborting,
}

impl RunPhase {
    /// `true` for every phase except `Idle`.
    ///
    /// ```
    /// use countdown_typer::engine::RunPhase;
    ///
    /// assert!(!RunPhase::Idle.is_busy());
    /// assert!(RunPhase::CountingDown.is_busy());
    /// assert!(RunPhase::Emitting.is_busy());
    /// assert!(RunPhase::Aborting.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        !matches!(self, RunPhase::Idle)
    }

    /// A short human-readable label suitable for display in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            RunPhase::Idle => "Idle",
            RunPhase::CountingDown => "Counting down",
            RunPhase::Emitting => "Typing",
            RunPhase::Aborting => "Stopping",
        }
    }
}

// ---------------------------------------------------------------------------
// CountdownState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountdownState {
    pub remaining_ticks: u32,
    pub running: bool,
}

impl CountdownState {
    pub fn armed() -> Self {
        Self {
            remaining_ticks: COUNTDOWN_TICKS,
            running: true,
        }
    }

    /// Decrement and return the ticks still to go.
    pub fn advance(&mut self) -> u32 {
        self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
        if self.remaining_ticks == 0 {
            self.running = false;
        }
        self.remaining_ticks
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// StagedText
// ---------------------------------------------------------------------------

/// Reasons an arm request is refused.  Refusals never change state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArmError {
    #[error("Nothing to type: enter some text first.")]
    EmptyText,

    #[error("Already running ({}).", .0.label())]
    Busy(RunPhase),

    #[error("Could not read the text: {0}")]
    Source(String),
}

/// Text captured for one run.  Never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedText(Arc<str>);

impl StagedText {
    /// Accept `text` unless it is empty or whitespace only.
    pub fn new(text: impl Into<String>) -> Result<Self, ArmError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ArmError::EmptyText);
        }
        Ok(Self(text.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lines with `\r\n` and bare `\r` normalised to `\n`.
    ///
    /// A trailing newline yields a trailing empty line, so the final line
    /// break is still typed.
    pub fn lines(&self) -> Vec<String> {
        self.0
            .replace("\r\n", "\n")
            .replace('\r', "\n")
            .split('\n')
            .map(str::to_owned)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// CancelFlag
// ---------------------------------------------------------------------------

/// Cooperative cancellation signal shared by the controller and the worker.
///
/// Cheap to clone (`Arc` clone).  Setting it is idempotent.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_idle_is_not_busy() {
        assert!(!RunPhase::Idle.is_busy());
        assert!(RunPhase::CountingDown.is_busy());
        assert!(RunPhase::Emitting.is_busy());
        assert!(RunPhase::Aborting.is_busy());
        assert_eq!(RunPhase::default(), RunPhase::Idle);
    }

    #[test]
    fn labels() {
        assert_eq!(RunPhase::Idle.label(), "Idle");
        assert_eq!(RunPhase::Emitting.label(), "Typing");
    }

    #[test]
    fn blank_text_is_rejected() {
        for blank in ["", " ", "\t\t", "\n\r\n", " \t \n "] {
            assert_eq!(StagedText::new(blank), Err(ArmError::EmptyText), "{blank:?}");
        }
    }

    #[test]
    fn staged_text_keeps_content_verbatim() {
        let staged = StagedText::new("\tif x:\n\t\treturn").unwrap();
        assert_eq!(staged.as_str(), "\tif x:\n\t\treturn");
    }

    #[test]
    fn lines_normalise_line_endings() {
        let staged = StagedText::new("a\r\nb\rc\nd").unwrap();
        assert_eq!(staged.lines(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn lines_keep_blank_and_trailing_lines() {
        let staged = StagedText::new("A\n\nB\n").unwrap();
        assert_eq!(staged.lines(), vec!["A", "", "B", ""]);
    }

    #[test]
    fn countdown_runs_down_to_zero() {
        let mut countdown = CountdownState::armed();
        assert_eq!(countdown.remaining_ticks, COUNTDOWN_TICKS);
        assert!(countdown.running);

        assert_eq!(countdown.advance(), 2);
        assert_eq!(countdown.advance(), 1);
        assert_eq!(countdown.advance(), 0);
        assert!(!countdown.running);
        assert_eq!(countdown.advance(), 0);

        countdown.reset();
        assert_eq!(countdown, CountdownState::default());
    }

    #[test]
    fn cancel_flag_is_shared_and_idempotent() {
        let flag = CancelFlag::new();
        let seen_by_worker = flag.clone();

        flag.request();
        flag.request();
        assert!(seen_by_worker.is_requested());

        flag.reset();
        assert!(!seen_by_worker.is_requested());
    }

    #[test]
    fn busy_error_names_the_phase() {
        let msg = ArmError::Busy(RunPhase::CountingDown).to_string();
        assert!(msg.contains("Counting down"), "{msg}");
    }
}
