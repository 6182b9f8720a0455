//! The controller's view of the window and hotkey shell.
//!
//! The controller calls [`Shell`] methods; it never reads widget state.
//! [`ChannelShell`] turns each call into a [`ShellEvent`] on an unbounded
//! channel, so events reach the window in the order they were produced.

use std::fmt;

use tokio::sync::mpsc;

use super::state::{ArmError, RunPhase, COUNTDOWN_TICKS};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Status line content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ready,
    CountingDown { seconds_left: u32 },
    Typing,
    Stopping,
    Completed,
    Failed,
    Aborted,
    Rejected(ArmError),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ready => write!(
                f,
                "Enter text below, start, then put the cursor in the target field within {COUNTDOWN_TICKS} s."
            ),
            Status::CountingDown { seconds_left } => write!(
                f,
                "Typing starts in {seconds_left} s. Put the cursor in the target field…"
            ),
            Status::Typing => write!(f, "Typing…"),
            Status::Stopping => write!(f, "Stopping after the current line…"),
            Status::Completed => write!(f, "Typing finished."),
            Status::Failed => write!(f, "Typing failed."),
            Status::Aborted => write!(f, "Aborted."),
            Status::Rejected(reason) => write!(f, "{reason}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Shell
// ---------------------------------------------------------------------------

/// Operations the controller performs on the host window.
///
/// Implementations must be cheap and non-blocking: they run on the control
/// thread.  Window operations are best-effort.
pub trait Shell: Send {
    fn report_status(&mut self, status: Status);
    fn set_trigger_enabled(&mut self, enabled: bool);
    fn minimize_window(&mut self);
    fn restore_window(&mut self);
    /// Blocking notification for a failed run.
    fn notify_failure(&mut self, reason: &str);
    fn phase_changed(&mut self, phase: RunPhase);
}

// ---------------------------------------------------------------------------
// ShellEvent / ChannelShell
// ---------------------------------------------------------------------------

/// One [`Shell`] call, as delivered to the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    Status(Status),
    TriggerEnabled(bool),
    Minimize,
    Restore,
    Failure(String),
    Phase(RunPhase),
}

/// [`Shell`] that forwards every call over an unbounded channel.
///
/// A closed channel (window gone) is ignored.
#[derive(Debug, Clone)]
pub struct ChannelShell {
    tx: mpsc::UnboundedSender<ShellEvent>,
}

impl ChannelShell {
    pub fn new(tx: mpsc::UnboundedSender<ShellEvent>) -> Self {
        Self { tx }
    }

    /// Convenience constructor returning the receiving end too.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ShellEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn send(&self, event: ShellEvent) {
        let _ = self.tx.send(event);
    }
}

impl Shell for ChannelShell {
    fn report_status(&mut self, status: Status) {
        self.send(ShellEvent::Status(status));
    }

    fn set_trigger_enabled(&mut self, enabled: bool) {
        self.send(ShellEvent::TriggerEnabled(enabled));
    }

    fn minimize_window(&mut self) {
        self.send(ShellEvent::Minimize);
    }

    fn restore_window(&mut self) {
        self.send(ShellEvent::Restore);
    }

    fn notify_failure(&mut self, reason: &str) {
        self.send(ShellEvent::Failure(reason.to_owned()));
    }

    fn phase_changed(&mut self, phase: RunPhase) {
        self.send(ShellEvent::Phase(phase));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_shell_preserves_order() {
        let (mut shell, mut rx) = ChannelShell::channel();

        shell.set_trigger_enabled(false);
        shell.minimize_window();
        shell.report_status(Status::CountingDown { seconds_left: 3 });

        assert_eq!(rx.try_recv().unwrap(), ShellEvent::TriggerEnabled(false));
        assert_eq!(rx.try_recv().unwrap(), ShellEvent::Minimize);
        assert_eq!(
            rx.try_recv().unwrap(),
            ShellEvent::Status(Status::CountingDown { seconds_left: 3 })
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_channel_is_ignored() {
        let (mut shell, rx) = ChannelShell::channel();
        drop(rx);
        shell.restore_window();
        shell.notify_failure("gone");
    }

    #[test]
    fn status_text() {
        assert_eq!(
            Status::CountingDown { seconds_left: 2 }.to_string(),
            "Typing starts in 2 s. Put the cursor in the target field…"
        );
        assert_eq!(Status::Aborted.to_string(), "Aborted.");
        assert_eq!(
            Status::Rejected(ArmError::EmptyText).to_string(),
            ArmError::EmptyText.to_string()
        );
    }
}
