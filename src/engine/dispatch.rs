//! Intent routing.
//!
//! The Start button, the Abort button and the global hotkey all end up here,
//! so the three entry points cannot drift apart.

use super::state::RunPhase;

/// Requests sent to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Start button.
    Start,
    /// Abort button.
    Stop,
    /// Global hotkey: start when idle, stop when busy.
    Toggle,
}

/// What the controller does with a [`ControlCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Arm,
    Abort,
    /// Start while busy: refused with a status message.
    Reject,
    /// Stop while idle.
    Ignore,
}

/// Route `command` according to the current `phase`.
///
/// ```
/// use countdown_typer::engine::{route, ControlCommand, Route, RunPhase};
///
/// assert_eq!(route(RunPhase::Idle, ControlCommand::Toggle), Route::Arm);
/// assert_eq!(route(RunPhase::Emitting, ControlCommand::Toggle), Route::Abort);
/// ```
pub fn route(phase: RunPhase, command: ControlCommand) -> Route {
    match (command, phase.is_busy()) {
        (ControlCommand::Start | ControlCommand::Toggle, false) => Route::Arm,
        (ControlCommand::Stop | ControlCommand::Toggle, true) => Route::Abort,
        (ControlCommand::Start, true) => Route::Reject,
        (ControlCommand::Stop, false) => Route::Ignore,
    }
}
