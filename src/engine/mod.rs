//! The cancellable countdown-and-typing engine.
//!
//! # Architecture
//!
//! ```text
//! Start button ─┐
//! Abort button ─┼─▶ ControlCommand (mpsc) ─▶ Controller::run()   ← tokio task
//! hotkey thread ┘                               │
//!                                               ├─ arm: TextSource::capture → StagedText
//!                                               ├─ tick × 3 (1 s apart)
//!                                               └─ spawn_blocking(EmissionWorker::run)
//!                                                        │   checks CancelFlag per line
//!                                                        ▼
//!                                                     Outcome ─▶ Shell (status, window, trigger)
//! ```
//!
//! Only [`CancelFlag`] is shared between the control task and the worker
//! thread; everything else is owned by one side.

pub mod controller;
pub mod dispatch;
pub mod shell;
pub mod state;
pub mod worker;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use controller::Controller;
pub use dispatch::{route, ControlCommand, Route};
pub use shell::{ChannelShell, Shell, ShellEvent, Status};
pub use state::{
    ArmError, CancelFlag, CountdownState, RunPhase, StagedText, COUNTDOWN_TICKS, TICK_INTERVAL,
};
pub use worker::{EmissionWorker, Outcome};
