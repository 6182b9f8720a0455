//! Countdown controller — arms runs, drives the countdown, supervises the
//! emission worker, and performs abort cleanup.
//!
//! # Flow
//!
//! ```text
//! ControlCommand ──route()──▶ arm ──▶ CountingDown ──tick × 3──▶ spawn_blocking(worker.run)
//!                          └▶ request_abort                          │
//!                                                                    ▼
//!                                              Outcome ──▶ finish ──▶ Idle
//! ```
//!
//! [`Controller::run`] is the control loop: a single tokio task that
//! `select!`s over incoming commands, the next tick deadline and the worker's
//! outcome.  It never blocks; keystrokes are emitted on a blocking-pool
//! thread.  The state-machine methods are public so tests can step them
//! without a timer.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::source::TextSource;

use super::dispatch::{route, ControlCommand, Route};
use super::shell::{Shell, Status};
use super::state::{
    ArmError, CancelFlag, CountdownState, RunPhase, StagedText, TICK_INTERVAL,
};
use super::worker::{EmissionWorker, Outcome};

/// Owns the run state.  Lives on the control task.
pub struct Controller {
    phase: RunPhase,
    countdown: CountdownState,
    staged: Option<StagedText>,
    cancel: CancelFlag,
    next_tick: Option<Instant>,

    source: Box<dyn TextSource>,
    worker: Arc<EmissionWorker>,
    shell: Box<dyn Shell>,

    outcome_tx: mpsc::UnboundedSender<Outcome>,
    outcome_rx: Option<mpsc::UnboundedReceiver<Outcome>>,
}

impl Controller {
    /// * `source` — captured once per arm.
    /// * `worker` — emission worker, shared with every spawned run.
    /// * `shell`  — window/hotkey shell the controller reports to.
    pub fn new(
        source: Box<dyn TextSource>,
        worker: Arc<EmissionWorker>,
        shell: Box<dyn Shell>,
    ) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            phase: RunPhase::Idle,
            countdown: CountdownState::default(),
            staged: None,
            cancel: CancelFlag::new(),
            next_tick: None,
            source,
            worker,
            shell,
            outcome_tx,
            outcome_rx: Some(outcome_rx),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn countdown(&self) -> CountdownState {
        self.countdown
    }

    /// Handle to the cancel flag of the current (or next) run.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Deadline of the pending tick, if a countdown is running.
    pub fn next_tick(&self) -> Option<Instant> {
        self.next_tick
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run the control loop until `commands` is closed.
    ///
    /// On shutdown an in-flight worker is asked to stop at its next line.
    pub async fn run(mut self, mut commands: mpsc::Receiver<ControlCommand>) {
        let Some(mut outcomes) = self.outcome_rx.take() else {
            log::error!("controller: run() called twice");
            return;
        };

        self.shell.phase_changed(self.phase);
        self.shell.set_trigger_enabled(true);
        self.shell.report_status(Status::Ready);

        loop {
            let deadline = self.next_tick;
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.dispatch(command),
                    None => break,
                },
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.tick();
                }
                Some(outcome) = outcomes.recv() => self.finish(outcome),
            }
        }

        if self.phase.is_busy() {
            self.cancel.request();
        }
        log::info!("controller: command channel closed, shutting down");
    }

    // -----------------------------------------------------------------------
    // State machine
    // -----------------------------------------------------------------------

    /// Route a command by the current phase.
    pub fn dispatch(&mut self, command: ControlCommand) {
        match route(self.phase, command) {
            Route::Arm => {
                if let Err(e) = self.arm() {
                    log::warn!("controller: arm rejected: {e}");
                    self.shell.report_status(Status::Rejected(e));
                }
            }
            Route::Abort => self.request_abort(),
            Route::Reject => {
                let e = ArmError::Busy(self.phase);
                log::debug!("controller: {e}");
                self.shell.report_status(Status::Rejected(e));
            }
            Route::Ignore => log::debug!("controller: stop while idle ignored"),
        }
    }

    /// Capture text and start the countdown.
    ///
    /// Refusals leave every piece of state untouched.
    pub fn arm(&mut self) -> Result<(), ArmError> {
        if self.phase.is_busy() {
            return Err(ArmError::Busy(self.phase));
        }
        let captured = self
            .source
            .capture()
            .map_err(|e| ArmError::Source(e.to_string()))?;
        let staged = StagedText::new(captured)?;

        log::info!("controller: armed ({} bytes)", staged.as_str().len());
        self.staged = Some(staged);
        self.cancel.reset();
        self.countdown = CountdownState::armed();
        self.set_phase(RunPhase::CountingDown);
        self.next_tick = Some(Instant::now() + TICK_INTERVAL);

        self.shell.set_trigger_enabled(false);
        self.shell.report_status(Status::CountingDown {
            seconds_left: self.countdown.remaining_ticks,
        });
        self.shell.minimize_window();
        Ok(())
    }

    /// One countdown step.  Spawns the worker when the countdown hits zero.
    pub fn tick(&mut self) {
        if self.phase != RunPhase::CountingDown {
            self.next_tick = None;
            return;
        }
        if self.cancel.is_requested() {
            self.abort_cleanup();
            return;
        }

        let left = self.countdown.advance();
        if left > 0 {
            self.shell
                .report_status(Status::CountingDown { seconds_left: left });
            self.next_tick = Some(Instant::now() + TICK_INTERVAL);
            return;
        }

        self.next_tick = None;
        match self.staged.take() {
            Some(text) => self.spawn_worker(text),
            None => {
                // Unreachable through arm(); recover rather than hang.
                log::error!("controller: countdown finished without staged text");
                self.finish(Outcome::Failed("no text staged".into()));
            }
        }
    }

    /// Raise the cancel flag.  During the countdown the run ends immediately;
    /// during emission it ends when the worker reaches a line boundary.
    pub fn request_abort(&mut self) {
        self.cancel.request();
        match self.phase {
            RunPhase::CountingDown => self.abort_cleanup(),
            RunPhase::Emitting => {
                log::info!("controller: stop requested during typing");
                self.set_phase(RunPhase::Aborting);
                self.shell.report_status(Status::Stopping);
            }
            RunPhase::Aborting | RunPhase::Idle => {}
        }
    }

    /// Apply a worker outcome and return to `Idle`.
    pub fn finish(&mut self, outcome: Outcome) {
        if !matches!(self.phase, RunPhase::Emitting | RunPhase::Aborting) {
            log::warn!("controller: stray outcome {outcome:?} in {:?}", self.phase);
        }

        match outcome {
            Outcome::Interrupted => self.abort_cleanup(),
            Outcome::Completed => {
                log::info!("controller: run completed");
                self.end_run(Status::Completed);
            }
            Outcome::Failed(reason) => {
                log::error!("controller: run failed: {reason}");
                self.end_run(Status::Failed);
                self.shell.notify_failure(&reason);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn spawn_worker(&mut self, text: StagedText) {
        self.set_phase(RunPhase::Emitting);
        self.shell.report_status(Status::Typing);

        let worker = Arc::clone(&self.worker);
        let cancel = self.cancel.clone();
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = tokio::task::spawn_blocking(move || worker.run(&text, &cancel))
                .await
                .unwrap_or_else(|e| Outcome::Failed(format!("typing worker crashed: {e}")));
            let _ = tx.send(outcome);
        });
    }

    /// Shared abort path for both phases.
    fn abort_cleanup(&mut self) {
        log::info!("controller: run aborted");
        self.end_run(Status::Aborted);
        self.cancel.reset();
    }

    fn end_run(&mut self, status: Status) {
        self.next_tick = None;
        self.staged = None;
        self.countdown.reset();
        self.shell.restore_window();
        self.shell.set_trigger_enabled(true);
        self.set_phase(RunPhase::Idle);
        self.shell.report_status(status);
    }

    fn set_phase(&mut self, phase: RunPhase) {
        if self.phase != phase {
            log::debug!("controller: {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
            self.shell.phase_changed(phase);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
