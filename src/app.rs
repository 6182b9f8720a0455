//! Countdown Typer window — egui/eframe application.
//!
//! # Architecture
//!
//! [`TyperApp`] is the top-level [`eframe::App`].  It owns:
//!
//! * the text box, whose contents live in a [`SharedDraft`] the controller
//!   reads when arming;
//! * `command_tx` — Start / Abort buttons send [`ControlCommand`]s here;
//! * `shell_rx` — [`ShellEvent`]s from the controller (status, trigger,
//!   phase, failures).
//!
//! Minimise and restore are not routed through `shell_rx`.  [`UiShell`]
//! issues them on the `egui::Context` directly from the control task,
//! because a minimised window may not run `update()` until it is restored.

use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::engine::{ChannelShell, ControlCommand, RunPhase, Shell, ShellEvent, Status};
use crate::source::{read_clipboard_text, SharedDraft};

// ---------------------------------------------------------------------------
// UiShell
// ---------------------------------------------------------------------------

/// [`Shell`] for the egui window.
///
/// Forwards every call to the window's event channel and wakes the window;
/// window minimise/restore go straight to the viewport.
pub struct UiShell {
    ctx: egui::Context,
    events: ChannelShell,
}

impl UiShell {
    pub fn new(ctx: egui::Context, tx: mpsc::UnboundedSender<ShellEvent>) -> Self {
        Self {
            ctx,
            events: ChannelShell::new(tx),
        }
    }
}

impl Shell for UiShell {
    fn report_status(&mut self, status: Status) {
        self.events.report_status(status);
        self.ctx.request_repaint();
    }

    fn set_trigger_enabled(&mut self, enabled: bool) {
        self.events.set_trigger_enabled(enabled);
        self.ctx.request_repaint();
    }

    fn minimize_window(&mut self) {
        self.ctx
            .send_viewport_cmd(egui::ViewportCommand::Minimized(true));
        self.events.minimize_window();
    }

    fn restore_window(&mut self) {
        self.ctx
            .send_viewport_cmd(egui::ViewportCommand::Minimized(false));
        self.ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
        self.events.restore_window();
        self.ctx.request_repaint();
    }

    fn notify_failure(&mut self, reason: &str) {
        self.events.notify_failure(reason);
        self.ctx.request_repaint();
    }

    fn phase_changed(&mut self, phase: RunPhase) {
        self.events.phase_changed(phase);
        self.ctx.request_repaint();
    }
}

// ---------------------------------------------------------------------------
// TyperApp
// ---------------------------------------------------------------------------

/// eframe application — the Countdown Typer window.
pub struct TyperApp {
    // ── Mirrored controller state ────────────────────────────────────────
    phase: RunPhase,
    status: String,
    trigger_enabled: bool,
    /// Reason of the last failed run; shown as a dialog until dismissed.
    failure: Option<String>,

    // ── Text box ─────────────────────────────────────────────────────────
    draft: SharedDraft,

    // ── Channels ─────────────────────────────────────────────────────────
    command_tx: mpsc::Sender<ControlCommand>,
    shell_rx: mpsc::UnboundedReceiver<ShellEvent>,

    // ── Configuration ────────────────────────────────────────────────────
    config: AppConfig,
}

impl TyperApp {
    /// * `draft`      — text box contents shared with the controller's source.
    /// * `command_tx` — sender end of the controller command channel.
    /// * `shell_rx`   — receiver end of the [`UiShell`] event channel.
    pub fn new(
        draft: SharedDraft,
        command_tx: mpsc::Sender<ControlCommand>,
        shell_rx: mpsc::UnboundedReceiver<ShellEvent>,
        config: AppConfig,
    ) -> Self {
        Self {
            phase: RunPhase::Idle,
            status: Status::Ready.to_string(),
            trigger_enabled: true,
            failure: None,
            draft,
            command_tx,
            shell_rx,
            config,
        }
    }

    // ── Channel polling ──────────────────────────────────────────────────

    /// Drain all pending shell events (non-blocking).
    fn poll_shell(&mut self) {
        while let Ok(event) = self.shell_rx.try_recv() {
            match event {
                ShellEvent::Status(status) => self.status = status.to_string(),
                ShellEvent::TriggerEnabled(enabled) => self.trigger_enabled = enabled,
                ShellEvent::Phase(phase) => self.phase = phase,
                ShellEvent::Failure(reason) => self.failure = Some(reason),
                // Already applied to the viewport by UiShell.
                ShellEvent::Minimize | ShellEvent::Restore => {}
            }
        }
    }

    fn send(&mut self, command: ControlCommand) {
        if let Err(e) = self.command_tx.try_send(command) {
            log::warn!("ui: could not send {command:?}: {e}");
            self.status = "The typing engine is not responding.".into();
        }
    }

    /// Replace the text box contents with the clipboard text.
    fn paste_clipboard(&mut self) {
        match read_clipboard_text() {
            Ok(Some(text)) => match self.draft.lock() {
                Ok(mut draft) => *draft = text,
                Err(_) => log::warn!("ui: text box lock poisoned"),
            },
            Ok(None) => self.status = "The clipboard holds no text.".into(),
            Err(e) => {
                log::warn!("ui: {e}");
                self.status = format!("Could not read the clipboard: {e}");
            }
        }
    }

    // ── Panels ───────────────────────────────────────────────────────────

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        let busy = self.phase.is_busy();

        ui.horizontal(|ui| {
            let start = egui::Button::new(format!(
                "Start typing ({} s)",
                crate::engine::COUNTDOWN_TICKS
            ));
            if ui.add_enabled(self.trigger_enabled && !busy, start).clicked() {
                self.send(ControlCommand::Start);
            }
            if ui.add_enabled(busy, egui::Button::new("Abort")).clicked() {
                self.send(ControlCommand::Stop);
            }
            if ui
                .add_enabled(!busy, egui::Button::new("Paste clipboard"))
                .clicked()
            {
                self.paste_clipboard();
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    egui::RichText::new(format!(
                        "{}: start / abort",
                        self.config.hotkey.trigger_key
                    ))
                    .weak(),
                );
            });
        });
    }

    fn draw_text_box(&mut self, ui: &mut egui::Ui) {
        let busy = self.phase.is_busy();
        let Ok(mut draft) = self.draft.lock() else {
            ui.colored_label(egui::Color32::RED, "Text box unavailable.");
            return;
        };

        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.add_sized(
                ui.available_size(),
                egui::TextEdit::multiline(&mut *draft)
                    .code_editor()
                    // Tab inserts a tab instead of moving focus.
                    .lock_focus(true)
                    .interactive(!busy)
                    .hint_text("Text to type. Leading tabs become indent key presses."),
            );
        });
    }

    /// Modal-style dialog for a failed run.
    fn draw_failure(&mut self, ctx: &egui::Context) {
        let Some(reason) = self.failure.clone() else {
            return;
        };

        egui::Window::new("Typing failed")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!("Automatic typing failed: {reason}"));
                ui.add_space(6.0);
                if ui.button("OK").clicked() {
                    self.failure = None;
                }
            });
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for TyperApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_shell();

        // Keep polling while a run is in flight even if no input arrives.
        if self.phase.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(200));
        }

        let blocked = self.failure.is_some();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| {
                ui.label(egui::RichText::new(self.status.as_str()).size(14.0));
                ui.add_space(4.0);
                self.draw_controls(ui);
                ui.separator();
                self.draw_text_box(ui);
            });
        });

        self.draw_failure(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // The hotkey thread keeps the command channel open, so an in-flight
        // run has to be stopped explicitly.
        if self.phase.is_busy() {
            self.send(ControlCommand::Stop);
        }
        log::info!("Countdown Typer closing");
    }
}
