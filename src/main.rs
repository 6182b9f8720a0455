//! Application entry point — Countdown Typer.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create the [`tokio`] runtime that hosts the controller.
//! 4. Create channels (`command`, `shell`) and the shared text box.
//! 5. Spawn the hotkey listener thread.
//! 6. Run [`eframe::run_native`]; the creator closure builds the
//!    [`Controller`] around the window's `egui::Context` and spawns it.

use std::sync::Arc;

use countdown_typer::{
    app::{TyperApp, UiShell},
    config::AppConfig,
    emit::{platform_layout, EnigoFactory},
    engine::{ControlCommand, Controller, EmissionWorker, ShellEvent},
    hotkey::{parse_key, HotkeyListener},
    source,
};
use eframe::egui;
use tokio::sync::mpsc;

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let mut vp = egui::ViewportBuilder::default()
        .with_title("Countdown Typer")
        .with_inner_size([width, height])
        .with_min_inner_size([360.0, 200.0]);

    if config.ui.always_on_top {
        vp = vp.with_always_on_top();
    }

    if let Some((x, y)) = config.ui.window_position {
        vp = vp.with_position(egui::pos2(x, y));
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Countdown Typer starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (the controller is one task; emission uses the blocking pool)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;

    // 4. Channels and shared text box
    let (command_tx, command_rx) = mpsc::channel::<ControlCommand>(16);
    let (shell_tx, shell_rx) = mpsc::unbounded_channel::<ShellEvent>();
    let draft = source::new_shared_draft();

    // 5. Hotkey listener thread
    let hotkey_key = parse_key(&config.hotkey.trigger_key).unwrap_or_else(|| {
        log::warn!(
            "Unknown hotkey {:?}; falling back to F8",
            config.hotkey.trigger_key
        );
        rdev::Key::F8
    });
    let _hotkey_listener = match HotkeyListener::start(hotkey_key, command_tx.clone()) {
        Ok(listener) => Some(listener),
        Err(e) => {
            log::warn!("Global hotkey unavailable: {e}");
            None
        }
    };

    let text_source = source::from_config(config.source, Arc::clone(&draft));
    let worker = Arc::new(EmissionWorker::new(
        Arc::new(EnigoFactory::from_config(&config.typing)),
        platform_layout(&config.typing),
        config.typing.layout_settle(),
    ));

    // 6. Window (blocks until closed)
    let options = native_options(&config);
    let handle = rt.handle().clone();
    let app_config = config.clone();

    eframe::run_native(
        "Countdown Typer",
        options,
        Box::new(move |cc| {
            let shell = UiShell::new(cc.egui_ctx.clone(), shell_tx);
            let controller = Controller::new(text_source, worker, Box::new(shell));
            handle.spawn(controller.run(command_rx));
            Ok(Box::new(TyperApp::new(draft, command_tx, shell_rx, app_config)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("window error: {e}"))?;

    // The window sent Stop on exit; give the worker time to reach a line
    // boundary and restore the layout.
    rt.shutdown_timeout(std::time::Duration::from_secs(2));
    log::info!("Countdown Typer stopped");
    Ok(())
}
