//! Countdown Typer — types staged text into whatever window has focus after
//! a short countdown.
//!
//! * [`config`] — `settings.toml` loading and saving.
//! * [`source`] — where the text comes from (text box or clipboard).
//! * [`emit`]   — synthetic keystrokes and keyboard-layout forcing.
//! * [`engine`] — countdown state machine, controller and emission worker.
//! * [`hotkey`] — global start/abort hotkey.
//! * [`app`]    — the egui window.

pub mod app;
pub mod config;
pub mod emit;
pub mod engine;
pub mod hotkey;
pub mod source;
