//! Keystroke emission — the capability the emission worker drives.
//!
//! # Overview
//!
//! The worker never talks to the OS directly.  It goes through two seams:
//!
//! 1. [`InputEmitter`] — types literal text and presses single keys or key
//!    combinations.  [`EnigoEmitter`] is the production backend.
//! 2. [`LayoutSwitcher`] — reads and forces the foreground window's keyboard
//!    layout.  Only Windows has a real implementation; every other platform
//!    gets [`NoLayoutSupport`], selected once by [`platform_layout`].
//!
//! `Enigo` is not `Send`, so the worker receives an [`EmitterFactory`] and
//! opens its emitter on the worker thread.

pub mod keyboard;
pub mod layout;

#[cfg(test)]
pub mod testing;

pub use keyboard::{EnigoEmitter, EnigoFactory};
pub use layout::{platform_layout, LayoutGuard, LayoutHandle, LayoutSwitcher, NoLayoutSupport};

use thiserror::Error;

// ---------------------------------------------------------------------------
// EmitError
// ---------------------------------------------------------------------------

/// All errors that can surface while emitting keystrokes.
#[derive(Debug, Clone, Error)]
pub enum EmitError {
    /// The keyboard simulation backend could not be initialised.
    #[error("cannot initialise keyboard backend: {0}")]
    Backend(String),

    /// Could not simulate a key press/release event.
    #[error("cannot simulate key press: {0}")]
    KeySimulation(String),

    /// Could not type literal text.
    #[error("cannot type text: {0}")]
    Typing(String),

    /// Could not read or change the keyboard layout.
    #[error("cannot switch keyboard layout: {0}")]
    Layout(String),
}

// ---------------------------------------------------------------------------
// NamedKey
// ---------------------------------------------------------------------------

/// The non-character keys the worker needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedKey {
    /// Indent one level.
    Tab,
    /// Line break.
    Enter,
    /// Held together with [`NamedKey::Tab`] to outdent one level.
    Shift,
}

// ---------------------------------------------------------------------------
// InputEmitter / EmitterFactory
// ---------------------------------------------------------------------------

/// Synthesises keyboard input into whatever window currently has focus.
pub trait InputEmitter {
    /// Type `text` as literal characters.
    fn type_literal(&mut self, text: &str) -> Result<(), EmitError>;

    /// Press and release a single key.
    fn press_key(&mut self, key: NamedKey) -> Result<(), EmitError>;

    /// Hold every key but the last, click the last, then release the held
    /// keys in reverse order.
    fn press_combo(&mut self, keys: &[NamedKey]) -> Result<(), EmitError>;
}

/// Opens a fresh [`InputEmitter`] on the calling thread.
///
/// Implementations must be `Send + Sync` so one factory can be shared between
/// the controller and every worker it spawns.
pub trait EmitterFactory: Send + Sync {
    fn open(&self) -> Result<Box<dyn InputEmitter>, EmitError>;
}

// Compile-time assertion: Arc<dyn EmitterFactory> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: std::sync::Arc<dyn EmitterFactory>) {}
};
