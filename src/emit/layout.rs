//! Keyboard layout capability.
//!
//! Synthetic key codes are layout dependent: a target window running a
//! non-Latin layout would receive the wrong characters.  On Windows the
//! worker therefore forces the foreground window onto a reference layout for
//! the duration of a run and puts the original back afterwards.
//!
//! [`LayoutGuard`] owns that switch.  Restoring happens in `Drop`, so every
//! exit path of the worker (completed, failed, interrupted, panicking) puts
//! the user's layout back.
//!
//! If the current layout cannot be read, the guard neither switches nor
//! restores; this is the "layout support unavailable" path, not an error.

use std::sync::Arc;
use std::time::Duration;

use super::EmitError;
use crate::config::TypingConfig;

// ---------------------------------------------------------------------------
// LayoutHandle
// ---------------------------------------------------------------------------

/// Opaque OS keyboard layout handle (an `HKL` on Windows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutHandle(isize);

impl LayoutHandle {
    pub fn from_raw(raw: isize) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> isize {
        self.0
    }
}

// ---------------------------------------------------------------------------
// LayoutSwitcher
// ---------------------------------------------------------------------------

/// Reads and forces the foreground window's keyboard layout.
pub trait LayoutSwitcher: Send + Sync {
    /// Layout currently active in the foreground window, or `None` when it
    /// cannot be determined.
    fn active_layout(&self) -> Option<LayoutHandle>;

    /// The layout keystrokes are emitted against, or `None` when unavailable.
    fn reference_layout(&self) -> Option<LayoutHandle>;

    /// Ask the foreground window to switch to `layout`.
    fn activate(&self, layout: LayoutHandle) -> Result<(), EmitError>;
}

/// [`LayoutSwitcher`] for platforms without layout introspection.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLayoutSupport;

impl LayoutSwitcher for NoLayoutSupport {
    fn active_layout(&self) -> Option<LayoutHandle> {
        None
    }

    fn reference_layout(&self) -> Option<LayoutHandle> {
        None
    }

    fn activate(&self, _layout: LayoutHandle) -> Result<(), EmitError> {
        Ok(())
    }
}

/// Select the layout capability for this platform once, at startup.
pub fn platform_layout(config: &TypingConfig) -> Arc<dyn LayoutSwitcher> {
    if !config.force_layout {
        return Arc::new(NoLayoutSupport);
    }

    #[cfg(windows)]
    {
        Arc::new(windows_layout::WindowsLayout::new(&config.reference_layout))
    }

    #[cfg(not(windows))]
    {
        Arc::new(NoLayoutSupport)
    }
}

// ---------------------------------------------------------------------------
// LayoutGuard
// ---------------------------------------------------------------------------

/// Scoped layout switch.  Restores the saved layout when dropped.
pub struct LayoutGuard<'a> {
    switcher: &'a dyn LayoutSwitcher,
    saved: Option<LayoutHandle>,
}

impl<'a> LayoutGuard<'a> {
    /// Force the reference layout if it differs from the active one, then
    /// wait `settle` for the window to pick it up.
    ///
    /// A failed switch is logged and typing proceeds on the current layout.
    pub fn engage(switcher: &'a dyn LayoutSwitcher, settle: Duration) -> Self {
        let saved = match (switcher.active_layout(), switcher.reference_layout()) {
            (Some(current), Some(reference)) if current != reference => {
                match switcher.activate(reference) {
                    Ok(()) => {
                        log::info!(
                            "layout: switched {:#x} -> {:#x} for typing",
                            current.raw(),
                            reference.raw()
                        );
                        if !settle.is_zero() {
                            std::thread::sleep(settle);
                        }
                        Some(current)
                    }
                    Err(e) => {
                        log::warn!("layout: {e}; typing with the current layout");
                        None
                    }
                }
            }
            (None, _) | (_, None) => {
                log::debug!("layout: introspection unavailable, leaving layout alone");
                None
            }
            _ => None,
        };

        Self { switcher, saved }
    }

    /// `true` when a switch happened and a restore is pending.
    pub fn is_engaged(&self) -> bool {
        self.saved.is_some()
    }
}

impl Drop for LayoutGuard<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            match self.switcher.activate(saved) {
                Ok(()) => log::info!("layout: restored {:#x}", saved.raw()),
                Err(e) => log::warn!("layout: could not restore original layout: {e}"),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Windows implementation
// ---------------------------------------------------------------------------

#[cfg(windows)]
mod windows_layout {
    use windows::core::HSTRING;
    use windows::Win32::Foundation::{HWND, LPARAM, WPARAM};
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        GetKeyboardLayout, LoadKeyboardLayoutW, HKL, KLF_ACTIVATE,
    };
    use windows::Win32::UI::WindowsAndMessaging::{
        GetForegroundWindow, GetWindowThreadProcessId, PostMessageW, WM_INPUTLANGCHANGEREQUEST,
    };

    use super::{EmitError, LayoutHandle, LayoutSwitcher};

    /// Layout switching through `WM_INPUTLANGCHANGEREQUEST` on the foreground
    /// window.
    pub struct WindowsLayout {
        klid: HSTRING,
    }

    impl WindowsLayout {
        pub fn new(klid: &str) -> Self {
            Self {
                klid: HSTRING::from(klid),
            }
        }
    }

    fn foreground() -> Option<HWND> {
        // SAFETY: no preconditions; a null handle means no foreground window.
        let hwnd = unsafe { GetForegroundWindow() };
        (hwnd != HWND::default()).then_some(hwnd)
    }

    fn handle(hkl: HKL) -> Option<LayoutHandle> {
        let raw = hkl.0 as isize;
        (raw != 0).then(|| LayoutHandle::from_raw(raw))
    }

    impl LayoutSwitcher for WindowsLayout {
        fn active_layout(&self) -> Option<LayoutHandle> {
            let hwnd = foreground()?;
            // SAFETY: `hwnd` came from GetForegroundWindow; a stale handle
            // yields thread id 0, which we reject.
            let thread = unsafe { GetWindowThreadProcessId(hwnd, None) };
            if thread == 0 {
                return None;
            }
            // SAFETY: plain query on a thread id.
            handle(unsafe { GetKeyboardLayout(thread) })
        }

        fn reference_layout(&self) -> Option<LayoutHandle> {
            // SAFETY: `klid` is a valid, NUL-terminated wide string.
            match unsafe { LoadKeyboardLayoutW(&self.klid, KLF_ACTIVATE) } {
                Ok(hkl) => handle(hkl),
                Err(e) => {
                    log::warn!("layout: cannot load {}: {e}", self.klid);
                    None
                }
            }
        }

        fn activate(&self, layout: LayoutHandle) -> Result<(), EmitError> {
            let hwnd =
                foreground().ok_or_else(|| EmitError::Layout("no foreground window".into()))?;
            // SAFETY: posting a message carries no memory-safety obligations.
            unsafe {
                PostMessageW(
                    hwnd,
                    WM_INPUTLANGCHANGEREQUEST,
                    WPARAM(0),
                    LPARAM(layout.raw()),
                )
            }
            .map_err(|e| EmitError::Layout(e.to_string()))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
