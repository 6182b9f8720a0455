//! The `rdev` hook thread.
//!
//! `rdev::listen` cannot be stopped once running.  [`HotkeyListener`] only
//! mutes it: after drop, the hook keeps receiving events but forwards none.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use tokio::sync::mpsc;

use crate::engine::ControlCommand;

/// Owns the hook thread; forwarding stops when this is dropped.
pub struct HotkeyListener {
    muted: Arc<AtomicBool>,
    _hook: JoinHandle<()>,
}

impl HotkeyListener {
    /// Start forwarding presses of `key` to the controller as
    /// [`ControlCommand::Toggle`].
    ///
    /// Holding the key sends one command, not one per auto-repeat.
    pub fn start(key: rdev::Key, commands: mpsc::Sender<ControlCommand>) -> std::io::Result<Self> {
        let muted = Arc::new(AtomicBool::new(false));
        let hook_muted = Arc::clone(&muted);

        let hook = std::thread::Builder::new()
            .name("hotkey".into())
            .spawn(move || hook_loop(key, hook_muted, commands))?;

        log::info!("hotkey: listening for {key:?}");
        Ok(Self { muted, _hook: hook })
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        self.muted.store(true, Ordering::Relaxed);
    }
}

fn hook_loop(key: rdev::Key, muted: Arc<AtomicBool>, commands: mpsc::Sender<ControlCommand>) {
    let mut held = false;
    let outcome = rdev::listen(move |event| {
        if muted.load(Ordering::Relaxed) {
            return;
        }
        let Some(command) = on_event(&mut held, key, &event.event_type) else {
            return;
        };
        // Plain OS thread, so the blocking send is fine here.
        if commands.blocking_send(command).is_err() {
            log::debug!("hotkey: controller has stopped, press dropped");
        }
    });

    if let Err(e) = outcome {
        log::error!("hotkey: global hook failed: {e:?}");
    }
}

/// Translate one raw event into a command, tracking whether `key` is down.
fn on_event(held: &mut bool, key: rdev::Key, event: &rdev::EventType) -> Option<ControlCommand> {
    match event {
        rdev::EventType::KeyPress(k) if *k == key => {
            let first = !*held;
            *held = true;
            first.then_some(ControlCommand::Toggle)
        }
        rdev::EventType::KeyRelease(k) if *k == key => {
            *held = false;
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdev::{EventType, Key};

    #[test]
    fn press_toggles_once_per_hold() {
        let mut held = false;
        let press = EventType::KeyPress(Key::F8);
        let release = EventType::KeyRelease(Key::F8);

        assert_eq!(on_event(&mut held, Key::F8, &press), Some(ControlCommand::Toggle));
        assert_eq!(on_event(&mut held, Key::F8, &press), None);
        assert_eq!(on_event(&mut held, Key::F8, &release), None);
        assert_eq!(on_event(&mut held, Key::F8, &press), Some(ControlCommand::Toggle));
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut held = false;
        assert_eq!(
            on_event(&mut held, Key::F8, &EventType::KeyPress(Key::F9)),
            None
        );
        assert_eq!(
            on_event(&mut held, Key::F8, &EventType::MouseMove { x: 1.0, y: 2.0 }),
            None
        );
        assert!(!held);
    }
}
