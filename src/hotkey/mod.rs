//! Global trigger hotkey, backed by `rdev`.
//!
//! The trigger key is watched on its own OS thread, since `rdev::listen`
//! blocks forever.  Each press goes straight to the controller as
//! [`ControlCommand::Toggle`](crate::engine::ControlCommand), not through the
//! window, so a minimised window that is not repainting can still be aborted.
//!
//! ```no_run
//! use countdown_typer::engine::ControlCommand;
//! use countdown_typer::hotkey::{parse_key, HotkeyListener};
//!
//! let (commands, _controller_rx) = tokio::sync::mpsc::channel::<ControlCommand>(8);
//! let key = parse_key("Pause").unwrap_or(rdev::Key::F8);
//! let _hotkey = HotkeyListener::start(key, commands)?;
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod listener;

pub use listener::HotkeyListener;

// ---------------------------------------------------------------------------
// parse_key
// ---------------------------------------------------------------------------

/// Key named by `[hotkey] trigger_key`.
///
/// Case-insensitive: `F1`–`F12`, `Pause`, `ScrollLock`, `PrintScreen`,
/// navigation keys and single letters.  No modifier combinations.
///
/// ```
/// use countdown_typer::hotkey::parse_key;
///
/// assert_eq!(parse_key("f9"), Some(rdev::Key::F9));
/// assert_eq!(parse_key("Ctrl+T"), None);
/// ```
pub fn parse_key(name: &str) -> Option<rdev::Key> {
    use rdev::Key;

    let lower = name.trim().to_ascii_lowercase();

    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        const FUNCTION_KEYS: [Key; 12] = [
            Key::F1,
            Key::F2,
            Key::F3,
            Key::F4,
            Key::F5,
            Key::F6,
            Key::F7,
            Key::F8,
            Key::F9,
            Key::F10,
            Key::F11,
            Key::F12,
        ];
        return FUNCTION_KEYS.get(usize::from(n).checked_sub(1)?).copied();
    }

    let key = match lower.as_str() {
        "pause" | "break" => Key::Pause,
        "scrolllock" => Key::ScrollLock,
        "printscreen" | "prtsc" => Key::PrintScreen,
        "insert" | "ins" => Key::Insert,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        "escape" | "esc" => Key::Escape,
        letter if letter.len() == 1 => return letter_key(letter.as_bytes()[0]),
        _ => return None,
    };
    Some(key)
}

fn letter_key(c: u8) -> Option<rdev::Key> {
    use rdev::Key::*;

    const LETTERS: [rdev::Key; 26] = [
        KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO,
        KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,
    ];
    c.is_ascii_lowercase()
        .then(|| LETTERS[usize::from(c - b'a')])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rdev::Key;

    #[test]
    fn function_keys() {
        assert_eq!(parse_key("F1"), Some(Key::F1));
        assert_eq!(parse_key("f8"), Some(Key::F8));
        assert_eq!(parse_key("F12"), Some(Key::F12));
        assert_eq!(parse_key("F0"), None);
        assert_eq!(parse_key("F13"), None);
    }

    #[test]
    fn named_keys_ignore_case_and_padding() {
        assert_eq!(parse_key("Pause"), Some(Key::Pause));
        assert_eq!(parse_key(" SCROLLLOCK "), Some(Key::ScrollLock));
        assert_eq!(parse_key("Esc"), Some(Key::Escape));
        assert_eq!(parse_key("PageDown"), Some(Key::PageDown));
    }

    #[test]
    fn single_letters() {
        assert_eq!(parse_key("a"), Some(Key::KeyA));
        assert_eq!(parse_key("T"), Some(Key::KeyT));
        assert_eq!(parse_key("z"), Some(Key::KeyZ));
        assert_eq!(parse_key("1"), None);
    }

    #[test]
    fn unknown_names() {
        assert_eq!(parse_key(""), None);
        assert_eq!(parse_key("xyz"), None);
        assert_eq!(parse_key("Ctrl+T"), None);
        assert_eq!(parse_key("F"), Some(Key::KeyF));
    }
}
