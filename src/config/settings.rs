//! `settings.toml` schema.
//!
//! Every section is `#[serde(default)]`: a file naming only the keys a user
//! changed is valid, and an absent file means all defaults.  Countdown length
//! and indentation policy are fixed in the engine and have no keys here.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// SourceKind
// ---------------------------------------------------------------------------

/// Where the text to type is captured from when a run is armed.
///
/// | Variant   | Captured from                           |
/// |-----------|-----------------------------------------|
/// | TextBox   | the editable text box in the window     |
/// | Clipboard | the system clipboard (plain text only)  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    TextBox,
    Clipboard,
}

impl Default for SourceKind {
    fn default() -> Self {
        Self::TextBox
    }
}

// ---------------------------------------------------------------------------
// TypingConfig
// ---------------------------------------------------------------------------

/// Keystroke emission settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    /// Delay between individual typed characters, in milliseconds.
    /// `0` types each line in a single call.
    pub char_interval_ms: u64,
    /// Pause after every emitter call (key press, combo, literal run),
    /// in milliseconds.
    pub key_pause_ms: u64,
    /// Force the foreground window onto `reference_layout` while typing
    /// (Windows only; ignored elsewhere).
    pub force_layout: bool,
    /// Keyboard layout identifier (KLID) typed against, e.g. `"00000409"`
    /// for US English.
    pub reference_layout: String,
    /// Milliseconds to wait after a layout switch before the first keystroke.
    pub layout_settle_ms: u64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            char_interval_ms: 5,
            key_pause_ms: 50,
            force_layout: true,
            reference_layout: "00000409".into(),
            layout_settle_ms: 100,
        }
    }
}

impl TypingConfig {
    pub fn char_interval(&self) -> Duration {
        Duration::from_millis(self.char_interval_ms)
    }

    pub fn key_pause(&self) -> Duration {
        Duration::from_millis(self.key_pause_ms)
    }

    pub fn layout_settle(&self) -> Duration {
        Duration::from_millis(self.layout_settle_ms)
    }
}

// ---------------------------------------------------------------------------
// HotkeyConfig
// ---------------------------------------------------------------------------

/// Global hotkey binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    /// Key that starts a run when idle and aborts it when busy (e.g. `"F8"`).
    pub trigger_key: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            trigger_key: "F8".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Window appearance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Initial inner size `(width, height)` in logical pixels.
    pub window_size: (f32, f32),
    /// Last saved window position `(x, y)` in screen pixels.  `None` lets the
    /// window manager pick.
    pub window_position: Option<(f32, f32)>,
    /// Keep the window above all other windows.
    pub always_on_top: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_size: (560.0, 360.0),
            window_position: None,
            always_on_top: false,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Contents of `settings.toml`.
///
/// ```rust,no_run
/// use countdown_typer::config::{AppConfig, SourceKind};
///
/// let mut config = AppConfig::load()?;
/// config.source = SourceKind::Clipboard;
/// config.save()?;
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Text source captured at arm time.
    pub source: SourceKind,
    /// Keystroke emission settings.
    pub typing: TypingConfig,
    /// Global hotkey binding.
    pub hotkey: HotkeyConfig,
    /// Window settings.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Read the per-user `settings.toml`; a first run gets defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Write the per-user `settings.toml`, creating its directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("writing {}", path.display()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scratch() -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("settings.toml");
        (dir, file)
    }

    #[test]
    fn defaults_match_documented_values() {
        let c = AppConfig::default();

        assert_eq!(c.source, SourceKind::TextBox);
        assert_eq!(c.typing.char_interval(), Duration::from_millis(5));
        assert_eq!(c.typing.key_pause(), Duration::from_millis(50));
        assert_eq!(c.typing.layout_settle(), Duration::from_millis(100));
        assert!(c.typing.force_layout);
        assert_eq!(c.typing.reference_layout, "00000409");
        assert_eq!(c.hotkey.trigger_key, "F8");
        assert_eq!(c.ui.window_size, (560.0, 360.0));
        assert_eq!(c.ui.window_position, None);
        assert!(!c.ui.always_on_top);
    }

    #[test]
    fn first_run_has_no_file() {
        let (_dir, file) = scratch();
        let c = AppConfig::load_from(&file).unwrap();
        assert_eq!(c.hotkey.trigger_key, "F8");
        assert!(!file.exists());
    }

    #[test]
    fn saved_changes_are_read_back() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a").join("b").join("settings.toml");

        let mut c = AppConfig::default();
        c.source = SourceKind::Clipboard;
        c.typing.char_interval_ms = 0;
        c.typing.force_layout = false;
        c.typing.reference_layout = "00000809".into();
        c.hotkey.trigger_key = "Pause".into();
        c.ui.window_position = Some((40.0, 80.0));
        c.ui.always_on_top = true;
        c.save_to(&file).unwrap();

        let back = AppConfig::load_from(&file).unwrap();
        assert_eq!(back.source, SourceKind::Clipboard);
        assert_eq!(back.typing.char_interval(), Duration::ZERO);
        assert!(!back.typing.force_layout);
        assert_eq!(back.typing.reference_layout, "00000809");
        assert_eq!(back.hotkey.trigger_key, "Pause");
        assert_eq!(back.ui.window_position, Some((40.0, 80.0)));
        assert!(back.ui.always_on_top);
    }

    #[test]
    fn sparse_file_keeps_other_defaults() {
        let (_dir, file) = scratch();
        std::fs::write(&file, "source = \"clipboard\"\n\n[hotkey]\ntrigger_key = \"F10\"\n").unwrap();

        let c = AppConfig::load_from(&file).unwrap();
        assert_eq!(c.source, SourceKind::Clipboard);
        assert_eq!(c.hotkey.trigger_key, "F10");
        assert_eq!(c.typing.key_pause_ms, 50);
        assert_eq!(c.ui.window_size, (560.0, 360.0));
    }

    #[test]
    fn broken_toml_names_the_file() {
        let (_dir, file) = scratch();
        std::fs::write(&file, "source = [").unwrap();

        let err = AppConfig::load_from(&file).unwrap_err();
        assert!(format!("{err}").contains("settings.toml"));
    }

    #[test]
    fn unknown_source_is_rejected() {
        let (_dir, file) = scratch();
        std::fs::write(&file, "source = \"microphone\"\n").unwrap();
        assert!(AppConfig::load_from(&file).is_err());
    }
}
