//! Where Countdown Typer keeps its settings.
//!
//! | Platform | Directory                                         |
//! |----------|---------------------------------------------------|
//! | Windows  | `%APPDATA%\countdown-typer\`                      |
//! | macOS    | `~/Library/Application Support/countdown-typer/`  |
//! | Linux    | `$XDG_CONFIG_HOME/countdown-typer/`               |

use std::path::PathBuf;

const APP_DIR: &str = "countdown-typer";
const SETTINGS_FILE: &str = "settings.toml";

/// Resolved per-user locations.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub settings_file: PathBuf,
}

impl AppPaths {
    /// Without a platform config dir, settings land next to the working
    /// directory.
    pub fn new() -> Self {
        let base = dirs::config_dir().unwrap_or_default();
        Self::under(base)
    }

    fn under(base: PathBuf) -> Self {
        let config_dir = base.join(APP_DIR);
        Self {
            settings_file: config_dir.join(SETTINGS_FILE),
            config_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_file_sits_in_app_dir() {
        let paths = AppPaths::under(PathBuf::from("/home/u/.config"));
        assert_eq!(paths.config_dir, PathBuf::from("/home/u/.config/countdown-typer"));
        assert_eq!(
            paths.settings_file,
            PathBuf::from("/home/u/.config/countdown-typer/settings.toml")
        );
    }

    #[test]
    fn platform_paths_use_app_dir_name() {
        assert!(AppPaths::new().config_dir.ends_with(APP_DIR));
    }
}
