//! Keyboard simulation backed by the `enigo` crate.
//!
//! | Operation      | enigo call                                   |
//! |----------------|----------------------------------------------|
//! | literal text   | `Keyboard::text` (per character when paced)  |
//! | single key     | `Key::Tab` / `Key::Return`, `Direction::Click` |
//! | combination    | Press … Click … Release (reverse order)      |

use std::time::Duration;

use enigo::{Direction, Enigo, Key, Keyboard, Settings};

use super::{EmitError, EmitterFactory, InputEmitter, NamedKey};
use crate::config::TypingConfig;

// ---------------------------------------------------------------------------
// EnigoFactory
// ---------------------------------------------------------------------------

/// Opens an [`EnigoEmitter`] with the configured pacing.
#[derive(Debug, Clone, Default)]
pub struct EnigoFactory {
    /// Delay between typed characters.
    pub char_interval: Duration,
    /// Pause after every emitter call.
    pub key_pause: Duration,
}

impl EnigoFactory {
    pub fn from_config(config: &TypingConfig) -> Self {
        Self {
            char_interval: config.char_interval(),
            key_pause: config.key_pause(),
        }
    }
}

impl EmitterFactory for EnigoFactory {
    /// A new [`Enigo`] instance is created per run because `Enigo` is not
    /// `Send` and has to live on the worker thread.
    fn open(&self) -> Result<Box<dyn InputEmitter>, EmitError> {
        let enigo =
            Enigo::new(&Settings::default()).map_err(|e| EmitError::Backend(e.to_string()))?;
        Ok(Box::new(EnigoEmitter {
            enigo,
            char_interval: self.char_interval,
            key_pause: self.key_pause,
        }))
    }
}

// ---------------------------------------------------------------------------
// EnigoEmitter
// ---------------------------------------------------------------------------

/// Production [`InputEmitter`].
pub struct EnigoEmitter {
    enigo: Enigo,
    char_interval: Duration,
    key_pause: Duration,
}

impl EnigoEmitter {
    fn pause(&self) {
        if !self.key_pause.is_zero() {
            std::thread::sleep(self.key_pause);
        }
    }

    fn key(&mut self, key: NamedKey, direction: Direction) -> Result<(), EmitError> {
        self.enigo
            .key(to_enigo(key), direction)
            .map_err(|e| EmitError::KeySimulation(e.to_string()))
    }
}

impl InputEmitter for EnigoEmitter {
    fn type_literal(&mut self, text: &str) -> Result<(), EmitError> {
        if self.char_interval.is_zero() {
            self.enigo
                .text(text)
                .map_err(|e| EmitError::Typing(e.to_string()))?;
        } else {
            let mut buf = [0u8; 4];
            for c in text.chars() {
                self.enigo
                    .text(c.encode_utf8(&mut buf))
                    .map_err(|e| EmitError::Typing(e.to_string()))?;
                std::thread::sleep(self.char_interval);
            }
        }
        self.pause();
        Ok(())
    }

    fn press_key(&mut self, key: NamedKey) -> Result<(), EmitError> {
        self.key(key, Direction::Click)?;
        self.pause();
        Ok(())
    }

    fn press_combo(&mut self, keys: &[NamedKey]) -> Result<(), EmitError> {
        let Some((&last, held)) = keys.split_last() else {
            return Ok(());
        };

        let mut pressed = 0;
        let mut result = Ok(());
        for &key in held {
            result = self.key(key, Direction::Press);
            if result.is_err() {
                break;
            }
            pressed += 1;
        }
        if result.is_ok() {
            result = self.key(last, Direction::Click);
        }

        // Release whatever went down, even when a later event failed, so a
        // stuck Shift does not leak into the user's typing.
        for &key in held[..pressed].iter().rev() {
            if let Err(e) = self.key(key, Direction::Release) {
                log::warn!("emit: could not release {key:?}: {e}");
            }
        }

        result?;
        self.pause();
        Ok(())
    }
}

fn to_enigo(key: NamedKey) -> Key {
    match key {
        NamedKey::Tab => Key::Tab,
        NamedKey::Enter => Key::Return,
        NamedKey::Shift => Key::Shift,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_keys_map_to_enigo_keys() {
        assert_eq!(to_enigo(NamedKey::Tab), Key::Tab);
        assert_eq!(to_enigo(NamedKey::Enter), Key::Return);
        assert_eq!(to_enigo(NamedKey::Shift), Key::Shift);
    }

    #[test]
    fn factory_takes_pacing_from_config() {
        let config = TypingConfig {
            char_interval_ms: 7,
            key_pause_ms: 20,
            ..TypingConfig::default()
        };
        let factory = EnigoFactory::from_config(&config);
        assert_eq!(factory.char_interval, Duration::from_millis(7));
        assert_eq!(factory.key_pause, Duration::from_millis(20));
    }
}
