//! Keystroke injection backends.
//!
//! The dispatcher only needs two primitives: press a named key, and emit one
//! literal character. [`KeystrokeInjector`] captures that contract so the
//! typing loop can run against real OS input ([`EnigoInjector`]) or against
//! any writer ([`WriterInjector`]) for dry runs.

use crate::error::{Result, TyperError};
use crate::InjectionError;
use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use std::io::Write;

/// A single injection action derived from one character of the typed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    /// Press and release the enter key.
    Enter,
    /// Type one literal character.
    Char(char),
}

impl From<char> for Keystroke {
    fn from(c: char) -> Self {
        if c == '\n' {
            Self::Enter
        } else {
            Self::Char(c)
        }
    }
}

impl Keystroke {
    /// Deliver this keystroke through `injector`.
    pub fn send<I: KeystrokeInjector + ?Sized>(
        self,
        injector: &mut I,
    ) -> std::result::Result<(), InjectionError> {
        match self {
            Self::Enter => injector.press_key("enter"),
            Self::Char(c) => injector.emit_character(c),
        }
    }
}

/// Sink for synthetic keyboard input.
///
/// Implementations are best effort: success only means the event was handed
/// to the platform, not that the focused application received it.
pub trait KeystrokeInjector {
    /// Press and release a named logical key such as `"enter"`.
    fn press_key(&mut self, name: &str) -> std::result::Result<(), InjectionError>;

    /// Type one literal character into whatever currently holds focus.
    fn emit_character(&mut self, c: char) -> std::result::Result<(), InjectionError>;
}

fn named_key(name: &str) -> Option<Key> {
    let key = match name.to_lowercase().as_str() {
        "enter" | "return" => Key::Return,
        "tab" => Key::Tab,
        "space" => Key::Space,
        "escape" | "esc" => Key::Escape,
        "backspace" => Key::Backspace,
        _ => return None,
    };
    Some(key)
}

/// Sends keystrokes to the focused window through `enigo`.
pub struct EnigoInjector {
    enigo: Enigo,
}

impl EnigoInjector {
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| {
            TyperError::from(InjectionError::new(
                "connect to the input system",
                e.to_string(),
            ))
        })?;
        Ok(Self { enigo })
    }
}

impl KeystrokeInjector for EnigoInjector {
    fn press_key(&mut self, name: &str) -> std::result::Result<(), InjectionError> {
        let action = format!("press '{name}'");
        let key = named_key(name).ok_or_else(|| InjectionError::new(&action, "unsupported key"))?;
        self.enigo
            .key(key, Direction::Click)
            .map_err(|e| InjectionError::new(action, e.to_string()))
    }

    fn emit_character(&mut self, c: char) -> std::result::Result<(), InjectionError> {
        self.enigo
            .text(c.encode_utf8(&mut [0; 4]))
            .map_err(|e| InjectionError::new(format!("type {c:?}"), e.to_string()))
    }
}

/// Writes the typed stream to `W` instead of the OS.
///
/// Enter becomes `\n`, characters are written as UTF-8. The writer is flushed
/// after every action so a terminal shows the text at typing pace.
pub struct WriterInjector<W: Write> {
    writer: W,
}

impl<W: Write> WriterInjector<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write(&mut self, action: &str, text: &str) -> std::result::Result<(), InjectionError> {
        self.writer
            .write_all(text.as_bytes())
            .and_then(|()| self.writer.flush())
            .map_err(|e| InjectionError::new(action, e.to_string()))
    }
}

impl<W: Write> KeystrokeInjector for WriterInjector<W> {
    fn press_key(&mut self, name: &str) -> std::result::Result<(), InjectionError> {
        let action = format!("press '{name}'");
        let text = match named_key(name) {
            Some(Key::Return) => "\n",
            Some(Key::Tab) => "\t",
            Some(Key::Space) => " ",
            _ => return Err(InjectionError::new(action, "no textual form for this key")),
        };
        self.write(&action, text)
    }

    fn emit_character(&mut self, c: char) -> std::result::Result<(), InjectionError> {
        self.write(&format!("type {c:?}"), c.encode_utf8(&mut [0; 4]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newline_maps_to_enter() {
        assert_eq!(Keystroke::from('\n'), Keystroke::Enter);
        assert_eq!(Keystroke::from('a'), Keystroke::Char('a'));
        assert_eq!(Keystroke::from(' '), Keystroke::Char(' '));
    }

    #[test]
    fn test_writer_injector_output() {
        let mut injector = WriterInjector::new(Vec::new());
        for c in "ab\ncé".chars() {
            Keystroke::from(c).send(&mut injector).unwrap();
        }
        assert_eq!(injector.into_inner(), "ab\ncé".as_bytes());
    }

    #[test]
    fn test_writer_injector_rejects_unknown_key() {
        let mut injector = WriterInjector::new(Vec::new());
        let err = injector.press_key("f13").unwrap_err();
        assert_eq!(err.action, "press 'f13'");
        assert!(injector.get_ref().is_empty());
    }

    #[test]
    fn test_named_key_is_case_insensitive() {
        assert_eq!(named_key("Enter"), Some(Key::Return));
        assert_eq!(named_key("ESC"), Some(Key::Escape));
        assert_eq!(named_key("hyper"), None);
    }
}
