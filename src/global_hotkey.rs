//! Global hotkey that stops a typing run from any window.
//!
//! While text is being typed the terminal does not have focus, so Ctrl-C is
//! not reachable. The stop hotkey is registered system-wide and calls
//! [`StopHandle::stop`] when pressed.

use crate::dispatcher::StopHandle;
use crate::error::{Result, TyperError};
use global_hotkey::hotkey::{Code, HotKey, Modifiers};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A registered system-wide stop hotkey. Unregistered on drop.
pub struct StopHotkey {
    manager: GlobalHotKeyManager,
    hotkey: HotKey,
    combo: String,
}

impl StopHotkey {
    pub fn register(combo: &str) -> Result<Self> {
        let hotkey = parse_hotkey(combo)?;
        let manager = GlobalHotKeyManager::new()
            .map_err(|e| TyperError::hotkey(format!("failed to create hotkey manager: {e}")))?;
        manager
            .register(hotkey)
            .map_err(|e| TyperError::hotkey(format!("failed to register '{combo}': {e}")))?;

        info!(hotkey = combo, "Stop hotkey registered");
        Ok(Self {
            manager,
            hotkey,
            combo: combo.to_string(),
        })
    }

    pub fn combo(&self) -> &str {
        &self.combo
    }

    /// Watch for presses of this hotkey and stop `handle` on the first one.
    ///
    /// The listener exits once `handle` is stopped by anyone, so callers
    /// should stop the handle when the run ends.
    pub fn spawn_listener(&self, handle: StopHandle) -> JoinHandle<()> {
        let id = self.hotkey.id();
        let receiver = GlobalHotKeyEvent::receiver();

        tokio::task::spawn_blocking(move || {
            while !handle.is_stopped() {
                if let Ok(event) = receiver.try_recv() {
                    if event.id == id && event.state == HotKeyState::Pressed {
                        info!("Stop hotkey pressed");
                        handle.stop();
                        break;
                    }
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            debug!("Stop hotkey listener exiting");
        })
    }
}

impl Drop for StopHotkey {
    fn drop(&mut self) {
        if let Err(e) = self.manager.unregister(self.hotkey) {
            warn!(hotkey = %self.combo, error = %e, "Failed to unregister stop hotkey");
        }
    }
}

/// Parse a combination such as `ctrl+alt+s` into a hotkey.
pub fn parse_hotkey(combo: &str) -> Result<HotKey> {
    let lowered = combo.to_lowercase();
    let mut modifiers = Modifiers::empty();
    let mut code = None;

    for part in lowered.split('+').map(str::trim) {
        match part {
            "ctrl" | "control" => modifiers |= Modifiers::CONTROL,
            "alt" | "option" => modifiers |= Modifiers::ALT,
            "shift" => modifiers |= Modifiers::SHIFT,
            "meta" | "cmd" | "super" => modifiers |= Modifiers::SUPER,
            "" => return Err(TyperError::hotkey(format!("empty key in '{combo}'"))),
            key if code.is_some() => {
                return Err(TyperError::hotkey(format!(
                    "'{combo}' names more than one key (extra '{key}')"
                )));
            }
            key => code = Some(parse_key_code(key)?),
        }
    }

    let code = code.ok_or_else(|| TyperError::hotkey(format!("no key in '{combo}'")))?;
    Ok(HotKey::new(Some(modifiers), code))
}

fn parse_key_code(key: &str) -> Result<Code> {
    let code = match key {
        "a" => Code::KeyA,
        "b" => Code::KeyB,
        "c" => Code::KeyC,
        "d" => Code::KeyD,
        "e" => Code::KeyE,
        "f" => Code::KeyF,
        "g" => Code::KeyG,
        "h" => Code::KeyH,
        "i" => Code::KeyI,
        "j" => Code::KeyJ,
        "k" => Code::KeyK,
        "l" => Code::KeyL,
        "m" => Code::KeyM,
        "n" => Code::KeyN,
        "o" => Code::KeyO,
        "p" => Code::KeyP,
        "q" => Code::KeyQ,
        "r" => Code::KeyR,
        "s" => Code::KeyS,
        "t" => Code::KeyT,
        "u" => Code::KeyU,
        "v" => Code::KeyV,
        "w" => Code::KeyW,
        "x" => Code::KeyX,
        "y" => Code::KeyY,
        "z" => Code::KeyZ,

        "0" => Code::Digit0,
        "1" => Code::Digit1,
        "2" => Code::Digit2,
        "3" => Code::Digit3,
        "4" => Code::Digit4,
        "5" => Code::Digit5,
        "6" => Code::Digit6,
        "7" => Code::Digit7,
        "8" => Code::Digit8,
        "9" => Code::Digit9,

        "f1" => Code::F1,
        "f2" => Code::F2,
        "f3" => Code::F3,
        "f4" => Code::F4,
        "f5" => Code::F5,
        "f6" => Code::F6,
        "f7" => Code::F7,
        "f8" => Code::F8,
        "f9" => Code::F9,
        "f10" => Code::F10,
        "f11" => Code::F11,
        "f12" => Code::F12,

        "space" => Code::Space,
        "enter" | "return" => Code::Enter,
        "tab" => Code::Tab,
        "escape" | "esc" => Code::Escape,
        "backspace" => Code::Backspace,
        "delete" => Code::Delete,
        "insert" => Code::Insert,
        "home" => Code::Home,
        "end" => Code::End,
        "pageup" => Code::PageUp,
        "pagedown" => Code::PageDown,
        "pause" => Code::Pause,

        "up" | "arrowup" => Code::ArrowUp,
        "down" | "arrowdown" => Code::ArrowDown,
        "left" | "arrowleft" => Code::ArrowLeft,
        "right" | "arrowright" => Code::ArrowRight,

        _ => return Err(TyperError::hotkey(format!("unsupported key '{key}'"))),
    };
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_combo() {
        let hotkey = parse_hotkey("ctrl+alt+s").unwrap();
        let expected = HotKey::new(Some(Modifiers::CONTROL | Modifiers::ALT), Code::KeyS);
        assert_eq!(hotkey, expected);
    }

    #[test]
    fn test_parse_is_case_and_space_insensitive() {
        assert_eq!(
            parse_hotkey(" Ctrl + Shift + F9 ").unwrap(),
            HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::F9)
        );
        assert_eq!(
            parse_hotkey("alt+7").unwrap(),
            HotKey::new(Some(Modifiers::ALT), Code::Digit7)
        );
    }

    #[test]
    fn test_parse_rejects_bad_combos() {
        assert!(parse_hotkey("").is_err());
        assert!(parse_hotkey("ctrl+alt").is_err());
        assert!(parse_hotkey("ctrl+a+b").is_err());
        assert!(parse_hotkey("ctrl+f13").is_err());
        assert!(parse_hotkey("ctrl++s").is_err());
        assert!(matches!(parse_hotkey("hyper+q"), Err(TyperError::Hotkey(_))));
    }

    #[test]
    fn test_parse_navigation_keys() {
        assert_eq!(
            parse_hotkey("ctrl+tab").unwrap(),
            HotKey::new(Some(Modifiers::CONTROL), Code::Tab)
        );
        assert_eq!(
            parse_hotkey("alt+pagedown").unwrap(),
            HotKey::new(Some(Modifiers::ALT), Code::PageDown)
        );
        assert_eq!(
            parse_hotkey("ctrl+shift+left").unwrap(),
            HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::ArrowLeft)
        );
        assert_eq!(
            parse_hotkey("super+arrowup").unwrap(),
            parse_hotkey("super+up").unwrap()
        );
    }
}
