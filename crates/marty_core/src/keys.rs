/*
    MartyPC
    https://github.com/dbalsom/martypc

    Copyright 2022-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    keys.rs

    Defines the MartyKey enum, a frontend-independent host key identity based
    on the W3C naming convention for UI input events:

    https://w3c.github.io/uievents-code/#code-value-tables

    Frontends translate their native key events into MartyKey before handing
    them to the keyboard device or the keyboard remapping dialog.
*/

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter, EnumString, Display,
)]
pub enum MartyKey {
    // Alphanumeric section
    Backquote,
    Backslash,
    BracketLeft,
    BracketRight,
    Comma,
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    Equal,
    IntlBackslash,
    KeyA,
    KeyB,
    KeyC,
    KeyD,
    KeyE,
    KeyF,
    KeyG,
    KeyH,
    KeyI,
    KeyJ,
    KeyK,
    KeyL,
    KeyM,
    KeyN,
    KeyO,
    KeyP,
    KeyQ,
    KeyR,
    KeyS,
    KeyT,
    KeyU,
    KeyV,
    KeyW,
    KeyX,
    KeyY,
    KeyZ,
    Minus,
    Period,
    Quote,
    Semicolon,
    Slash,
    // Functional keys in the alphanumeric section
    AltLeft,
    AltRight,
    Backspace,
    CapsLock,
    ContextMenu,
    ControlLeft,
    ControlRight,
    Enter,
    SuperLeft,
    SuperRight,
    ShiftLeft,
    ShiftRight,
    Space,
    Tab,
    // Control pad section
    Delete,
    End,
    Help,
    Home,
    Insert,
    PageDown,
    PageUp,
    // Arrow pad section
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    // Numpad section
    NumLock,
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    NumpadAdd,
    NumpadDecimal,
    NumpadDivide,
    NumpadEnter,
    NumpadMultiply,
    NumpadSubtract,
    // Function section
    Escape,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    PrintScreen,
    ScrollLock,
    Pause,
}

/// Host modifier state as reported by a frontend's 'modifiers changed' event.
/// Modifier keys do not always produce discrete key events, so frontends
/// report the full flag set whenever it changes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyboardModifiers {
    pub shift:   bool,
    pub control: bool,
    pub alt:     bool,
    pub meta:    bool,
}

impl KeyboardModifiers {
    /// Return the first modifier that is active in `self` but was not active in `previous`,
    /// checked in the order shift, control, alt. The result is expressed as the left-hand key
    /// of the modifier pair.
    pub fn newly_pressed(&self, previous: &KeyboardModifiers) -> Option<MartyKey> {
        if self.shift && !previous.shift {
            Some(MartyKey::ShiftLeft)
        }
        else if self.control && !previous.control {
            Some(MartyKey::ControlLeft)
        }
        else if self.alt && !previous.alt {
            Some(MartyKey::AltLeft)
        }
        else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn key_names_round_trip_through_strings() {
        for key in MartyKey::iter() {
            let name = key.to_string();
            assert_eq!(MartyKey::from_str(&name).unwrap(), key);
        }
        assert_eq!(MartyKey::from_str("KeyA").unwrap(), MartyKey::KeyA);
        assert!(MartyKey::from_str("NotAKey").is_err());
    }

    #[test]
    fn newly_pressed_reports_only_transitions() {
        let none = KeyboardModifiers::default();
        let shift = KeyboardModifiers {
            shift: true,
            ..Default::default()
        };
        let shift_ctrl = KeyboardModifiers {
            shift: true,
            control: true,
            ..Default::default()
        };

        assert_eq!(shift.newly_pressed(&none), Some(MartyKey::ShiftLeft));
        assert_eq!(shift.newly_pressed(&shift), None);
        assert_eq!(shift_ctrl.newly_pressed(&shift), Some(MartyKey::ControlLeft));
        // Releasing a modifier is never a key press.
        assert_eq!(none.newly_pressed(&shift_ctrl), None);
    }
}
