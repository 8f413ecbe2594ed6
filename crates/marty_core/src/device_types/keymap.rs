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

    device_types::keymap.rs

    Mapping of host keys (MartyKey) to keys of the emulated C64 keyboard.

    A KeyMap is one-to-one: a host key maps to at most one C64 key, and a C64
    key is triggered by at most one host key. bind() maintains this by
    removing any previous binding of the target C64 key.
*/

use std::collections::BTreeMap;

use crate::{device_types::c64_key::C64Key, keys::MartyKey};
use serde_derive::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum KeyMapError {
    #[error("Binding for host key {host} has invalid matrix position ({row},{col})")]
    InvalidMatrixPosition { host: MartyKey, row: u8, col: u8 },
}

/// The persisted form of a single keymap entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub host: MartyKey,
    pub row:  u8,
    pub col:  u8,
}

// Positional layout: each C64 key is placed on the host key in the same spot.
const STANDARD_BINDINGS: [(MartyKey, u8, u8); 64] = [
    (MartyKey::Backspace, 0, 0),
    (MartyKey::Digit3, 0, 1),
    (MartyKey::Digit5, 0, 2),
    (MartyKey::Digit7, 0, 3),
    (MartyKey::Digit9, 0, 4),
    (MartyKey::Minus, 0, 5),
    (MartyKey::Insert, 0, 6),
    (MartyKey::Digit1, 0, 7),
    (MartyKey::Enter, 1, 0),
    (MartyKey::KeyW, 1, 1),
    (MartyKey::KeyR, 1, 2),
    (MartyKey::KeyY, 1, 3),
    (MartyKey::KeyI, 1, 4),
    (MartyKey::KeyP, 1, 5),
    (MartyKey::BracketRight, 1, 6),
    (MartyKey::Backquote, 1, 7),
    (MartyKey::ArrowRight, 2, 0),
    (MartyKey::KeyA, 2, 1),
    (MartyKey::KeyD, 2, 2),
    (MartyKey::KeyG, 2, 3),
    (MartyKey::KeyJ, 2, 4),
    (MartyKey::KeyL, 2, 5),
    (MartyKey::Quote, 2, 6),
    (MartyKey::ControlLeft, 2, 7),
    (MartyKey::F7, 3, 0),
    (MartyKey::Digit4, 3, 1),
    (MartyKey::Digit6, 3, 2),
    (MartyKey::Digit8, 3, 3),
    (MartyKey::Digit0, 3, 4),
    (MartyKey::Equal, 3, 5),
    (MartyKey::Home, 3, 6),
    (MartyKey::Digit2, 3, 7),
    (MartyKey::F1, 4, 0),
    (MartyKey::KeyZ, 4, 1),
    (MartyKey::KeyC, 4, 2),
    (MartyKey::KeyB, 4, 3),
    (MartyKey::KeyM, 4, 4),
    (MartyKey::Period, 4, 5),
    (MartyKey::ShiftRight, 4, 6),
    (MartyKey::Space, 4, 7),
    (MartyKey::F3, 5, 0),
    (MartyKey::KeyS, 5, 1),
    (MartyKey::KeyF, 5, 2),
    (MartyKey::KeyH, 5, 3),
    (MartyKey::KeyK, 5, 4),
    (MartyKey::Semicolon, 5, 5),
    (MartyKey::Backslash, 5, 6),
    (MartyKey::Tab, 5, 7),
    (MartyKey::F5, 6, 0),
    (MartyKey::KeyE, 6, 1),
    (MartyKey::KeyT, 6, 2),
    (MartyKey::KeyU, 6, 3),
    (MartyKey::KeyO, 6, 4),
    (MartyKey::BracketLeft, 6, 5),
    (MartyKey::Delete, 6, 6),
    (MartyKey::KeyQ, 6, 7),
    (MartyKey::ArrowDown, 7, 0),
    (MartyKey::ShiftLeft, 7, 1),
    (MartyKey::KeyX, 7, 2),
    (MartyKey::KeyV, 7, 3),
    (MartyKey::KeyN, 7, 4),
    (MartyKey::Comma, 7, 5),
    (MartyKey::Slash, 7, 6),
    (MartyKey::Escape, 7, 7),
];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyMap {
    map: BTreeMap<MartyKey, C64Key>,
}

impl KeyMap {
    pub fn new() -> Self {
        Default::default()
    }

    /// The built-in positional mapping.
    pub fn standard() -> Self {
        let mut keymap = KeyMap::new();
        for (host, row, col) in STANDARD_BINDINGS {
            if let Some(key) = C64Key::new(row as usize, col as usize) {
                keymap.bind(host, key);
            }
        }
        keymap
    }

    pub fn get(&self, host: MartyKey) -> Option<C64Key> {
        self.map.get(&host).copied()
    }

    /// Return the host key currently bound to `key`, if any.
    pub fn host_for(&self, key: C64Key) -> Option<MartyKey> {
        self.map.iter().find(|(_, k)| **k == key).map(|(host, _)| *host)
    }

    /// Bind `host` to `key`. Any other host key bound to `key` is unbound first, and any
    /// previous binding of `host` is replaced. Returns the host key that was displaced from
    /// `key`, if it differs from `host`.
    pub fn bind(&mut self, host: MartyKey, key: C64Key) -> Option<MartyKey> {
        let displaced = self.host_for(key).filter(|previous| *previous != host);
        self.map.retain(|_, bound| *bound != key);
        self.map.insert(host, key);
        displaced
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MartyKey, C64Key)> + '_ {
        self.map.iter().map(|(host, key)| (*host, *key))
    }

    /// Returns true if no two host keys map to the same C64 key.
    pub fn is_one_to_one(&self) -> bool {
        let mut seen = std::collections::BTreeSet::new();
        self.map.values().all(|key| seen.insert(*key))
    }

    pub fn to_bindings(&self) -> Vec<KeyBinding> {
        self.iter()
            .map(|(host, key)| KeyBinding {
                host,
                row: key.row() as u8,
                col: key.col() as u8,
            })
            .collect()
    }

    /// Build a KeyMap from persisted bindings. Entries are applied in order, so if two
    /// bindings target the same C64 key, the later one wins.
    pub fn from_bindings(bindings: &[KeyBinding]) -> Result<Self, KeyMapError> {
        let mut keymap = KeyMap::new();
        for binding in bindings {
            let key = C64Key::new(binding.row as usize, binding.col as usize).ok_or(
                KeyMapError::InvalidMatrixPosition {
                    host: binding.host,
                    row:  binding.row,
                    col:  binding.col,
                },
            )?;
            if let Some(displaced) = keymap.bind(binding.host, key) {
                log::warn!(
                    "Keymap binding {} -> {} replaces earlier binding from {}",
                    binding.host,
                    key,
                    displaced
                );
            }
        }
        Ok(keymap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_map_is_complete_and_one_to_one() {
        let keymap = KeyMap::standard();
        assert_eq!(keymap.len(), 64);
        assert!(keymap.is_one_to_one());
        for key in C64Key::iter() {
            assert!(keymap.host_for(key).is_some(), "{} is unbound", key);
        }
        assert_eq!(keymap.get(MartyKey::Space), Some(C64Key::SPACE));
        assert_eq!(keymap.get(MartyKey::Escape), Some(C64Key::RUN_STOP));
    }

    #[test]
    fn bind_moves_key_to_new_host() {
        let k = C64Key::new(2, 1).unwrap();
        let mut keymap = KeyMap::new();

        assert_eq!(keymap.bind(MartyKey::KeyP, k), None);
        assert_eq!(keymap.get(MartyKey::KeyP), Some(k));

        assert_eq!(keymap.bind(MartyKey::KeyQ, k), Some(MartyKey::KeyP));
        assert_eq!(keymap.get(MartyKey::KeyP), None);
        assert_eq!(keymap.get(MartyKey::KeyQ), Some(k));
        assert_eq!(keymap.len(), 1);
    }

    #[test]
    fn bind_overwrites_previous_key_of_host() {
        let a = C64Key::new(2, 1).unwrap();
        let b = C64Key::new(4, 3).unwrap();
        let mut keymap = KeyMap::new();
        keymap.bind(MartyKey::KeyA, a);
        keymap.bind(MartyKey::KeyA, b);
        assert_eq!(keymap.get(MartyKey::KeyA), Some(b));
        assert_eq!(keymap.host_for(a), None);
        // Rebinding the same pair displaces nothing.
        assert_eq!(keymap.bind(MartyKey::KeyA, b), None);
    }

    #[test]
    fn from_bindings_rejects_out_of_range_positions() {
        let bindings = vec![KeyBinding {
            host: MartyKey::KeyA,
            row:  8,
            col:  0,
        }];
        assert!(matches!(
            KeyMap::from_bindings(&bindings),
            Err(KeyMapError::InvalidMatrixPosition { row: 8, .. })
        ));
    }

    #[test]
    fn from_bindings_keeps_last_duplicate() {
        let bindings = vec![
            KeyBinding {
                host: MartyKey::KeyA,
                row:  2,
                col:  1,
            },
            KeyBinding {
                host: MartyKey::KeyB,
                row:  2,
                col:  1,
            },
        ];
        let keymap = KeyMap::from_bindings(&bindings).unwrap();
        assert_eq!(keymap.len(), 1);
        assert_eq!(keymap.get(MartyKey::KeyB), C64Key::new(2, 1));
        assert_eq!(keymap.to_bindings(), vec![bindings[1].clone()]);
    }
}
