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

    devices::keyboard.rs

    The C64 keyboard. Host key events are translated through the active
    KeyMap into the 8x8 key matrix scanned by CIA1.
*/

use crate::{
    device_traits::KeyboardService,
    device_types::{c64_key::MATRIX_COLS, keymap::KeyMap},
    keys::MartyKey,
};

pub struct C64Keyboard {
    key_map: KeyMap,
    // cols[c] has bit r set while the key at (row r, col c) is held.
    cols: [u8; MATRIX_COLS],
    debug: bool,
}

impl Default for C64Keyboard {
    fn default() -> Self {
        Self {
            key_map: KeyMap::standard(),
            cols: [0; MATRIX_COLS],
            debug: false,
        }
    }
}

impl C64Keyboard {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set_debug(&mut self, state: bool) {
        self.debug = state;
    }

    /// Press the C64 key bound to `host`. Returns false if the host key is unmapped.
    pub fn key_down(&mut self, host: MartyKey) -> bool {
        self.set_host_key(host, true)
    }

    pub fn key_up(&mut self, host: MartyKey) -> bool {
        self.set_host_key(host, false)
    }

    fn set_host_key(&mut self, host: MartyKey, pressed: bool) -> bool {
        match self.key_map.get(host) {
            Some(key) => {
                let bit = 1u8 << key.row();
                if pressed {
                    self.cols[key.col()] |= bit;
                }
                else {
                    self.cols[key.col()] &= !bit;
                }
                if self.debug {
                    log::debug!("Host key {} -> {} pressed: {}", host, key, pressed);
                }
                true
            }
            None => {
                if self.debug {
                    log::debug!("Host key {} is not mapped", host);
                }
                false
            }
        }
    }

    /// Scan the matrix with the column mask written to CIA1 port A. Selection is
    /// active low, and so is the returned row data.
    pub fn scan(&self, col_mask: u8) -> u8 {
        let pressed = self
            .cols
            .iter()
            .enumerate()
            .filter(|(col, _)| col_mask & (1u8 << *col) == 0)
            .fold(0u8, |acc, (_, rows)| acc | rows);
        !pressed
    }

    pub fn release_all(&mut self) {
        self.cols = [0; MATRIX_COLS];
    }
}

impl KeyboardService for C64Keyboard {
    fn key_map(&self) -> &KeyMap {
        &self.key_map
    }

    fn set_key_map(&mut self, key_map: KeyMap) {
        // Held keys were resolved through the old map.
        self.release_all();
        self.key_map = key_map;
        log::debug!("Keyboard map updated: {} bindings", self.key_map.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_types::c64_key::C64Key;

    #[test]
    fn no_keys_scan_high() {
        let kbd = C64Keyboard::new();
        assert_eq!(kbd.scan(0x00), 0xFF);
    }

    #[test]
    fn mapped_key_appears_in_selected_column() {
        let mut kbd = C64Keyboard::new();
        // KeyW is the W key at row 1, col 1.
        assert!(kbd.key_down(MartyKey::KeyW));
        assert_eq!(kbd.scan(!0x02), !0x02);
        assert_eq!(kbd.scan(!0x01), 0xFF);
        assert!(kbd.key_up(MartyKey::KeyW));
        assert_eq!(kbd.scan(0x00), 0xFF);
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        let mut kbd = C64Keyboard::new();
        assert!(!kbd.key_down(MartyKey::F12));
        assert_eq!(kbd.scan(0x00), 0xFF);
    }

    #[test]
    fn replacing_map_releases_keys() {
        let mut kbd = C64Keyboard::new();
        kbd.key_down(MartyKey::Space);
        assert_ne!(kbd.scan(0x00), 0xFF);

        let mut key_map = KeyMap::new();
        key_map.bind(MartyKey::KeyA, C64Key::SPACE);
        kbd.set_key_map(key_map.clone());
        assert_eq!(kbd.scan(0x00), 0xFF);
        assert_eq!(kbd.key_map(), &key_map);
        assert!(!kbd.key_down(MartyKey::Space));
        assert!(kbd.key_down(MartyKey::KeyA));
    }
}
