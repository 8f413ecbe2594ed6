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

    frontend_common::keyboard_dialog::mod.rs

    State for a keyboard remapping dialog. The dialog edits a private copy of
    the active key map; the user selects a key on the C64 matrix, then presses
    a host key to bind to it. The result is either committed to the keyboard
    and saved, or discarded.
*/

use std::fmt::{self, Display};

use crate::keymap_store::KeyMapPersistence;
use marty_core::{
    device_traits::KeyboardService,
    device_types::{
        c64_key::{C64Key, MATRIX_COLS, MATRIX_ROWS},
        keymap::KeyMap,
    },
    keys::{KeyboardModifiers, MartyKey},
};

#[derive(Debug, thiserror::Error)]
pub enum KeyboardDialogError {
    #[error("The keyboard dialog has already been closed.")]
    Closed,
    #[error("Failed to save key map: {0}")]
    SaveFailed(anyhow::Error),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DialogState {
    Open,
    Committed,
    Cancelled,
}

/// Input delivered to the dialog while it has keyboard focus.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DialogInput {
    KeyPress(MartyKey),
    ModifierChange(KeyboardModifiers),
    Escape,
}

impl DialogInput {
    pub fn from_key(key: MartyKey) -> Self {
        match key {
            MartyKey::Escape => DialogInput::Escape,
            _ => DialogInput::KeyPress(key),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RecordOutcome {
    Ignored,
    Bound {
        host: MartyKey,
        key: C64Key,
        displaced: Option<MartyKey>,
    },
    Cancelled,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MatrixCell {
    pub key:  C64Key,
    pub host: Option<MartyKey>,
}

impl MatrixCell {
    pub fn label(&self) -> &'static str {
        self.key.label()
    }
}

impl Display for MatrixCell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.host {
            Some(host) => write!(f, "{} ({})", self.key.label(), host),
            None => write!(f, "{}", self.key.label()),
        }
    }
}

pub type MatrixView = [[MatrixCell; MATRIX_COLS]; MATRIX_ROWS];

fn build_matrix(key_map: &KeyMap) -> MatrixView {
    let mut matrix = [[MatrixCell {
        key:  C64Key::DELETE,
        host: None,
    }; MATRIX_COLS]; MATRIX_ROWS];
    for key in C64Key::iter() {
        matrix[key.row()][key.col()] = MatrixCell {
            key,
            host: key_map.host_for(key),
        };
    }
    matrix
}

pub struct KeyboardDialog {
    key_map: KeyMap,
    matrix: MatrixView,
    selected: Option<C64Key>,
    modifiers: KeyboardModifiers,
    state: DialogState,
}

impl KeyboardDialog {
    /// Open the dialog on a copy of the keyboard's active key map.
    pub fn load<K: KeyboardService + ?Sized>(keyboard: &K) -> Self {
        let key_map = keyboard.key_map().clone();
        log::debug!("Keyboard dialog opened with {} bindings", key_map.len());
        Self {
            matrix: build_matrix(&key_map),
            key_map,
            selected: None,
            modifiers: KeyboardModifiers::default(),
            state: DialogState::Open,
        }
    }

    pub fn state(&self) -> DialogState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DialogState::Open
    }

    pub fn key_map(&self) -> &KeyMap {
        &self.key_map
    }

    pub fn matrix_view(&self) -> &MatrixView {
        &self.matrix
    }

    pub fn selected_key(&self) -> Option<C64Key> {
        self.selected
    }

    /// The info panel describes the selected key, so it is only shown when there is one.
    pub fn info_visible(&self) -> bool {
        self.selected.is_some()
    }

    /// The host key currently bound to the selected key.
    pub fn selected_host(&self) -> Option<MartyKey> {
        self.selected.and_then(|key| self.key_map.host_for(key))
    }

    fn check_open(&self, op: &str) -> bool {
        if !self.is_open() {
            log::warn!("Keyboard dialog is {:?}, ignoring {}", self.state, op);
        }
        self.is_open()
    }

    pub fn select_key(&mut self, key: C64Key) {
        if !self.check_open("select_key()") {
            return;
        }
        log::debug!("Selected C64 key {}", key);
        self.selected = Some(key);
    }

    /// Record a host input for the selected key.
    pub fn record(&mut self, input: DialogInput) -> RecordOutcome {
        if !self.check_open("record()") {
            return RecordOutcome::Ignored;
        }

        let input = match input {
            DialogInput::KeyPress(key) => DialogInput::from_key(key),
            other => other,
        };

        match input {
            DialogInput::Escape => {
                self.cancel();
                RecordOutcome::Cancelled
            }
            DialogInput::ModifierChange(modifiers) => {
                let pressed = modifiers.newly_pressed(&self.modifiers);
                self.modifiers = modifiers;
                match pressed {
                    Some(host) => self.bind_selected(host),
                    None => RecordOutcome::Ignored,
                }
            }
            DialogInput::KeyPress(host) => self.bind_selected(host),
        }
    }

    fn bind_selected(&mut self, host: MartyKey) -> RecordOutcome {
        let Some(key) = self.selected
        else {
            return RecordOutcome::Ignored;
        };

        let displaced = self.key_map.bind(host, key);
        self.matrix = build_matrix(&self.key_map);
        log::debug!("Bound {} to C64 key {} (displaced: {:?})", host, key, displaced);

        RecordOutcome::Bound { host, key, displaced }
    }

    pub fn reset_to_defaults(&mut self) {
        if !self.check_open("reset_to_defaults()") {
            return;
        }
        self.key_map = KeyMap::standard();
        self.matrix = build_matrix(&self.key_map);
        log::debug!("Keyboard dialog reset to standard key map");
    }

    /// Apply the edited key map to the keyboard, then save it. The keyboard keeps the new
    /// map even if saving fails.
    pub fn commit<K, P>(&mut self, keyboard: &mut K, store: &mut P) -> Result<(), KeyboardDialogError>
    where
        K: KeyboardService + ?Sized,
        P: KeyMapPersistence + ?Sized,
    {
        if !self.check_open("commit()") {
            return Err(KeyboardDialogError::Closed);
        }

        keyboard.set_key_map(self.key_map.clone());
        self.state = DialogState::Committed;
        self.selected = None;

        store.save(&self.key_map).map_err(|e| {
            log::error!("Failed to save key map: {}", e);
            KeyboardDialogError::SaveFailed(e)
        })?;

        log::debug!("Keyboard dialog committed {} bindings", self.key_map.len());
        Ok(())
    }

    /// Discard all edits and close the dialog.
    pub fn cancel(&mut self) {
        if !self.check_open("cancel()") {
            return;
        }
        self.state = DialogState::Cancelled;
        self.selected = None;
        log::debug!("Keyboard dialog cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use marty_core::devices::keyboard::C64Keyboard;

    #[derive(Default)]
    struct MemoryStore {
        saved: Option<KeyMap>,
        fail:  bool,
    }

    impl KeyMapPersistence for MemoryStore {
        fn save(&mut self, key_map: &KeyMap) -> Result<(), anyhow::Error> {
            if self.fail {
                return Err(anyhow!("disk full"));
            }
            self.saved = Some(key_map.clone());
            Ok(())
        }

        fn load(&self) -> Result<Option<KeyMap>, anyhow::Error> {
            Ok(self.saved.clone())
        }
    }

    fn c64_k() -> C64Key {
        KeyMap::standard().get(MartyKey::KeyK).unwrap()
    }

    #[test]
    fn record_rebinds_selected_key() {
        let keyboard = C64Keyboard::new();
        let mut dialog = KeyboardDialog::load(&keyboard);
        let k = c64_k();

        dialog.select_key(k);
        assert!(dialog.info_visible());
        assert_eq!(dialog.selected_host(), Some(MartyKey::KeyK));

        let outcome = dialog.record(DialogInput::KeyPress(MartyKey::KeyP));
        assert_eq!(
            outcome,
            RecordOutcome::Bound {
                host: MartyKey::KeyP,
                key: k,
                displaced: Some(MartyKey::KeyK),
            }
        );
        assert_eq!(dialog.key_map().get(MartyKey::KeyP), Some(k));
        assert_eq!(dialog.key_map().get(MartyKey::KeyK), None);

        dialog.select_key(k);
        dialog.record(DialogInput::KeyPress(MartyKey::KeyQ));
        assert_eq!(dialog.key_map().get(MartyKey::KeyQ), Some(k));
        assert_eq!(dialog.key_map().get(MartyKey::KeyP), None);
        assert!(dialog.key_map().is_one_to_one());

        let cell = dialog.matrix_view()[k.row()][k.col()];
        assert_eq!(cell.host, Some(MartyKey::KeyQ));
        assert_eq!(cell.to_string(), format!("{} (KeyQ)", k.label()));
    }

    #[test]
    fn mapping_stays_one_to_one() {
        let keyboard = C64Keyboard::new();
        let mut dialog = KeyboardDialog::load(&keyboard);
        let hosts = [MartyKey::KeyA, MartyKey::Digit1, MartyKey::KeyA, MartyKey::Space, MartyKey::F1];
        for (key, host) in C64Key::iter().step_by(7).zip(hosts.iter().cycle()) {
            dialog.select_key(key);
            dialog.record(DialogInput::KeyPress(*host));
            assert!(dialog.key_map().is_one_to_one());
        }
    }

    #[test]
    fn keypress_without_selection_is_ignored() {
        let keyboard = C64Keyboard::new();
        let mut dialog = KeyboardDialog::load(&keyboard);
        assert!(!dialog.info_visible());
        assert_eq!(dialog.record(DialogInput::KeyPress(MartyKey::KeyP)), RecordOutcome::Ignored);
        assert_eq!(dialog.key_map(), keyboard.key_map());
    }

    #[test]
    fn escape_cancels() {
        let keyboard = C64Keyboard::new();
        let mut dialog = KeyboardDialog::load(&keyboard);
        dialog.select_key(C64Key::SPACE);
        assert_eq!(dialog.record(DialogInput::from_key(MartyKey::Escape)), RecordOutcome::Cancelled);
        assert_eq!(dialog.state(), DialogState::Cancelled);
        assert!(!dialog.info_visible());

        // Escape without a selection also closes the dialog.
        let mut dialog = KeyboardDialog::load(&keyboard);
        assert_eq!(dialog.record(DialogInput::KeyPress(MartyKey::Escape)), RecordOutcome::Cancelled);
        assert!(!dialog.is_open());
    }

    #[test]
    fn modifier_press_binds_left_modifier() {
        let keyboard = C64Keyboard::new();
        let mut dialog = KeyboardDialog::load(&keyboard);
        dialog.select_key(C64Key::SPACE);

        let shift = KeyboardModifiers {
            shift: true,
            ..Default::default()
        };
        let outcome = dialog.record(DialogInput::ModifierChange(shift));
        assert!(matches!(outcome, RecordOutcome::Bound { host: MartyKey::ShiftLeft, .. }));
        assert_eq!(dialog.key_map().get(MartyKey::ShiftLeft), Some(C64Key::SPACE));

        // Releasing is not a key press.
        let released = KeyboardModifiers::default();
        assert_eq!(dialog.record(DialogInput::ModifierChange(released)), RecordOutcome::Ignored);

        let shift_alt = KeyboardModifiers {
            shift: true,
            alt: true,
            ..Default::default()
        };
        dialog.record(DialogInput::ModifierChange(shift));
        let outcome = dialog.record(DialogInput::ModifierChange(shift_alt));
        assert!(matches!(outcome, RecordOutcome::Bound { host: MartyKey::AltLeft, .. }));
    }

    #[test]
    fn commit_applies_and_saves() {
        let mut keyboard = C64Keyboard::new();
        let mut store = MemoryStore::default();
        let mut dialog = KeyboardDialog::load(&keyboard);
        dialog.select_key(C64Key::SPACE);
        dialog.record(DialogInput::KeyPress(MartyKey::Enter));

        dialog.commit(&mut keyboard, &mut store).unwrap();
        assert_eq!(dialog.state(), DialogState::Committed);
        assert_eq!(dialog.selected_key(), None);
        assert!(!dialog.info_visible());
        assert_eq!(keyboard.key_map().get(MartyKey::Enter), Some(C64Key::SPACE));
        assert_eq!(store.load().unwrap().as_ref(), Some(keyboard.key_map()));

        // A closed dialog does nothing.
        assert!(matches!(
            dialog.commit(&mut keyboard, &mut store),
            Err(KeyboardDialogError::Closed)
        ));
        dialog.reset_to_defaults();
        assert_eq!(dialog.record(DialogInput::KeyPress(MartyKey::KeyA)), RecordOutcome::Ignored);
    }

    #[test]
    fn failed_save_keeps_keyboard_map() {
        let mut keyboard = C64Keyboard::new();
        let mut store = MemoryStore {
            fail: true,
            ..Default::default()
        };
        let mut dialog = KeyboardDialog::load(&keyboard);
        dialog.select_key(C64Key::SPACE);
        dialog.record(DialogInput::KeyPress(MartyKey::Enter));

        let result = dialog.commit(&mut keyboard, &mut store);
        assert!(matches!(result, Err(KeyboardDialogError::SaveFailed(_))));
        assert_eq!(keyboard.key_map().get(MartyKey::Enter), Some(C64Key::SPACE));
        assert!(store.saved.is_none());
    }

    #[test]
    fn cancel_leaves_keyboard_unchanged() {
        let keyboard = C64Keyboard::new();
        let before = keyboard.key_map().clone();
        let mut dialog = KeyboardDialog::load(&keyboard);
        dialog.select_key(C64Key::RETURN);
        dialog.record(DialogInput::KeyPress(MartyKey::KeyZ));
        dialog.reset_to_defaults();
        dialog.record(DialogInput::KeyPress(MartyKey::KeyX));
        dialog.cancel();

        assert_eq!(dialog.state(), DialogState::Cancelled);
        assert_eq!(keyboard.key_map(), &before);
    }

    #[test]
    fn reset_restores_standard_map() {
        let mut keyboard = C64Keyboard::new();
        let mut custom = KeyMap::new();
        custom.bind(MartyKey::KeyA, C64Key::SPACE);
        keyboard.set_key_map(custom);

        let mut dialog = KeyboardDialog::load(&keyboard);
        assert_eq!(dialog.matrix_view()[C64Key::RETURN.row()][C64Key::RETURN.col()].host, None);
        dialog.reset_to_defaults();
        assert_eq!(dialog.key_map(), &KeyMap::standard());
        assert!(dialog.matrix_view().iter().flatten().all(|cell| cell.host.is_some()));
    }
}
