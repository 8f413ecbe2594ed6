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
*/

/// Definition of [Emulator] struct and related types.
use std::{collections::VecDeque, str::FromStr};

use anyhow::{anyhow, Error};
use marty_config::ConfigFileParams;
use marty_core::{
    device_traits::{DriveService, KeyboardService},
    device_types::d64::D64Image,
    keys::MartyKey,
    devices::{
        iec::IecBus,
        keyboard::C64Keyboard,
        vc1541::{GcrDisk, Vc1541},
    },
};
use marty_frontend_common::{
    disk_inspector::{DiskInspector, DiskInspectorPanel, InspectorEvent},
    keyboard_dialog::KeyboardDialog,
    keymap_store::{KeyMapPersistence, KeyMapStore},
};
use web_time::Duration;

// Disk id used when formatting a blank disk because no image was configured.
const BLANK_DISK_ID: [u8; 2] = *b"MC";

/// Define flags to be used by emulator.
#[derive(Default)]
pub struct EmuFlags {
    pub debug_keyboard: bool,
}

// Run statistics
#[derive(Default)]
pub struct Counter {
    pub updates: u64,
    pub keys_typed: u64,
    pub bits_spun: u64,
    pub refreshes: u64,
    pub track_redraws: u64,
    pub head_redraws: u64,
}

/// Define the main [Emulator] struct for this frontend.
/// All members are public so that a reference to this struct can be passed around as 'god' state.
pub struct Emulator {
    pub config: ConfigFileParams,
    pub drive: Vc1541,
    pub iec: IecBus,
    pub keyboard: C64Keyboard,
    pub keymap_store: KeyMapStore,
    pub inspector: Option<DiskInspectorPanel>,
    pub autotype: VecDeque<MartyKey>,
    pub held_key: Option<MartyKey>,
    pub flags: EmuFlags,
    pub stat_counter: Counter,
}

impl Emulator {
    pub fn new(config: ConfigFileParams) -> Self {
        let keymap_store = KeyMapStore::new(config.keyboard.keymap_file.clone());
        Self {
            flags: EmuFlags {
                debug_keyboard: config.emulator.debug_keyboard,
            },
            config,
            drive: Vc1541::new(),
            iec: IecBus::new(),
            keyboard: C64Keyboard::new(),
            keymap_store,
            inspector: None,
            autotype: VecDeque::new(),
            held_key: None,
            stat_counter: Counter::default(),
        }
    }

    /// Apply settings from configuration to the keyboard, drive and inspector.
    pub fn apply_config(&mut self) -> Result<(), Error> {
        log::debug!("Applying configuration to emulator state...");

        self.keyboard.set_debug(self.flags.debug_keyboard);
        self.load_keymap()?;
        self.autotype = self
            .config
            .keyboard
            .autotype
            .iter()
            .map(|name| MartyKey::from_str(name).map_err(|_| anyhow!("Unknown key name in autotype: {}", name)))
            .collect::<Result<_, _>>()?;
        self.mount_disk()?;

        if let Some(halftrack) = self.config.inspector.halftrack {
            self.drive.set_halftrack(halftrack);
        }

        if self.config.inspector.enabled {
            let inspector = DiskInspector::with_context_bits(self.config.inspector.context_bits);
            let interval = Duration::from_millis(self.config.inspector.refresh_ms);
            let mut panel = DiskInspectorPanel::open(inspector, interval, &self.drive, &self.iec);

            if self.config.inspector.mark_head {
                panel.handle_event(InspectorEvent::MarkHead(true), &mut self.drive, &self.iec);
            }
            log_track(&panel);
            self.inspector = Some(panel);
        }

        Ok(())
    }

    /// Load the saved key map, if any. With `reset_keymap` set, the standard key map is committed
    /// through the keyboard dialog instead, which also saves it.
    fn load_keymap(&mut self) -> Result<(), Error> {
        match self.keymap_store.load() {
            Ok(Some(key_map)) => self.keyboard.set_key_map(key_map),
            Ok(None) => log::debug!("No saved key map, using standard key map"),
            Err(e) => log::warn!("Ignoring unreadable key map: {:#}", e),
        }

        if self.config.keyboard.reset_keymap {
            let mut dialog = KeyboardDialog::load(&self.keyboard);
            dialog.reset_to_defaults();
            dialog.commit(&mut self.keyboard, &mut self.keymap_store)?;
            log::info!("Key map reset to defaults and saved to {}", self.keymap_store.path().display());
        }
        Ok(())
    }

    fn mount_disk(&mut self) -> Result<(), Error> {
        let image = match &self.config.media.d64 {
            Some(path) => {
                log::debug!("Loading disk image {}", path.display());
                D64Image::from_file(path)?
            }
            None => {
                log::debug!("No disk image configured, inserting a blank disk");
                D64Image::blank(BLANK_DISK_ID)
            }
        };

        let mut disk = GcrDisk::from_d64(&image)?;
        disk.set_write_protected(self.config.media.write_protect);
        self.drive.insert_disk(disk);
        Ok(())
    }

    /// Run the devices for `step` of emulated time and service the inspector.
    pub fn update(&mut self, step: Duration) {
        let bits = self.config.emulator.spin_bits_per_ms * step.as_millis() as usize;
        self.drive.spin(bits);
        self.stat_counter.updates += 1;
        self.stat_counter.bits_spun += bits as u64;
        self.type_next_key();

        if let Some(panel) = self.inspector.as_mut() {
            if let Some(report) = panel.update(step, &self.drive, &self.iec) {
                self.stat_counter.refreshes += 1;
                if report.track_redrawn {
                    self.stat_counter.track_redraws += 1;
                    log_track(panel);
                }
                if report.head_redrawn {
                    self.stat_counter.head_redraws += 1;
                    let head = panel.inspector().head();
                    log::trace!(
                        "Head at bit {} [{}] {} [{}]",
                        head.offset,
                        head.left,
                        head.value,
                        head.right
                    );
                }
            }
        }
    }

    /// Feed the autotype queue through the keyboard. Each key is held for one update and
    /// released on the next.
    fn type_next_key(&mut self) {
        if let Some(key) = self.held_key.take() {
            self.keyboard.key_up(key);
            return;
        }
        let Some(key) = self.autotype.pop_front()
        else {
            return;
        };

        if self.keyboard.key_down(key) {
            self.held_key = Some(key);
            self.stat_counter.keys_typed += 1;
        }
        else {
            log::warn!("Autotype key {} is not mapped to the C64 keyboard", key);
        }
        if self.flags.debug_keyboard {
            log::debug!("Matrix scan after {}: {:08b}", key, self.keyboard.scan(0x00));
        }
    }

    pub fn shutdown(&mut self) {
        if let Some(panel) = self.inspector.as_mut() {
            panel.close();
        }
        log::debug!(
            "Shutting down. Head at halftrack {}, bit {}",
            self.drive.halftrack(),
            self.drive.bit_offset()
        );
    }
}

fn log_track(panel: &DiskInspectorPanel) {
    let track = panel.inspector().track();
    log::info!("{}: {}", track.label, track.gcr_header);
}

#[cfg(test)]
mod tests {
    use super::*;
    use marty_core::{device_types::c64_key::C64Key, device_types::keymap::KeyMap};

    fn test_config(dir: &std::path::Path) -> ConfigFileParams {
        let mut config = ConfigFileParams::default();
        config.keyboard.keymap_file = dir.join("keymap.toml");
        config
    }

    #[test]
    fn blank_disk_is_inspected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.inspector.halftrack = Some(2);
        config.inspector.mark_head = true;

        let mut emu = Emulator::new(config);
        emu.apply_config().unwrap();
        assert!(emu.drive.has_disk());
        assert_eq!(emu.drive.halftrack(), 2);

        let panel = emu.inspector.as_ref().unwrap();
        assert_eq!(panel.inspector().track().label, "Track 1");
        assert!(panel.inspector().marker().is_some());

        // Three 20ms steps reach the 60ms refresh interval.
        for _ in 0..3 {
            emu.update(Duration::from_millis(20));
        }
        assert_eq!(emu.stat_counter.refreshes, 1);
        assert_eq!(emu.stat_counter.head_redraws, 1);
        assert_eq!(emu.stat_counter.track_redraws, 0);
        assert_eq!(emu.inspector.as_ref().unwrap().inspector().head().offset, 15000);

        emu.shutdown();
        emu.update(Duration::from_millis(100));
        assert_eq!(emu.stat_counter.refreshes, 1);
    }

    #[test]
    fn saved_key_map_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let mut custom = KeyMap::standard();
        custom.bind(MartyKey::F1, C64Key::SPACE);
        KeyMapStore::new(&config.keyboard.keymap_file).save(&custom).unwrap();

        let mut emu = Emulator::new(config);
        emu.apply_config().unwrap();
        assert_eq!(emu.keyboard.key_map(), &custom);
    }

    #[test]
    fn reset_keymap_saves_standard_map() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.keyboard.reset_keymap = true;
        let mut custom = KeyMap::new();
        custom.bind(MartyKey::KeyA, C64Key::SPACE);
        KeyMapStore::new(&config.keyboard.keymap_file).save(&custom).unwrap();

        let mut emu = Emulator::new(config);
        emu.apply_config().unwrap();
        assert_eq!(emu.keyboard.key_map(), &KeyMap::standard());
        assert_eq!(emu.keymap_store.load().unwrap(), Some(KeyMap::standard()));
    }

    #[test]
    fn autotype_presses_and_releases_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.emulator.debug_keyboard = true;
        config.keyboard.autotype = vec!["KeyA".to_string(), "Space".to_string()];

        let mut emu = Emulator::new(config);
        emu.apply_config().unwrap();
        assert_eq!(emu.autotype.len(), 2);

        emu.update(Duration::from_millis(20));
        assert_eq!(emu.held_key, Some(MartyKey::KeyA));
        assert_ne!(emu.keyboard.scan(0x00), 0xFF);

        emu.update(Duration::from_millis(20));
        assert_eq!(emu.keyboard.scan(0x00), 0xFF);

        emu.update(Duration::from_millis(20));
        let space = C64Key::SPACE;
        assert_eq!(emu.keyboard.scan(!(1u8 << space.col())), !(1u8 << space.row()));

        emu.update(Duration::from_millis(20));
        assert_eq!(emu.keyboard.scan(0x00), 0xFF);
        assert_eq!(emu.stat_counter.keys_typed, 2);
        assert!(emu.autotype.is_empty());
        assert_eq!(emu.held_key, None);
    }

    #[test]
    fn unknown_autotype_key_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.keyboard.autotype = vec!["NotAKey".to_string()];
        let mut emu = Emulator::new(config);
        assert!(emu.apply_config().is_err());
    }

    #[test]
    fn missing_disk_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.media.d64 = Some(dir.path().join("missing.d64"));
        let mut emu = Emulator::new(config);
        assert!(emu.apply_config().is_err());
    }
}
