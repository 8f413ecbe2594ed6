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

    frontend_common::keymap_store::mod.rs

    Persistence of host to C64 key mappings.
*/

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Error};
use marty_core::device_types::keymap::{KeyBinding, KeyMap};
use serde_derive::{Deserialize, Serialize};

pub const DEFAULT_KEYMAP_FILE: &str = "keymap.toml";

/// Something a KeyMap can be written to and read back from.
pub trait KeyMapPersistence {
    fn save(&mut self, key_map: &KeyMap) -> Result<(), Error>;
    /// Returns Ok(None) if no key map has been saved yet.
    fn load(&self) -> Result<Option<KeyMap>, Error>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct KeyMapFile {
    #[serde(default)]
    pub binding: Vec<KeyBinding>,
}

/// A key map stored as a TOML file of `[[binding]]` tables.
pub struct KeyMapStore {
    path: PathBuf,
}

impl KeyMapStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl KeyMapPersistence for KeyMapStore {
    fn save(&mut self, key_map: &KeyMap) -> Result<(), Error> {
        let file = KeyMapFile {
            binding: key_map.to_bindings(),
        };
        let toml_str = toml::to_string(&file).context("Failed to serialize key map")?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        // Write the whole file aside first so a failed write never leaves a truncated key map.
        let temp_path = self.temp_path();
        fs::write(&temp_path, toml_str).with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        log::debug!("Saved {} key bindings to {}", key_map.len(), self.path.display());
        Ok(())
    }

    fn load(&self) -> Result<Option<KeyMap>, Error> {
        let toml_str = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No key map file at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(anyhow!("Failed to read {}: {}", self.path.display(), e)),
        };

        let file: KeyMapFile =
            toml::from_str(&toml_str).with_context(|| format!("Failed to parse {}", self.path.display()))?;
        let key_map = KeyMap::from_bindings(&file.binding)?;

        log::debug!("Loaded {} key bindings from {}", key_map.len(), self.path.display());
        Ok(Some(key_map))
    }
}
