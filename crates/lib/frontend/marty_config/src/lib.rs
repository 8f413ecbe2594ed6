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

//! The `marty_config` crate parses the main configuration file of the MartyC64 front end and
//! overlays command line arguments on top of the configuration file settings.
//! We always consider command line arguments to take priority over the configuration file.
//!
//! Features:
//! - `use_bpaf`: Enable BPAF support for command line argument parsing.

mod bpaf_config;

use std::path::{Path, PathBuf};

#[cfg(feature = "use_bpaf")]
use bpaf_config::cli_args;
pub use bpaf_config::CmdLineArgs;

use anyhow::Context;
use cfg_if::cfg_if;
use serde_derive::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "martyc64.toml";

const fn _default_true() -> bool {
    true
}
const fn _default_run_ms() -> u64 {
    1000
}
const fn _default_update_hz() -> u32 {
    50
}
const fn _default_spin_bits_per_ms() -> usize {
    250
}
const fn _default_refresh_ms() -> u64 {
    60
}
const fn _default_context_bits() -> usize {
    10
}
fn _default_keymap_file() -> PathBuf {
    PathBuf::from("keymap.toml")
}

#[derive(Debug, Deserialize)]
pub struct Emulator {
    /// How long the headless front end runs before exiting.
    #[serde(default = "_default_run_ms")]
    pub run_ms: u64,
    #[serde(default = "_default_update_hz")]
    pub update_hz: u32,
    /// Bits passing under the drive head per millisecond of emulated time.
    #[serde(default = "_default_spin_bits_per_ms")]
    pub spin_bits_per_ms: usize,
    #[serde(default)]
    pub debug_keyboard: bool,
}

impl Default for Emulator {
    fn default() -> Self {
        Self {
            run_ms: _default_run_ms(),
            update_hz: _default_update_hz(),
            spin_bits_per_ms: _default_spin_bits_per_ms(),
            debug_keyboard: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Media {
    pub d64: Option<PathBuf>,
    #[serde(default)]
    pub write_protect: bool,
}

#[derive(Debug, Deserialize)]
pub struct Inspector {
    #[serde(default = "_default_true")]
    pub enabled: bool,
    #[serde(default = "_default_refresh_ms")]
    pub refresh_ms: u64,
    #[serde(default = "_default_context_bits")]
    pub context_bits: usize,
    pub halftrack: Option<usize>,
    #[serde(default)]
    pub mark_head: bool,
}

impl Default for Inspector {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_ms: _default_refresh_ms(),
            context_bits: _default_context_bits(),
            halftrack: None,
            mark_head: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Keyboard {
    #[serde(default = "_default_keymap_file")]
    pub keymap_file: PathBuf,
    /// Replace the saved key map with the standard one at startup.
    #[serde(default)]
    pub reset_keymap: bool,
    /// Host key names typed into the keyboard one per update after startup.
    #[serde(default)]
    pub autotype: Vec<String>,
}

impl Default for Keyboard {
    fn default() -> Self {
        Self {
            keymap_file:  _default_keymap_file(),
            reset_keymap: false,
            autotype:     Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFileParams {
    #[serde(default)]
    pub emulator: Emulator,
    #[serde(default)]
    pub media: Media,
    #[serde(default)]
    pub inspector: Inspector,
    #[serde(default)]
    pub keyboard: Keyboard,
}

impl ConfigFileParams {
    pub fn overlay(&mut self, shell_args: CmdLineArgs) {
        if let Some(d64) = shell_args.d64 {
            self.media.d64 = Some(d64);
        }
        if let Some(run_ms) = shell_args.run_ms {
            self.emulator.run_ms = run_ms;
        }
        if let Some(halftrack) = shell_args.halftrack {
            self.inspector.halftrack = Some(halftrack);
        }
        if let Some(keymap_file) = shell_args.keymap_file {
            self.keyboard.keymap_file = keymap_file;
        }
        if let Some(autotype) = shell_args.autotype {
            // Split comma-separated list of key names into vector of strings
            self.keyboard.autotype = autotype
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self.media.write_protect |= shell_args.write_protect;
        self.keyboard.reset_keymap |= shell_args.reset_keymap;
        self.inspector.mark_head |= shell_args.mark_head;
        self.emulator.debug_keyboard |= shell_args.debug_keyboard;
    }
}

pub fn read_config(toml_string: impl AsRef<str>, shell_args: CmdLineArgs) -> Result<ConfigFileParams, anyhow::Error> {
    let mut toml_args: ConfigFileParams = toml::from_str(toml_string.as_ref())?;

    // Command line arguments override config file arguments
    toml_args.overlay(shell_args);

    Ok(toml_args)
}

/// Read the TOML configuration from the path given by `config_file` if set, otherwise from
/// `default_path`, and overlay the given arguments.
pub fn read_config_path<P>(default_path: P, shell_args: CmdLineArgs) -> Result<ConfigFileParams, anyhow::Error>
where
    P: AsRef<Path>,
{
    let path = shell_args
        .config_file
        .clone()
        .unwrap_or_else(|| default_path.as_ref().to_path_buf());

    let toml_string =
        std::fs::read_to_string(&path).with_context(|| format!("Couldn't read config file {}", path.display()))?;

    read_config(toml_string, shell_args)
}

fn shell_args() -> CmdLineArgs {
    cfg_if! {
        if #[cfg(feature = "use_bpaf")] {
            log::debug!("Reading command line arguments...");
            cli_args().run()
        } else {
            log::debug!("Argument reading disabled...");
            CmdLineArgs::default()
        }
    }
}

/// Read the TOML configuration from a file path, parse and overlay command line arguments.
pub fn read_config_file<P>(default_path: P) -> Result<ConfigFileParams, anyhow::Error>
where
    P: AsRef<Path>,
{
    read_config_path(default_path, shell_args())
}

/// Read the TOML configuration from a string, parse and overlay command line arguments.
pub fn read_config_string(toml_string: impl AsRef<str>) -> Result<ConfigFileParams, anyhow::Error> {
    read_config(toml_string, shell_args())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = read_config("", CmdLineArgs::default()).unwrap();
        assert_eq!(config.emulator.run_ms, 1000);
        assert_eq!(config.emulator.update_hz, 50);
        assert_eq!(config.inspector.refresh_ms, 60);
        assert_eq!(config.inspector.context_bits, 10);
        assert!(config.inspector.enabled);
        assert_eq!(config.keyboard.keymap_file, PathBuf::from("keymap.toml"));
        assert!(config.media.d64.is_none());
    }

    #[test]
    fn file_values_are_read() {
        let toml_str = r#"
            [emulator]
            run_ms = 250
            [media]
            d64 = "games.d64"
            write_protect = true
            [inspector]
            refresh_ms = 100
            halftrack = 2
            [keyboard]
            keymap_file = "my_keys.toml"
            autotype = ["KeyA", "Space"]
        "#;
        let config = read_config(toml_str, CmdLineArgs::default()).unwrap();
        assert_eq!(config.emulator.run_ms, 250);
        assert_eq!(config.media.d64, Some(PathBuf::from("games.d64")));
        assert!(config.media.write_protect);
        assert_eq!(config.inspector.refresh_ms, 100);
        assert_eq!(config.inspector.halftrack, Some(2));
        assert_eq!(config.keyboard.keymap_file, PathBuf::from("my_keys.toml"));
        assert_eq!(config.keyboard.autotype, vec!["KeyA", "Space"]);
    }

    #[test]
    fn command_line_wins() {
        let toml_str = "[emulator]\nrun_ms = 250\n[inspector]\nhalftrack = 2\n";
        let args = CmdLineArgs {
            run_ms: Some(10),
            halftrack: Some(40),
            reset_keymap: true,
            mark_head: true,
            autotype: Some("KeyL, KeyO,,Enter".to_string()),
            ..Default::default()
        };
        let config = read_config(toml_str, args).unwrap();
        assert_eq!(config.keyboard.autotype, vec!["KeyL", "KeyO", "Enter"]);
        assert_eq!(config.emulator.run_ms, 10);
        assert_eq!(config.inspector.halftrack, Some(40));
        assert!(config.keyboard.reset_keymap);
        assert!(config.inspector.mark_head);
    }

    #[test]
    fn config_file_argument_overrides_default_path() {
        let dir = tempfile::tempdir().unwrap();
        let other = dir.path().join("other.toml");
        std::fs::write(&other, "[emulator]\nrun_ms = 5\n").unwrap();

        let args = CmdLineArgs {
            config_file: Some(other),
            ..Default::default()
        };
        let config = read_config_path(dir.path().join(DEFAULT_CONFIG_FILE), args).unwrap();
        assert_eq!(config.emulator.run_ms, 5);

        assert!(read_config_path(dir.path().join(DEFAULT_CONFIG_FILE), CmdLineArgs::default()).is_err());
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(read_config("[emulator]\nrun_ms = \"soon\"\n", CmdLineArgs::default()).is_err());
    }
}
