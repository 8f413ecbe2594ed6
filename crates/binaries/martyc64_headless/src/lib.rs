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

//! MartyC64 headless front-end main library component.

#![forbid(unsafe_code)]

mod emulator;

use marty_config::DEFAULT_CONFIG_FILE;
use marty_frontend_common::timestep_manager::TimestepManager;
use web_time::Duration;

use crate::emulator::Emulator;

pub use crate::emulator::Counter;

// How long the headless loop yields between window manager updates.
const WM_UPDATE_INTERVAL: Duration = Duration::from_millis(5);

pub fn run() {
    env_logger::init();

    // First we resolve the emulator configuration by parsing the configuration toml and merging it with
    // command line arguments.
    let config = match marty_config::read_config_file(DEFAULT_CONFIG_FILE) {
        Ok(config) => config,
        Err(e) => match e.root_cause().downcast_ref::<std::io::Error>() {
            Some(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                eprintln!(
                    "Configuration file not found! Please create {} in the emulator directory \
                               or provide the path to configuration file with --configfile.",
                    DEFAULT_CONFIG_FILE
                );
                std::process::exit(1);
            }
            Some(_) => {
                eprintln!("Unknown IO error reading configuration file:\n{:#}", e);
                std::process::exit(1);
            }
            None => {
                eprintln!(
                    "Failed to parse configuration file. There may be a typo or otherwise invalid toml:\n{:#}",
                    e
                );
                std::process::exit(1);
            }
        },
    };

    let run_time = Duration::from_millis(config.emulator.run_ms);
    let update_hz = config.emulator.update_hz as f32;

    let mut emu = Emulator::new(config);
    if let Err(e) = emu.apply_config() {
        eprintln!("Failed to apply configuration: {:#}", e);
        std::process::exit(1);
    }

    let mut timestep_manager = TimestepManager::new();
    timestep_manager.set_emu_update_rate(update_hz);
    timestep_manager.start();

    log::info!("Running headless for {:?}", run_time);
    while timestep_manager.running_time() < run_time {
        std::thread::sleep(WM_UPDATE_INTERVAL);
        timestep_manager.wm_update(
            &mut emu,
            |emu, perf| {
                log::debug!(
                    "wm ups: {} emu ups: {} inspector refreshes: {}",
                    perf.wm_ups.total,
                    perf.emu_ups.total,
                    emu.stat_counter.refreshes
                );
            },
            |emu, step| emu.update(step),
        );
    }

    emu.shutdown();
    let counter = &emu.stat_counter;
    println!(
        "Ran {} updates, {} bits spun, {} keys typed. Inspector: {} refreshes, {} track redraws, {} head redraws.",
        counter.updates,
        counter.bits_spun,
        counter.keys_typed,
        counter.refreshes,
        counter.track_redraws,
        counter.head_redraws
    );
}
