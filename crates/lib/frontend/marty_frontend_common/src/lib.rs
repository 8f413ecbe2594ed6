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

//! The Frontend Common library provides facilities, data types and traits common to all front ends.
//! This avoids duplication of code and type definitions.
//!
//! - DiskInspector: Tracks the head of a disk drive and builds the track and head views of a
//!     drive inspector window, refreshed by a DiskInspectorPanel on a timer.
//! - KeyboardDialog: Edits the host to C64 key mapping and commits or discards the result.
//! - KeyMapStore: Persists key mappings to disk.
//! - TimeStepManager: Manages the timing of the emulator via callbacks that fire at specified
//!     intervals, to allow desynchronized guest updates vs GUI updates.

pub mod disk_inspector;
pub mod keyboard_dialog;
pub mod keymap_store;
pub mod timestep_manager;
