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

    device_traits::mod.rs

    Service traits through which frontends observe and manipulate emulated
    devices. Debug viewers and dialogs are written against these traits
    rather than concrete devices.
*/

use crate::device_types::keymap::KeyMap;

/// Inspection and manipulation of a disk drive's read/write head.
///
/// Halftracks and bit offsets are plain indices. A drive with no disk, or a
/// head positioned over an unformatted halftrack, reports zero bits; all
/// head operations on such a track degrade to no-ops and empty results.
pub trait DriveService {
    fn halftrack(&self) -> usize;
    fn bit_offset(&self) -> usize;
    /// Number of bits on the track under the head.
    fn number_of_bits(&self) -> usize;
    fn has_disk(&self) -> bool;
    fn write_protection(&self) -> bool;
    fn set_write_protection(&mut self, protect: bool);

    fn set_halftrack(&mut self, halftrack: usize);
    fn move_head_up(&mut self);
    fn move_head_down(&mut self);

    fn set_bit_offset(&mut self, offset: usize);
    fn rotate_disk(&mut self);
    fn rotate_back(&mut self);

    /// Read the bit under the head (0 or 1).
    fn read_bit_from_head(&self) -> u8;
    /// Overwrite the bit under the head. Any nonzero value writes a 1.
    fn write_bit_to_head(&mut self, value: u8);

    /// Render the track from `offset` to its end as a string of '0' and '1'.
    fn data_abs(&self, offset: usize) -> String;
    /// Render `length` bits starting `delta` bits away from the head, wrapping around the track.
    fn data_rel(&self, delta: isize, length: usize) -> String;
}

/// Logic levels of the serial (IEC) bus lines. true = line high.
pub trait SerialBusService {
    fn data_line(&self) -> bool;
    fn clock_line(&self) -> bool;
    fn atn_line(&self) -> bool;
}

/// Owner of the active host-to-C64 keymap.
pub trait KeyboardService {
    fn key_map(&self) -> &KeyMap;
    fn set_key_map(&mut self, key_map: KeyMap);
}
