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

    devices::vc1541.rs

    Implements the disk mechanics of a 1541 drive: a stepper positioned head
    over a spinning GCR surface. The drive's CPU and VIAs are not emulated
    here; this device exists so that debugger views can observe and poke the
    head and the raw bit stream.

    Halftracks are numbered 1-84. Track n of a D64 image is placed on
    halftrack 2n; odd halftracks and tracks beyond the image are unformatted
    and hold no bits.
*/

use crate::{
    device_traits::DriveService,
    device_types::{
        d64::{D64Image, DiskImageError, D64_TRACKS},
        gcr::{encode_track, GcrTrack},
    },
};

pub const FIRST_HALFTRACK: usize = 1;
pub const LAST_HALFTRACK: usize = 84;
// Track 18, where the directory lives.
pub const DEFAULT_HALFTRACK: usize = 36;

/// The GCR surface of a disk, one bit stream per halftrack.
#[derive(Clone, Debug)]
pub struct GcrDisk {
    halftracks: Vec<GcrTrack>,
    write_protected: bool,
}

impl GcrDisk {
    pub fn unformatted() -> Self {
        Self {
            halftracks: vec![GcrTrack::empty(); LAST_HALFTRACK + 1],
            write_protected: false,
        }
    }

    pub fn from_d64(image: &D64Image) -> Result<Self, DiskImageError> {
        let mut disk = GcrDisk::unformatted();
        for track in 1..=D64_TRACKS {
            disk.halftracks[track as usize * 2] = encode_track(image, track)?;
        }
        Ok(disk)
    }

    /// Replace the bit stream of a halftrack. Out of range halftracks are ignored.
    pub fn set_track(&mut self, halftrack: usize, track: GcrTrack) {
        if let Some(slot) = self.halftracks.get_mut(halftrack) {
            *slot = track;
        }
    }

    pub fn track(&self, halftrack: usize) -> Option<&GcrTrack> {
        self.halftracks.get(halftrack)
    }

    pub fn set_write_protected(&mut self, state: bool) {
        self.write_protected = state;
    }

    pub fn write_protected(&self) -> bool {
        self.write_protected
    }
}

pub struct Vc1541 {
    halftrack: usize,
    offset: usize,
    disk: Option<GcrDisk>,
}

impl Default for Vc1541 {
    fn default() -> Self {
        Self {
            halftrack: DEFAULT_HALFTRACK,
            offset: 0,
            disk: None,
        }
    }
}

impl Vc1541 {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn insert_disk(&mut self, disk: GcrDisk) {
        self.disk = Some(disk);
        self.offset = self.wrap(self.offset);
        log::debug!(
            "Disk inserted. Head at halftrack {}, offset {} of {} bits",
            self.halftrack,
            self.offset,
            self.number_of_bits()
        );
    }

    /// Advance the head by `bits` as the disk spins under it.
    pub fn spin(&mut self, bits: usize) {
        let len = self.number_of_bits();
        if len > 0 {
            self.offset = (self.offset + bits % len) % len;
        }
    }

    fn current_track(&self) -> Option<&GcrTrack> {
        self.disk.as_ref().and_then(|disk| disk.track(self.halftrack))
    }

    fn current_track_mut(&mut self) -> Option<&mut GcrTrack> {
        let halftrack = self.halftrack;
        self.disk.as_mut().and_then(|disk| disk.halftracks.get_mut(halftrack))
    }

    fn wrap(&self, offset: usize) -> usize {
        match self.number_of_bits() {
            0 => 0,
            len => offset % len,
        }
    }

    // Keep the head at the same angular position when moving to a track of different length.
    fn move_to(&mut self, halftrack: usize) {
        let old_len = self.number_of_bits();
        self.halftrack = halftrack;
        let new_len = self.number_of_bits();

        self.offset = if old_len == 0 || new_len == 0 {
            0
        }
        else {
            (self.offset * new_len / old_len).min(new_len - 1)
        };
    }

    fn bit_at(&self, index: usize) -> char {
        match self.current_track() {
            Some(track) if track.bit(index) != 0 => '1',
            _ => '0',
        }
    }
}

impl DriveService for Vc1541 {
    fn halftrack(&self) -> usize {
        self.halftrack
    }

    fn bit_offset(&self) -> usize {
        self.offset
    }

    fn number_of_bits(&self) -> usize {
        self.current_track().map_or(0, |track| track.bit_len())
    }

    fn has_disk(&self) -> bool {
        self.disk.is_some()
    }

    fn write_protection(&self) -> bool {
        self.disk.as_ref().is_some_and(|disk| disk.write_protected())
    }

    fn set_write_protection(&mut self, protect: bool) {
        match self.disk.as_mut() {
            Some(disk) => disk.set_write_protected(protect),
            None => log::debug!("set_write_protection(): no disk in drive"),
        }
    }

    fn set_halftrack(&mut self, halftrack: usize) {
        if !(FIRST_HALFTRACK..=LAST_HALFTRACK).contains(&halftrack) {
            log::warn!(
                "set_halftrack(): halftrack {} out of range {}-{}",
                halftrack,
                FIRST_HALFTRACK,
                LAST_HALFTRACK
            );
            return;
        }
        self.move_to(halftrack);
    }

    fn move_head_up(&mut self) {
        if self.halftrack < LAST_HALFTRACK {
            self.move_to(self.halftrack + 1);
        }
    }

    fn move_head_down(&mut self) {
        if self.halftrack > FIRST_HALFTRACK {
            self.move_to(self.halftrack - 1);
        }
    }

    fn set_bit_offset(&mut self, offset: usize) {
        self.offset = self.wrap(offset);
    }

    fn rotate_disk(&mut self) {
        self.spin(1);
    }

    fn rotate_back(&mut self) {
        let len = self.number_of_bits();
        if len > 0 {
            self.offset = (self.offset + len - 1) % len;
        }
    }

    fn read_bit_from_head(&self) -> u8 {
        self.current_track().map_or(0, |track| track.bit(self.offset))
    }

    fn write_bit_to_head(&mut self, value: u8) {
        let offset = self.offset;
        if let Some(track) = self.current_track_mut() {
            track.set_bit(offset, value != 0);
        }
    }

    fn data_abs(&self, offset: usize) -> String {
        (offset..self.number_of_bits()).map(|i| self.bit_at(i)).collect()
    }

    fn data_rel(&self, delta: isize, length: usize) -> String {
        let len = self.number_of_bits();
        if len == 0 {
            return String::new();
        }
        let start = self.offset as isize + delta;
        (0..length as isize)
            .map(|i| self.bit_at((start + i).rem_euclid(len as isize) as usize))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_types::gcr::track_capacity;

    fn drive_with_disk() -> Vc1541 {
        let disk = GcrDisk::from_d64(&D64Image::blank([0x41, 0x42])).unwrap();
        let mut drive = Vc1541::new();
        drive.insert_disk(disk);
        drive
    }

    #[test]
    fn empty_drive_degrades_to_blank_values() {
        let mut drive = Vc1541::new();
        assert!(!drive.has_disk());
        assert_eq!(drive.number_of_bits(), 0);
        drive.set_bit_offset(100);
        drive.rotate_disk();
        drive.rotate_back();
        assert_eq!(drive.bit_offset(), 0);
        assert_eq!(drive.read_bit_from_head(), 0);
        assert_eq!(drive.data_abs(0), "");
        assert_eq!(drive.data_rel(-10, 10), "");
        drive.set_write_protection(true);
        assert!(!drive.write_protection());
    }

    #[test]
    fn whole_tracks_carry_zone_lengths() {
        let mut drive = drive_with_disk();
        assert_eq!(drive.halftrack(), DEFAULT_HALFTRACK);
        assert_eq!(drive.number_of_bits(), track_capacity(18) * 8);

        drive.set_halftrack(2);
        assert_eq!(drive.number_of_bits(), track_capacity(1) * 8);

        // Halftracks between tracks and tracks past 35 are unformatted.
        drive.move_head_up();
        assert_eq!(drive.halftrack(), 3);
        assert_eq!(drive.number_of_bits(), 0);
        drive.set_halftrack(72);
        assert_eq!(drive.number_of_bits(), 0);
    }

    #[test]
    fn out_of_range_halftrack_is_ignored() {
        let mut drive = drive_with_disk();
        drive.set_halftrack(0);
        assert_eq!(drive.halftrack(), DEFAULT_HALFTRACK);
        drive.set_halftrack(LAST_HALFTRACK + 1);
        assert_eq!(drive.halftrack(), DEFAULT_HALFTRACK);

        drive.set_halftrack(LAST_HALFTRACK);
        drive.move_head_up();
        assert_eq!(drive.halftrack(), LAST_HALFTRACK);
        drive.set_halftrack(FIRST_HALFTRACK);
        drive.move_head_down();
        assert_eq!(drive.halftrack(), FIRST_HALFTRACK);
    }

    #[test]
    fn offset_scales_with_track_length() {
        let mut drive = drive_with_disk();
        drive.set_halftrack(2);
        let len1 = drive.number_of_bits();
        drive.set_bit_offset(len1 / 2);

        drive.set_halftrack(70);
        let len35 = drive.number_of_bits();
        assert_eq!(drive.bit_offset(), (len1 / 2) * len35 / len1);
    }

    #[test]
    fn rotation_wraps_around_track() {
        let mut drive = drive_with_disk();
        let len = drive.number_of_bits();
        drive.rotate_back();
        assert_eq!(drive.bit_offset(), len - 1);
        drive.rotate_disk();
        assert_eq!(drive.bit_offset(), 0);
        drive.set_bit_offset(len + 5);
        assert_eq!(drive.bit_offset(), 5);
    }

    #[test]
    fn data_rel_wraps_and_matches_head() {
        let mut drive = drive_with_disk();
        // Every sector starts with a sync mark of 40 one bits.
        let before = drive.data_rel(-10, 10);
        assert_eq!(before.len(), 10);
        let after = drive.data_rel(1, 10);
        assert_eq!(after, "1111111111");
        assert_eq!(drive.read_bit_from_head(), 1);

        drive.set_bit_offset(5);
        let window = drive.data_rel(-5, 11);
        assert_eq!(window, drive.data_abs(0)[..11]);
    }

    #[test]
    fn written_bits_are_read_back() {
        let mut drive = drive_with_disk();
        drive.set_bit_offset(3);
        drive.write_bit_to_head(0);
        assert_eq!(drive.read_bit_from_head(), 0);
        assert_eq!(&drive.data_abs(0)[..5], "11101");
        drive.write_bit_to_head(1);
        assert_eq!(drive.read_bit_from_head(), 1);
    }
}
