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

    device_types::d64.rs

    A minimal D64 disk image container. A D64 is a flat dump of the 683
    sectors of a 35 track 1541 disk, optionally followed by one error byte
    per sector.
*/

pub const D64_SIZE: usize = 174_848;
pub const D64_SIZE_WITH_ERRORS: usize = 175_531;
pub const D64_TRACKS: u8 = 35;
pub const SECTOR_SIZE: usize = 256;

const BAM_TRACK: u8 = 18;
const DISK_ID_OFFSET: usize = 0xA2;

#[derive(Debug, thiserror::Error)]
pub enum DiskImageError {
    #[error("Invalid D64 image size: {0} bytes")]
    InvalidSize(usize),
    #[error("Track {0} is outside the image")]
    InvalidTrack(u8),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Number of sectors on a track, by speed zone. Returns 0 for tracks outside 1-35.
pub fn sectors_per_track(track: u8) -> u8 {
    match track {
        1..=17 => 21,
        18..=24 => 19,
        25..=30 => 18,
        31..=35 => 17,
        _ => 0,
    }
}

fn sector_offset(track: u8, sector: u8) -> Option<usize> {
    if !(1..=D64_TRACKS).contains(&track) || sector >= sectors_per_track(track) {
        return None;
    }
    let preceding: usize = (1..track).map(|t| sectors_per_track(t) as usize).sum();
    Some((preceding + sector as usize) * SECTOR_SIZE)
}

pub struct D64Image {
    data: Vec<u8>,
}

impl D64Image {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DiskImageError> {
        match bytes.len() {
            D64_SIZE | D64_SIZE_WITH_ERRORS => Ok(Self {
                data: bytes[..D64_SIZE].to_vec(),
            }),
            len => Err(DiskImageError::InvalidSize(len)),
        }
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, DiskImageError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Create a blank image. The disk id is written into the BAM so that
    /// sector headers carry it.
    pub fn blank(disk_id: [u8; 2]) -> Self {
        let mut data = vec![0u8; D64_SIZE];
        if let Some(bam) = sector_offset(BAM_TRACK, 0) {
            data[bam + DISK_ID_OFFSET] = disk_id[0];
            data[bam + DISK_ID_OFFSET + 1] = disk_id[1];
        }
        Self { data }
    }

    pub fn read_sector(&self, track: u8, sector: u8) -> Option<&[u8]> {
        sector_offset(track, sector).map(|offset| &self.data[offset..offset + SECTOR_SIZE])
    }

    pub fn write_sector(&mut self, track: u8, sector: u8, bytes: &[u8]) -> bool {
        match sector_offset(track, sector) {
            Some(offset) if bytes.len() == SECTOR_SIZE => {
                self.data[offset..offset + SECTOR_SIZE].copy_from_slice(bytes);
                true
            }
            _ => false,
        }
    }

    pub fn disk_id(&self) -> [u8; 2] {
        match sector_offset(BAM_TRACK, 0) {
            Some(bam) => [self.data[bam + DISK_ID_OFFSET], self.data[bam + DISK_ID_OFFSET + 1]],
            None => [0, 0],
        }
    }
}
