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

    device_types::gcr.rs

    GCR (Group Code Recording) track encoding for the 1541.

    Every nibble is stored as a 5-bit code that never contains more than two
    consecutive zero bits. A sector on disk is laid out as:

      sync (5 x $FF) | header block (10 GCR bytes) | gap (9 x $55) |
      sync (5 x $FF) | data block (325 GCR bytes)  | gap (9 x $55)

    Tracks are padded with $55 up to the capacity of their speed zone.
*/

use crate::device_types::d64::{sectors_per_track, D64Image, DiskImageError, SECTOR_SIZE};

const GCR_ENCODE: [u8; 16] = [
    0x0A, 0x0B, 0x12, 0x13, 0x0E, 0x0F, 0x16, 0x17, 0x09, 0x19, 0x1A, 0x1B, 0x0D, 0x1D, 0x1E, 0x15,
];

const SYNC_LEN: usize = 5;
const GAP_LEN: usize = 9;
const GAP_BYTE: u8 = 0x55;
const HEADER_MARK: u8 = 0x08;
const DATA_MARK: u8 = 0x07;

pub const ENCODED_SECTOR_LEN: usize = SYNC_LEN + 10 + GAP_LEN + SYNC_LEN + 325 + GAP_LEN;

/// Capacity of a track in GCR bytes, by speed zone.
pub fn track_capacity(track: u8) -> usize {
    match track {
        1..=17 => 7692,
        18..=24 => 7142,
        25..=30 => 6666,
        _ => 6250,
    }
}

/// A circular GCR bit stream. Bits are stored MSB first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GcrTrack {
    bytes:   Vec<u8>,
    bit_len: usize,
}

impl GcrTrack {
    pub fn empty() -> Self {
        Default::default()
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let bit_len = bytes.len() * 8;
        Self { bytes, bit_len }
    }

    #[inline]
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bit_len == 0
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Read the bit at `index`. Out of range reads return 0.
    pub fn bit(&self, index: usize) -> u8 {
        if index >= self.bit_len {
            return 0;
        }
        (self.bytes[index >> 3] >> (7 - (index & 7))) & 1
    }

    pub fn set_bit(&mut self, index: usize, value: bool) {
        if index >= self.bit_len {
            return;
        }
        let mask = 0x80 >> (index & 7);
        if value {
            self.bytes[index >> 3] |= mask;
        }
        else {
            self.bytes[index >> 3] &= !mask;
        }
    }
}

fn encode_gcr_group(input: &[u8; 4]) -> [u8; 5] {
    let mut codes = [0u8; 8];
    for (i, byte) in input.iter().enumerate() {
        codes[i * 2] = GCR_ENCODE[(byte >> 4) as usize];
        codes[i * 2 + 1] = GCR_ENCODE[(byte & 0x0F) as usize];
    }

    // Pack 8 x 5-bit codes into 40 bits.
    let packed = codes.iter().fold(0u64, |acc, code| (acc << 5) | *code as u64);
    [
        (packed >> 32) as u8,
        (packed >> 24) as u8,
        (packed >> 16) as u8,
        (packed >> 8) as u8,
        packed as u8,
    ]
}

fn encode_block(raw: &[u8], out: &mut Vec<u8>) {
    for chunk in raw.chunks_exact(4) {
        out.extend_from_slice(&encode_gcr_group(&[chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
}

fn encode_sector(track: u8, sector: u8, data: &[u8], disk_id: [u8; 2], out: &mut Vec<u8>) {
    let header_checksum = sector ^ track ^ disk_id[0] ^ disk_id[1];
    let header = [
        HEADER_MARK,
        header_checksum,
        sector,
        track,
        disk_id[1],
        disk_id[0],
        0x0F,
        0x0F,
    ];

    let mut block = Vec::with_capacity(SECTOR_SIZE + 4);
    block.push(DATA_MARK);
    block.extend_from_slice(data);
    block.push(data.iter().fold(0u8, |acc, b| acc ^ b));
    block.extend_from_slice(&[0x00, 0x00]);

    out.extend_from_slice(&[0xFF; SYNC_LEN]);
    encode_block(&header, out);
    out.extend_from_slice(&[GAP_BYTE; GAP_LEN]);
    out.extend_from_slice(&[0xFF; SYNC_LEN]);
    encode_block(&block, out);
    out.extend_from_slice(&[GAP_BYTE; GAP_LEN]);
}

/// Encode a full track of a D64 image, padded to the zone capacity.
pub fn encode_track(image: &D64Image, track: u8) -> Result<GcrTrack, DiskImageError> {
    let sector_ct = sectors_per_track(track);
    if sector_ct == 0 {
        return Err(DiskImageError::InvalidTrack(track));
    }

    let capacity = track_capacity(track);
    let disk_id = image.disk_id();
    let mut bytes = Vec::with_capacity(capacity);

    for sector in 0..sector_ct {
        let data = image.read_sector(track, sector).ok_or(DiskImageError::InvalidTrack(track))?;
        encode_sector(track, sector, data, disk_id, &mut bytes);
    }
    bytes.resize(capacity, GAP_BYTE);

    Ok(GcrTrack::from_bytes(bytes))
}
