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

    device_types::c64_key.rs

    Defines a key position on the C64's 8x8 keyboard matrix.

    Matrix layout (row = CIA1 PA, col = CIA1 PB):

    | Row | Col0 | Col1 | Col2 | Col3 | Col4 | Col5 | Col6 | Col7    |
    |-----|------|------|------|------|------|------|------|---------|
    | 0   | DEL  | 3    | 5    | 7    | 9    | +    | £    | 1       |
    | 1   | RET  | W    | R    | Y    | I    | P    | *    | ←       |
    | 2   | →    | A    | D    | G    | J    | L    | ;    | CTRL    |
    | 3   | F7   | 4    | 6    | 8    | 0    | -    | HOME | 2       |
    | 4   | F1   | Z    | C    | B    | M    | .    | RSHFT| SPC     |
    | 5   | F3   | S    | F    | H    | K    | :    | =    | C=      |
    | 6   | F5   | E    | T    | U    | O    | @    | ↑    | Q       |
    | 7   | ↓    | LSHFT| X    | V    | N    | ,    | /    | STOP    |
*/

use std::fmt::{self, Display};

pub const MATRIX_ROWS: usize = 8;
pub const MATRIX_COLS: usize = 8;

const KEY_LABELS: [[&str; MATRIX_COLS]; MATRIX_ROWS] = [
    ["DEL", "3", "5", "7", "9", "+", "£", "1"],
    ["RETURN", "W", "R", "Y", "I", "P", "*", "←"],
    ["CRSR →", "A", "D", "G", "J", "L", ";", "CTRL"],
    ["F7", "4", "6", "8", "0", "-", "HOME", "2"],
    ["F1", "Z", "C", "B", "M", ".", "RSHIFT", "SPACE"],
    ["F3", "S", "F", "H", "K", ":", "=", "C="],
    ["F5", "E", "T", "U", "O", "@", "↑", "Q"],
    ["CRSR ↓", "LSHIFT", "X", "V", "N", ",", "/", "STOP"],
];

/// A key on the emulated keyboard, identified by its matrix position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct C64Key {
    row: u8,
    col: u8,
}

impl C64Key {
    pub const DELETE: C64Key = C64Key::at(0, 0);
    pub const RETURN: C64Key = C64Key::at(1, 0);
    pub const SPACE: C64Key = C64Key::at(4, 7);
    pub const RUN_STOP: C64Key = C64Key::at(7, 7);

    const fn at(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Create a key from a matrix position. Returns None if the position is outside the 8x8 matrix.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        if row < MATRIX_ROWS && col < MATRIX_COLS {
            Some(Self::at(row as u8, col as u8))
        }
        else {
            None
        }
    }

    #[inline]
    pub fn row(&self) -> usize {
        self.row as usize
    }

    #[inline]
    pub fn col(&self) -> usize {
        self.col as usize
    }

    pub fn label(&self) -> &'static str {
        KEY_LABELS[self.row()][self.col()]
    }

    /// Iterate over all 64 keys in row-major order.
    pub fn iter() -> impl Iterator<Item = C64Key> {
        (0..MATRIX_ROWS).flat_map(|row| (0..MATRIX_COLS).map(move |col| C64Key::at(row as u8, col as u8)))
    }
}

impl Display for C64Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({},{})", self.label(), self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_outside_matrix_are_rejected() {
        assert!(C64Key::new(7, 7).is_some());
        assert!(C64Key::new(8, 0).is_none());
        assert!(C64Key::new(0, 8).is_none());
    }

    #[test]
    fn iter_covers_matrix_once() {
        let keys: Vec<C64Key> = C64Key::iter().collect();
        assert_eq!(keys.len(), MATRIX_ROWS * MATRIX_COLS);
        assert_eq!(keys[0], C64Key::DELETE);
        assert_eq!(keys[63], C64Key::RUN_STOP);
        assert_eq!(C64Key::SPACE.label(), "SPACE");
    }
}
