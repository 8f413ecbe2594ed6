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

    devices::iec.rs

    The Commodore serial (IEC) bus. Each line is open collector: it reads
    high unless at least one device is pulling it low.
*/

use crate::device_traits::SerialBusService;

/// A device attached to the bus.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IecDevice {
    Computer,
    Drive,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IecLine {
    Atn,
    Clock,
    Data,
}

#[derive(Copy, Clone, Debug, Default)]
struct LinePulls {
    computer: bool,
    drive:    bool,
}

impl LinePulls {
    #[inline]
    fn level(&self) -> bool {
        !(self.computer || self.drive)
    }
}

#[derive(Clone, Debug, Default)]
pub struct IecBus {
    atn:  LinePulls,
    clk:  LinePulls,
    data: LinePulls,
}

impl IecBus {
    pub fn new() -> Self {
        Default::default()
    }

    /// Pull `line` low from `device`, or release it.
    pub fn pull_line(&mut self, device: IecDevice, line: IecLine, pull_low: bool) {
        let pulls = match line {
            IecLine::Atn => &mut self.atn,
            IecLine::Clock => &mut self.clk,
            IecLine::Data => &mut self.data,
        };
        match device {
            IecDevice::Computer => pulls.computer = pull_low,
            IecDevice::Drive => pulls.drive = pull_low,
        }
    }
}

impl SerialBusService for IecBus {
    fn data_line(&self) -> bool {
        self.data.level()
    }

    fn clock_line(&self) -> bool {
        self.clk.level()
    }

    fn atn_line(&self) -> bool {
        self.atn.level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_idle_high() {
        let bus = IecBus::new();
        assert!(bus.data_line());
        assert!(bus.clock_line());
        assert!(bus.atn_line());
    }

    #[test]
    fn any_device_pulls_line_low() {
        let mut bus = IecBus::new();
        bus.pull_line(IecDevice::Drive, IecLine::Data, true);
        assert!(!bus.data_line());
        bus.pull_line(IecDevice::Computer, IecLine::Data, true);
        bus.pull_line(IecDevice::Drive, IecLine::Data, false);
        assert!(!bus.data_line());
        bus.pull_line(IecDevice::Computer, IecLine::Data, false);
        assert!(bus.data_line());

        bus.pull_line(IecDevice::Computer, IecLine::Atn, true);
        bus.pull_line(IecDevice::Drive, IecLine::Clock, true);
        assert!(!bus.atn_line());
        assert!(!bus.clock_line());
        assert!(bus.data_line());
    }
}
