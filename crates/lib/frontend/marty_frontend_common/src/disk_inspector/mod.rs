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

    frontend_common::disk_inspector::mod.rs

    Toolkit independent state for a disk drive inspector window.

    The inspector polls a DriveService and rebuilds only what changed: the
    full GCR bit string of a track is regenerated when the head moves to a
    different halftrack, while the head indicators (offset, wheel, bit under
    the head and its neighbours) are regenerated whenever the halftrack or
    the bit offset changes. A frontend draws the resulting views however it
    likes.

    DiskInspectorPanel ties an inspector to a refresh timer for the lifetime
    of the window.
*/

use std::ops::Range;

use crate::timestep_manager::IntervalTimer;
use marty_core::device_traits::{DriveService, SerialBusService};
use web_time::Duration;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(60);
pub const DEFAULT_CONTEXT_BITS: usize = 10;
/// The head wheel (position slider) spans 0..WHEEL_RANGE.
pub const WHEEL_RANGE: usize = 1000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HeadPosition {
    pub halftrack: usize,
    pub offset:    usize,
}

impl HeadPosition {
    pub fn of<D: DriveService + ?Sized>(drive: &D) -> Self {
        Self {
            halftrack: drive.halftrack(),
            offset:    drive.bit_offset(),
        }
    }
}

/// The head position observed by the most recent refresh. Empty until the first refresh,
/// so that the first refresh redraws everything.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RefreshCache {
    last: Option<HeadPosition>,
}

impl RefreshCache {
    pub fn last(&self) -> Option<HeadPosition> {
        self.last
    }

    fn track_changed(&self, pos: HeadPosition) -> bool {
        self.last.map_or(true, |last| last.halftrack != pos.halftrack)
    }

    fn head_changed(&self, pos: HeadPosition) -> bool {
        self.last != Some(pos)
    }
}

/// Which parts of the inspector were rebuilt by a refresh.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub track_redrawn: bool,
    pub head_redrawn:  bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DiskIcon {
    Present,
    #[default]
    Absent,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DriveStatusView {
    pub icon: DiskIcon,
    pub write_protect: bool,
    pub serial_data: &'static str,
    pub serial_clock: &'static str,
    pub serial_atn: &'static str,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrackView {
    pub halftrack:  usize,
    pub label:      String,
    pub gcr_header: String,
    pub gcr_data:   String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeadView {
    pub offset: usize,
    pub wheel:  usize,
    pub value:  String,
    pub left:   String,
    pub right:  String,
}

/// A highlighted range of the GCR bit string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitMarker {
    pub range: Range<usize>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepDirection {
    Up,
    Down,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RotateDirection {
    Forward,
    Backward,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InspectorEvent {
    SetHalftrack(usize),
    StepHead(StepDirection),
    SetOffset(usize),
    Rotate(RotateDirection),
    SetWheel(usize),
    WriteBit(u8),
    MarkHead(bool),
    SetWriteProtect(bool),
}

/// Format a halftrack as a track number. Odd halftracks sit between two tracks.
pub fn track_label(halftrack: usize) -> String {
    let suffix = if halftrack % 2 == 1 { ".5" } else { "" };
    format!("Track {}{}", halftrack / 2, suffix)
}

pub fn gcr_header(bits: usize) -> String {
    format!("GCR data: {} Bits ({} Bytes)", bits, bits / 8)
}

/// Scale a bit offset to the head wheel range.
pub fn wheel_position(offset: usize, bits: usize) -> usize {
    if bits == 0 {
        0
    }
    else {
        (WHEEL_RANGE * offset / bits).min(WHEEL_RANGE - 1)
    }
}

/// Convert a head wheel position back into a bit offset.
pub fn offset_from_wheel(wheel: usize, bits: usize) -> usize {
    bits * wheel.min(WHEEL_RANGE) / WHEEL_RANGE
}

fn line_str(level: bool) -> &'static str {
    if level {
        "1"
    }
    else {
        "0"
    }
}

pub struct DiskInspector {
    cache: RefreshCache,
    context_bits: usize,
    status: DriveStatusView,
    track: TrackView,
    head: HeadView,
    marker: Option<BitMarker>,
    scroll_request: Option<usize>,
}

impl Default for DiskInspector {
    fn default() -> Self {
        Self::with_context_bits(DEFAULT_CONTEXT_BITS)
    }
}

impl DiskInspector {
    pub fn new() -> Self {
        Default::default()
    }

    /// Create an inspector showing `context_bits` bits on either side of the head.
    pub fn with_context_bits(context_bits: usize) -> Self {
        Self {
            cache: RefreshCache::default(),
            context_bits,
            status: DriveStatusView::default(),
            track: TrackView::default(),
            head: HeadView::default(),
            marker: None,
            scroll_request: None,
        }
    }

    pub fn cache(&self) -> &RefreshCache {
        &self.cache
    }

    pub fn status(&self) -> &DriveStatusView {
        &self.status
    }

    pub fn track(&self) -> &TrackView {
        &self.track
    }

    pub fn head(&self) -> &HeadView {
        &self.head
    }

    pub fn marker(&self) -> Option<&BitMarker> {
        self.marker.as_ref()
    }

    /// Bit index the GCR view should scroll into view, if one was requested since the last call.
    pub fn take_scroll_request(&mut self) -> Option<usize> {
        self.scroll_request.take()
    }

    /// Poll the drive and bus and rebuild whatever changed since the previous refresh.
    pub fn refresh<D, S>(&mut self, drive: &D, bus: &S) -> RefreshReport
    where
        D: DriveService + ?Sized,
        S: SerialBusService + ?Sized,
    {
        let pos = HeadPosition::of(drive);
        let mut report = RefreshReport::default();

        self.status.icon = if drive.has_disk() {
            DiskIcon::Present
        }
        else {
            DiskIcon::Absent
        };
        self.status.write_protect = drive.write_protection();
        self.refresh_serial(bus);

        if self.cache.track_changed(pos) {
            self.refresh_track(drive);
            report.track_redrawn = true;
        }

        if self.cache.head_changed(pos) {
            self.refresh_head(drive);
            report.head_redrawn = true;
        }

        self.cache.last = Some(pos);
        report
    }

    fn refresh_serial<S: SerialBusService + ?Sized>(&mut self, bus: &S) {
        self.status.serial_data = line_str(bus.data_line());
        self.status.serial_clock = line_str(bus.clock_line());
        self.status.serial_atn = line_str(bus.atn_line());
    }

    /// Rebuild the track level view. This regenerates the complete bit string of the track,
    /// which invalidates any marker placed in the previous one.
    pub fn refresh_track<D: DriveService + ?Sized>(&mut self, drive: &D) {
        let halftrack = drive.halftrack();
        let bits = drive.number_of_bits();

        self.track = TrackView {
            halftrack,
            label: track_label(halftrack),
            gcr_header: gcr_header(bits),
            gcr_data: drive.data_abs(0),
        };
        self.marker = None;

        log::debug!("Track view rebuilt: halftrack {}, {} bits", halftrack, bits);
    }

    /// Rebuild the head level view.
    pub fn refresh_head<D: DriveService + ?Sized>(&mut self, drive: &D) {
        let offset = drive.bit_offset();
        let bits = drive.number_of_bits();

        self.head.offset = offset;
        self.head.wheel = wheel_position(offset, bits);

        if drive.has_disk() {
            self.head.value = drive.read_bit_from_head().to_string();
            self.head.left = drive.data_rel(-(self.context_bits as isize), self.context_bits);
            self.head.right = drive.data_rel(1, self.context_bits);
        }
        else {
            self.head.value.clear();
            self.head.left.clear();
            self.head.right.clear();
        }
    }

    /// Highlight the bit under the head, replacing any existing marker. Does nothing if the
    /// track holds no bits.
    pub fn set_head_marker<D: DriveService + ?Sized>(&mut self, drive: &D) {
        if drive.number_of_bits() == 0 {
            return;
        }
        self.remove_head_marker();
        let offset = drive.bit_offset();
        self.marker = Some(BitMarker {
            range: offset..offset + 1,
        });
        self.scroll_request = Some(offset);
    }

    pub fn remove_head_marker(&mut self) {
        self.marker = None;
    }

    /// Apply a user action to the drive and refresh.
    pub fn handle_event<D, S>(&mut self, event: InspectorEvent, drive: &mut D, bus: &S) -> RefreshReport
    where
        D: DriveService + ?Sized,
        S: SerialBusService + ?Sized,
    {
        log::debug!("Disk inspector event: {:?}", event);
        match event {
            InspectorEvent::SetHalftrack(halftrack) => drive.set_halftrack(halftrack),
            InspectorEvent::StepHead(StepDirection::Up) => drive.move_head_up(),
            InspectorEvent::StepHead(StepDirection::Down) => drive.move_head_down(),
            InspectorEvent::SetOffset(offset) => drive.set_bit_offset(offset),
            InspectorEvent::Rotate(RotateDirection::Forward) => drive.rotate_disk(),
            InspectorEvent::Rotate(RotateDirection::Backward) => drive.rotate_back(),
            InspectorEvent::SetWheel(wheel) => {
                let offset = offset_from_wheel(wheel, drive.number_of_bits());
                drive.set_bit_offset(offset);
                self.scroll_request = Some(drive.bit_offset());
            }
            InspectorEvent::WriteBit(value) => {
                drive.write_bit_to_head(value);
                // The track content changed even though the head did not move.
                self.refresh_track(drive);
                let mut report = self.refresh(drive, bus);
                report.track_redrawn = true;
                return report;
            }
            InspectorEvent::MarkHead(true) => {
                self.set_head_marker(drive);
                return RefreshReport::default();
            }
            InspectorEvent::MarkHead(false) => {
                self.remove_head_marker();
                return RefreshReport::default();
            }
            InspectorEvent::SetWriteProtect(state) => drive.set_write_protection(state),
        }
        self.refresh(drive, bus)
    }
}

/// A disk inspector window: an inspector refreshed by a repeating timer. Closing the panel
/// cancels the timer, after which the panel no longer touches the drive.
pub struct DiskInspectorPanel {
    inspector: DiskInspector,
    timer: IntervalTimer,
}

impl DiskInspectorPanel {
    /// Open the panel and perform the initial refresh.
    pub fn open<D, S>(inspector: DiskInspector, interval: Duration, drive: &D, bus: &S) -> Self
    where
        D: DriveService + ?Sized,
        S: SerialBusService + ?Sized,
    {
        let mut panel = Self {
            inspector,
            timer: IntervalTimer::new(interval),
        };
        panel.inspector.refresh(drive, bus);
        log::debug!("Disk inspector opened, refresh interval {:?}", panel.timer.period());
        panel
    }

    pub fn is_open(&self) -> bool {
        self.timer.is_active()
    }

    pub fn inspector(&self) -> &DiskInspector {
        &self.inspector
    }

    pub fn inspector_mut(&mut self) -> &mut DiskInspector {
        &mut self.inspector
    }

    /// Advance the refresh timer by `elapsed`. Returns the refresh report if the timer fired.
    pub fn update<D, S>(&mut self, elapsed: Duration, drive: &D, bus: &S) -> Option<RefreshReport>
    where
        D: DriveService + ?Sized,
        S: SerialBusService + ?Sized,
    {
        if self.timer.tick(elapsed) {
            Some(self.inspector.refresh(drive, bus))
        }
        else {
            None
        }
    }

    /// Forward a user action to the inspector. Ignored once the panel is closed.
    pub fn handle_event<D, S>(&mut self, event: InspectorEvent, drive: &mut D, bus: &S) -> Option<RefreshReport>
    where
        D: DriveService + ?Sized,
        S: SerialBusService + ?Sized,
    {
        if !self.is_open() {
            log::warn!("Disk inspector is closed, ignoring {:?}", event);
            return None;
        }
        Some(self.inspector.handle_event(event, drive, bus))
    }

    pub fn close(&mut self) {
        log::debug!("Closing disk inspector");
        self.timer.cancel();
    }
}
