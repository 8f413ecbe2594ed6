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

    frontend_common::timestep_manager::mod.rs

    Timestep manager and interval timers.

    Frontends call TimestepManager::wm_update() from their event loop. The
    manager measures the elapsed wall time and fires the emulator update and
    once-per-second callbacks at their configured rates. Debug panels that
    poll device state own an IntervalTimer and advance it with the elapsed
    time they are handed.
*/

use web_time::{Duration, Instant};

const SECOND: Duration = Duration::from_secs(1);

const DEFAULT_EMU_UPDATE_RATE: f32 = 50.0; // Default update rate for the emulated devices
const MIN_TIMER_PERIOD: Duration = Duration::from_millis(1);
const MAX_TIMESTEP: Duration = Duration::from_millis(250); // Larger deltas are ignored

#[derive(Copy, Clone, Default)]
pub struct PerfCounter {
    pub accum: u32, // Count accumulator
    pub total: u32, // Total count this timespan
    pub last:  u32, // Total count for last timespan
}

impl PerfCounter {
    #[inline]
    pub fn tick(&mut self) {
        self.accum += 1;
    }
    #[inline]
    pub fn mark_interval(&mut self) {
        self.last = self.total; // Save last interval's count
        self.total = self.accum; // Save this interval's count
        self.accum = 0; // Reset accumulator
    }
}

#[derive(Copy, Clone, Default)]
pub struct HertzEvent {
    rate:   f32,
    target: Duration,
    accum:  Duration,
}

impl HertzEvent {
    pub fn new(rate: f32) -> Self {
        Self {
            rate,
            target: Duration::from_secs_f64(SECOND.as_secs_f64() / rate as f64),
            accum: Duration::from_secs(0),
        }
    }
    pub fn set(&mut self, rate: f32) {
        self.rate = rate;
        self.target = Duration::from_secs_f64(SECOND.as_secs_f64() / rate as f64);
    }
    pub fn get(&self) -> f32 {
        self.rate
    }
    #[inline]
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        self.accum += elapsed;
        if self.accum >= self.target {
            self.accum -= self.target;
            true
        }
        else {
            false
        }
    }
}

/// A cancellable, repeating timer with a fixed period.
///
/// The timer fires at most once per tick. If more than one period has
/// accumulated (the owner was not updated for a while), the backlog is
/// dropped rather than replayed, as pollers only care about the latest state.
#[derive(Clone, Debug)]
pub struct IntervalTimer {
    period: Duration,
    accum:  Duration,
    active: bool,
}

impl IntervalTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_TIMER_PERIOD),
            accum:  Duration::ZERO,
            active: true,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Stop the timer. A cancelled timer never fires again.
    pub fn cancel(&mut self) {
        if self.active {
            log::debug!("Interval timer ({:?}) cancelled", self.period);
        }
        self.active = false;
        self.accum = Duration::ZERO;
    }

    #[inline]
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        if !self.active {
            return false;
        }
        self.accum += elapsed;
        if self.accum >= self.period {
            self.accum -= self.period;
            if self.accum >= self.period {
                log::trace!("Interval timer dropping backlog of {:?}", self.accum);
                self.accum = Duration::ZERO;
            }
            true
        }
        else {
            false
        }
    }
}

#[derive(Copy, Clone, Default)]
pub struct PerfStats {
    pub wm_ups:  PerfCounter, // Number of updates per second from the window manager
    pub emu_ups: PerfCounter, // Number of updates per second performed by the emulator
}

pub struct TimestepManager {
    init: bool, // Has the timestep manager been initialized?
    second_rate: HertzEvent,
    emu_update_rate: HertzEvent,
    last_instant: Instant,
    since_update: Duration, // Time accumulated since the last emulator update
    total_running_time: Duration,
    perf_stats: PerfStats,
}

impl Default for TimestepManager {
    fn default() -> Self {
        Self {
            init: false,
            second_rate: HertzEvent::new(1.0),
            emu_update_rate: HertzEvent::new(DEFAULT_EMU_UPDATE_RATE),
            last_instant: Instant::now(),
            since_update: Duration::ZERO,
            total_running_time: Duration::ZERO,
            perf_stats: PerfStats::default(),
        }
    }
}

impl TimestepManager {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn start(&mut self) {
        self.init = true;
        self.last_instant = Instant::now();
        self.since_update = Duration::ZERO;
        self.total_running_time = Duration::ZERO;
    }

    pub fn set_emu_update_rate(&mut self, rate: f32) {
        self.emu_update_rate.set(rate);
        log::info!("Emulator update rate has changed to {} Hz", rate);
    }

    pub fn running_time(&self) -> Duration {
        self.total_running_time
    }

    pub fn perf_stats(&self) -> &PerfStats {
        &self.perf_stats
    }

    /// Process a window manager update. The elapsed time since the previous call is
    /// measured and handed to advance().
    pub fn wm_update<E, F, G>(&mut self, emu: &mut E, second_callback: F, emu_update_callback: G)
    where
        F: FnOnce(&mut E, &PerfStats),
        G: FnMut(&mut E, Duration),
    {
        if !self.init {
            self.start();
            return;
        }

        let now = Instant::now();
        let elapsed = now.duration_since(self.last_instant);
        self.last_instant = now;

        // Ignore deltas that are too big (updates may have stopped due to a debugger break, etc.)
        if elapsed > MAX_TIMESTEP {
            log::debug!("Ignoring oversized timestep: {:?}", elapsed);
            return;
        }

        self.advance(emu, elapsed, second_callback, emu_update_callback);
    }

    /// Advance by `elapsed`. The emulator update callback receives the time accumulated since
    /// its previous invocation.
    pub fn advance<E, F, G>(&mut self, emu: &mut E, elapsed: Duration, second_callback: F, mut emu_update_callback: G)
    where
        F: FnOnce(&mut E, &PerfStats),
        G: FnMut(&mut E, Duration),
    {
        self.total_running_time += elapsed;
        self.since_update += elapsed;
        self.perf_stats.wm_ups.tick();

        if self.second_rate.tick(elapsed) {
            self.perf_stats.wm_ups.mark_interval();
            self.perf_stats.emu_ups.mark_interval();
            second_callback(emu, &self.perf_stats);
        }

        if self.emu_update_rate.tick(elapsed) {
            let step = std::mem::take(&mut self.since_update);
            emu_update_callback(emu, step);
            self.perf_stats.emu_ups.tick();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn interval_timer_fires_each_period() {
        let mut timer = IntervalTimer::new(60 * MS);
        let fired: Vec<bool> = (0..7).map(|_| timer.tick(20 * MS)).collect();
        assert_eq!(fired, vec![false, false, true, false, false, true, false]);
    }

    #[test]
    fn interval_timer_drops_backlog() {
        let mut timer = IntervalTimer::new(60 * MS);
        assert!(timer.tick(500 * MS));
        assert!(!timer.tick(10 * MS));
        assert!(timer.tick(50 * MS));
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timer = IntervalTimer::new(60 * MS);
        timer.cancel();
        assert!(!timer.is_active());
        assert!(!timer.tick(1000 * MS));
        assert!(!timer.tick(60 * MS));
    }

    #[test]
    fn zero_period_is_clamped() {
        let timer = IntervalTimer::new(Duration::ZERO);
        assert_eq!(timer.period(), MIN_TIMER_PERIOD);
    }

    #[test]
    fn advance_hands_accumulated_time_to_updates() {
        let mut tsm = TimestepManager::new();
        tsm.set_emu_update_rate(50.0); // 20ms
        let mut steps: Vec<Duration> = Vec::new();
        let mut seconds = 0;

        for _ in 0..10 {
            tsm.advance(&mut steps, 5 * MS, |_, _| seconds += 1, |steps, step| steps.push(step));
        }
        assert_eq!(steps, vec![20 * MS, 20 * MS]);
        assert_eq!(seconds, 0);
        assert_eq!(tsm.running_time(), 50 * MS);

        tsm.advance(&mut steps, 960 * MS, |_, _| seconds += 1, |steps, step| steps.push(step));
        assert_eq!(seconds, 1);
    }
}
