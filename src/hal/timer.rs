//! Timing Helpers
//!
//! Sub-microsecond busy-wait delays for the bit-bang transport, and a
//! stopwatch for measuring how long a register frame stays open.

use embassy_time::{Duration, Instant};
use embedded_hal::delay::DelayNs;

/// Busy-wait delay counted in core clock cycles
///
/// `embassy_time::Delay` rounds up to whole timer ticks, which is far
/// coarser than the few hundred nanoseconds a bus edge needs.
#[derive(Clone, Copy, Debug)]
pub struct CycleDelay {
    cycles_per_us: u32,
}

impl CycleDelay {
    /// Create a delay for a core running at `sysclk_hz`
    #[must_use]
    pub const fn new(sysclk_hz: u32) -> Self {
        Self {
            cycles_per_us: sysclk_hz / 1_000_000,
        }
    }

    /// Cycles needed to cover `ns` nanoseconds (at least one)
    #[must_use]
    pub const fn cycles_for_ns(&self, ns: u32) -> u32 {
        let cycles = (ns as u64 * self.cycles_per_us as u64).div_ceil(1_000);
        if cycles == 0 {
            1
        } else if cycles > u32::MAX as u64 {
            u32::MAX
        } else {
            cycles as u32
        }
    }
}

impl DelayNs for CycleDelay {
    fn delay_ns(&mut self, ns: u32) {
        cortex_m::asm::delay(self.cycles_for_ns(ns));
    }
}

impl defmt::Format for CycleDelay {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "CycleDelay({}MHz)", self.cycles_per_us);
    }
}

/// Stopwatch for frame timing
#[derive(Clone, Copy, Debug)]
pub struct Stopwatch {
    start: Option<Instant>,
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    #[must_use]
    pub const fn new() -> Self {
        Self { start: None }
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    /// Check if running
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.start.is_some()
    }

    /// Get elapsed time (returns zero if not started)
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start
            .map_or(Duration::from_ticks(0), |s| Instant::now() - s)
    }

    /// Stop and return elapsed time
    pub fn stop(&mut self) -> Duration {
        let elapsed = self.elapsed();
        self.start = None;
        elapsed
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl defmt::Format for Stopwatch {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Stopwatch({}us)", self.elapsed().as_micros());
    }
}
