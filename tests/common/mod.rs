//! Host-side doubles for the bus lines, delays and the DMA port.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;

use adf435x_firmware::transport::dma::DmaPort;
use adf435x_firmware::types::{Level, REGISTER_BYTES};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

/// Bus line a pin drives
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Line {
    Latch,
    Clock,
    Data,
}

/// Ordered record of every line change, shared by all pins of one bus
pub type Trace = Rc<RefCell<Vec<(Line, Level)>>>;

pub fn new_trace() -> Trace {
    Rc::new(RefCell::new(Vec::new()))
}

/// Output pin that appends each write to a shared trace
pub struct RecordingPin {
    line: Line,
    trace: Trace,
}

impl RecordingPin {
    pub fn new(line: Line, trace: &Trace) -> Self {
        Self {
            line,
            trace: Rc::clone(trace),
        }
    }
}

impl ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.trace.borrow_mut().push((self.line, Level::Low));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.trace.borrow_mut().push((self.line, Level::High));
        Ok(())
    }
}

/// Output pin whose driver always reports a fault
pub struct FailingPin;

impl ErrorType for FailingPin {
    type Error = ErrorKind;
}

impl OutputPin for FailingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Err(ErrorKind::Other)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Err(ErrorKind::Other)
    }
}

/// Latch whose rising edge fails a set number of times, then recovers
///
/// Successful writes are appended to the shared trace.
pub struct FlakyLatch {
    trace: Trace,
    pub failed_raises: Rc<Cell<u32>>,
    raises_to_fail: Cell<u32>,
}

impl FlakyLatch {
    pub fn new(raises_to_fail: u32, trace: &Trace) -> Self {
        Self {
            trace: Rc::clone(trace),
            failed_raises: Rc::new(Cell::new(0)),
            raises_to_fail: Cell::new(raises_to_fail),
        }
    }

    /// Latch that never manages to rise
    pub fn stuck_low(trace: &Trace) -> Self {
        Self::new(u32::MAX, trace)
    }

    pub fn failed_raises(&self) -> Rc<Cell<u32>> {
        Rc::clone(&self.failed_raises)
    }
}

impl ErrorType for FlakyLatch {
    type Error = ErrorKind;
}

impl OutputPin for FlakyLatch {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.trace.borrow_mut().push((Line::Latch, Level::Low));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let remaining = self.raises_to_fail.get();
        if remaining > 0 {
            self.raises_to_fail.set(remaining - 1);
            self.failed_raises.set(self.failed_raises.get() + 1);
            return Err(ErrorKind::Other);
        }
        self.trace.borrow_mut().push((Line::Latch, Level::High));
        Ok(())
    }
}

/// Delay that returns at once, summing what was asked for
#[derive(Default)]
pub struct NoDelay {
    pub total_ns: u64,
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

/// DMA port that records what it was asked to do
///
/// The shift-busy flag is shared so a test can hold it high while the
/// transport owns the port.
#[derive(Default)]
pub struct ScriptedPort {
    pub started: Vec<[u8; REGISTER_BYTES]>,
    pub stops: u32,
    pub busy: Rc<Cell<bool>>,
    pub busy_reads: Cell<u32>,
}

impl ScriptedPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn busy_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.busy)
    }
}

impl DmaPort for ScriptedPort {
    fn start(&mut self, frame: [u8; REGISTER_BYTES]) {
        self.started.push(frame);
    }

    fn stop(&mut self) {
        self.stops += 1;
    }

    fn is_busy(&self) -> bool {
        self.busy_reads.set(self.busy_reads.get() + 1);
        self.busy.get()
    }
}

/// Data bits sampled on each rising clock edge
pub fn clocked_bits(trace: &[(Line, Level)]) -> Vec<bool> {
    let mut data = Level::Low;
    let mut clock = Level::Low;
    let mut bits = Vec::new();
    for &(line, level) in trace {
        match line {
            Line::Data => data = level,
            Line::Clock => {
                if clock == Level::Low && level == Level::High {
                    bits.push(data == Level::High);
                }
                clock = level;
            }
            Line::Latch => {}
        }
    }
    bits
}

/// Word assembled from the sampled bits, first bit most significant
pub fn clocked_word(trace: &[(Line, Level)]) -> u32 {
    clocked_bits(trace)
        .into_iter()
        .fold(0u32, |acc, bit| (acc << 1) | u32::from(bit))
}

/// Writes to one line, in order
pub fn levels_of(trace: &[(Line, Level)], line: Line) -> Vec<Level> {
    trace
        .iter()
        .filter(|(l, _)| *l == line)
        .map(|&(_, level)| level)
        .collect()
}

/// Last level written to a line
pub fn last_level(trace: &[(Line, Level)], line: Line) -> Option<Level> {
    trace
        .iter()
        .rev()
        .find(|(l, _)| *l == line)
        .map(|&(_, level)| level)
}
