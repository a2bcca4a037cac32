//! Bit-Bang Serial Transport
//!
//! Shifts a register out by toggling two GPIO lines. Each bit is put on
//! the data line, left to settle, then clocked in on the rising edge.
//! The call blocks for the full 32 clock periods.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::BitTiming;
use crate::error::{BridgeError, BridgeResult};
use crate::transport::{SerialTransport, TransportStatus};
use crate::types::{Level, RegisterValue};

/// GPIO-driven transport
pub struct BitBangTransport<CLK, DAT, D> {
    clock: CLK,
    data: DAT,
    delay: D,
    timing: BitTiming,
    /// Words shifted since creation
    words: u32,
}

impl<CLK, DAT, D> BitBangTransport<CLK, DAT, D>
where
    CLK: OutputPin,
    DAT: OutputPin,
    D: DelayNs,
{
    /// Create a transport over already-configured output pins
    ///
    /// The clock line is expected to idle low.
    #[must_use]
    pub fn new(clock: CLK, data: DAT, delay: D, timing: BitTiming) -> Self {
        Self {
            clock,
            data,
            delay,
            timing,
            words: 0,
        }
    }

    /// Get the edge timing
    #[must_use]
    pub const fn timing(&self) -> BitTiming {
        self.timing
    }

    /// Number of words shifted so far
    #[must_use]
    pub const fn words_shifted(&self) -> u32 {
        self.words
    }

    /// Give the pins and delay back
    pub fn release(self) -> (CLK, DAT, D) {
        (self.clock, self.data, self.delay)
    }

    fn drive<P: OutputPin>(pin: &mut P, level: Level) -> BridgeResult<()> {
        let result = match level {
            Level::High => pin.set_high(),
            Level::Low => pin.set_low(),
        };
        result.map_err(|_| BridgeError::Pin)
    }

    fn shift(&mut self, value: RegisterValue) -> BridgeResult<()> {
        for bit in value.bits_msb_first() {
            Self::drive(&mut self.clock, Level::Low)?;
            Self::drive(&mut self.data, Level::from(bit))?;
            self.delay.delay_ns(self.timing.settle_ns);
            Self::drive(&mut self.clock, Level::High)?;
            self.delay.delay_ns(self.timing.hold_ns);
        }
        Self::drive(&mut self.clock, Level::Low)
    }
}

impl<CLK, DAT, D> SerialTransport for BitBangTransport<CLK, DAT, D>
where
    CLK: OutputPin,
    DAT: OutputPin,
    D: DelayNs,
{
    fn transmit(&mut self, value: RegisterValue) -> BridgeResult<()> {
        self.shift(value)?;
        self.words = self.words.wrapping_add(1);
        Ok(())
    }

    fn status(&mut self) -> TransportStatus {
        TransportStatus::Idle
    }
}
