//! Serial Transports
//!
//! Two interchangeable ways of shifting a 32-bit register onto the
//! latch/clock/data bus:
//! - `bitbang`: GPIO toggling, synchronous
//! - `dma`: SPI peripheral fed by a DMA channel, asynchronous
//!
//! The latch line belongs to the `frame` controller, which is generic over
//! [`SerialTransport`] and never knows which implementation it drives.

pub mod bitbang;
pub mod dma;
pub mod frame;

use crate::error::BridgeResult;
use crate::types::RegisterValue;

/// Bus activity as seen by the frame controller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportStatus {
    /// No bits left to shift; latch may be raised
    Idle,
    /// Bits are still queued or on the wire
    Busy,
}

impl TransportStatus {
    /// Check if idle
    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for TransportStatus {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Idle => defmt::write!(f, "Idle"),
            Self::Busy => defmt::write!(f, "Busy"),
        }
    }
}

/// Shifts one register word onto the bus, MSB first
pub trait SerialTransport {
    /// Start shifting `value`
    ///
    /// Synchronous implementations return once all 32 clock edges have
    /// been generated. Asynchronous ones return as soon as the hardware
    /// is running and report completion through [`Self::status`].
    fn transmit(&mut self, value: RegisterValue) -> BridgeResult<()>;

    /// Report bus activity, advancing any pending completion work
    fn status(&mut self) -> TransportStatus;
}

impl<T: SerialTransport + ?Sized> SerialTransport for &mut T {
    fn transmit(&mut self, value: RegisterValue) -> BridgeResult<()> {
        T::transmit(self, value)
    }

    fn status(&mut self) -> TransportStatus {
        T::status(self)
    }
}
