//! Latch/Frame Controller
//!
//! One register write is framed as:
//!
//! ```text
//! LE  ‾‾‾\______________________________/‾‾‾
//! CLK ____/‾\_/‾\_ ... _/‾\_______________
//!         b31  b30       b0
//! ```
//!
//! The latch goes low before the first clock edge and high again only once
//! the transport reports the bus idle. Raising it earlier would commit a
//! partially shifted word.

use embedded_hal::digital::OutputPin;

use crate::error::{BridgeError, BridgeResult};
use crate::transport::{SerialTransport, TransportStatus};
use crate::types::RegisterValue;

/// Frame controller state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FrameState {
    /// Latch high, no frame open
    #[default]
    Idle,
    /// Latch low, transport shifting
    Shifting,
}

#[cfg(feature = "embedded")]
impl defmt::Format for FrameState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Idle => defmt::write!(f, "Idle"),
            Self::Shifting => defmt::write!(f, "Shifting"),
        }
    }
}

/// Progress of the current frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameEvent {
    /// No frame open
    Idle,
    /// Frame open, bus still shifting
    InFlight,
    /// Latch raised; the register now holds this value
    Committed(RegisterValue),
}

#[cfg(feature = "embedded")]
impl defmt::Format for FrameEvent {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Idle => defmt::write!(f, "Idle"),
            Self::InFlight => defmt::write!(f, "InFlight"),
            Self::Committed(v) => defmt::write!(f, "Committed({})", v),
        }
    }
}

/// Latch framing around a serial transport
pub struct LatchFrame<L, T> {
    latch: L,
    transport: T,
    state: FrameState,
    current: RegisterValue,
}

impl<L, T> LatchFrame<L, T>
where
    L: OutputPin,
    T: SerialTransport,
{
    /// Wrap a transport; the latch pin is expected to idle high
    #[must_use]
    pub fn new(latch: L, transport: T) -> Self {
        Self {
            latch,
            transport,
            state: FrameState::Idle,
            current: RegisterValue::ZERO,
        }
    }

    /// Drive the latch to its idle level
    pub fn init(&mut self) -> BridgeResult<()> {
        self.latch.set_high().map_err(|_| BridgeError::Pin)?;
        self.state = FrameState::Idle;
        Ok(())
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> FrameState {
        self.state
    }

    /// Check if no frame is open
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.state, FrameState::Idle)
    }

    /// Borrow the transport
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Give the latch pin and transport back
    pub fn release(self) -> (L, T) {
        (self.latch, self.transport)
    }

    /// Open a frame and start shifting `value`
    ///
    /// Returns [`FrameEvent::Committed`] when the transport finished
    /// synchronously, [`FrameEvent::InFlight`] otherwise. If a line
    /// driver fails mid-frame the latch is left low, so the partial word
    /// is never committed, and the frame is dropped.
    ///
    /// A failed latch raise also drops the frame: the error is reported
    /// once and the value is never reported as committed.
    pub fn begin(&mut self, value: RegisterValue) -> BridgeResult<FrameEvent> {
        if self.state != FrameState::Idle || !self.transport.status().is_idle() {
            return Err(BridgeError::BusyTransport);
        }

        self.latch.set_low().map_err(|_| BridgeError::Pin)?;
        self.transport.transmit(value)?;
        self.state = FrameState::Shifting;
        self.current = value;

        self.service()
    }

    /// Close the open frame once the bus is idle
    ///
    /// On a latch fault the frame is dropped and the controller is idle
    /// again.
    pub fn service(&mut self) -> BridgeResult<FrameEvent> {
        if self.state == FrameState::Idle {
            return Ok(FrameEvent::Idle);
        }

        if self.transport.status() == TransportStatus::Busy {
            return Ok(FrameEvent::InFlight);
        }

        self.state = FrameState::Idle;
        self.latch.set_high().map_err(|_| BridgeError::Pin)?;
        Ok(FrameEvent::Committed(self.current))
    }
}
