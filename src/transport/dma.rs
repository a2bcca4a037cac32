//! DMA Serial Transport
//!
//! Streams the four register bytes into the SPI data register with a DMA
//! channel. Completion happens in two stages that the hardware does not
//! report together:
//!
//! ```text
//!  Idle ──transmit──▶ Transmitting ──DMA TC irq──▶ Draining ──!BSY──▶ Idle
//! ```
//!
//! The transfer-complete interrupt only means the last byte reached the
//! SPI buffer. The shifter may still be clocking it out, so the latch must
//! wait for the busy flag, which is polled from the main loop.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::error::{BridgeError, BridgeResult};
use crate::transport::{SerialTransport, TransportStatus};
use crate::types::{RegisterValue, REGISTER_BYTES};

/// Hardware side of the DMA transport
///
/// Implemented by the board layer over the SPI peripheral and its DMA
/// channel.
pub trait DmaPort {
    /// Hand `frame` to whatever runs the DMA transfer
    fn start(&mut self, frame: [u8; REGISTER_BYTES]);

    /// Withdraw the peripheral's DMA request after the transfer completed
    ///
    /// Called once per frame, before the busy flag is polled. Channel and
    /// interrupt teardown stay with the driver that ran the transfer.
    fn stop(&mut self);

    /// Shift peripheral busy flag
    fn is_busy(&self) -> bool;
}

impl<P: DmaPort + ?Sized> DmaPort for &mut P {
    fn start(&mut self, frame: [u8; REGISTER_BYTES]) {
        P::start(self, frame);
    }

    fn stop(&mut self) {
        P::stop(self);
    }

    fn is_busy(&self) -> bool {
        P::is_busy(self)
    }
}

/// In-flight flag shared between the transport and the DMA interrupt
///
/// Set by the transport before the channel starts, cleared by the
/// transfer-complete interrupt. Lives in a `static`.
#[derive(Debug)]
pub struct DmaCompletion {
    in_flight: AtomicBool,
    completions: AtomicU32,
}

impl DmaCompletion {
    /// Create an idle completion flag
    #[must_use]
    pub const fn new() -> Self {
        Self {
            in_flight: AtomicBool::new(false),
            completions: AtomicU32::new(0),
        }
    }

    /// Mark a transfer as queued
    pub fn arm(&self) {
        self.in_flight.store(true, Ordering::Release);
    }

    /// Transfer-complete interrupt body
    pub fn on_transfer_complete(&self) {
        self.in_flight.store(false, Ordering::Release);
        self.completions.fetch_add(1, Ordering::Relaxed);
    }

    /// Whether the mover still has data queued
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Number of completion interrupts seen
    #[must_use]
    pub fn completions(&self) -> u32 {
        self.completions.load(Ordering::Relaxed)
    }
}

impl Default for DmaCompletion {
    fn default() -> Self {
        Self::new()
    }
}

/// DMA transport state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DmaState {
    /// Nothing queued, bus idle
    #[default]
    Idle,
    /// Mover feeding the shift peripheral
    Transmitting,
    /// Mover done, shifter still clocking out the last byte
    Draining,
}

#[cfg(feature = "embedded")]
impl defmt::Format for DmaState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Idle => defmt::write!(f, "Idle"),
            Self::Transmitting => defmt::write!(f, "Transmitting"),
            Self::Draining => defmt::write!(f, "Draining"),
        }
    }
}

/// SPI + DMA transport
pub struct DmaTransport<'a, P> {
    port: P,
    completion: &'a DmaCompletion,
    state: DmaState,
}

impl<'a, P: DmaPort> DmaTransport<'a, P> {
    /// Create a transport over a configured port
    #[must_use]
    pub fn new(port: P, completion: &'a DmaCompletion) -> Self {
        Self {
            port,
            completion,
            state: DmaState::Idle,
        }
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> DmaState {
        self.state
    }

    /// Borrow the hardware port
    #[must_use]
    pub const fn port(&self) -> &P {
        &self.port
    }

    /// Give the port back
    pub fn release(self) -> P {
        self.port
    }
}

impl<P: DmaPort> SerialTransport for DmaTransport<'_, P> {
    fn transmit(&mut self, value: RegisterValue) -> BridgeResult<()> {
        if self.state != DmaState::Idle {
            return Err(BridgeError::BusyTransport);
        }

        // Armed before the channel runs so an early interrupt is not lost
        self.completion.arm();
        self.port.start(value.to_bus_bytes());
        self.state = DmaState::Transmitting;
        Ok(())
    }

    fn status(&mut self) -> TransportStatus {
        if self.state == DmaState::Transmitting {
            if self.completion.is_in_flight() {
                return TransportStatus::Busy;
            }
            self.port.stop();
            self.state = DmaState::Draining;
        }

        if self.state == DmaState::Draining {
            if self.port.is_busy() {
                return TransportStatus::Busy;
            }
            self.state = DmaState::Idle;
        }

        TransportStatus::Idle
    }
}
