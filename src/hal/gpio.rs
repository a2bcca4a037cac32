//! GPIO Abstractions
//!
//! Board outputs: the heartbeat/activity LED and the three lines of the
//! synthesizer bus, each brought up at its idle level.

use embassy_stm32::gpio::{Level, Output, Pin, Speed};
use embassy_stm32::Peripheral;

use crate::types::LedState;

/// Heartbeat/activity LED on PC13
pub struct StatusLed<'d> {
    pin: Output<'d>,
    state: LedState,
}

impl<'d> StatusLed<'d> {
    /// Wrap a pin configured low; the LED starts off
    #[must_use]
    pub fn new(pin: Output<'d>) -> Self {
        Self {
            pin,
            state: LedState::Off,
        }
    }

    /// Drive the LED to `state`
    pub fn set(&mut self, state: LedState) {
        match state {
            LedState::On => self.pin.set_high(),
            LedState::Off => self.pin.set_low(),
        }
        self.state = state;
    }

    /// Advance the heartbeat and return how long to hold the new state
    pub fn beat(&mut self) -> u64 {
        self.set(self.state.toggle());
        self.state.heartbeat_hold_ms()
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> LedState {
        self.state
    }
}

/// Latch, clock and data lines of the synthesizer bus
///
/// Lines come up at their idle levels: latch high, clock and data low.
pub struct SerialBusPins<'d> {
    /// Latch enable (LE)
    pub latch: Output<'d>,
    /// Serial clock
    pub clock: Output<'d>,
    /// Serial data
    pub data: Output<'d>,
}

impl<'d> SerialBusPins<'d> {
    /// Configure all three lines as GPIO outputs
    #[must_use]
    pub fn new(
        latch: impl Peripheral<P = impl Pin> + 'd,
        clock: impl Peripheral<P = impl Pin> + 'd,
        data: impl Peripheral<P = impl Pin> + 'd,
    ) -> Self {
        Self {
            latch: latch_output(latch),
            clock: Output::new(clock, Level::Low, Speed::VeryHigh),
            data: Output::new(data, Level::Low, Speed::VeryHigh),
        }
    }

    /// Split into (latch, clock, data)
    #[must_use]
    pub fn split(self) -> (Output<'d>, Output<'d>, Output<'d>) {
        (self.latch, self.clock, self.data)
    }
}

/// Configure the latch line on its own, idling high
///
/// Used by the DMA transport, where clock and data belong to SPI1.
#[must_use]
pub fn latch_output<'d>(pin: impl Peripheral<P = impl Pin> + 'd) -> Output<'d> {
    Output::new(pin, Level::High, Speed::VeryHigh)
}
