//! Shared types used across the bridge firmware
//!
//! This module defines the domain types that flow from the USB decoder
//! down to the serial transports.

use core::fmt;

use crate::config::{ACTIVITY_BLINK_MS, HEARTBEAT_OFF_MS, HEARTBEAT_ON_MS};

/// Number of bits in one synthesizer register
pub const REGISTER_BITS: u32 = 32;

/// Number of payload bytes that carry one register
pub const REGISTER_BYTES: usize = 4;

/// One 32-bit configuration register of the target synthesizer
///
/// The value is opaque to the bridge: it is shifted out verbatim,
/// most significant bit first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RegisterValue(u32);

impl RegisterValue {
    /// All bits clear
    pub const ZERO: Self = Self(0);

    /// Wrap a raw register word
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw register word
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Build from four bytes, most significant byte first
    #[must_use]
    pub const fn from_be_bytes(bytes: [u8; REGISTER_BYTES]) -> Self {
        Self(u32::from_be_bytes(bytes))
    }

    /// Build from four bytes in the given wire order
    #[must_use]
    pub const fn from_bytes(bytes: [u8; REGISTER_BYTES], order: PayloadByteOrder) -> Self {
        match order {
            PayloadByteOrder::MsbFirst => Self(u32::from_be_bytes(bytes)),
            PayloadByteOrder::LsbFirst => Self(u32::from_le_bytes(bytes)),
        }
    }

    /// Bytes in bus order (most significant byte first)
    #[must_use]
    pub const fn to_bus_bytes(self) -> [u8; REGISTER_BYTES] {
        self.0.to_be_bytes()
    }

    /// Get bit `index` (0 = LSB, 31 = MSB)
    #[must_use]
    pub const fn bit(self, index: u32) -> bool {
        index < REGISTER_BITS && (self.0 >> index) & 1 != 0
    }

    /// Iterate the bits in shift order, bit 31 first
    #[must_use]
    pub const fn bits_msb_first(self) -> BitsMsbFirst {
        BitsMsbFirst {
            value: self,
            remaining: REGISTER_BITS,
        }
    }
}

impl From<u32> for RegisterValue {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<RegisterValue> for u32 {
    fn from(value: RegisterValue) -> Self {
        value.0
    }
}

impl fmt::Debug for RegisterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegisterValue(0x{:08X})", self.0)
    }
}

impl fmt::Display for RegisterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for RegisterValue {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "0x{:08X}", self.0);
    }
}

/// Iterator over the bits of a register, MSB first
#[derive(Clone, Debug)]
pub struct BitsMsbFirst {
    value: RegisterValue,
    remaining: u32,
}

impl Iterator for BitsMsbFirst {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.value.bit(self.remaining))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for BitsMsbFirst {}

/// Byte order of the register payload in the control data stage
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PayloadByteOrder {
    /// Most significant byte first
    #[default]
    MsbFirst,
    /// Least significant byte first (legacy pyadf435x host tool)
    LsbFirst,
}

#[cfg(feature = "embedded")]
impl defmt::Format for PayloadByteOrder {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::MsbFirst => defmt::write!(f, "MSB-first"),
            Self::LsbFirst => defmt::write!(f, "LSB-first"),
        }
    }
}

/// Logic level of a bus line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// Driven low
    Low,
    /// Driven high
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Self::High
        } else {
            Self::Low
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Level {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Low => defmt::write!(f, "L"),
            Self::High => defmt::write!(f, "H"),
        }
    }
}

/// Status LED state
///
/// The LED rests in the heartbeat phase and is inverted briefly for each
/// committed register write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LedState {
    /// LED is off
    #[default]
    Off,
    /// LED is on
    On,
}

impl LedState {
    /// Opposite state
    #[must_use]
    pub const fn toggle(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }

    /// How long the heartbeat rests in this state, in milliseconds
    #[must_use]
    pub const fn heartbeat_hold_ms(self) -> u64 {
        match self {
            Self::On => HEARTBEAT_ON_MS,
            Self::Off => HEARTBEAT_OFF_MS,
        }
    }

    /// Flicker shown for one committed write: the inverted state and how
    /// long to hold it before returning to `self`
    #[must_use]
    pub const fn activity_flicker(self) -> (Self, u64) {
        (self.toggle(), ACTIVITY_BLINK_MS)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for LedState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Off => defmt::write!(f, "OFF"),
            Self::On => defmt::write!(f, "ON"),
        }
    }
}
