//! System configuration and hardware constants
//!
//! This module defines compile-time constants for the bridge hardware and
//! the USB protocol it speaks. All pin mappings, clock frequencies, and
//! protocol parameters are centralized here.

use crate::types::{PayloadByteOrder, REGISTER_BYTES};

/// System clock frequency (STM32G474 @ 170MHz)
pub const SYSTEM_CLOCK_HZ: u32 = 170_000_000;

/// USB VID (Analog Devices, as expected by the evaluation software)
pub const USB_VID: u16 = 0x0456;

/// USB PID (ADF4xxx USB evaluation board)
pub const USB_PID: u16 = 0xB40D;

/// USB manufacturer string
pub const USB_MANUFACTURER: &str = "ANALOG DEVICES";

/// USB product string
pub const USB_PRODUCT: &str = "ADF4xxx USB Eval Board";

/// Maximum bus power draw in mA
pub const USB_MAX_POWER_MA: u16 = 100;

/// Control endpoint packet size
pub const USB_EP0_PACKET_SIZE: u8 = 64;

/// Vendor-specific interface class
pub const USB_VENDOR_CLASS: u8 = 0xFF;

/// The only valid configuration value
pub const USB_CONFIGURATION_VALUE: u8 = 1;

/// The only interface number
pub const USB_INTERFACE_NUMBER: u8 = 0;

/// The only alternate setting
pub const USB_ALTERNATE_SETTING: u8 = 0;

/// bmRequestType of SetRegister: host-to-device, vendor, device
pub const SET_REG_REQUEST_TYPE: u8 = 0x40;

/// bRequest of SetRegister
pub const CMD_SET_REG: u8 = 0xDD;

/// Payload length of SetRegister
pub const SET_REG_PAYLOAD_LEN: usize = REGISTER_BYTES;

/// Size of the USB control transfer buffer
pub const USB_CONTROL_BUFFER_SIZE: usize = 64;

/// SPI clock for the DMA transport (ADF435x accepts up to 20 MHz)
pub const SPI_FREQUENCY_HZ: u32 = 1_000_000;

/// Bit-bang data settle time before the rising clock edge
pub const BIT_SETTLE_NS: u32 = 340;

/// Bit-bang clock high time
pub const BIT_HOLD_NS: u32 = 340;

/// Main loop poll interval in microseconds
pub const POLL_INTERVAL_US: u64 = 50;

/// Heartbeat LED on time in milliseconds
pub const HEARTBEAT_ON_MS: u64 = 100;

/// Heartbeat LED off time in milliseconds
pub const HEARTBEAT_OFF_MS: u64 = 900;

/// Activity flicker length in milliseconds
pub const ACTIVITY_BLINK_MS: u64 = 20;

/// Number of recently written registers kept for diagnostics
pub const REGISTER_HISTORY_LEN: usize = 8;

/// Pin assignments for GPIO
pub mod pins {
    //! GPIO pin assignments matching the evaluation board wiring

    /// Status LED
    pub const LED_STATUS: &str = "PC13";

    /// Latch enable (LE), plain GPIO on both transports
    pub const LATCH: &str = "PA4";

    /// Serial clock (SPI1 SCK on the DMA transport)
    pub const CLOCK: &str = "PA5";

    /// Serial data (SPI1 MOSI on the DMA transport)
    pub const DATA: &str = "PA7";

    /// USB D+ (handled by USB peripheral)
    pub const USB_DP: &str = "PA12";

    /// USB D- (handled by USB peripheral)
    pub const USB_DM: &str = "PA11";
}

/// DMA channel assignments
pub mod dma {
    //! DMA channel assignments for the register shift-out

    /// SPI1 TX DMA channel
    pub const SPI1_TX: u8 = 3;
}

/// Bit-bang edge timing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitTiming {
    /// Delay between presenting a data bit and raising the clock
    pub settle_ns: u32,
    /// Delay between raising and lowering the clock
    pub hold_ns: u32,
}

impl BitTiming {
    /// Board default timing
    pub const DEFAULT: Self = Self {
        settle_ns: BIT_SETTLE_NS,
        hold_ns: BIT_HOLD_NS,
    };

    /// Duration of one full bit cell in nanoseconds
    #[must_use]
    pub const fn bit_period_ns(&self) -> u32 {
        self.settle_ns + self.hold_ns
    }
}

impl Default for BitTiming {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BitTiming {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "BitTiming({}ns/{}ns)", self.settle_ns, self.hold_ns);
    }
}

/// Runtime options of the bridge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Byte order of the SetRegister data stage
    pub byte_order: PayloadByteOrder,
    /// Reject SetRegister until the host has selected a configuration
    pub require_configured: bool,
    /// Bit-bang edge timing
    pub timing: BitTiming,
}

impl BridgeConfig {
    /// Default configuration: MSB-first payload, configuration required
    pub const DEFAULT: Self = Self {
        byte_order: PayloadByteOrder::MsbFirst,
        require_configured: true,
        timing: BitTiming::DEFAULT,
    };

    /// Configuration for the legacy host tool, which sends the low byte first
    #[must_use]
    pub const fn legacy_host() -> Self {
        Self {
            byte_order: PayloadByteOrder::LsbFirst,
            ..Self::DEFAULT
        }
    }

    /// Override the payload byte order
    #[must_use]
    pub const fn with_byte_order(mut self, byte_order: PayloadByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Override the configuration requirement
    #[must_use]
    pub const fn with_require_configured(mut self, require: bool) -> Self {
        self.require_configured = require;
        self
    }

    /// Override the bit-bang timing
    #[must_use]
    pub const fn with_timing(mut self, timing: BitTiming) -> Self {
        self.timing = timing;
        self
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BridgeConfig {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "BridgeConfig(order={}, require_cfg={}, {})",
            self.byte_order,
            self.require_configured,
            self.timing
        );
    }
}
