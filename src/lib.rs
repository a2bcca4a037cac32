//! ADF435x USB Register Bridge Firmware Library
//!
//! This library turns a USB vendor control request carrying a 32-bit word
//! into a latch-framed write on the 3-wire serial bus of an ADF4350/ADF4351
//! frequency synthesizer. The board is an STM32G474 with the synthesizer's
//! LE/CLK/DATA lines wired to PA4/PA5/PA7.
//!
//! # Architecture
//!
//! The firmware is organized in layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      USB LAYER                               │
//! │  embassy-usb device  │  Vendor request handler               │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     BRIDGE LAYER                             │
//! │  Command decoder  │  Mailbox  │  Transfer guard  │  Writer   │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    TRANSPORT LAYER                           │
//! │  Latch frame  │  Bit-bang GPIO  │  SPI + DMA                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    RTOS / SCHEDULER                          │
//! │           embassy-rs (async/await executor)                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Interrupt side stores, main loop works**: USB callbacks only touch
//!   atomics; GPIO and DMA setup run from the polled writer
//! - **One transport trait**: the frame controller never knows whether it
//!   drives GPIO or DMA
//! - **No unsafe in application code**: All unsafe isolated in HAL layers
//! - **Explicit error handling**: All fallible operations return `Result`

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;
#[cfg(feature = "embedded")]
pub use embassy_usb;

/// Hardware Abstraction Layer
///
/// Board bindings for the transports and the status LED.
#[cfg(feature = "embedded")]
pub mod hal;

/// USB Subsystem
///
/// Vendor request handler plugged into embassy-usb.
#[cfg(feature = "embedded")]
pub mod usb;

/// Bridge Core
///
/// Interrupt-side callbacks, command mailbox, guard and polled writer.
pub mod bridge;

/// Serial Transports
///
/// Latch framing over bit-bang and DMA shift-out.
pub mod transport;

/// Vendor Control Protocol
///
/// Setup packet parsing and SetRegister decoding.
pub mod protocol;

/// Error taxonomy
pub mod error;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
#[cfg(feature = "embedded")]
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::bridge::writer::{CommandOutcome, PollReport, RegisterWriter};
    pub use crate::bridge::Bridge;
    pub use crate::config::*;
    pub use crate::error::{BridgeError, BridgeResult};
    pub use crate::transport::frame::LatchFrame;
    pub use crate::transport::SerialTransport;
    pub use crate::types::*;

    // Common traits
    pub use embedded_hal::digital::OutputPin;

    // Embassy
    pub use embassy_time::{Duration, Instant, Timer};

    // Error handling
    pub use core::result::Result;

    // Logging
    pub use defmt::{debug, error, info, trace, warn};
}
