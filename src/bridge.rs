//! USB-to-Serial Bridge
//!
//! Splits the work between the two execution contexts of the firmware:
//!
//! ```text
//!  USB interrupt context            main loop
//! ┌────────────────────┐        ┌──────────────────────┐
//! │ Bridge::on_setup   │        │ RegisterWriter::poll │
//! │ Bridge::on_data_.. │──────▶ │   TransferGuard      │
//! │ Bridge::on_control │mailbox │   LatchFrame         │
//! └────────────────────┘        └──────────────────────┘
//! ```
//!
//! The callbacks only store into atomics; GPIO and DMA work happens in
//! the polled writer.

pub mod guard;
pub mod mailbox;
pub mod writer;

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::bridge::guard::TransferGuard;
use crate::bridge::mailbox::CommandMailbox;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::protocol::{decode_setup, SetupPacket, SetupResponse, VendorCommand};

/// Interrupt-side state of the bridge, shared with the main loop
#[derive(Debug)]
pub struct Bridge {
    config: BridgeConfig,
    mailbox: CommandMailbox,
    configured: AtomicBool,
    rejected: AtomicU32,
}

impl Bridge {
    /// Create a bridge; usable in a `static`
    #[must_use]
    pub const fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            mailbox: CommandMailbox::new(),
            configured: AtomicBool::new(false),
            rejected: AtomicU32::new(0),
        }
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Get the command mailbox
    #[must_use]
    pub const fn mailbox(&self) -> &CommandMailbox {
        &self.mailbox
    }

    /// Guard matching this bridge's payload byte order
    #[must_use]
    pub const fn guard(&self) -> TransferGuard {
        TransferGuard::new(self.config.byte_order)
    }

    /// Whether the host has selected a configuration
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.configured.load(Ordering::Acquire)
    }

    /// Number of SetRegister requests rejected for a bad length
    #[must_use]
    pub fn rejected(&self) -> u32 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Device configured (`true`) or reset/deconfigured (`false`)
    pub fn on_configured(&self, configured: bool) {
        self.configured.store(configured, Ordering::Release);
        if !configured {
            self.mailbox.reset();
        }
    }

    /// Decode a setup packet, reporting why it was not taken
    pub fn try_setup(&self, setup: &SetupPacket) -> BridgeResult<VendorCommand> {
        if self.config.require_configured && !self.is_configured() {
            return Err(BridgeError::UnsupportedRequest);
        }
        decode_setup(setup).inspect_err(|err| {
            if matches!(err, BridgeError::IncompletePayload { .. }) {
                self.rejected.fetch_add(1, Ordering::Relaxed);
            }
        })
    }

    /// Setup packet received
    ///
    /// On a match the pending command is recorded and the stack is told to
    /// receive the payload. Anything else leaves the bridge untouched.
    pub fn on_setup(&self, setup: &SetupPacket) -> SetupResponse {
        match self.try_setup(setup) {
            Ok(command) => {
                self.mailbox.begin();
                SetupResponse::Accept {
                    data_len: command.payload_len(),
                }
            }
            Err(_) => SetupResponse::NotSupported,
        }
    }

    /// Control data stage complete
    ///
    /// Returns `false` if no SetRegister was waiting for data.
    pub fn on_data_stage(&self, data: &[u8]) -> bool {
        self.mailbox.complete(data)
    }

    /// Request and data stage delivered together, validated on the spot
    pub fn try_control_out(&self, setup: &SetupPacket, data: &[u8]) -> BridgeResult<VendorCommand> {
        let command = self.try_setup(setup)?;
        if data.len() != command.payload_len() {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            return Err(BridgeError::IncompletePayload {
                received: data.len(),
            });
        }
        self.mailbox.deliver(data);
        Ok(command)
    }

    /// Request and data stage delivered together
    pub fn on_control_out(&self, setup: &SetupPacket, data: &[u8]) -> SetupResponse {
        match self.try_control_out(setup, data) {
            Ok(command) => SetupResponse::Accept {
                data_len: command.payload_len(),
            },
            Err(_) => SetupResponse::NotSupported,
        }
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new(BridgeConfig::DEFAULT)
    }
}
