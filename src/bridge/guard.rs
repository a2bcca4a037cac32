//! Transfer-State Guard
//!
//! Decides, once per poll cycle, whether the pending command may be handed
//! to the transport. The transport must never read a payload the USB
//! peripheral is still filling, and must never start while the previous
//! frame is open.

use crate::bridge::mailbox::PendingCommand;
use crate::config::SET_REG_PAYLOAD_LEN;
use crate::error::BridgeError;
use crate::types::{PayloadByteOrder, RegisterValue};

/// Why a poll cycle took no action
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeferReason {
    /// Control endpoint still receiving the data stage
    EndpointBusy,
    /// Previous frame not yet committed
    TransportBusy,
    /// Host replaced the command while it was being retired
    Superseded,
}

#[cfg(feature = "embedded")]
impl defmt::Format for DeferReason {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::EndpointBusy => defmt::write!(f, "EndpointBusy"),
            Self::TransportBusy => defmt::write!(f, "TransportBusy"),
            Self::Superseded => defmt::write!(f, "Superseded"),
        }
    }
}

/// Guard verdict for one poll cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Nothing pending
    Idle,
    /// Keep the command, look again next cycle
    Defer(DeferReason),
    /// Drop the command without touching the bus
    Discard(BridgeError),
    /// Start a frame with this value
    Fire(RegisterValue),
}

#[cfg(feature = "embedded")]
impl defmt::Format for GuardDecision {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Idle => defmt::write!(f, "Idle"),
            Self::Defer(r) => defmt::write!(f, "Defer({})", r),
            Self::Discard(e) => defmt::write!(f, "Discard({})", e),
            Self::Fire(v) => defmt::write!(f, "Fire({})", v),
        }
    }
}

/// Transfer-state guard
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferGuard {
    byte_order: PayloadByteOrder,
}

impl TransferGuard {
    /// Create a guard decoding payloads in `byte_order`
    #[must_use]
    pub const fn new(byte_order: PayloadByteOrder) -> Self {
        Self { byte_order }
    }

    /// Get the payload byte order
    #[must_use]
    pub const fn byte_order(&self) -> PayloadByteOrder {
        self.byte_order
    }

    /// Evaluate the pending command against endpoint and transport state
    #[must_use]
    pub fn evaluate(&self, pending: &PendingCommand, transport_idle: bool) -> GuardDecision {
        match *pending {
            PendingCommand::None => GuardDecision::Idle,
            PendingCommand::Receiving => GuardDecision::Defer(DeferReason::EndpointBusy),
            PendingCommand::Ready { received, .. } if received != SET_REG_PAYLOAD_LEN => {
                GuardDecision::Discard(BridgeError::IncompletePayload { received })
            }
            PendingCommand::Ready { .. } if !transport_idle => {
                GuardDecision::Defer(DeferReason::TransportBusy)
            }
            PendingCommand::Ready { bytes, .. } => {
                GuardDecision::Fire(RegisterValue::from_bytes(bytes, self.byte_order))
            }
        }
    }
}

impl Default for TransferGuard {
    fn default() -> Self {
        Self::new(PayloadByteOrder::MsbFirst)
    }
}
