//! Bridge error taxonomy
//!
//! None of these are fatal. Each one maps to a local, non-persistent
//! effect on the pending command.

use core::fmt;

/// Result alias used across the bridge
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors raised while decoding or executing a register write
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BridgeError {
    /// Control request is not the SetRegister vendor command
    UnsupportedRequest,
    /// SetRegister carried a byte count other than four
    IncompletePayload {
        /// Bytes announced or received
        received: usize,
    },
    /// Endpoint or prior transaction still busy; retry on the next poll
    BusyTransport,
    /// A bus line driver reported an error
    Pin,
}

impl BridgeError {
    /// Whether the caller should retry on the next poll cycle
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::BusyTransport)
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedRequest => write!(f, "unsupported control request"),
            Self::IncompletePayload { received } => {
                write!(f, "register payload has {received} bytes, expected 4")
            }
            Self::BusyTransport => write!(f, "transport busy"),
            Self::Pin => write!(f, "bus line error"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BridgeError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::UnsupportedRequest => defmt::write!(f, "UnsupportedRequest"),
            Self::IncompletePayload { received } => {
                defmt::write!(f, "IncompletePayload({})", received);
            }
            Self::BusyTransport => defmt::write!(f, "BusyTransport"),
            Self::Pin => defmt::write!(f, "Pin"),
        }
    }
}
