//! Command Mailbox
//!
//! Single-producer/single-consumer hand-off of the pending command between
//! USB interrupt context and the polled main loop.
//!
//! The control word packs three fields so that one atomic load gives a
//! consistent view:
//!
//! ```text
//!  31            16 15        8 7         0
//! ┌────────────────┬───────────┬───────────┐
//! │   generation   │  received │   phase   │
//! └────────────────┴───────────┴───────────┘
//! ```
//!
//! Every producer transition bumps the generation, so the consumer's
//! compare-exchange fails if the interrupt replaced the command after the
//! consumer looked at it.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::types::REGISTER_BYTES;

const PHASE_EMPTY: u32 = 0;
const PHASE_RECEIVING: u32 = 1;
const PHASE_READY: u32 = 2;

const PHASE_MASK: u32 = 0xFF;
const COUNT_SHIFT: u32 = 8;
const COUNT_MASK: u32 = 0xFF;
const GEN_SHIFT: u32 = 16;

const fn pack(phase: u32, received: u32, generation: u32) -> u32 {
    (generation << GEN_SHIFT) | ((received & COUNT_MASK) << COUNT_SHIFT) | (phase & PHASE_MASK)
}

const fn phase_of(word: u32) -> u32 {
    word & PHASE_MASK
}

const fn count_of(word: u32) -> usize {
    ((word >> COUNT_SHIFT) & COUNT_MASK) as usize
}

const fn generation_of(word: u32) -> u32 {
    word >> GEN_SHIFT
}

/// Pending command as seen by the consumer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PendingCommand {
    /// Nothing pending
    None,
    /// SetRegister recognized; data stage still arriving
    Receiving,
    /// SetRegister data stage finished
    Ready {
        /// First four payload bytes as received
        bytes: [u8; REGISTER_BYTES],
        /// Data-stage byte count (saturates at 255)
        received: usize,
    },
}

impl PendingCommand {
    /// Check if nothing is pending
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for PendingCommand {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::None => defmt::write!(f, "None"),
            Self::Receiving => defmt::write!(f, "Receiving"),
            Self::Ready { bytes, received } => {
                defmt::write!(f, "Ready({:02X}, {})", bytes, received);
            }
        }
    }
}

/// Consumer's view of the mailbox at one instant
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot {
    word: u32,
    /// Decoded pending command
    pub pending: PendingCommand,
}

/// Shared pending-command slot
#[derive(Debug)]
pub struct CommandMailbox {
    control: AtomicU32,
    payload: AtomicU32,
}

impl CommandMailbox {
    /// Create an empty mailbox
    #[must_use]
    pub const fn new() -> Self {
        Self {
            control: AtomicU32::new(pack(PHASE_EMPTY, 0, 0)),
            payload: AtomicU32::new(0),
        }
    }

    fn publish(&self, phase: u32, received: usize) {
        let current = self.control.load(Ordering::Relaxed);
        let generation = generation_of(current).wrapping_add(1) & 0xFFFF;
        let received = u32::try_from(received).unwrap_or(COUNT_MASK).min(COUNT_MASK);
        self.control
            .store(pack(phase, received, generation), Ordering::Release);
    }

    /// Producer: SetRegister recognized, data stage about to start
    pub fn begin(&self) {
        self.publish(PHASE_RECEIVING, 0);
    }

    /// Producer: data stage finished with `data`
    ///
    /// Returns `false` when no SetRegister was waiting for data, in which
    /// case the mailbox is untouched.
    pub fn complete(&self, data: &[u8]) -> bool {
        if phase_of(self.control.load(Ordering::Relaxed)) != PHASE_RECEIVING {
            return false;
        }
        self.store_payload(data);
        self.publish(PHASE_READY, data.len());
        true
    }

    /// Producer: request and data delivered together
    pub fn deliver(&self, data: &[u8]) {
        self.begin();
        self.store_payload(data);
        self.publish(PHASE_READY, data.len());
    }

    /// Producer: drop whatever is pending
    pub fn reset(&self) {
        self.publish(PHASE_EMPTY, 0);
    }

    fn store_payload(&self, data: &[u8]) {
        let mut bytes = [0u8; REGISTER_BYTES];
        let n = data.len().min(REGISTER_BYTES);
        bytes[..n].copy_from_slice(&data[..n]);
        self.payload
            .store(u32::from_ne_bytes(bytes), Ordering::Relaxed);
    }

    /// Consumer: look at the pending command
    #[must_use]
    pub fn peek(&self) -> Snapshot {
        let word = self.control.load(Ordering::Acquire);
        let pending = match phase_of(word) {
            PHASE_RECEIVING => PendingCommand::Receiving,
            PHASE_READY => PendingCommand::Ready {
                bytes: self.payload.load(Ordering::Relaxed).to_ne_bytes(),
                received: count_of(word),
            },
            _ => PendingCommand::None,
        };
        Snapshot { word, pending }
    }

    /// Consumer: retire the command seen in `snapshot`
    ///
    /// Returns `false` if the producer replaced it in the meantime; the
    /// newer command stays pending.
    pub fn consume(&self, snapshot: &Snapshot) -> bool {
        let empty = pack(PHASE_EMPTY, 0, generation_of(snapshot.word));
        self.control
            .compare_exchange(snapshot.word, empty, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Check if nothing is pending
    #[must_use]
    pub fn is_empty(&self) -> bool {
        phase_of(self.control.load(Ordering::Acquire)) == PHASE_EMPTY
    }
}

impl Default for CommandMailbox {
    fn default() -> Self {
        Self::new()
    }
}
