//! Register Writer
//!
//! Main-loop half of the bridge. Each [`RegisterWriter::poll`] cycle:
//! 1. closes a frame left open by an asynchronous transport,
//! 2. runs the transfer-state guard on the pending command,
//! 3. retires the command and starts a frame, or defers it.
//!
//! Steps 2 and 3 are also reachable through [`RegisterWriter::dispatch`]
//! with a snapshot taken earlier.
//!
//! A command that is not deferred is retired whether or not it reached the
//! bus, so a malformed request blocks later ones for one cycle at most.

use embedded_hal::digital::OutputPin;
use heapless::HistoryBuffer;

use crate::bridge::guard::{DeferReason, GuardDecision, TransferGuard};
use crate::bridge::mailbox::{CommandMailbox, Snapshot};
use crate::config::REGISTER_HISTORY_LEN;
use crate::error::BridgeError;
use crate::transport::frame::{FrameEvent, LatchFrame};
use crate::transport::SerialTransport;
use crate::types::RegisterValue;

/// What happened to the pending command during one poll
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Nothing pending
    Idle,
    /// Command kept for a later cycle
    Deferred(DeferReason),
    /// Command dropped without bus activity
    Discarded(BridgeError),
    /// Frame opened for this value
    Started(RegisterValue),
    /// Frame could not be opened
    Failed(BridgeError),
}

#[cfg(feature = "embedded")]
impl defmt::Format for CommandOutcome {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Idle => defmt::write!(f, "Idle"),
            Self::Deferred(r) => defmt::write!(f, "Deferred({})", r),
            Self::Discarded(e) => defmt::write!(f, "Discarded({})", e),
            Self::Started(v) => defmt::write!(f, "Started({})", v),
            Self::Failed(e) => defmt::write!(f, "Failed({})", e),
        }
    }
}

/// Result of one poll cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollReport {
    /// Register whose frame was closed this cycle
    pub committed: Option<RegisterValue>,
    /// Fate of the pending command
    pub command: CommandOutcome,
}

impl PollReport {
    const fn idle() -> Self {
        Self {
            committed: None,
            command: CommandOutcome::Idle,
        }
    }
}

/// Counters kept by the writer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Frames committed (latch raised)
    pub committed: u32,
    /// Commands dropped for a bad byte count
    pub discarded: u32,
    /// Poll cycles that deferred a command
    pub deferred: u32,
    /// Frames abandoned on a line error
    pub failed: u32,
    /// Commands replaced by the host before they were retired
    pub superseded: u32,
}

#[cfg(feature = "embedded")]
impl defmt::Format for WriterStats {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Stats(ok={}, discarded={}, deferred={}, failed={}, superseded={})",
            self.committed,
            self.discarded,
            self.deferred,
            self.failed,
            self.superseded
        );
    }
}

/// Polled consumer of the command mailbox
pub struct RegisterWriter<'a, L, T> {
    mailbox: &'a CommandMailbox,
    guard: TransferGuard,
    frame: LatchFrame<L, T>,
    history: HistoryBuffer<RegisterValue, REGISTER_HISTORY_LEN>,
    stats: WriterStats,
}

impl<'a, L, T> RegisterWriter<'a, L, T>
where
    L: OutputPin,
    T: SerialTransport,
{
    /// Create a writer draining `mailbox` into `frame`
    #[must_use]
    pub fn new(mailbox: &'a CommandMailbox, guard: TransferGuard, frame: LatchFrame<L, T>) -> Self {
        Self {
            mailbox,
            guard,
            frame,
            history: HistoryBuffer::new(),
            stats: WriterStats::default(),
        }
    }

    /// Run one poll cycle
    pub fn poll(&mut self) -> PollReport {
        let closed = self.close_frame();
        let snapshot = self.mailbox.peek();
        let report = self.dispatch(&snapshot);
        PollReport {
            committed: report.committed.or(closed),
            command: report.command,
        }
    }

    /// Retire the command seen in `snapshot`
    ///
    /// If the host replaced the command after `snapshot` was taken, nothing
    /// is retired and the outcome is [`DeferReason::Superseded`]; the newer
    /// command is picked up by the next poll.
    pub fn dispatch(&mut self, snapshot: &Snapshot) -> PollReport {
        let mut report = PollReport::idle();

        let command = match self.guard.evaluate(&snapshot.pending, self.frame.is_idle()) {
            GuardDecision::Idle => CommandOutcome::Idle,
            GuardDecision::Defer(reason) => {
                self.stats.deferred = self.stats.deferred.wrapping_add(1);
                CommandOutcome::Deferred(reason)
            }
            GuardDecision::Discard(err) => {
                if self.mailbox.consume(snapshot) {
                    self.stats.discarded = self.stats.discarded.wrapping_add(1);
                    CommandOutcome::Discarded(err)
                } else {
                    self.superseded()
                }
            }
            GuardDecision::Fire(value) => {
                if self.mailbox.consume(snapshot) {
                    self.start(value, &mut report)
                } else {
                    self.superseded()
                }
            }
        };

        report.command = command;
        report
    }

    /// Close a frame left open by an asynchronous transport
    ///
    /// A frame whose latch fails to rise is counted once and dropped.
    fn close_frame(&mut self) -> Option<RegisterValue> {
        match self.frame.service() {
            Ok(FrameEvent::Committed(value)) => {
                self.record(value);
                Some(value)
            }
            Ok(FrameEvent::Idle | FrameEvent::InFlight) => None,
            Err(_) => {
                self.stats.failed = self.stats.failed.wrapping_add(1);
                None
            }
        }
    }

    fn start(&mut self, value: RegisterValue, report: &mut PollReport) -> CommandOutcome {
        match self.frame.begin(value) {
            Ok(FrameEvent::Committed(done)) => {
                self.record(done);
                report.committed = Some(done);
                CommandOutcome::Started(value)
            }
            Ok(FrameEvent::InFlight | FrameEvent::Idle) => CommandOutcome::Started(value),
            Err(err) => {
                self.stats.failed = self.stats.failed.wrapping_add(1);
                CommandOutcome::Failed(err)
            }
        }
    }

    fn superseded(&mut self) -> CommandOutcome {
        self.stats.superseded = self.stats.superseded.wrapping_add(1);
        CommandOutcome::Deferred(DeferReason::Superseded)
    }

    fn record(&mut self, value: RegisterValue) {
        self.history.write(value);
        self.stats.committed = self.stats.committed.wrapping_add(1);
    }

    /// Get the counters
    #[must_use]
    pub const fn stats(&self) -> WriterStats {
        self.stats
    }

    /// Most recently committed register
    #[must_use]
    pub fn last_committed(&self) -> Option<RegisterValue> {
        self.history.recent().copied()
    }

    /// Recently committed registers, oldest first
    pub fn history(&self) -> impl Iterator<Item = RegisterValue> + '_ {
        self.history.oldest_ordered().copied()
    }

    /// Check if no frame is open
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.frame.is_idle()
    }

    /// Borrow the frame controller
    #[must_use]
    pub const fn frame(&self) -> &LatchFrame<L, T> {
        &self.frame
    }

    /// Give the frame controller back
    pub fn release(self) -> LatchFrame<L, T> {
        self.frame
    }
}
