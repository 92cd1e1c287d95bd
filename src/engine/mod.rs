//! Full-duplex byte exchange over a clocked serial bus.
//!
//! The engine is the clocked-serial peripheral of a node. It holds one
//! outgoing byte and one incoming byte, shifts them MSB first over a clock
//! line, a data-out line, a data-in line and a select line, and raises a
//! transfer-complete flag once eight bits went each way.
//!
//! Two implementations share the [`Exchange`] trait:
//!
//! - [`MasterEngine`]: drives clock and select; a [`load`](Exchange::load) starts an exchange.
//! - [`SlaveEngine`]: follows the clock while selected and re-arms itself after every byte.
//!
//! Both are advanced by [`tick()`](Exchange::tick), called at the peripheral
//! clock rate from a timer interrupt or a polling loop.
//!
//! ## Exchange discipline
//!
//! At most one exchange is in flight. Loading a byte fails with
//! [`LinkError::Busy`] while bits are shifting and with
//! [`LinkError::Unacknowledged`] while a received byte has not been read.
//! Receiving while the previous byte is unread overwrites it and latches an
//! overrun that [`take_overrun()`](Exchange::take_overrun) reports once.

use crate::consts::BITS_PER_TRANSFER;
use crate::error::LinkError;
use core::convert::Infallible;

mod master;
mod slave;

pub use master::MasterEngine;
pub use slave::SlaveEngine;

/// One-byte full-duplex exchange, as seen by the node.
pub trait Exchange {
    /// Sets the byte sent by the next exchange. On the master this starts it.
    fn load(&mut self, byte: u8) -> Result<(), LinkError>;

    /// Takes the received byte, acknowledging the exchange.
    ///
    /// Returns [`nb::Error::WouldBlock`] while nothing has been received.
    fn read(&mut self) -> nb::Result<u8, Infallible>;

    /// A completed exchange holds an unread byte.
    fn buffer_full(&self) -> bool;

    /// Bits are currently being shifted.
    fn in_flight(&self) -> bool;

    /// The transfer-complete flag is raised.
    fn transfer_pending(&self) -> bool;

    /// Clears the transfer-complete flag.
    fn clear_transfer_flag(&mut self);

    /// Reports, once, that a received byte was overwritten before being read.
    fn take_overrun(&mut self) -> bool;

    /// Reports, once, that a partial byte was dropped because select was
    /// released mid-byte. Only a slave can observe this.
    fn take_discarded(&mut self) -> bool {
        false
    }

    /// Ticks one exchange takes from `load` to completion, if the engine sets
    /// the pace. A clock follower cannot know.
    fn exchange_ticks(&self) -> Option<u32> {
        None
    }

    /// Advances the engine by one peripheral clock tick.
    fn tick(&mut self) -> Result<(), LinkError>;
}

/// Eight-bit shift register, MSB first in both directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ShiftRegister {
    out: u8,
    input: u8,
    count: u8,
}

impl ShiftRegister {
    /// Starts a new byte sending `out`.
    pub(crate) fn start(&mut self, out: u8) {
        self.out = out;
        self.input = 0;
        self.count = 0;
    }

    /// The bit to present for the next capture.
    pub(crate) fn out_bit(&self) -> bool {
        let index = BITS_PER_TRANSFER - 1 - self.count.min(BITS_PER_TRANSFER - 1);
        self.out & (1 << index) != 0
    }

    /// Shifts one captured bit in.
    pub(crate) fn capture(&mut self, bit: bool) {
        self.input = (self.input << 1) | u8::from(bit);
        self.count += 1;
    }

    /// Bits captured so far.
    pub(crate) fn count(&self) -> u8 {
        self.count
    }

    /// All eight bits were captured.
    pub(crate) fn is_complete(&self) -> bool {
        self.count >= BITS_PER_TRANSFER
    }

    /// The byte shifted in.
    pub(crate) fn received(&self) -> u8 {
        self.input
    }
}

/// Buffers and flags shared by both engines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Latch {
    /// OutgoingByte
    pub(crate) tx: u8,
    /// IncomingByte
    rx: u8,
    full: bool,
    flag: bool,
    overrun: bool,
}

impl Latch {
    pub(crate) fn new(tx: u8) -> Self {
        Self {
            tx,
            ..Self::default()
        }
    }

    /// Latches a completed exchange and raises the transfer flag.
    pub(crate) fn complete(&mut self, received: u8) {
        if self.full {
            self.overrun = true;
        }
        self.rx = received;
        self.full = true;
        self.flag = true;
    }

    pub(crate) fn read(&mut self) -> nb::Result<u8, Infallible> {
        if !self.full {
            return Err(nb::Error::WouldBlock);
        }
        self.full = false;
        Ok(self.rx)
    }

    pub(crate) fn full(&self) -> bool {
        self.full
    }

    pub(crate) fn flag(&self) -> bool {
        self.flag
    }

    pub(crate) fn clear_flag(&mut self) {
        self.flag = false;
    }

    pub(crate) fn take_overrun(&mut self) -> bool {
        core::mem::take(&mut self.overrun)
    }
}
