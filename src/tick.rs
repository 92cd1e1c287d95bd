//! Transfer initiation queue.
//!
//! The master's sampling cadence paces its transfers: a fresh sample becomes
//! the next outgoing byte, but only once the engine holds a completed, unread
//! exchange. [`TransferTick`] makes that coupling explicit. Outgoing bytes wait
//! in a single slot, and two named [`Trigger`]s pump it. A pump acknowledges
//! the completed exchange (reading the incoming byte) and loads the waiting
//! byte.

use crate::engine::Exchange;
use crate::error::LinkError;
use heapless::spsc::Queue;

/// What caused a pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    /// A sample was accepted.
    SampleComplete,
    /// The engine finished an exchange.
    TransferComplete,
}

/// Depth-1 transfer-initiation queue.
#[derive(Debug)]
pub struct TransferTick {
    // capacity N - 1
    pending: Queue<u8, 2>,
}

impl Default for TransferTick {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferTick {
    /// Empty queue.
    pub const fn new() -> Self {
        Self {
            pending: Queue::new(),
        }
    }

    /// Byte waiting to be loaded.
    pub fn pending(&self) -> Option<u8> {
        self.pending.peek().copied()
    }

    /// Queues `byte` for the next exchange. A byte already waiting is dropped;
    /// returns `true` in that case.
    pub fn offer(&mut self, byte: u8) -> bool {
        let replaced = self.pending.dequeue().is_some();
        // cannot fail: the slot was just emptied
        let _ = self.pending.enqueue(byte);
        replaced
    }

    /// Loads the waiting byte if the engine holds a completed, unread exchange.
    ///
    /// Returns the acknowledged incoming byte when a load happened.
    pub fn pump<E: Exchange>(
        &mut self,
        trigger: Trigger,
        engine: &mut E,
    ) -> Result<Option<u8>, LinkError> {
        if self.pending.is_empty() || engine.in_flight() || !engine.buffer_full() {
            return Ok(None);
        }
        let incoming = match engine.read() {
            Ok(byte) => byte,
            Err(_) => return Ok(None),
        };
        if let Some(outgoing) = self.pending.dequeue() {
            engine.load(outgoing)?;
            debug!(
                "{:?}: sent {:#x}, received {:#x}",
                trigger, outgoing, incoming
            );
        }
        Ok(Some(incoming))
    }
}
