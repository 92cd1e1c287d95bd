//! Link counters and fault signals.
//!
//! The bare protocol drops bytes and stalls silently. A node records those
//! conditions here so that firmware with somewhere to report to can do so.

/// A condition the link recovered from without help, but lost something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// A received byte was overwritten before it was read.
    Overrun,
    /// The interrupt entry ran with no registered event pending.
    SpuriousInterrupt,
    /// A queued byte waited
    /// [`STALL_EXCHANGE_LIMIT`](crate::consts::STALL_EXCHANGE_LIMIT) exchange durations
    /// with no exchange completing.
    Stall,
    /// The slave was deselected in the middle of a byte.
    DiscardedPartial,
}

/// Per-node counters. All of them wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Completed exchanges.
    pub transfers: u16,
    /// Received bytes overwritten before being read.
    pub overruns: u16,
    /// Interrupt entries with nothing to do.
    pub spurious: u16,
    /// Queued outgoing bytes replaced by a newer one.
    pub replaced: u16,
    /// Stall reports.
    pub stalls: u16,
    /// Partial bytes discarded on deselect.
    pub discarded: u16,
    last_fault: Option<Fault>,
}

impl LinkStats {
    /// Counts one completed exchange.
    pub fn record_transfer(&mut self) {
        self.transfers = self.transfers.wrapping_add(1);
    }

    /// Counts one replaced queued byte.
    pub fn record_replaced(&mut self) {
        self.replaced = self.replaced.wrapping_add(1);
    }

    /// Counts `fault` and remembers it as the latest one.
    pub fn raise(&mut self, fault: Fault) {
        let counter = match fault {
            Fault::Overrun => &mut self.overruns,
            Fault::SpuriousInterrupt => &mut self.spurious,
            Fault::Stall => &mut self.stalls,
            Fault::DiscardedPartial => &mut self.discarded,
        };
        *counter = counter.wrapping_add(1);
        warn!("link fault: {:?}", fault);
        self.last_fault = Some(fault);
    }

    /// Latest fault not yet collected.
    pub fn take_fault(&mut self) -> Option<Fault> {
        self.last_fault.take()
    }
}
