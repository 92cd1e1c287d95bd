//! Constants shared by both link roles.
//!
//! These values describe the two-node link as the board is wired and clocked:
//! counter start points, the analog channel the master samples, the shift width
//! of one exchange and the fault thresholds.
//!
//! ## Key Concepts
//!
//! - **Counters**: the master counts up from zero, the slave counts down from `u8::MAX`.
//! - **Designated channel**: the only analog channel whose samples are forwarded to the bus.
//! - **Stall**: measured in exchange durations, so it scales with the bus clock divider.

/// Start value of the master's ascending counter.
pub const MASTER_COUNTER_START: u8 = 0;

/// Start value of the slave's descending counter.
pub const SLAVE_COUNTER_START: u8 = u8::MAX;

/// Analog channel whose samples the master forwards to the bus (AN1).
pub const SAMPLE_CHANNEL: u8 = 1;

/// Number of bits shifted in each direction by one exchange.
pub const BITS_PER_TRANSFER: u8 = 8;

/// Settling time of the sampler after it has been enabled, in microseconds.
pub const SAMPLER_SETTLE_US: u32 = 40;

/// Exchange durations a queued byte may wait without any exchange completing
/// before the master reports a stalled link.
pub const STALL_EXCHANGE_LIMIT: u32 = 4;

/// Maximum number of event handlers a node registers.
pub const MAX_HANDLERS: usize = 2;
