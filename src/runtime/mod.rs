//! Driving a node: clock maths and tick sources.
//!
//! A node needs three entry points serviced: `tick()` at the peripheral clock
//! rate, `service()` whenever an event flag is up, and `poll()` from the
//! foreground. Two ways of doing that are provided: a global node shared with
//! interrupt handlers through `critical_section::with` (`isr` feature), or a
//! blocking loop over a `DelayNs` provider (`delay-loop` feature).
//!
//! Contains helpers for both, including:
//! - `bus_bit_rate`: serial clock for a peripheral clock and [`ClockDivider`]
//! - `tick_interval_us`: timer period for a tick rate
//! - `exchange_ticks`: ticks one byte exchange occupies on the master
//! - `run_link_loop`: blocking node loop for `DelayNs` (feature `delay-loop`)
//! - `global_node_tick`, `global_node_service` and the `*_link_node!()` macros:
//!   interrupt-based wrappers (feature `isr`)
//!
//! Peripheral clock rates and the resulting exchange rate:
//!
//! | Peripheral clock | Divider | Bus bit rate | Byte exchange |
//! |------------------|---------|--------------|---------------|
//! |            4 MHz |    Div4 |      1 Mbit/s |       8.25 µs |
//! |            4 MHz |   Div16 |    250 kbit/s |       32.25 µs |
//! |            4 MHz |   Div64 |   62.5 kbit/s |      128.25 µs |

use crate::config::ClockDivider;
use crate::consts::BITS_PER_TRANSFER;
use libm::round;

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg_attr(feature = "delay-loop", allow(unused_imports))]
#[cfg(feature = "delay-loop")]
pub use delay::*;

#[cfg(feature = "isr")]
mod isr;
#[cfg_attr(feature = "isr", allow(unused_imports))]
#[cfg(feature = "isr")]
pub use isr::*;

#[cfg(feature = "isr")]
mod macros;

/// 1,000,000 microseconds = 1 second
pub const MICROSECONDS_PER_SECOND: u32 = 1_000_000;

/// Serial clock rate in bits per second.
///
/// # Arguments
/// - `peripheral_hz`: peripheral clock in Hz
/// - `divider`: bus clock divider
pub fn bus_bit_rate(peripheral_hz: u32, divider: ClockDivider) -> u32 {
    peripheral_hz / divider.ratio()
}

/// Timer period for a tick rate, rounded to the nearest microsecond.
///
/// # Returns
/// - `tick_us` for `run_link_loop`, never less than 1
pub fn tick_interval_us(tick_hz: u32) -> u32 {
    if tick_hz == 0 {
        return MICROSECONDS_PER_SECOND;
    }
    let period = round(f64::from(MICROSECONDS_PER_SECOND) / f64::from(tick_hz));
    (period as u32).max(1)
}

/// Ticks the master engine spends on one exchange, select release included.
///
/// The master node scales its stall threshold by this.
pub const fn exchange_ticks(divider: ClockDivider) -> u32 {
    BITS_PER_TRANSFER as u32 * divider.ratio() + 1
}
