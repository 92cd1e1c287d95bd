//! Boot-time role selection.

use embedded_hal::digital::InputPin;

/// Which side of the link this node plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    /// Drives the clock and select line and initiates every exchange.
    Master,
    /// Follows the master's clock while selected.
    Slave,
}

impl Role {
    /// Reads the role pin once. High selects [`Role::Master`]; low or an
    /// unreadable pin selects [`Role::Slave`].
    pub fn select<P: InputPin>(pin: &mut P) -> Self {
        match pin.is_high() {
            Ok(true) => Role::Master,
            _ => Role::Slave,
        }
    }
}
