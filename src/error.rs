//! Error type returned by every fallible link operation.

use thiserror::Error;

/// Errors surfaced by the transfer engine, the sampler, the output registers
/// and the node wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// A byte was loaded while an exchange is still shifting.
    #[error("an exchange is already in flight")]
    Busy,
    /// A byte was loaded while the previously received byte is still unread.
    #[error("the last received byte has not been acknowledged")]
    Unacknowledged,
    /// A bus or port pin reported an error.
    #[error("pin access failed")]
    Pin,
    /// The analog converter reported an error.
    #[error("analog conversion failed")]
    Converter,
    /// An output register could not be written.
    #[error("output register write failed")]
    Sink,
    /// The configuration cannot be honoured in the requested role.
    #[error("invalid configuration: {0}")]
    Config(&'static str),
}
