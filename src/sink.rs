//! Output-visible 8-bit registers.
//!
//! A node exposes two of them: the display, showing the last byte received
//! over the bus, and the counter, showing the node's own [`LocalCounter`].
//! Both are plain parallel outputs; [`PinBank`] drives eight `embedded-hal`
//! output pins with bit *n* on pin *n*.
//!
//! [`LocalCounter`]: crate::counter::LocalCounter

use crate::error::LinkError;
use embedded_hal::digital::OutputPin;

/// Something that can show one byte.
pub trait ByteSink {
    /// Writes `value` to the output.
    fn write_byte(&mut self, value: u8) -> Result<(), LinkError>;
}

/// Eight output pins driven as one parallel port.
#[derive(Debug)]
pub struct PinBank<P>
where
    P: OutputPin,
{
    pins: [P; 8],
}

impl<P> PinBank<P>
where
    P: OutputPin,
{
    /// Wraps the pins, least significant bit first.
    pub fn new(pins: [P; 8]) -> Self {
        Self { pins }
    }

    /// Releases the pins.
    pub fn free(self) -> [P; 8] {
        self.pins
    }
}

impl<P> ByteSink for PinBank<P>
where
    P: OutputPin,
{
    fn write_byte(&mut self, value: u8) -> Result<(), LinkError> {
        for (bit, pin) in self.pins.iter_mut().enumerate() {
            if value & (1 << bit) != 0 {
                pin.set_high().map_err(|_| LinkError::Pin)?;
            } else {
                pin.set_low().map_err(|_| LinkError::Pin)?;
            }
        }
        Ok(())
    }
}

/// An output register that remembers the last value it showed.
#[derive(Debug)]
pub struct Register<S> {
    sink: S,
    value: u8,
}

impl<S> Register<S>
where
    S: ByteSink,
{
    /// Wraps `sink` and shows `initial` on it.
    pub fn new(sink: S, initial: u8) -> Result<Self, LinkError> {
        let mut register = Self {
            sink,
            value: initial,
        };
        register.write(initial)?;
        Ok(register)
    }

    /// Shows `value`. The previous value is overwritten.
    pub fn write(&mut self, value: u8) -> Result<(), LinkError> {
        self.sink.write_byte(value)?;
        self.value = value;
        Ok(())
    }

    /// Last value shown.
    pub fn value(&self) -> u8 {
        self.value
    }
}
