use super::{Exchange, Latch, ShiftRegister};
use crate::config::{EngineConfig, Phase};
use crate::error::LinkError;
use crate::role::Role;
use core::convert::Infallible;
use embedded_hal::digital::{InputPin, OutputPin};

/// Bus slave: follows the master's clock while selected.
///
/// Each `tick()` samples the select line (active low) and the clock line. A
/// newly asserted select arms the shift register with the loaded byte. Clock
/// transitions shift bits according to the configured phase. After eight
/// captured bits the received byte is latched, the transfer flag raised and the
/// register re-armed with the loaded byte, so the slave is always ready for the
/// next byte without software help. Losing select mid-byte discards the
/// partial byte.
///
/// ## Type Parameters
///
/// - `SCK`: clock input
/// - `SDO`: data output (to the master's data input)
/// - `SDI`: data input (from the master's data output)
/// - `SS`: select input, active low
#[derive(Debug)]
pub struct SlaveEngine<SCK, SDO, SDI, SS>
where
    SCK: InputPin,
    SDO: OutputPin,
    SDI: InputPin,
    SS: InputPin,
{
    /// Clock pin
    pub sck: SCK,
    /// Data out pin
    pub sdo: SDO,
    /// Data in pin
    pub sdi: SDI,
    /// Select pin
    pub ss: SS,
    config: EngineConfig,
    shift: ShiftRegister,
    latch: Latch,
    selected: bool,
    clock_active: bool,
    discarded: bool,
}

impl<SCK, SDO, SDI, SS> SlaveEngine<SCK, SDO, SDI, SS>
where
    SCK: InputPin,
    SDO: OutputPin,
    SDI: InputPin,
    SS: InputPin,
{
    /// Builds the engine with `initial` as the first byte to send.
    pub fn new(
        sck: SCK,
        sdo: SDO,
        sdi: SDI,
        ss: SS,
        config: EngineConfig,
        initial: u8,
    ) -> Result<Self, LinkError> {
        config.validate(Role::Slave)?;
        Ok(Self {
            sck,
            sdo,
            sdi,
            ss,
            config,
            shift: ShiftRegister::default(),
            latch: Latch::new(initial),
            selected: false,
            clock_active: false,
            discarded: false,
        })
    }

    /// The slave is currently selected by the master.
    pub fn selected(&self) -> bool {
        self.selected
    }

    fn present_bit(&mut self) -> Result<(), LinkError> {
        if self.shift.out_bit() {
            self.sdo.set_high().map_err(|_| LinkError::Pin)
        } else {
            self.sdo.set_low().map_err(|_| LinkError::Pin)
        }
    }

    /// Captures one bit and latches the byte once eight are in.
    fn capture(&mut self) -> Result<(), LinkError> {
        let bit = self.sdi.is_high().map_err(|_| LinkError::Pin)?;
        self.shift.capture(bit);
        if self.shift.is_complete() {
            let received = self.shift.received();
            self.latch.complete(received);
            self.shift.start(self.latch.tx);
            trace!("slave exchange done, received {:#x}", received);
        }
        Ok(())
    }

    fn arm(&mut self) -> Result<(), LinkError> {
        self.shift.start(self.latch.tx);
        self.clock_active = false;
        if self.config.phase == Phase::CaptureOnFirstTransition {
            self.present_bit()?;
        }
        Ok(())
    }

    fn deselect(&mut self) {
        self.selected = false;
        if self.shift.count() > 0 {
            debug!("slave deselected after {} bits", self.shift.count());
            self.discarded = true;
            self.shift.start(self.latch.tx);
        }
    }
}

impl<SCK, SDO, SDI, SS> Exchange for SlaveEngine<SCK, SDO, SDI, SS>
where
    SCK: InputPin,
    SDO: OutputPin,
    SDI: InputPin,
    SS: InputPin,
{
    fn load(&mut self, byte: u8) -> Result<(), LinkError> {
        if self.in_flight() {
            return Err(LinkError::Busy);
        }
        if self.latch.full() {
            return Err(LinkError::Unacknowledged);
        }
        self.latch.tx = byte;
        if self.selected {
            // Between bytes of a held select: the next byte goes out immediately.
            self.shift.start(byte);
            if self.config.phase == Phase::CaptureOnFirstTransition && !self.clock_active {
                self.present_bit()?;
            }
        }
        trace!("slave loaded {:#x}", byte);
        Ok(())
    }

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        self.latch.read()
    }

    fn buffer_full(&self) -> bool {
        self.latch.full()
    }

    fn in_flight(&self) -> bool {
        self.selected && self.shift.count() > 0
    }

    fn transfer_pending(&self) -> bool {
        self.latch.flag()
    }

    fn clear_transfer_flag(&mut self) {
        self.latch.clear_flag();
    }

    fn take_overrun(&mut self) -> bool {
        self.latch.take_overrun()
    }

    fn take_discarded(&mut self) -> bool {
        core::mem::take(&mut self.discarded)
    }

    fn tick(&mut self) -> Result<(), LinkError> {
        let selected = self.ss.is_low().map_err(|_| LinkError::Pin)?;
        if !selected {
            if self.selected {
                self.deselect();
            }
            return Ok(());
        }
        if !self.selected {
            self.selected = true;
            self.arm()?;
        }

        let level = self.sck.is_high().map_err(|_| LinkError::Pin)?;
        let active = self.config.polarity.level(true) == level;
        if active == self.clock_active {
            return Ok(());
        }
        self.clock_active = active;

        match (self.config.phase, active) {
            (Phase::CaptureOnFirstTransition, true) => self.capture(),
            (Phase::CaptureOnFirstTransition, false) => self.present_bit(),
            (Phase::CaptureOnSecondTransition, true) => self.present_bit(),
            (Phase::CaptureOnSecondTransition, false) => self.capture(),
        }
    }
}
