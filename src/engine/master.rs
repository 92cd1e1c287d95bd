use super::{Exchange, Latch, ShiftRegister};
use crate::config::{EngineConfig, Phase, SamplePoint};
use crate::error::LinkError;
use crate::role::Role;
use crate::runtime::exchange_ticks;
use core::convert::Infallible;
use embedded_hal::digital::{InputPin, OutputPin};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MasterState {
    Idle,
    Shifting,
    /// Last bit shifted; select is released and the byte latched on the next tick.
    Releasing,
}

/// Bus master: clock source and select driver.
///
/// `load()` asserts select (active low), presents the first bit and starts an
/// eight-cycle exchange. Every `divider.half_period()` ticks the clock line
/// toggles. On the tick after the last bit, select is released, the received
/// byte latched and the transfer flag raised.
///
/// ## Type Parameters
///
/// - `SCK`: clock output
/// - `SDO`: data output (to the slave's data input)
/// - `SDI`: data input (from the slave's data output)
/// - `SS`: select output, active low
#[derive(Debug)]
pub struct MasterEngine<SCK, SDO, SDI, SS>
where
    SCK: OutputPin,
    SDO: OutputPin,
    SDI: InputPin,
    SS: OutputPin,
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
    state: MasterState,
    shift: ShiftRegister,
    latch: Latch,
    clock_active: bool,
    tick_counter: u8,
}

impl<SCK, SDO, SDI, SS> MasterEngine<SCK, SDO, SDI, SS>
where
    SCK: OutputPin,
    SDO: OutputPin,
    SDI: InputPin,
    SS: OutputPin,
{
    /// Builds the engine, parks the clock at its idle level and deselects the slave.
    pub fn new(
        sck: SCK,
        sdo: SDO,
        sdi: SDI,
        ss: SS,
        config: EngineConfig,
    ) -> Result<Self, LinkError> {
        config.validate(Role::Master)?;
        let mut engine = Self {
            sck,
            sdo,
            sdi,
            ss,
            config,
            state: MasterState::Idle,
            shift: ShiftRegister::default(),
            latch: Latch::default(),
            clock_active: false,
            tick_counter: 0,
        };
        engine.write_clock(false)?;
        engine.ss.set_high().map_err(|_| LinkError::Pin)?;
        Ok(engine)
    }

    /// Configuration the engine runs with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Byte sent by the current or last exchange.
    pub fn outgoing(&self) -> u8 {
        self.latch.tx
    }

    fn write_clock(&mut self, active: bool) -> Result<(), LinkError> {
        self.clock_active = active;
        if self.config.polarity.level(active) {
            self.sck.set_high().map_err(|_| LinkError::Pin)
        } else {
            self.sck.set_low().map_err(|_| LinkError::Pin)
        }
    }

    fn present_bit(&mut self) -> Result<(), LinkError> {
        if self.shift.out_bit() {
            self.sdo.set_high().map_err(|_| LinkError::Pin)
        } else {
            self.sdo.set_low().map_err(|_| LinkError::Pin)
        }
    }

    fn capture(&mut self) -> Result<(), LinkError> {
        let bit = self.sdi.is_high().map_err(|_| LinkError::Pin)?;
        self.shift.capture(bit);
        Ok(())
    }

    fn finish(&mut self) {
        self.state = MasterState::Releasing;
    }

    /// Idle to active clock transition.
    fn leading_edge(&mut self) -> Result<(), LinkError> {
        self.write_clock(true)?;
        match self.config.phase {
            Phase::CaptureOnFirstTransition => {
                if self.config.sample == SamplePoint::Middle {
                    self.capture()?;
                }
                Ok(())
            }
            Phase::CaptureOnSecondTransition => self.present_bit(),
        }
    }

    /// Active to idle clock transition.
    fn trailing_edge(&mut self) -> Result<(), LinkError> {
        self.write_clock(false)?;
        match self.config.phase {
            Phase::CaptureOnFirstTransition => {
                if self.config.sample == SamplePoint::End {
                    self.capture()?;
                }
                if self.shift.is_complete() {
                    self.finish();
                    Ok(())
                } else {
                    self.present_bit()
                }
            }
            Phase::CaptureOnSecondTransition => {
                self.capture()?;
                if self.shift.is_complete() {
                    self.finish();
                }
                Ok(())
            }
        }
    }
}

impl<SCK, SDO, SDI, SS> Exchange for MasterEngine<SCK, SDO, SDI, SS>
where
    SCK: OutputPin,
    SDO: OutputPin,
    SDI: InputPin,
    SS: OutputPin,
{
    fn load(&mut self, byte: u8) -> Result<(), LinkError> {
        if self.state != MasterState::Idle {
            return Err(LinkError::Busy);
        }
        if self.latch.full() {
            return Err(LinkError::Unacknowledged);
        }
        self.latch.tx = byte;
        self.shift.start(byte);
        self.tick_counter = 0;
        self.ss.set_low().map_err(|_| LinkError::Pin)?;
        if self.config.phase == Phase::CaptureOnFirstTransition {
            self.present_bit()?;
        }
        self.state = MasterState::Shifting;
        trace!("master loaded {:#x}", byte);
        Ok(())
    }

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        self.latch.read()
    }

    fn buffer_full(&self) -> bool {
        self.latch.full()
    }

    fn in_flight(&self) -> bool {
        self.state != MasterState::Idle
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

    fn exchange_ticks(&self) -> Option<u32> {
        Some(exchange_ticks(self.config.divider))
    }

    fn tick(&mut self) -> Result<(), LinkError> {
        match self.state {
            MasterState::Idle => Ok(()),
            MasterState::Releasing => {
                self.ss.set_high().map_err(|_| LinkError::Pin)?;
                self.state = MasterState::Idle;
                let received = self.shift.received();
                self.latch.complete(received);
                trace!("master exchange done, received {:#x}", received);
                Ok(())
            }
            MasterState::Shifting => {
                self.tick_counter += 1;
                if self.tick_counter < self.config.divider.half_period() {
                    return Ok(());
                }
                self.tick_counter = 0;
                if self.clock_active {
                    self.trailing_edge()
                } else {
                    self.leading_edge()
                }
            }
        }
    }
}
