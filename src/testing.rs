//! Test doubles shared by the unit tests.

use crate::config::{ClockDivider, EngineConfig, SamplerConfig};
use crate::consts::SLAVE_COUNTER_START;
use crate::engine::{Exchange, MasterEngine, SlaveEngine};
use crate::error::LinkError;
use crate::node::{MasterNode, Node, SlaveNode};
use crate::sampler::Converter;
use crate::sink::ByteSink;
use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use embedded_hal::digital::{ErrorKind, ErrorType, InputPin, OutputPin};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};

/// A shared line: every clone sees the same level.
#[derive(Debug, Clone, Default)]
pub struct Wire(Rc<Cell<bool>>);

impl Wire {
    pub fn high() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn level(&self) -> bool {
        self.0.get()
    }
}

impl ErrorType for Wire {
    type Error = Infallible;
}

impl InputPin for Wire {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.get())
    }
}

impl OutputPin for Wire {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set(true);
        Ok(())
    }
}

/// An input pin that cannot be read.
#[derive(Debug)]
pub struct BrokenPin;

impl ErrorType for BrokenPin {
    type Error = ErrorKind;
}

impl InputPin for BrokenPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Err(ErrorKind::Other)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Err(ErrorKind::Other)
    }
}

/// A byte sink that remembers what it was shown. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    last: Arc<AtomicU8>,
    writes: Arc<AtomicU32>,
}

impl MemorySink {
    pub fn last(&self) -> u8 {
        self.last.load(Ordering::Relaxed)
    }

    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::Relaxed)
    }
}

impl ByteSink for MemorySink {
    fn write_byte(&mut self, value: u8) -> Result<(), LinkError> {
        self.last.store(value, Ordering::Relaxed);
        let _ = self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[derive(Debug)]
struct ConverterState {
    value: u16,
    latency: u8,
    remaining: u8,
    starts: u32,
    reads: u32,
    last_channel: Option<u8>,
}

/// A converter that answers `latency` polls after being started.
#[derive(Debug, Clone)]
pub struct FakeConverter(Rc<RefCell<ConverterState>>);

impl FakeConverter {
    pub fn new(value: u16, latency: u8) -> Self {
        Self(Rc::new(RefCell::new(ConverterState {
            value,
            latency,
            remaining: 0,
            starts: 0,
            reads: 0,
            last_channel: None,
        })))
    }

    pub fn set_value(&self, value: u16) {
        self.0.borrow_mut().value = value;
    }

    pub fn starts(&self) -> u32 {
        self.0.borrow().starts
    }

    pub fn reads(&self) -> u32 {
        self.0.borrow().reads
    }

    pub fn last_channel(&self) -> Option<u8> {
        self.0.borrow().last_channel
    }
}

impl Converter for FakeConverter {
    type Error = Infallible;

    fn start(&mut self, channel: u8) -> Result<(), Self::Error> {
        let mut state = self.0.borrow_mut();
        state.starts += 1;
        state.remaining = state.latency;
        state.last_channel = Some(channel);
        Ok(())
    }

    fn read(&mut self) -> nb::Result<u16, Self::Error> {
        let mut state = self.0.borrow_mut();
        state.reads += 1;
        if state.remaining > 0 {
            state.remaining -= 1;
            return Err(nb::Error::WouldBlock);
        }
        Ok(state.value)
    }
}

/// A converter that finishes immediately and owns no shared state.
#[derive(Debug, Clone, Copy)]
pub struct InstantConverter(pub u16);

impl Converter for InstantConverter {
    type Error = Infallible;

    fn start(&mut self, _channel: u8) -> Result<(), Self::Error> {
        Ok(())
    }

    fn read(&mut self) -> nb::Result<u16, Self::Error> {
        Ok(self.0)
    }
}

/// An exchange whose completions are scripted by the test.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    /// Last byte loaded.
    pub loaded: Option<u8>,
    /// Reported as in flight.
    pub busy: bool,
    /// Fails every tick after this many succeeded.
    pub fail_after: Option<u32>,
    /// Reported exchange duration.
    pub exchange_ticks: Option<u32>,
    pub ticks: u32,
    rx: u8,
    full: bool,
    flag: bool,
    overrun: bool,
}

impl ScriptedEngine {
    /// Completes an exchange that received `byte`.
    pub fn receive(&mut self, byte: u8) {
        self.overrun |= self.full;
        self.rx = byte;
        self.full = true;
        self.flag = true;
    }

    /// Raises the transfer flag without a received byte.
    pub fn raise_flag(&mut self) {
        self.flag = true;
    }
}

impl Exchange for ScriptedEngine {
    fn load(&mut self, byte: u8) -> Result<(), LinkError> {
        if self.busy {
            return Err(LinkError::Busy);
        }
        if self.full {
            return Err(LinkError::Unacknowledged);
        }
        self.loaded = Some(byte);
        Ok(())
    }

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        if !self.full {
            return Err(nb::Error::WouldBlock);
        }
        self.full = false;
        Ok(self.rx)
    }

    fn buffer_full(&self) -> bool {
        self.full
    }

    fn in_flight(&self) -> bool {
        self.busy
    }

    fn transfer_pending(&self) -> bool {
        self.flag
    }

    fn clear_transfer_flag(&mut self) {
        self.flag = false;
    }

    fn take_overrun(&mut self) -> bool {
        core::mem::take(&mut self.overrun)
    }

    fn exchange_ticks(&self) -> Option<u32> {
        self.exchange_ticks
    }

    fn tick(&mut self) -> Result<(), LinkError> {
        if self.fail_after.is_some_and(|limit| self.ticks >= limit) {
            return Err(LinkError::Pin);
        }
        self.ticks += 1;
        Ok(())
    }
}

pub type WireMaster =
    MasterNode<MasterEngine<Wire, Wire, Wire, Wire>, FakeConverter, MemorySink, MemorySink>;
pub type WireSlave =
    SlaveNode<SlaveEngine<Wire, Wire, Wire, Wire>, MemorySink, MemorySink>;

/// Two nodes on one bus, built the way firmware on each side would.
#[derive(Debug)]
pub struct Bench {
    pub master: WireMaster,
    pub slave: WireSlave,
    pub converter: FakeConverter,
    pub steps: u32,
}

impl Bench {
    pub fn new(sample: u16, latency: u8, sampler: SamplerConfig) -> Self {
        Self::with_divider(sample, latency, sampler, EngineConfig::master().divider)
    }

    /// A bench whose master clocks the bus with `divider`.
    pub fn with_divider(
        sample: u16,
        latency: u8,
        sampler: SamplerConfig,
        divider: ClockDivider,
    ) -> Self {
        let sck = Wire::default();
        let mosi = Wire::default();
        let miso = Wire::default();
        let ss = Wire::high();
        let converter = FakeConverter::new(sample, latency);

        let slave_engine = SlaveEngine::new(
            sck.clone(),
            miso.clone(),
            mosi.clone(),
            ss.clone(),
            EngineConfig::slave(),
            SLAVE_COUNTER_START,
        )
        .unwrap();
        let slave =
            SlaveNode::new(slave_engine, MemorySink::default(), MemorySink::default()).unwrap();

        let config = EngineConfig {
            divider,
            ..EngineConfig::master()
        };
        let master_engine = MasterEngine::new(sck, mosi, miso, ss, config).unwrap();
        let master = MasterNode::new(
            master_engine,
            converter.clone(),
            sampler,
            MemorySink::default(),
            MemorySink::default(),
        )
        .unwrap();

        Self {
            master,
            slave,
            converter,
            steps: 0,
        }
    }

    /// One peripheral clock period on both nodes, interrupts serviced after
    /// the clock, foreground loops last.
    pub fn step(&mut self) {
        self.master.tick().unwrap();
        self.slave.tick().unwrap();
        if self.master.has_pending() {
            let _ = self.master.service().unwrap();
        }
        if self.slave.has_pending() {
            let _ = self.slave.service().unwrap();
        }
        self.master.poll().unwrap();
        self.slave.poll().unwrap();
        self.steps += 1;
    }

    /// Steps until `done` holds. Panics after `limit` steps.
    pub fn run_until(&mut self, limit: u32, mut done: impl FnMut(&Self) -> bool) {
        for _ in 0..limit {
            if done(self) {
                return;
            }
            self.step();
        }
        assert!(done(self), "condition not reached after {} steps", limit);
    }
}
