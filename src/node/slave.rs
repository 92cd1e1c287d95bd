use super::Node;
use crate::counter::LocalCounter;
use crate::dispatch::{Dispatcher, Event, EventSource};
use crate::engine::Exchange;
use crate::error::LinkError;
use crate::role::Role;
use crate::sink::{ByteSink, Register};
use crate::stats::{Fault, LinkStats};

/// Slave node: counts down once per exchange and answers with its counter.
///
/// The slave has no foreground work. Its only handler runs on
/// [`Event::TransferComplete`]: the received byte goes to the display, the
/// counter steps down, and the new counter value is loaded for the next
/// exchange.
#[derive(Debug)]
pub struct SlaveNode<E, D, C>
where
    E: Exchange,
    D: ByteSink,
    C: ByteSink,
{
    engine: E,
    counter: LocalCounter,
    display: Register<D>,
    counter_out: Register<C>,
    stats: LinkStats,
    dispatcher: Dispatcher<Self>,
}

impl<E, D, C> SlaveNode<E, D, C>
where
    E: Exchange,
    D: ByteSink,
    C: ByteSink,
{
    /// Builds the slave node with the counter's start value as the first
    /// outgoing byte.
    pub fn new(mut engine: E, display: D, counter: C) -> Result<Self, LinkError> {
        let local = LocalCounter::descending();
        let display = Register::new(display, 0)?;
        let counter_out = Register::new(counter, local.value())?;

        let mut dispatcher: Dispatcher<Self> = Dispatcher::new();
        dispatcher.register(Event::TransferComplete, Self::on_transfer_complete)?;

        engine.load(local.value())?;
        info!("slave up, answering {:#x}", local.value());

        Ok(Self {
            engine,
            counter: local,
            display,
            counter_out,
            stats: LinkStats::default(),
            dispatcher,
        })
    }

    /// The serial engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable access to the serial engine.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    fn on_transfer_complete(&mut self) -> Result<(), LinkError> {
        let incoming = match self.engine.read() {
            Ok(byte) => byte,
            Err(_) => {
                self.stats.raise(Fault::SpuriousInterrupt);
                return Ok(());
            }
        };
        self.stats.record_transfer();
        self.display.write(incoming)?;

        let next = self.counter.step();
        self.counter_out.write(next)?;
        match self.engine.load(next) {
            // already clocking the next byte out; it repeats the previous value
            Err(LinkError::Busy) => {
                warn!("slave answer {:#x} missed the next exchange", next);
                Ok(())
            }
            other => other,
        }
    }
}

impl<E, D, C> EventSource for SlaveNode<E, D, C>
where
    E: Exchange,
    D: ByteSink,
    C: ByteSink,
{
    fn is_pending(&self, event: Event) -> bool {
        match event {
            Event::TransferComplete => self.engine.transfer_pending(),
            Event::SampleReady => false,
        }
    }

    fn clear(&mut self, event: Event) {
        if event == Event::TransferComplete {
            self.engine.clear_transfer_flag();
        }
    }
}

impl<E, D, C> Node for SlaveNode<E, D, C>
where
    E: Exchange,
    D: ByteSink,
    C: ByteSink,
{
    fn role(&self) -> Role {
        Role::Slave
    }

    fn tick(&mut self) -> Result<(), LinkError> {
        self.engine.tick()?;
        if self.engine.take_overrun() {
            self.stats.raise(Fault::Overrun);
        }
        if self.engine.take_discarded() {
            self.stats.raise(Fault::DiscardedPartial);
        }
        Ok(())
    }

    fn poll(&mut self) -> Result<(), LinkError> {
        Ok(())
    }

    fn has_pending(&self) -> bool {
        self.dispatcher.any_pending(self)
    }

    fn service(&mut self) -> Result<u8, LinkError> {
        let dispatcher = self.dispatcher;
        let handled = dispatcher.dispatch(self)?;
        if handled == 0 {
            self.stats.raise(Fault::SpuriousInterrupt);
        }
        Ok(handled)
    }

    fn display(&self) -> u8 {
        self.display.value()
    }

    fn counter(&self) -> u8 {
        self.counter.value()
    }

    fn stats(&self) -> &LinkStats {
        &self.stats
    }

    fn take_fault(&mut self) -> Option<Fault> {
        self.stats.take_fault()
    }
}
