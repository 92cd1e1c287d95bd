use super::Node;
use crate::config::SamplerConfig;
use crate::consts::STALL_EXCHANGE_LIMIT;
use crate::counter::LocalCounter;
use crate::dispatch::{Dispatcher, Event, EventSource};
use crate::engine::Exchange;
use crate::error::LinkError;
use crate::role::Role;
use crate::sampler::{Converter, SampleTrigger, SamplerState};
use crate::sink::{ByteSink, Register};
use crate::stats::{Fault, LinkStats};
use crate::tick::{Trigger, TransferTick};

/// Master node: samples, counts up, initiates every exchange.
///
/// The foreground loop keeps the sampler busy: each Idle → Sampling transition
/// steps the counter. Each accepted sample is queued as the next outgoing byte
/// and loaded as soon as the previous exchange has completed and its incoming
/// byte is read, which is also when the display is updated.
///
/// Handlers:
///
/// - [`Event::SampleReady`]: accept the sample and pump the queue.
/// - [`Event::TransferComplete`]: count the exchange and pump the queue.
///
/// A queued byte that waits [`STALL_EXCHANGE_LIMIT`] exchange durations with no
/// exchange completing raises [`Fault::Stall`]. Engines that do not report an
/// exchange duration are never considered stalled.
#[derive(Debug)]
pub struct MasterNode<E, A, D, C>
where
    E: Exchange,
    A: Converter,
    D: ByteSink,
    C: ByteSink,
{
    engine: E,
    trigger: SampleTrigger<A>,
    tick: TransferTick,
    counter: LocalCounter,
    display: Register<D>,
    counter_out: Register<C>,
    stats: LinkStats,
    waiting_ticks: u32,
    stall_ticks: Option<u32>,
    dispatcher: Dispatcher<Self>,
}

impl<E, A, D, C> MasterNode<E, A, D, C>
where
    E: Exchange,
    A: Converter,
    D: ByteSink,
    C: ByteSink,
{
    /// Builds the master node and loads the counter's start value as the
    /// first outgoing byte, which starts the first exchange.
    pub fn new(
        mut engine: E,
        converter: A,
        sampler: SamplerConfig,
        display: D,
        counter: C,
    ) -> Result<Self, LinkError> {
        let local = LocalCounter::ascending();
        let display = Register::new(display, 0)?;
        let counter_out = Register::new(counter, local.value())?;

        let mut dispatcher: Dispatcher<Self> = Dispatcher::new();
        dispatcher.register(Event::SampleReady, Self::on_sample_ready)?;
        dispatcher.register(Event::TransferComplete, Self::on_transfer_complete)?;

        engine.load(local.value())?;
        let stall_ticks = engine
            .exchange_ticks()
            .map(|ticks| ticks.saturating_mul(STALL_EXCHANGE_LIMIT));
        info!("master up, channel {}", sampler.channel);

        Ok(Self {
            engine,
            trigger: SampleTrigger::new(converter, sampler),
            tick: TransferTick::new(),
            counter: local,
            display,
            counter_out,
            stats: LinkStats::default(),
            waiting_ticks: 0,
            stall_ticks,
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

    /// Last accepted SampleValue.
    pub fn sample_value(&self) -> u8 {
        self.trigger.sample()
    }

    /// Sampler state.
    pub fn sampler_state(&self) -> SamplerState {
        self.trigger.state()
    }

    /// Byte waiting for the next exchange.
    pub fn queued(&self) -> Option<u8> {
        self.tick.pending()
    }

    fn on_sample_ready(&mut self) -> Result<(), LinkError> {
        let Some(sample) = self.trigger.complete() else {
            return Ok(());
        };
        if self.tick.offer(sample) {
            self.stats.record_replaced();
        }
        let _ = self.pump(Trigger::SampleComplete)?;
        Ok(())
    }

    fn on_transfer_complete(&mut self) -> Result<(), LinkError> {
        self.stats.record_transfer();
        self.waiting_ticks = 0;
        let _ = self.pump(Trigger::TransferComplete)?;
        Ok(())
    }

    /// Counts ticks a queued byte has waited since the last completion.
    fn track_stall(&mut self) {
        if self.tick.pending().is_none() {
            self.waiting_ticks = 0;
            return;
        }
        self.waiting_ticks = self.waiting_ticks.saturating_add(1);
        if Some(self.waiting_ticks) == self.stall_ticks {
            warn!("queued byte waited {} ticks", self.waiting_ticks);
            self.stats.raise(Fault::Stall);
        }
    }

    /// Acknowledges the completed exchange and loads the queued byte, if both
    /// are available. The acknowledged byte goes to the display.
    fn pump(&mut self, trigger: Trigger) -> Result<bool, LinkError> {
        match self.tick.pump(trigger, &mut self.engine)? {
            Some(incoming) => {
                self.display.write(incoming)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl<E, A, D, C> EventSource for MasterNode<E, A, D, C>
where
    E: Exchange,
    A: Converter,
    D: ByteSink,
    C: ByteSink,
{
    fn is_pending(&self, event: Event) -> bool {
        match event {
            Event::SampleReady => self.trigger.is_ready(),
            Event::TransferComplete => self.engine.transfer_pending(),
        }
    }

    fn clear(&mut self, event: Event) {
        match event {
            Event::SampleReady => self.trigger.clear_ready(),
            Event::TransferComplete => self.engine.clear_transfer_flag(),
        }
    }
}

impl<E, A, D, C> Node for MasterNode<E, A, D, C>
where
    E: Exchange,
    A: Converter,
    D: ByteSink,
    C: ByteSink,
{
    fn role(&self) -> Role {
        Role::Master
    }

    fn tick(&mut self) -> Result<(), LinkError> {
        self.engine.tick()?;
        self.trigger.poll()?;
        if self.engine.take_overrun() {
            self.stats.raise(Fault::Overrun);
        }
        self.track_stall();
        Ok(())
    }

    fn poll(&mut self) -> Result<(), LinkError> {
        if self.trigger.request()? {
            let value = self.counter.step();
            self.counter_out.write(value)?;
        }
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
