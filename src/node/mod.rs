//! The two node roles and the interface the runtime drives them through.
//!
//! A node owns everything one side of the link needs: the serial
//! [engine](crate::engine), its output [registers](crate::sink::Register), its
//! [`LocalCounter`](crate::counter::LocalCounter) and, on the master, the
//! [sampler](crate::sampler). The runtime only sees the [`Node`] trait:
//!
//! - [`tick()`](Node::tick) at the peripheral clock rate, from a timer interrupt.
//! - [`service()`](Node::service) from the peripheral interrupt, whenever
//!   [`has_pending()`](Node::has_pending) says an event flag is up.
//! - [`poll()`](Node::poll) from the foreground loop, as often as it likes.
//!
//! [`boot()`] reads the role pin once and builds the matching node.

use crate::error::LinkError;
use crate::role::Role;
use crate::stats::{Fault, LinkStats};
use embedded_hal::digital::InputPin;

mod master;
mod slave;

pub use master::MasterNode;
pub use slave::SlaveNode;

/// One side of the link.
pub trait Node {
    /// The role this node plays.
    fn role(&self) -> Role;

    /// Advances the node's peripherals by one peripheral clock period.
    fn tick(&mut self) -> Result<(), LinkError>;

    /// One pass of the foreground loop.
    fn poll(&mut self) -> Result<(), LinkError>;

    /// A registered event flag is raised.
    fn has_pending(&self) -> bool;

    /// Interrupt entry: handles every pending registered event. Returns the
    /// number handled.
    fn service(&mut self) -> Result<u8, LinkError>;

    /// The value on the display register.
    fn display(&self) -> u8;

    /// The value of the local counter.
    fn counter(&self) -> u8;

    /// Link counters.
    fn stats(&self) -> &LinkStats;

    /// Latest fault not yet collected.
    fn take_fault(&mut self) -> Option<Fault>;
}

/// A node whose role was chosen at boot.
#[derive(Debug)]
pub enum Link<M, S> {
    /// Booted as master
    Master(M),
    /// Booted as slave
    Slave(S),
}

/// Reads the role pin and builds the matching node. Only the chosen
/// constructor runs.
///
/// ```rust,ignore
/// let mut node = boot(
///     &mut role_pin,
///     || MasterNode::new(master_engine, adc, SamplerConfig::default(), leds, counter_leds),
///     || SlaveNode::new(slave_engine, leds, counter_leds),
/// )?;
/// ```
pub fn boot<P, M, S, FM, FS>(
    role_pin: &mut P,
    make_master: FM,
    make_slave: FS,
) -> Result<Link<M, S>, LinkError>
where
    P: InputPin,
    M: Node,
    S: Node,
    FM: FnOnce() -> Result<M, LinkError>,
    FS: FnOnce() -> Result<S, LinkError>,
{
    let role = Role::select(role_pin);
    info!("booting as {:?}", role);
    match role {
        Role::Master => make_master().map(Link::Master),
        Role::Slave => make_slave().map(Link::Slave),
    }
}

macro_rules! delegate {
    ($self:ident, $node:ident => $call:expr) => {
        match $self {
            Link::Master($node) => $call,
            Link::Slave($node) => $call,
        }
    };
}

impl<M, S> Node for Link<M, S>
where
    M: Node,
    S: Node,
{
    fn role(&self) -> Role {
        delegate!(self, node => node.role())
    }

    fn tick(&mut self) -> Result<(), LinkError> {
        delegate!(self, node => node.tick())
    }

    fn poll(&mut self) -> Result<(), LinkError> {
        delegate!(self, node => node.poll())
    }

    fn has_pending(&self) -> bool {
        delegate!(self, node => node.has_pending())
    }

    fn service(&mut self) -> Result<u8, LinkError> {
        delegate!(self, node => node.service())
    }

    fn display(&self) -> u8 {
        delegate!(self, node => node.display())
    }

    fn counter(&self) -> u8 {
        delegate!(self, node => node.counter())
    }

    fn stats(&self) -> &LinkStats {
        delegate!(self, node => node.stats())
    }

    fn take_fault(&mut self) -> Option<Fault> {
        delegate!(self, node => node.take_fault())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SamplerConfig;
    use crate::consts::{MASTER_COUNTER_START, SLAVE_COUNTER_START};
    use crate::testing::{InstantConverter, MemorySink, ScriptedEngine};
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    type TestMaster = MasterNode<ScriptedEngine, InstantConverter, MemorySink, MemorySink>;
    type TestSlave = SlaveNode<ScriptedEngine, MemorySink, MemorySink>;

    fn make_master() -> Result<TestMaster, LinkError> {
        MasterNode::new(
            ScriptedEngine::default(),
            InstantConverter(0),
            SamplerConfig::default(),
            MemorySink::default(),
            MemorySink::default(),
        )
    }

    fn make_slave() -> Result<TestSlave, LinkError> {
        SlaveNode::new(
            ScriptedEngine::default(),
            MemorySink::default(),
            MemorySink::default(),
        )
    }

    #[test]
    fn test_boot_high_builds_master() {
        let mut pin = PinMock::new(&[PinTransaction::get(PinState::High)]);
        let node = boot(&mut pin, make_master, || -> Result<TestSlave, _> {
            panic!("slave constructor must not run")
        })
        .unwrap();
        assert!(matches!(node, Link::Master(_)));
        assert_eq!(node.role(), Role::Master);
        assert_eq!(node.counter(), MASTER_COUNTER_START);
        pin.done();
    }

    #[test]
    fn test_boot_low_builds_slave() {
        let mut pin = PinMock::new(&[PinTransaction::get(PinState::Low)]);
        let node = boot(
            &mut pin,
            || -> Result<TestMaster, _> { panic!("master constructor must not run") },
            make_slave,
        )
        .unwrap();
        assert_eq!(node.role(), Role::Slave);
        assert_eq!(node.counter(), SLAVE_COUNTER_START);
        pin.done();
    }

    #[test]
    fn test_boot_propagates_constructor_error() {
        let mut pin = PinMock::new(&[PinTransaction::get(PinState::High)]);
        let result = boot(
            &mut pin,
            || -> Result<TestMaster, _> { Err(LinkError::Pin) },
            make_slave,
        );
        assert!(matches!(result, Err(LinkError::Pin)));
        pin.done();
    }

    #[test]
    fn test_link_delegates_service() {
        let mut pin = PinMock::new(&[PinTransaction::get(PinState::Low)]);
        let mut node = boot(&mut pin, make_master, make_slave).unwrap();
        assert!(!node.has_pending());
        if let Link::Slave(slave) = &mut node {
            slave.engine_mut().receive(0x42);
        }
        assert!(node.has_pending());
        assert_eq!(node.service(), Ok(1));
        assert_eq!(node.display(), 0x42);
        assert_eq!(node.stats().transfers, 1);
        assert_eq!(node.take_fault(), None);
        pin.done();
    }
}
